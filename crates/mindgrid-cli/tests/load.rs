//! Tests for dataset loading and grid output

use mindgrid::prelude::*;
use mindgrid::render_dataset;
use mindgrid_cli::{read_csv, read_json, write_grid, CsvLoadOptions};
use pretty_assertions::assert_eq;

const PLAN_CSV: &str = "\
task,hours:number,tags:tags,total
Design,4,ui;urgent,=SUM(B1:B3)
Build,12.5,,\"=IF(B2>5,\"\"High\"\",\"\"Low\"\")\"
Test,x,qa,
";

#[test]
fn test_read_csv_with_typed_header() {
    let ds = read_csv(PLAN_CSV.as_bytes(), &CsvLoadOptions::default()).unwrap();

    assert_eq!(ds.column_count(), 4);
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.column(1).unwrap().kind, ColumnKind::Number);
    assert_eq!(ds.value("B2").unwrap(), Some(&CellValue::Number(12.5)));
    assert_eq!(ds.value("B3").unwrap(), Some(&CellValue::Text("x".into())));
    assert_eq!(
        ds.value("C1").unwrap(),
        Some(&CellValue::List(vec!["ui".into(), "urgent".into()]))
    );
    // in bounds but never set
    assert_eq!(ds.value("C2").unwrap(), Some(&CellValue::Null));
    assert_eq!(ds.value("C9").unwrap(), None);

    assert_eq!(evaluate("=D1", &ds), FormulaValue::String("=SUM(B1:B3)".into()));
    assert_eq!(evaluate("=SUM(B1:B3)", &ds), FormulaValue::Number(16.5));
}

#[test]
fn test_read_csv_without_header() {
    let options = CsvLoadOptions {
        delimiter: b';',
        has_header: false,
    };
    let ds = read_csv("1;2\n3;4;5\n".as_bytes(), &options).unwrap();

    assert_eq!(ds.column_count(), 3);
    assert_eq!(ds.column(2).unwrap().id, "c");
    assert_eq!(evaluate("=SUM(A1:C2)", &ds), FormulaValue::Number(15.0));
}

#[test]
fn test_read_csv_rejects_unknown_kind() {
    let err = read_csv("a:money\n1\n".as_bytes(), &CsvLoadOptions::default()).unwrap_err();
    assert!(err.to_string().contains("money"));
}

#[test]
fn test_read_json() {
    let json = r#"{
        "columns": [
            {"id": "task", "label": "Task", "type": "text"},
            {"id": "hours", "label": "Hours", "type": "number"},
            {"id": "owners", "label": "Owners", "type": "relationship", "editable": false}
        ],
        "rows": [
            {"task": "Design", "hours": 4, "owners": ["ana", "ben"]},
            {"task": "Build", "hours": "=ROUND(B1*2,0)"},
            {"task": "Ship", "hours": 2}
        ]
    }"#;
    let ds = read_json(json.as_bytes()).unwrap();

    assert_eq!(ds.row_count(), 3);
    assert!(!ds.column(2).unwrap().editable);
    assert_eq!(evaluate("=SUM(B1:B3)", &ds), FormulaValue::Number(6.0));
    assert_eq!(
        evaluate("=B2", &ds),
        FormulaValue::String("=ROUND(B1*2,0)".into())
    );
}

#[test]
fn test_read_json_rejects_duplicate_columns() {
    let json = r#"{"columns": [
        {"id": "a", "label": "A"},
        {"id": "a", "label": "A again"}
    ]}"#;
    assert!(read_json(json.as_bytes()).is_err());
}

#[test]
fn test_write_rendered_grid() {
    let ds = read_csv(PLAN_CSV.as_bytes(), &CsvLoadOptions::default()).unwrap();
    let grid = render_dataset(&ds);

    let mut out = Vec::new();
    write_grid(&mut out, &ds, &grid, b',').unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(
        text,
        "task,hours,tags,total\n\
         Design,4,\"ui, urgent\",16.5\n\
         Build,12.5,,High\n\
         Test,x,qa,\n"
    );
}
