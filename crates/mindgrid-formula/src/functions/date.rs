//! Date and time functions
//!
//! Dates are ISO-8601 strings (`2024-01-15`, `2024-01-15T09:30:00`,
//! RFC 3339 with an offset). Functions that produce dates return them in the
//! same form; there are no serial date numbers.

use super::{number_arg, scalar_arg, text_arg, try_cell};
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::{Argument, FormulaValue};
use ahash::AHashSet;
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Timelike, Weekday};
use mindgrid_core::CellError;

const MS_PER_DAY: i64 = 86_400_000;

/// Parse an ISO date or date-time string
///
/// Offsets are kept as written: `2024-01-15T23:00:00-05:00` is 23:00.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn date_arg(args: &[Argument], index: usize) -> Result<NaiveDateTime, CellError> {
    match scalar_arg(args, index) {
        Some(FormulaValue::Error(e)) => Err(*e),
        Some(FormulaValue::String(s)) => parse_datetime(s).ok_or(CellError::Value),
        _ => Err(CellError::Value),
    }
}

fn format_date(date: NaiveDate) -> FormulaValue {
    FormulaValue::String(date.format("%Y-%m-%d").to_string())
}

/// TODAY() - current date as `YYYY-MM-DD`
pub fn fn_today(_args: &[Argument], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(format_date(ctx.options().current_time().date()))
}

/// NOW() - current date and time as `YYYY-MM-DDTHH:MM:SS`
pub fn fn_now(_args: &[Argument], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let now = ctx.options().current_time();
    Ok(FormulaValue::String(
        now.format("%Y-%m-%dT%H:%M:%S").to_string(),
    ))
}

/// YEAR(date)
pub fn fn_year(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let date = try_cell!(date_arg(args, 0));
    Ok(FormulaValue::Number(date.year() as f64))
}

/// MONTH(date) - 1 to 12
pub fn fn_month(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let date = try_cell!(date_arg(args, 0));
    Ok(FormulaValue::Number(date.month() as f64))
}

/// DAY(date) - day of the month
pub fn fn_day(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let date = try_cell!(date_arg(args, 0));
    Ok(FormulaValue::Number(date.day() as f64))
}

/// HOUR(datetime)
pub fn fn_hour(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let date = try_cell!(date_arg(args, 0));
    Ok(FormulaValue::Number(date.hour() as f64))
}

/// MINUTE(datetime)
pub fn fn_minute(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let date = try_cell!(date_arg(args, 0));
    Ok(FormulaValue::Number(date.minute() as f64))
}

/// SECOND(datetime)
pub fn fn_second(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let date = try_cell!(date_arg(args, 0));
    Ok(FormulaValue::Number(date.second() as f64))
}

/// WEEKDAY(date, [return_type])
///
/// Type 1 (default): Sunday = 1 .. Saturday = 7. Type 2: Monday = 1 ..
/// Sunday = 7. Type 3: Monday = 0 .. Sunday = 6.
pub fn fn_weekday(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let date = try_cell!(date_arg(args, 0));
    let return_type = try_cell!(number_arg(args, 1, Some(1.0))).trunc();

    let weekday = date.weekday();
    let n = match return_type as i64 {
        1 => weekday.num_days_from_sunday() + 1,
        2 => weekday.number_from_monday(),
        3 => weekday.num_days_from_monday(),
        _ => return Ok(FormulaValue::Error(CellError::Num)),
    };
    Ok(FormulaValue::Number(n as f64))
}

/// DATEDIF(start_date, end_date, unit)
///
/// Units: `D` days, `M` 30-day months, `Y` 365-day years, each the floor of
/// the elapsed milliseconds. Negative when `end_date` is earlier.
pub fn fn_datedif(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let start = try_cell!(date_arg(args, 0));
    let end = try_cell!(date_arg(args, 1));
    let unit = try_cell!(text_arg(args, 2));

    let elapsed = (end - start).num_milliseconds();
    let period = match unit.trim().to_ascii_uppercase().as_str() {
        "D" => MS_PER_DAY,
        "M" => 30 * MS_PER_DAY,
        "Y" => 365 * MS_PER_DAY,
        _ => return Ok(FormulaValue::Error(CellError::Num)),
    };

    Ok(FormulaValue::Number(elapsed.div_euclid(period) as f64))
}

/// NETWORKDAYS(start_date, end_date, [holidays])
///
/// Counts Monday to Friday inclusive of both ends, skipping holidays.
/// Negative when `end_date` is earlier.
pub fn fn_networkdays(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let start = try_cell!(date_arg(args, 0)).date();
    let end = try_cell!(date_arg(args, 1)).date();

    let mut holidays = AHashSet::new();
    if let Some(arg) = args.get(2) {
        for value in arg.values() {
            match value {
                FormulaValue::Error(e) => return Ok(FormulaValue::Error(*e)),
                FormulaValue::String(s) => {
                    if let Some(dt) = parse_datetime(s) {
                        holidays.insert(dt.date());
                    }
                }
                _ => {}
            }
        }
    }

    let (from, to, sign) = if start <= end {
        (start, end, 1.0)
    } else {
        (end, start, -1.0)
    };

    let holidays_off = holidays
        .iter()
        .filter(|d| **d >= from && **d <= to && is_workday(**d))
        .count() as i64;

    Ok(FormulaValue::Number(
        sign * (workdays_between(from, to) - holidays_off) as f64,
    ))
}

fn is_workday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday to Friday count in `from..=to`, without walking every day
fn workdays_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let days = (to - from).num_days() + 1;
    let full_weeks = days / 7;
    let tail = from
        .iter_days()
        .take((days % 7) as usize)
        .filter(|d| is_workday(*d))
        .count() as i64;
    full_weeks * 5 + tail
}

/// Largest month shift that can still land on a representable date
const MAX_MONTH_SHIFT: f64 = 12.0 * 524_288.0;

/// Whole-month shift argument; `#NUM!` past [`MAX_MONTH_SHIFT`]
fn months_arg(args: &[Argument], index: usize) -> Result<i64, CellError> {
    let months = number_arg(args, index, None)?.trunc();
    if months.abs() > MAX_MONTH_SHIFT {
        return Err(CellError::Num);
    }
    Ok(months as i64)
}

/// Shift a date by whole months, clamping to the end of shorter months
fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

/// EDATE(start_date, months)
pub fn fn_edate(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let start = try_cell!(date_arg(args, 0)).date();
    let months = try_cell!(months_arg(args, 1));

    Ok(match shift_months(start, months) {
        Some(date) => format_date(date),
        None => FormulaValue::Error(CellError::Num),
    })
}

/// EOMONTH(start_date, months) - last day of the shifted month
pub fn fn_eomonth(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let start = try_cell!(date_arg(args, 0)).date();
    let months = try_cell!(months_arg(args, 1));

    let end_of_month = start
        .with_day(1)
        .and_then(|first| shift_months(first, months.checked_add(1)?))
        .and_then(|next| next.pred_opt());

    Ok(match end_of_month {
        Some(date) => format_date(date),
        None => FormulaValue::Error(CellError::Num),
    })
}

#[cfg(test)]
mod tests {
    use super::parse_datetime;
    use crate::evaluator::tests::{eval, eval_with};
    use crate::options::EvaluationOptions;
    use crate::value::FormulaValue;
    use chrono::NaiveDate;
    use mindgrid_core::CellError;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> FormulaValue {
        FormulaValue::String(s.to_string())
    }

    fn pinned() -> EvaluationOptions {
        EvaluationOptions::default().with_now(
            NaiveDate::from_ymd_opt(2024, 5, 17)
                .unwrap()
                .and_hms_opt(8, 30, 5)
                .unwrap(),
        )
    }

    #[test]
    fn test_parse_datetime() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-01-15T10:00:00"), Some(expected));
        assert_eq!(parse_datetime("2024-01-15 10:00:00"), Some(expected));
        assert_eq!(parse_datetime("2024-01-15T10:00:00Z"), Some(expected));
        assert_eq!(parse_datetime("2024-01-15T10:00:00+02:00"), Some(expected));
        assert_eq!(
            parse_datetime("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_datetime("15/01/2024"), None);
        assert_eq!(parse_datetime("2024-02-30"), None);
    }

    #[test]
    fn test_today_now() {
        assert_eq!(eval_with("=TODAY()", pinned()), text("2024-05-17"));
        assert_eq!(eval_with("=NOW()", pinned()), text("2024-05-17T08:30:05"));
        assert_eq!(eval_with("=YEAR(TODAY())", pinned()), FormulaValue::Number(2024.0));
    }

    #[test]
    fn test_date_parts() {
        assert_eq!(eval("=YEAR(E1)"), FormulaValue::Number(2024.0));
        assert_eq!(eval("=MONTH(E1)"), FormulaValue::Number(1.0));
        assert_eq!(eval("=DAY(E1)"), FormulaValue::Number(15.0));
        assert_eq!(eval("=HOUR(E2)"), FormulaValue::Number(13.0));
        assert_eq!(eval("=MINUTE(E2)"), FormulaValue::Number(45.0));
        assert_eq!(eval("=SECOND(E2)"), FormulaValue::Number(30.0));
        assert_eq!(eval("=YEAR(x)"), FormulaValue::Error(CellError::Value));
        assert_eq!(eval("=YEAR(B1)"), FormulaValue::Error(CellError::Value));
        assert_eq!(eval("=YEAR(D2)"), FormulaValue::Error(CellError::Div0));
    }

    #[test]
    fn test_weekday() {
        // 2024-01-15 is a Monday
        assert_eq!(eval("=WEEKDAY(E1)"), FormulaValue::Number(2.0));
        assert_eq!(eval("=WEEKDAY(E1,2)"), FormulaValue::Number(1.0));
        assert_eq!(eval("=WEEKDAY(E1,3)"), FormulaValue::Number(0.0));
        assert_eq!(eval("=WEEKDAY(2024-01-14)"), FormulaValue::Number(1.0));
        assert_eq!(eval("=WEEKDAY(E1,9)"), FormulaValue::Error(CellError::Num));
    }

    #[test]
    fn test_datedif() {
        assert_eq!(eval("=DATEDIF(E4,E1,D)"), FormulaValue::Number(21.0));
        assert_eq!(eval("=DATEDIF(E4,E1,M)"), FormulaValue::Number(0.0));
        assert_eq!(
            eval(r#"=DATEDIF("2023-01-01","2024-03-01","M")"#),
            FormulaValue::Number(14.0)
        );
        assert_eq!(
            eval(r#"=DATEDIF("2023-01-01","2024-03-01","y")"#),
            FormulaValue::Number(1.0)
        );
        // floor, not truncation, when reversed
        assert_eq!(eval("=DATEDIF(E1,E4,D)"), FormulaValue::Number(-21.0));
        assert_eq!(eval("=DATEDIF(E1,E4,M)"), FormulaValue::Number(-1.0));
        assert_eq!(eval("=DATEDIF(E4,E1,W)"), FormulaValue::Error(CellError::Num));
    }

    #[test]
    fn test_networkdays() {
        assert_eq!(
            eval(r#"=NETWORKDAYS("2024-01-15","2024-01-19")"#),
            FormulaValue::Number(5.0)
        );
        assert_eq!(
            eval(r#"=NETWORKDAYS("2024-01-15","2024-01-21")"#),
            FormulaValue::Number(5.0)
        );
        assert_eq!(
            eval(r#"=NETWORKDAYS("2024-01-21","2024-01-15")"#),
            FormulaValue::Number(-5.0)
        );
        assert_eq!(
            eval(r#"=NETWORKDAYS("2024-01-15","2024-01-19","2024-01-17")"#),
            FormulaValue::Number(4.0)
        );
        assert_eq!(
            eval(r#"=NETWORKDAYS("2024-01-14","2024-01-21",E1:E4)"#),
            FormulaValue::Number(4.0)
        );
    }

    #[test]
    fn test_edate_eomonth() {
        assert_eq!(eval(r#"=EDATE("2024-01-31",1)"#), text("2024-02-29"));
        assert_eq!(eval("=EDATE(E3,-1)"), text("2024-02-29"));
        assert_eq!(eval("=EDATE(E1,12)"), text("2025-01-15"));
        assert_eq!(eval(r#"=EOMONTH("2024-01-15",1)"#), text("2024-02-29"));
        assert_eq!(eval("=EOMONTH(E1,0)"), text("2024-01-31"));
        assert_eq!(eval("=EOMONTH(E1,-1)"), text("2023-12-31"));
        assert_eq!(eval("=EDATE(x,1)"), FormulaValue::Error(CellError::Value));
    }

    #[test]
    fn test_month_shift_out_of_range() {
        assert_eq!(eval(r#"=EOMONTH("2024-01-15",1e300)"#), FormulaValue::Error(CellError::Num));
        assert_eq!(eval(r#"=EOMONTH("2024-01-15",-1e300)"#), FormulaValue::Error(CellError::Num));
        assert_eq!(eval(r#"=EDATE("2024-01-15",-1e300)"#), FormulaValue::Error(CellError::Num));
        assert_eq!(eval(r#"=EDATE("2024-01-15",9e18)"#), FormulaValue::Error(CellError::Num));
        // inside the shift bound but past the last representable year
        assert_eq!(eval("=EDATE(E1,6000000)"), FormulaValue::Error(CellError::Num));
        assert_eq!(eval("=EDATE(E1,12000)"), text("3024-01-15"));
    }

    #[test]
    fn test_networkdays_wide_range() {
        // 2024-01-01 is a Monday; 52 full weeks then Monday 2024-12-30
        assert_eq!(
            eval(r#"=NETWORKDAYS("2024-01-01","2024-12-30")"#),
            FormulaValue::Number(261.0)
        );
        assert_eq!(
            eval(r#"=NETWORKDAYS("0001-01-01","9999-12-31")"#),
            eval(r#"=NETWORKDAYS("0001-01-01","9999-12-31","2024-01-13")"#)
        );
        assert_eq!(
            eval(r#"=NETWORKDAYS("2024-01-20","2024-01-21")"#),
            FormulaValue::Number(0.0)
        );
    }
}
