//! Statistical functions
//!
//! All of these work on the numbers among the flattened arguments. Text,
//! booleans, blanks and error tokens inside ranges are ignored.

use super::criteria::CriteriaMatcher;
use super::{collect_numbers, flatten, number_arg, scalar_arg, try_cell};
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::{Argument, FormulaValue};
use mindgrid_core::CellError;

/// AVERAGE function (0 when there are no numbers)
pub fn fn_average(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let numbers = collect_numbers(args);
    if numbers.is_empty() {
        return Ok(FormulaValue::Number(0.0));
    }
    Ok(FormulaValue::Number(mean(&numbers)))
}

/// COUNT function - counts numbers
pub fn fn_count(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Number(collect_numbers(args).len() as f64))
}

/// COUNTA function - counts non-blank values, error tokens included
pub fn fn_counta(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let count = flatten(args).filter(|v| !v.is_blank()).count();
    Ok(FormulaValue::Number(count as f64))
}

/// MIN function (0 when there are no numbers)
pub fn fn_min(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let min = collect_numbers(args).into_iter().reduce(f64::min);
    Ok(FormulaValue::Number(min.unwrap_or(0.0)))
}

/// MAX function (0 when there are no numbers)
pub fn fn_max(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let max = collect_numbers(args).into_iter().reduce(f64::max);
    Ok(FormulaValue::Number(max.unwrap_or(0.0)))
}

/// MEDIAN function
pub fn fn_median(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let numbers = sorted(collect_numbers(args));
    let n = numbers.len();
    if n == 0 {
        return Ok(FormulaValue::Error(CellError::Num));
    }

    let median = if n % 2 == 1 {
        numbers[n / 2]
    } else {
        (numbers[n / 2 - 1] + numbers[n / 2]) / 2.0
    };
    Ok(FormulaValue::Number(median))
}

/// MODE function - the most frequent number
///
/// Ties go to the value that appears first. `#N/A` when nothing repeats.
pub fn fn_mode(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let numbers = collect_numbers(args);

    let mut best: Option<(f64, usize)> = None;
    for (i, &candidate) in numbers.iter().enumerate() {
        // count each distinct value once, at its first occurrence
        if numbers[..i].contains(&candidate) {
            continue;
        }
        let count = numbers.iter().filter(|&&n| n == candidate).count();
        if count > 1 && best.map_or(true, |(_, c)| count > c) {
            best = Some((candidate, count));
        }
    }

    Ok(match best {
        Some((mode, _)) => FormulaValue::Number(mode),
        None => FormulaValue::Error(CellError::Na),
    })
}

/// STDEV function - sample standard deviation
pub fn fn_stdev(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let variance = try_cell!(sample_variance(&collect_numbers(args)));
    Ok(FormulaValue::Number(variance.sqrt()))
}

/// VAR function - sample variance
pub fn fn_var(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let variance = try_cell!(sample_variance(&collect_numbers(args)));
    Ok(FormulaValue::Number(variance))
}

/// LARGE(array, k) - the k-th largest number
pub fn fn_large(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let mut numbers = sorted(collect_numbers(&args[..1]));
    numbers.reverse();
    let k = try_cell!(number_arg(args, 1, None));
    Ok(nth(&numbers, k))
}

/// SMALL(array, k) - the k-th smallest number
pub fn fn_small(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let numbers = sorted(collect_numbers(&args[..1]));
    let k = try_cell!(number_arg(args, 1, None));
    Ok(nth(&numbers, k))
}

/// PERCENTILE(array, k) - inclusive, linearly interpolated
pub fn fn_percentile(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let numbers = sorted(collect_numbers(&args[..1]));
    let k = try_cell!(number_arg(args, 1, None));

    if numbers.is_empty() || !(0.0..=1.0).contains(&k) {
        return Ok(FormulaValue::Error(CellError::Num));
    }

    let rank = k * (numbers.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Ok(FormulaValue::Number(
        numbers[lower] + (numbers[upper] - numbers[lower]) * fraction,
    ))
}

/// COUNTIF(range, criteria)
pub fn fn_countif(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let matcher = CriteriaMatcher::new(scalar_arg(args, 1).unwrap_or(&FormulaValue::Empty));
    let count = args[0].values().iter().filter(|v| matcher.matches(v)).count();
    Ok(FormulaValue::Number(count as f64))
}

/// AVERAGEIF(range, criteria, [average_range])
///
/// `#DIV/0!` when no matching cell holds a number.
pub fn fn_averageif(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let range = &args[0];
    let matcher = CriteriaMatcher::new(scalar_arg(args, 1).unwrap_or(&FormulaValue::Empty));
    let average_range = args.get(2).unwrap_or(range);

    let matched: Vec<f64> = range
        .values()
        .iter()
        .enumerate()
        .filter(|(_, v)| matcher.matches(v))
        .filter_map(|(i, _)| match average_range.values().get(i) {
            Some(FormulaValue::Number(n)) => Some(*n),
            _ => None,
        })
        .collect();

    if matched.is_empty() {
        return Ok(FormulaValue::Error(CellError::Div0));
    }
    Ok(FormulaValue::Number(mean(&matched)))
}

fn mean(numbers: &[f64]) -> f64 {
    numbers.iter().sum::<f64>() / numbers.len() as f64
}

fn sorted(mut numbers: Vec<f64>) -> Vec<f64> {
    numbers.sort_by(|a, b| a.total_cmp(b));
    numbers
}

/// Sample (n - 1) variance; `#DIV/0!` below two values
fn sample_variance(numbers: &[f64]) -> Result<f64, CellError> {
    if numbers.len() < 2 {
        return Err(CellError::Div0);
    }
    let avg = mean(numbers);
    let squares: f64 = numbers.iter().map(|n| (n - avg).powi(2)).sum();
    Ok(squares / (numbers.len() - 1) as f64)
}

/// 1-based pick from an ordered list; `#NUM!` when k is out of range
fn nth(ordered: &[f64], k: f64) -> FormulaValue {
    let k = k.ceil();
    if k < 1.0 || k > ordered.len() as f64 {
        return FormulaValue::Error(CellError::Num);
    }
    FormulaValue::Number(ordered[k as usize - 1])
}

#[cfg(test)]
mod tests {
    use crate::evaluator::tests::eval;
    use crate::value::FormulaValue;
    use mindgrid_core::CellError;
    use pretty_assertions::assert_eq;

    fn approx(value: FormulaValue, expected: f64) {
        match value {
            FormulaValue::Number(n) => assert!((n - expected).abs() < 1e-9, "{} != {}", n, expected),
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn test_average() {
        assert_eq!(eval("=AVERAGE(B1:B4)"), FormulaValue::Number(25.0));
        assert_eq!(eval("=AVERAGE(A1:A3)"), FormulaValue::Number(3.5));
        // no numbers at all
        assert_eq!(eval("=AVERAGE(C1:C4)"), FormulaValue::Number(0.0));
    }

    #[test]
    fn test_count_counta() {
        assert_eq!(eval("=COUNT(A1:A4)"), FormulaValue::Number(2.0));
        assert_eq!(eval("=COUNTA(A1:A4)"), FormulaValue::Number(3.0));
        // the error cell counts as a value
        assert_eq!(eval("=COUNTA(D1:D4)"), FormulaValue::Number(3.0));
        assert_eq!(eval(r#"=COUNTA(1,"",TRUE)"#), FormulaValue::Number(2.0));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(eval("=MIN(B1:B4,5)"), FormulaValue::Number(5.0));
        assert_eq!(eval("=MAX(B1:B4)"), FormulaValue::Number(40.0));
        assert_eq!(eval("=MIN(C1:C4)"), FormulaValue::Number(0.0));
        assert_eq!(eval("=MAX(C1:C4)"), FormulaValue::Number(0.0));
    }

    #[test]
    fn test_median_mode() {
        assert_eq!(eval("=MEDIAN(3,1,2)"), FormulaValue::Number(2.0));
        assert_eq!(eval("=MEDIAN(B1:B4)"), FormulaValue::Number(25.0));
        assert_eq!(eval("=MEDIAN(C1:C4)"), FormulaValue::Error(CellError::Num));
        assert_eq!(eval("=MODE(1,2,2,3,3)"), FormulaValue::Number(2.0));
        assert_eq!(eval("=MODE(1,2,3)"), FormulaValue::Error(CellError::Na));
    }

    #[test]
    fn test_stdev_var() {
        approx(eval("=VAR(2,4,4,4,5,5,7,9)"), 32.0 / 7.0);
        approx(eval("=STDEV(2,4,4,4,5,5,7,9)"), (32.0_f64 / 7.0).sqrt());
        assert_eq!(eval("=STDEV(5)"), FormulaValue::Error(CellError::Div0));
        assert_eq!(eval("=VAR(C1:C4)"), FormulaValue::Error(CellError::Div0));
    }

    #[test]
    fn test_large_small() {
        assert_eq!(eval("=LARGE(B1:B4,1)"), FormulaValue::Number(40.0));
        assert_eq!(eval("=LARGE(B1:B4,2)"), FormulaValue::Number(30.0));
        assert_eq!(eval("=SMALL(B1:B4,1)"), FormulaValue::Number(10.0));
        assert_eq!(eval("=SMALL(B1:B4,5)"), FormulaValue::Error(CellError::Num));
        assert_eq!(eval("=LARGE(B1:B4,0)"), FormulaValue::Error(CellError::Num));
    }

    #[test]
    fn test_percentile() {
        assert_eq!(eval("=PERCENTILE(B1:B4,0)"), FormulaValue::Number(10.0));
        assert_eq!(eval("=PERCENTILE(B1:B4,1)"), FormulaValue::Number(40.0));
        approx(eval("=PERCENTILE(B1:B4,0.5)"), 25.0);
        approx(eval("=PERCENTILE(B1:B4,0.25)"), 17.5);
        assert_eq!(eval("=PERCENTILE(B1:B4,1.5)"), FormulaValue::Error(CellError::Num));
    }

    #[test]
    fn test_countif_averageif() {
        assert_eq!(eval("=COUNTIF(C1:C4,apple)"), FormulaValue::Number(2.0));
        assert_eq!(eval(r#"=COUNTIF(B1:B4,">=20")"#), FormulaValue::Number(3.0));
        assert_eq!(eval(r#"=COUNTIF(C1:C4,"<>apple")"#), FormulaValue::Number(2.0));
        assert_eq!(eval("=AVERAGEIF(C1:C4,apple,B1:B4)"), FormulaValue::Number(20.0));
        assert_eq!(eval(r#"=AVERAGEIF(B1:B4,"<25")"#), FormulaValue::Number(15.0));
        assert_eq!(
            eval("=AVERAGEIF(C1:C4,kiwi,B1:B4)"),
            FormulaValue::Error(CellError::Div0)
        );
    }
}
