use colframe_error::Result;

use super::Aggregator;
use crate::expr::condition::{eval_mask, is_not_null};
use crate::expr::col_at;
use crate::expr::sorter::Sorter;
use crate::scalar::decimal::Decimal;
use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;

/// Median of the non-null values.
///
/// With an even count the result is the mean of the two middle values.
/// Decimals stay decimals, rounding the mean HALF_UP at the scale of the
/// difference between the middle values. Everything else produces a
/// `Float64`. No values produce zero.
#[derive(Debug, Clone, Copy)]
pub struct Median;

impl Aggregator for Median {
    fn name(&self) -> &'static str {
        "median"
    }

    fn aggregate(&self, series: &Series) -> Result<ScalarValue> {
        match series {
            Series::Int32(s) => {
                let mut values: Vec<f64> = s.iter().map(f64::from).collect();
                Ok(median_f64(&mut values))
            }
            Series::Int64(s) => {
                let mut values: Vec<f64> = s.iter().map(|v| v as f64).collect();
                Ok(median_f64(&mut values))
            }
            Series::Float64(s) => Ok(median_f64(&mut s.values().to_vec())),
            other => median_boxed(other),
        }
    }
}

fn median_f64(values: &mut [f64]) -> ScalarValue {
    values.sort_by(f64::total_cmp);

    let len = values.len();
    let m = len / 2;
    let median = match len {
        0 => 0.0,
        _ if len % 2 == 1 => values[m],
        _ => (values[m - 1] + values[m]) / 2.0,
    };
    ScalarValue::Float64(median)
}

fn median_decimal(values: &[Decimal]) -> ScalarValue {
    let len = values.len();
    let m = len / 2;
    let median = match len {
        0 => Decimal::ZERO,
        _ if len % 2 == 1 => values[m],
        _ => {
            let (d1, d2) = (values[m - 1], values[m]);
            d1 + (d2 - d1).half_round_half_up()
        }
    };
    ScalarValue::Decimal(median)
}

fn median_boxed(series: &Series) -> Result<ScalarValue> {
    let mask = eval_mask(is_not_null(col_at(0)).as_ref(), series)?;
    let non_null = series.select_mask(&mask)?;
    let sorted = Sorter::asc(col_at(0)).sort_series(&non_null)?;

    if series.datatype() == DataType::Decimal {
        let values = sorted
            .iter()
            .map(|v| v.try_as_decimal())
            .collect::<Result<Vec<_>>>()?;
        return Ok(median_decimal(&values));
    }

    let mut values = sorted
        .iter()
        .map(|v| v.try_as_f64())
        .collect::<Result<Vec<_>>>()?;
    Ok(median_f64(&mut values))
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;
    use crate::series::object::ObjectSeries;

    fn median(values: Vec<ScalarValue>) -> ScalarValue {
        Median.aggregate(&Series::from_values(values)).unwrap()
    }

    #[test]
    fn odd_and_even() {
        assert_eq!(
            ScalarValue::Float64(20.0),
            Median.aggregate(&Series::from(vec![30_i64, 10, 20])).unwrap()
        );
        assert_eq!(
            ScalarValue::Float64(15.0),
            Median.aggregate(&Series::from(vec![10_i64, 20])).unwrap()
        );
        assert_eq!(
            ScalarValue::Float64(2.5),
            Median.aggregate(&Series::from(vec![4.0, 1.0, 2.0, 3.0])).unwrap()
        );
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(ScalarValue::Float64(0.0), Median.aggregate(&Series::empty()).unwrap());
        assert_eq!(
            ScalarValue::Float64(0.0),
            median(vec![ScalarValue::Null, ScalarValue::Null])
        );

        let decimals = ObjectSeries::with_datatype(DataType::Decimal, Vec::new());
        assert_eq!(
            ScalarValue::Decimal(Decimal::ZERO),
            Median.aggregate(&Series::Object(decimals)).unwrap()
        );
    }

    #[test]
    fn nulls_are_ignored() {
        assert_eq!(
            ScalarValue::Float64(20.0),
            median(vec![ScalarValue::Null, 10_i64.into(), 30_i64.into()])
        );
        assert_eq!(
            ScalarValue::Float64(7.0),
            median(vec![7_i64.into(), ScalarValue::Null])
        );
    }

    #[test]
    fn decimal_half_up() {
        let d = |s: &str| ScalarValue::Decimal(Decimal::parse(s).unwrap());

        assert_eq!(d("2.0"), median(vec![d("3.0"), d("1.0"), d("2.0")]));
        assert_eq!(d("1.5"), median(vec![d("1.0"), d("2.0")]));
        // (1.3 - 1.0) / 2 = 0.15, rounded to 0.2 at scale 1.
        assert_eq!(d("1.2"), median(vec![d("1.3"), ScalarValue::Null, d("1.0")]));
        assert_eq!(d("5"), median(vec![d("5")]));
    }

    #[test]
    fn non_numeric() {
        let err = Median
            .aggregate(&Series::from_values(vec!["a".into(), "b".into()]))
            .unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());
    }
}
