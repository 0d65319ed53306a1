use colframe_error::{DbError, Result};
use num_traits::{WrappingAdd, Zero};

use super::Aggregator;
use crate::scalar::decimal::Decimal;
use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;
use crate::series::object::ObjectSeries;

/// Sum of all non-null values.
///
/// Integers sum into `Int64` with wrapping overflow, floats into `Float64`
/// and decimals into `Decimal`. The sum of nothing is zero.
#[derive(Debug, Clone, Copy)]
pub struct Sum;

fn sum_wrapping<T: Zero + WrappingAdd>(values: impl Iterator<Item = T>) -> T {
    values.fold(T::zero(), |acc, v| acc.wrapping_add(&v))
}

fn sum_all<T: Zero>(values: impl Iterator<Item = T>) -> T {
    values.fold(T::zero(), |acc, v| acc + v)
}

impl Aggregator for Sum {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn aggregate(&self, series: &Series) -> Result<ScalarValue> {
        Ok(match series {
            Series::Int32(s) => ScalarValue::Int64(sum_wrapping(s.iter().map(i64::from))),
            Series::Int64(s) => ScalarValue::Int64(sum_wrapping(s.iter())),
            Series::Float64(s) => ScalarValue::Float64(sum_all(s.iter())),
            Series::Object(s) => sum_object(s)?,
            Series::Boolean(_) => {
                return Err(DbError::unsupported_conversion(
                    "Cannot sum a boolean series",
                ));
            }
        })
    }
}

fn sum_object(series: &ObjectSeries) -> Result<ScalarValue> {
    let non_null = || series.iter().filter(|v| !v.is_null());

    Ok(match series.datatype() {
        DataType::Decimal => ScalarValue::Decimal(sum_all(
            non_null()
                .map(|v| v.try_as_decimal())
                .collect::<Result<Vec<Decimal>>>()?
                .into_iter(),
        )),
        DataType::Float64 => ScalarValue::Float64(sum_all(
            non_null()
                .map(|v| v.try_as_f64())
                .collect::<Result<Vec<_>>>()?
                .into_iter(),
        )),
        _ if non_null().all(|v| matches!(v, ScalarValue::Int32(_) | ScalarValue::Int64(_))) => {
            ScalarValue::Int64(sum_wrapping(
                non_null()
                    .map(|v| v.try_as_i64())
                    .collect::<Result<Vec<_>>>()?
                    .into_iter(),
            ))
        }
        // Mixed numeric types.
        _ => ScalarValue::Float64(sum_all(
            non_null()
                .map(|v| v.try_as_f64())
                .collect::<Result<Vec<_>>>()?
                .into_iter(),
        )),
    })
}
