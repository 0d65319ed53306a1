use std::cmp::Ordering;

use colframe_error::{DbError, Result};

use super::{AggregateState, Aggregator, SimpleAggregate};
use crate::scalar::ScalarValue;
use crate::series::Series;

pub const COUNT_NON_NULL: SimpleAggregate<CountNonNullState> = SimpleAggregate::new("count_non_null");
pub const MIN: SimpleAggregate<MinMaxState<Min>> = SimpleAggregate::new("min");
pub const MAX: SimpleAggregate<MinMaxState<Max>> = SimpleAggregate::new("max");
pub const AVG: SimpleAggregate<AvgState> = SimpleAggregate::new("avg");

/// Number of values, nulls included.
#[derive(Debug, Clone, Copy)]
pub struct Count;

impl Aggregator for Count {
    fn name(&self) -> &'static str {
        "count"
    }

    fn aggregate(&self, series: &Series) -> Result<ScalarValue> {
        Ok(ScalarValue::Int64(series.len() as i64))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CountTrue;

impl Aggregator for CountTrue {
    fn name(&self) -> &'static str {
        "count_true"
    }

    fn aggregate(&self, series: &Series) -> Result<ScalarValue> {
        count_bool(series, true)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CountFalse;

impl Aggregator for CountFalse {
    fn name(&self) -> &'static str {
        "count_false"
    }

    fn aggregate(&self, series: &Series) -> Result<ScalarValue> {
        count_bool(series, false)
    }
}

/// Count values equal to `want`. Nulls match neither.
fn count_bool(series: &Series, want: bool) -> Result<ScalarValue> {
    let count = match series {
        Series::Boolean(s) if want => s.count_true(),
        Series::Boolean(s) => s.count_false(),
        other => {
            let mut count = 0;
            for value in other.iter() {
                match value {
                    ScalarValue::Null => (),
                    ScalarValue::Boolean(v) if v == want => count += 1,
                    ScalarValue::Boolean(_) => (),
                    v => {
                        return Err(DbError::unsupported_conversion(format!(
                            "Cannot count booleans over {} value '{v}'",
                            v.datatype()
                        )));
                    }
                }
            }
            count
        }
    };
    Ok(ScalarValue::Int64(count as i64))
}

#[derive(Debug, Default)]
pub struct CountNonNullState {
    count: i64,
}

impl AggregateState for CountNonNullState {
    fn update(&mut self, value: &ScalarValue) -> Result<()> {
        if !value.is_null() {
            self.count += 1;
        }
        Ok(())
    }

    fn finalize(self) -> ScalarValue {
        ScalarValue::Int64(self.count)
    }
}

pub trait MinMaxOperation: Default + std::fmt::Debug {
    /// Whether `candidate` replaces `current`.
    fn replaces(ord: Ordering) -> bool;
}

#[derive(Debug, Default)]
pub struct Min;

impl MinMaxOperation for Min {
    fn replaces(ord: Ordering) -> bool {
        ord.is_lt()
    }
}

#[derive(Debug, Default)]
pub struct Max;

impl MinMaxOperation for Max {
    fn replaces(ord: Ordering) -> bool {
        ord.is_gt()
    }
}

/// Smallest or largest non-null value. Null when there is none.
#[derive(Debug, Default)]
pub struct MinMaxState<O> {
    current: Option<ScalarValue>,
    _op: O,
}

impl<O: MinMaxOperation> AggregateState for MinMaxState<O> {
    fn update(&mut self, value: &ScalarValue) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        match &self.current {
            Some(current) if !O::replaces(value.total_cmp(current)) => (),
            _ => self.current = Some(value.clone()),
        }
        Ok(())
    }

    fn finalize(self) -> ScalarValue {
        self.current.unwrap_or_default()
    }
}

/// Mean of the non-null values as a `Float64`. Zero when there are none.
#[derive(Debug, Default)]
pub struct AvgState {
    sum: f64,
    count: u64,
}

impl AggregateState for AvgState {
    fn update(&mut self, value: &ScalarValue) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        self.sum += value.try_as_f64()?;
        self.count += 1;
        Ok(())
    }

    fn finalize(self) -> ScalarValue {
        if self.count == 0 {
            return ScalarValue::Float64(0.0);
        }
        ScalarValue::Float64(self.sum / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bools() -> Series {
        Series::from(vec![true, false, true, false, true])
    }

    #[test]
    fn count_booleans() {
        assert_eq!(ScalarValue::Int64(3), CountTrue.aggregate(&bools()).unwrap());
        assert_eq!(ScalarValue::Int64(2), CountFalse.aggregate(&bools()).unwrap());

        let boxed = Series::from_values(vec![true.into(), ScalarValue::Null, false.into()]);
        assert_eq!(ScalarValue::Int64(1), CountTrue.aggregate(&boxed).unwrap());
        assert_eq!(ScalarValue::Int64(1), CountFalse.aggregate(&boxed).unwrap());

        CountTrue.aggregate(&Series::from(vec![1_i64])).unwrap_err();
        assert_eq!(ScalarValue::Int64(0), CountTrue.aggregate(&Series::empty()).unwrap());
    }

    #[test]
    fn counts() {
        let s = Series::from_values(vec![1_i64.into(), ScalarValue::Null, 3_i64.into()]);
        assert_eq!(ScalarValue::Int64(3), Count.aggregate(&s).unwrap());
        assert_eq!(ScalarValue::Int64(2), COUNT_NON_NULL.aggregate(&s).unwrap());
    }

    #[test]
    fn min_max() {
        let s = Series::from_values(vec![ScalarValue::Null, 5_i64.into(), 2_i64.into(), 9_i64.into()]);
        assert_eq!(ScalarValue::Int64(2), MIN.aggregate(&s).unwrap());
        assert_eq!(ScalarValue::Int64(9), MAX.aggregate(&s).unwrap());

        let s = Series::from_values(vec!["b".into(), "a".into(), "c".into()]);
        assert_eq!(ScalarValue::from("a"), MIN.aggregate(&s).unwrap());

        assert_eq!(ScalarValue::Null, MAX.aggregate(&Series::empty()).unwrap());
    }

    #[test]
    fn avg() {
        let s = Series::from(vec![1_i32, 2, 6]);
        assert_eq!(ScalarValue::Float64(3.0), AVG.aggregate(&s).unwrap());
        assert_eq!(ScalarValue::Float64(0.0), AVG.aggregate(&Series::empty()).unwrap());
        AVG.aggregate(&Series::from_values(vec!["x".into()])).unwrap_err();
    }
}
