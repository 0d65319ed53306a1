//! Column aggregates.
//!
//! Every aggregator returns its identity on empty input instead of failing.

pub mod median;
pub mod stats;
pub mod sum;

use std::fmt::Debug;
use std::sync::Arc;

use colframe_error::Result;

use crate::expr::ExprRef;
use crate::frame::DataFrame;
use crate::scalar::ScalarValue;
use crate::series::Series;

pub trait Aggregator: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn aggregate(&self, series: &Series) -> Result<ScalarValue>;
}

/// Running state for aggregates computed one value at a time.
pub trait AggregateState: Default + Debug {
    fn update(&mut self, value: &ScalarValue) -> Result<()>;

    fn finalize(self) -> ScalarValue;
}

/// Drives a fresh [`AggregateState`] over every value of a series.
#[derive(Debug, Clone, Copy)]
pub struct SimpleAggregate<S> {
    name: &'static str,
    _state: std::marker::PhantomData<fn() -> S>,
}

impl<S: AggregateState> SimpleAggregate<S> {
    pub const fn new(name: &'static str) -> Self {
        SimpleAggregate {
            name,
            _state: std::marker::PhantomData,
        }
    }
}

impl<S: AggregateState> Aggregator for SimpleAggregate<S> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aggregate(&self, series: &Series) -> Result<ScalarValue> {
        let mut state = S::default();
        for value in series.iter() {
            state.update(&value)?;
        }
        Ok(state.finalize())
    }
}

/// An aggregator applied to the result of an expression.
#[derive(Debug, Clone)]
pub struct AggregateExpr {
    input: ExprRef,
    agg: Arc<dyn Aggregator>,
    name: String,
}

impl AggregateExpr {
    pub fn new(input: ExprRef, agg: impl Aggregator + 'static) -> Self {
        let name = format!("{}({})", agg.name(), input.name());
        AggregateExpr {
            input,
            agg: Arc::new(agg),
            name,
        }
    }

    /// Label the output column.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn eval(&self, frame: &DataFrame) -> Result<ScalarValue> {
        self.agg.aggregate(&self.input.eval(frame)?)
    }

    pub fn eval_series(&self, series: &Series) -> Result<ScalarValue> {
        self.agg.aggregate(&self.input.eval_series(series)?)
    }
}

pub fn sum(input: ExprRef) -> AggregateExpr {
    AggregateExpr::new(input, sum::Sum)
}

pub fn median(input: ExprRef) -> AggregateExpr {
    AggregateExpr::new(input, median::Median)
}

pub fn count(input: ExprRef) -> AggregateExpr {
    AggregateExpr::new(input, stats::Count)
}

pub fn count_non_null(input: ExprRef) -> AggregateExpr {
    AggregateExpr::new(input, stats::COUNT_NON_NULL)
}

pub fn count_true(input: ExprRef) -> AggregateExpr {
    AggregateExpr::new(input, stats::CountTrue)
}

pub fn count_false(input: ExprRef) -> AggregateExpr {
    AggregateExpr::new(input, stats::CountFalse)
}

pub fn min(input: ExprRef) -> AggregateExpr {
    AggregateExpr::new(input, stats::MIN)
}

pub fn max(input: ExprRef) -> AggregateExpr {
    AggregateExpr::new(input, stats::MAX)
}

pub fn avg(input: ExprRef) -> AggregateExpr {
    AggregateExpr::new(input, stats::AVG)
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;
    use crate::expr::arith::mul;
    use crate::expr::{col, lit};
    use crate::frame::testutil::{frame_of, rows_of};

    fn frame() -> DataFrame {
        frame_of(
            &["a", "b"],
            vec![
                vec![1_i64.into(), 2.5.into()],
                vec![2_i64.into(), ScalarValue::Null],
                vec![3_i64.into(), 0.5.into()],
            ],
        )
    }

    #[test]
    fn agg_frame() {
        let df = frame()
            .agg(&[sum(col("a")), avg(col("b")), count(col("b")).with_name("n")])
            .unwrap();

        assert_eq!(1, df.height().unwrap());
        let labels: Vec<_> = df.columns().labels().collect();
        assert_eq!(vec!["sum(a)", "avg(b)", "n"], labels);
        assert_eq!(
            vec![vec![ScalarValue::Int64(6), ScalarValue::Float64(1.5), ScalarValue::Int64(3)]],
            rows_of(&df)
        );
    }

    #[test]
    fn agg_over_expression() {
        let v = sum(mul(col("a"), lit(10_i64))).eval(&frame()).unwrap();
        assert_eq!(ScalarValue::Int64(60), v);
    }

    #[test]
    fn duplicate_output_names() {
        let err = frame().agg(&[sum(col("a")), sum(col("a"))]).unwrap_err();
        assert_eq!(ErrorKind::DuplicateName, err.kind());
    }
}
