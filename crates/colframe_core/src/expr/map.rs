use std::fmt::{self, Debug};
use std::sync::Arc;

use colframe_error::Result;

use super::{ExprRef, Expression, Input};
use crate::accumulator::object::ObjectAccumulator;
use crate::accumulator::primitive::Float64Accumulator;
use crate::accumulator::{Accumulator, new_accumulator};
use crate::frame::DataFrame;
use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;

type SeriesFn = dyn Fn(&Series) -> Result<Series> + Send + Sync;

/// Unary expression applying a series-to-series function to the result of
/// its input.
pub struct MapExp1 {
    op_name: String,
    datatype: DataType,
    input: ExprRef,
    op: Arc<SeriesFn>,
}

impl MapExp1 {
    pub fn new<F>(op_name: impl Into<String>, datatype: DataType, input: ExprRef, op: F) -> Self
    where
        F: Fn(&Series) -> Result<Series> + Send + Sync + 'static,
    {
        MapExp1 {
            op_name: op_name.into(),
            datatype,
            input,
            op: Arc::new(op),
        }
    }

    /// Build from a per-value function. Nulls map to null without calling
    /// `op`.
    pub fn map_val<F>(op_name: impl Into<String>, datatype: DataType, input: ExprRef, op: F) -> Self
    where
        F: Fn(&ScalarValue) -> Result<ScalarValue> + Send + Sync + 'static,
    {
        Self::new(op_name, datatype, input, move |series| {
            // Primitive storage can't hold nulls.
            let mut acc: Box<dyn Accumulator> = if series.null_count() == 0 {
                new_accumulator(datatype, series.len())
            } else {
                Box::new(ObjectAccumulator::with_datatype(datatype, series.len()))
            };
            for value in series.iter() {
                if value.is_null() {
                    acc.add(ScalarValue::Null)?;
                } else {
                    acc.add(op(&value)?)?;
                }
            }
            acc.to_series()
        })
    }

    fn eval_input(&self, input: Input<'_>) -> Result<Series> {
        let series = input.eval(self.input.as_ref())?;
        (self.op)(&series)
    }
}

impl Debug for MapExp1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapExp1")
            .field("op_name", &self.op_name)
            .field("datatype", &self.datatype)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

impl Expression for MapExp1 {
    fn name(&self) -> String {
        format!("{}({})", self.op_name, self.input.name())
    }

    fn datatype(&self) -> DataType {
        self.datatype
    }

    fn eval(&self, frame: &DataFrame) -> Result<Series> {
        self.eval_input(Input::Frame(frame))
    }

    fn eval_series(&self, series: &Series) -> Result<Series> {
        self.eval_input(Input::Series(series))
    }
}

/// Unary expressions producing doubles.
#[derive(Debug)]
pub struct DoubleExp1;

impl DoubleExp1 {
    /// Apply `op` to every non-null value as an `f64`, in a single pass over
    /// the column. Nulls stay null. Primitive input skips boxing entirely.
    pub fn map_val<F>(op_name: impl Into<String>, input: ExprRef, op: F) -> MapExp1
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        MapExp1::new(op_name, DataType::Float64, input, move |series| {
            let unboxed: Option<Vec<f64>> = match series {
                Series::Float64(s) => Some(s.iter().map(&op).collect()),
                Series::Int64(s) => Some(s.iter().map(|v| op(v as f64)).collect()),
                Series::Int32(s) => Some(s.iter().map(|v| op(v as f64)).collect()),
                _ => None,
            };
            if let Some(values) = unboxed {
                return Ok(Series::from(values));
            }

            if series.null_count() == 0 {
                let mut acc = Float64Accumulator::with_capacity(series.len());
                for value in series.iter() {
                    acc.add_f64(op(value.try_as_f64()?))?;
                }
                return acc.to_series();
            }

            series
                .iter()
                .map(|value| match value {
                    ScalarValue::Null => Ok(ScalarValue::Null),
                    other => Ok(ScalarValue::Float64(op(other.try_as_f64()?))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Series::from_values)
        })
    }
}
