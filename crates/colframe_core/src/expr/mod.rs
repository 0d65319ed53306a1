//! Column-at-a-time expressions.
//!
//! An expression is evaluated against a whole frame (or a single series) and
//! produces a series of the same height. Nulls propagate through value
//! computations and compare as false in conditions.

pub mod arith;
pub mod condition;
pub mod map;
pub mod sorter;

use std::fmt::Debug;
use std::sync::Arc;

use colframe_error::{DbError, Result};

use crate::builder::registry::ColumnRef;
use crate::frame::DataFrame;
use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;

pub type ExprRef = Arc<dyn Expression>;

pub trait Expression: Debug + Send + Sync {
    /// Label used for output columns.
    fn name(&self) -> String;

    /// Type of the produced series. `Any` when only known after evaluation.
    fn datatype(&self) -> DataType;

    fn eval(&self, frame: &DataFrame) -> Result<Series>;

    /// Evaluate with `series` standing in for every column reference.
    fn eval_series(&self, series: &Series) -> Result<Series>;
}

/// Reference to a frame column.
#[derive(Debug, Clone)]
pub struct Column {
    column: ColumnRef,
}

pub fn col(name: &str) -> ExprRef {
    Arc::new(Column {
        column: ColumnRef::from(name),
    })
}

pub fn col_at(pos: usize) -> ExprRef {
    Arc::new(Column {
        column: ColumnRef::Position(pos),
    })
}

impl Expression for Column {
    fn name(&self) -> String {
        self.column.to_string()
    }

    fn datatype(&self) -> DataType {
        DataType::Any
    }

    fn eval(&self, frame: &DataFrame) -> Result<Series> {
        frame.column(self.column.clone())
    }

    fn eval_series(&self, series: &Series) -> Result<Series> {
        Ok(series.clone())
    }
}

/// Constant value repeated for every row.
#[derive(Debug, Clone)]
pub struct Literal {
    value: ScalarValue,
}

pub fn lit(value: impl Into<ScalarValue>) -> ExprRef {
    Arc::new(Literal {
        value: value.into(),
    })
}

impl Literal {
    fn repeat(&self, len: usize) -> Series {
        Series::from_values(vec![self.value.clone(); len])
    }
}

impl Expression for Literal {
    fn name(&self) -> String {
        self.value.to_string()
    }

    fn datatype(&self) -> DataType {
        self.value.datatype()
    }

    fn eval(&self, frame: &DataFrame) -> Result<Series> {
        Ok(self.repeat(frame.height()?))
    }

    fn eval_series(&self, series: &Series) -> Result<Series> {
        Ok(self.repeat(series.len()))
    }
}

/// Evaluate both sides, checking they produce series of the same length.
pub(crate) fn eval_pair(
    left: &dyn Expression,
    right: &dyn Expression,
    input: Input<'_>,
) -> Result<(Series, Series)> {
    let l = input.eval(left)?;
    let r = input.eval(right)?;
    if l.len() != r.len() {
        return Err(DbError::shape_mismatch(format!(
            "Operands have different lengths: {} and {}",
            l.len(),
            r.len()
        )));
    }
    Ok((l, r))
}

/// What an expression is being evaluated against.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Input<'a> {
    Frame(&'a DataFrame),
    Series(&'a Series),
}

impl Input<'_> {
    pub(crate) fn eval(&self, expr: &dyn Expression) -> Result<Series> {
        match self {
            Self::Frame(frame) => expr.eval(frame),
            Self::Series(series) => expr.eval_series(series),
        }
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;
    use crate::frame::testutil::frame_of;

    #[test]
    fn column_refs() {
        let df = frame_of(&["a", "b"], vec![vec![1.into(), "x".into()], vec![2.into(), "y".into()]]);

        let s = col("b").eval(&df).unwrap();
        assert_eq!(vec![ScalarValue::from("x"), "y".into()], s.to_values());

        let s = col_at(0).eval(&df).unwrap();
        assert_eq!(&[1, 2], s.as_int32().unwrap().values());

        let err = col("c").eval(&df).unwrap_err();
        assert_eq!(ErrorKind::NameNotFound, err.kind());
    }

    #[test]
    fn literal_matches_height() {
        let df = frame_of(&["a"], vec![vec![1.into()], vec![2.into()], vec![3.into()]]);
        let s = lit(5_i64).eval(&df).unwrap();
        assert_eq!(&[5, 5, 5], s.as_int64().unwrap().values());
        assert_eq!(DataType::Int64, lit(5_i64).datatype());

        let s = lit("k").eval_series(&Series::from(vec![true])).unwrap();
        assert_eq!(vec![ScalarValue::from("k")], s.to_values());
    }
}
