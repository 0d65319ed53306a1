//! Append-only builders that turn row-at-a-time input into series.
//!
//! An accumulator is single-writer. Once `to_series` is called it's spent:
//! the backing storage is moved into the emitted series and every further
//! call errors.

pub mod boolean;
pub mod holder;
pub mod object;
pub mod primitive;

use std::fmt::Debug;

use boolean::BooleanAccumulator;
use colframe_error::{DbError, Result};
use object::ObjectAccumulator;
use primitive::PrimitiveAccumulator;

use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;

pub trait Accumulator: Debug + Send {
    /// Logical type of the series this accumulator produces.
    fn datatype(&self) -> DataType;

    /// Number of values accumulated so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a boxed value.
    fn add(&mut self, value: ScalarValue) -> Result<()>;

    /// Overwrite the value at `pos`.
    fn set(&mut self, pos: usize, value: ScalarValue) -> Result<()>;

    fn add_bool(&mut self, value: bool) -> Result<()> {
        self.add(ScalarValue::Boolean(value))
    }

    fn add_i32(&mut self, value: i32) -> Result<()> {
        self.add(ScalarValue::Int32(value))
    }

    fn add_i64(&mut self, value: i64) -> Result<()> {
        self.add(ScalarValue::Int64(value))
    }

    fn add_f64(&mut self, value: f64) -> Result<()> {
        self.add(ScalarValue::Float64(value))
    }

    fn set_bool(&mut self, pos: usize, value: bool) -> Result<()> {
        self.set(pos, ScalarValue::Boolean(value))
    }

    fn set_i32(&mut self, pos: usize, value: i32) -> Result<()> {
        self.set(pos, ScalarValue::Int32(value))
    }

    fn set_i64(&mut self, pos: usize, value: i64) -> Result<()> {
        self.set(pos, ScalarValue::Int64(value))
    }

    fn set_f64(&mut self, pos: usize, value: f64) -> Result<()> {
        self.set(pos, ScalarValue::Float64(value))
    }

    /// Produce the series, leaving the accumulator spent.
    fn to_series(&mut self) -> Result<Series>;
}

/// Create an accumulator producing the given logical type.
///
/// Primitive types get unboxed storage, everything else is stored boxed.
pub fn new_accumulator(datatype: DataType, capacity: usize) -> Box<dyn Accumulator> {
    match datatype {
        DataType::Boolean => Box::new(BooleanAccumulator::with_capacity(capacity)),
        DataType::Int32 => Box::new(PrimitiveAccumulator::<i32>::with_capacity(capacity)),
        DataType::Int64 => Box::new(PrimitiveAccumulator::<i64>::with_capacity(capacity)),
        DataType::Float64 => Box::new(PrimitiveAccumulator::<f64>::with_capacity(capacity)),
        other => Box::new(ObjectAccumulator::with_datatype(other, capacity)),
    }
}

pub(crate) fn spent_error() -> DbError {
    DbError::illegal_state("Accumulator already produced its series")
}

pub(crate) fn set_out_of_bounds(pos: usize, len: usize) -> DbError {
    DbError::out_of_bounds(format!(
        "Cannot set position {pos} in accumulator of length {len}"
    ))
}
