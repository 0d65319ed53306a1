use colframe_error::{DbError, Result};

use super::{Accumulator, set_out_of_bounds, spent_error};
use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;
use crate::series::primitive::{PrimitiveSeries, PrimitiveType};

/// Conversions from unboxed inputs, so typed `add_*` calls never allocate a
/// scalar.
pub trait FromUnboxed: PrimitiveType {
    fn from_i32(v: i32) -> Result<Self>;
    fn from_i64(v: i64) -> Result<Self>;
    fn from_f64(v: f64) -> Result<Self>;
}

impl FromUnboxed for i32 {
    fn from_i32(v: i32) -> Result<Self> {
        Ok(v)
    }

    fn from_i64(v: i64) -> Result<Self> {
        i32::try_from(v).map_err(|_| {
            DbError::unsupported_conversion(format!("Int64 value {v} doesn't fit in Int32"))
        })
    }

    fn from_f64(v: f64) -> Result<Self> {
        Err(DbError::unsupported_conversion(format!(
            "Cannot store Float64 value {v} as Int32"
        )))
    }
}

impl FromUnboxed for i64 {
    fn from_i32(v: i32) -> Result<Self> {
        Ok(v as i64)
    }

    fn from_i64(v: i64) -> Result<Self> {
        Ok(v)
    }

    fn from_f64(v: f64) -> Result<Self> {
        Err(DbError::unsupported_conversion(format!(
            "Cannot store Float64 value {v} as Int64"
        )))
    }
}

impl FromUnboxed for f64 {
    fn from_i32(v: i32) -> Result<Self> {
        Ok(v as f64)
    }

    fn from_i64(v: i64) -> Result<Self> {
        Ok(v as f64)
    }

    fn from_f64(v: f64) -> Result<Self> {
        Ok(v)
    }
}

/// Accumulator with unboxed storage.
///
/// Null inputs are stored as the type's zero value.
#[derive(Debug)]
pub struct PrimitiveAccumulator<T> {
    values: Vec<T>,
    spent: bool,
}

pub type Int32Accumulator = PrimitiveAccumulator<i32>;
pub type Int64Accumulator = PrimitiveAccumulator<i64>;
pub type Float64Accumulator = PrimitiveAccumulator<f64>;

impl<T: FromUnboxed> PrimitiveAccumulator<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        PrimitiveAccumulator {
            values: Vec::with_capacity(capacity),
            spent: false,
        }
    }

    /// Create an accumulator pre-filled with `len` zeros, to be overwritten
    /// by position.
    pub fn with_len(len: usize) -> Self {
        PrimitiveAccumulator {
            values: vec![T::ZERO_VALUE; len],
            spent: false,
        }
    }

    /// Append an unboxed value.
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.spent {
            return Err(spent_error());
        }
        self.values.push(value);
        Ok(())
    }

    /// Overwrite an unboxed value.
    pub fn put(&mut self, pos: usize, value: T) -> Result<()> {
        if self.spent {
            return Err(spent_error());
        }
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(pos)
            .ok_or_else(|| set_out_of_bounds(pos, len))?;
        *slot = value;
        Ok(())
    }

    /// Produce the typed series, leaving the accumulator spent.
    pub fn to_primitive_series(&mut self) -> Result<PrimitiveSeries<T>> {
        if self.spent {
            return Err(spent_error());
        }
        self.spent = true;
        Ok(PrimitiveSeries::new(std::mem::take(&mut self.values)))
    }
}

impl<T> Accumulator for PrimitiveAccumulator<T>
where
    T: FromUnboxed,
    PrimitiveSeries<T>: Into<Series>,
{
    fn datatype(&self) -> DataType {
        T::DATATYPE
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn add(&mut self, value: ScalarValue) -> Result<()> {
        let v = T::from_scalar(&value)?;
        self.push(v)
    }

    fn set(&mut self, pos: usize, value: ScalarValue) -> Result<()> {
        let v = T::from_scalar(&value)?;
        self.put(pos, v)
    }

    fn add_i32(&mut self, value: i32) -> Result<()> {
        self.push(T::from_i32(value)?)
    }

    fn add_i64(&mut self, value: i64) -> Result<()> {
        self.push(T::from_i64(value)?)
    }

    fn add_f64(&mut self, value: f64) -> Result<()> {
        self.push(T::from_f64(value)?)
    }

    fn set_i32(&mut self, pos: usize, value: i32) -> Result<()> {
        self.put(pos, T::from_i32(value)?)
    }

    fn set_i64(&mut self, pos: usize, value: i64) -> Result<()> {
        self.put(pos, T::from_i64(value)?)
    }

    fn set_f64(&mut self, pos: usize, value: f64) -> Result<()> {
        self.put(pos, T::from_f64(value)?)
    }

    fn to_series(&mut self) -> Result<Series> {
        self.to_primitive_series().map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;

    #[test]
    fn null_becomes_zero() {
        let mut acc = Int64Accumulator::with_capacity(2);
        acc.add(ScalarValue::Null).unwrap();
        acc.add_i64(5).unwrap();
        let s = acc.to_primitive_series().unwrap();
        assert_eq!(&[0, 5], s.values());
    }

    #[test]
    fn set_by_position() {
        let mut acc = Int64Accumulator::with_len(3);
        acc.set_i64(2, 30).unwrap();
        acc.set(0, ScalarValue::Int32(10)).unwrap();
        acc.set(1, ScalarValue::Null).unwrap();

        assert_eq!(ErrorKind::IndexOutOfBounds, acc.set_i64(3, 1).unwrap_err().kind());

        let s = acc.to_series().unwrap();
        assert_eq!(&[10, 0, 30], s.as_int64().unwrap().values());
    }

    #[test]
    fn incompatible_value() {
        let mut acc = Int32Accumulator::with_capacity(1);
        let err = acc.add("a".into()).unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());

        let err = acc.add_f64(1.5).unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());
    }

    #[test]
    fn spent_after_to_series() {
        let mut acc = Float64Accumulator::with_capacity(1);
        acc.add_f64(1.0).unwrap();
        let s = acc.to_series().unwrap();

        assert_eq!(ErrorKind::IllegalState, acc.add_f64(2.0).unwrap_err().kind());
        assert_eq!(ErrorKind::IllegalState, acc.to_series().unwrap_err().kind());

        // Published data unaffected.
        assert_eq!(&[1.0], s.as_float64().unwrap().values());
    }
}
