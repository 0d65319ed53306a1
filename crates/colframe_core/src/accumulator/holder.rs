use std::fmt::Debug;

use colframe_error::Result;

use super::Accumulator;
use super::primitive::FromUnboxed;
use crate::scalar::ScalarValue;

/// Single mutable slot with the same typed get/set contract as an
/// accumulator.
///
/// Used as a scratch cell when converting a value before writing it into a
/// target accumulator.
pub trait ValueHolder: Debug + Send {
    fn get(&self) -> ScalarValue;

    fn set(&mut self, value: ScalarValue) -> Result<()>;

    /// Append the held value to `acc`.
    fn store(&self, acc: &mut dyn Accumulator) -> Result<()>;

    /// Write the held value into `acc` at `pos`.
    fn store_at(&self, pos: usize, acc: &mut dyn Accumulator) -> Result<()>;

    fn get_bool(&self) -> Result<bool> {
        self.get().try_as_bool()
    }

    fn get_i32(&self) -> Result<i32> {
        self.get().try_as_i32()
    }

    fn get_i64(&self) -> Result<i64> {
        self.get().try_as_i64()
    }

    fn get_f64(&self) -> Result<f64> {
        self.get().try_as_f64()
    }

    fn set_bool(&mut self, value: bool) -> Result<()> {
        self.set(ScalarValue::Boolean(value))
    }

    fn set_i32(&mut self, value: i32) -> Result<()> {
        self.set(ScalarValue::Int32(value))
    }

    fn set_i64(&mut self, value: i64) -> Result<()> {
        self.set(ScalarValue::Int64(value))
    }

    fn set_f64(&mut self, value: f64) -> Result<()> {
        self.set(ScalarValue::Float64(value))
    }
}

/// Unboxed writes of a primitive into an accumulator.
pub trait StoreUnboxed: FromUnboxed {
    fn add_to(self, acc: &mut dyn Accumulator) -> Result<()>;
    fn set_in(self, pos: usize, acc: &mut dyn Accumulator) -> Result<()>;
}

impl StoreUnboxed for i32 {
    fn add_to(self, acc: &mut dyn Accumulator) -> Result<()> {
        acc.add_i32(self)
    }

    fn set_in(self, pos: usize, acc: &mut dyn Accumulator) -> Result<()> {
        acc.set_i32(pos, self)
    }
}

impl StoreUnboxed for i64 {
    fn add_to(self, acc: &mut dyn Accumulator) -> Result<()> {
        acc.add_i64(self)
    }

    fn set_in(self, pos: usize, acc: &mut dyn Accumulator) -> Result<()> {
        acc.set_i64(pos, self)
    }
}

impl StoreUnboxed for f64 {
    fn add_to(self, acc: &mut dyn Accumulator) -> Result<()> {
        acc.add_f64(self)
    }

    fn set_in(self, pos: usize, acc: &mut dyn Accumulator) -> Result<()> {
        acc.set_f64(pos, self)
    }
}

/// Holder for an unboxed primitive. Setting null stores zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimitiveHolder<T> {
    value: T,
}

pub type Int32Holder = PrimitiveHolder<i32>;
pub type Int64Holder = PrimitiveHolder<i64>;
pub type Float64Holder = PrimitiveHolder<f64>;

impl<T: FromUnboxed> PrimitiveHolder<T> {
    pub fn new() -> Self {
        PrimitiveHolder {
            value: T::ZERO_VALUE,
        }
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn put(&mut self, value: T) {
        self.value = value;
    }
}

impl<T> ValueHolder for PrimitiveHolder<T>
where
    T: StoreUnboxed,
{
    fn get(&self) -> ScalarValue {
        self.value.into_scalar()
    }

    fn set(&mut self, value: ScalarValue) -> Result<()> {
        self.value = T::from_scalar(&value)?;
        Ok(())
    }

    fn store(&self, acc: &mut dyn Accumulator) -> Result<()> {
        self.value.add_to(acc)
    }

    fn store_at(&self, pos: usize, acc: &mut dyn Accumulator) -> Result<()> {
        self.value.set_in(pos, acc)
    }

    fn set_i32(&mut self, value: i32) -> Result<()> {
        self.value = T::from_i32(value)?;
        Ok(())
    }

    fn set_i64(&mut self, value: i64) -> Result<()> {
        self.value = T::from_i64(value)?;
        Ok(())
    }

    fn set_f64(&mut self, value: f64) -> Result<()> {
        self.value = T::from_f64(value)?;
        Ok(())
    }
}

/// Holder for a boolean. Setting null stores false.
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanHolder {
    value: bool,
}

impl ValueHolder for BooleanHolder {
    fn get(&self) -> ScalarValue {
        ScalarValue::Boolean(self.value)
    }

    fn set(&mut self, value: ScalarValue) -> Result<()> {
        self.value = match value {
            ScalarValue::Null => false,
            other => other.try_as_bool()?,
        };
        Ok(())
    }

    fn store(&self, acc: &mut dyn Accumulator) -> Result<()> {
        acc.add_bool(self.value)
    }

    fn store_at(&self, pos: usize, acc: &mut dyn Accumulator) -> Result<()> {
        acc.set_bool(pos, self.value)
    }

    fn get_bool(&self) -> Result<bool> {
        Ok(self.value)
    }

    fn set_bool(&mut self, value: bool) -> Result<()> {
        self.value = value;
        Ok(())
    }
}

/// Holder for any boxed value, null included.
#[derive(Debug, Default, Clone)]
pub struct ObjectHolder {
    value: ScalarValue,
}

impl ValueHolder for ObjectHolder {
    fn get(&self) -> ScalarValue {
        self.value.clone()
    }

    fn set(&mut self, value: ScalarValue) -> Result<()> {
        self.value = value;
        Ok(())
    }

    fn store(&self, acc: &mut dyn Accumulator) -> Result<()> {
        acc.add(self.value.clone())
    }

    fn store_at(&self, pos: usize, acc: &mut dyn Accumulator) -> Result<()> {
        acc.set(pos, self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::object::ObjectAccumulator;
    use crate::accumulator::primitive::Int64Accumulator;

    #[test]
    fn long_holder_null_is_zero() {
        let mut holder = Int64Holder::new();
        holder.set_i64(9).unwrap();
        holder.set(ScalarValue::Null).unwrap();
        assert_eq!(0, holder.get_i64().unwrap());
        assert_eq!(ScalarValue::Int64(0), holder.get());
    }

    #[test]
    fn store_into_accumulator() {
        let mut acc = Int64Accumulator::with_len(2);
        let mut holder = Int64Holder::new();

        holder.set_i64(7).unwrap();
        holder.store_at(1, &mut acc).unwrap();
        holder.set_i32(3).unwrap();
        holder.store(&mut acc).unwrap();

        let s = acc.to_primitive_series().unwrap();
        assert_eq!(&[0, 7, 3], s.values());
    }

    #[test]
    fn object_holder_keeps_null() {
        let mut acc = ObjectAccumulator::with_capacity(1);
        let holder = ObjectHolder::default();
        holder.store(&mut acc).unwrap();
        assert_eq!(&[ScalarValue::Null], acc.to_object_series().unwrap().values());
    }

    #[test]
    fn boolean_holder() {
        let mut holder = BooleanHolder::default();
        holder.set(true.into()).unwrap();
        assert!(holder.get_bool().unwrap());
        holder.set(ScalarValue::Int64(1)).unwrap_err();
    }
}
