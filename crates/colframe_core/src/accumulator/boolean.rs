use colframe_error::Result;

use super::{Accumulator, set_out_of_bounds, spent_error};
use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;
use crate::series::boolean::BooleanSeries;

/// Accumulator with unboxed boolean storage. Nulls are stored as `false`.
#[derive(Debug)]
pub struct BooleanAccumulator {
    values: Vec<bool>,
    spent: bool,
}

impl BooleanAccumulator {
    pub fn with_capacity(capacity: usize) -> Self {
        BooleanAccumulator {
            values: Vec::with_capacity(capacity),
            spent: false,
        }
    }

    pub fn with_len(len: usize) -> Self {
        BooleanAccumulator {
            values: vec![false; len],
            spent: false,
        }
    }

    pub fn to_boolean_series(&mut self) -> Result<BooleanSeries> {
        if self.spent {
            return Err(spent_error());
        }
        self.spent = true;
        Ok(BooleanSeries::new(std::mem::take(&mut self.values)))
    }

    fn coerce(value: &ScalarValue) -> Result<bool> {
        match value {
            ScalarValue::Null => Ok(false),
            other => other.try_as_bool(),
        }
    }
}

impl Accumulator for BooleanAccumulator {
    fn datatype(&self) -> DataType {
        DataType::Boolean
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn add(&mut self, value: ScalarValue) -> Result<()> {
        let v = Self::coerce(&value)?;
        self.add_bool(v)
    }

    fn set(&mut self, pos: usize, value: ScalarValue) -> Result<()> {
        let v = Self::coerce(&value)?;
        self.set_bool(pos, v)
    }

    fn add_bool(&mut self, value: bool) -> Result<()> {
        if self.spent {
            return Err(spent_error());
        }
        self.values.push(value);
        Ok(())
    }

    fn set_bool(&mut self, pos: usize, value: bool) -> Result<()> {
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

    fn to_series(&mut self) -> Result<Series> {
        self.to_boolean_series().map(Series::Boolean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_bools() {
        let mut acc = BooleanAccumulator::with_capacity(3);
        acc.add_bool(true).unwrap();
        acc.add(ScalarValue::Null).unwrap();
        acc.add(true.into()).unwrap();
        acc.add(1_i64.into()).unwrap_err();

        let s = acc.to_boolean_series().unwrap();
        assert_eq!(&[true, false, true], s.values());
    }
}
