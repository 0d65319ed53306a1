use colframe_error::Result;

use super::{Accumulator, set_out_of_bounds, spent_error};
use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;
use crate::series::object::ObjectSeries;

/// Accumulator storing boxed values, nulls included.
#[derive(Debug)]
pub struct ObjectAccumulator {
    /// Declared logical type. When `None`, the type is inferred from the
    /// values on `to_series`.
    datatype: Option<DataType>,
    values: Vec<ScalarValue>,
    spent: bool,
}

impl ObjectAccumulator {
    pub fn with_capacity(capacity: usize) -> Self {
        ObjectAccumulator {
            datatype: None,
            values: Vec::with_capacity(capacity),
            spent: false,
        }
    }

    pub fn with_datatype(datatype: DataType, capacity: usize) -> Self {
        ObjectAccumulator {
            datatype: Some(datatype),
            values: Vec::with_capacity(capacity),
            spent: false,
        }
    }

    /// Create an accumulator pre-filled with `len` nulls.
    pub fn with_len(len: usize) -> Self {
        ObjectAccumulator {
            datatype: None,
            values: vec![ScalarValue::Null; len],
            spent: false,
        }
    }

    pub fn to_object_series(&mut self) -> Result<ObjectSeries> {
        if self.spent {
            return Err(spent_error());
        }
        self.spent = true;
        let values = std::mem::take(&mut self.values);
        Ok(match self.datatype {
            Some(datatype) => ObjectSeries::with_datatype(datatype, values),
            None => ObjectSeries::new(values),
        })
    }
}

impl Accumulator for ObjectAccumulator {
    fn datatype(&self) -> DataType {
        self.datatype.unwrap_or(DataType::Any)
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn add(&mut self, value: ScalarValue) -> Result<()> {
        if self.spent {
            return Err(spent_error());
        }
        self.values.push(value);
        Ok(())
    }

    fn set(&mut self, pos: usize, value: ScalarValue) -> Result<()> {
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
        self.to_object_series().map(Series::Object)
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;

    #[test]
    fn keeps_nulls() {
        let mut acc = ObjectAccumulator::with_capacity(2);
        acc.add("x".into()).unwrap();
        acc.add(ScalarValue::Null).unwrap();

        let s = acc.to_object_series().unwrap();
        assert_eq!(&[ScalarValue::from("x"), ScalarValue::Null], s.values());
        assert_eq!(DataType::Utf8, s.datatype());

        assert_eq!(
            ErrorKind::IllegalState,
            acc.add(ScalarValue::Null).unwrap_err().kind()
        );
    }

    #[test]
    fn typed_adds_are_boxed() {
        let mut acc = ObjectAccumulator::with_len(2);
        acc.set_i64(1, 4).unwrap();
        let s = acc.to_series().unwrap();
        assert_eq!(vec![ScalarValue::Null, ScalarValue::Int64(4)], s.to_values());
    }
}
