//! Builders that turn raw string fields into typed series.
//!
//! A builder pairs a converter with an accumulator. Which builder is used for
//! which column is decided by [`registry::ColumnBuilders`], and
//! [`ingest::FrameIngest`] drives one builder per column to assemble a frame.

pub mod ingest;
pub mod registry;

use std::fmt::Debug;
use std::sync::Arc;

use colframe_error::Result;

use crate::accumulator::Accumulator;
use crate::accumulator::boolean::BooleanAccumulator;
use crate::accumulator::holder::{
    BooleanHolder,
    Float64Holder,
    Int32Holder,
    Int64Holder,
    ValueHolder,
};
use crate::accumulator::object::ObjectAccumulator;
use crate::accumulator::primitive::{Float64Accumulator, Int32Accumulator, Int64Accumulator};
use crate::convert::{StringConverter, ValueMapper};
use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;

pub trait SeriesBuilder: Debug + Send {
    /// Logical type of the produced series.
    fn datatype(&self) -> DataType;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert a raw field into the value this builder would store.
    fn convert(&self, raw: &str) -> Result<ScalarValue>;

    /// Check that `value` can be appended without failing.
    fn check_value(&self, _value: &ScalarValue) -> Result<()> {
        Ok(())
    }

    /// Convert and append a raw field.
    fn append(&mut self, raw: &str) -> Result<()> {
        let value = self.convert(raw)?;
        self.append_value(value)
    }

    /// Append an already converted value.
    fn append_value(&mut self, value: ScalarValue) -> Result<()>;

    /// Produce the series. The builder can't be used afterwards.
    fn to_series(&mut self) -> Result<Series>;
}

/// Keeps raw fields as strings. Values appended directly keep their own
/// type.
#[derive(Debug)]
pub struct NoTransformSeriesBuilder {
    acc: ObjectAccumulator,
}

impl NoTransformSeriesBuilder {
    pub fn new(capacity: usize) -> Self {
        NoTransformSeriesBuilder {
            acc: ObjectAccumulator::with_capacity(capacity),
        }
    }
}

impl SeriesBuilder for NoTransformSeriesBuilder {
    fn datatype(&self) -> DataType {
        DataType::Utf8
    }

    fn len(&self) -> usize {
        self.acc.len()
    }

    fn convert(&self, raw: &str) -> Result<ScalarValue> {
        Ok(raw.into())
    }

    fn append_value(&mut self, value: ScalarValue) -> Result<()> {
        self.acc.add(value)
    }

    fn to_series(&mut self) -> Result<Series> {
        self.acc.to_series()
    }
}

/// Converts each field through a [`ValueMapper`], keeping nulls.
#[derive(Debug)]
pub struct TransformingSeriesBuilder {
    mapper: Arc<dyn ValueMapper>,
    acc: ObjectAccumulator,
}

impl TransformingSeriesBuilder {
    pub fn new(mapper: Arc<dyn ValueMapper>, capacity: usize) -> Self {
        let acc = ObjectAccumulator::with_datatype(mapper.datatype(), capacity);
        TransformingSeriesBuilder { mapper, acc }
    }
}

impl SeriesBuilder for TransformingSeriesBuilder {
    fn datatype(&self) -> DataType {
        self.mapper.datatype()
    }

    fn len(&self) -> usize {
        self.acc.len()
    }

    fn convert(&self, raw: &str) -> Result<ScalarValue> {
        self.mapper.map(raw)
    }

    fn append_value(&mut self, value: ScalarValue) -> Result<()> {
        self.acc.add(value)
    }

    fn to_series(&mut self) -> Result<Series> {
        self.acc.to_series()
    }
}

/// Converts each field into an unboxed primitive.
///
/// Values pass through a holder before landing in the accumulator, so nulls
/// (empty fields) become the zero value.
#[derive(Debug)]
pub struct UnboxedSeriesBuilder<H, A> {
    converter: StringConverter,
    holder: H,
    acc: A,
}

pub type IntSeriesBuilder = UnboxedSeriesBuilder<Int32Holder, Int32Accumulator>;
pub type LongSeriesBuilder = UnboxedSeriesBuilder<Int64Holder, Int64Accumulator>;
pub type DoubleSeriesBuilder = UnboxedSeriesBuilder<Float64Holder, Float64Accumulator>;
pub type BooleanSeriesBuilder = UnboxedSeriesBuilder<BooleanHolder, BooleanAccumulator>;

impl IntSeriesBuilder {
    pub fn new(capacity: usize) -> Self {
        UnboxedSeriesBuilder {
            converter: StringConverter::Int32,
            holder: Int32Holder::new(),
            acc: Int32Accumulator::with_capacity(capacity),
        }
    }
}

impl LongSeriesBuilder {
    pub fn new(capacity: usize) -> Self {
        UnboxedSeriesBuilder {
            converter: StringConverter::Int64,
            holder: Int64Holder::new(),
            acc: Int64Accumulator::with_capacity(capacity),
        }
    }
}

impl DoubleSeriesBuilder {
    pub fn new(capacity: usize) -> Self {
        UnboxedSeriesBuilder {
            converter: StringConverter::Float64,
            holder: Float64Holder::new(),
            acc: Float64Accumulator::with_capacity(capacity),
        }
    }
}

impl BooleanSeriesBuilder {
    pub fn new(capacity: usize) -> Self {
        UnboxedSeriesBuilder {
            converter: StringConverter::Boolean,
            holder: BooleanHolder::default(),
            acc: BooleanAccumulator::with_capacity(capacity),
        }
    }
}

impl<H, A> SeriesBuilder for UnboxedSeriesBuilder<H, A>
where
    H: ValueHolder + Clone,
    A: Accumulator,
{
    fn datatype(&self) -> DataType {
        self.acc.datatype()
    }

    fn len(&self) -> usize {
        self.acc.len()
    }

    fn convert(&self, raw: &str) -> Result<ScalarValue> {
        let value = self.converter.map(raw)?;
        self.check_value(&value)?;
        Ok(value)
    }

    fn check_value(&self, value: &ScalarValue) -> Result<()> {
        let mut scratch = self.holder.clone();
        scratch.set(value.clone())
    }

    fn append_value(&mut self, value: ScalarValue) -> Result<()> {
        self.holder.set(value)?;
        self.holder.store(&mut self.acc)
    }

    fn to_series(&mut self) -> Result<Series> {
        self.acc.to_series()
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;
    use crate::convert::FnMapper;

    #[test]
    fn no_transform_keeps_strings() {
        let mut b = NoTransformSeriesBuilder::new(2);
        b.append("1").unwrap();
        b.append("").unwrap();
        let s = b.to_series().unwrap();
        assert_eq!(vec![ScalarValue::from("1"), ScalarValue::from("")], s.to_values());
        assert_eq!(DataType::Utf8, s.datatype());
    }

    #[test]
    fn transforming_keeps_nulls() {
        let mut b = TransformingSeriesBuilder::new(Arc::new(StringConverter::Int64), 3);
        b.append("5").unwrap();
        b.append("").unwrap();
        b.append("-1").unwrap();

        let s = b.to_series().unwrap();
        assert_eq!(DataType::Int64, s.datatype());
        assert_eq!(
            vec![ScalarValue::Int64(5), ScalarValue::Null, ScalarValue::Int64(-1)],
            s.to_values()
        );
    }

    #[test]
    fn transforming_custom_mapper() {
        let mapper = FnMapper::new(DataType::Utf8, |s| Ok(s.to_uppercase().into()));
        let mut b = TransformingSeriesBuilder::new(Arc::new(mapper), 1);
        b.append("ab").unwrap();
        assert_eq!(vec![ScalarValue::from("AB")], b.to_series().unwrap().to_values());
    }

    #[test]
    fn int_builder_is_unboxed() {
        let mut b = IntSeriesBuilder::new(3);
        b.append("7").unwrap();
        b.append("").unwrap();
        b.append_value(ScalarValue::Int32(2)).unwrap();

        let s = b.to_series().unwrap();
        assert_eq!(&[7, 0, 2], s.as_int32().unwrap().values());
    }

    #[test]
    fn long_and_double_builders() {
        let mut b = LongSeriesBuilder::new(1);
        b.append("9000000000").unwrap();
        assert_eq!(&[9_000_000_000], b.to_series().unwrap().as_int64().unwrap().values());

        let mut b = DoubleSeriesBuilder::new(2);
        b.append("2.5").unwrap();
        b.append("").unwrap();
        assert_eq!(&[2.5, 0.0], b.to_series().unwrap().as_float64().unwrap().values());
    }

    #[test]
    fn boolean_builder() {
        let mut b = BooleanSeriesBuilder::new(3);
        b.append("true").unwrap();
        b.append("FALSE").unwrap();
        b.append("").unwrap();
        let s = b.to_series().unwrap();
        assert_eq!(&[true, false, false], s.as_boolean().unwrap().values());
    }

    #[test]
    fn bad_field() {
        let mut b = IntSeriesBuilder::new(1);
        let err = b.append("x").unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());
    }

    #[test]
    fn convert_leaves_builder_untouched() {
        let b = IntSeriesBuilder::new(1);
        assert_eq!(ScalarValue::Int32(4), b.convert("4").unwrap());
        b.convert("x").unwrap_err();
        b.check_value(&ScalarValue::from("x")).unwrap_err();
        b.check_value(&ScalarValue::Null).unwrap();
        assert!(b.is_empty());
    }
}
