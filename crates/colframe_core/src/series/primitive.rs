use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::Arc;

use colframe_error::{DbError, Result};

use super::boolean::BooleanSeries;
use super::selection::SelectionVector;
use super::{check_copy_range, check_mask_len, out_of_bounds};
use crate::scalar::{DataType, ScalarValue};

/// A primitive type that can be stored unboxed in a series.
///
/// Primitive storage has no null representation. Converting a null scalar
/// into a primitive yields the type's zero value.
pub trait PrimitiveType: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    const DATATYPE: DataType;
    const ZERO_VALUE: Self;

    fn into_scalar(self) -> ScalarValue;

    /// Convert a scalar into this type. Nulls become `ZERO_VALUE`.
    fn from_scalar(value: &ScalarValue) -> Result<Self>;

    fn total_cmp(&self, other: &Self) -> Ordering;
}

impl PrimitiveType for i32 {
    const DATATYPE: DataType = DataType::Int32;
    const ZERO_VALUE: Self = 0;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Int32(self)
    }

    fn from_scalar(value: &ScalarValue) -> Result<Self> {
        match value {
            ScalarValue::Null => Ok(Self::ZERO_VALUE),
            other => other.try_as_i32(),
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl PrimitiveType for i64 {
    const DATATYPE: DataType = DataType::Int64;
    const ZERO_VALUE: Self = 0;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Int64(self)
    }

    fn from_scalar(value: &ScalarValue) -> Result<Self> {
        match value {
            ScalarValue::Null => Ok(Self::ZERO_VALUE),
            other => other.try_as_i64(),
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl PrimitiveType for f64 {
    const DATATYPE: DataType = DataType::Float64;
    const ZERO_VALUE: Self = 0.0;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Float64(self)
    }

    fn from_scalar(value: &ScalarValue) -> Result<Self> {
        match value {
            ScalarValue::Null => Ok(Self::ZERO_VALUE),
            other => other.try_as_f64(),
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }
}

/// Series of unboxed primitive values.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSeries<T> {
    values: Arc<[T]>,
}

pub type Int32Series = PrimitiveSeries<i32>;
pub type Int64Series = PrimitiveSeries<i64>;
pub type Float64Series = PrimitiveSeries<f64>;

impl<T: PrimitiveType> PrimitiveSeries<T> {
    pub fn new(values: Vec<T>) -> Self {
        PrimitiveSeries {
            values: values.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the unboxed value at `idx`.
    pub fn value(&self, idx: usize) -> Result<T> {
        self.values
            .get(idx)
            .copied()
            .ok_or_else(|| out_of_bounds(idx, self.len()))
    }

    /// Get the boxed value at `idx`.
    pub fn get(&self, idx: usize) -> Result<ScalarValue> {
        self.value(idx).map(T::into_scalar)
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = T> + '_ {
        self.values.iter().copied()
    }

    /// Copy `len` values starting at `src_pos` into `dst` starting at
    /// `dst_pos`.
    pub fn copy_to(&self, dst: &mut [T], src_pos: usize, dst_pos: usize, len: usize) -> Result<()> {
        check_copy_range(self.len(), src_pos, dst.len(), dst_pos, len)?;
        dst[dst_pos..dst_pos + len].copy_from_slice(&self.values[src_pos..src_pos + len]);
        Ok(())
    }

    pub fn take(&self, selection: &SelectionVector) -> Result<Self> {
        let values = selection
            .iter_locations()
            .map(|idx| self.value(idx))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(values))
    }

    /// Keep values for which `pred` returns true, preserving order.
    pub fn select(&self, mut pred: impl FnMut(T) -> bool) -> Self {
        self.values.iter().copied().filter(|v| pred(*v)).collect()
    }

    /// Keep values at positions where `mask` is true.
    pub fn select_mask(&self, mask: &BooleanSeries) -> Result<Self> {
        check_mask_len(self.len(), mask.len())?;
        Ok(self
            .values
            .iter()
            .zip(mask.values())
            .filter_map(|(v, keep)| keep.then_some(*v))
            .collect())
    }

    /// Stable sort using `cmp`.
    pub fn sort_by(&self, mut cmp: impl FnMut(&T, &T) -> Ordering) -> Self {
        let mut values = self.values.to_vec();
        values.sort_by(|a, b| cmp(a, b));
        Self::new(values)
    }

    /// Sort ascending by the type's total order.
    pub fn sort(&self) -> Self {
        self.sort_by(T::total_cmp)
    }

    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.len());
        Self::new(self.values[..n].to_vec())
    }

    /// Returns the index of the first occurrence of `value`.
    pub fn position_of(&self, value: T) -> Option<usize> {
        self.values.iter().position(|v| *v == value)
    }
}

impl<T: PrimitiveType> From<Vec<T>> for PrimitiveSeries<T> {
    fn from(value: Vec<T>) -> Self {
        Self::new(value)
    }
}

impl<T: PrimitiveType> FromIterator<T> for PrimitiveSeries<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: PrimitiveType> TryFrom<&[ScalarValue]> for PrimitiveSeries<T> {
    type Error = DbError;

    fn try_from(value: &[ScalarValue]) -> Result<Self> {
        value.iter().map(T::from_scalar).collect()
    }
}
