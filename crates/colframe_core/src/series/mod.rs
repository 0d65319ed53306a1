//! Immutable, typed columns.
//!
//! Primitive series (`Int32`, `Int64`, `Float64`, `Boolean`) store unboxed
//! values and can't hold nulls. `Object` series store [`ScalarValue`]s and
//! may contain nulls at any position. Generic code goes through [`Series`];
//! hot paths match on the variant to get at the unboxed storage.

pub mod boolean;
pub mod object;
pub mod primitive;
pub mod selection;

use std::cmp::Ordering;

use boolean::BooleanSeries;
use colframe_error::{DbError, Result};
use object::ObjectSeries;
use primitive::{Float64Series, Int32Series, Int64Series, PrimitiveSeries};
use selection::SelectionVector;

use crate::scalar::{DataType, ScalarValue};

pub(crate) fn out_of_bounds(idx: usize, len: usize) -> DbError {
    DbError::out_of_bounds(format!(
        "Index {idx} out of bounds for series of length {len}"
    ))
}

pub(crate) fn check_copy_range(
    src_len: usize,
    src_pos: usize,
    dst_len: usize,
    dst_pos: usize,
    len: usize,
) -> Result<()> {
    let src_ok = src_pos.checked_add(len).is_some_and(|end| end <= src_len);
    let dst_ok = dst_pos.checked_add(len).is_some_and(|end| end <= dst_len);
    if !src_ok || !dst_ok {
        return Err(DbError::out_of_bounds("Copy range out of bounds")
            .with_field("src_len", src_len)
            .with_field("src_pos", src_pos)
            .with_field("dst_len", dst_len)
            .with_field("dst_pos", dst_pos)
            .with_field("len", len));
    }
    Ok(())
}

pub(crate) fn check_mask_len(len: usize, mask_len: usize) -> Result<()> {
    if len != mask_len {
        return Err(DbError::shape_mismatch(format!(
            "Mask length {mask_len} doesn't match series length {len}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Boolean(BooleanSeries),
    Int32(Int32Series),
    Int64(Int64Series),
    Float64(Float64Series),
    Object(ObjectSeries),
}

impl Series {
    /// Build a series from boxed values, picking primitive storage when every
    /// value is a non-null primitive of the same type.
    pub fn from_values(values: Vec<ScalarValue>) -> Self {
        let datatype = values
            .iter()
            .try_fold(None, |acc: Option<DataType>, v| {
                if v.is_null() {
                    return Err(());
                }
                match acc {
                    Some(dt) if dt != v.datatype() => Err(()),
                    _ => Ok(Some(v.datatype())),
                }
            })
            .ok()
            .flatten();

        match datatype {
            Some(DataType::Boolean) => {
                Series::Boolean(values.iter().map(|v| matches!(v, ScalarValue::Boolean(true))).collect())
            }
            Some(DataType::Int32) => Series::Int32(
                values
                    .iter()
                    .map(|v| match v {
                        ScalarValue::Int32(v) => *v,
                        _ => 0,
                    })
                    .collect(),
            ),
            Some(DataType::Int64) => Series::Int64(
                values
                    .iter()
                    .map(|v| match v {
                        ScalarValue::Int64(v) => *v,
                        _ => 0,
                    })
                    .collect(),
            ),
            Some(DataType::Float64) => Series::Float64(
                values
                    .iter()
                    .map(|v| match v {
                        ScalarValue::Float64(v) => *v,
                        _ => 0.0,
                    })
                    .collect(),
            ),
            _ => Series::Object(ObjectSeries::new(values)),
        }
    }

    pub fn empty() -> Self {
        Series::Object(ObjectSeries::new(Vec::new()))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Boolean(s) => s.len(),
            Self::Int32(s) => s.len(),
            Self::Int64(s) => s.len(),
            Self::Float64(s) => s.len(),
            Self::Object(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn datatype(&self) -> DataType {
        match self {
            Self::Boolean(_) => DataType::Boolean,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Object(s) => s.datatype(),
        }
    }

    /// Whether this series stores unboxed values.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Object(_))
    }

    /// Get the boxed value at `idx`.
    pub fn get(&self, idx: usize) -> Result<ScalarValue> {
        match self {
            Self::Boolean(s) => s.get(idx),
            Self::Int32(s) => s.get(idx),
            Self::Int64(s) => s.get(idx),
            Self::Float64(s) => s.get(idx),
            Self::Object(s) => s.get(idx),
        }
    }

    pub fn is_null(&self, idx: usize) -> Result<bool> {
        match self {
            Self::Object(s) => s.is_null(idx),
            other => {
                if idx >= other.len() {
                    return Err(out_of_bounds(idx, other.len()));
                }
                Ok(false)
            }
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            Self::Object(s) => s.null_count(),
            _ => 0,
        }
    }

    /// Iterate over boxed values.
    pub fn iter(&self) -> SeriesIter<'_> {
        SeriesIter {
            series: self,
            idx: 0,
        }
    }

    pub fn to_values(&self) -> Vec<ScalarValue> {
        self.iter().collect()
    }

    /// Copy `len` boxed values into `dst`.
    pub fn copy_to(
        &self,
        dst: &mut [ScalarValue],
        src_pos: usize,
        dst_pos: usize,
        len: usize,
    ) -> Result<()> {
        if let Self::Object(s) = self {
            return s.copy_to(dst, src_pos, dst_pos, len);
        }

        check_copy_range(self.len(), src_pos, dst.len(), dst_pos, len)?;
        for offset in 0..len {
            dst[dst_pos + offset] = self.get(src_pos + offset)?;
        }
        Ok(())
    }

    pub fn take(&self, selection: &SelectionVector) -> Result<Self> {
        Ok(match self {
            Self::Boolean(s) => Self::Boolean(s.take(selection)?),
            Self::Int32(s) => Self::Int32(s.take(selection)?),
            Self::Int64(s) => Self::Int64(s.take(selection)?),
            Self::Float64(s) => Self::Float64(s.take(selection)?),
            Self::Object(s) => Self::Object(s.take(selection)?),
        })
    }

    /// Keep values for which `pred` returns true, preserving order. Storage
    /// type is preserved.
    pub fn select(&self, mut pred: impl FnMut(&ScalarValue) -> bool) -> Self {
        match self {
            Self::Boolean(s) => Self::Boolean(s.select(|v| pred(&ScalarValue::Boolean(v)))),
            Self::Int32(s) => Self::Int32(s.select(|v| pred(&ScalarValue::Int32(v)))),
            Self::Int64(s) => Self::Int64(s.select(|v| pred(&ScalarValue::Int64(v)))),
            Self::Float64(s) => Self::Float64(s.select(|v| pred(&ScalarValue::Float64(v)))),
            Self::Object(s) => Self::Object(s.select(pred)),
        }
    }

    /// Keep values at positions where `mask` is true.
    pub fn select_mask(&self, mask: &BooleanSeries) -> Result<Self> {
        Ok(match self {
            Self::Boolean(s) => Self::Boolean(s.select_mask(mask)?),
            Self::Int32(s) => Self::Int32(s.select_mask(mask)?),
            Self::Int64(s) => Self::Int64(s.select_mask(mask)?),
            Self::Float64(s) => Self::Float64(s.select_mask(mask)?),
            Self::Object(s) => Self::Object(s.select_mask(mask)?),
        })
    }

    /// Stable sort by comparing boxed values.
    pub fn sort_by(&self, mut cmp: impl FnMut(&ScalarValue, &ScalarValue) -> Ordering) -> Result<Self> {
        if let Self::Object(s) = self {
            return Ok(Self::Object(s.sort_by(cmp)));
        }

        let values = self.to_values();
        let selection = SelectionVector::sorted(values.len(), |a, b| cmp(&values[a], &values[b]));
        self.take(&selection)
    }

    /// Sort ascending, nulls last.
    pub fn sort(&self) -> Self {
        match self {
            Self::Boolean(s) => Self::Boolean(s.sort()),
            Self::Int32(s) => Self::Int32(s.sort()),
            Self::Int64(s) => Self::Int64(s.sort()),
            Self::Float64(s) => Self::Float64(s.sort()),
            Self::Object(s) => Self::Object(s.sort_by(ScalarValue::total_cmp)),
        }
    }

    pub fn head(&self, n: usize) -> Self {
        match self {
            Self::Boolean(s) => Self::Boolean(s.head(n)),
            Self::Int32(s) => Self::Int32(s.head(n)),
            Self::Int64(s) => Self::Int64(s.head(n)),
            Self::Float64(s) => Self::Float64(s.head(n)),
            Self::Object(s) => Self::Object(s.head(n)),
        }
    }

    pub fn as_boolean(&self) -> Option<&BooleanSeries> {
        match self {
            Self::Boolean(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int32(&self) -> Option<&Int32Series> {
        match self {
            Self::Int32(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<&Int64Series> {
        match self {
            Self::Int64(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_float64(&self) -> Option<&Float64Series> {
        match self {
            Self::Float64(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSeries> {
        match self {
            Self::Object(s) => Some(s),
            _ => None,
        }
    }

    /// Get the series as booleans, converting an object series holding only
    /// booleans. Nulls are treated as false.
    pub fn try_to_boolean(&self) -> Result<BooleanSeries> {
        match self {
            Self::Boolean(s) => Ok(s.clone()),
            Self::Object(s) => s
                .iter()
                .map(|v| match v {
                    ScalarValue::Null => Ok(false),
                    other => other.try_as_bool(),
                })
                .collect(),
            other => Err(DbError::unsupported_conversion(format!(
                "Cannot use {} series as a boolean series",
                other.datatype()
            ))),
        }
    }
}

impl From<BooleanSeries> for Series {
    fn from(value: BooleanSeries) -> Self {
        Series::Boolean(value)
    }
}

impl From<ObjectSeries> for Series {
    fn from(value: ObjectSeries) -> Self {
        Series::Object(value)
    }
}

impl From<PrimitiveSeries<i32>> for Series {
    fn from(value: PrimitiveSeries<i32>) -> Self {
        Series::Int32(value)
    }
}

impl From<PrimitiveSeries<i64>> for Series {
    fn from(value: PrimitiveSeries<i64>) -> Self {
        Series::Int64(value)
    }
}

impl From<PrimitiveSeries<f64>> for Series {
    fn from(value: PrimitiveSeries<f64>) -> Self {
        Series::Float64(value)
    }
}

impl From<Vec<bool>> for Series {
    fn from(value: Vec<bool>) -> Self {
        Series::Boolean(value.into())
    }
}

impl From<Vec<i32>> for Series {
    fn from(value: Vec<i32>) -> Self {
        Series::Int32(value.into())
    }
}

impl From<Vec<i64>> for Series {
    fn from(value: Vec<i64>) -> Self {
        Series::Int64(value.into())
    }
}

impl From<Vec<f64>> for Series {
    fn from(value: Vec<f64>) -> Self {
        Series::Float64(value.into())
    }
}

impl FromIterator<ScalarValue> for Series {
    fn from_iter<T: IntoIterator<Item = ScalarValue>>(iter: T) -> Self {
        Series::from_values(iter.into_iter().collect())
    }
}

/// Iterator over boxed values of a series.
#[derive(Debug, Clone)]
pub struct SeriesIter<'a> {
    series: &'a Series,
    idx: usize,
}

impl Iterator for SeriesIter<'_> {
    type Item = ScalarValue;

    fn next(&mut self) -> Option<Self::Item> {
        let v = match self.series {
            Series::Boolean(s) => s.values().get(self.idx).map(|v| ScalarValue::Boolean(*v)),
            Series::Int32(s) => s.values().get(self.idx).map(|v| ScalarValue::Int32(*v)),
            Series::Int64(s) => s.values().get(self.idx).map(|v| ScalarValue::Int64(*v)),
            Series::Float64(s) => s.values().get(self.idx).map(|v| ScalarValue::Float64(*v)),
            Series::Object(s) => s.values().get(self.idx).cloned(),
        }?;
        self.idx += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.series.len() - self.idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SeriesIter<'_> {}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn from_values_picks_primitive_storage() {
        let s = Series::from_values(vec![1_i64.into(), 2_i64.into()]);
        assert!(s.as_int64().is_some());

        let s = Series::from_values(vec![1_i64.into(), ScalarValue::Null]);
        assert!(s.as_object().is_some());
        assert_eq!(DataType::Int64, s.datatype());

        let s = Series::from_values(vec![true.into(), false.into()]);
        assert_eq!(&[true, false], s.as_boolean().unwrap().values());

        let s = Series::from_values(Vec::new());
        assert!(s.is_empty());
        assert_eq!(DataType::Null, s.datatype());
    }

    #[test]
    fn out_of_range() {
        let s = Series::from(Int32Series::from(vec![1]));
        assert_eq!(ErrorKind::IndexOutOfBounds, s.get(1).unwrap_err().kind());
        assert_eq!(ErrorKind::IndexOutOfBounds, s.is_null(1).unwrap_err().kind());
    }

    #[test]
    fn select_length_matches_predicate_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..50 {
            let len = rng.random_range(0..200);
            let values: Vec<i64> = (0..len).map(|_| rng.random_range(-100..100)).collect();
            let threshold = rng.random_range(-100..100);

            let series = Series::from(Int64Series::from(values.clone()));
            let selected = series.select(|v| matches!(v, ScalarValue::Int64(v) if *v > threshold));

            let expected: Vec<ScalarValue> = values
                .iter()
                .filter(|v| **v > threshold)
                .map(|v| ScalarValue::Int64(*v))
                .collect();

            assert_eq!(expected.len(), selected.len());
            assert_eq!(expected, selected.to_values());
        }
    }

    #[test]
    fn sort_by_is_stable() {
        let s = Series::from_values(vec!["b1".into(), "a1".into(), "b2".into(), "a2".into()]);
        let sorted = s
            .sort_by(|a, b| {
                let a = a.try_as_str().unwrap();
                let b = b.try_as_str().unwrap();
                a[..1].cmp(&b[..1])
            })
            .unwrap();

        assert_eq!(
            vec![ScalarValue::from("a1"), "a2".into(), "b1".into(), "b2".into()],
            sorted.to_values()
        );
    }

    #[test]
    fn sort_puts_nulls_last() {
        let s = Series::from_values(vec![ScalarValue::Null, 3_i64.into(), 1_i64.into()]);
        assert_eq!(
            vec![ScalarValue::Int64(1), ScalarValue::Int64(3), ScalarValue::Null],
            s.sort().to_values()
        );
    }

    #[test]
    fn copy_primitive_as_boxed() {
        let s = Series::from(Float64Series::from(vec![1.5, 2.5]));
        let mut buf = vec![ScalarValue::Null; 2];
        s.copy_to(&mut buf, 0, 0, 2).unwrap();
        assert_eq!(vec![ScalarValue::Float64(1.5), ScalarValue::Float64(2.5)], buf);
    }

    #[test]
    fn object_to_boolean() {
        let s = Series::from_values(vec![true.into(), ScalarValue::Null]);
        assert_eq!(&[true, false], s.try_to_boolean().unwrap().values());

        let s = Series::from(Int32Series::from(vec![1]));
        s.try_to_boolean().unwrap_err();
    }
}
