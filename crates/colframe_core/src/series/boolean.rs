use std::sync::Arc;

use colframe_error::Result;

use super::selection::SelectionVector;
use super::{check_copy_range, check_mask_len, out_of_bounds};
use crate::scalar::ScalarValue;

/// Series of unboxed booleans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanSeries {
    values: Arc<[bool]>,
}

impl BooleanSeries {
    pub fn new(values: Vec<bool>) -> Self {
        BooleanSeries {
            values: values.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_bool(&self, idx: usize) -> Result<bool> {
        self.values
            .get(idx)
            .copied()
            .ok_or_else(|| out_of_bounds(idx, self.len()))
    }

    pub fn get(&self, idx: usize) -> Result<ScalarValue> {
        self.get_bool(idx).map(ScalarValue::Boolean)
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = bool> + '_ {
        self.values.iter().copied()
    }

    pub fn copy_to_bool(
        &self,
        dst: &mut [bool],
        src_pos: usize,
        dst_pos: usize,
        len: usize,
    ) -> Result<()> {
        check_copy_range(self.len(), src_pos, dst.len(), dst_pos, len)?;
        dst[dst_pos..dst_pos + len].copy_from_slice(&self.values[src_pos..src_pos + len]);
        Ok(())
    }

    pub fn count_true(&self) -> usize {
        self.values.iter().filter(|v| **v).count()
    }

    pub fn count_false(&self) -> usize {
        self.len() - self.count_true()
    }

    /// Positions holding `true`, ascending.
    pub fn true_positions(&self) -> SelectionVector {
        SelectionVector::from_predicate(self.len(), |idx| self.values[idx])
    }

    pub fn take(&self, selection: &SelectionVector) -> Result<Self> {
        selection
            .iter_locations()
            .map(|idx| self.get_bool(idx))
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    pub fn select(&self, mut pred: impl FnMut(bool) -> bool) -> Self {
        self.values.iter().copied().filter(|v| pred(*v)).collect()
    }

    pub fn select_mask(&self, mask: &BooleanSeries) -> Result<Self> {
        check_mask_len(self.len(), mask.len())?;
        Ok(self
            .values
            .iter()
            .zip(mask.values())
            .filter_map(|(v, keep)| keep.then_some(*v))
            .collect())
    }

    /// Stable sort, `false` before `true`.
    pub fn sort(&self) -> Self {
        let mut values = self.values.to_vec();
        values.sort();
        Self::new(values)
    }

    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.len());
        Self::new(self.values[..n].to_vec())
    }

    /// Element-wise logical and.
    pub fn and(&self, other: &BooleanSeries) -> Result<Self> {
        check_mask_len(self.len(), other.len())?;
        Ok(self.iter().zip(other.iter()).map(|(a, b)| a && b).collect())
    }

    /// Element-wise logical or.
    pub fn or(&self, other: &BooleanSeries) -> Result<Self> {
        check_mask_len(self.len(), other.len())?;
        Ok(self.iter().zip(other.iter()).map(|(a, b)| a || b).collect())
    }

    pub fn not(&self) -> Self {
        self.iter().map(|v| !v).collect()
    }
}

impl From<Vec<bool>> for BooleanSeries {
    fn from(value: Vec<bool>) -> Self {
        Self::new(value)
    }
}

impl FromIterator<bool> for BooleanSeries {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
