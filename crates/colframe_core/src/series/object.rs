use std::cmp::Ordering;
use std::sync::Arc;

use colframe_error::Result;

use super::boolean::BooleanSeries;
use super::selection::SelectionVector;
use super::{check_copy_range, check_mask_len, out_of_bounds};
use crate::scalar::{DataType, ScalarValue};

/// Series of boxed values. The only series variant that can hold nulls.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSeries {
    /// Logical type of the non-null values.
    datatype: DataType,
    values: Arc<[ScalarValue]>,
}

impl ObjectSeries {
    /// Create a new series, inferring the logical type from the values.
    pub fn new(values: Vec<ScalarValue>) -> Self {
        let datatype = values
            .iter()
            .fold(DataType::Null, |acc, v| acc.unify(v.datatype()));

        ObjectSeries {
            datatype,
            values: values.into(),
        }
    }

    /// Create a new series with an explicit logical type.
    ///
    /// The type isn't validated against the values.
    pub fn with_datatype(datatype: DataType, values: Vec<ScalarValue>) -> Self {
        ObjectSeries {
            datatype,
            values: values.into(),
        }
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Result<ScalarValue> {
        self.get_ref(idx).cloned()
    }

    pub fn get_ref(&self, idx: usize) -> Result<&ScalarValue> {
        self.values
            .get(idx)
            .ok_or_else(|| out_of_bounds(idx, self.len()))
    }

    pub fn is_null(&self, idx: usize) -> Result<bool> {
        self.get_ref(idx).map(|v| v.is_null())
    }

    pub fn values(&self) -> &[ScalarValue] {
        &self.values
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ScalarValue> + '_ {
        self.values.iter()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    pub fn copy_to(
        &self,
        dst: &mut [ScalarValue],
        src_pos: usize,
        dst_pos: usize,
        len: usize,
    ) -> Result<()> {
        check_copy_range(self.len(), src_pos, dst.len(), dst_pos, len)?;
        dst[dst_pos..dst_pos + len].clone_from_slice(&self.values[src_pos..src_pos + len]);
        Ok(())
    }

    pub fn take(&self, selection: &SelectionVector) -> Result<Self> {
        let values = selection
            .iter_locations()
            .map(|idx| self.get(idx))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_datatype(self.datatype, values))
    }

    pub fn select(&self, mut pred: impl FnMut(&ScalarValue) -> bool) -> Self {
        let values = self.values.iter().filter(|v| pred(v)).cloned().collect();
        Self::with_datatype(self.datatype, values)
    }

    pub fn select_mask(&self, mask: &BooleanSeries) -> Result<Self> {
        check_mask_len(self.len(), mask.len())?;
        let values = self
            .values
            .iter()
            .zip(mask.values())
            .filter_map(|(v, keep)| keep.then(|| v.clone()))
            .collect();
        Ok(Self::with_datatype(self.datatype, values))
    }

    pub fn sort_by(&self, mut cmp: impl FnMut(&ScalarValue, &ScalarValue) -> Ordering) -> Self {
        let mut values = self.values.to_vec();
        values.sort_by(|a, b| cmp(a, b));
        Self::with_datatype(self.datatype, values)
    }

    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.len());
        Self::with_datatype(self.datatype, self.values[..n].to_vec())
    }
}

impl FromIterator<ScalarValue> for ObjectSeries {
    fn from_iter<T: IntoIterator<Item = ScalarValue>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
