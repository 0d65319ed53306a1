use std::cmp::Ordering;
use std::ops::Range;

/// Ordered list of physical positions to pick out of a series.
///
/// Produced by filtering and sorting, then applied with `take` to produce a
/// new series. Positions may repeat and need not be ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionVector {
    indices: Vec<usize>,
}

impl SelectionVector {
    pub const fn empty() -> Self {
        SelectionVector {
            indices: Vec::new(),
        }
    }

    /// Create a selection vector with a linear mapping to a range of rows.
    pub fn with_range(range: Range<usize>) -> Self {
        SelectionVector {
            indices: range.collect(),
        }
    }

    /// Selection of every position in `0..len` for which `pred` returns true,
    /// in ascending order.
    pub fn from_predicate(len: usize, mut pred: impl FnMut(usize) -> bool) -> Self {
        SelectionVector {
            indices: (0..len).filter(|&idx| pred(idx)).collect(),
        }
    }

    /// Stable sort of positions `0..len` using `cmp` on positions.
    pub fn sorted(len: usize, mut cmp: impl FnMut(usize, usize) -> Ordering) -> Self {
        let mut indices: Vec<usize> = (0..len).collect();
        // `sort_by` is stable, equal elements keep their relative order.
        indices.sort_by(|&a, &b| cmp(a, b));
        SelectionVector { indices }
    }

    pub fn num_rows(&self) -> usize {
        self.indices.len()
    }

    pub fn get(&self, idx: usize) -> Option<usize> {
        self.indices.get(idx).copied()
    }

    pub fn iter_locations(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }
}

impl FromIterator<usize> for SelectionVector {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        SelectionVector {
            indices: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_keeps_order() {
        let sel = SelectionVector::from_predicate(6, |idx| idx % 2 == 1);
        assert_eq!(&[1, 3, 5], sel.as_slice());
    }

    #[test]
    fn sorted_is_stable() {
        let keys = [2, 1, 2, 1];
        let sel = SelectionVector::sorted(keys.len(), |a, b| keys[a].cmp(&keys[b]));
        assert_eq!(&[1, 3, 0, 2], sel.as_slice());
    }
}
