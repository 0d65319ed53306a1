use std::fmt;

use colframe_error::{DbError, Result};
use indexmap::IndexSet;

/// Suffix appended to a label that collides with an existing one.
pub const COLLISION_SUFFIX: char = '_';

/// Ordered set of unique column labels.
///
/// Provides O(1) lookup in both directions. Indexes are never mutated after
/// construction, operations that change labels produce a new index. Frames
/// sharing a shape share the same `Arc<Index>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    labels: IndexSet<String>,
}

impl Index {
    pub fn empty() -> Self {
        Index {
            labels: IndexSet::new(),
        }
    }

    /// Create an index from labels, erroring if a label appears twice.
    pub fn for_labels<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let iter = labels.into_iter();
        let mut set = IndexSet::with_capacity(iter.size_hint().0);
        for label in iter {
            let label = label.into();
            if set.contains(&label) {
                return Err(DbError::duplicate_name(format!(
                    "Duplicate label '{label}' in index"
                )));
            }
            set.insert(label);
        }

        Ok(Index { labels: set })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Get the position of a label.
    pub fn position(&self, label: &str) -> Result<usize> {
        self.labels.get_index_of(label).ok_or_else(|| {
            DbError::name_not_found(format!("Label '{label}' not found in index"))
                .with_field("labels", self)
        })
    }

    /// Get the label at a position.
    pub fn label(&self, pos: usize) -> Result<&str> {
        self.labels.get_index(pos).map(|s| s.as_str()).ok_or_else(|| {
            DbError::out_of_bounds(format!(
                "Position {pos} out of bounds for index of width {}",
                self.len()
            ))
        })
    }

    pub fn labels(&self) -> impl ExactSizeIterator<Item = &str> {
        self.labels.iter().map(|s| s.as_str())
    }

    /// Returns a new index with `old` renamed to `new`.
    ///
    /// If `new` collides with a different existing label, the suffix rule of
    /// [`Index::hconcat`] is applied to `new`.
    pub fn rename(&self, old: &str, new: &str) -> Result<Self> {
        let pos = self.position(old)?;
        if old == new {
            return Ok(self.clone());
        }

        let mut labels: IndexSet<String> = IndexSet::with_capacity(self.len());
        for (idx, label) in self.labels.iter().enumerate() {
            if idx == pos {
                // Check against every other label, not only the ones already
                // inserted.
                let mut candidate = new.to_string();
                while self.labels.get_index_of(candidate.as_str()).is_some_and(|p| p != pos)
                    || labels.contains(&candidate)
                {
                    candidate.push(COLLISION_SUFFIX);
                }
                labels.insert(candidate);
            } else {
                labels.insert(label.clone());
            }
        }

        Ok(Index { labels })
    }

    /// Rename labels using `(old, new)` pairs, applied in order.
    pub fn rename_all<'a>(&self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut index = self.clone();
        for (old, new) in pairs {
            index = index.rename(old, new)?;
        }
        Ok(index)
    }

    /// Concatenate two indexes horizontally.
    ///
    /// Labels from `other` that collide with an existing label get `_`
    /// appended until unique, e.g. `[a] ++ [a]` becomes `[a, a_]`.
    pub fn hconcat(&self, other: &Index) -> Index {
        let mut labels = self.labels.clone();
        labels.reserve(other.len());

        for label in other.labels.iter() {
            let mut candidate = label.clone();
            while labels.contains(&candidate) {
                candidate.push(COLLISION_SUFFIX);
            }
            labels.insert(candidate);
        }

        Index { labels }
    }

    /// Project to the given labels, in the given order.
    pub fn select_labels<S: AsRef<str>>(&self, labels: &[S]) -> Result<Index> {
        for label in labels {
            self.position(label.as_ref())?;
        }
        Index::for_labels(labels.iter().map(|s| s.as_ref().to_string()))
    }

    /// Returns a new index with the given labels removed. Labels that don't
    /// exist are ignored.
    pub fn with_labels_dropped<S: AsRef<str>>(&self, labels: &[S]) -> Index {
        let labels = self
            .labels
            .iter()
            .filter(|l| !labels.iter().any(|d| d.as_ref() == l.as_str()))
            .cloned()
            .collect();
        Index { labels }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, label) in self.labels.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{label}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;

    #[test]
    fn lookup_both_ways() {
        let index = Index::for_labels(["a", "b", "c"]).unwrap();
        assert_eq!(1, index.position("b").unwrap());
        assert_eq!("c", index.label(2).unwrap());
        assert_eq!(3, index.len());
    }

    #[test]
    fn duplicate_labels() {
        let err = Index::for_labels(["a", "b", "a"]).unwrap_err();
        assert_eq!(ErrorKind::DuplicateName, err.kind());
    }

    #[test]
    fn missing_label() {
        let index = Index::for_labels(["a"]).unwrap();
        assert_eq!(ErrorKind::NameNotFound, index.position("b").unwrap_err().kind());
        assert_eq!(ErrorKind::IndexOutOfBounds, index.label(1).unwrap_err().kind());
    }

    #[test]
    fn rename_produces_new_index() {
        let index = Index::for_labels(["a", "b"]).unwrap();
        let renamed = index.rename("b", "c").unwrap();

        assert_eq!(vec!["a", "b"], index.labels().collect::<Vec<_>>());
        assert_eq!(vec!["a", "c"], renamed.labels().collect::<Vec<_>>());
    }

    #[test]
    fn rename_collision_appends_suffix() {
        let index = Index::for_labels(["a", "b", "a_"]).unwrap();
        let renamed = index.rename("b", "a").unwrap();
        assert_eq!(vec!["a", "a__", "a_"], renamed.labels().collect::<Vec<_>>());

        let same = index.rename("a", "a").unwrap();
        assert_eq!(index, same);
    }

    #[test]
    fn hconcat_self() {
        let index = Index::for_labels(["a"]).unwrap();
        let twice = index.hconcat(&index);
        assert_eq!(vec!["a", "a_"], twice.labels().collect::<Vec<_>>());

        let thrice = twice.hconcat(&index);
        assert_eq!(vec!["a", "a_", "a__"], thrice.labels().collect::<Vec<_>>());
    }

    #[test]
    fn select_and_drop() {
        let index = Index::for_labels(["a", "b", "c"]).unwrap();
        let selected = index.select_labels(&["c", "a"]).unwrap();
        assert_eq!(vec!["c", "a"], selected.labels().collect::<Vec<_>>());

        index.select_labels(&["x"]).unwrap_err();

        let dropped = index.with_labels_dropped(&["b", "x"]);
        assert_eq!(vec!["a", "c"], dropped.labels().collect::<Vec<_>>());
    }
}
