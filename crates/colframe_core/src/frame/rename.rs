use std::sync::Arc;

use colframe_error::{DbError, Result};

use super::row::{RowCursor, RowProxy};
use super::{DataFrame, FrameSource};
use crate::index::Index;

/// Source rows viewed through new labels of the same width.
#[derive(Debug)]
pub struct RenamedFrame {
    columns: Arc<Index>,
    source: DataFrame,
}

impl RenamedFrame {
    pub fn try_new(columns: Arc<Index>, source: DataFrame) -> Result<Self> {
        if columns.len() != source.width() {
            return Err(DbError::shape_mismatch(format!(
                "Can't rename {} columns using {} labels",
                source.width(),
                columns.len()
            )));
        }
        Ok(RenamedFrame { columns, source })
    }
}

impl FrameSource for RenamedFrame {
    fn name(&self) -> &'static str {
        "RenamedFrame"
    }

    fn columns(&self) -> &Arc<Index> {
        &self.columns
    }

    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>> {
        Ok(Box::new(RenamedCursor {
            columns: &self.columns,
            upstream: self.source.cursor()?,
        }))
    }

    fn height(&self) -> Result<usize> {
        self.source.height()
    }
}

struct RenamedCursor<'a> {
    columns: &'a Index,
    upstream: Box<dyn RowCursor + 'a>,
}

impl RowCursor for RenamedCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        self.upstream.advance()
    }

    fn row(&self) -> RowProxy<'_> {
        self.upstream.row().with_index(self.columns)
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use crate::frame::testutil::{frame_of, rows_of};
    use crate::index::Index;
    use crate::scalar::ScalarValue;

    #[test]
    fn rename_column() {
        let df = frame_of(&["a", "b"], vec![vec!["one".into(), 1.into()]]);
        let renamed = df.rename_column("b", "c").unwrap();

        assert_eq!(vec!["a", "c"], renamed.columns().labels().collect::<Vec<_>>());
        assert_eq!(rows_of(&df), rows_of(&renamed));
        assert_eq!(ScalarValue::Int32(1), renamed.get("c", 0).unwrap());
    }

    #[test]
    fn rename_all() {
        let df = frame_of(&["a", "b"], vec![vec!["one".into(), 1.into()]]);

        let err = df.rename(Index::for_labels(["x"]).unwrap()).unwrap_err();
        assert_eq!(ErrorKind::ShapeMismatch, err.kind());

        let renamed = df.rename(Index::for_labels(["x", "y"]).unwrap()).unwrap();
        assert_eq!(vec!["x", "y"], renamed.columns().labels().collect::<Vec<_>>());
    }
}
