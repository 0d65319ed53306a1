use std::sync::Arc;

use colframe_error::{DbError, Result};

use super::FrameSource;
use super::row::{ColumnsCursor, RowCursor};
use crate::index::Index;
use crate::series::Series;

/// Frame backed by one series per column.
#[derive(Debug, Clone)]
pub struct ColumnFrame {
    columns: Arc<Index>,
    series: Vec<Series>,
    height: usize,
}

impl ColumnFrame {
    /// Create a frame, checking that there's one series per label and that
    /// all series have the same length.
    pub fn try_new(columns: impl Into<Arc<Index>>, series: Vec<Series>) -> Result<Self> {
        let columns = columns.into();
        if columns.len() != series.len() {
            return Err(DbError::shape_mismatch(format!(
                "Index width {} doesn't match number of series {}",
                columns.len(),
                series.len()
            )));
        }

        let height = series.first().map(|s| s.len()).unwrap_or(0);
        for (pos, s) in series.iter().enumerate() {
            if s.len() != height {
                return Err(DbError::shape_mismatch("Series have different lengths")
                    .with_field("column", columns.label(pos)?)
                    .with_field("expected", height)
                    .with_field("got", s.len()));
            }
        }

        Ok(ColumnFrame {
            columns,
            series,
            height,
        })
    }

    /// Frame with no rows.
    pub fn empty(columns: Arc<Index>) -> Self {
        let series = (0..columns.len()).map(|_| Series::empty()).collect();
        ColumnFrame {
            columns,
            series,
            height: 0,
        }
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn column_at(&self, pos: usize) -> Result<&Series> {
        self.series.get(pos).ok_or_else(|| {
            DbError::out_of_bounds(format!(
                "Column position {pos} out of bounds for width {}",
                self.series.len()
            ))
        })
    }

    pub fn into_series(self) -> Vec<Series> {
        self.series
    }
}

impl FrameSource for ColumnFrame {
    fn name(&self) -> &'static str {
        "ColumnFrame"
    }

    fn columns(&self) -> &Arc<Index> {
        &self.columns
    }

    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>> {
        Ok(Box::new(ColumnsCursor::new(
            &self.columns,
            &self.series,
            self.height,
        )))
    }

    fn height(&self) -> Result<usize> {
        Ok(self.height)
    }

    fn is_materialized(&self) -> bool {
        true
    }

    fn as_column_frame(&self) -> Option<&ColumnFrame> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;
    use crate::scalar::ScalarValue;

    #[test]
    fn unequal_lengths() {
        let index = Index::for_labels(["a", "b"]).unwrap();
        let err = ColumnFrame::try_new(
            index,
            vec![Series::from(vec![1_i64, 2]), Series::from(vec![1_i64])],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::ShapeMismatch, err.kind());
    }

    #[test]
    fn width_mismatch() {
        let index = Index::for_labels(["a"]).unwrap();
        let err = ColumnFrame::try_new(index, Vec::new()).unwrap_err();
        assert_eq!(ErrorKind::ShapeMismatch, err.kind());
    }

    #[test]
    fn scan() {
        let index = Index::for_labels(["a"]).unwrap();
        let frame = ColumnFrame::try_new(index, vec![Series::from(vec![3_i32, 4])]).unwrap();
        assert_eq!(2, frame.height().unwrap());

        let mut cursor = frame.cursor().unwrap();
        let mut seen = Vec::new();
        while cursor.advance().unwrap() {
            seen.push(cursor.row().get(0).unwrap());
        }
        assert_eq!(vec![ScalarValue::Int32(3), ScalarValue::Int32(4)], seen);
    }
}
