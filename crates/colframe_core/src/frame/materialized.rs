use std::sync::{Arc, OnceLock};

use colframe_error::{DbError, Result};
use parking_lot::Mutex;
use tracing::debug;

use super::row::{RowCursor, RowsCursor};
use super::{DataFrame, FrameSource};
use crate::index::Index;
use crate::scalar::ScalarValue;

type Rows = Vec<Box<[ScalarValue]>>;

/// Caches the rows of a source frame on first access.
///
/// The first reader builds the cache while holding the build lock. Readers
/// racing it block on the lock, then find the published rows. After a
/// successful build the source is released and the lock is never taken
/// again. A failed build puts the source back so a later read can retry.
#[derive(Debug)]
pub struct MaterializedFrame {
    columns: Arc<Index>,
    source: Mutex<Option<DataFrame>>,
    rows: OnceLock<Rows>,
}

impl MaterializedFrame {
    pub fn new(source: DataFrame) -> Self {
        MaterializedFrame {
            columns: source.columns().clone(),
            source: Mutex::new(Some(source)),
            rows: OnceLock::new(),
        }
    }

    /// Whether the cache has been built.
    pub fn is_built(&self) -> bool {
        self.rows.get().is_some()
    }

    /// Whether the source is still held.
    pub fn has_source(&self) -> bool {
        self.source.lock().is_some()
    }

    fn rows(&self) -> Result<&[Box<[ScalarValue]>]> {
        if let Some(rows) = self.rows.get() {
            return Ok(rows.as_slice());
        }

        let mut source = self.source.lock();

        // Someone else may have built the cache while we were waiting.
        if let Some(rows) = self.rows.get() {
            return Ok(rows.as_slice());
        }

        let upstream = source.take().ok_or_else(|| {
            DbError::new("Materialized frame has neither rows nor a source")
        })?;

        match collect_rows(&upstream) {
            Ok(rows) => {
                debug!(
                    height = rows.len(),
                    width = self.columns.len(),
                    source = upstream.source_name(),
                    "materialized frame"
                );
                Ok(self.rows.get_or_init(|| rows).as_slice())
            }
            Err(e) => {
                *source = Some(upstream);
                Err(e)
            }
        }
    }
}

fn collect_rows(frame: &DataFrame) -> Result<Rows> {
    let mut rows = Vec::new();
    let mut cursor = frame.cursor()?;
    while cursor.advance()? {
        rows.push(cursor.row().to_values()?.into_boxed_slice());
    }
    Ok(rows)
}

impl FrameSource for MaterializedFrame {
    fn name(&self) -> &'static str {
        "MaterializedFrame"
    }

    fn columns(&self) -> &Arc<Index> {
        &self.columns
    }

    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>> {
        let rows = self.rows()?;
        Ok(Box::new(RowsCursor::new(&self.columns, rows)))
    }

    fn height(&self) -> Result<usize> {
        Ok(self.rows()?.len())
    }

    fn is_materialized(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use colframe_error::ErrorKind;

    use super::*;
    use crate::frame::mapped::row_mapper;
    use crate::frame::testutil::{frame_of, rows_of};

    fn counting_frame(calls: Arc<AtomicUsize>) -> DataFrame {
        let df = frame_of(&["a"], vec![vec![1.into()], vec![2.into()], vec![3.into()]]);
        df.map(
            df.columns().clone(),
            row_mapper(move |from, to| {
                calls.fetch_add(1, Ordering::SeqCst);
                from.copy_range(to, 0, 0, 1)
            }),
        )
    }

    #[test]
    fn builds_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let df = counting_frame(calls.clone()).materialize();
        assert_eq!(0, calls.load(Ordering::SeqCst));

        let first = rows_of(&df);
        let second = rows_of(&df);
        assert_eq!(first, second);
        assert_eq!(3, df.height().unwrap());
        assert_eq!(3, calls.load(Ordering::SeqCst));
    }

    #[test]
    fn releases_source() {
        let frame = MaterializedFrame::new(frame_of(&["a"], vec![vec![1.into()]]));
        assert!(frame.has_source());
        assert!(!frame.is_built());

        assert_eq!(1, frame.height().unwrap());
        assert!(!frame.has_source());
        assert!(frame.is_built());
    }

    #[test]
    fn materialize_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let df = counting_frame(calls.clone()).materialize();
        let again = df.materialize();
        assert!(df.ptr_eq(&again));

        rows_of(&again);
        rows_of(&df);
        assert_eq!(3, calls.load(Ordering::SeqCst));
    }

    #[test]
    fn failed_build_keeps_source() {
        let fail = Arc::new(AtomicBool::new(true));
        let should_fail = fail.clone();

        let df = frame_of(&["a"], vec![vec![1.into()]]);
        let mapped = df.map(
            df.columns().clone(),
            row_mapper(move |from, to| {
                if should_fail.load(Ordering::SeqCst) {
                    return Err(DbError::illegal_state("not yet"));
                }
                from.copy_range(to, 0, 0, 1)
            }),
        );

        let frame = MaterializedFrame::new(mapped);
        let err = frame.height().unwrap_err();
        assert_eq!(ErrorKind::IllegalState, err.kind());
        assert!(frame.has_source());

        fail.store(false, Ordering::SeqCst);
        assert_eq!(1, frame.height().unwrap());
        assert!(!frame.has_source());
    }
}
