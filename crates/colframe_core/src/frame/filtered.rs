use std::fmt::{self, Debug};
use std::sync::Arc;

use colframe_error::Result;

use super::row::{RowCursor, RowProxy};
use super::{DataFrame, FrameSource};
use crate::index::Index;

pub type RowPredicate = dyn Fn(&RowProxy<'_>) -> Result<bool> + Send + Sync;

/// Lazily keeps the rows of a source frame matching a predicate.
pub struct FilteredFrame {
    source: DataFrame,
    predicate: Arc<RowPredicate>,
}

impl FilteredFrame {
    pub fn new(source: DataFrame, predicate: Arc<RowPredicate>) -> Self {
        FilteredFrame { source, predicate }
    }
}

impl Debug for FilteredFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredFrame")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl FrameSource for FilteredFrame {
    fn name(&self) -> &'static str {
        "FilteredFrame"
    }

    fn columns(&self) -> &Arc<Index> {
        self.source.columns()
    }

    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>> {
        Ok(Box::new(FilteredCursor {
            upstream: self.source.cursor()?,
            predicate: self.predicate.as_ref(),
        }))
    }
}

struct FilteredCursor<'a> {
    upstream: Box<dyn RowCursor + 'a>,
    predicate: &'a RowPredicate,
}

impl RowCursor for FilteredCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        while self.upstream.advance()? {
            if (self.predicate)(&self.upstream.row())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn row(&self) -> RowProxy<'_> {
        self.upstream.row()
    }
}
