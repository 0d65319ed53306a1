use std::sync::Arc;

use colframe_error::Result;

use super::row::{RowCursor, RowProxy};
use super::{DataFrame, FrameSource};
use crate::index::Index;

/// First `len` rows of a source frame.
#[derive(Debug)]
pub struct HeadFrame {
    source: DataFrame,
    len: usize,
}

impl HeadFrame {
    pub fn new(source: DataFrame, len: usize) -> Self {
        HeadFrame { source, len }
    }
}

impl FrameSource for HeadFrame {
    fn name(&self) -> &'static str {
        "HeadFrame"
    }

    fn columns(&self) -> &Arc<Index> {
        self.source.columns()
    }

    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>> {
        Ok(Box::new(HeadCursor {
            upstream: self.source.cursor()?,
            remaining: self.len,
        }))
    }

    fn height(&self) -> Result<usize> {
        Ok(self.source.height()?.min(self.len))
    }
}

struct HeadCursor<'a> {
    upstream: Box<dyn RowCursor + 'a>,
    remaining: usize,
}

impl RowCursor for HeadCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        if self.remaining == 0 {
            return Ok(false);
        }
        self.remaining -= 1;
        self.upstream.advance()
    }

    fn row(&self) -> RowProxy<'_> {
        self.upstream.row()
    }
}
