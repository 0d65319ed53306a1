use std::sync::Arc;

use colframe_error::Result;

use super::row::{RowBuilder, RowCursor, RowProxy};
use super::{DataFrame, FrameSource};
use crate::index::Index;

/// Side by side concatenation of two frames.
///
/// Rows are paired by position and the result is as tall as the shorter
/// input. Right labels colliding with left labels get a `_` suffix.
#[derive(Debug)]
pub struct ZippingFrame {
    columns: Arc<Index>,
    left: DataFrame,
    right: DataFrame,
}

impl ZippingFrame {
    pub fn new(left: DataFrame, right: DataFrame) -> Self {
        let columns = Arc::new(left.columns().hconcat(right.columns()));
        ZippingFrame {
            columns,
            left,
            right,
        }
    }
}

impl FrameSource for ZippingFrame {
    fn name(&self) -> &'static str {
        "ZippingFrame"
    }

    fn columns(&self) -> &Arc<Index> {
        &self.columns
    }

    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>> {
        Ok(Box::new(ZippingCursor {
            left: self.left.cursor()?,
            right: self.right.cursor()?,
            left_width: self.left.width(),
            right_width: self.right.width(),
            target: RowBuilder::new(&self.columns),
        }))
    }

    fn height(&self) -> Result<usize> {
        Ok(self.left.height()?.min(self.right.height()?))
    }
}

struct ZippingCursor<'a> {
    left: Box<dyn RowCursor + 'a>,
    right: Box<dyn RowCursor + 'a>,
    left_width: usize,
    right_width: usize,
    target: RowBuilder<'a>,
}

impl RowCursor for ZippingCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        if !self.left.advance()? || !self.right.advance()? {
            return Ok(false);
        }

        self.left
            .row()
            .copy_range(&mut self.target, 0, 0, self.left_width)?;
        self.right
            .row()
            .copy_range(&mut self.target, 0, self.left_width, self.right_width)?;

        Ok(true)
    }

    fn row(&self) -> RowProxy<'_> {
        self.target.as_proxy()
    }
}
