use std::fmt::{self, Debug};
use std::sync::Arc;

use colframe_error::Result;

use super::row::{RowBuilder, RowCursor, RowProxy};
use super::{DataFrame, FrameSource};
use crate::index::Index;
use crate::scalar::ScalarValue;

/// Writes a target row from a source row.
///
/// The target starts out as all nulls for every row.
pub trait RowMapper: Send + Sync {
    fn map_row(&self, from: &RowProxy<'_>, to: &mut RowBuilder<'_>) -> Result<()>;
}

/// Row mapper backed by a closure. Created with [`row_mapper`].
pub struct FnRowMapper<F> {
    func: F,
}

impl<F> RowMapper for FnRowMapper<F>
where
    F: Fn(&RowProxy<'_>, &mut RowBuilder<'_>) -> Result<()> + Send + Sync,
{
    fn map_row(&self, from: &RowProxy<'_>, to: &mut RowBuilder<'_>) -> Result<()> {
        (self.func)(from, to)
    }
}

pub fn row_mapper<F>(func: F) -> FnRowMapper<F>
where
    F: Fn(&RowProxy<'_>, &mut RowBuilder<'_>) -> Result<()> + Send + Sync,
{
    FnRowMapper { func }
}

/// Copies every value of the source row into the same position.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyMapper;

pub fn copy_mapper() -> CopyMapper {
    CopyMapper
}

impl RowMapper for CopyMapper {
    fn map_row(&self, from: &RowProxy<'_>, to: &mut RowBuilder<'_>) -> Result<()> {
        from.copy_range(to, 0, 0, from.width())
    }
}

/// Copies the source row, then replaces one column with a computed value.
pub struct ColumnMapper<F> {
    pos: usize,
    func: F,
}

pub fn column_mapper<F>(pos: usize, func: F) -> ColumnMapper<F>
where
    F: Fn(&RowProxy<'_>) -> Result<ScalarValue> + Send + Sync,
{
    ColumnMapper { pos, func }
}

impl<F> RowMapper for ColumnMapper<F>
where
    F: Fn(&RowProxy<'_>) -> Result<ScalarValue> + Send + Sync,
{
    fn map_row(&self, from: &RowProxy<'_>, to: &mut RowBuilder<'_>) -> Result<()> {
        from.copy_range(to, 0, 0, from.width())?;
        let value = (self.func)(from)?;
        to.set(self.pos, value)?;
        Ok(())
    }
}

/// Lazily maps each row of a source frame into a row of a new shape.
///
/// Nothing is cached. Every scan pulls from the source and runs the mapper
/// again.
pub struct MappedFrame {
    columns: Arc<Index>,
    source: DataFrame,
    mapper: Arc<dyn RowMapper>,
}

impl MappedFrame {
    pub fn new(columns: Arc<Index>, source: DataFrame, mapper: Arc<dyn RowMapper>) -> Self {
        MappedFrame {
            columns,
            source,
            mapper,
        }
    }
}

impl Debug for MappedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedFrame")
            .field("columns", &self.columns)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl FrameSource for MappedFrame {
    fn name(&self) -> &'static str {
        "MappedFrame"
    }

    fn columns(&self) -> &Arc<Index> {
        &self.columns
    }

    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>> {
        Ok(Box::new(MappedCursor {
            upstream: self.source.cursor()?,
            mapper: self.mapper.as_ref(),
            target: RowBuilder::new(&self.columns),
        }))
    }

    fn height(&self) -> Result<usize> {
        self.source.height()
    }
}

struct MappedCursor<'a> {
    upstream: Box<dyn RowCursor + 'a>,
    mapper: &'a dyn RowMapper,
    target: RowBuilder<'a>,
}

impl RowCursor for MappedCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        if !self.upstream.advance()? {
            return Ok(false);
        }

        self.target.reset();
        self.mapper.map_row(&self.upstream.row(), &mut self.target)?;

        Ok(true)
    }

    fn row(&self) -> RowProxy<'_> {
        self.target.as_proxy()
    }
}
