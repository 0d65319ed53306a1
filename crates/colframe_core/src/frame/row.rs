use std::fmt;

use colframe_error::{DbError, Result};

use crate::index::Index;
use crate::scalar::ScalarValue;
use crate::series::Series;

/// Pull-based iteration over the rows of a frame.
///
/// The row returned by [`RowCursor::row`] borrows the cursor and is only
/// valid until the next call to [`RowCursor::advance`].
pub trait RowCursor {
    /// Move to the next row, returning false once exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// The current row. Only valid after `advance` returned true.
    fn row(&self) -> RowProxy<'_>;
}

#[derive(Debug, Clone, Copy)]
enum RowData<'a> {
    Columns { series: &'a [Series], row: usize },
    Values(&'a [ScalarValue]),
}

/// Read-only view of a single row.
///
/// Doesn't copy the underlying values. Values are boxed on access.
#[derive(Debug, Clone, Copy)]
pub struct RowProxy<'a> {
    index: &'a Index,
    data: RowData<'a>,
}

impl<'a> RowProxy<'a> {
    pub(crate) fn for_columns(index: &'a Index, series: &'a [Series], row: usize) -> Self {
        RowProxy {
            index,
            data: RowData::Columns { series, row },
        }
    }

    pub(crate) fn for_values(index: &'a Index, values: &'a [ScalarValue]) -> Self {
        RowProxy {
            index,
            data: RowData::Values(values),
        }
    }

    /// Same values, viewed through different labels of the same width.
    pub(crate) fn with_index(self, index: &'a Index) -> Self {
        RowProxy {
            index,
            data: self.data,
        }
    }

    pub fn index(&self) -> &'a Index {
        self.index
    }

    pub fn width(&self) -> usize {
        self.index.len()
    }

    pub fn get(&self, pos: usize) -> Result<ScalarValue> {
        match self.data {
            RowData::Columns { series, row } => series
                .get(pos)
                .ok_or_else(|| column_out_of_bounds(pos, series.len()))?
                .get(row),
            RowData::Values(values) => values
                .get(pos)
                .cloned()
                .ok_or_else(|| column_out_of_bounds(pos, values.len())),
        }
    }

    pub fn get_by_name(&self, name: &str) -> Result<ScalarValue> {
        let pos = self.index.position(name)?;
        self.get(pos)
    }

    /// Copy `len` values starting at `from_offset` into `to` starting at
    /// `to_offset`.
    pub fn copy_range(
        &self,
        to: &mut RowBuilder<'_>,
        from_offset: usize,
        to_offset: usize,
        len: usize,
    ) -> Result<()> {
        let from_ok = from_offset
            .checked_add(len)
            .is_some_and(|end| end <= self.width());
        let to_ok = to_offset
            .checked_add(len)
            .is_some_and(|end| end <= to.width());
        if !from_ok || !to_ok {
            return Err(DbError::out_of_bounds("Row copy range out of bounds")
                .with_field("from_width", self.width())
                .with_field("from_offset", from_offset)
                .with_field("to_width", to.width())
                .with_field("to_offset", to_offset)
                .with_field("len", len));
        }

        for i in 0..len {
            to.values[to_offset + i] = self.get(from_offset + i)?;
        }

        Ok(())
    }

    pub fn to_values(&self) -> Result<Vec<ScalarValue>> {
        (0..self.width()).map(|pos| self.get(pos)).collect()
    }
}

/// Formats as `{a:one,b:1}`.
impl fmt::Display for RowProxy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (pos, label) in self.index.labels().enumerate() {
            if pos > 0 {
                write!(f, ",")?;
            }
            let value = self.get(pos).map_err(|_| fmt::Error)?;
            write!(f, "{label}:{value}")?;
        }
        write!(f, "}}")
    }
}

fn column_out_of_bounds(pos: usize, width: usize) -> DbError {
    DbError::out_of_bounds(format!(
        "Column position {pos} out of bounds for row of width {width}"
    ))
}

/// Mutable target row written by row mappers.
#[derive(Debug, Clone)]
pub struct RowBuilder<'a> {
    index: &'a Index,
    values: Vec<ScalarValue>,
}

impl<'a> RowBuilder<'a> {
    pub fn new(index: &'a Index) -> Self {
        RowBuilder {
            index,
            values: vec![ScalarValue::Null; index.len()],
        }
    }

    pub fn index(&self) -> &'a Index {
        self.index
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    pub fn set(&mut self, pos: usize, value: impl Into<ScalarValue>) -> Result<&mut Self> {
        let width = self.values.len();
        let slot = self
            .values
            .get_mut(pos)
            .ok_or_else(|| column_out_of_bounds(pos, width))?;
        *slot = value.into();
        Ok(self)
    }

    pub fn set_by_name(&mut self, name: &str, value: impl Into<ScalarValue>) -> Result<&mut Self> {
        let pos = self.index.position(name)?;
        self.set(pos, value)
    }

    /// Reset every value to null.
    pub fn reset(&mut self) {
        self.values.fill(ScalarValue::Null);
    }

    pub fn as_proxy(&self) -> RowProxy<'_> {
        RowProxy::for_values(self.index, &self.values)
    }

    pub fn into_values(self) -> Vec<ScalarValue> {
        self.values
    }
}

/// Cursor over column storage.
#[derive(Debug)]
pub(crate) struct ColumnsCursor<'a> {
    index: &'a Index,
    series: &'a [Series],
    height: usize,
    next: usize,
}

impl<'a> ColumnsCursor<'a> {
    pub(crate) fn new(index: &'a Index, series: &'a [Series], height: usize) -> Self {
        ColumnsCursor {
            index,
            series,
            height,
            next: 0,
        }
    }
}

impl RowCursor for ColumnsCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        if self.next >= self.height {
            return Ok(false);
        }
        self.next += 1;
        Ok(true)
    }

    fn row(&self) -> RowProxy<'_> {
        RowProxy::for_columns(self.index, self.series, self.next.saturating_sub(1))
    }
}

/// Cursor over row-major storage.
#[derive(Debug)]
pub(crate) struct RowsCursor<'a> {
    index: &'a Index,
    rows: &'a [Box<[ScalarValue]>],
    next: usize,
}

impl<'a> RowsCursor<'a> {
    pub(crate) fn new(index: &'a Index, rows: &'a [Box<[ScalarValue]>]) -> Self {
        RowsCursor {
            index,
            rows,
            next: 0,
        }
    }
}

impl RowCursor for RowsCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        if self.next >= self.rows.len() {
            return Ok(false);
        }
        self.next += 1;
        Ok(true)
    }

    fn row(&self) -> RowProxy<'_> {
        let values = self
            .next
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx))
            .map(|row| &**row)
            .unwrap_or(&[]);
        RowProxy::for_values(self.index, values)
    }
}
