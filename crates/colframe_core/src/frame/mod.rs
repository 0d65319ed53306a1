//! Immutable frames and lazy transformation chains.
//!
//! A [`DataFrame`] is a cheap handle to a [`FrameSource`]. Sources are either
//! backed by data ([`column::ColumnFrame`]) or are decorators that wrap
//! another frame and redefine its shape or rows when scanned. Decorators hold
//! no data, so every scan runs the whole chain again. Call
//! [`DataFrame::materialize`] to evaluate a chain once and cache the rows.

pub mod column;
pub mod filtered;
pub mod head;
pub mod mapped;
pub mod materialized;
pub mod predicate;
pub mod rename;
pub mod row;
pub mod zip;

use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::sync::Arc;

use colframe_error::{DbError, Result};
use column::ColumnFrame;
use filtered::FilteredFrame;
use head::HeadFrame;
use mapped::{MappedFrame, RowMapper, column_mapper, row_mapper};
use materialized::MaterializedFrame;
use predicate::ValuePredicate;
use rename::RenamedFrame;
use row::{RowCursor, RowProxy};
use zip::ZippingFrame;

use crate::agg::AggregateExpr;
use crate::builder::registry::ColumnRef;
use crate::config::{DEFAULT_DISPLAY_ROWS, EngineConfig};
use crate::expr::Expression;
use crate::expr::sorter::Sorter;
use crate::index::Index;
use crate::scalar::ScalarValue;
use crate::series::Series;
use crate::series::selection::SelectionVector;

pub trait FrameSource: Debug + Send + Sync {
    /// Short name of the source kind, used when formatting.
    fn name(&self) -> &'static str;

    fn columns(&self) -> &Arc<Index>;

    /// Start a new scan over the rows.
    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>>;

    /// Number of rows. Defaults to counting a full scan.
    fn height(&self) -> Result<usize> {
        let mut cursor = self.cursor()?;
        let mut count = 0;
        while cursor.advance()? {
            count += 1;
        }
        Ok(count)
    }

    /// Whether rows are already held in memory, so materializing again
    /// wouldn't do anything.
    fn is_materialized(&self) -> bool {
        false
    }

    fn as_column_frame(&self) -> Option<&ColumnFrame> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct DataFrame {
    source: Arc<dyn FrameSource>,
}

impl DataFrame {
    pub fn new(source: impl FrameSource + 'static) -> Self {
        DataFrame {
            source: Arc::new(source),
        }
    }

    /// Create a frame from one series per column.
    pub fn from_columns(columns: impl Into<Arc<Index>>, series: Vec<Series>) -> Result<Self> {
        Ok(Self::new(ColumnFrame::try_new(columns, series)?))
    }

    /// Create a frame from rows of values. Rows shorter than the index are
    /// rejected, extra trailing values are ignored.
    pub fn from_rows<I>(columns: impl Into<Arc<Index>>, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<ScalarValue>>,
    {
        let columns = columns.into();
        let width = columns.len();
        let mut values: Vec<Vec<ScalarValue>> = vec![Vec::new(); width];

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() < width {
                return Err(short_row(row_idx, width, row.len()));
            }
            for (col, value) in values.iter_mut().zip(row) {
                col.push(value);
            }
        }

        let series = values.into_iter().map(Series::from_values).collect();
        Self::from_columns(columns, series)
    }

    /// Frame with no rows.
    pub fn empty(columns: impl Into<Arc<Index>>) -> Self {
        DataFrame::new(ColumnFrame::empty(columns.into()))
    }

    pub fn columns(&self) -> &Arc<Index> {
        self.source.columns()
    }

    pub fn width(&self) -> usize {
        self.columns().len()
    }

    pub fn height(&self) -> Result<usize> {
        self.source.height()
    }

    pub fn cursor(&self) -> Result<Box<dyn RowCursor + '_>> {
        self.source.cursor()
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Whether both handles point to the same source.
    pub fn ptr_eq(&self, other: &DataFrame) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }

    /// Call `f` for every row.
    pub fn for_each_row<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&RowProxy<'_>) -> Result<()>,
    {
        let mut cursor = self.cursor()?;
        while cursor.advance()? {
            f(&cursor.row())?;
        }
        Ok(())
    }

    pub fn to_rows(&self) -> Result<Vec<Vec<ScalarValue>>> {
        let mut rows = Vec::new();
        self.for_each_row(|row| {
            rows.push(row.to_values()?);
            Ok(())
        })?;
        Ok(rows)
    }

    /// Value of a single cell.
    pub fn get(&self, column: impl Into<ColumnRef>, row: usize) -> Result<ScalarValue> {
        let pos = column.into().resolve(self.columns())?;
        if let Some(frame) = self.source.as_column_frame() {
            return frame.column_at(pos)?.get(row);
        }

        let mut cursor = self.cursor()?;
        let mut idx = 0;
        while cursor.advance()? {
            if idx == row {
                return cursor.row().get(pos);
            }
            idx += 1;
        }

        Err(DbError::out_of_bounds(format!(
            "Row {row} out of bounds for frame of height {idx}"
        )))
    }

    /// Collect a column into a series.
    pub fn column(&self, column: impl Into<ColumnRef>) -> Result<Series> {
        let pos = column.into().resolve(self.columns())?;
        if let Some(frame) = self.source.as_column_frame() {
            return frame.column_at(pos).cloned();
        }

        let mut values = Vec::new();
        self.for_each_row(|row| {
            values.push(row.get(pos)?);
            Ok(())
        })?;
        Ok(Series::from_values(values))
    }

    pub fn column_at(&self, pos: usize) -> Result<Series> {
        self.column(pos)
    }

    /// Evaluate the frame into column storage.
    pub fn to_column_frame(&self) -> Result<ColumnFrame> {
        if let Some(frame) = self.source.as_column_frame() {
            return Ok(frame.clone());
        }

        let mut values: Vec<Vec<ScalarValue>> = vec![Vec::new(); self.width()];
        self.for_each_row(|row| {
            for (pos, col) in values.iter_mut().enumerate() {
                col.push(row.get(pos)?);
            }
            Ok(())
        })?;

        let series = values.into_iter().map(Series::from_values).collect();
        ColumnFrame::try_new(self.columns().clone(), series)
    }

    /// Cache the rows of this frame on first access. Materializing a frame
    /// that already holds its rows returns it unchanged.
    pub fn materialize(&self) -> DataFrame {
        if self.source.is_materialized() {
            return self.clone();
        }
        DataFrame::new(MaterializedFrame::new(self.clone()))
    }

    /// First `len` rows.
    pub fn head(&self, len: usize) -> DataFrame {
        DataFrame::new(HeadFrame::new(self.clone(), len))
    }

    pub fn filter<F>(&self, predicate: F) -> DataFrame
    where
        F: Fn(&RowProxy<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        DataFrame::new(FilteredFrame::new(self.clone(), Arc::new(predicate)))
    }

    /// Keep rows whose value in `column` matches `predicate`.
    pub fn filter_by_column(
        &self,
        column: impl Into<ColumnRef>,
        predicate: ValuePredicate,
    ) -> Result<DataFrame> {
        let pos = column.into().resolve(self.columns())?;
        Ok(self.filter(move |row| Ok(predicate.test(&row.get(pos)?))))
    }

    /// Keep rows for which `condition` evaluates to true. Evaluated eagerly,
    /// column at a time.
    pub fn select_rows(&self, condition: &dyn Expression) -> Result<DataFrame> {
        let source = self.to_column_frame()?;
        let frame = DataFrame::new(source.clone());
        let mask = condition.eval(&frame)?.try_to_boolean()?;

        let series = source
            .series()
            .iter()
            .map(|s| s.select_mask(&mask))
            .collect::<Result<Vec<_>>>()?;
        DataFrame::from_columns(self.columns().clone(), series)
    }

    /// Append a column computed from `expr`. A label already in use gets
    /// `_` appended.
    pub fn with_column(&self, name: &str, expr: &dyn Expression) -> Result<DataFrame> {
        let source = self.to_column_frame()?;
        let frame = DataFrame::new(source.clone());
        let values = expr.eval(&frame)?;

        let columns = self.columns().hconcat(&Index::for_labels([name])?);
        let mut series = source.into_series();
        series.push(values);
        DataFrame::from_columns(columns, series)
    }

    /// Map every row into a row of `columns`.
    pub fn map<M>(&self, columns: impl Into<Arc<Index>>, mapper: M) -> DataFrame
    where
        M: RowMapper + 'static,
    {
        DataFrame::new(MappedFrame::new(
            columns.into(),
            self.clone(),
            Arc::new(mapper),
        ))
    }

    /// Replace the values of one column.
    pub fn map_column<F>(&self, name: &str, func: F) -> Result<DataFrame>
    where
        F: Fn(&RowProxy<'_>) -> Result<ScalarValue> + Send + Sync + 'static,
    {
        let pos = self.columns().position(name)?;
        Ok(self.map(self.columns().clone(), column_mapper(pos, func)))
    }

    pub fn rename_column(&self, old: &str, new: &str) -> Result<DataFrame> {
        let columns = self.columns().rename(old, new)?;
        self.rename(columns)
    }

    /// Relabel all columns. `columns` must have the same width.
    pub fn rename(&self, columns: impl Into<Arc<Index>>) -> Result<DataFrame> {
        Ok(DataFrame::new(RenamedFrame::try_new(
            columns.into(),
            self.clone(),
        )?))
    }

    /// Concatenate columns of `other` to the right of this frame.
    pub fn hconcat(&self, other: &DataFrame) -> DataFrame {
        DataFrame::new(ZippingFrame::new(self.clone(), other.clone()))
    }

    /// Keep only the given columns, in the given order.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<DataFrame> {
        let columns = self.columns().select_labels(names)?;
        self.project(columns)
    }

    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<DataFrame> {
        let columns = self.columns().with_labels_dropped(names);
        self.project(columns)
    }

    fn project(&self, columns: Index) -> Result<DataFrame> {
        let positions = columns
            .labels()
            .map(|label| self.columns().position(label))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.map(
            columns,
            row_mapper(move |from, to| {
                for (to_pos, &from_pos) in positions.iter().enumerate() {
                    to.set(to_pos, from.get(from_pos)?)?;
                }
                Ok(())
            }),
        ))
    }

    /// Sort rows by one or more sorters. Rows comparing equal keep their
    /// relative order.
    pub fn sort(&self, sorters: &[Sorter]) -> Result<DataFrame> {
        let source = self.to_column_frame()?;
        let frame = DataFrame::new(source.clone());

        let keys = sorters
            .iter()
            .map(|sorter| Ok((sorter, sorter.eval_keys(&frame)?)))
            .collect::<Result<Vec<_>>>()?;

        let selection = SelectionVector::sorted(frame.height()?, |a, b| {
            keys.iter()
                .map(|(sorter, values)| sorter.compare(&values[a], &values[b]))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        let series = source
            .series()
            .iter()
            .map(|s| s.take(&selection))
            .collect::<Result<Vec<_>>>()?;

        DataFrame::from_columns(self.columns().clone(), series)
    }

    /// Evaluate aggregates, producing a frame with a single row.
    pub fn agg(&self, aggregates: &[AggregateExpr]) -> Result<DataFrame> {
        let columns = Index::for_labels(aggregates.iter().map(|a| a.name().to_string()))?;
        let series = aggregates
            .iter()
            .map(|a| Ok(Series::from_values(vec![a.eval(self)?])))
            .collect::<Result<Vec<_>>>()?;

        DataFrame::from_columns(columns, series)
    }

    /// Format as many rows as the `display_rows` setting allows.
    pub fn display_with(&self, conf: &EngineConfig) -> DisplayRows<'_> {
        self.display_rows(conf.display_rows)
    }

    /// Format the first `max_rows` rows.
    pub fn display_rows(&self, max_rows: usize) -> DisplayRows<'_> {
        DisplayRows {
            frame: self,
            max_rows,
        }
    }
}

fn short_row(row: usize, width: usize, len: usize) -> DbError {
    DbError::shape_mismatch(format!(
        "Row must be at least {width} values long, got {len}"
    ))
    .with_field("row", row)
}

/// Formats the first rows of a frame as `Name [{a:1},{a:2},...]`.
#[derive(Debug)]
pub struct DisplayRows<'a> {
    frame: &'a DataFrame,
    max_rows: usize,
}

impl fmt::Display for DisplayRows<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.frame.source_name())?;

        let mut cursor = self.frame.cursor().map_err(|_| fmt::Error)?;
        let mut shown = 0;
        while cursor.advance().map_err(|_| fmt::Error)? {
            if shown > 0 {
                write!(f, ",")?;
            }
            if shown == self.max_rows {
                write!(f, "...")?;
                break;
            }
            write!(f, "{}", cursor.row())?;
            shown += 1;
        }

        write!(f, "]")
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.display_rows(DEFAULT_DISPLAY_ROWS), f)
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    pub fn frame_of(labels: &[&str], rows: Vec<Vec<ScalarValue>>) -> DataFrame {
        DataFrame::from_rows(Index::for_labels(labels.iter().copied()).unwrap(), rows).unwrap()
    }

    pub fn rows_of(df: &DataFrame) -> Vec<Vec<ScalarValue>> {
        df.to_rows().unwrap()
    }
}
