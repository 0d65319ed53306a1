use std::sync::Arc;

use colframe_error::{DbError, Result};
use tracing::trace;

use super::SeriesBuilder;
use super::registry::ColumnBuilders;
use crate::config::EngineConfig;
use crate::frame::DataFrame;
use crate::index::Index;
use crate::scalar::ScalarValue;

/// Assembles a frame row by row, one builder per column.
///
/// Rows shorter than the index width are rejected. Extra trailing fields are
/// ignored. The first field that fails to convert aborts ingestion with the
/// row number and column label attached to the error.
#[derive(Debug)]
pub struct FrameIngest {
    columns: Arc<Index>,
    builders: Vec<Box<dyn SeriesBuilder>>,
    rows: usize,
}

impl FrameIngest {
    pub fn new(columns: impl Into<Arc<Index>>, rules: &ColumnBuilders, conf: &EngineConfig) -> Result<Self> {
        let columns = columns.into();
        let builders = rules.resolve(&columns, conf)?;
        Ok(FrameIngest {
            columns,
            builders,
            rows: 0,
        })
    }

    /// Ingest with raw strings kept for every column.
    pub fn with_no_transform(columns: impl Into<Arc<Index>>, conf: &EngineConfig) -> Result<Self> {
        Self::new(columns, &ColumnBuilders::new(), conf)
    }

    pub fn columns(&self) -> &Arc<Index> {
        &self.columns
    }

    /// Number of rows ingested so far.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    fn check_width(&self, len: usize) -> Result<()> {
        let width = self.columns.len();
        if len < width {
            return Err(DbError::shape_mismatch(format!(
                "Row must be at least {width} values long, got {len}"
            ))
            .with_field("row", self.rows));
        }
        Ok(())
    }

    fn conversion_failed(&self, pos: usize, e: DbError) -> DbError {
        let label = self.columns.label(pos).unwrap_or("?");
        DbError::with_source("Failed to ingest value", Box::new(e))
            .with_field("row", self.rows)
            .with_field("column", label)
    }

    /// Add a record of raw string fields.
    ///
    /// Every field is converted before any column is written, so a failed
    /// record leaves the ingest unchanged.
    pub fn add_record<S: AsRef<str>>(&mut self, record: &[S]) -> Result<()> {
        self.check_width(record.len())?;

        let values = self
            .builders
            .iter()
            .zip(record)
            .enumerate()
            .map(|(pos, (builder, raw))| {
                builder
                    .convert(raw.as_ref())
                    .map_err(|e| self.conversion_failed(pos, e))
            })
            .collect::<Result<Vec<_>>>()?;

        self.append_values(values)
    }

    /// Add a row of already typed values. A row that fails leaves the ingest
    /// unchanged.
    pub fn add_row(&mut self, mut row: Vec<ScalarValue>) -> Result<()> {
        self.check_width(row.len())?;
        row.truncate(self.builders.len());

        for (pos, (builder, value)) in self.builders.iter().zip(&row).enumerate() {
            if let Err(e) = builder.check_value(value) {
                return Err(self.conversion_failed(pos, e));
            }
        }

        self.append_values(row)
    }

    fn append_values(&mut self, values: Vec<ScalarValue>) -> Result<()> {
        for (builder, value) in self.builders.iter_mut().zip(values) {
            builder.append_value(value)?;
        }
        self.rows += 1;
        Ok(())
    }

    /// Produce the frame from the accumulated columns.
    pub fn finish(mut self) -> Result<DataFrame> {
        let series = self
            .builders
            .iter_mut()
            .map(|b| b.to_series())
            .collect::<Result<Vec<_>>>()?;

        trace!(
            rows = self.rows,
            columns = self.columns.len(),
            "finished frame ingest"
        );

        DataFrame::from_columns(self.columns, series)
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;
    use crate::builder::registry::ColumnType;
    use crate::scalar::DataType;

    fn index() -> Index {
        Index::for_labels(["name", "age", "score"]).unwrap()
    }

    #[test]
    fn ingest_records() {
        let rules = ColumnBuilders::new()
            .column_type("age", ColumnType::Int32)
            .column_type("score", ColumnType::Decimal);

        let mut ingest = FrameIngest::new(index(), &rules, &EngineConfig::default()).unwrap();
        ingest.add_record(&["ann", "31", "1.50"]).unwrap();
        ingest.add_record(&["bob", "", ""]).unwrap();
        assert_eq!(2, ingest.num_rows());

        let df = ingest.finish().unwrap();
        assert_eq!(2, df.height().unwrap());

        let age = df.column("age").unwrap();
        assert_eq!(&[31, 0], age.as_int32().unwrap().values());

        let score = df.column("score").unwrap();
        assert_eq!(DataType::Decimal, score.datatype());
        assert_eq!(ScalarValue::Null, score.get(1).unwrap());

        let name = df.column("name").unwrap();
        assert_eq!(DataType::Utf8, name.datatype());
    }

    #[test]
    fn short_record() {
        let mut ingest = FrameIngest::with_no_transform(index(), &EngineConfig::default()).unwrap();
        let err = ingest.add_record(&["ann", "31"]).unwrap_err();
        assert_eq!(ErrorKind::ShapeMismatch, err.kind());
    }

    #[test]
    fn extra_fields_ignored() {
        let mut ingest = FrameIngest::with_no_transform(index(), &EngineConfig::default()).unwrap();
        ingest.add_record(&["a", "b", "c", "d"]).unwrap();
        let df = ingest.finish().unwrap();
        assert_eq!(3, df.width());
        assert_eq!(1, df.height().unwrap());
    }

    #[test]
    fn conversion_failure_names_row_and_column() {
        let rules = ColumnBuilders::new().column_type("age", ColumnType::Int32);
        let mut ingest = FrameIngest::new(index(), &rules, &EngineConfig::default()).unwrap();
        ingest.add_record(&["ann", "31", "x"]).unwrap();

        let err = ingest.add_record(&["bob", "old", "x"]).unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());

        let fields: Vec<_> = err.fields().collect();
        assert!(fields.contains(&("row", "1")));
        assert!(fields.contains(&("column", "age")));
    }

    #[test]
    fn failed_record_keeps_earlier_rows() {
        let rules = ColumnBuilders::new().column_type("score", ColumnType::Int32);
        let mut ingest = FrameIngest::new(index(), &rules, &EngineConfig::default()).unwrap();

        ingest.add_record(&["ann", "31", "7"]).unwrap();
        ingest.add_record(&["bob", "40", "high"]).unwrap_err();
        ingest.add_record(&["cid", "25", "9"]).unwrap();
        assert_eq!(2, ingest.num_rows());

        let df = ingest.finish().unwrap();
        assert_eq!(2, df.height().unwrap());
        assert_eq!(
            vec![ScalarValue::from("ann"), "cid".into()],
            df.column("name").unwrap().to_values()
        );
        assert_eq!(&[7, 9], df.column("score").unwrap().as_int32().unwrap().values());
    }

    #[test]
    fn failed_typed_row_keeps_earlier_rows() {
        let rules = ColumnBuilders::new().column_type("score", ColumnType::Int32);
        let mut ingest = FrameIngest::new(index(), &rules, &EngineConfig::default()).unwrap();

        ingest
            .add_row(vec!["ann".into(), 31_i64.into(), ScalarValue::Int32(7)])
            .unwrap();
        let err = ingest
            .add_row(vec!["bob".into(), 40_i64.into(), "high".into()])
            .unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());

        let df = ingest.finish().unwrap();
        assert_eq!(1, df.height().unwrap());
        assert_eq!(&[7], df.column("score").unwrap().as_int32().unwrap().values());
    }

    #[test]
    fn typed_rows() {
        let mut ingest = FrameIngest::with_no_transform(index(), &EngineConfig::default()).unwrap();
        ingest
            .add_row(vec!["ann".into(), 31_i64.into(), ScalarValue::Null])
            .unwrap();

        let err = ingest.add_row(vec!["bob".into()]).unwrap_err();
        assert_eq!(ErrorKind::ShapeMismatch, err.kind());

        let df = ingest.finish().unwrap();
        assert_eq!(ScalarValue::Int64(31), df.get("age", 0).unwrap());
    }
}
