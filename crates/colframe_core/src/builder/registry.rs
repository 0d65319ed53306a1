use std::fmt;
use std::sync::Arc;

use colframe_error::{DbError, Result};

use super::{
    BooleanSeriesBuilder,
    DoubleSeriesBuilder,
    IntSeriesBuilder,
    LongSeriesBuilder,
    NoTransformSeriesBuilder,
    SeriesBuilder,
    TransformingSeriesBuilder,
};
use crate::config::EngineConfig;
use crate::convert::{StringConverter, ValueMapper};
use crate::index::Index;

/// Reference to a column by label or by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Name(String),
    Position(usize),
}

impl ColumnRef {
    pub fn resolve(&self, index: &Index) -> Result<usize> {
        match self {
            Self::Name(name) => index.position(name),
            Self::Position(pos) => {
                if *pos >= index.len() {
                    return Err(DbError::out_of_bounds(format!(
                        "Column position {pos} out of bounds for width {}",
                        index.len()
                    )));
                }
                Ok(*pos)
            }
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Position(pos) => write!(f, "#{pos}"),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(value: &str) -> Self {
        ColumnRef::Name(value.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(value: String) -> Self {
        ColumnRef::Name(value)
    }
}

impl From<usize> for ColumnRef {
    fn from(value: usize) -> Self {
        ColumnRef::Position(value)
    }
}

/// Unboxed column storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Int32,
    Int64,
    Float64,
    Boolean,
}

/// How a column's raw fields are converted.
#[derive(Debug, Clone)]
pub enum ColumnType {
    /// Unboxed, empty fields become 0.
    Int32,
    Int64,
    /// Parsed with single precision.
    Float32,
    Float64,
    Decimal,
    Boolean,
    /// Date with an explicit format, or the configured default.
    Date(Option<String>),
    DateTime(Option<String>),
    /// Unboxed storage for any primitive kind. Empty fields become the zero
    /// value.
    Unboxed(PrimitiveKind),
    Mapper(Arc<dyn ValueMapper>),
}

impl ColumnType {
    pub fn builder(&self, conf: &EngineConfig) -> Box<dyn SeriesBuilder> {
        let capacity = conf.accumulator_capacity;
        let transforming = |conv: StringConverter| -> Box<dyn SeriesBuilder> {
            Box::new(TransformingSeriesBuilder::new(Arc::new(conv), capacity))
        };

        match self {
            Self::Int32 | Self::Unboxed(PrimitiveKind::Int32) => {
                Box::new(IntSeriesBuilder::new(capacity))
            }
            Self::Unboxed(PrimitiveKind::Int64) => Box::new(LongSeriesBuilder::new(capacity)),
            Self::Unboxed(PrimitiveKind::Float64) => Box::new(DoubleSeriesBuilder::new(capacity)),
            Self::Unboxed(PrimitiveKind::Boolean) => {
                Box::new(BooleanSeriesBuilder::new(capacity))
            }
            Self::Int64 => transforming(StringConverter::Int64),
            Self::Float32 => transforming(StringConverter::Float32),
            Self::Float64 => transforming(StringConverter::Float64),
            Self::Decimal => transforming(StringConverter::Decimal),
            Self::Boolean => transforming(StringConverter::Boolean),
            Self::Date(format) => transforming(StringConverter::Date {
                format: format.clone().unwrap_or_else(|| conf.date_format.clone()),
            }),
            Self::DateTime(format) => transforming(StringConverter::DateTime {
                format: format.clone().unwrap_or_else(|| conf.datetime_format.clone()),
            }),
            Self::Mapper(mapper) => {
                Box::new(TransformingSeriesBuilder::new(mapper.clone(), capacity))
            }
        }
    }
}

/// Ordered set of per-column conversion rules.
///
/// Rules are resolved against an index when ingestion starts. When several
/// rules point at the same column the one registered last wins. Columns
/// without a rule keep their raw strings.
#[derive(Debug, Clone, Default)]
pub struct ColumnBuilders {
    rules: Vec<(ColumnRef, ColumnType)>,
}

impl ColumnBuilders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_type(mut self, column: impl Into<ColumnRef>, column_type: ColumnType) -> Self {
        self.rules.push((column.into(), column_type));
        self
    }

    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    /// Resolve the rule applying to each position of `index`.
    pub fn resolve_types(&self, index: &Index) -> Result<Vec<Option<&ColumnType>>> {
        let mut resolved = vec![None; index.len()];
        for (column, column_type) in &self.rules {
            let pos = column.resolve(index)?;
            resolved[pos] = Some(column_type);
        }
        Ok(resolved)
    }

    /// Create one builder per column of `index`.
    pub fn resolve(&self, index: &Index, conf: &EngineConfig) -> Result<Vec<Box<dyn SeriesBuilder>>> {
        let builders = self
            .resolve_types(index)?
            .into_iter()
            .map(|column_type| match column_type {
                Some(column_type) => column_type.builder(conf),
                None => Box::new(NoTransformSeriesBuilder::new(conf.accumulator_capacity)) as _,
            })
            .collect();

        Ok(builders)
    }
}
