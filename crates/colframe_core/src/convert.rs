//! Conversions from raw string fields to typed values.
//!
//! Every converter maps the empty string to null. Values that can't be
//! converted produce an `UnsupportedConversion` error.

use std::fmt::{self, Debug};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use colframe_error::{DbError, Result};

use crate::scalar::decimal::Decimal;
use crate::scalar::{DataType, ScalarValue};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub trait ValueMapper: Debug + Send + Sync {
    /// Logical type of the values produced.
    fn datatype(&self) -> DataType;

    fn map(&self, raw: &str) -> Result<ScalarValue>;
}

/// Built-in string converters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringConverter {
    Int32,
    Int64,
    /// Parsed with single precision, stored as Float64.
    Float32,
    Float64,
    Decimal,
    Boolean,
    Date { format: String },
    DateTime { format: String },
}

impl StringConverter {
    pub fn date() -> Self {
        StringConverter::Date {
            format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn date_time() -> Self {
        StringConverter::DateTime {
            format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }
}

fn conversion_error(raw: &str, to: DataType) -> DbError {
    DbError::unsupported_conversion(format!("Cannot convert '{raw}' to {to}"))
}

impl ValueMapper for StringConverter {
    fn datatype(&self) -> DataType {
        match self {
            Self::Int32 => DataType::Int32,
            Self::Int64 => DataType::Int64,
            Self::Float32 | Self::Float64 => DataType::Float64,
            Self::Decimal => DataType::Decimal,
            Self::Boolean => DataType::Boolean,
            Self::Date { .. } => DataType::Date,
            Self::DateTime { .. } => DataType::DateTime,
        }
    }

    fn map(&self, raw: &str) -> Result<ScalarValue> {
        if raw.is_empty() {
            return Ok(ScalarValue::Null);
        }

        let datatype = self.datatype();
        let trimmed = raw.trim();

        let value = match self {
            Self::Int32 => trimmed
                .parse::<i32>()
                .map(ScalarValue::Int32)
                .map_err(|_| conversion_error(raw, datatype))?,
            Self::Int64 => trimmed
                .parse::<i64>()
                .map(ScalarValue::Int64)
                .map_err(|_| conversion_error(raw, datatype))?,
            Self::Float32 => trimmed
                .parse::<f32>()
                .map(|v| ScalarValue::Float64(v as f64))
                .map_err(|_| conversion_error(raw, datatype))?,
            Self::Float64 => trimmed
                .parse::<f64>()
                .map(ScalarValue::Float64)
                .map_err(|_| conversion_error(raw, datatype))?,
            Self::Decimal => ScalarValue::Decimal(Decimal::parse(trimmed)?),
            Self::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" => ScalarValue::Boolean(true),
                "false" => ScalarValue::Boolean(false),
                _ => return Err(conversion_error(raw, datatype)),
            },
            Self::Date { format } => NaiveDate::parse_from_str(trimmed, format)
                .map(ScalarValue::Date)
                .map_err(|e| conversion_error(raw, datatype).with_field("reason", e))?,
            Self::DateTime { format } => NaiveDateTime::parse_from_str(trimmed, format)
                .map(ScalarValue::DateTime)
                .map_err(|e| conversion_error(raw, datatype).with_field("reason", e))?,
        };

        Ok(value)
    }
}

type MapFn = dyn Fn(&str) -> Result<ScalarValue> + Send + Sync;

/// Converter backed by a caller supplied function.
#[derive(Clone)]
pub struct FnMapper {
    datatype: DataType,
    func: Arc<MapFn>,
}

impl FnMapper {
    pub fn new<F>(datatype: DataType, func: F) -> Self
    where
        F: Fn(&str) -> Result<ScalarValue> + Send + Sync + 'static,
    {
        FnMapper {
            datatype,
            func: Arc::new(func),
        }
    }
}

impl Debug for FnMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMapper")
            .field("datatype", &self.datatype)
            .finish_non_exhaustive()
    }
}

impl ValueMapper for FnMapper {
    fn datatype(&self) -> DataType {
        self.datatype
    }

    fn map(&self, raw: &str) -> Result<ScalarValue> {
        (self.func)(raw)
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(ScalarValue::Int32(-4), StringConverter::Int32.map("-4").unwrap());
        assert_eq!(ScalarValue::Int64(12), StringConverter::Int64.map(" 12 ").unwrap());
        assert_eq!(ScalarValue::Float64(1.5), StringConverter::Float64.map("1.5").unwrap());
        assert_eq!(ScalarValue::Float64(0.5), StringConverter::Float32.map("0.5").unwrap());
        assert_eq!(
            ScalarValue::Decimal(Decimal::parse("1.25").unwrap()),
            StringConverter::Decimal.map("1.25").unwrap()
        );
    }

    #[test]
    fn empty_is_null() {
        for conv in [
            StringConverter::Int32,
            StringConverter::Decimal,
            StringConverter::Boolean,
            StringConverter::date(),
        ] {
            assert_eq!(ScalarValue::Null, conv.map("").unwrap());
        }
    }

    #[test]
    fn invalid_input() {
        let err = StringConverter::Int64.map("ten").unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());

        let err = StringConverter::Boolean.map("yes").unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());
    }

    #[test]
    fn dates() {
        let d = StringConverter::date().map("2024-02-29").unwrap();
        assert_eq!(
            ScalarValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            d
        );

        let custom = StringConverter::Date {
            format: "%d/%m/%Y".to_string(),
        };
        assert_eq!(d, custom.map("29/02/2024").unwrap());

        let dt = StringConverter::date_time().map("2024-01-02T03:04:05").unwrap();
        assert_eq!(DataType::DateTime, dt.datatype());
    }

    #[test]
    fn custom_fn() {
        let mapper = FnMapper::new(DataType::Int64, |s| Ok(ScalarValue::Int64(s.len() as i64)));
        assert_eq!(ScalarValue::Int64(3), mapper.map("abc").unwrap());
    }
}
