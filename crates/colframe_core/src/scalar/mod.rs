pub mod decimal;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use colframe_error::{DbError, Result};
use decimal::Decimal;

/// Logical type of a series or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Only nulls.
    Null,
    Boolean,
    Int32,
    Int64,
    Float64,
    Decimal,
    Utf8,
    Date,
    DateTime,
    /// Values of mixed types.
    Any,
}

impl DataType {
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int32 | DataType::Int64 | DataType::Float64 | DataType::Decimal
        )
    }

    /// Type that can hold values of both `self` and `other`.
    pub fn unify(self, other: DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a,
            (DataType::Null, b) => b,
            (a, DataType::Null) => a,
            _ => DataType::Any,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Null => "Null",
            Self::Boolean => "Boolean",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Float64 => "Float64",
            Self::Decimal => "Decimal",
            Self::Utf8 => "Utf8",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Any => "Any",
        };
        write!(f, "{s}")
    }
}

/// A single, possibly null, value.
///
/// This is the boxed representation used by row views and object series.
/// Cloning is cheap; strings are reference counted.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScalarValue {
    #[default]
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Decimal(Decimal),
    Utf8(Arc<str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl ScalarValue {
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Boolean(_) => DataType::Boolean,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Decimal(_) => DataType::Decimal,
            Self::Utf8(_) => DataType::Utf8,
            Self::Date(_) => DataType::Date,
            Self::DateTime(_) => DataType::DateTime,
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    fn conversion_error(&self, to: DataType) -> DbError {
        DbError::unsupported_conversion(format!(
            "Cannot convert {} value '{self}' to {to}",
            self.datatype()
        ))
    }

    pub fn try_as_bool(&self) -> Result<bool> {
        match self {
            Self::Boolean(v) => Ok(*v),
            other => Err(other.conversion_error(DataType::Boolean)),
        }
    }

    pub fn try_as_i32(&self) -> Result<i32> {
        match self {
            Self::Int32(v) => Ok(*v),
            Self::Int64(v) => i32::try_from(*v).map_err(|_| self.conversion_error(DataType::Int32)),
            other => Err(other.conversion_error(DataType::Int32)),
        }
    }

    pub fn try_as_i64(&self) -> Result<i64> {
        match self {
            Self::Int32(v) => Ok(*v as i64),
            Self::Int64(v) => Ok(*v),
            other => Err(other.conversion_error(DataType::Int64)),
        }
    }

    pub fn try_as_f64(&self) -> Result<f64> {
        match self {
            Self::Int32(v) => Ok(*v as f64),
            Self::Int64(v) => Ok(*v as f64),
            Self::Float64(v) => Ok(*v),
            Self::Decimal(v) => Ok(v.to_f64()),
            other => Err(other.conversion_error(DataType::Float64)),
        }
    }

    pub fn try_as_decimal(&self) -> Result<Decimal> {
        match self {
            Self::Int32(v) => Ok(Decimal::from_i64(*v as i64)),
            Self::Int64(v) => Ok(Decimal::from_i64(*v)),
            Self::Decimal(v) => Ok(*v),
            other => Err(other.conversion_error(DataType::Decimal)),
        }
    }

    pub fn try_as_str(&self) -> Result<&str> {
        match self {
            Self::Utf8(v) => Ok(v),
            other => Err(other.conversion_error(DataType::Utf8)),
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Nulls sort after every non-null value. Numeric values of different
    /// widths compare by value. Otherwise unrelated types compare by their
    /// type tag so that sorting a mixed series is still deterministic.
    pub fn total_cmp(&self, other: &ScalarValue) -> Ordering {
        use ScalarValue as S;

        match (self, other) {
            (S::Null, S::Null) => Ordering::Equal,
            (S::Null, _) => Ordering::Greater,
            (_, S::Null) => Ordering::Less,
            (S::Boolean(a), S::Boolean(b)) => a.cmp(b),
            (S::Int32(a), S::Int32(b)) => a.cmp(b),
            (S::Int64(a), S::Int64(b)) => a.cmp(b),
            (S::Int32(a), S::Int64(b)) => (*a as i64).cmp(b),
            (S::Int64(a), S::Int32(b)) => a.cmp(&(*b as i64)),
            (S::Float64(a), S::Float64(b)) => a.total_cmp(b),
            (S::Decimal(a), S::Decimal(b)) => a.cmp_numeric(b),
            (S::Utf8(a), S::Utf8(b)) => a.cmp(b),
            (S::Date(a), S::Date(b)) => a.cmp(b),
            (S::DateTime(a), S::DateTime(b)) => a.cmp(b),
            (a, b) if a.datatype().is_numeric() && b.datatype().is_numeric() => {
                match (a.try_as_f64(), b.try_as_f64()) {
                    (Ok(a), Ok(b)) => a.total_cmp(&b),
                    _ => Ordering::Equal,
                }
            }
            (a, b) => (a.datatype() as u8).cmp(&(b.datatype() as u8)),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int32(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<Decimal> for ScalarValue {
    fn from(value: Decimal) -> Self {
        ScalarValue::Decimal(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.into())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value.into())
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(value: NaiveDate) -> Self {
        ScalarValue::Date(value)
    }
}

impl From<NaiveDateTime> for ScalarValue {
    fn from(value: NaiveDateTime) -> Self {
        ScalarValue::DateTime(value)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => ScalarValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_sort_last() {
        let mut vals = vec![
            ScalarValue::Null,
            ScalarValue::Int64(3),
            ScalarValue::Int32(1),
            ScalarValue::Null,
            ScalarValue::Float64(2.5),
        ];
        vals.sort_by(|a, b| a.total_cmp(b));

        assert_eq!(
            vec![
                ScalarValue::Int32(1),
                ScalarValue::Float64(2.5),
                ScalarValue::Int64(3),
                ScalarValue::Null,
                ScalarValue::Null,
            ],
            vals
        );
    }

    #[test]
    fn widening_conversions() {
        assert_eq!(4, ScalarValue::Int32(4).try_as_i64().unwrap());
        assert_eq!(4.0, ScalarValue::Int64(4).try_as_f64().unwrap());
        ScalarValue::from("4").try_as_i64().unwrap_err();
        ScalarValue::Int64(i64::MAX).try_as_i32().unwrap_err();
    }

    #[test]
    fn unify_types() {
        assert_eq!(DataType::Int64, DataType::Null.unify(DataType::Int64));
        assert_eq!(DataType::Any, DataType::Utf8.unify(DataType::Int64));
        assert_eq!(DataType::Utf8, DataType::Utf8.unify(DataType::Utf8));
    }
}
