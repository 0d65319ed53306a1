use std::error::Error;
use std::fmt;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Broad category of an error.
///
/// Callers that need to react to a specific failure (e.g. a missing column)
/// can match on this instead of inspecting the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Series lengths disagree within a frame, or a row is too short.
    ShapeMismatch,
    /// Two labels collide in an index.
    DuplicateName,
    /// A label isn't present in an index.
    NameNotFound,
    /// Positional access past the end of a series, index or row.
    IndexOutOfBounds,
    /// No mapping exists from a value to the requested type.
    UnsupportedConversion,
    /// An operation was attempted on an object in the wrong state, e.g.
    /// appending to a spent accumulator.
    IllegalState,
    /// Everything else.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ShapeMismatch => "shape mismatch",
            Self::DuplicateName => "duplicate name",
            Self::NameNotFound => "name not found",
            Self::IndexOutOfBounds => "index out of bounds",
            Self::UnsupportedConversion => "unsupported conversion",
            Self::IllegalState => "illegal state",
            Self::Internal => "internal",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug)]
pub struct DbError {
    inner: Box<DbErrorInner>,
}

#[derive(Debug)]
struct DbErrorInner {
    kind: ErrorKind,
    msg: String,
    source: Option<Box<dyn Error + Send + Sync>>,
    fields: Vec<(&'static str, String)>,
}

impl DbError {
    /// Create a new internal error with the given message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Internal, msg)
    }

    pub fn with_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        DbError {
            inner: Box::new(DbErrorInner {
                kind,
                msg: msg.into(),
                source: None,
                fields: Vec::new(),
            }),
        }
    }

    pub fn with_source(msg: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        // Inherit the kind of the wrapped error if it's one of ours.
        let kind = match source.downcast_ref::<DbError>() {
            Some(err) => err.kind(),
            None => ErrorKind::Internal,
        };

        DbError {
            inner: Box::new(DbErrorInner {
                kind,
                msg: msg.into(),
                source: Some(source),
                fields: Vec::new(),
            }),
        }
    }

    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::ShapeMismatch, msg)
    }

    pub fn duplicate_name(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::DuplicateName, msg)
    }

    pub fn name_not_found(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::NameNotFound, msg)
    }

    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::IndexOutOfBounds, msg)
    }

    pub fn unsupported_conversion(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::UnsupportedConversion, msg)
    }

    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::IllegalState, msg)
    }

    /// Attach a key/value pair to the error for additional context.
    pub fn with_field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.inner.fields.push((key, value.to_string()));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn message(&self) -> &str {
        &self.inner.msg
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.inner.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;

        for (key, value) in &self.inner.fields {
            write!(f, "\n  {key}: {value}")?;
        }

        if let Some(source) = &self.inner.source {
            write!(f, "\nError source: {source}")?;
        }

        Ok(())
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<fmt::Error> for DbError {
    fn from(value: fmt::Error) -> Self {
        DbError::with_source("Format error", Box::new(value))
    }
}

impl From<std::num::ParseIntError> for DbError {
    fn from(value: std::num::ParseIntError) -> Self {
        DbError::with_kind(
            ErrorKind::UnsupportedConversion,
            format!("Failed to parse integer: {value}"),
        )
    }
}

impl From<std::num::ParseFloatError> for DbError {
    fn from(value: std::num::ParseFloatError) -> Self {
        DbError::with_kind(
            ErrorKind::UnsupportedConversion,
            format!("Failed to parse float: {value}"),
        )
    }
}

/// Wrap errors with additional context.
pub trait ResultExt<T, E> {
    fn context(self, msg: &'static str) -> Result<T>;

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Error + Send + Sync + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn context(self, msg: &'static str) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(DbError::with_source(msg, Box::new(e))),
        }
    }

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(DbError::with_source(f(), Box::new(e))),
        }
    }
}

pub trait OptionExt<T> {
    /// Return an internal error if the option is `None`.
    fn required(self, what: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, what: &'static str) -> Result<T> {
        match self {
            Some(v) => Ok(v),
            None => Err(DbError::new(format!("Missing required value: {what}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_fields_and_source() {
        let inner = DbError::name_not_found("Missing column").with_field("name", "a");
        let outer: Result<()> = Err::<(), _>(inner).context("Failed to evaluate expression");

        let err = outer.unwrap_err();
        assert_eq!(ErrorKind::NameNotFound, err.kind());

        let s = err.to_string();
        assert!(s.starts_with("Failed to evaluate expression"));
        assert!(s.contains("Missing column"));
        assert!(s.contains("name: a"));
    }

    #[test]
    fn required_on_none() {
        let err = None::<i32>.required("upstream frame").unwrap_err();
        assert_eq!(ErrorKind::Internal, err.kind());
        assert!(err.message().contains("upstream frame"));
    }

    #[test]
    fn parse_errors_are_conversions() {
        let err: DbError = "abc".parse::<i64>().unwrap_err().into();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());
    }
}
