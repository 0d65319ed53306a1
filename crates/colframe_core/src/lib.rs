//! Typed columnar data frames.
//!
//! Columns are stored as [`Series`], built through accumulators and
//! string converters during ingestion. Frames are immutable handles over a
//! chain of lazy transformations that is pulled row by row through a
//! cursor, and can be materialized once to cache their rows.

pub mod accumulator;
pub mod agg;
pub mod builder;
pub mod config;
pub mod convert;
pub mod expr;
pub mod frame;
pub mod index;
pub mod scalar;
pub mod series;

pub use frame::DataFrame;
pub use index::Index;
pub use scalar::{DataType, ScalarValue};
pub use series::Series;
