//! Transformation module.
//!
//! - Schema: column classification and expanded header
//! - Row: date column expansion for one row
//! - Pipeline: batched read / transform / write

pub mod pipeline;
pub mod row;
pub mod schema;

pub use pipeline::*;
pub use row::{expand_date_cell, transform_row, CellFailure, TransformedRow};
pub use schema::{build_mapping, classify_sample, ColumnDescriptor, SchemaMapping};
