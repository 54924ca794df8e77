//! `asset-model` defines the in-memory data structures for asset records.
//!
//! The crate has no I/O so it can be shared by:
//! - the spreadsheet-backed record store (`asset-store`)
//! - command-line and UI boundaries via `serde` (JSON-safe schema)

mod attributes;
pub mod columns;
mod error;
mod names;
mod record;

pub use attributes::{parse_column_name, Attributes};
pub use columns::{is_core_column, CoreColumn, ATTRIBUTE_SEPARATOR, CORE_COLUMNS};
pub use error::ModelError;
pub use names::{
    name_casefold, name_eq_case_insensitive, split_region_suffix, validate_category_name,
    validate_sheet_name, EXCEL_SHEET_NAME_MAX_LEN,
};
pub use record::{Record, RepairRank, Status};
