//! Spreadsheet-backed record store for infrastructure assets.
//!
//! A store root holds a shared lookup workbook plus one `.xlsx` workbook per category, with one
//! worksheet per region. This crate exposes:
//! - lookup tables (regions, categories, category × region colors)
//! - header schema reconciliation across every region sheet of a category
//! - per-category serialized writes on a tokio runtime
//! - a globally keyed record repository with cross-category moves
//! - bulk import from arbitrary worksheets
//! - a response-envelope service for UI callers

mod category;
mod config;
mod error;
mod fs;
mod geo;
mod import;
mod index;
mod lookup;
mod repository;
pub mod schema;
mod serializer;
mod service;
pub mod workbook;

pub use category::{CategoryStore, RecordLocation};
pub use config::{RegionBox, StoreConfig, DEFAULT_HEADER_SCAN_ROWS, DEFAULT_LOOKUP_FILE};
pub use error::{Result, StoreError};
pub use geo::{BoundingBoxResolver, NoRegionResolver, RegionResolver};
pub use import::{ImportPipeline, ImportSummary, RowError};
pub use index::{KeyClaim, KeyIndex, KeyReservation};
pub use lookup::{ColorEntry, LookupStore};
pub use repository::RecordRepository;
pub use schema::{ReconcileReport, SchemaPlan};
pub use serializer::{WriteHandle, WriteSerializer};
pub use service::{AssetService, Response};
