use std::path::PathBuf;

use asset_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record key `{key}` already exists in category `{category}`")]
    DuplicateKey { key: String, category: String },
    #[error("record key `{key}` is being written by another request")]
    KeyBusy { key: String },
    #[error("no workbook exists for category `{category}`")]
    MissingWorkbook { category: String },
    #[error("lookup file `{path}` is unreadable: {reason}")]
    CorruptLookup { path: PathBuf, reason: String },
    #[error("sheet `{sheet}` has no `{column}` column")]
    MissingColumn { sheet: String, column: String },
    #[error(transparent)]
    Invalid(#[from] ModelError),
    #[error("sheet `{sheet}` not found in `{path}`")]
    SheetNotFound { path: PathBuf, sheet: String },
    #[error(
        "sheet `{sheet}` has no header row with record id and latitude columns in its first {rows} rows"
    )]
    HeaderNotFound { sheet: String, rows: usize },
    #[error("failed to access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read workbook `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("failed to write workbook `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
    #[error("queued task for category `{category}` was aborted")]
    TaskAborted { category: String },
    #[error("background file task failed: {0}")]
    Background(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
