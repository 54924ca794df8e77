use thiserror::Error;

/// Validation errors raised while building or normalizing records.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ModelError {
    #[error("record key cannot be empty")]
    EmptyRecordKey,
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("repair rank {0} is outside 1..=5")]
    RepairRankOutOfRange(i64),
    #[error("invalid attribute section `{section}`: {reason}")]
    InvalidSection { section: String, reason: &'static str },
    #[error("attribute field in section `{section}` is empty or has surrounding whitespace")]
    EmptyAttributeField { section: String },
    #[error("invalid sheet name `{name}`: {reason}")]
    InvalidSheetName { name: String, reason: String },
    #[error("invalid category name `{name}`: {reason}")]
    InvalidCategoryName { name: String, reason: String },
}
