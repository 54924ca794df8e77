use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{validate_category_name, validate_sheet_name, Attributes, ModelError};

/// Operational status of an asset.
///
/// Input is matched case-insensitively; anything unrecognized (including an empty cell) is
/// normalized to [`Status::Unknown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    Active,
    Inactive,
    Mothballed,
    #[default]
    Unknown,
}

impl Status {
    pub fn parse(text: &str) -> Status {
        let text = text.trim();
        if text.eq_ignore_ascii_case("active") {
            Status::Active
        } else if text.eq_ignore_ascii_case("inactive") {
            Status::Inactive
        } else if text.eq_ignore_ascii_case("mothballed") {
            Status::Mothballed
        } else {
            Status::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::Mothballed => "Mothballed",
            Status::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        Ok(text.as_deref().map(Status::parse).unwrap_or_default())
    }
}

/// Repair priority, 1 (most urgent) through 5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RepairRank(u8);

impl RepairRank {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(rank: i64) -> Result<RepairRank, ModelError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&rank) {
            Ok(RepairRank(rank as u8))
        } else {
            Err(ModelError::RepairRankOutOfRange(rank))
        }
    }

    /// Parse a rank stored as a spreadsheet number; non-integral values are rejected.
    pub fn from_f64(value: f64) -> Result<RepairRank, ModelError> {
        if value.fract() != 0.0 || !value.is_finite() {
            return Err(ModelError::RepairRankOutOfRange(value as i64));
        }
        RepairRank::new(value as i64)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RepairRank {
    type Error = ModelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        RepairRank::new(value)
    }
}

impl From<RepairRank> for u8 {
    fn from(rank: RepairRank) -> u8 {
        rank.0
    }
}

impl fmt::Display for RepairRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One physical asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Globally unique (across every category), case-sensitive key.
    pub record_key: String,
    pub category: String,
    pub region: String,
    #[serde(default)]
    pub site_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair_rank: Option<RepairRank>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl Record {
    pub fn new(
        record_key: impl Into<String>,
        category: impl Into<String>,
        region: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            record_key: record_key.into(),
            category: category.into(),
            region: region.into(),
            site_name: String::new(),
            latitude,
            longitude,
            status: Status::Unknown,
            repair_rank: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_site_name(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = site_name.into();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_repair_rank(mut self, rank: RepairRank) -> Self {
        self.repair_rank = Some(rank);
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Trim the free-text identity fields in place.
    pub fn normalize(&mut self) {
        for field in [
            &mut self.record_key,
            &mut self.category,
            &mut self.region,
            &mut self.site_name,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
    }

    /// Check the invariants a record must satisfy before it is written.
    ///
    /// Call [`Record::normalize`] first; padded keys and names are rejected here.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.record_key.trim().is_empty() {
            return Err(ModelError::EmptyRecordKey);
        }
        if self.category.trim().is_empty() {
            return Err(ModelError::EmptyField { field: "category" });
        }
        if self.region.trim().is_empty() {
            return Err(ModelError::EmptyField { field: "region" });
        }
        validate_category_name(&self.category)?;
        validate_sheet_name(&self.region)?;
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ModelError::LatitudeOutOfRange(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ModelError::LongitudeOutOfRange(self.longitude));
        }
        self.attributes.validate()
    }
}
