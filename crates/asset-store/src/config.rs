use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default number of leading rows searched for an import header row.
pub const DEFAULT_HEADER_SCAN_ROWS: usize = 10;

/// Default lookup workbook name, relative to [`StoreConfig::root`].
pub const DEFAULT_LOOKUP_FILE: &str = "lookup.xlsx";

/// Bounding box mapping a coordinate rectangle to a region code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionBox {
    pub code: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl RegionBox {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Directory holding the lookup workbook and one workbook per category (default: `.`).
    pub root: PathBuf,
    /// Lookup workbook file name inside `root` (default: `lookup.xlsx`).
    pub lookup_file: String,
    /// Rows searched for the header row when importing (default: 10).
    pub header_scan_rows: usize,
    /// Boxes used to infer a region from coordinates during import (default: none).
    pub region_boxes: Vec<RegionBox>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            lookup_file: DEFAULT_LOOKUP_FILE.to_string(),
            header_scan_rows: DEFAULT_HEADER_SCAN_ROWS,
            region_boxes: Vec::new(),
        }
    }
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn lookup_path(&self) -> PathBuf {
        self.root.join(&self.lookup_file)
    }

    pub fn category_path(&self, category: &str) -> PathBuf {
        self.root.join(format!("{category}.xlsx"))
    }

    /// Whether `path` is the lookup workbook rather than a category workbook.
    pub fn is_lookup_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.eq_ignore_ascii_case(&self.lookup_file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{ "root": "/data/assets" }"#).unwrap();
        assert_eq!(config.root, PathBuf::from("/data/assets"));
        assert_eq!(config.lookup_file, DEFAULT_LOOKUP_FILE);
        assert_eq!(config.header_scan_rows, DEFAULT_HEADER_SCAN_ROWS);
        assert!(config.region_boxes.is_empty());
        assert_eq!(
            config.category_path("Weir"),
            PathBuf::from("/data/assets/Weir.xlsx")
        );
    }

    #[test]
    fn recognizes_lookup_path() {
        let config = StoreConfig::new("/data");
        assert!(config.is_lookup_path(Path::new("/data/lookup.xlsx")));
        assert!(config.is_lookup_path(Path::new("/data/LOOKUP.XLSX")));
        assert!(!config.is_lookup_path(Path::new("/data/Weir.xlsx")));
    }
}
