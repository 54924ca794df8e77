//! Shared lookup workbook: known regions, known categories and the category × region color map.
//!
//! Every mutation rewrites the whole workbook before returning. A lookup file that can't be read
//! is replaced with an empty one; it holds bootstrap metadata only, never records.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use asset_model::{name_eq_case_insensitive, ModelError};
use serde::{Deserialize, Serialize};

use crate::workbook::{read_sheets, write_sheets, CellValue, RawSheet, SheetLayout};
use crate::{Result, StoreError};

const REGIONS_SHEET: &str = "Regions";
const CATEGORIES_SHEET: &str = "Categories";
const COLORS_SHEET: &str = "Colors";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorEntry {
    pub category: String,
    pub region: String,
    pub color: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct LookupTables {
    regions: Vec<String>,
    categories: Vec<String>,
    colors: Vec<ColorEntry>,
}

impl LookupTables {
    fn parse(sheets: Vec<RawSheet>) -> std::result::Result<LookupTables, String> {
        let find = |name: &str| {
            sheets
                .iter()
                .find(|s| s.name == name)
                .ok_or_else(|| format!("missing `{name}` sheet"))
        };

        let mut tables = LookupTables::default();
        for value in column_values(find(REGIONS_SHEET)?, 0) {
            push_unique(&mut tables.regions, &value);
        }
        for value in column_values(find(CATEGORIES_SHEET)?, 0) {
            push_unique(&mut tables.categories, &value);
        }
        let colors = find(COLORS_SHEET)?;
        for row in 1..colors.rows.len() {
            let category = colors.cell(row, 0).as_text().trim().to_string();
            let region = colors.cell(row, 1).as_text().trim().to_string();
            let color = colors.cell(row, 2).as_text().trim().to_string();
            if category.is_empty() || region.is_empty() {
                continue;
            }
            tables.set_color(category, region, color);
        }
        Ok(tables)
    }

    fn set_color(&mut self, category: String, region: String, color: String) {
        match self.colors.iter_mut().find(|entry| {
            name_eq_case_insensitive(&entry.category, &category)
                && name_eq_case_insensitive(&entry.region, &region)
        }) {
            Some(entry) => entry.color = color,
            None => self.colors.push(ColorEntry {
                category,
                region,
                color,
            }),
        }
    }

    fn write(&self, path: &Path) -> Result<()> {
        let single = |values: &[String]| -> Vec<Vec<CellValue>> {
            values.iter().map(|v| vec![CellValue::text(v.clone())]).collect()
        };
        let region_rows = single(&self.regions);
        let category_rows = single(&self.categories);
        let color_rows: Vec<Vec<CellValue>> = self
            .colors
            .iter()
            .map(|entry| {
                vec![
                    CellValue::text(entry.category.clone()),
                    CellValue::text(entry.region.clone()),
                    CellValue::text(entry.color.clone()),
                ]
            })
            .collect();

        let region_header = vec!["Region".to_string()];
        let category_header = vec!["Category".to_string()];
        let color_header = vec![
            "Category".to_string(),
            "Region".to_string(),
            "Color".to_string(),
        ];

        write_sheets(
            path,
            &[
                SheetLayout {
                    name: REGIONS_SHEET,
                    title: None,
                    header: &region_header,
                    rows: &region_rows,
                },
                SheetLayout {
                    name: CATEGORIES_SHEET,
                    title: None,
                    header: &category_header,
                    rows: &category_rows,
                },
                SheetLayout {
                    name: COLORS_SHEET,
                    title: None,
                    header: &color_header,
                    rows: &color_rows,
                },
            ],
        )
    }
}

/// Non-empty values of column `col`, skipping the header row.
fn column_values(sheet: &RawSheet, col: usize) -> Vec<String> {
    (1..sheet.rows.len())
        .map(|row| sheet.cell(row, col).as_text().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Append `value` unless a case-insensitive duplicate exists. Returns whether it was added.
fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|existing| name_eq_case_insensitive(existing, value)) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn validated_name(name: &str, field: &'static str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ModelError::EmptyField { field }.into());
    }
    Ok(name.to_string())
}

#[derive(Debug)]
pub struct LookupStore {
    path: PathBuf,
    tables: Mutex<LookupTables>,
}

impl LookupStore {
    /// Open (or create) the lookup workbook at `path`.
    ///
    /// An unreadable or malformed file is logged and replaced with an empty workbook.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = if path.exists() {
            match Self::load(&path) {
                Ok(tables) => tables,
                Err(err) => {
                    log::warn!("{err}; resetting lookup tables");
                    let tables = LookupTables::default();
                    tables.write(&path)?;
                    tables
                }
            }
        } else {
            let tables = LookupTables::default();
            tables.write(&path)?;
            tables
        };

        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    fn load(path: &Path) -> Result<LookupTables> {
        let corrupt = |reason: String| StoreError::CorruptLookup {
            path: path.to_path_buf(),
            reason,
        };
        let sheets = read_sheets(path).map_err(|err| corrupt(err.to_string()))?;
        LookupTables::parse(sheets).map_err(corrupt)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `mutate` to a copy of the tables, persist the copy, then publish it.
    ///
    /// The in-memory tables are left untouched if the write fails.
    fn update<T>(&self, mutate: impl FnOnce(&mut LookupTables) -> T) -> Result<T> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = tables.clone();
        let out = mutate(&mut next);
        if next != *tables {
            next.write(&self.path)?;
            *tables = next;
        }
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&LookupTables) -> T) -> T {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        f(&tables)
    }

    pub fn list_regions(&self) -> Vec<String> {
        self.read(|t| t.regions.clone())
    }

    pub fn list_categories(&self) -> Vec<String> {
        self.read(|t| t.categories.clone())
    }

    /// Register a region. Returns `false` if a case-insensitive duplicate already exists.
    pub fn add_region(&self, name: &str) -> Result<bool> {
        let name = validated_name(name, "region")?;
        self.update(|t| push_unique(&mut t.regions, &name))
    }

    /// Register a category. Returns `false` if a case-insensitive duplicate already exists.
    pub fn add_category(&self, name: &str) -> Result<bool> {
        let name = validated_name(name, "category")?;
        self.update(|t| push_unique(&mut t.categories, &name))
    }

    /// Color for `(category, region)`: exact match first, then case-insensitive.
    pub fn get_color(&self, category: &str, region: &str) -> Option<String> {
        self.read(|t| {
            t.colors
                .iter()
                .find(|e| e.category == category && e.region == region)
                .or_else(|| {
                    t.colors.iter().find(|e| {
                        name_eq_case_insensitive(&e.category, category)
                            && name_eq_case_insensitive(&e.region, region)
                    })
                })
                .map(|e| e.color.clone())
        })
    }

    /// Set the color for `(category, region)`; the last write wins.
    pub fn set_color(&self, category: &str, region: &str, color: &str) -> Result<()> {
        let category = validated_name(category, "category")?;
        let region = validated_name(region, "region")?;
        let color = color.trim().to_string();
        self.update(|t| t.set_color(category, region, color))
    }

    pub fn colors(&self) -> Vec<ColorEntry> {
        self.read(|t| t.colors.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_created_empty() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let path = tmp.path().join("lookup.xlsx");
        let store = LookupStore::open(&path).expect("open lookup");
        assert!(path.exists());
        assert!(store.list_regions().is_empty());
        assert!(store.list_categories().is_empty());
    }

    #[test]
    fn adds_dedupe_case_insensitively_and_persist() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let path = tmp.path().join("lookup.xlsx");
        let store = LookupStore::open(&path).expect("open lookup");

        assert!(store.add_region("BC").unwrap());
        assert!(!store.add_region("bc").unwrap());
        assert!(store.add_region(" AB ").unwrap());
        assert!(store.add_category("Weir").unwrap());
        assert!(!store.add_category("WEIR").unwrap());
        assert!(store.add_region("").is_err());

        let reopened = LookupStore::open(&path).expect("reopen lookup");
        assert_eq!(reopened.list_regions(), vec!["BC".to_string(), "AB".to_string()]);
        assert_eq!(reopened.list_categories(), vec!["Weir".to_string()]);
    }

    #[test]
    fn colors_are_last_write_wins() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let path = tmp.path().join("lookup.xlsx");
        let store = LookupStore::open(&path).expect("open lookup");

        assert_eq!(store.get_color("Weir", "BC"), None);
        store.set_color("Weir", "BC", "#ff0000").unwrap();
        store.set_color("Weir", "AB", "#00ff00").unwrap();
        store.set_color("weir", "bc", "#0000ff").unwrap();

        let reopened = LookupStore::open(&path).expect("reopen lookup");
        assert_eq!(reopened.get_color("Weir", "BC").as_deref(), Some("#0000ff"));
        assert_eq!(reopened.get_color("WEIR", "ab").as_deref(), Some("#00ff00"));
        assert_eq!(reopened.colors().len(), 2);
    }

    #[test]
    fn corrupt_file_is_replaced_with_empty_tables() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let path = tmp.path().join("lookup.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").expect("write garbage");

        let store = LookupStore::open(&path).expect("open lookup");
        assert!(store.list_regions().is_empty());

        // The replacement is a readable lookup workbook.
        store.add_region("BC").unwrap();
        let reopened = LookupStore::open(&path).expect("reopen lookup");
        assert_eq!(reopened.list_regions(), vec!["BC".to_string()]);
    }

    #[test]
    fn workbook_without_lookup_sheets_is_treated_as_corrupt() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let path = tmp.path().join("lookup.xlsx");
        let header = vec!["Whatever".to_string()];
        write_sheets(
            &path,
            &[SheetLayout {
                name: "Sheet1",
                title: None,
                header: &header,
                rows: &[],
            }],
        )
        .expect("write unrelated workbook");

        let store = LookupStore::open(&path).expect("open lookup");
        assert!(store.list_categories().is_empty());
        let sheets = read_sheets(&path).expect("read reset lookup");
        let names: Vec<_> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Regions", "Categories", "Colors"]);
    }
}
