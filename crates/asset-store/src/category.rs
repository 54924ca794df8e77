//! Category workbooks on disk: `<root>/<category>.xlsx`, one region sheet per region.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use asset_model::{name_eq_case_insensitive, validate_category_name, validate_sheet_name, Record};

use crate::config::StoreConfig;
use crate::lookup::LookupStore;
use crate::workbook::CategoryWorkbook;
use crate::{Result, StoreError};

/// Where a record row currently lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordLocation {
    pub category: String,
    pub sheet: String,
    /// Zero-based data row index (the header rows are not counted).
    pub row: usize,
}

/// Synchronous access to the category workbooks under a store root.
///
/// Nothing here serializes writers; callers go through a `WriteSerializer` queue.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    config: Arc<StoreConfig>,
    lookup: Arc<LookupStore>,
}

impl CategoryStore {
    pub fn new(config: Arc<StoreConfig>, lookup: Arc<LookupStore>) -> Self {
        Self { config, lookup }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn lookup(&self) -> &LookupStore {
        &self.lookup
    }

    /// Categories with a workbook on disk, sorted by name. The lookup workbook is excluded.
    pub fn list_categories(&self) -> Result<Vec<String>> {
        let root = &self.config.root;
        let io_err = |source| StoreError::Io {
            path: root.to_path_buf(),
            source,
        };

        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_err(err)),
        };

        let mut out = Vec::new();
        for entry in entries {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() || self.config.is_lookup_path(&path) || !is_xlsx(&path) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Excel leaves `~$Name.xlsx` owner files next to open workbooks.
            if stem.starts_with("~$") {
                continue;
            }
            out.push(stem.to_string());
        }
        out.sort();
        Ok(out)
    }

    /// Map `category` to the name of its workbook on disk.
    ///
    /// An exact file name wins, then a case-insensitive match; a category with no workbook yet
    /// resolves to itself.
    pub fn resolve_category(&self, category: &str) -> Result<String> {
        validate_category_name(category)?;
        if self.config.category_path(category).is_file() {
            return Ok(category.to_string());
        }
        Ok(self
            .list_categories()?
            .into_iter()
            .find(|existing| name_eq_case_insensitive(existing, category))
            .unwrap_or_else(|| category.to_string()))
    }

    pub fn exists(&self, category: &str) -> Result<bool> {
        let resolved = self.resolve_category(category)?;
        Ok(self.config.category_path(&resolved).is_file())
    }

    /// Read a category workbook. Fails with [`StoreError::MissingWorkbook`] if it doesn't exist.
    pub fn load(&self, category: &str) -> Result<CategoryWorkbook> {
        let resolved = self.resolve_category(category)?;
        let path = self.config.category_path(&resolved);
        if !path.is_file() {
            return Err(StoreError::MissingWorkbook {
                category: category.to_string(),
            });
        }
        CategoryWorkbook::read(&path, resolved)
    }

    /// Persist `workbook` to its category file, replacing it whole.
    pub fn save(&self, workbook: &CategoryWorkbook) -> Result<()> {
        let path = self.config.category_path(workbook.category());
        workbook.write(&path)
    }

    /// Create the workbook for `category` unless it exists. Returns whether a file was created.
    ///
    /// A new workbook gets one seeded sheet per region known to the lookup tables. The category
    /// is registered in the lookup tables either way.
    pub fn ensure(&self, category: &str) -> Result<bool> {
        self.ensure_resolved(category).map(|(_, created)| created)
    }

    /// [`CategoryStore::ensure`], also returning the on-disk category name.
    pub(crate) fn ensure_resolved(&self, category: &str) -> Result<(String, bool)> {
        let resolved = self.resolve_category(category)?;
        let path = self.config.category_path(&resolved);
        let created = if path.is_file() {
            false
        } else {
            let mut workbook = CategoryWorkbook::new(resolved.clone());
            for region in self.lookup.list_regions() {
                if let Err(err) = validate_sheet_name(&region) {
                    log::warn!("not provisioning sheet for region `{region}`: {err}");
                    continue;
                }
                workbook.ensure_sheet(&region);
            }
            self.save(&workbook)?;
            log::debug!(
                "created category workbook {} with {} sheet(s)",
                path.display(),
                workbook.sheets().len()
            );
            true
        };
        self.lookup.add_category(&resolved)?;
        Ok((resolved, created))
    }

    /// Name of the sheet for `region` in `category`: exact match first, then case-insensitive.
    pub fn find_region_sheet(&self, category: &str, region: &str) -> Result<Option<String>> {
        if !self.exists(category)? {
            return Ok(None);
        }
        let workbook = self.load(category)?;
        Ok(workbook
            .find_sheet(region)
            .and_then(|idx| workbook.sheet(idx))
            .map(|sheet| sheet.name().to_string()))
    }

    /// Return the sheet for `region`, creating the category and the sheet as needed.
    ///
    /// A new sheet carries the same columns as the workbook's existing sheets.
    pub fn ensure_region_sheet(&self, category: &str, region: &str) -> Result<String> {
        validate_sheet_name(region)?;
        let (category, _) = self.ensure_resolved(category)?;
        let mut workbook = self.load(&category)?;
        if let Some(sheet) = workbook.find_sheet(region).and_then(|idx| workbook.sheet(idx)) {
            return Ok(sheet.name().to_string());
        }
        let idx = workbook.ensure_sheet(region);
        self.save(&workbook)?;
        Ok(workbook
            .sheet(idx)
            .map(|sheet| sheet.name().to_string())
            .unwrap_or_else(|| region.to_string()))
    }

    /// Append `record` to the sheet named `sheet` in an already loaded workbook.
    ///
    /// Fails with [`StoreError::MissingColumn`] if the sheet lacks a core column or a column for
    /// one of the record's attributes.
    pub fn append_row(
        &self,
        workbook: &mut CategoryWorkbook,
        sheet: &str,
        record: &Record,
    ) -> Result<()> {
        let path = self.config.category_path(workbook.category());
        let target = workbook
            .find_sheet(sheet)
            .and_then(|idx| workbook.sheet_mut(idx))
            .ok_or_else(|| StoreError::SheetNotFound {
                path,
                sheet: sheet.to_string(),
            })?;
        target.append_record(record)
    }

    /// Remove the first row keyed `key` from `category`. The workbook is only rewritten when a row
    /// was removed; a missing workbook counts as "not found".
    pub fn remove_row_by_key(&self, category: &str, key: &str) -> Result<bool> {
        if !self.exists(category)? {
            return Ok(false);
        }
        let mut workbook = self.load(category)?;
        let Some((sheet_idx, row)) = workbook.find_key(key) else {
            return Ok(false);
        };
        if let Some(sheet) = workbook.sheet_mut(sheet_idx) {
            sheet.remove_row(row);
        }
        self.save(&workbook)?;
        Ok(true)
    }

    /// Scan every category workbook for `key`.
    pub fn find_key(&self, key: &str) -> Result<Option<RecordLocation>> {
        for category in self.list_categories()? {
            let workbook = self.load(&category)?;
            if let Some((sheet_idx, row)) = workbook.find_key(key) {
                let sheet = workbook
                    .sheet(sheet_idx)
                    .map(|s| s.name().to_string())
                    .unwrap_or_default();
                return Ok(Some(RecordLocation {
                    category,
                    sheet,
                    row,
                }));
            }
        }
        Ok(None)
    }

    /// `(record key, category)` for every keyed row in the corpus.
    ///
    /// Workbooks that can't be read are logged and skipped.
    pub fn scan_keys(&self) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        for category in self.list_categories()? {
            let workbook = match self.load(&category) {
                Ok(workbook) => workbook,
                Err(err) => {
                    log::warn!("skipping category `{category}` while indexing keys: {err}");
                    continue;
                }
            };
            for sheet in workbook.sheets() {
                out.extend(
                    sheet
                        .record_keys()
                        .into_iter()
                        .map(|key| (key, category.clone())),
                );
            }
        }
        Ok(out)
    }

    /// Every parsable record of `category`; empty when the category has no workbook.
    pub fn read_records(&self, category: &str) -> Result<Vec<Record>> {
        if !self.exists(category)? {
            return Ok(Vec::new());
        }
        Ok(self.load(category)?.records())
    }
}

fn is_xlsx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
}
