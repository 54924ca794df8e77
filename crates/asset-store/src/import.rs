//! Bulk import of records from an arbitrary worksheet.
//!
//! The source sheet only needs a header row (within the first few rows) naming a record id and a
//! latitude column. Header names are matched loosely: case, spaces and punctuation are ignored.
//! Columns named `"<Section> - <Field>"` become dynamic attributes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use asset_model::{
    is_core_column, name_eq_case_insensitive, parse_column_name, split_region_suffix,
    validate_category_name, Attributes, Record, RepairRank, Status,
};
use serde::{Deserialize, Serialize};

use crate::geo::{BoundingBoxResolver, NoRegionResolver, RegionResolver};
use crate::repository::RecordRepository;
use crate::workbook::{read_sheets, CellValue, RawSheet};
use crate::{Result, StoreError};

/// A row that could not be imported. `row` is the 1-based row number in the source sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub category: String,
    pub sheet: String,
    pub imported: usize,
    /// Rows without a record id or numeric coordinates.
    pub skipped: usize,
    /// Keys that already existed in the store.
    pub duplicates: Vec<String>,
    pub errors: Vec<RowError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SourceColumn {
    RecordId,
    Latitude,
    Longitude,
    SiteName,
    Status,
    RepairRank,
    Region,
}

/// Lowercased alphanumerics of a header cell.
fn alias_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn classify_header(header: &str) -> Option<SourceColumn> {
    let key = alias_key(header);
    let column = match key.as_str() {
        "recordid" | "siteid" | "stationid" | "assetid" | "id" => SourceColumn::RecordId,
        "sitename" | "site" | "name" | "stationname" => SourceColumn::SiteName,
        "status" => SourceColumn::Status,
        "repairrank" | "rank" => SourceColumn::RepairRank,
        "region" | "province" | "prov" => SourceColumn::Region,
        k if k.starts_with("lat") => SourceColumn::Latitude,
        k if k.starts_with("lon") || k.starts_with("lng") => SourceColumn::Longitude,
        _ => return None,
    };
    Some(column)
}

#[derive(Debug, Default)]
struct ColumnMap {
    record_id: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    site_name: Option<usize>,
    status: Option<usize>,
    repair_rank: Option<usize>,
    region: Option<usize>,
    /// `(column index, section, field)` for `"<Section> - <Field>"` headers.
    attributes: Vec<(usize, String, String)>,
}

impl ColumnMap {
    fn from_header(cells: &[CellValue]) -> ColumnMap {
        let mut map = ColumnMap::default();
        for (idx, cell) in cells.iter().enumerate() {
            let header = cell.as_text();
            let header = header.trim();
            if header.is_empty() {
                continue;
            }
            if !is_core_column(header) {
                if let Some((section, field)) = parse_column_name(header) {
                    map.attributes
                        .push((idx, section.to_string(), field.to_string()));
                    continue;
                }
            }
            let slot = match classify_header(header) {
                Some(SourceColumn::RecordId) => &mut map.record_id,
                Some(SourceColumn::Latitude) => &mut map.latitude,
                Some(SourceColumn::Longitude) => &mut map.longitude,
                Some(SourceColumn::SiteName) => &mut map.site_name,
                Some(SourceColumn::Status) => &mut map.status,
                Some(SourceColumn::RepairRank) => &mut map.repair_rank,
                Some(SourceColumn::Region) => &mut map.region,
                None => continue,
            };
            slot.get_or_insert(idx);
        }
        map
    }

    fn is_header(&self) -> bool {
        self.record_id.is_some() && self.latitude.is_some()
    }
}

/// Locate the header row within the first `scan_rows` rows.
fn find_header(sheet: &RawSheet, scan_rows: usize) -> Result<(usize, ColumnMap)> {
    sheet
        .rows
        .iter()
        .take(scan_rows)
        .enumerate()
        .map(|(idx, row)| (idx, ColumnMap::from_header(row)))
        .find(|(_, map)| map.is_header())
        .ok_or_else(|| StoreError::HeaderNotFound {
            sheet: sheet.name.clone(),
            rows: scan_rows,
        })
}

/// Outcome of turning one source row into a record.
enum ParsedRow {
    Blank,
    Skipped,
    Invalid(String),
    Record(Record),
}

pub struct ImportPipeline {
    repository: RecordRepository,
    resolver: Arc<dyn RegionResolver>,
}

impl std::fmt::Debug for ImportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPipeline")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

impl ImportPipeline {
    /// Pipeline resolving missing regions from the repository's configured bounding boxes.
    pub fn new(repository: RecordRepository) -> Self {
        let boxes = BoundingBoxResolver::from_config(repository.config());
        let resolver: Arc<dyn RegionResolver> = if boxes.is_empty() {
            Arc::new(NoRegionResolver)
        } else {
            Arc::new(boxes)
        };
        Self {
            repository,
            resolver,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn RegionResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Names of the worksheets in `path`.
    pub async fn list_source_sheets(&self, path: impl Into<PathBuf>) -> Result<Vec<String>> {
        let path = path.into();
        let sheets = tokio::task::spawn_blocking(move || read_sheets(&path)).await??;
        Ok(sheets.into_iter().map(|sheet| sheet.name).collect())
    }

    /// Import every record on `sheet_name` of `path`.
    ///
    /// A sheet named `"<category> <XX>"` imports into `category` with region `XX`; any other
    /// name is the category and each row's region comes from its Region column or, failing that,
    /// the region resolver. Rows never abort the batch: they are counted as imported, skipped,
    /// duplicates or errors.
    pub async fn import_sheet(&self, path: &Path, sheet_name: &str) -> Result<ImportSummary> {
        let source = path.to_path_buf();
        let sheets = tokio::task::spawn_blocking(move || read_sheets(&source)).await??;
        let sheet = sheets
            .iter()
            .find(|s| s.name == sheet_name)
            .or_else(|| {
                sheets
                    .iter()
                    .find(|s| name_eq_case_insensitive(&s.name, sheet_name))
            })
            .ok_or_else(|| StoreError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: sheet_name.to_string(),
            })?;

        let (category, sheet_region) = split_region_suffix(&sheet.name);
        validate_category_name(&category)?;
        let (header_row, columns) = find_header(sheet, self.repository.config().header_scan_rows)?;

        let lookup = self.repository.lookup();
        lookup.add_category(&category)?;
        if let Some(region) = &sheet_region {
            lookup.add_region(region)?;
        }

        let mut summary = ImportSummary {
            category: category.clone(),
            sheet: sheet.name.clone(),
            ..ImportSummary::default()
        };

        for (idx, cells) in sheet.rows.iter().enumerate().skip(header_row + 1) {
            let row_number = idx + 1;
            let record = match self.parse_row(cells, &columns, &category, sheet_region.as_deref()) {
                ParsedRow::Blank => continue,
                ParsedRow::Skipped => {
                    summary.skipped += 1;
                    continue;
                }
                ParsedRow::Invalid(message) => {
                    summary.errors.push(RowError {
                        row: row_number,
                        message,
                    });
                    continue;
                }
                ParsedRow::Record(record) => record,
            };

            if let Err(err) = lookup.add_region(&record.region) {
                summary.errors.push(RowError {
                    row: row_number,
                    message: err.to_string(),
                });
                continue;
            }

            let key = record.record_key.clone();
            match self.repository.create(record).await {
                Ok(_) => summary.imported += 1,
                Err(StoreError::DuplicateKey { .. }) => summary.duplicates.push(key),
                Err(err) => summary.errors.push(RowError {
                    row: row_number,
                    message: err.to_string(),
                }),
            }
        }

        log::info!(
            "imported {} record(s) from {}!{} into `{}` ({} skipped, {} duplicate(s), {} error(s))",
            summary.imported,
            path.display(),
            summary.sheet,
            summary.category,
            summary.skipped,
            summary.duplicates.len(),
            summary.errors.len()
        );
        Ok(summary)
    }

    fn parse_row(
        &self,
        cells: &[CellValue],
        columns: &ColumnMap,
        category: &str,
        sheet_region: Option<&str>,
    ) -> ParsedRow {
        if cells.iter().all(CellValue::is_empty) {
            return ParsedRow::Blank;
        }
        let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i));
        let text = |idx: Option<usize>| {
            cell(idx)
                .map(|c| c.as_text().trim().to_string())
                .unwrap_or_default()
        };

        let key = text(columns.record_id);
        let latitude = cell(columns.latitude).and_then(CellValue::as_f64);
        let longitude = cell(columns.longitude).and_then(CellValue::as_f64);
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return ParsedRow::Skipped;
        };
        if key.is_empty() {
            return ParsedRow::Skipped;
        }

        let region = match sheet_region {
            Some(region) => region.to_string(),
            None => {
                let from_column = text(columns.region);
                if from_column.is_empty() {
                    match self.resolver.resolve(latitude, longitude) {
                        Some(region) if !region.trim().is_empty() => region.trim().to_string(),
                        _ => {
                            return ParsedRow::Invalid(format!(
                                "could not determine a region for ({latitude}, {longitude})"
                            ))
                        }
                    }
                } else {
                    from_column
                }
            }
        };

        let mut record = Record::new(key, category, region, latitude, longitude)
            .with_site_name(text(columns.site_name))
            .with_status(Status::parse(&text(columns.status)));

        if let Some(rank) = cell(columns.repair_rank).filter(|c| !c.is_empty()) {
            match rank.as_f64().map(RepairRank::from_f64) {
                Some(Ok(rank)) => record.repair_rank = Some(rank),
                Some(Err(err)) => return ParsedRow::Invalid(err.to_string()),
                None => {
                    return ParsedRow::Invalid(format!(
                        "repair rank `{}` is not a number",
                        rank.as_text()
                    ))
                }
            }
        }

        let mut attributes = Attributes::new();
        for (idx, section, field) in &columns.attributes {
            let value = text(Some(*idx));
            if value.is_empty() {
                continue;
            }
            if let Err(err) = attributes.insert(section.as_str(), field.as_str(), value) {
                return ParsedRow::Invalid(err.to_string());
            }
        }
        ParsedRow::Record(record.with_attributes(attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_aliases_are_loose() {
        assert_eq!(classify_header("Record ID"), Some(SourceColumn::RecordId));
        assert_eq!(classify_header("station_id"), Some(SourceColumn::RecordId));
        assert_eq!(classify_header("LAT (dd)"), Some(SourceColumn::Latitude));
        assert_eq!(classify_header("Lng"), Some(SourceColumn::Longitude));
        assert_eq!(classify_header("Longitude"), Some(SourceColumn::Longitude));
        assert_eq!(classify_header("Prov."), Some(SourceColumn::Region));
        assert_eq!(classify_header("Notes"), None);
    }

    #[test]
    fn header_row_is_found_below_a_banner() {
        let sheet = RawSheet {
            name: "Weir".to_string(),
            rows: vec![
                vec![CellValue::text("Weir inventory 2024")],
                vec![],
                vec![
                    CellValue::text("Site ID"),
                    CellValue::text("Latitude"),
                    CellValue::text("Longitude"),
                    CellValue::text("Inspection - LastDate"),
                ],
            ],
        };
        let (row, map) = find_header(&sheet, 10).unwrap();
        assert_eq!(row, 2);
        assert_eq!(map.record_id, Some(0));
        assert_eq!(map.longitude, Some(2));
        assert_eq!(
            map.attributes,
            vec![(3, "Inspection".to_string(), "LastDate".to_string())]
        );

        assert!(matches!(
            find_header(&sheet, 2),
            Err(StoreError::HeaderNotFound { rows: 2, .. })
        ));
    }
}
