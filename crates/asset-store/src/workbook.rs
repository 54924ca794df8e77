//! In-memory category workbooks and their `.xlsx` encoding.
//!
//! A region sheet is laid out as:
//! - row 1: decorative title, merged across every header column
//! - row 2: column names (the authoritative schema)
//! - rows 3+: one record per row
//!
//! Reading goes through `calamine`, writing through `rust_xlsxwriter`. Workbooks are always
//! rewritten whole.

use std::collections::HashMap;
use std::path::Path;

use asset_model::{
    name_eq_case_insensitive, Attributes, CoreColumn, Record, RepairRank, Status, CORE_COLUMNS,
};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, FormatAlign, Workbook as XlsxWorkbook, XlsxError};

use crate::fs::write_file_atomic;
use crate::{Result, StoreError};

/// A single cell value as stored on disk.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> CellValue {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display text for the cell. Integral numbers render without a fractional part so numeric
    /// record keys read back as `"1042"` rather than `"1042.0"`.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(_) => CellValue::Empty,
            other => CellValue::text(other.to_string()),
        }
    }
}

/// A worksheet read as a dense grid, rows and columns indexed from zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    fn is_blank(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(CellValue::is_empty))
    }
}

/// Read every worksheet of a workbook (any format `calamine` understands).
pub fn read_sheets(path: &Path) -> Result<Vec<RawSheet>> {
    let read_err = |source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(read_err)?;
    let sheet_names = workbook.sheet_names().to_owned();

    let mut out = Vec::with_capacity(sheet_names.len());
    for sheet_name in sheet_names {
        let range = workbook.worksheet_range(&sheet_name).map_err(read_err)?;

        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        if let Some((row_offset, col_offset)) = range.start() {
            let row_offset = row_offset as usize;
            let col_offset = col_offset as usize;
            rows.resize(row_offset, Vec::new());
            for row in range.rows() {
                let mut cells = vec![CellValue::Empty; col_offset];
                cells.extend(row.iter().map(CellValue::from));
                while cells.last().is_some_and(CellValue::is_empty) {
                    cells.pop();
                }
                rows.push(cells);
            }
        }

        out.push(RawSheet {
            name: sheet_name,
            rows,
        });
    }
    Ok(out)
}

/// Layout of one worksheet handed to [`write_sheets`].
pub(crate) struct SheetLayout<'a> {
    pub name: &'a str,
    /// Merged title row written above the header row.
    pub title: Option<&'a str>,
    pub header: &'a [String],
    pub rows: &'a [Vec<CellValue>],
}

/// Serialize worksheets to `.xlsx` bytes and atomically replace `path`.
pub(crate) fn write_sheets(path: &Path, sheets: &[SheetLayout<'_>]) -> Result<()> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let title_format = Format::new().set_bold().set_align(FormatAlign::Center);
    let header_format = Format::new().set_bold();

    let mut out = XlsxWorkbook::new();
    for sheet in sheets {
        let worksheet = out.add_worksheet();
        worksheet.set_name(sheet.name).map_err(write_err)?;

        let mut next_row: u32 = 0;
        if let Some(title) = sheet.title {
            let last_col = col_index(sheet.header.len().saturating_sub(1)).map_err(write_err)?;
            if last_col > 0 {
                worksheet
                    .merge_range(0, 0, 0, last_col, title, &title_format)
                    .map_err(write_err)?;
            } else {
                worksheet
                    .write_string_with_format(0, 0, title, &title_format)
                    .map_err(write_err)?;
            }
            next_row = 1;
        }

        for (col, name) in sheet.header.iter().enumerate() {
            let col = col_index(col).map_err(write_err)?;
            worksheet
                .write_string_with_format(next_row, col, name, &header_format)
                .map_err(write_err)?;
        }
        next_row += 1;

        for (offset, row) in sheet.rows.iter().enumerate() {
            let row_idx = u32::try_from(offset)
                .ok()
                .and_then(|offset| next_row.checked_add(offset))
                .ok_or_else(|| write_err(XlsxError::RowColumnLimitError))?;
            for (col, value) in row.iter().enumerate() {
                let col = col_index(col).map_err(write_err)?;
                match value {
                    CellValue::Empty => {}
                    CellValue::Text(s) if s.is_empty() => {}
                    CellValue::Text(s) => {
                        worksheet.write_string(row_idx, col, s).map_err(write_err)?;
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number(row_idx, col, *n).map_err(write_err)?;
                    }
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(row_idx, col, *b).map_err(write_err)?;
                    }
                }
            }
        }
    }

    let bytes = out.save_to_buffer().map_err(write_err)?;
    write_file_atomic(path, &bytes)?;
    log::debug!("wrote {} sheet(s) to {}", sheets.len(), path.display());
    Ok(())
}

fn col_index(col: usize) -> std::result::Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

/// One region worksheet of a category workbook.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionSheet {
    name: String,
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RegionSheet {
    /// A sheet with no header row yet. Reconciling it seeds the core columns.
    pub fn empty(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// A sheet seeded with the core columns followed by `dynamic` columns.
    pub fn seeded(name: impl Into<String>, title: impl Into<String>, dynamic: &[String]) -> Self {
        let mut headers: Vec<String> = CORE_COLUMNS.iter().map(|c| c.to_string()).collect();
        headers.extend(dynamic.iter().cloned());
        Self {
            name: name.into(),
            title: title.into(),
            headers,
            rows: Vec::new(),
        }
    }

    fn from_raw(raw: RawSheet) -> Self {
        let mut rows = raw.rows.into_iter();
        let title = rows
            .next()
            .and_then(|row| row.into_iter().next())
            .map(|cell| cell.as_text())
            .unwrap_or_default();
        let headers: Vec<String> = rows
            .next()
            .unwrap_or_default()
            .iter()
            .map(|cell| cell.as_text().trim().to_string())
            .collect();
        let width = headers.len();
        let rows = rows
            .filter(|row| !row.iter().all(CellValue::is_empty))
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self {
            name: raw.name,
            title,
            headers,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    /// Header name → column index. Duplicate names resolve to their first occurrence.
    pub fn header_map(&self) -> HashMap<&str, usize> {
        let mut map = HashMap::with_capacity(self.headers.len());
        for (idx, name) in self.headers.iter().enumerate() {
            map.entry(name.as_str()).or_insert(idx);
        }
        map
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Rewrite every row for a new header list. Columns keep their data when their name
    /// survives; new columns start empty and dropped columns are spliced out.
    pub(crate) fn remap_columns(&mut self, headers: Vec<String>) {
        let old = self.header_map();
        let sources: Vec<Option<usize>> = headers.iter().map(|h| old.get(h.as_str()).copied()).collect();
        for row in &mut self.rows {
            let remapped = sources
                .iter()
                .map(|src| {
                    src.and_then(|idx| row.get_mut(idx).map(std::mem::take))
                        .unwrap_or_default()
                })
                .collect();
            *row = remapped;
        }
        self.headers = headers;
    }

    fn require_column(&self, map: &HashMap<&str, usize>, column: &str) -> Result<usize> {
        map.get(column).copied().ok_or_else(|| StoreError::MissingColumn {
            sheet: self.name.clone(),
            column: column.to_string(),
        })
    }

    /// Map a record onto this sheet's current columns.
    pub fn record_to_row(&self, record: &Record) -> Result<Vec<CellValue>> {
        let map = self.header_map();
        let mut row = vec![CellValue::Empty; self.headers.len()];
        for column in CoreColumn::ALL {
            let idx = self.require_column(&map, column.name())?;
            row[idx] = match column {
                CoreColumn::RecordId => CellValue::text(record.record_key.clone()),
                CoreColumn::Category => CellValue::text(record.category.clone()),
                CoreColumn::SiteName => CellValue::text(record.site_name.clone()),
                CoreColumn::Region => CellValue::text(record.region.clone()),
                CoreColumn::Latitude => CellValue::Number(record.latitude),
                CoreColumn::Longitude => CellValue::Number(record.longitude),
                CoreColumn::Status => CellValue::text(record.status.as_str()),
                CoreColumn::RepairRank => record
                    .repair_rank
                    .map(|rank| CellValue::Number(f64::from(rank.get())))
                    .unwrap_or_default(),
            };
        }
        for (name, value) in record.attributes.columns() {
            let idx = self.require_column(&map, &name)?;
            row[idx] = CellValue::text(value);
        }
        Ok(row)
    }

    /// Append a record as a new data row.
    pub fn append_record(&mut self, record: &Record) -> Result<()> {
        let row = self.record_to_row(record)?;
        self.rows.push(row);
        Ok(())
    }

    /// Overwrite the data row at `row` with `record`.
    pub fn replace_record(&mut self, row: usize, record: &Record) -> Result<()> {
        let cells = self.record_to_row(record)?;
        if let Some(slot) = self.rows.get_mut(row) {
            *slot = cells;
        }
        Ok(())
    }

    pub fn remove_row(&mut self, row: usize) -> Option<Vec<CellValue>> {
        (row < self.rows.len()).then(|| self.rows.remove(row))
    }

    /// Insert a row captured under `headers` at `at` (clamped to the end), matching cells to this
    /// sheet's columns by name. Cells whose column no longer exists are dropped.
    pub(crate) fn insert_cells(&mut self, at: usize, headers: &[String], cells: Vec<CellValue>) {
        let mut by_name: HashMap<&str, CellValue> = HashMap::new();
        for (name, cell) in headers.iter().zip(cells) {
            by_name.entry(name.as_str()).or_insert(cell);
        }
        let row = self
            .headers
            .iter()
            .map(|name| by_name.remove(name.as_str()).unwrap_or_default())
            .collect();
        let at = at.min(self.rows.len());
        self.rows.insert(at, row);
    }

    /// Index of the first data row whose trimmed RecordID equals `key` exactly.
    pub fn find_row_by_key(&self, key: &str) -> Option<usize> {
        let idx = self.column_index(CoreColumn::RecordId.name())?;
        self.rows
            .iter()
            .position(|row| row.get(idx).is_some_and(|cell| cell.as_text().trim() == key))
    }

    /// Trimmed, non-empty RecordID values in row order.
    pub fn record_keys(&self) -> Vec<String> {
        let Some(idx) = self.column_index(CoreColumn::RecordId.name()) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(idx))
            .map(|cell| cell.as_text().trim().to_string())
            .filter(|key| !key.is_empty())
            .collect()
    }

    /// Dynamic attributes with a value in the data row at `row`.
    pub fn row_attributes(&self, row: usize) -> Attributes {
        let Some(cells) = self.rows.get(row) else {
            return Attributes::new();
        };
        let texts: Vec<String> = cells.iter().map(CellValue::as_text).collect();
        Attributes::from_columns(
            self.headers
                .iter()
                .zip(texts.iter())
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }

    /// Parse the data row at `row` into a record belonging to `category`.
    ///
    /// Returns `None` for rows without a RecordID or a numeric Latitude/Longitude. The region
    /// falls back to the sheet name when the Region cell is empty.
    pub fn record_at(&self, row: usize, category: &str) -> Option<Record> {
        let cells = self.rows.get(row)?;
        let map = self.header_map();
        let cell = |column: CoreColumn| {
            map.get(column.name())
                .and_then(|idx| cells.get(*idx))
                .cloned()
                .unwrap_or_default()
        };

        let key = cell(CoreColumn::RecordId).as_text().trim().to_string();
        if key.is_empty() {
            return None;
        }
        let latitude = cell(CoreColumn::Latitude).as_f64()?;
        let longitude = cell(CoreColumn::Longitude).as_f64()?;

        let region = cell(CoreColumn::Region).as_text().trim().to_string();
        let region = if region.is_empty() {
            self.name.clone()
        } else {
            region
        };

        let mut record = Record::new(key, category, region, latitude, longitude)
            .with_site_name(cell(CoreColumn::SiteName).as_text().trim())
            .with_status(Status::parse(&cell(CoreColumn::Status).as_text()))
            .with_attributes(self.row_attributes(row));
        record.repair_rank = cell(CoreColumn::RepairRank)
            .as_f64()
            .and_then(|rank| RepairRank::from_f64(rank).ok());
        Some(record)
    }

    /// Every parsable record on this sheet.
    pub fn records(&self, category: &str) -> Vec<Record> {
        (0..self.rows.len())
            .filter_map(|row| self.record_at(row, category))
            .collect()
    }
}

/// A category workbook: one [`RegionSheet`] per region.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryWorkbook {
    category: String,
    sheets: Vec<RegionSheet>,
}

/// Title written in the merged first row of a region sheet.
pub fn sheet_title(category: &str, region: &str) -> String {
    format!("{category} - {region}")
}

impl CategoryWorkbook {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            sheets: Vec::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sheets(&self) -> &[RegionSheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [RegionSheet] {
        &mut self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, idx: usize) -> Option<&RegionSheet> {
        self.sheets.get(idx)
    }

    pub fn sheet_mut(&mut self, idx: usize) -> Option<&mut RegionSheet> {
        self.sheets.get_mut(idx)
    }

    /// Find a region sheet: exact name first, then case-insensitive.
    pub fn find_sheet(&self, region: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name == region)
            .or_else(|| {
                self.sheets
                    .iter()
                    .position(|s| name_eq_case_insensitive(&s.name, region))
            })
    }

    /// Columns every sheet currently carries after the core ones, in order of first appearance.
    pub fn dynamic_columns(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for sheet in &self.sheets {
            for header in &sheet.headers {
                if header.is_empty() || CoreColumn::from_name(header).is_some() {
                    continue;
                }
                if !out.contains(header) {
                    out.push(header.clone());
                }
            }
        }
        out
    }

    /// Return the sheet for `region`, adding one seeded with the workbook's current column set
    /// when none matches.
    pub fn ensure_sheet(&mut self, region: &str) -> usize {
        if let Some(idx) = self.find_sheet(region) {
            return idx;
        }
        let dynamic = self.dynamic_columns();
        let title = sheet_title(&self.category, region);
        self.sheets.push(RegionSheet::seeded(region, title, &dynamic));
        self.sheets.len() - 1
    }

    pub fn push_sheet(&mut self, sheet: RegionSheet) {
        self.sheets.push(sheet);
    }

    /// `(sheet index, row index)` of the first row keyed `key`, scanning sheets in order.
    pub fn find_key(&self, key: &str) -> Option<(usize, usize)> {
        self.sheets
            .iter()
            .enumerate()
            .find_map(|(sheet_idx, sheet)| sheet.find_row_by_key(key).map(|row| (sheet_idx, row)))
    }

    /// Every parsable record, annotated with this workbook's category.
    pub fn records(&self) -> Vec<Record> {
        self.sheets
            .iter()
            .flat_map(|sheet| sheet.records(&self.category))
            .collect()
    }

    pub fn read(path: &Path, category: impl Into<String>) -> Result<Self> {
        let sheets = read_sheets(path)?
            .into_iter()
            // An empty workbook is saved with a placeholder sheet; it is not a region.
            .filter(|raw| !raw.is_blank())
            .map(RegionSheet::from_raw)
            .collect();
        Ok(Self {
            category: category.into(),
            sheets,
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let layouts: Vec<SheetLayout<'_>> = self
            .sheets
            .iter()
            .map(|sheet| SheetLayout {
                name: &sheet.name,
                title: Some(&sheet.title),
                header: &sheet.headers,
                rows: &sheet.rows,
            })
            .collect();
        write_sheets(path, &layouts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record() -> Record {
        Record::new("S1", "Weir", "BC", 50.0, -120.0)
            .with_site_name("Upper Weir")
            .with_status(Status::Active)
            .with_repair_rank(RepairRank::new(2).unwrap())
            .with_attributes(
                Attributes::new()
                    .with("Inspection", "LastDate", "2024-05-01")
                    .unwrap(),
            )
    }

    #[test]
    fn number_text_drops_integral_fraction() {
        assert_eq!(CellValue::Number(1042.0).as_text(), "1042");
        assert_eq!(CellValue::Number(50.25).as_text(), "50.25");
        assert_eq!(CellValue::text(" 49.5 ").as_f64(), Some(49.5));
        assert_eq!(CellValue::text("north").as_f64(), None);
        assert!(CellValue::text("").is_empty());
    }

    #[test]
    fn record_round_trips_through_row() {
        let mut sheet = RegionSheet::seeded(
            "BC",
            sheet_title("Weir", "BC"),
            &["Inspection - LastDate".to_string()],
        );
        let record = sample_record();
        sheet.append_record(&record).unwrap();

        assert_eq!(sheet.record_at(0, "Weir"), Some(record));
        assert_eq!(sheet.record_keys(), vec!["S1".to_string()]);
        assert_eq!(sheet.find_row_by_key("S1"), Some(0));
        assert_eq!(sheet.find_row_by_key("s1"), None);
    }

    #[test]
    fn append_fails_when_dynamic_column_is_missing() {
        let mut sheet = RegionSheet::seeded("BC", "Weir - BC", &[]);
        let err = sheet.append_record(&sample_record()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingColumn { ref column, .. } if column == "Inspection - LastDate"
        ));
    }

    #[test]
    fn append_fails_when_core_column_is_missing() {
        let mut sheet = RegionSheet::empty("BC", "Weir - BC");
        let err = sheet
            .append_record(&Record::new("S1", "Weir", "BC", 0.0, 0.0))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingColumn { ref column, .. } if column == "RecordID"
        ));
    }

    #[test]
    fn rows_without_coordinates_are_not_records() {
        let mut sheet = RegionSheet::seeded("BC", "Weir - BC", &[]);
        sheet.rows.push(vec![
            CellValue::text("S9"),
            CellValue::text("Weir"),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::text("n/a"),
            CellValue::Number(-120.0),
            CellValue::Empty,
            CellValue::Empty,
        ]);
        assert_eq!(sheet.record_at(0, "Weir"), None);
        assert!(sheet.records("Weir").is_empty());
    }

    #[test]
    fn empty_region_cell_falls_back_to_sheet_name() {
        let mut sheet = RegionSheet::seeded("AB", "Weir - AB", &[]);
        let mut record = Record::new("S2", "Weir", "AB", 51.0, -114.0);
        record.region.clear();
        sheet.append_record(&record).unwrap();
        assert_eq!(sheet.record_at(0, "Weir").unwrap().region, "AB");
    }

    #[test]
    fn workbook_round_trips_through_xlsx() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let path = tmp.path().join("Weir.xlsx");

        let mut workbook = CategoryWorkbook::new("Weir");
        let bc = workbook.ensure_sheet("BC");
        workbook.ensure_sheet("AB");
        let mut record = sample_record();
        record.attributes = Attributes::new();
        workbook.sheet_mut(bc).unwrap().append_record(&record).unwrap();
        workbook.write(&path).expect("write workbook");

        let read = CategoryWorkbook::read(&path, "Weir").expect("read workbook");
        assert_eq!(read.sheet_names(), vec!["BC", "AB"]);
        assert_eq!(read.sheet(0).unwrap().title(), "Weir - BC");
        assert_eq!(read.sheet(1).unwrap().headers(), CORE_COLUMNS.map(String::from).as_slice());
        assert_eq!(read.records(), vec![record]);
    }

    #[test]
    fn empty_workbook_reads_back_without_sheets() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let path = tmp.path().join("Empty.xlsx");
        CategoryWorkbook::new("Empty").write(&path).expect("write");
        let read = CategoryWorkbook::read(&path, "Empty").expect("read");
        assert!(read.sheets().is_empty());
    }

    #[test]
    fn find_sheet_prefers_exact_match() {
        let mut workbook = CategoryWorkbook::new("Weir");
        workbook.push_sheet(RegionSheet::seeded("bc", "Weir - bc", &[]));
        workbook.push_sheet(RegionSheet::seeded("BC", "Weir - BC", &[]));
        assert_eq!(workbook.find_sheet("BC"), Some(1));
        assert_eq!(workbook.find_sheet("Bc"), Some(0));
        assert_eq!(workbook.find_sheet("AB"), None);
    }
}
