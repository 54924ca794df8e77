//! Header reconciliation for region sheets.
//!
//! Schema changes are two-phase: a [`SchemaPlan`] computes the desired dynamic column set from
//! what is persisted and what a record declares, then [`reconcile_workbook`] applies it to every
//! sheet so all region sheets of a category keep an identical column set.

use asset_model::{Attributes, CoreColumn, Record, CORE_COLUMNS};

use crate::workbook::{sheet_title, CategoryWorkbook, RegionSheet};

/// Columns added to and removed from a sheet (or a whole workbook) by a reconcile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    fn merge(&mut self, other: ReconcileReport) {
        for name in other.added {
            if !self.added.contains(&name) {
                self.added.push(name);
            }
        }
        for name in other.removed {
            if !self.removed.contains(&name) {
                self.removed.push(name);
            }
        }
    }
}

/// Header list for `core ∪ desired`.
///
/// Core columns come first in their fixed order. Existing dynamic columns that survive keep their
/// relative order, and desired columns not yet present are appended in the order given.
pub fn target_headers(existing: &[String], desired: &[String]) -> Vec<String> {
    let mut out: Vec<String> = CORE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let wanted = |name: &str| desired.iter().any(|d| d.trim() == name);

    for name in existing {
        let name = name.trim();
        if name.is_empty() || CoreColumn::from_name(name).is_some() {
            continue;
        }
        if wanted(name) && !out.iter().any(|h| h == name) {
            out.push(name.to_string());
        }
    }
    for name in desired {
        let name = name.trim();
        if name.is_empty() || CoreColumn::from_name(name).is_some() {
            continue;
        }
        if !out.iter().any(|h| h == name) {
            out.push(name.to_string());
        }
    }
    out
}

/// Make `sheet`'s header row exactly `core ∪ desired`.
///
/// Columns outside that set are physically removed along with their data, so callers must pass
/// every dynamic column that has to survive. A sheet without a header row is seeded with the core
/// columns (and a title, if it has none) before dynamic columns are added.
pub fn reconcile(sheet: &mut RegionSheet, category: &str, desired: &[String]) -> ReconcileReport {
    let target = target_headers(sheet.headers(), desired);
    apply_headers(sheet, category, target)
}

/// Apply the same target column set to every sheet in `workbook`.
///
/// The column order is derived from the workbook as a whole, so every sheet ends up with an
/// identical header row.
pub fn reconcile_workbook(workbook: &mut CategoryWorkbook, desired: &[String]) -> ReconcileReport {
    let category = workbook.category().to_string();
    let target = target_headers(&workbook.dynamic_columns(), desired);
    let mut report = ReconcileReport::default();
    for sheet in workbook.sheets_mut() {
        let sheet_report = apply_headers(sheet, &category, target.clone());
        if !sheet_report.is_empty() {
            log::debug!(
                "reconciled {category}/{}: added {:?}, removed {:?}",
                sheet.name(),
                sheet_report.added,
                sheet_report.removed
            );
        }
        report.merge(sheet_report);
    }
    report
}

fn apply_headers(sheet: &mut RegionSheet, category: &str, target: Vec<String>) -> ReconcileReport {
    if sheet.title().is_empty() {
        let title = sheet_title(category, sheet.name());
        sheet.set_title(title);
    }
    if target.as_slice() == sheet.headers() {
        return ReconcileReport::default();
    }

    let mut report = ReconcileReport::default();
    for name in &target {
        if !sheet.headers().contains(name) {
            report.added.push(name.clone());
        }
    }
    for name in sheet.headers() {
        if !name.is_empty() && !target.contains(name) && !report.removed.contains(name) {
            report.removed.push(name.clone());
        }
    }

    sheet.remap_columns(target);
    report
}

/// Desired dynamic columns computed ahead of a write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaPlan {
    /// Dynamic columns the workbook must carry after the write, in order.
    pub target: Vec<String>,
    /// Columns the write introduces.
    pub added: Vec<String>,
    /// Columns the write drops workbook-wide.
    pub removed: Vec<String>,
}

impl SchemaPlan {
    /// Plan for inserting `record`: the persisted columns plus whatever the record adds.
    ///
    /// Creation never removes a column.
    pub fn for_create(existing: &[String], record: &Record) -> SchemaPlan {
        let mut target: Vec<String> = existing.to_vec();
        let mut added = Vec::new();
        for name in record.attributes.column_names() {
            if !target.contains(&name) {
                target.push(name.clone());
                added.push(name);
            }
        }
        SchemaPlan {
            target,
            added,
            removed: Vec::new(),
        }
    }

    /// Plan for replacing a record whose stored attributes were `prior` with `next`.
    ///
    /// The target is the persisted columns minus the ones `prior` used and `next` no longer
    /// declares, plus whatever `next` adds. Removal applies to the whole workbook, even if other
    /// rows still hold values in those columns.
    pub fn for_update(existing: &[String], prior: &Attributes, next: &Record) -> SchemaPlan {
        let next_columns = next.attributes.column_names();
        let removed: Vec<String> = prior
            .column_names()
            .into_iter()
            .filter(|name| !next_columns.contains(name) && existing.contains(name))
            .collect();

        let mut target: Vec<String> = existing
            .iter()
            .filter(|name| !removed.contains(name))
            .cloned()
            .collect();
        let mut added = Vec::new();
        for name in next_columns {
            if !target.contains(&name) {
                target.push(name.clone());
                added.push(name);
            }
        }
        SchemaPlan {
            target,
            added,
            removed,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
