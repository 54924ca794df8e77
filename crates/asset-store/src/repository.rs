//! Async record repository over the category workbooks.
//!
//! Every mutation of a category file runs inside that category's [`WriteSerializer`] queue and the
//! blocking spreadsheet I/O itself runs on tokio's blocking pool. A key index built when the
//! repository opens enforces record key uniqueness across categories.

use std::fs;
use std::sync::Arc;

use asset_model::{name_eq_case_insensitive, ModelError, Record};

use crate::category::CategoryStore;
use crate::config::StoreConfig;
use crate::index::KeyIndex;
use crate::lookup::LookupStore;
use crate::schema::{reconcile_workbook, SchemaPlan};
use crate::serializer::WriteSerializer;
use crate::workbook::{CategoryWorkbook, CellValue};
use crate::{Result, StoreError};

#[derive(Debug, Clone)]
pub struct RecordRepository {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    store: CategoryStore,
    index: Arc<KeyIndex>,
    serializer: WriteSerializer,
}

/// A row taken out of a workbook, kept so it can be put back if a move fails.
#[derive(Debug)]
struct RemovedRow {
    category: String,
    sheet: String,
    row: usize,
    headers: Vec<String>,
    cells: Vec<CellValue>,
}

impl RecordRepository {
    /// Open the store rooted at `config.root`, creating the directory and lookup workbook if
    /// needed, and index every record key found on disk.
    pub async fn open(config: StoreConfig) -> Result<Self> {
        blocking(move || Self::open_blocking(config)).await
    }

    /// Blocking variant of [`RecordRepository::open`].
    pub fn open_blocking(config: StoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.root).map_err(|source| StoreError::Io {
            path: config.root.clone(),
            source,
        })?;
        let config = Arc::new(config);
        let lookup = Arc::new(LookupStore::open(config.lookup_path())?);
        let store = CategoryStore::new(Arc::clone(&config), lookup);

        let index = Arc::new(KeyIndex::new());
        index.rebuild(store.scan_keys()?);
        log::debug!(
            "opened asset store at {} ({} record key(s))",
            config.root.display(),
            index.len()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                index,
                serializer: WriteSerializer::new(),
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        self.inner.store.config()
    }

    pub fn lookup(&self) -> &LookupStore {
        self.inner.store.lookup()
    }

    pub fn categories(&self) -> &CategoryStore {
        &self.inner.store
    }

    /// Whether `key` is stored (or currently being stored) anywhere in the corpus.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.index.category_of(key.trim()).is_some()
    }

    /// Insert a new record.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if the key exists in any category. The category
    /// workbook and region sheet are created on demand, and the workbook's columns grow to cover
    /// the record's attributes. Returns the record as stored, with its category and region
    /// matched to the existing file and sheet names.
    ///
    /// The write runs as its own task: dropping the returned future does not cancel it, and the
    /// key stays reserved until the write has finished.
    pub async fn create(&self, record: Record) -> Result<Record> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.create(record).await }).await?
    }

    /// Replace the record stored under `record_key` with `record`.
    ///
    /// `record` may carry a different key, category or region. Within one category the workbook's
    /// columns shrink to drop attributes the old record used and the new one no longer declares.
    /// Across categories the old row is removed first and put back if inserting into the new
    /// category fails. A key with no stored row is created instead.
    ///
    /// The key is held for the whole update: a concurrent update of the same key fails with
    /// [`StoreError::KeyBusy`] and a concurrent create with [`StoreError::DuplicateKey`]. Like [`RecordRepository::create`], the update runs to
    /// completion even if the returned future is dropped.
    pub async fn update(&self, record_key: &str, record: Record) -> Result<Record> {
        let inner = Arc::clone(&self.inner);
        let key = record_key.trim().to_string();
        tokio::spawn(async move { inner.update(key, record).await }).await?
    }

    /// Every parsable record in every category.
    ///
    /// Each category is read inside its write queue, so no file is read mid-write. Categories are
    /// read one after another; the result is not a snapshot of the whole store. Category files
    /// that can't be read are logged and skipped.
    pub async fn list_all(&self) -> Result<Vec<Record>> {
        let inner = Arc::clone(&self.inner);
        let categories = blocking(move || inner.store.list_categories()).await?;

        let mut out = Vec::new();
        for category in categories {
            let inner = Arc::clone(&self.inner);
            let name = category.clone();
            let read = self
                .inner
                .serializer
                .with_lock(
                    &category,
                    blocking(move || inner.store.read_records(&name)),
                )
                .await;
            match read {
                Ok(records) => out.extend(records),
                Err(err @ (StoreError::Read { .. } | StoreError::Io { .. })) => {
                    log::warn!("skipping unreadable category `{category}`: {err}");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(out)
    }

    /// The record stored under `record_key`, if any.
    pub async fn get(&self, record_key: &str) -> Result<Option<Record>> {
        let key = record_key.trim().to_string();
        let Some(category) = self.inner.index.category_of(&key) else {
            return Ok(None);
        };
        let inner = Arc::clone(&self.inner);
        let name = category.clone();
        self.inner
            .serializer
            .with_lock(
                &category,
                blocking(move || {
                    if !inner.store.exists(&name)? {
                        return Ok(None);
                    }
                    let workbook = inner.store.load(&name)?;
                    Ok(workbook.find_key(&key).and_then(|(sheet, row)| {
                        workbook
                            .sheet(sheet)
                            .and_then(|s| s.record_at(row, workbook.category()))
                    }))
                }),
            )
            .await
    }
}

impl Inner {
    async fn create(self: Arc<Self>, mut record: Record) -> Result<Record> {
        record.normalize();
        record.validate()?;

        let reservation = self.index.reserve(&record.record_key, &record.category)?;
        let category = record.category.clone();
        let inner = Arc::clone(&self);
        let stored = self
            .serializer
            .with_lock(&category, blocking(move || inner.create_blocking(record)))
            .await?;
        reservation.commit(&stored.category);
        Ok(stored)
    }

    async fn update(self: Arc<Self>, old_key: String, mut record: Record) -> Result<Record> {
        if old_key.is_empty() {
            return Err(ModelError::EmptyRecordKey.into());
        }
        record.normalize();
        record.validate()?;

        let claim = self.index.claim(&old_key)?;
        let Some(claim) = claim else {
            return self.create(record).await;
        };
        let prior_category = claim.category().to_string();

        let reservation = if record.record_key != old_key {
            Some(self.index.reserve(&record.record_key, &record.category)?)
        } else {
            None
        };

        let stored = if name_eq_case_insensitive(&prior_category, &record.category) {
            let inner = Arc::clone(&self);
            let key = old_key.clone();
            let category = prior_category.clone();
            self.serializer
                .with_lock(
                    &prior_category,
                    blocking(move || inner.update_blocking(&category, &key, record)),
                )
                .await?
        } else {
            self.move_category(&prior_category, &old_key, record).await?
        };

        match reservation {
            Some(reservation) => {
                reservation.commit(&stored.category);
                claim.retire();
            }
            None => claim.commit(&stored.category),
        }
        Ok(stored)
    }

    async fn move_category(
        self: &Arc<Self>,
        prior_category: &str,
        old_key: &str,
        record: Record,
    ) -> Result<Record> {
        let inner = Arc::clone(self);
        let (category, key) = (prior_category.to_string(), old_key.to_string());
        let removed = self
            .serializer
            .with_lock(
                prior_category,
                blocking(move || inner.take_row(&category, &key)),
            )
            .await?;

        let inner = Arc::clone(self);
        let target = record.category.clone();
        let created = self
            .serializer
            .with_lock(&target, blocking(move || inner.create_blocking(record)))
            .await;

        let err = match created {
            Ok(stored) => return Ok(stored),
            Err(err) => err,
        };
        if let Some(removed) = removed {
            let inner = Arc::clone(self);
            let category = removed.category.clone();
            let restored = self
                .serializer
                .with_lock(&category, blocking(move || inner.restore_row(removed)))
                .await;
            if let Err(restore_err) = restored {
                log::warn!(
                    "failed to restore record `{old_key}` in `{prior_category}` after a failed move: {restore_err}"
                );
            }
        }
        Err(err)
    }

    /// Write a new row. The region is registered in the lookup tables before the workbook is
    /// saved, so a failure leaves no row behind.
    fn create_blocking(&self, mut record: Record) -> Result<Record> {
        let (category, created) = self.store.ensure_resolved(&record.category)?;
        record.category = category;
        let mut workbook = self.store.load(&record.category)?;
        if created {
            log::debug!("created category `{}`", record.category);
        }

        let plan = SchemaPlan::for_create(&workbook.dynamic_columns(), &record);
        place_record(&mut workbook, &mut record, &plan)?;
        self.store.lookup().add_region(&record.region)?;
        self.store.save(&workbook)?;
        Ok(record)
    }

    fn update_blocking(&self, category: &str, old_key: &str, mut record: Record) -> Result<Record> {
        let mut workbook = self.store.load(category)?;
        record.category = workbook.category().to_string();

        let Some((sheet_idx, row)) = workbook.find_key(old_key) else {
            log::warn!("record `{old_key}` is indexed in `{category}` but has no row; inserting");
            let plan = SchemaPlan::for_create(&workbook.dynamic_columns(), &record);
            place_record(&mut workbook, &mut record, &plan)?;
            self.store.lookup().add_region(&record.region)?;
            self.store.save(&workbook)?;
            return Ok(record);
        };

        let prior = workbook
            .sheet(sheet_idx)
            .map(|sheet| sheet.row_attributes(row))
            .unwrap_or_default();
        let plan = SchemaPlan::for_update(&workbook.dynamic_columns(), &prior, &record);

        if workbook.find_sheet(&record.region) == Some(sheet_idx) {
            let report = reconcile_workbook(&mut workbook, &plan.target);
            log_report(&record.category, &report);
            let sheet = workbook
                .sheet_mut(sheet_idx)
                .ok_or_else(|| missing_sheet(&self.store, &record))?;
            record.region = sheet.name().to_string();
            sheet.replace_record(row, &record)?;
        } else {
            if let Some(sheet) = workbook.sheet_mut(sheet_idx) {
                sheet.remove_row(row);
            }
            place_record(&mut workbook, &mut record, &plan)?;
        }

        self.store.lookup().add_region(&record.region)?;
        self.store.save(&workbook)?;
        Ok(record)
    }

    /// Remove `key`'s row from `category`, returning it for a possible restore. A missing
    /// workbook or row is not an error.
    fn take_row(&self, category: &str, key: &str) -> Result<Option<RemovedRow>> {
        if !self.store.exists(category)? {
            return Ok(None);
        }
        let mut workbook = self.store.load(category)?;
        let Some((sheet_idx, row)) = workbook.find_key(key) else {
            return Ok(None);
        };
        let Some(sheet) = workbook.sheet_mut(sheet_idx) else {
            return Ok(None);
        };
        let headers = sheet.headers().to_vec();
        let name = sheet.name().to_string();
        let Some(cells) = sheet.remove_row(row) else {
            return Ok(None);
        };
        self.store.save(&workbook)?;
        Ok(Some(RemovedRow {
            category: workbook.category().to_string(),
            sheet: name,
            row,
            headers,
            cells,
        }))
    }

    fn restore_row(&self, removed: RemovedRow) -> Result<()> {
        let mut workbook = self.store.load(&removed.category)?;
        let idx = workbook.ensure_sheet(&removed.sheet);
        if let Some(sheet) = workbook.sheet_mut(idx) {
            sheet.insert_cells(removed.row, &removed.headers, removed.cells);
        }
        self.store.save(&workbook)
    }
}

/// Put `record` on its region sheet, creating the sheet and applying `plan` to the whole
/// workbook first. The record's region is rewritten to the sheet's name.
fn place_record(
    workbook: &mut CategoryWorkbook,
    record: &mut Record,
    plan: &SchemaPlan,
) -> Result<()> {
    let sheet_idx = workbook.ensure_sheet(&record.region);
    let report = reconcile_workbook(workbook, &plan.target);
    log_report(workbook.category(), &report);

    let category = workbook.category().to_string();
    let sheet = workbook
        .sheet_mut(sheet_idx)
        .ok_or_else(|| StoreError::MissingWorkbook { category })?;
    record.region = sheet.name().to_string();
    sheet.append_record(record)
}

fn log_report(category: &str, report: &crate::schema::ReconcileReport) {
    if !report.is_empty() {
        log::debug!(
            "category `{category}` columns changed: added {:?}, removed {:?}",
            report.added,
            report.removed
        );
    }
}

fn missing_sheet(store: &CategoryStore, record: &Record) -> StoreError {
    StoreError::SheetNotFound {
        path: store.config().category_path(&record.category),
        sheet: record.region.clone(),
    }
}

/// Run blocking file work on tokio's blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
