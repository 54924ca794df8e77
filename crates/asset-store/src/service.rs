//! UI-facing operations. Every call resolves to a [`Response`] envelope; errors become a failure
//! message instead of crossing the boundary.

use std::path::Path;

use asset_model::{validate_category_name, Record};
use serde::{Deserialize, Serialize};

use crate::import::{ImportPipeline, ImportSummary};
use crate::lookup::ColorEntry;
use crate::repository::RecordRepository;
use crate::{Result, StoreError};

/// `{"success": true, "data": ...}` or `{"success": false, "message": "..."}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T> From<Result<T>> for Response<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Response::ok(data),
            Err(err) => {
                log::debug!("request failed: {err}");
                Response::failure(err.to_string())
            }
        }
    }
}

#[derive(Debug)]
pub struct AssetService {
    repository: RecordRepository,
    importer: ImportPipeline,
}

impl AssetService {
    pub fn new(repository: RecordRepository) -> Self {
        let importer = ImportPipeline::new(repository.clone());
        Self {
            repository,
            importer,
        }
    }

    pub fn with_importer(repository: RecordRepository, importer: ImportPipeline) -> Self {
        Self {
            repository,
            importer,
        }
    }

    pub fn repository(&self) -> &RecordRepository {
        &self.repository
    }

    pub async fn get_all_records(&self) -> Response<Vec<Record>> {
        self.repository.list_all().await.into()
    }

    pub async fn get_record(&self, record_key: &str) -> Response<Option<Record>> {
        self.repository.get(record_key).await.into()
    }

    pub async fn create_record(&self, record: Record) -> Response<Record> {
        self.repository.create(record).await.into()
    }

    pub async fn update_record(&self, record_key: &str, record: Record) -> Response<Record> {
        self.repository.update(record_key, record).await.into()
    }

    pub fn list_regions(&self) -> Response<Vec<String>> {
        Response::ok(self.repository.lookup().list_regions())
    }

    pub fn list_categories(&self) -> Response<Vec<String>> {
        Response::ok(self.repository.lookup().list_categories())
    }

    pub fn add_region(&self, name: &str) -> Response<bool> {
        self.repository.lookup().add_region(name).into()
    }

    pub fn add_category(&self, name: &str) -> Response<bool> {
        let result = validate_category_name(name.trim())
            .map_err(StoreError::from)
            .and_then(|()| self.repository.lookup().add_category(name));
        result.into()
    }

    pub fn get_color(&self, category: &str, region: &str) -> Response<Option<String>> {
        Response::ok(self.repository.lookup().get_color(category, region))
    }

    pub fn set_color(&self, category: &str, region: &str, color: &str) -> Response<ColorEntry> {
        let lookup = self.repository.lookup();
        let result = lookup.set_color(category, region, color).map(|()| ColorEntry {
            category: category.trim().to_string(),
            region: region.trim().to_string(),
            color: color.trim().to_string(),
        });
        result.into()
    }

    pub async fn import_sheet(&self, path: &Path, sheet_name: &str) -> Response<ImportSummary> {
        self.importer.import_sheet(path, sheet_name).await.into()
    }

    pub async fn list_import_sheets(&self, path: &Path) -> Response<Vec<String>> {
        self.importer.list_source_sheets(path).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelopes_serialize_without_empty_fields() {
        let ok: Response<bool> = Response::ok(true);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "success": true, "data": true })
        );

        let failed: Response<bool> = Err(StoreError::MissingWorkbook {
            category: "Weir".to_string(),
        })
        .into();
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({ "success": false, "message": "no workbook exists for category `Weir`" })
        );
    }
}
