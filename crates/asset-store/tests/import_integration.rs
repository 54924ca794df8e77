use std::path::{Path, PathBuf};
use std::sync::Arc;

use asset_model::{Record, Status};
use asset_store::{ImportPipeline, RecordRepository, RegionResolver, StoreConfig, StoreError};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;

/// Cell content for fixture sheets.
enum Cell {
    S(&'static str),
    N(f64),
    Blank,
}

use Cell::{Blank, N, S};

fn write_fixture(path: &Path, sheets: &[(&str, Vec<Vec<Cell>>)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("sheet name");
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    S(text) => {
                        worksheet.write_string(r, c, *text).expect("write string");
                    }
                    N(n) => {
                        worksheet.write_number(r, c, *n).expect("write number");
                    }
                    Blank => {}
                }
            }
        }
    }
    workbook.save(path).expect("save fixture");
}

async fn setup() -> (tempfile::TempDir, PathBuf, RecordRepository) {
    let tmp = tempfile::tempdir().expect("temp dir");
    let store_root = tmp.path().join("store");
    let repo = RecordRepository::open(StoreConfig::new(&store_root))
        .await
        .expect("open repository");
    let source = tmp.path().join("source.xlsx");
    (tmp, source, repo)
}

#[tokio::test]
async fn region_suffix_on_sheet_name_applies_to_every_row() {
    let (_tmp, source, repo) = setup().await;
    write_fixture(
        &source,
        &[(
            "Cableway BC",
            vec![
                vec![S("RecordID"), S("Site Name"), S("Latitude"), S("Longitude")],
                vec![S("C1"), S("Capilano"), N(49.3), N(-123.1)],
                vec![S("C2"), S("Lynn"), N(49.4), N(-123.0)],
            ],
        )],
    );

    let summary = ImportPipeline::new(repo.clone())
        .import_sheet(&source, "Cableway BC")
        .await
        .expect("import");
    assert_eq!(summary.category, "Cableway");
    assert_eq!(summary.imported, 2);
    assert!(summary.errors.is_empty());

    let all = repo.list_all().await.expect("list");
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|r| r.region == "BC" && r.category == "Cableway"));
    assert_eq!(all[0].site_name, "Capilano");
    assert_eq!(repo.lookup().list_regions(), vec!["BC".to_string()]);
    assert_eq!(repo.lookup().list_categories(), vec!["Cableway".to_string()]);
}

#[tokio::test]
async fn rows_are_counted_without_aborting_the_batch() {
    let (_tmp, source, repo) = setup().await;
    repo.create(Record::new("W2", "Weir", "AB", 51.0, -114.0))
        .await
        .expect("seed duplicate");

    write_fixture(
        &source,
        &[(
            "Weir",
            vec![
                vec![S("Weir inventory")],
                vec![],
                vec![
                    S("Station ID"),
                    S("Lat"),
                    S("Long"),
                    S("Province"),
                    S("Status"),
                    S("Rank"),
                    S("Inspection - LastDate"),
                ],
                vec![N(1001.0), N(50.1), N(-120.2), S("BC"), S("ACTIVE"), N(2.0), S("2024-05-01")],
                vec![S("W2"), N(51.0), N(-114.0), S("AB"), Blank, Blank, Blank],
                vec![S("W3"), S("n/a"), N(-114.0), S("AB")],
                vec![],
                vec![S("W4"), N(51.0), N(-114.0), Blank],
                vec![S("W5"), N(51.0), N(-114.0), S("AB"), Blank, N(9.0)],
                vec![S("W6"), N(52.0), N(-113.0), S("ab"), S("mothballed")],
            ],
        )],
    );

    let summary = ImportPipeline::new(repo.clone())
        .import_sheet(&source, "weir")
        .await
        .expect("import");

    assert_eq!(summary.sheet, "Weir");
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.duplicates, vec!["W2".to_string()]);
    let error_rows: Vec<usize> = summary.errors.iter().map(|e| e.row).collect();
    assert_eq!(error_rows, vec![8, 9]);

    let first = repo.get("1001").await.unwrap().expect("numeric key imported");
    assert_eq!(first.region, "BC");
    assert_eq!(first.status, Status::Active);
    assert_eq!(first.repair_rank.map(|r| r.get()), Some(2));
    assert_eq!(first.attributes.get("Inspection", "LastDate"), Some("2024-05-01"));

    let w6 = repo.get("W6").await.unwrap().expect("W6 imported");
    assert_eq!(w6.region, "AB");
    assert_eq!(w6.status, Status::Mothballed);
}

#[tokio::test]
async fn resolver_fills_in_missing_regions() {
    let (_tmp, source, repo) = setup().await;
    write_fixture(
        &source,
        &[(
            "Gauge",
            vec![
                vec![S("id"), S("latitude"), S("longitude")],
                vec![S("G1"), N(50.0), N(-120.0)],
                vec![S("G2"), N(-10.0), N(-120.0)],
            ],
        )],
    );

    let resolver = |lat: f64, _lon: f64| (lat > 0.0).then(|| "BC".to_string());
    let resolver: Arc<dyn RegionResolver> = Arc::new(resolver);
    let summary = ImportPipeline::new(repo.clone())
        .with_resolver(resolver)
        .import_sheet(&source, "Gauge")
        .await
        .expect("import");

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 3);
    assert_eq!(repo.get("G1").await.unwrap().unwrap().region, "BC");
}

#[tokio::test]
async fn bounding_boxes_from_config_resolve_regions() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let config: StoreConfig = serde_json::from_value(serde_json::json!({
        "root": tmp.path().join("store"),
        "regionBoxes": [
            { "code": "AB", "minLat": 49.0, "maxLat": 60.0, "minLon": -120.0, "maxLon": -110.0 }
        ]
    }))
    .expect("config");
    let repo = RecordRepository::open(config).await.expect("open");
    let source = tmp.path().join("source.xlsx");
    write_fixture(
        &source,
        &[(
            "Dam",
            vec![
                vec![S("RecordID"), S("Latitude"), S("Longitude")],
                vec![S("D1"), N(51.0), N(-114.0)],
            ],
        )],
    );

    let summary = ImportPipeline::new(repo.clone())
        .import_sheet(&source, "Dam")
        .await
        .expect("import");
    assert_eq!(summary.imported, 1);
    assert_eq!(repo.get("D1").await.unwrap().unwrap().region, "AB");
}

#[tokio::test]
async fn sheets_without_a_header_row_are_rejected() {
    let (_tmp, source, repo) = setup().await;
    write_fixture(
        &source,
        &[
            ("Notes", vec![vec![S("nothing to see")]]),
            ("Weir BC", vec![vec![S("RecordID"), S("Latitude"), S("Longitude")]]),
        ],
    );
    let pipeline = ImportPipeline::new(repo);

    assert_eq!(
        pipeline.list_source_sheets(&source).await.expect("list sheets"),
        vec!["Notes".to_string(), "Weir BC".to_string()]
    );
    assert!(matches!(
        pipeline.import_sheet(&source, "Notes").await,
        Err(StoreError::HeaderNotFound { .. })
    ));
    assert!(matches!(
        pipeline.import_sheet(&source, "Missing").await,
        Err(StoreError::SheetNotFound { .. })
    ));
    let empty = pipeline
        .import_sheet(&source, "Weir BC")
        .await
        .expect("header-only sheet");
    assert_eq!(empty.imported, 0);
}
