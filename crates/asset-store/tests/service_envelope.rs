use asset_model::Record;
use asset_store::{AssetService, RecordRepository, StoreConfig};
use serde_json::{json, Value};

async fn service() -> (tempfile::TempDir, AssetService) {
    let tmp = tempfile::tempdir().expect("temp dir");
    let repo = RecordRepository::open(StoreConfig::new(tmp.path()))
        .await
        .expect("open repository");
    (tmp, AssetService::new(repo))
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("serialize response")
}

#[tokio::test]
async fn failures_are_reported_in_the_envelope() {
    let (_tmp, service) = service().await;

    let created = service
        .create_record(Record::new("S1", "Weir", "BC", 50.0, -120.0))
        .await;
    assert_eq!(to_json(&created)["success"], json!(true));
    assert_eq!(to_json(&created)["data"]["recordKey"], json!("S1"));

    let duplicate = to_json(
        &service
            .create_record(Record::new("S1", "Cableway", "BC", 50.0, -120.0))
            .await,
    );
    assert_eq!(duplicate["success"], json!(false));
    assert!(duplicate.get("data").is_none());
    let message = duplicate["message"].as_str().expect("message");
    assert!(message.contains("Weir"), "{message}");

    let all = to_json(&service.get_all_records().await);
    assert_eq!(all["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn lookup_operations_round_trip() {
    let (_tmp, service) = service().await;

    assert_eq!(to_json(&service.add_region("BC")), json!({ "success": true, "data": true }));
    assert_eq!(to_json(&service.add_region("bc")), json!({ "success": true, "data": false }));
    assert_eq!(to_json(&service.add_category("a/b"))["success"], json!(false));
    assert_eq!(to_json(&service.add_category("Weir"))["data"], json!(true));
    assert_eq!(to_json(&service.list_regions())["data"], json!(["BC"]));
    assert_eq!(to_json(&service.list_categories())["data"], json!(["Weir"]));

    assert_eq!(to_json(&service.get_color("Weir", "BC"))["data"], Value::Null);
    let set = to_json(&service.set_color("Weir", "BC", "#ff0000"));
    assert_eq!(
        set["data"],
        json!({ "category": "Weir", "region": "BC", "color": "#ff0000" })
    );
    assert_eq!(to_json(&service.get_color("weir", "bc"))["data"], json!("#ff0000"));
}

#[tokio::test]
async fn missing_import_file_is_a_failure_not_a_panic() {
    let (tmp, service) = service().await;
    let missing = tmp.path().join("nope.xlsx");
    let listed = to_json(&service.list_import_sheets(&missing).await);
    assert_eq!(listed["success"], json!(false));
    let imported = to_json(&service.import_sheet(&missing, "Weir").await);
    assert_eq!(imported["success"], json!(false));
}
