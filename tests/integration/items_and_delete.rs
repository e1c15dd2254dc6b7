use serde_json::json;
use test_support::FixtureBackend;

#[test]
fn check_reports_existing_item_for_drug() {
  let backend = FixtureBackend::new(json!({
    "GET stockmanagement/stockitem": { "results": [{ "uuid": "si-1", "drugUuid": "d1", "commonName": "Paracetamol" }] }
  }));

  let out = backend.cmd().args(["items", "check", "--drug", "d1"]).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["exists"], true);
  assert_eq!(v["stockItem"]["uuid"], "si-1");

  let requests = backend.requests();
  assert!(requests[0].contains("drugUuid=d1"), "{requests:?}");
  assert!(requests[0].contains("limit=1"), "{requests:?}");
}

#[test]
fn check_reports_absent_item_for_concept() {
  let backend = FixtureBackend::new(json!({ "GET stockmanagement/stockitem": { "results": [] } }));

  let out = backend.cmd().args(["items", "check", "--concept", "c1"]).output().unwrap();
  assert!(out.status.success());

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["exists"], false);
  assert!(v["stockItem"].is_null());
  assert!(backend.requests()[0].contains("conceptUuid=c1"));
}

#[test]
fn check_requires_drug_or_concept() {
  let backend = FixtureBackend::new(json!({}));
  backend.cmd().args(["items", "check"]).assert().failure();
  assert!(backend.requests().is_empty());
}

#[test]
fn list_all_walks_pages_until_total() {
  let page1 = json!({ "results": [{ "uuid": "a" }, { "uuid": "b" }], "totalCount": 3 });
  let page2 = json!({ "results": [{ "uuid": "c" }], "totalCount": 3 });
  let backend = FixtureBackend::new(json!({
    "GET stockmanagement/stockitem": { "$sequence": [page1, page2] }
  }));

  let out = backend
    .cmd()
    .args(["list", "stockitem", "--all", "--page-size", "2"])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let rows: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let ids: Vec<&str> = rows.as_array().unwrap().iter().map(|r| r["uuid"].as_str().unwrap()).collect();
  assert_eq!(ids, vec!["a", "b", "c"]);
  assert_eq!(backend.requests().len(), 2);
}

#[test]
fn delete_single_id_uses_plain_path() {
  let backend = FixtureBackend::new(json!({}));
  let out = backend.cmd().args(["delete", "stockrule", "r1"]).output().unwrap();
  assert!(out.status.success());

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["deleted"], "stockmanagement/stockrule/r1");
  assert_eq!(backend.requests(), vec!["DELETE stockmanagement/stockrule/r1".to_string()]);
}

#[test]
fn delete_many_ids_joins_the_rest_as_query() {
  let backend = FixtureBackend::new(json!({}));
  backend.cmd().args(["delete", "location", "l1", "l2", "l3"]).assert().success();
  assert_eq!(backend.requests(), vec!["DELETE location/l1?ids=l2,l3".to_string()]);
}

#[test]
fn delete_without_ids_is_a_usage_error() {
  let backend = FixtureBackend::new(json!({}));
  backend.cmd().args(["delete", "stockrule"]).assert().failure();
  assert!(backend.requests().is_empty());
}

#[test]
fn create_posts_when_no_item_exists() {
  let backend = FixtureBackend::new(json!({ "GET stockmanagement/stockitem": { "results": [] } }));

  let out = backend
    .cmd()
    .args(["items", "create", "--drug", "d9", "--common-name", "Amoxicillin", "--has-expiration"])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let saved: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(saved["uuid"], "mock-1");
  assert_eq!(saved["drugUuid"], "d9");
  assert_eq!(saved["isDrug"], true);

  let requests = backend.requests();
  assert_eq!(requests.len(), 2);
  assert!(requests[1].starts_with("POST stockmanagement/stockitem "));
}

#[test]
fn create_is_refused_for_duplicate_drug() {
  let backend = FixtureBackend::new(json!({
    "GET stockmanagement/stockitem": { "results": [{ "uuid": "si-1", "drugUuid": "d1" }] }
  }));

  backend
    .cmd()
    .args(["items", "create", "--drug", "d1"])
    .assert()
    .failure()
    .stderr(predicates::str::contains("a stock item already exists for drug d1"));
  assert!(backend.requests().iter().all(|r| !r.starts_with("POST ")));
}

#[test]
fn list_sends_resource_specific_filters() {
  let backend = FixtureBackend::new(json!({
    "GET stockmanagement/stockbatch": { "results": [] },
    "GET stockmanagement/stockrule": { "results": [] },
    "GET stockmanagement/stockiteminventory": { "results": [] },
    "GET stockmanagement/stockoperation": { "results": [] }
  }));

  let runs: [&[&str]; 4] = [
    &["list", "stockbatch", "--stock-item", "si-1"],
    &["list", "stockrule", "--stock-item", "si-1", "--location", "loc-1"],
    &["list", "stockiteminventory", "--location", "loc-1", "--group-by", "LocationStockItem"],
    &["list", "stockoperation", "--status", "SUBMITTED", "--status", "COMPLETED", "--search", "rx"],
  ];
  for args in runs {
    let out = backend.cmd().args(args).output().unwrap();
    assert!(out.status.success(), "{args:?}: {}", String::from_utf8_lossy(&out.stderr));
  }

  let requests = backend.requests();
  assert_eq!(requests.len(), 4);
  assert!(requests[0].contains("stockItemUuid=si-1"), "{requests:?}");
  assert!(requests[1].contains("stockItemUuid=si-1&locationUuid=loc-1"), "{requests:?}");
  assert!(requests[2].contains("locationUuids=loc-1&groupBy=LocationStockItem"), "{requests:?}");
  assert!(requests[3].contains("q=rx&status=SUBMITTED,COMPLETED"), "{requests:?}");
}

#[test]
fn list_warns_about_options_the_resource_ignores() {
  let backend = FixtureBackend::new(json!({ "GET location": { "results": [] } }));

  let out = backend
    .cmd()
    .args(["list", "location", "--stock-item", "si-1"])
    .output()
    .unwrap();
  assert!(out.status.success());
  assert!(String::from_utf8_lossy(&out.stderr).contains("--stock-item"));
  assert!(!backend.requests()[0].contains("stockItemUuid"));
}
