use predicates::prelude::*;
use serde_json::json;
use test_support::{cmd_bin, FixtureBackend};

fn decode_parameters(text: &str) -> serde_json::Value {
  let out = cmd_bin()
    .args(["params", "decode"])
    .write_stdin(text.to_string())
    .output()
    .unwrap();
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn dry_run_prints_payload_without_contacting_server() {
  let backend = FixtureBackend::new(json!({}));
  let out = backend
    .cmd()
    .args([
      "report",
      "create",
      "--kind",
      "stock-status",
      "--location",
      "loc-1=Main Store",
      "--child-locations",
      "--date",
      "2024-02-29",
      "--dry-run",
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  assert!(backend.requests().is_empty());

  let payload: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(payload["batchJobType"], "Report");
  assert_eq!(payload["description"], "Stock Status Report");

  let params = decode_parameters(payload["parameters"].as_str().unwrap());
  assert_eq!(params["report"]["value"], "StockStatusReport");
  assert_eq!(params["location"]["value"], "loc-1");
  assert_eq!(params["location"]["display"], "Main Store");
  assert_eq!(params["childLocations"]["value"], "true");
  assert_eq!(params["date"]["display"], "29/02/2024");
}

#[test]
fn submit_posts_batch_job_and_prints_created_record() {
  let backend = FixtureBackend::new(json!({}));
  let out = backend
    .cmd()
    .args([
      "report",
      "create",
      "--kind",
      "stock-expiry",
      "--location",
      "loc-1",
      "--start-date",
      "2024-01-01",
      "--end-date",
      "2024-01-31",
      "--description",
      "January expiries",
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let job: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(job["uuid"], "mock-1");
  assert_eq!(job["description"], "January expiries");
  // The echoed record carries no status; it still decodes
  assert_eq!(job["status"], "Unknown");

  let requests = backend.requests();
  assert_eq!(requests.len(), 1);
  assert!(requests[0].starts_with("POST stockmanagement/batchjob "));
}

#[test]
fn missing_required_parameters_fail_before_any_request() {
  let backend = FixtureBackend::new(json!({}));
  backend
    .cmd()
    .args(["report", "create", "--kind", "stock-card", "--location", "loc-1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("stockItem"));
  assert!(backend.requests().is_empty());
}

#[test]
fn reversed_date_range_is_rejected() {
  cmd_bin()
    .args([
      "report",
      "create",
      "--kind",
      "stock-receipt",
      "--location",
      "loc-1",
      "--start-date",
      "2024-02-01",
      "--end-date",
      "2024-01-01",
      "--dry-run",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("after end date"));
}

#[test]
fn report_kinds_lists_server_reports() {
  let backend = FixtureBackend::new(json!({
    "GET stockmanagement/report": {
      "results": [
        {"name": "Stock Status Report", "systemName": "StockStatusReport", "parameters": ["location", "date"]}
      ]
    }
  }));
  let out = backend.cmd().args(["report", "kinds"]).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v[0]["systemName"], "StockStatusReport");
}
