use serde_json::json;
use test_support::{read_fixture_json, FixtureBackend};

fn jobs_backend() -> FixtureBackend {
  let page: serde_json::Value = read_fixture_json("api/batch_jobs.json");
  let first = page["results"][0].clone();
  FixtureBackend::new(json!({
    "GET stockmanagement/batchjob": page,
    "GET stockmanagement/batchjob/job-1": first,
  }))
}

#[test]
fn list_passes_normalized_status_filter() {
  let backend = jobs_backend();
  let out = backend.cmd().args(["jobs", "list", "--status", "running"]).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let jobs: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(jobs.as_array().unwrap().len(), 2);
  assert!(backend.requests()[0].contains("status=Running"));
}

#[test]
fn cancel_sends_one_delete_for_all_ids() {
  let backend = jobs_backend();
  let out = backend.cmd().args(["jobs", "cancel", "job-1", "job-2", "job-3"]).output().unwrap();
  assert!(out.status.success());

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["cancelled"], json!(["job-1", "job-2", "job-3"]));
  assert_eq!(backend.requests(), vec!["DELETE stockmanagement/batchjob/job-1?ids=job-2,job-3".to_string()]);
}

#[test]
fn params_shows_labelled_rows_without_report_marker() {
  let backend = jobs_backend();
  let out = backend.cmd().args(["jobs", "params", "job-1"]).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let rows: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let names: Vec<&str> = rows.as_array().unwrap().iter().map(|r| r["name"].as_str().unwrap()).collect();
  assert!(names.contains(&"location"));
  assert!(!names.contains(&"report"));
}

#[test]
fn clone_reencodes_existing_parameters() {
  let backend = jobs_backend();
  let out = backend.cmd().args(["jobs", "clone", "job-1", "--dry-run"]).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let payload: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let text = payload["parameters"].as_str().unwrap();
  assert!(text.starts_with("param.report=StockStatusReport\r\n"));
  assert!(text.contains("param.location.value=loc-1\r\n"));
  assert!(text.contains("param.date.value=2024-02-29\r\n"));
  assert!(backend.requests().iter().all(|r| r.starts_with("GET ")));
}

#[test]
fn artifact_url_is_built_from_base_url() {
  let backend = FixtureBackend::new(json!({}));
  let out = backend
    .cmd()
    .args(["--base-url", "https://stock.example/openmrs/ws/rest/v1/", "jobs", "artifact-url", "job-1", "--download"])
    .output()
    .unwrap();
  assert!(out.status.success());
  assert_eq!(
    String::from_utf8_lossy(&out.stdout).trim(),
    "https://stock.example/openmrs/ws/rest/v1/stockmanagement/batchjobartifact?id=job-1&download=true"
  );
}

#[test]
fn list_tolerates_jobs_without_status() {
  let backend = FixtureBackend::new(json!({
    "GET stockmanagement/batchjob": {
      "results": [
        { "uuid": "a", "status": null },
        { "uuid": "b", "status": "Running" },
        { "uuid": "c" }
      ]
    }
  }));

  let out = backend.cmd().args(["jobs", "list"]).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let jobs: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let statuses: Vec<&str> = jobs.as_array().unwrap().iter().map(|j| j["status"].as_str().unwrap()).collect();
  assert_eq!(statuses, vec!["Unknown", "Running", "Unknown"]);
}
