use serde_json::json;
use test_support::FixtureBackend;

fn page(status: &str) -> serde_json::Value {
  json!({ "results": [{ "uuid": "job-1", "batchJobType": "Report", "status": status }] })
}

fn rounds(stdout: &[u8]) -> Vec<serde_json::Value> {
  String::from_utf8_lossy(stdout)
    .lines()
    .map(|l| serde_json::from_str(l).unwrap())
    .collect()
}

#[test]
fn watch_refetches_until_no_job_is_active() {
  let backend = FixtureBackend::new(json!({
    "GET stockmanagement/batchjob": { "$sequence": [page("Pending"), page("Running"), page("Completed")] }
  }));

  let out = backend
    .cmd()
    .args(["jobs", "watch", "--interval-ms", "10"])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let lines = rounds(&out.stdout);
  assert_eq!(lines.len(), 3);
  assert_eq!(lines[0]["active"], 1);
  assert_eq!(lines[2]["active"], 0);
  assert_eq!(lines[2]["jobs"][0], json!(["job-1", "Completed"]));

  // Every round reaches the backend; nothing is served from the cache
  let gets = backend.requests().iter().filter(|r| r.starts_with("GET stockmanagement/batchjob")).count();
  assert_eq!(gets, 3);
}

#[test]
fn watch_stops_after_one_fetch_when_everything_is_settled() {
  let backend = FixtureBackend::new(json!({ "GET stockmanagement/batchjob": page("Failed") }));

  let out = backend.cmd().args(["jobs", "watch", "--interval-ms", "10"]).output().unwrap();
  assert!(out.status.success());
  assert_eq!(rounds(&out.stdout).len(), 1);
  assert_eq!(backend.requests().len(), 1);
}

#[test]
fn watch_honours_max_rounds_while_jobs_stay_active() {
  let backend = FixtureBackend::new(json!({ "GET stockmanagement/batchjob": page("Running") }));

  let out = backend
    .cmd()
    .args(["jobs", "watch", "--interval-ms", "10", "--max-rounds", "2"])
    .output()
    .unwrap();
  assert!(out.status.success());

  let lines = rounds(&out.stdout);
  assert_eq!(lines.len(), 2);
  assert_eq!(lines[1]["active"], 1);
}

#[test]
fn watch_lists_only_report_jobs() {
  let backend = FixtureBackend::new(json!({ "GET stockmanagement/batchjob": page("Completed") }));
  backend.cmd().args(["jobs", "watch"]).assert().success();

  let requests = backend.requests();
  assert!(requests[0].contains("batchJobType=Report"), "{requests:?}");
  assert!(requests[0].contains("v=default"), "{requests:?}");
}

#[test]
fn watch_treats_missing_status_as_settled() {
  let backend = FixtureBackend::new(json!({
    "GET stockmanagement/batchjob": { "results": [{ "uuid": "job-1", "status": null }] }
  }));

  let out = backend.cmd().args(["jobs", "watch", "--interval-ms", "10"]).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let lines = rounds(&out.stdout);
  assert_eq!(lines.len(), 1);
  assert_eq!(lines[0]["jobs"][0], json!(["job-1", "Unknown"]));
}
