use predicates::prelude::*;
use serde_json::json;
use test_support::{cmd_bin, FixtureBackend};

#[test]
fn server_error_message_reaches_stderr_with_nonzero_exit() {
  let backend = FixtureBackend::new(json!({
    "POST stockmanagement/batchjob": { "$status": 400, "body": { "error": { "message": "Location is required" } } }
  }));

  backend
    .cmd()
    .args([
      "report", "create", "--kind", "stock-status", "--location", "loc-1", "--date", "2024-02-29",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Location is required"));

  // Mutations are never retried
  let posts = backend.requests().iter().filter(|r| r.starts_with("POST ")).count();
  assert_eq!(posts, 1);
}

#[test]
fn error_without_message_falls_back_to_generic_text() {
  let backend = FixtureBackend::new(json!({
    "DELETE stockmanagement/stockitem/s1": { "$status": 500, "body": { "unexpected": true } }
  }));

  backend
    .cmd()
    .args(["delete", "stockitem", "s1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("The server could not complete the request"));
}

#[test]
fn missing_record_is_reported_as_not_found() {
  let backend = FixtureBackend::new(json!({}));
  backend
    .cmd()
    .args(["items", "get", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("404"));
}

#[test]
fn unreachable_server_is_a_transport_error() {
  cmd_bin()
    .args(["--base-url", "http://127.0.0.1:9/ws/rest/v1", "--timeout-secs", "2", "jobs", "list"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("request to http://127.0.0.1:9/ws/rest/v1/stockmanagement/batchjob"));
}

#[test]
fn invalid_base_url_from_env_is_rejected() {
  cmd_bin()
    .env("STOCK_ADMIN_BASE_URL", "ftp://stock.example")
    .args(["jobs", "list"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("http(s) URL"));
}
