// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fixture-backed StockApi used by integration tests; selected when STOCK_TEST_* variables exist
// role: api/test-double
// inputs: env STOCK_TEST_FIXTURES (JSON object keyed by request), env STOCK_TEST_LOG (request log file)
// outputs: Fixture responses; echoed records for POSTs without a fixture
// side_effects: Appends one line per request to the STOCK_TEST_LOG file when set
// invariants:
// - Lookup order: "<METHOD> <path>?<query>", "<METHOD> <path>", then "<path>" (GET only)
// - `{"$sequence": [...]}` fixtures answer successive calls in order and repeat the last entry
// - `{"$status": N, "body": {...}}` fixtures answer with a server error
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use super::{ApiError, StockApi};
use crate::query::with_query;

pub const ENV_PREFIX: &str = "STOCK_TEST_";
const FIXTURES_VAR: &str = "STOCK_TEST_FIXTURES";
const LOG_VAR: &str = "STOCK_TEST_LOG";

pub struct EnvApi {
  fixtures: serde_json::Map<String, serde_json::Value>,
  log_path: Option<String>,
  calls: RefCell<HashMap<String, usize>>,
  created: RefCell<usize>,
}

impl EnvApi {
  pub fn from_env() -> Self {
    let fixtures = std::env::var(FIXTURES_VAR)
      .ok()
      .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
      .and_then(|v| v.as_object().cloned())
      .unwrap_or_default();

    Self::new(fixtures, std::env::var(LOG_VAR).ok())
  }

  pub fn new(fixtures: serde_json::Map<String, serde_json::Value>, log_path: Option<String>) -> Self {
    Self {
      fixtures,
      log_path,
      calls: RefCell::new(HashMap::new()),
      created: RefCell::new(0),
    }
  }

  fn record(&self, line: &str) {
    let Some(path) = &self.log_path else { return };

    let file = std::fs::OpenOptions::new().create(true).append(true).open(path);

    if let Ok(mut f) = file {
      let _ = writeln!(f, "{}", line);
    }
  }

  fn lookup(&self, method: &str, path: &str, query: &str) -> Option<(String, &serde_json::Value)> {
    let full = with_query(path, query);
    let mut keys = vec![format!("{} {}", method, full), format!("{} {}", method, path)];

    if method == "GET" {
      keys.push(full);
      keys.push(path.to_string());
    }

    keys
      .into_iter()
      .find_map(|k| self.fixtures.get(&k).map(|v| (k, v)))
  }

  /// Resolve sequences and error fixtures into a response.
  fn answer(&self, key: &str, fixture: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
    let fixture = match fixture.get("$sequence").and_then(|s| s.as_array()) {
      Some(seq) if !seq.is_empty() => {
        let mut calls = self.calls.borrow_mut();
        let n = calls.entry(key.to_string()).or_insert(0);
        let idx = (*n).min(seq.len() - 1);
        *n += 1;
        seq[idx].clone()
      }
      _ => fixture.clone(),
    };

    if let Some(status) = fixture.get("$status").and_then(|s| s.as_u64()) {
      let status = u16::try_from(status).unwrap_or(500);
      return Err(ApiError::from_response(status, fixture.get("body")));
    }

    Ok(fixture)
  }
}

impl StockApi for EnvApi {
  fn get_json(&self, path: &str, query: &str) -> Result<serde_json::Value, ApiError> {
    self.record(&format!("GET {}", with_query(path, query)));

    match self.lookup("GET", path, query) {
      Some((key, fixture)) => self.answer(&key, fixture),
      None => Err(ApiError::from_response(404, None)),
    }
  }

  fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
    self.record(&format!("POST {} {}", path, body));

    if let Some((key, fixture)) = self.lookup("POST", path, "") {
      return self.answer(&key, fixture);
    }

    let mut echoed = body.clone();

    if let Some(obj) = echoed.as_object_mut() {
      if !obj.contains_key("uuid") {
        let mut n = self.created.borrow_mut();
        *n += 1;
        obj.insert("uuid".into(), serde_json::Value::String(format!("mock-{}", *n)));
      }
    }

    Ok(echoed)
  }

  fn delete(&self, path: &str) -> Result<(), ApiError> {
    self.record(&format!("DELETE {}", path));

    match self.lookup("DELETE", path, "") {
      Some((key, fixture)) => self.answer(&key, fixture).map(|_| ()),
      None => Ok(()),
    }
  }
}
