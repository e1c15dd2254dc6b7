// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: REST access to the stock-management backend behind a trait seam (HTTP, env fixtures, cache wrapper)
// role: api/namespace
// inputs: ClientConfig (base URL, credentials, timeout); env STOCK_TEST_* selects the fixture backend
// outputs: StockApi implementations and the typed StockClient
// invariants:
// - No module-level client: every backend is constructed explicitly and passed down
// - Errors carry the server-supplied message when the `{ error }` payload has one
// errors: ApiError (transport, server, decode, invalid request, existence conflict)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod cached;
pub mod client;
pub mod env_mock;
pub mod http;

use std::time::Duration;

use thiserror::Error;

use crate::ext::serde_json::JsonFetch;

pub use cached::CachedApi;
pub use client::StockClient;
pub use env_mock::EnvApi;
pub use http::HttpApi;

/// Message shown when the server gave no usable error text.
pub const GENERIC_ERROR_MESSAGE: &str = "The server could not complete the request";

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("request to {url} failed: {message}")]
  Transport { url: String, message: String },

  #[error("server returned {status}: {message}")]
  Server { status: u16, message: String },

  #[error("unexpected response from {path}: {message}")]
  Decode { path: String, message: String },

  #[error("invalid request: {0}")]
  InvalidRequest(String),

  #[error("a stock item already exists for {0}")]
  StockItemExists(String),
}

impl ApiError {
  /// Build a server error from a response body, preferring its `{ error }` message.
  pub fn from_response(status: u16, body: Option<&serde_json::Value>) -> Self {
    let message = body.and_then(server_message).unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
    ApiError::Server { status, message }
  }
}

/// Extract the human message from an `{ error }` payload.
///
/// Accepts `{ error: { message } }`, `{ error: "text" }`, and the first
/// global error when the top-level message is absent.
pub fn server_message(body: &serde_json::Value) -> Option<String> {
  ["error.message", "error", "error.globalErrors.0.message"]
    .iter()
    .find_map(|path| body.fetch(path).text())
}

/// Whether a mutation response is the `{ error }` shape rather than a record.
pub fn is_error_payload(body: &serde_json::Value) -> bool {
  body.get("error").map(|e| !e.is_null()).unwrap_or(false)
}

/// Transport seam over the REST backend. Paths are relative to the versioned base.
pub trait StockApi {
  fn get_json(&self, path: &str, query: &str) -> Result<serde_json::Value, ApiError>;
  fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value, ApiError>;
  fn delete(&self, path: &str) -> Result<(), ApiError>;

  /// Drop cached reads carrying any of `tags` so the next read refetches.
  fn invalidate(&self, _tags: &[&str]) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
  /// Versioned REST base, e.g. `http://host/openmrs/ws/rest/v1`.
  pub rest_base: String,
  pub credentials: Option<Credentials>,
  pub timeout: Duration,
  pub user_agent: String,
}

fn env_wants_mock() -> bool {
  std::env::vars().any(|(k, _)| k.starts_with(env_mock::ENV_PREFIX))
}

/// Select the backend for this run and wrap it in the request cache.
pub fn build_api(cfg: &ClientConfig) -> Box<dyn StockApi> {
  let inner: Box<dyn StockApi> = if env_wants_mock() {
    tracing::debug!("using fixture backend from {}* variables", env_mock::ENV_PREFIX);
    Box::new(EnvApi::from_env())
  } else {
    Box::new(HttpApi::new(cfg))
  };

  Box::new(CachedApi::new(inner))
}
