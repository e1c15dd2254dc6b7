use base64::Engine;

use super::{ApiError, ClientConfig, StockApi};
use crate::query::with_query;

/// Live backend over HTTP (ureq). Timeouts come from the agent configuration.
pub struct HttpApi {
  agent: ureq::Agent,
  rest_base: String,
  authorization: Option<String>,
}

impl HttpApi {
  pub fn new(cfg: &ClientConfig) -> Self {
    let agent = ureq::AgentBuilder::new()
      .timeout(cfg.timeout)
      .user_agent(&cfg.user_agent)
      .build();

    let authorization = cfg.credentials.as_ref().map(|c| {
      let raw = format!("{}:{}", c.username, c.password);
      format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(raw))
    });

    Self {
      agent,
      rest_base: cfg.rest_base.trim_end_matches('/').to_string(),
      authorization,
    }
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.rest_base, path.trim_start_matches('/'))
  }

  fn request(&self, method: &str, url: &str) -> ureq::Request {
    let req = self.agent.request(method, url).set("Accept", "application/json");

    match &self.authorization {
      Some(auth) => req.set("Authorization", auth),
      None => req,
    }
  }

  fn read_body(url: &str, resp: ureq::Response) -> Result<serde_json::Value, ApiError> {
    let text = resp.into_string().map_err(|e| ApiError::Transport {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    if text.trim().is_empty() {
      return Ok(serde_json::Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| ApiError::Decode {
      path: url.to_string(),
      message: e.to_string(),
    })
  }

  fn finish(url: &str, result: Result<ureq::Response, ureq::Error>) -> Result<serde_json::Value, ApiError> {
    match result {
      Ok(resp) => Self::read_body(url, resp),
      Err(ureq::Error::Status(status, resp)) => {
        let body = resp.into_string().ok().and_then(|t| serde_json::from_str::<serde_json::Value>(&t).ok());
        tracing::warn!(status, url, "request rejected by server");
        Err(ApiError::from_response(status, body.as_ref()))
      }
      Err(e) => Err(ApiError::Transport {
        url: url.to_string(),
        message: e.to_string(),
      }),
    }
  }
}

impl StockApi for HttpApi {
  fn get_json(&self, path: &str, query: &str) -> Result<serde_json::Value, ApiError> {
    let url = self.url(&with_query(path, query));
    tracing::debug!(%url, "GET");
    Self::finish(&url, self.request("GET", &url).call())
  }

  fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
    let url = self.url(path);
    tracing::debug!(%url, "POST");
    Self::finish(&url, self.request("POST", &url).send_json(body.clone()))
  }

  fn delete(&self, path: &str) -> Result<(), ApiError> {
    let url = self.url(path);
    tracing::debug!(%url, "DELETE");

    // Any 2xx commits the delete; the body is not inspected
    match self.request("DELETE", &url).call() {
      Ok(_) => Ok(()),
      Err(e) => Self::finish(&url, Err(e)).map(|_| ()),
    }
  }
}
