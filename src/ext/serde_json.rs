// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path lookups into loosely shaped JSON (server error payloads)
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper; numeric segments index into arrays
// invariants: No panics; missing paths, non-string leaves and blank strings yield None
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

/// A JSON location found by `fetch`.
pub struct JsonFetched<'a> {
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  /// Non-empty string at this location.
  pub fn text(&self) -> Option<String> {
    self
      .inner
      .and_then(|v| v.as_str())
      .filter(|s| !s.trim().is_empty())
      .map(str::to_string)
  }
}

/// Fetch nested values via paths like `error.message` or `error.globalErrors.0.message`.
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      let next = match cur {
        serde_json::Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        other => other.get(key),
      };

      match next {
        Some(n) => cur = n,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
