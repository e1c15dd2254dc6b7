use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use super::{ApiError, StockApi};
use crate::model::Resource;
use crate::query::with_query;

struct Entry {
  value: serde_json::Value,
  tags: BTreeSet<String>,
}

// --- Lightweight in-memory caching wrapper ---
// Identical reads (same path + query) are answered once per run; mutations
// invalidate every entry tagged with the mutated resource or its dependents.
pub struct CachedApi {
  inner: Box<dyn StockApi>,
  entries: RefCell<HashMap<String, Entry>>,
}

impl CachedApi {
  pub fn new(inner: Box<dyn StockApi>) -> Self {
    Self {
      inner,
      entries: RefCell::new(HashMap::new()),
    }
  }

  #[inline]
  fn key(path: &str, query: &str) -> String {
    with_query(path, query)
  }

  /// Resource tag of a path such as `stockmanagement/stockitem/abc?ids=x`.
  pub fn tag_for_path(path: &str) -> String {
    let bare = path.split('?').next().unwrap_or("");
    let mut segments = bare.split('/').filter(|s| !s.is_empty());

    match segments.next() {
      Some("stockmanagement") => segments.next().unwrap_or("stockmanagement").to_string(),
      Some(first) => first.to_string(),
      None => String::new(),
    }
  }

  /// Tags invalidated by a mutation of `tag`.
  fn invalidation_set(tag: &str) -> Vec<String> {
    let mut out = vec![tag.to_string()];

    if let Some(resource) = resource_by_name(tag) {
      out.extend(resource.dependents().iter().map(|r| r.name().to_string()));
    }

    out
  }

  fn invalidate_tags<S: AsRef<str>>(&self, tags: &[S]) {
    let mut entries = self.entries.borrow_mut();
    let before = entries.len();

    entries.retain(|_, e| !tags.iter().any(|t| e.tags.contains(t.as_ref())));

    let dropped = before - entries.len();
    if dropped > 0 {
      tracing::trace!(dropped, "cache entries invalidated");
    }
  }

  #[cfg(test)]
  fn len(&self) -> usize {
    self.entries.borrow().len()
  }
}

fn resource_by_name(name: &str) -> Option<Resource> {
  use clap::ValueEnum;
  Resource::value_variants().iter().copied().find(|r| r.name() == name)
}

impl StockApi for CachedApi {
  fn get_json(&self, path: &str, query: &str) -> Result<serde_json::Value, ApiError> {
    let key = Self::key(path, query);

    if let Some(e) = self.entries.borrow().get(&key) {
      return Ok(e.value.clone());
    }

    let value = self.inner.get_json(path, query)?;
    let tags = BTreeSet::from([Self::tag_for_path(path)]);

    self.entries.borrow_mut().insert(
      key,
      Entry {
        value: value.clone(),
        tags,
      },
    );

    Ok(value)
  }

  fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
    let out = self.inner.post_json(path, body);
    self.invalidate_tags(Self::invalidation_set(&Self::tag_for_path(path)).as_slice());
    out
  }

  fn delete(&self, path: &str) -> Result<(), ApiError> {
    let out = self.inner.delete(path);
    self.invalidate_tags(Self::invalidation_set(&Self::tag_for_path(path)).as_slice());
    out
  }

  fn invalidate(&self, tags: &[&str]) {
    self.invalidate_tags(tags);
  }
}
