// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Serialize typed list filters to query strings and build request paths (multi-id delete, artifact URL)
// role: request/paths
// inputs: Serializable filter structs; resource paths; ids
// outputs: `key=value&...` query strings; delete paths; artifact URLs
// invariants:
// - One pair per non-null scalar field, in declaration order; arrays are comma-joined
// - Values are percent-encoded outside the RFC 3986 unreserved set
// - delete_path puts the first id in the path and the remainder in `?ids=`
// errors: delete_path rejects an empty id list
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Result, bail};
use serde::Serialize;

/// Percent-encode everything outside the unreserved set (`A-Z a-z 0-9 - . _ ~`).
pub fn percent_encode(input: &str) -> String {
  let mut out = String::with_capacity(input.len());

  for &b in input.as_bytes() {
    if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
      out.push(b as char);
    } else {
      out.push('%');
      out.push(hex_upper(b >> 4));
      out.push(hex_upper(b & 0x0f));
    }
  }

  out
}

fn hex_upper(nibble: u8) -> char {
  char::from_digit(u32::from(nibble), 16)
    .map(|c| c.to_ascii_uppercase())
    .unwrap_or('0')
}

fn scalar_text(v: &serde_json::Value) -> Option<String> {
  match v {
    serde_json::Value::Null => None,
    serde_json::Value::String(s) => Some(s.clone()),
    serde_json::Value::Bool(b) => Some(b.to_string()),
    serde_json::Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Render a filter as `k1=v1&k2=v2`, skipping null fields.
///
/// Nested objects are not representable as flat query pairs and are skipped.
pub fn to_query_string<F: Serialize>(filter: &F) -> String {
  let value = match serde_json::to_value(filter) {
    Ok(v) => v,
    Err(_) => return String::new(),
  };
  let Some(obj) = value.as_object() else {
    return String::new();
  };

  let mut pairs: Vec<String> = Vec::with_capacity(obj.len());

  for (key, v) in obj {
    let rendered = match v {
      serde_json::Value::Array(items) => {
        let parts: Vec<String> = items.iter().filter_map(scalar_text).map(|s| percent_encode(&s)).collect();
        if parts.is_empty() {
          continue;
        }
        parts.join(",")
      }
      other => match scalar_text(other) {
        Some(s) => percent_encode(&s),
        None => continue,
      },
    };

    pairs.push(format!("{}={}", percent_encode(key), rendered));
  }

  pairs.join("&")
}

/// Join a path and an optional query string.
pub fn with_query(path: &str, query: &str) -> String {
  if query.is_empty() {
    path.to_string()
  } else {
    format!("{}?{}", path, query)
  }
}

/// Build the path deleting one or more records of a resource.
pub fn delete_path(resource_path: &str, ids: &[String]) -> Result<String> {
  let Some((first, rest)) = ids.split_first() else {
    bail!("at least one id is required to delete from {}", resource_path);
  };

  let base = format!("{}/{}", resource_path.trim_end_matches('/'), percent_encode(first));

  if rest.is_empty() {
    return Ok(base);
  }

  let joined: Vec<String> = rest.iter().map(|id| percent_encode(id)).collect();

  Ok(format!("{}?ids={}", base, joined.join(",")))
}

/// URL of a batch job's output artifact.
///
/// `download = false` asks for an inline-viewable response, `true` for an attachment.
pub fn artifact_url(rest_base: &str, job_id: &str, download: bool) -> String {
  format!(
    "{}/stockmanagement/batchjobartifact?id={}&download={}",
    rest_base.trim_end_matches('/'),
    percent_encode(job_id),
    download
  )
}

/// Paging and representation fields shared by list filters.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub v: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_index: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub limit: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total_count: Option<bool>,
}

/// Filters that expose their paging window so a client can walk pages.
pub trait Paged: Serialize {
  fn paging_mut(&mut self) -> &mut Paging;
}

macro_rules! paged_filter {
  ($(#[$meta:meta])* $name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct $name {
      #[serde(flatten)]
      pub paging: Paging,
      $(
        #[serde(skip_serializing_if = "Option::is_none")]
        pub $field: Option<$ty>,
      )*
    }

    impl Paged for $name {
      fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
      }
    }
  };
}

paged_filter!(
  /// Filter for `stockitem` lists and the existence pre-flight check.
  StockItemFilter {
    q: String,
    drug_uuid: String,
    concept_uuid: String,
    is_drug: bool,
    include_voided: bool,
  }
);

paged_filter!(BatchJobFilter {
  batch_job_type: String,
  status: String,
  date_created_min: String,
  date_created_max: String,
});

paged_filter!(StockOperationFilter {
  q: String,
  location_uuid: String,
  operation_type_uuid: String,
  status: Vec<String>,
});

paged_filter!(StockBatchFilter {
  stock_item_uuid: String,
  exclude_expired: bool,
  include_voided: bool,
});

paged_filter!(StockRuleFilter {
  stock_item_uuid: String,
  location_uuid: String,
});

paged_filter!(InventoryFilter {
  stock_item_uuid: String,
  location_uuids: String,
  group_by: String,
  include_batch_no: bool,
});

/// Free-text filter used for platform lookups (location, concept, drug, ...).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
  #[serde(flatten)]
  pub paging: Paging,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub q: Option<String>,
}

impl Paged for SearchFilter {
  fn paging_mut(&mut self) -> &mut Paging {
    &mut self.paging
  }
}
