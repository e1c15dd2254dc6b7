// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Encode report parameters into the line-oriented `param.<name>.<property>=<value>` text and decode it back
// role: codec/batch-job-parameters
// inputs: Raw parameter text stored on a batch job; typed parameter entries from the report builder
// outputs: ParameterMap (name -> property -> value) for display; encoded text for new jobs
// invariants:
// - decode never fails; malformed, comment and ignored lines are dropped
// - `.value.desc` (legacy) decodes to the `display` property
// - encode emits exactly three lines per parameter; values are written verbatim (no escaping)
// errors: None; decode returns None when nothing parsable was found
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Parameter name -> property name -> raw value.
pub type ParameterMap = BTreeMap<String, BTreeMap<String, String>>;

/// Line prefix of the marker naming the report a job was created for.
pub const REPORT_MARKER: &str = "param.report";

/// Line terminator used when the client authors parameter text.
pub const CRLF: &str = "\r\n";

const PARAM_PREFIX: &str = "param.";
const LEGACY_DISPLAY_SUFFIX: &str = ".value.desc";
const DEFAULT_PROPERTY: &str = "value";

/// Decode parameter text into a nested map.
///
/// Lines are split on CRLF or LF. Lines starting with `#` or with any of
/// `ignored_prefixes` are skipped, as are lines without an `=`.
/// Returns `None` when `text` is absent/empty or no line survived.
pub fn decode(text: Option<&str>, ignored_prefixes: &[&str]) -> Option<ParameterMap> {
  let text = text.filter(|t| !t.is_empty())?;
  let mut out = ParameterMap::new();

  for raw in text.split('\n') {
    let line = raw.strip_suffix('\r').unwrap_or(raw);

    if line.starts_with('#') || ignored_prefixes.iter().any(|p| line.starts_with(p)) {
      continue;
    }

    let Some((key, value)) = line.split_once('=') else {
      continue;
    };

    let (name, property) = split_key(key);
    out.entry(name).or_default().insert(property, value.to_string());
  }

  (!out.is_empty()).then_some(out)
}

/// Resolve a line key into (parameter name, property).
fn split_key(key: &str) -> (String, String) {
  if let Some(rest) = key.strip_prefix(PARAM_PREFIX) {
    let normalized = match rest.strip_suffix(LEGACY_DISPLAY_SUFFIX) {
      Some(stem) => format!("{stem}.display"),
      None => rest.to_string(),
    };

    return match normalized.rsplit_once('.') {
      Some((name, property)) => (name.to_string(), property.to_string()),
      None => (normalized, DEFAULT_PROPERTY.to_string()),
    };
  }

  match key.split_once('.') {
    Some((name, property)) => (name.to_string(), property.to_string()),
    None => (key.to_string(), DEFAULT_PROPERTY.to_string()),
  }
}

/// Encode one parameter as its `.value`, `.value.desc` and `.description` lines.
pub fn encode(name: &str, value: &str, value_description: &str, description: &str, line_terminator: &str) -> String {
  format!(
    "{PARAM_PREFIX}{name}.value={value}{line_terminator}\
     {PARAM_PREFIX}{name}{LEGACY_DISPLAY_SUFFIX}={value_description}{line_terminator}\
     {PARAM_PREFIX}{name}.description={description}{line_terminator}"
  )
}

/// Typed view of one decoded parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterEntry {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub value: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub display: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  /// Properties outside the value/display/description convention.
  #[serde(flatten)]
  pub extra: BTreeMap<String, String>,
}

impl ParameterEntry {
  pub fn new(value: impl Into<String>, display: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      value: Some(value.into()),
      display: Some(display.into()),
      description: Some(description.into()),
      extra: BTreeMap::new(),
    }
  }

  /// Build from one inner mapping of a decoded ParameterMap.
  ///
  /// A bare `desc` property (written by system fields) stands in for `display`.
  pub fn from_properties(props: &BTreeMap<String, String>) -> Self {
    let mut extra = props.clone();
    let value = extra.remove("value");
    let display = extra.remove("display").or_else(|| extra.remove("desc"));
    let description = extra.remove("description");

    Self {
      value,
      display,
      description,
      extra,
    }
  }

  /// Text shown to a person: display label when present, raw value otherwise.
  pub fn label(&self) -> &str {
    self.display.as_deref().or(self.value.as_deref()).unwrap_or("")
  }
}

/// Convert a decoded map into typed entries keyed by parameter name.
pub fn entries(map: &ParameterMap) -> BTreeMap<String, ParameterEntry> {
  map
    .iter()
    .map(|(name, props)| (name.clone(), ParameterEntry::from_properties(props)))
    .collect()
}

/// An encodable parameter set for one report job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportParameters {
  report: String,
  items: Vec<(String, ParameterEntry)>,
}

impl ReportParameters {
  pub fn new(report_system_name: impl Into<String>) -> Self {
    Self {
      report: report_system_name.into(),
      items: Vec::new(),
    }
  }

  /// Rebuild an encodable set from previously stored text.
  ///
  /// The `report` marker names the report; every other parameter is carried over.
  pub fn from_map(map: &ParameterMap) -> Option<Self> {
    let report = map.get("report").and_then(|p| p.get(DEFAULT_PROPERTY))?.clone();
    let mut out = Self::new(report);

    for (name, entry) in entries(map) {
      if name != "report" {
        out.push(name, entry);
      }
    }

    Some(out)
  }

  pub fn report(&self) -> &str {
    &self.report
  }

  /// Add or replace a parameter, keeping first-insertion order.
  pub fn push(&mut self, name: impl Into<String>, entry: ParameterEntry) {
    let name = name.into();

    match self.items.iter_mut().find(|(n, _)| *n == name) {
      Some(slot) => slot.1 = entry,
      None => self.items.push((name, entry)),
    }
  }

  pub fn get(&self, name: &str) -> Option<&ParameterEntry> {
    self.items.iter().find(|(n, _)| n == name).map(|(_, e)| e)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterEntry)> {
    self.items.iter().map(|(n, e)| (n.as_str(), e))
  }

  /// Produce the full job text: the report marker followed by every parameter.
  pub fn encode(&self, line_terminator: &str) -> String {
    let mut out = format!("{REPORT_MARKER}={}{line_terminator}", self.report);

    for (name, entry) in &self.items {
      out.push_str(&encode(
        name,
        entry.value.as_deref().unwrap_or(""),
        entry.display.as_deref().unwrap_or(""),
        entry.description.as_deref().unwrap_or(""),
        line_terminator,
      ));
    }

    out
  }
}
