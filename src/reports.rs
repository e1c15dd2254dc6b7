// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Assemble report parameters for a report kind and turn them into batch-job payloads (new and cloned)
// role: reports/builder
// inputs: Report kind, parameter values chosen by the user, existing batch jobs
// outputs: NewBatchJob payloads with CRLF-encoded parameter text; display rows for stored parameters
// invariants:
// - Every parameter a report kind requires must be set before build()
// - Dates are sent as YYYY-MM-DD and displayed as DD/MM/YYYY
// - Cloning re-derives the text from a rebuilt parameter set; stored text is never edited in place
// errors: anyhow errors naming missing parameters, inverted date ranges, or unusable stored text
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

use crate::model::{BatchJob, NewBatchJob};
use crate::params::{self, CRLF, ParameterEntry, REPORT_MARKER, ReportParameters};

pub const REPORT_JOB_TYPE: &str = "Report";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportParameter {
  Location,
  ChildLocations,
  StockSource,
  StockSourceDestination,
  InventoryGroupBy,
  StockItemCategory,
  StockItem,
  Date,
  StartDate,
  EndDate,
  MostLeastMoving,
  Limit,
  Fullfillment,
  Patient,
}

impl ReportParameter {
  /// Name used in the encoded `param.<name>.*` lines.
  pub fn wire_name(self) -> &'static str {
    match self {
      ReportParameter::Location => "location",
      ReportParameter::ChildLocations => "childLocations",
      ReportParameter::StockSource => "stockSource",
      ReportParameter::StockSourceDestination => "stockSourceDestination",
      ReportParameter::InventoryGroupBy => "inventoryGroupBy",
      ReportParameter::StockItemCategory => "stockItemCategory",
      ReportParameter::StockItem => "stockItem",
      ReportParameter::Date => "date",
      ReportParameter::StartDate => "startDate",
      ReportParameter::EndDate => "endDate",
      ReportParameter::MostLeastMoving => "mostLeastMoving",
      ReportParameter::Limit => "limit",
      ReportParameter::Fullfillment => "fullfillment",
      ReportParameter::Patient => "patient",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      ReportParameter::Location => "Location",
      ReportParameter::ChildLocations => "Include Child Locations",
      ReportParameter::StockSource => "Stock Source",
      ReportParameter::StockSourceDestination => "Stock Source Destination",
      ReportParameter::InventoryGroupBy => "Inventory Group By",
      ReportParameter::StockItemCategory => "Stock Item Category",
      ReportParameter::StockItem => "Stock Item",
      ReportParameter::Date => "Date",
      ReportParameter::StartDate => "Start Date",
      ReportParameter::EndDate => "End Date",
      ReportParameter::MostLeastMoving => "Most or Least Moving",
      ReportParameter::Limit => "Limit",
      ReportParameter::Fullfillment => "Fullfillment",
      ReportParameter::Patient => "Patient",
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
  StockStatus,
  StockExpiry,
  StockReceipt,
  StockCard,
  MostLeastMoving,
  PrescriptionFulfillment,
  DispensingHistory,
}

impl ReportKind {
  pub fn system_name(self) -> &'static str {
    match self {
      ReportKind::StockStatus => "StockStatusReport",
      ReportKind::StockExpiry => "StockExpiryReport",
      ReportKind::StockReceipt => "StockReceiptReport",
      ReportKind::StockCard => "StockCardReport",
      ReportKind::MostLeastMoving => "MostLeastMovingStockReport",
      ReportKind::PrescriptionFulfillment => "PrescriptionFulfillmentReport",
      ReportKind::DispensingHistory => "DispensingHistoryReport",
    }
  }

  pub fn display_name(self) -> &'static str {
    match self {
      ReportKind::StockStatus => "Stock Status Report",
      ReportKind::StockExpiry => "Stock Expiry Report",
      ReportKind::StockReceipt => "Stock Receipt Report",
      ReportKind::StockCard => "Stock Card Report",
      ReportKind::MostLeastMoving => "Most/Least Moving Stock Report",
      ReportKind::PrescriptionFulfillment => "Prescription Fulfillment Report",
      ReportKind::DispensingHistory => "Dispensing History Report",
    }
  }

  pub fn from_system_name(name: &str) -> Option<Self> {
    Self::value_variants().iter().copied().find(|k| k.system_name() == name)
  }

  /// Parameters the backend refuses to run this report without.
  pub fn required(self) -> &'static [ReportParameter] {
    use ReportParameter as P;

    match self {
      ReportKind::StockStatus => &[P::Location, P::Date],
      ReportKind::StockExpiry => &[P::Location, P::StartDate, P::EndDate],
      ReportKind::StockReceipt => &[P::Location, P::StartDate, P::EndDate],
      ReportKind::StockCard => &[P::StockItem, P::Location, P::StartDate, P::EndDate],
      ReportKind::MostLeastMoving => &[P::Location, P::StartDate, P::EndDate, P::MostLeastMoving, P::Limit],
      ReportKind::PrescriptionFulfillment => &[P::Location, P::StartDate, P::EndDate],
      ReportKind::DispensingHistory => &[P::Location, P::StartDate, P::EndDate],
    }
  }
}

pub fn date_value(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

pub fn date_display(date: NaiveDate) -> String {
  date.format("%d/%m/%Y").to_string()
}

/// Parameters chosen for one report, validated and encoded on build().
#[derive(Debug, Clone)]
pub struct ReportRequest {
  kind: ReportKind,
  params: ReportParameters,
  description: Option<String>,
}

impl ReportRequest {
  pub fn new(kind: ReportKind) -> Self {
    Self {
      kind,
      params: ReportParameters::new(kind.system_name()),
      description: None,
    }
  }

  pub fn describe(&mut self, text: impl Into<String>) -> &mut Self {
    self.description = Some(text.into());
    self
  }

  pub fn set(&mut self, param: ReportParameter, value: impl Into<String>, display: impl Into<String>) -> &mut Self {
    self
      .params
      .push(param.wire_name(), ParameterEntry::new(value, display, param.description()));
    self
  }

  pub fn set_date(&mut self, param: ReportParameter, date: NaiveDate) -> &mut Self {
    self.set(param, date_value(date), date_display(date))
  }

  pub fn set_flag(&mut self, param: ReportParameter, on: bool) -> &mut Self {
    let (value, display) = if on { ("true", "Yes") } else { ("false", "No") };
    self.set(param, value, display)
  }

  fn missing(&self) -> Vec<&'static str> {
    self
      .kind
      .required()
      .iter()
      .filter(|p| {
        self
          .params
          .get(p.wire_name())
          .and_then(|e| e.value.as_deref())
          .map(|v| v.trim().is_empty())
          .unwrap_or(true)
      })
      .map(|p| p.wire_name())
      .collect()
  }

  fn date_of(&self, param: ReportParameter) -> Option<NaiveDate> {
    let v = self.params.get(param.wire_name())?.value.as_deref()?;
    NaiveDate::parse_from_str(v, "%Y-%m-%d").ok()
  }

  /// Validate and produce the batch-job payload.
  pub fn build(&self) -> Result<NewBatchJob> {
    let missing = self.missing();

    if !missing.is_empty() {
      bail!("{} requires: {}", self.kind.display_name(), missing.join(", "));
    }

    if let (Some(start), Some(end)) = (self.date_of(ReportParameter::StartDate), self.date_of(ReportParameter::EndDate)) {
      if start > end {
        bail!("start date {} is after end date {}", date_value(start), date_value(end));
      }
    }

    Ok(NewBatchJob {
      batch_job_type: REPORT_JOB_TYPE.to_string(),
      description: self
        .description
        .clone()
        .unwrap_or_else(|| self.kind.display_name().to_string()),
      parameters: self.params.encode(CRLF),
    })
  }
}

/// Build a fresh job payload from an existing job's stored parameters.
pub fn clone_job(job: &BatchJob) -> Result<NewBatchJob> {
  let Some(map) = params::decode(job.parameters.as_deref(), &[]) else {
    bail!("batch job {} has no parameters to clone", job.uuid);
  };
  let Some(set) = ReportParameters::from_map(&map) else {
    bail!("batch job {} does not name its report", job.uuid);
  };

  let kind = ReportKind::from_system_name(set.report());
  let mut request = match kind {
    Some(k) => ReportRequest::new(k),
    None => {
      tracing::warn!(report = set.report(), "cloning a report kind this client does not know");
      return Ok(NewBatchJob {
        batch_job_type: job.batch_job_type.clone().unwrap_or_else(|| REPORT_JOB_TYPE.to_string()),
        description: job.description.clone().unwrap_or_default(),
        parameters: set.encode(CRLF),
      });
    }
  };

  for (name, entry) in set.iter() {
    request.params.push(name, entry.clone());
  }
  if let Some(d) = &job.description {
    request.describe(d.clone());
  }

  request.build()
}

/// One human-readable row of a job's stored parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterRow {
  pub name: String,
  pub label: String,
  pub value: String,
}

/// Rows for display; the internal report marker is hidden.
pub fn parameter_rows(job: &BatchJob) -> Vec<ParameterRow> {
  let Some(map) = params::decode(job.parameters.as_deref(), &[REPORT_MARKER]) else {
    return Vec::new();
  };

  params::entries(&map)
    .into_iter()
    .map(|(name, entry)| ParameterRow {
      label: entry.description.clone().unwrap_or_else(|| name.clone()),
      value: entry.label().to_string(),
      name,
    })
    .collect()
}
