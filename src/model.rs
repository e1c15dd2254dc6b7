// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed payloads for the stock-management REST resources and the resource path catalog
// role: model/types
// outputs: Serde structs (camelCase on the wire), BatchJobStatus, PageResult, Resource
// invariants: Unknown fields ignored; absent optional fields deserialize to None; unknown statuses never fail
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

/// REST resources reachable under the versioned base path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Resource {
  StockItem,
  StockItemTransaction,
  StockItemInventory,
  StockBatch,
  StockItemPackagingUom,
  StockRule,
  StockItemReference,
  StockOperation,
  BatchJob,
  Report,
  Party,
  Location,
  Concept,
  Drug,
  User,
  Role,
  Patient,
}

impl Resource {
  pub fn name(self) -> &'static str {
    match self {
      Resource::StockItem => "stockitem",
      Resource::StockItemTransaction => "stockitemtransaction",
      Resource::StockItemInventory => "stockiteminventory",
      Resource::StockBatch => "stockbatch",
      Resource::StockItemPackagingUom => "stockitempackaginguom",
      Resource::StockRule => "stockrule",
      Resource::StockItemReference => "stockitemreference",
      Resource::StockOperation => "stockoperation",
      Resource::BatchJob => "batchjob",
      Resource::Report => "report",
      Resource::Party => "party",
      Resource::Location => "location",
      Resource::Concept => "concept",
      Resource::Drug => "drug",
      Resource::User => "user",
      Resource::Role => "role",
      Resource::Patient => "patient",
    }
  }

  /// Resources owned by the stock-management module live under its namespace.
  pub fn is_module_owned(self) -> bool {
    !matches!(
      self,
      Resource::Location | Resource::Concept | Resource::Drug | Resource::User | Resource::Role | Resource::Patient
    )
  }

  /// Path relative to the versioned REST base.
  pub fn path(self) -> String {
    if self.is_module_owned() {
      format!("stockmanagement/{}", self.name())
    } else {
      self.name().to_string()
    }
  }

  /// Cached reads that become stale when this resource is mutated.
  pub fn dependents(self) -> &'static [Resource] {
    match self {
      Resource::StockOperation => &[
        Resource::StockItemInventory,
        Resource::StockItemTransaction,
        Resource::StockBatch,
      ],
      Resource::StockItemPackagingUom | Resource::StockItemReference | Resource::StockRule => &[Resource::StockItem],
      Resource::StockItem => &[Resource::StockItemInventory],
      _ => &[],
    }
  }
}

/// `{ results, totalCount }` envelope of list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
  #[serde(default = "Vec::new")]
  pub results: Vec<T>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchJobStatus {
  Pending,
  Running,
  Completed,
  Failed,
  Cancelled,
  Expired,
  #[serde(other)]
  #[default]
  Unknown,
}

impl BatchJobStatus {
  /// Jobs in these states are still expected to change on the server.
  pub fn is_active(self) -> bool {
    matches!(self, BatchJobStatus::Pending | BatchJobStatus::Running)
  }
}

/// Missing or null statuses read as `Unknown`.
fn status_or_unknown<'de, D>(deserializer: D) -> Result<BatchJobStatus, D::Error>
where
  D: serde::Deserializer<'de>,
{
  Ok(Option::<BatchJobStatus>::deserialize(deserializer)?.unwrap_or_default())
}

impl std::str::FromStr for BatchJobStatus {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s.to_ascii_lowercase().as_str() {
      "pending" => BatchJobStatus::Pending,
      "running" => BatchJobStatus::Running,
      "completed" => BatchJobStatus::Completed,
      "failed" => BatchJobStatus::Failed,
      "cancelled" => BatchJobStatus::Cancelled,
      "expired" => BatchJobStatus::Expired,
      _ => BatchJobStatus::Unknown,
    })
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJob {
  pub uuid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub batch_job_type: Option<String>,
  #[serde(default, deserialize_with = "status_or_unknown")]
  pub status: BatchJobStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parameters: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub execution_state: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date_created: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub started_date: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ended_date: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exit_message: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output_artifact_size: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output_artifact_file_ext: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output_artifact_view_able: Option<bool>,
}

/// Body posted to create a batch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBatchJob {
  pub batch_job_type: String,
  pub description: String,
  pub parameters: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
  pub name: String,
  pub system_name: String,
  #[serde(default)]
  pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub uuid: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub drug_uuid: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub drug_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub concept_uuid: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub concept_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub common_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub acronym: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub has_expiration: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_drug: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category_uuid: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dispensing_unit_uuid: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reorder_level: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub voided: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItemTransaction {
  pub uuid: String,
  #[serde(default)]
  pub stock_item_uuid: Option<String>,
  #[serde(default)]
  pub party_uuid: Option<String>,
  #[serde(default)]
  pub stock_operation_uuid: Option<String>,
  #[serde(default)]
  pub stock_batch_uuid: Option<String>,
  #[serde(default)]
  pub quantity: Option<f64>,
  #[serde(default)]
  pub date_created: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItemInventory {
  #[serde(default)]
  pub stock_item_uuid: Option<String>,
  #[serde(default)]
  pub party_uuid: Option<String>,
  #[serde(default)]
  pub stock_batch_uuid: Option<String>,
  #[serde(default)]
  pub quantity: f64,
  #[serde(default)]
  pub quantity_uo_m: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockBatch {
  pub uuid: String,
  #[serde(default)]
  pub batch_no: Option<String>,
  #[serde(default)]
  pub expiration: Option<String>,
  #[serde(default)]
  pub stock_item_uuid: Option<String>,
  #[serde(default)]
  pub voided: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItemPackagingUom {
  #[serde(default)]
  pub uuid: Option<String>,
  pub stock_item_uuid: String,
  pub packaging_uom_uuid: String,
  pub factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRule {
  #[serde(default)]
  pub uuid: Option<String>,
  pub stock_item_uuid: String,
  pub location_uuid: String,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  pub quantity: f64,
  #[serde(default)]
  pub stock_item_packaging_uom_uuid: Option<String>,
  #[serde(default)]
  pub enabled: bool,
  #[serde(default)]
  pub evaluation_frequency: Option<u32>,
  #[serde(default)]
  pub action_frequency: Option<u32>,
  #[serde(default)]
  pub alert_role: Option<String>,
  #[serde(default)]
  pub mail_role: Option<String>,
  #[serde(default)]
  pub enable_descendants: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItemReference {
  #[serde(default)]
  pub uuid: Option<String>,
  pub stock_item_uuid: String,
  pub stock_source_uuid: String,
  pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
  pub uuid: String,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub location_uuid: Option<String>,
  #[serde(default)]
  pub stock_source_uuid: Option<String>,
}

/// Shape shared by the platform resources the client only reads
/// (location, concept, drug, user, role, patient).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
  pub uuid: String,
  #[serde(default)]
  pub display: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
}

pub type Location = Reference;
pub type Concept = Reference;
pub type Drug = Reference;
pub type User = Reference;
pub type Role = Reference;
pub type Patient = Reference;
