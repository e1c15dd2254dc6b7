use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{ApiError, StockApi, is_error_payload};
use crate::model::{BatchJob, NewBatchJob, PageResult, Report, Resource, StockItem};
use crate::query::{self, BatchJobFilter, Paged, StockItemFilter};

/// Typed operations over a StockApi backend.
pub struct StockClient {
  api: Box<dyn StockApi>,
  rest_base: String,
}

fn decode<T: DeserializeOwned>(path: &str, value: serde_json::Value) -> Result<T, ApiError> {
  serde_json::from_value(value).map_err(|e| ApiError::Decode {
    path: path.to_string(),
    message: e.to_string(),
  })
}

impl StockClient {
  pub fn new(api: Box<dyn StockApi>, rest_base: impl Into<String>) -> Self {
    Self {
      api,
      rest_base: rest_base.into(),
    }
  }

  /// One page of a resource list.
  pub fn list<T, F>(&self, resource: Resource, filter: &F) -> Result<PageResult<T>, ApiError>
  where
    T: DeserializeOwned,
    F: Serialize,
  {
    let path = resource.path();
    let raw = self.api.get_json(&path, &query::to_query_string(filter))?;
    decode(&path, raw)
  }

  /// Walk pages of `page_size` until a short page or the reported total.
  pub fn list_all<T, F>(&self, resource: Resource, filter: &F, page_size: u64) -> Result<Vec<T>, ApiError>
  where
    T: DeserializeOwned,
    F: Paged + Clone,
  {
    if page_size == 0 {
      return Err(ApiError::InvalidRequest("page size must be positive".into()));
    }

    let mut out: Vec<T> = Vec::new();
    let mut filter = filter.clone();
    let mut start = 0u64;

    loop {
      let paging = filter.paging_mut();
      paging.start_index = Some(start);
      paging.limit = Some(page_size);
      paging.total_count = Some(true);

      let page: PageResult<T> = self.list(resource, &filter)?;
      let got = page.results.len() as u64;
      out.extend(page.results);

      tracing::debug!(resource = resource.name(), start, got, "fetched page");

      let reached_total = page.total_count.map(|t| out.len() as u64 >= t).unwrap_or(false);
      if got < page_size || reached_total {
        break;
      }
      start += got;
    }

    Ok(out)
  }

  pub fn get<T: DeserializeOwned>(&self, resource: Resource, id: &str) -> Result<T, ApiError> {
    let path = format!("{}/{}", resource.path(), query::percent_encode(id));
    let raw = self.api.get_json(&path, "v=full")?;
    decode(&path, raw)
  }

  /// Create (no id) or update (with id) a record.
  ///
  /// A 2xx response carrying the `{ error }` shape is still a failure.
  pub fn save<B, T>(&self, resource: Resource, id: Option<&str>, body: &B) -> Result<T, ApiError>
  where
    B: Serialize,
    T: DeserializeOwned,
  {
    let path = match id {
      Some(id) => format!("{}/{}", resource.path(), query::percent_encode(id)),
      None => resource.path(),
    };
    let body = serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let raw = self.api.post_json(&path, &body)?;

    if is_error_payload(&raw) {
      return Err(ApiError::from_response(200, Some(&raw)));
    }

    decode(&path, raw)
  }

  /// Delete one or more records; returns the request path used.
  pub fn delete(&self, resource: Resource, ids: &[String]) -> Result<String, ApiError> {
    let path = query::delete_path(&resource.path(), ids).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    self.api.delete(&path)?;
    Ok(path)
  }

  /// Pre-flight lookup for an existing stock item with the same drug or concept.
  pub fn find_existing_stock_item(
    &self,
    drug_uuid: Option<&str>,
    concept_uuid: Option<&str>,
  ) -> Result<Option<StockItem>, ApiError> {
    let mut filter = StockItemFilter::default();
    filter.paging.v = Some("default".into());
    filter.paging.limit = Some(1);

    match (drug_uuid, concept_uuid) {
      (Some(drug), _) => filter.drug_uuid = Some(drug.to_string()),
      (None, Some(concept)) => filter.concept_uuid = Some(concept.to_string()),
      (None, None) => return Err(ApiError::InvalidRequest("a drug or concept is required".into())),
    }

    let page: PageResult<StockItem> = self.list(Resource::StockItem, &filter)?;
    Ok(page.results.into_iter().next())
  }

  /// Create a stock item unless one already exists for its drug/concept.
  pub fn create_stock_item(&self, item: &StockItem) -> Result<StockItem, ApiError> {
    let existing = self.find_existing_stock_item(item.drug_uuid.as_deref(), item.concept_uuid.as_deref())?;

    if let Some(found) = existing {
      let what = item
        .drug_uuid
        .as_deref()
        .map(|d| format!("drug {}", d))
        .or_else(|| item.concept_uuid.as_deref().map(|c| format!("concept {}", c)))
        .unwrap_or_default();
      tracing::info!(existing = ?found.uuid, "stock item already exists");
      return Err(ApiError::StockItemExists(what));
    }

    self.save(Resource::StockItem, None, item)
  }

  pub fn reports(&self) -> Result<Vec<Report>, ApiError> {
    let page: PageResult<Report> = self.list(Resource::Report, &query::SearchFilter::default())?;
    Ok(page.results)
  }

  pub fn batch_jobs(&self, filter: &BatchJobFilter) -> Result<Vec<BatchJob>, ApiError> {
    let page: PageResult<BatchJob> = self.list(Resource::BatchJob, filter)?;
    Ok(page.results)
  }

  /// Re-read batch jobs, bypassing cached responses.
  pub fn refresh_batch_jobs(&self, filter: &BatchJobFilter) -> Result<Vec<BatchJob>, ApiError> {
    self.api.invalidate(&[Resource::BatchJob.name()]);
    self.batch_jobs(filter)
  }

  pub fn batch_job(&self, id: &str) -> Result<BatchJob, ApiError> {
    self.get(Resource::BatchJob, id)
  }

  pub fn create_batch_job(&self, job: &NewBatchJob) -> Result<BatchJob, ApiError> {
    self.save(Resource::BatchJob, None, job)
  }

  pub fn cancel_batch_jobs(&self, ids: &[String]) -> Result<String, ApiError> {
    self.delete(Resource::BatchJob, ids)
  }

  pub fn artifact_url(&self, job_id: &str, download: bool) -> String {
    query::artifact_url(&self.rest_base, job_id, download)
  }
}
