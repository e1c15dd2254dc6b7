// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Execute CLI commands against the explicitly constructed client and print JSON results
// role: orchestration/commands
// inputs: EffectiveConfig, parsed Command, stdin/file text for params commands
// outputs: JSON (or encoded parameter text) on stdout; notifications via tracing on stderr
// side_effects: Network calls through StockApi; reads stdin/files
// invariants:
// - One client per run, built from config and passed down (no globals)
// - Mutation failures surface the server message and a non-zero exit; nothing is retried
// errors: anyhow with context naming the failed operation
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::api::{self, StockClient};
use crate::cli::{
  Command, EffectiveConfig, ItemsCommand, JobsCommand, ListScope, ParamsCommand, ReportArgs, ReportCommand, status_filter,
};
use crate::model::*;
use crate::params::{self, CRLF, ParameterEntry, REPORT_MARKER, ReportParameters};
use crate::poller::{JobPoller, ThreadSleeper, has_active_jobs};
use crate::query::{
  BatchJobFilter, InventoryFilter, Paging, SearchFilter, StockBatchFilter, StockItemFilter, StockOperationFilter,
  StockRuleFilter,
};
use crate::reports::{self, REPORT_JOB_TYPE, ReportParameter, ReportRequest};

const DEFAULT_PAGE_SIZE: u64 = 50;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
  match file {
    Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display())),
    None => {
      let mut buf = String::new();
      std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
      Ok(buf)
    }
  }
}

fn report_jobs_filter(status: Option<String>) -> BatchJobFilter {
  BatchJobFilter {
    paging: Paging {
      v: Some("default".into()),
      ..Default::default()
    },
    batch_job_type: Some(REPORT_JOB_TYPE.to_string()),
    status,
    ..Default::default()
  }
}

pub fn run(cfg: &EffectiveConfig, command: Command) -> Result<()> {
  // Built on demand so params commands never touch the network
  let client = || StockClient::new(api::build_api(&cfg.client), cfg.client.rest_base.clone());

  match command {
    Command::Params(cmd) => run_params(cmd),
    Command::Report(cmd) => run_report(&client(), cmd),
    Command::Jobs(cmd) => run_jobs(cfg, &client(), cmd),
    Command::Items(cmd) => run_items(&client(), cmd),
    Command::List {
      resource,
      search,
      all,
      page_size,
      scope,
    } => print_json(&list_resource(&client(), resource, search, all, page_size, scope)?),
    Command::Delete { resource, ids } => {
      let path = client()
        .delete(resource, &ids)
        .with_context(|| format!("deleting {} {}", resource.name(), ids.join(",")))?;
      tracing::info!(%path, "deleted");
      print_json(&serde_json::json!({ "deleted": path }))
    }
  }
}

fn run_params(cmd: ParamsCommand) -> Result<()> {
  match cmd {
    ParamsCommand::Decode {
      file,
      ignore,
      hide_report,
    } => {
      let text = read_input(file.as_deref())?;
      let mut prefixes: Vec<&str> = ignore.iter().map(String::as_str).collect();

      if hide_report {
        prefixes.push(REPORT_MARKER);
      }

      print_json(&params::decode(Some(&text), &prefixes))
    }
    ParamsCommand::Encode { report, file } => {
      let raw = read_input(file.as_deref())?;
      let obj: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&raw).context("parameters must be a JSON object")?;

      let mut set = ReportParameters::new(report);

      for (name, v) in obj {
        let entry: ParameterEntry =
          serde_json::from_value(v).with_context(|| format!("parameter {} is not a value/display/description object", name))?;
        set.push(name, entry);
      }

      print!("{}", set.encode(CRLF));
      Ok(())
    }
  }
}

/// Split `uuid=Display Name`; the display falls back to the uuid.
fn value_and_display(raw: &str) -> (String, String) {
  match raw.split_once('=') {
    Some((v, d)) if !d.trim().is_empty() => (v.trim().to_string(), d.trim().to_string()),
    Some((v, _)) => (v.trim().to_string(), v.trim().to_string()),
    None => (raw.trim().to_string(), raw.trim().to_string()),
  }
}

pub fn build_report_request(args: &ReportArgs) -> ReportRequest {
  let mut req = ReportRequest::new(args.kind);

  let references = [
    (ReportParameter::Location, &args.location),
    (ReportParameter::StockItem, &args.stock_item),
    (ReportParameter::StockItemCategory, &args.stock_item_category),
    (ReportParameter::StockSource, &args.stock_source),
    (ReportParameter::StockSourceDestination, &args.stock_source_destination),
    (ReportParameter::Patient, &args.patient),
    (ReportParameter::InventoryGroupBy, &args.inventory_group_by),
    (ReportParameter::MostLeastMoving, &args.most_least_moving),
    (ReportParameter::Fullfillment, &args.fullfillment),
  ];

  for (param, raw) in references {
    if let Some(raw) = raw {
      let (value, display) = value_and_display(raw);
      req.set(param, value, display);
    }
  }

  if args.location.is_some() {
    req.set_flag(ReportParameter::ChildLocations, args.child_locations);
  }

  let dates = [
    (ReportParameter::Date, args.date),
    (ReportParameter::StartDate, args.start_date),
    (ReportParameter::EndDate, args.end_date),
  ];

  for (param, date) in dates {
    if let Some(d) = date {
      req.set_date(param, d);
    }
  }

  if let Some(limit) = args.limit {
    req.set(ReportParameter::Limit, limit.to_string(), limit.to_string());
  }

  if let Some(desc) = &args.description {
    req.describe(desc.clone());
  }

  req
}

fn submit_job(client: &StockClient, payload: &NewBatchJob, dry_run: bool) -> Result<()> {
  if dry_run {
    return print_json(payload);
  }

  let job = client
    .create_batch_job(payload)
    .with_context(|| format!("submitting report job {:?}", payload.description))?;

  tracing::info!(uuid = %job.uuid, "report job submitted");
  print_json(&job)
}

fn run_report(client: &StockClient, cmd: ReportCommand) -> Result<()> {
  match cmd {
    ReportCommand::Kinds => print_json(&client.reports().context("listing reports")?),
    ReportCommand::Create(args) => {
      let payload = build_report_request(&args).build()?;
      submit_job(client, &payload, args.dry_run)
    }
  }
}

#[derive(Serialize)]
struct WatchRound<'a> {
  round: usize,
  active: usize,
  jobs: Vec<(&'a str, BatchJobStatus)>,
}

fn run_jobs(cfg: &EffectiveConfig, client: &StockClient, cmd: JobsCommand) -> Result<()> {
  match cmd {
    JobsCommand::List { status } => {
      let jobs = client
        .batch_jobs(&report_jobs_filter(status_filter(status.as_deref())))
        .context("listing batch jobs")?;
      print_json(&jobs)
    }
    JobsCommand::Watch { max_rounds, .. } => {
      let filter = report_jobs_filter(None);
      let mut poller = JobPoller::new(cfg.poll_interval);
      let token = poller.token();
      let mut round = 0usize;

      let fetches = poller.watch(
        || client.refresh_batch_jobs(&filter),
        &ThreadSleeper,
        |jobs| {
          round += 1;
          let line = WatchRound {
            round,
            active: jobs.iter().filter(|j| j.status.is_active()).count(),
            jobs: jobs.iter().map(|j| (j.uuid.as_str(), j.status)).collect(),
          };
          if let Ok(s) = serde_json::to_string(&line) {
            println!("{}", s);
          }
          if max_rounds.map(|m| round >= m).unwrap_or(false) && has_active_jobs(jobs) {
            tracing::warn!(round, "stopping watch with jobs still active");
            token.cancel();
          }
        },
      );

      let fetches = fetches.context("refreshing batch jobs")?;
      tracing::info!(fetches, "watch finished");
      Ok(())
    }
    JobsCommand::Cancel { ids } => {
      let path = client.cancel_batch_jobs(&ids).context("cancelling batch jobs")?;
      tracing::info!(%path, "batch jobs cancelled");
      print_json(&serde_json::json!({ "cancelled": ids }))
    }
    JobsCommand::Clone { id, dry_run } => {
      let job = client.batch_job(&id).with_context(|| format!("loading batch job {}", id))?;
      let payload = reports::clone_job(&job)?;
      submit_job(client, &payload, dry_run)
    }
    JobsCommand::Params { id } => {
      let job = client.batch_job(&id).with_context(|| format!("loading batch job {}", id))?;
      print_json(&reports::parameter_rows(&job))
    }
    JobsCommand::ArtifactUrl { id, download } => {
      println!("{}", client.artifact_url(&id, download));
      Ok(())
    }
  }
}

fn run_items(client: &StockClient, cmd: ItemsCommand) -> Result<()> {
  match cmd {
    ItemsCommand::List { search, all } => {
      let filter = StockItemFilter {
        paging: Paging {
          v: Some("default".into()),
          ..Default::default()
        },
        q: search,
        ..Default::default()
      };

      let items: Vec<StockItem> = if all {
        client.list_all(Resource::StockItem, &filter, DEFAULT_PAGE_SIZE)?
      } else {
        client.list::<StockItem, _>(Resource::StockItem, &filter)?.results
      };

      if items.is_empty() {
        tracing::info!("no stock items matched");
      }
      print_json(&items)
    }
    ItemsCommand::Get { id } => {
      let item: StockItem = client
        .get(Resource::StockItem, &id)
        .with_context(|| format!("loading stock item {}", id))?;
      print_json(&item)
    }
    ItemsCommand::Check { drug, concept } => {
      let found = client.find_existing_stock_item(drug.as_deref(), concept.as_deref())?;
      print_json(&serde_json::json!({
        "exists": found.is_some(),
        "stockItem": found,
      }))
    }
    ItemsCommand::Create {
      drug,
      concept,
      common_name,
      acronym,
      has_expiration,
      dispensing_unit,
      category,
    } => {
      let item = StockItem {
        is_drug: Some(drug.is_some()),
        drug_uuid: drug,
        concept_uuid: concept,
        common_name,
        acronym,
        has_expiration: Some(has_expiration),
        dispensing_unit_uuid: dispensing_unit,
        category_uuid: category,
        ..Default::default()
      };

      let saved = client.create_stock_item(&item).context("creating stock item")?;
      tracing::info!(uuid = ?saved.uuid, "stock item created");
      print_json(&saved)
    }
  }
}

/// Options the user gave that `resource` has no filter field for.
fn ignored_scope(resource: Resource, search: bool, scope: &ListScope) -> Vec<&'static str> {
  // (search, stock item, location, status, group by)
  let honoured = match resource {
    Resource::StockOperation => (true, false, true, true, false),
    Resource::StockBatch => (false, true, false, false, false),
    Resource::StockRule => (false, true, true, false, false),
    Resource::StockItemInventory => (false, true, true, false, true),
    _ => (true, false, false, false, false),
  };

  let given = [
    (search, honoured.0, "--search"),
    (scope.stock_item.is_some(), honoured.1, "--stock-item"),
    (scope.location.is_some(), honoured.2, "--location"),
    (!scope.statuses.is_empty(), honoured.3, "--status"),
    (scope.group_by.is_some(), honoured.4, "--group-by"),
  ];

  given
    .into_iter()
    .filter(|(set, ok, _)| *set && !*ok)
    .map(|(_, _, flag)| flag)
    .collect()
}

/// List a resource through its typed shape so malformed rows fail loudly.
fn list_resource(
  client: &StockClient,
  resource: Resource,
  search: Option<String>,
  all: bool,
  page_size: u64,
  scope: ListScope,
) -> Result<serde_json::Value> {
  if page_size == 0 {
    bail!("--page-size must be positive");
  }

  let ignored = ignored_scope(resource, search.is_some(), &scope);
  if !ignored.is_empty() {
    tracing::warn!(resource = resource.name(), ?ignored, "options not supported by this resource");
  }

  let paging = Paging {
    v: Some("default".into()),
    limit: (!all).then_some(page_size),
    ..Default::default()
  };

  macro_rules! typed {
    ($t:ty, $filter:expr) => {{
      let filter = $filter;
      let rows: Vec<$t> = if all {
        client.list_all(resource, &filter, page_size)?
      } else {
        client.list::<$t, _>(resource, &filter)?.results
      };
      serde_json::to_value(rows)?
    }};
    ($t:ty) => {
      typed!($t, SearchFilter { paging, q: search })
    };
  }

  let value = match resource {
    Resource::StockItem => typed!(StockItem),
    Resource::StockItemTransaction => typed!(StockItemTransaction),
    Resource::StockItemInventory => typed!(
      StockItemInventory,
      InventoryFilter {
        paging,
        stock_item_uuid: scope.stock_item,
        location_uuids: scope.location,
        group_by: scope.group_by,
        ..Default::default()
      }
    ),
    Resource::StockBatch => typed!(
      StockBatch,
      StockBatchFilter {
        paging,
        stock_item_uuid: scope.stock_item,
        ..Default::default()
      }
    ),
    Resource::StockItemPackagingUom => typed!(StockItemPackagingUom),
    Resource::StockRule => typed!(
      StockRule,
      StockRuleFilter {
        paging,
        stock_item_uuid: scope.stock_item,
        location_uuid: scope.location,
      }
    ),
    Resource::StockItemReference => typed!(StockItemReference),
    Resource::BatchJob => typed!(BatchJob),
    Resource::Report => typed!(Report),
    Resource::Party => typed!(Party),
    Resource::StockOperation => typed!(
      serde_json::Value,
      StockOperationFilter {
        paging,
        q: search,
        location_uuid: scope.location,
        status: (!scope.statuses.is_empty()).then_some(scope.statuses),
        ..Default::default()
      }
    ),
    Resource::Location => typed!(Location),
    Resource::Concept => typed!(Concept),
    Resource::Drug => typed!(Drug),
    Resource::User => typed!(User),
    Resource::Role => typed!(Role),
    Resource::Patient => typed!(Patient),
  };

  Ok(value)
}
