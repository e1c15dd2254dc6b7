use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::api::{ClientConfig, Credentials};
use crate::model::{BatchJobStatus, Resource};
use crate::poller::DEFAULT_POLL_INTERVAL;
use crate::reports::ReportKind;

#[derive(Parser, Debug)]
#[command(
    name = "stock-admin",
    version,
    about = "Administer stock items, stock rules and report jobs on a stock-management REST backend",
    long_about = None
)]
pub struct Cli {
  /// Versioned REST base URL, e.g. http://localhost/openmrs/ws/rest/v1
  #[arg(long, env = "STOCK_ADMIN_BASE_URL", default_value = "http://localhost:8080/openmrs/ws/rest/v1", global = true)]
  pub base_url: String,

  /// Username for basic authentication
  #[arg(long, env = "STOCK_ADMIN_USERNAME", global = true)]
  pub username: Option<String>,

  /// Password for basic authentication
  #[arg(long, env = "STOCK_ADMIN_PASSWORD", hide_env_values = true, global = true)]
  pub password: Option<String>,

  /// HTTP timeout in seconds
  #[arg(long, env = "STOCK_ADMIN_TIMEOUT_SECS", default_value_t = 30, global = true)]
  pub timeout_secs: u64,

  /// Log filter (e.g. info, debug, stock_admin=trace); RUST_LOG wins when set
  #[arg(long, env = "STOCK_ADMIN_LOG", default_value = "warn", global = true)]
  pub log_level: String,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Encode or decode batch-job parameter text
  #[command(subcommand)]
  Params(ParamsCommand),

  /// Build and submit report jobs
  #[command(subcommand)]
  Report(ReportCommand),

  /// Inspect, watch, cancel and clone batch jobs
  #[command(subcommand)]
  Jobs(JobsCommand),

  /// Stock item lookups and the duplicate pre-flight check
  #[command(subcommand)]
  Items(ItemsCommand),

  /// List any resource, validated against its typed shape
  List {
    #[arg(value_enum)]
    resource: Resource,
    /// Free-text search
    #[arg(long)]
    search: Option<String>,
    /// Fetch every page instead of the first
    #[arg(long)]
    all: bool,
    /// Page size
    #[arg(long, default_value_t = 50)]
    page_size: u64,
    #[command(flatten)]
    scope: ListScope,
  },

  /// Delete one or more records of a resource
  Delete {
    #[arg(value_enum)]
    resource: Resource,
    #[arg(required = true)]
    ids: Vec<String>,
  },
}

/// Narrowing options honoured by resources that support them.
#[derive(Args, Debug, Clone, Default)]
pub struct ListScope {
  /// Stock item uuid (stockbatch, stockrule, stockiteminventory)
  #[arg(long)]
  pub stock_item: Option<String>,
  /// Location uuid (stockoperation, stockrule, stockiteminventory)
  #[arg(long)]
  pub location: Option<String>,
  /// Operation status; repeat for several (stockoperation)
  #[arg(long = "status")]
  pub statuses: Vec<String>,
  /// Inventory grouping (stockiteminventory)
  #[arg(long)]
  pub group_by: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ParamsCommand {
  /// Decode parameter text (file or stdin) into JSON
  Decode {
    /// Read from this file instead of stdin
    #[arg(long)]
    file: Option<PathBuf>,
    /// Additional line prefixes to skip
    #[arg(long = "ignore")]
    ignore: Vec<String>,
    /// Skip the internal `param.report` marker line
    #[arg(long)]
    hide_report: bool,
  },
  /// Encode a JSON object {name: {value, display, description}} as job text
  Encode {
    /// Report system name written in the `param.report` line
    #[arg(long)]
    report: String,
    /// Read JSON from this file instead of stdin
    #[arg(long)]
    file: Option<PathBuf>,
  },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
  /// List report kinds offered by the server
  Kinds,
  /// Build a report job and submit it
  Create(ReportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
  #[arg(long, value_enum)]
  pub kind: ReportKind,
  /// Free-text job description (defaults to the report name)
  #[arg(long)]
  pub description: Option<String>,
  /// Location uuid, optionally `uuid=Display Name`
  #[arg(long)]
  pub location: Option<String>,
  #[arg(long)]
  pub child_locations: bool,
  /// Stock item uuid, optionally `uuid=Display Name`
  #[arg(long)]
  pub stock_item: Option<String>,
  /// Stock item category concept uuid, optionally `uuid=Display Name`
  #[arg(long)]
  pub stock_item_category: Option<String>,
  /// Stock source uuid, optionally `uuid=Display Name`
  #[arg(long)]
  pub stock_source: Option<String>,
  /// Stock source destination uuid, optionally `uuid=Display Name`
  #[arg(long)]
  pub stock_source_destination: Option<String>,
  /// Inventory grouping (e.g. LocationStockItemBatchNo)
  #[arg(long)]
  pub inventory_group_by: Option<String>,
  /// Patient uuid, optionally `uuid=Display Name`
  #[arg(long)]
  pub patient: Option<String>,
  /// As-of date (YYYY-MM-DD)
  #[arg(long)]
  pub date: Option<NaiveDate>,
  #[arg(long)]
  pub start_date: Option<NaiveDate>,
  #[arg(long)]
  pub end_date: Option<NaiveDate>,
  /// MostMoving or LeastMoving
  #[arg(long)]
  pub most_least_moving: Option<String>,
  #[arg(long)]
  pub limit: Option<u32>,
  /// Fulfillment filter (e.g. All, Fully, Partially, None)
  #[arg(long)]
  pub fullfillment: Option<String>,
  /// Print the payload without submitting it
  #[arg(long)]
  pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum JobsCommand {
  /// List report jobs
  List {
    #[arg(long)]
    status: Option<String>,
  },
  /// Re-list jobs until none is Pending or Running
  Watch {
    /// Delay between refetches in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Stop after this many fetches even if jobs are still active
    #[arg(long)]
    max_rounds: Option<usize>,
  },
  /// Cancel jobs
  Cancel {
    #[arg(required = true)]
    ids: Vec<String>,
  },
  /// Submit a copy of a job with freshly encoded parameters
  Clone {
    id: String,
    #[arg(long)]
    dry_run: bool,
  },
  /// Show a job's parameters as label/value rows
  Params { id: String },
  /// Print the artifact URL of a job
  ArtifactUrl {
    id: String,
    /// Attachment disposition instead of inline viewing
    #[arg(long)]
    download: bool,
  },
}

#[derive(Subcommand, Debug)]
pub enum ItemsCommand {
  /// Search stock items
  List {
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    all: bool,
  },
  /// Show one stock item
  Get { id: String },
  /// Check whether a stock item already exists for a drug or concept
  Check {
    #[arg(long, conflicts_with = "concept", required_unless_present = "concept")]
    drug: Option<String>,
    #[arg(long)]
    concept: Option<String>,
  },
  /// Create a stock item; refused when one exists for the same drug or concept
  Create {
    #[arg(long, conflicts_with = "concept", required_unless_present = "concept")]
    drug: Option<String>,
    #[arg(long)]
    concept: Option<String>,
    #[arg(long)]
    common_name: Option<String>,
    #[arg(long)]
    acronym: Option<String>,
    /// Batches of this item carry expiry dates
    #[arg(long)]
    has_expiration: bool,
    /// Dispensing unit concept uuid
    #[arg(long)]
    dispensing_unit: Option<String>,
    /// Category concept uuid
    #[arg(long)]
    category: Option<String>,
  },
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub client: ClientConfig,
  pub log_level: String,
  pub poll_interval: Duration,
}

pub fn normalize(cli: &Cli) -> Result<EffectiveConfig> {
  let base = cli.base_url.trim();

  if !(base.starts_with("http://") || base.starts_with("https://")) {
    bail!("--base-url must be an http(s) URL, got {:?}", cli.base_url);
  }

  let credentials = match (&cli.username, &cli.password) {
    (Some(u), Some(p)) => Some(Credentials {
      username: u.clone(),
      password: p.clone(),
    }),
    (None, None) => None,
    _ => bail!("--username and --password must be given together"),
  };

  if cli.timeout_secs == 0 {
    bail!("--timeout-secs must be positive");
  }

  let poll_interval = match &cli.command {
    Some(Command::Jobs(JobsCommand::Watch {
      interval_ms: Some(ms), ..
    })) => Duration::from_millis(*ms),
    _ => DEFAULT_POLL_INTERVAL,
  };

  Ok(EffectiveConfig {
    client: ClientConfig {
      rest_base: base.trim_end_matches('/').to_string(),
      credentials,
      timeout: Duration::from_secs(cli.timeout_secs),
      user_agent: format!("stock-admin/{}", env!("CARGO_PKG_VERSION")),
    },
    log_level: cli.log_level.clone(),
    poll_interval,
  })
}

/// Parse a `--status` value into a batch-job status filter value.
pub fn status_filter(raw: Option<&str>) -> Option<String> {
  raw.map(|s| match s.parse::<BatchJobStatus>() {
    Ok(BatchJobStatus::Unknown) | Err(_) => s.to_string(),
    Ok(status) => format!("{:?}", status),
  })
}
