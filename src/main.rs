use anyhow::Result;
use clap::{CommandFactory, Parser};

mod api;
mod cli;
mod commands;
mod ext;
mod model;
mod params;
mod poller;
mod query;
mod reports;
mod util;

use crate::cli::{Cli, normalize};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI + env into one config
  let cfg = normalize(&cli)?;
  util::init_logging(&cfg.log_level);

  // Phase 2: dispatch
  let Some(command) = cli.command else {
    Cli::command().print_help()?;
    return Ok(());
  };

  if let Err(e) = commands::run(&cfg, command) {
    tracing::error!("{:#}", e);
    return Err(e);
  }

  Ok(())
}
