// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Process-level helpers: tracing subscriber setup and man page rendering
// role: utilities/helpers
// inputs: Log filter string; clap CommandFactory
// outputs: Global tracing subscriber writing to stderr; man page text
// invariants:
// - RUST_LOG overrides the configured filter; an invalid filter falls back to `warn`
// - Logging never writes to stdout (stdout carries command output)
// errors: render_man_page surfaces IO errors from clap_mangen
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use clap::CommandFactory;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber once; later calls are no-ops.
pub fn init_logging(level: &str) {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(level))
    .unwrap_or_else(|_| EnvFilter::new("warn"));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let man = clap_mangen::Man::new(T::command());
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
