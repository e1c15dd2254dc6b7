// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Keep a batch-job listing fresh while any job is Pending or Running
// role: orchestration/polling
// inputs: Successive job lists from a fetch closure; poll interval; cancellation token
// outputs: Poll decisions; number of fetches performed by watch()
// side_effects: Sleeps between fetches (via the injected Sleeper)
// invariants:
// - A refetch is scheduled only while some job is active
// - Once the token is cancelled no further fetch happens and no schedule remains
// errors: Fetch errors stop the watch and propagate to the caller
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::model::BatchJob;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

pub fn has_active_jobs(jobs: &[BatchJob]) -> bool {
  jobs.iter().any(|j| j.status.is_active())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
  Schedule(Duration),
  Idle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
  pub scheduled: bool,
  pub due: Option<Instant>,
}

/// Shared flag that stops a running watch, from its own callbacks or another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

pub trait Sleeper {
  /// Wait up to `dur`; may return early when `token` is cancelled.
  fn sleep(&self, dur: Duration, token: &CancelToken);
}

/// Real-time sleeper that wakes in short slices to notice cancellation.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
  fn sleep(&self, dur: Duration, token: &CancelToken) {
    let slice = Duration::from_millis(50);
    let deadline = Instant::now() + dur;

    while !token.is_cancelled() {
      let now = Instant::now();
      if now >= deadline {
        break;
      }
      std::thread::sleep(slice.min(deadline - now));
    }
  }
}

pub struct JobPoller {
  interval: Duration,
  state: PollState,
  token: CancelToken,
}

impl JobPoller {
  pub fn new(interval: Duration) -> Self {
    Self {
      interval,
      state: PollState::default(),
      token: CancelToken::default(),
    }
  }

  pub fn token(&self) -> CancelToken {
    self.token.clone()
  }

  /// Re-evaluate after a load: schedule a refetch while any job is active.
  pub fn on_data_loaded(&mut self, jobs: &[BatchJob]) -> PollDecision {
    if self.token.is_cancelled() || !has_active_jobs(jobs) {
      self.state = PollState::default();
      return PollDecision::Idle;
    }

    self.state = PollState {
      scheduled: true,
      due: Some(Instant::now() + self.interval),
    };

    PollDecision::Schedule(self.interval)
  }

  /// Fetch, decide, sleep and refetch until no job is active or the token is cancelled.
  ///
  /// `on_update` sees every loaded list. Returns the number of fetches made.
  pub fn watch<F, U, E>(&mut self, mut fetch: F, sleeper: &dyn Sleeper, mut on_update: U) -> Result<usize, E>
  where
    F: FnMut() -> Result<Vec<BatchJob>, E>,
    U: FnMut(&[BatchJob]),
  {
    let mut fetches = 0usize;

    while !self.token.is_cancelled() {
      let jobs = fetch()?;
      fetches += 1;
      on_update(&jobs);

      match self.on_data_loaded(&jobs) {
        PollDecision::Idle => break,
        PollDecision::Schedule(delay) => {
          tracing::debug!(delay_ms = delay.as_millis() as u64, due = ?self.state.due, "refetch scheduled");
          sleeper.sleep(delay, &self.token);
        }
      }
    }

    if self.token.is_cancelled() {
      self.state = PollState::default();
    }

    Ok(fetches)
  }
}
