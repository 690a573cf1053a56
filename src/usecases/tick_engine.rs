//! Tick Engine - Periodic Clock/Odds Simulation
//!
//! `TickEngine` performs one synchronous pass over the registry per
//! call. `TickScheduler` drives it on a fixed wall-clock interval:
//! 1. The first subscriber spawns the periodic task
//! 2. Each interval the task steps the engine once
//! 3. Dropping the last subscription cancels the task
//!
//! A new subscriber after cancellation restarts the task; the
//! simulation resumes from the last published snapshot.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::stream::{BoxStream, Stream, StreamExt};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::{broadcast, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::domain::{step_all, OddsModel};

use super::match_registry::{MatchRegistry, MatchSnapshot, RegistryHandle};

/// Single writer of the match registry.
pub struct TickEngine {
  registry: MatchRegistry,
  model: OddsModel,
  rng: ChaCha8Rng,
}

impl TickEngine {
  /// Create an engine. A fixed `seed` makes every run reproducible.
  pub fn new(registry: MatchRegistry, model: OddsModel, seed: Option<u64>) -> Self {
    let rng = match seed {
      Some(seed) => ChaCha8Rng::seed_from_u64(seed),
      None => ChaCha8Rng::from_entropy(),
    };
    Self {
      registry,
      model,
      rng,
    }
  }

  /// Advance every match by one tick and publish the result.
  ///
  /// Returns the version of the new snapshot.
  pub fn step(&mut self) -> u64 {
    let current = self.registry.current();
    let next = step_all(&current.matches, &self.model, &mut self.rng);
    let live = next.iter().filter(|m| m.is_live()).count();
    let version = self.registry.publish(next);
    debug!(version, live, "Tick published");
    version
  }

  /// Read handle on the registry this engine writes to.
  pub fn handle(&self) -> RegistryHandle {
    self.registry.handle()
  }
}

// ─────────────────────────────────────────────────────────────
// Scheduler
// ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct SchedulerState {
  subscribers: usize,
  /// Present while a tick task is running; dropping it stops the task.
  stop: Option<oneshot::Sender<()>>,
}

/// Runs the tick engine on a fixed interval while anyone is subscribed.
#[derive(Clone)]
pub struct TickScheduler {
  engine: Arc<tokio::sync::Mutex<TickEngine>>,
  handle: RegistryHandle,
  period: Duration,
  state: Arc<Mutex<SchedulerState>>,
}

impl TickScheduler {
  /// Wrap `engine`, ticking every `period` once started.
  pub fn new(engine: TickEngine, period: Duration) -> Self {
    let handle = engine.handle();
    Self {
      engine: Arc::new(tokio::sync::Mutex::new(engine)),
      handle,
      period,
      state: Arc::new(Mutex::new(SchedulerState::default())),
    }
  }

  /// Read handle on the registry.
  pub fn registry(&self) -> &RegistryHandle {
    &self.handle
  }

  /// Whether a tick task is currently running.
  pub fn is_running(&self) -> bool {
    lock(&self.state).stop.is_some()
  }

  /// Number of live subscriptions.
  pub fn subscribers(&self) -> usize {
    lock(&self.state).subscribers
  }

  /// Subscribe to snapshots, starting the tick task if needed.
  ///
  /// The returned stream yields one snapshot per tick, starting with
  /// the next tick. Must be called inside a Tokio runtime.
  pub fn subscribe(&self) -> TickSubscription {
    {
      let mut state = lock(&self.state);
      state.subscribers += 1;
      if state.stop.is_none() {
        let (stop_tx, stop_rx) = oneshot::channel();
        state.stop = Some(stop_tx);
        self.spawn_task(stop_rx);
      }
    }

    let rx = self.handle.changes();
    let snapshots = futures_util::stream::unfold(rx, |mut rx| async move {
      rx.changed().await.ok()?;
      let snapshot = Arc::clone(&rx.borrow_and_update());
      Some((snapshot, rx))
    })
    .boxed();

    TickSubscription {
      snapshots,
      _guard: SubscriberGuard {
        state: Arc::clone(&self.state),
      },
    }
  }

  /// Keep the simulation ticking until `shutdown` fires.
  #[instrument(skip_all, name = "tick_scheduler")]
  pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
    let _subscription = self.subscribe();
    info!(period_ms = self.period.as_millis() as u64, "Tick scheduler running");
    let _ = shutdown.recv().await;
    info!("Shutdown signal received, stopping tick scheduler");
  }

  fn spawn_task(&self, mut stop_rx: oneshot::Receiver<()>) {
    let engine = Arc::clone(&self.engine);
    let period = self.period;
    info!(period_ms = period.as_millis() as u64, "Starting tick task");

    tokio::spawn(async move {
      let mut interval = tokio::time::interval_at(Instant::now() + period, period);
      interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

      loop {
        tokio::select! {
          biased;
          // Resolves with an error once the sender is dropped.
          _ = &mut stop_rx => break,
          _ = interval.tick() => {
            engine.lock().await.step();
          }
        }
      }

      info!("Tick task stopped");
    });
  }
}

/// Snapshot stream handed to a consumer. Dropping it unsubscribes.
pub struct TickSubscription {
  snapshots: BoxStream<'static, Arc<MatchSnapshot>>,
  _guard: SubscriberGuard,
}

impl Stream for TickSubscription {
  type Item = Arc<MatchSnapshot>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    self.get_mut().snapshots.poll_next_unpin(cx)
  }
}

struct SubscriberGuard {
  state: Arc<Mutex<SchedulerState>>,
}

impl Drop for SubscriberGuard {
  fn drop(&mut self) {
    let mut state = lock(&self.state);
    state.subscribers = state.subscribers.saturating_sub(1);
    if state.subscribers == 0 && state.stop.take().is_some() {
      debug!("Last subscriber dropped, cancelling tick task");
    }
  }
}

fn lock(state: &Mutex<SchedulerState>) -> MutexGuard<'_, SchedulerState> {
  state.lock().unwrap_or_else(PoisonError::into_inner)
}
