//! Game session
//!
//! A [`Session`] owns one special pool, one generator, and one reveal state
//! machine. Generation and reset happen synchronously on the caller's side;
//! the timed reveal steps run on a tokio task per cycle. Every state change is
//! published as a [`Snapshot`] on a watch channel for the view.

use crate::catalog::Catalog;
use crate::chance::Chance;
use crate::generator::Generator;
use crate::pool::SpecialPool;
use crate::prompt::{GenerationResult, PromptItem};
use crate::reveal::{Cycle, Reveal, RevealState};
use crate::schedule::{ScheduledStep, Timing};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("reveal cycle {0} is still spinning")]
    Busy(Cycle),
    #[error("a session needs a running tokio runtime")]
    NoRuntime,
}

/// Which entry operation produced the current result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Standard,
    SpecialOnly,
}

/// Everything the view needs to render the current state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub cycle: Cycle,
    pub mode: Option<Mode>,
    pub state: RevealState,
    /// Committed result; empty while spinning or slowing
    pub result: GenerationResult,
    pub used_specials: usize,
    pub total_specials: usize,
}

impl Snapshot {
    /// The reel is moving (spinning or slowing)
    pub fn is_spinning(&self) -> bool {
        self.state.is_busy()
    }

    pub fn is_slowing(&self) -> bool {
        self.state == RevealState::Slowing
    }

    pub fn revealed_indices(&self) -> Vec<usize> {
        match &self.state {
            RevealState::Revealed(indices) => indices.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Items revealed so far, in result order
    pub fn revealed_items(&self) -> impl Iterator<Item = &PromptItem> + '_ {
        let revealed = self.revealed_indices();
        self.result
            .iter()
            .enumerate()
            .filter(move |(i, _)| revealed.contains(i))
            .map(|(_, item)| item)
    }

    pub fn is_complete(&self) -> bool {
        matches!(&self.state, RevealState::Revealed(indices) if indices.len() == self.result.len())
    }
}

/// A special prompt and whether it was used in the current round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialEntry {
    pub prompt: String,
    pub used: bool,
}

/// Options for creating a session
pub struct SessionOptions<C: Chance = StdRng> {
    /// Source of randomness
    pub chance: C,
    pub timing: Timing,
}

impl<C: Chance> SessionOptions<C> {
    pub fn new(chance: C) -> Self {
        SessionOptions {
            chance,
            timing: Timing::default(),
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }
}

impl SessionOptions<StdRng> {
    /// Deterministic draws for a seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

struct Inner<C> {
    generator: Generator,
    pool: SpecialPool,
    reveal: Reveal,
    chance: C,
    mode: Option<Mode>,
    timer: Option<JoinHandle<()>>,
}

impl<C> Inner<C> {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            cycle: self.reveal.cycle(),
            mode: self.mode,
            state: self.reveal.state().clone(),
            result: self.reveal.result().clone(),
            used_specials: self.pool.used_count(),
            total_specials: self.pool.total(),
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

fn lock<C>(inner: &Mutex<Inner<C>>) -> MutexGuard<'_, Inner<C>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One independent game
///
/// # Example
/// ```
/// # tokio_test::block_on(async {
/// use karaoke_prompts::{Catalog, Session, SessionOptions};
/// use std::sync::Arc;
///
/// let catalog = Catalog::new(
///     [("era", vec!["90s", "2000s", "free"])],
///     ["Title has two words"],
/// )
/// .unwrap();
/// let session = Session::new(Arc::new(catalog), SessionOptions::seeded(42));
/// let cycle = session.generate_standard().unwrap();
/// let done = session.wait_revealed(cycle).await;
/// assert!(!done.result.is_empty());
/// # });
/// ```
pub struct Session<C: Chance = StdRng> {
    inner: Arc<Mutex<Inner<C>>>,
    events: Arc<watch::Sender<Snapshot>>,
    timing: Timing,
    catalog: Arc<Catalog>,
}

impl<C: Chance + Send + 'static> Session<C> {
    pub fn new(catalog: Arc<Catalog>, options: SessionOptions<C>) -> Self {
        let inner = Inner {
            generator: Generator::new(catalog.clone()),
            pool: SpecialPool::new(catalog.clone()),
            reveal: Reveal::new(),
            chance: options.chance,
            mode: None,
            timer: None,
        };
        let (events, _) = watch::channel(inner.snapshot());
        Session {
            inner: Arc::new(Mutex::new(inner)),
            events: Arc::new(events),
            timing: options.timing,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Start a cycle revealing a standard draw
    pub fn generate_standard(&self) -> Result<Cycle, SessionError> {
        self.generate(Mode::Standard)
    }

    /// Start a cycle revealing a single special prompt
    pub fn generate_special_only(&self) -> Result<Cycle, SessionError> {
        self.generate(Mode::SpecialOnly)
    }

    fn generate(&self, mode: Mode) -> Result<Cycle, SessionError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SessionError::NoRuntime)?;

        let mut inner = lock(&self.inner);
        if inner.reveal.is_busy() {
            log::warn!("{:?} generation refused: cycle {} in flight", mode, inner.reveal.cycle());
            return Err(SessionError::Busy(inner.reveal.cycle()));
        }
        inner.cancel_timer();

        let state = &mut *inner;
        let result = match mode {
            Mode::Standard => state.generator.standard(&mut state.pool, &mut state.chance),
            Mode::SpecialOnly => state.generator.special_only(&mut state.pool, &mut state.chance),
        };
        let items = result.len();
        let cycle = inner
            .reveal
            .begin(result)
            .ok_or(SessionError::Busy(inner.reveal.cycle()))?;
        inner.mode = Some(mode);
        self.events.send_replace(inner.snapshot());
        log::info!("cycle {} started ({:?}, {} item(s))", cycle, mode, items);

        let task = run_cycle(
            self.inner.clone(),
            self.events.clone(),
            cycle,
            self.timing.plan(items),
            Instant::now(),
        );
        inner.timer = Some(runtime.spawn(task));
        Ok(cycle)
    }

    /// Clear the result and the special pool, returning to `Idle`
    ///
    /// Refused while a cycle is spinning or slowing. Reveals still pending
    /// for the current cycle are cancelled.
    pub fn reset(&self) -> Result<(), SessionError> {
        let mut inner = lock(&self.inner);
        if !inner.reveal.reset() {
            log::warn!("reset refused: cycle {} in flight", inner.reveal.cycle());
            return Err(SessionError::Busy(inner.reveal.cycle()));
        }
        inner.cancel_timer();
        inner.pool.reset();
        inner.mode = None;
        self.events.send_replace(inner.snapshot());
        log::info!("session reset");
        Ok(())
    }
}

impl<C: Chance> Session<C> {
    pub fn snapshot(&self) -> Snapshot {
        lock(&self.inner).snapshot()
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.events.subscribe()
    }

    pub fn is_spinning(&self) -> bool {
        lock(&self.inner).reveal.is_busy()
    }

    /// Every special prompt in list order with its used flag
    pub fn special_list(&self) -> Vec<SpecialEntry> {
        let inner = lock(&self.inner);
        self.catalog
            .specials()
            .iter()
            .enumerate()
            .map(|(index, prompt)| SpecialEntry {
                prompt: prompt.clone(),
                used: inner.pool.is_used(index),
            })
            .collect()
    }

    /// Wait until `cycle` is fully revealed or superseded
    pub async fn wait_revealed(&self, cycle: Cycle) -> Snapshot {
        let mut events = self.subscribe();
        loop {
            {
                let snapshot = events.borrow_and_update();
                if snapshot.cycle != cycle || snapshot.is_complete() {
                    return snapshot.clone();
                }
            }
            if events.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }
}

impl<C: Chance> Drop for Session<C> {
    fn drop(&mut self) {
        lock(&self.inner).cancel_timer();
    }
}

async fn run_cycle<C>(
    shared: Arc<Mutex<Inner<C>>>,
    events: Arc<watch::Sender<Snapshot>>,
    cycle: Cycle,
    plan: Vec<ScheduledStep>,
    start: Instant,
) {
    for scheduled in plan {
        let Some(deadline) = start.checked_add(scheduled.at) else {
            log::warn!("cycle {}: {:?} is scheduled too far ahead", cycle, scheduled.step);
            return;
        };
        tokio::time::sleep_until(deadline).await;

        let mut inner = lock(&shared);
        if !inner.reveal.apply(cycle, scheduled.step) {
            log::debug!("cycle {}: dropped stale {:?}", cycle, scheduled.step);
            return;
        }
        log::debug!(
            "cycle {}: {:?} at {}ms",
            cycle,
            scheduled.step,
            scheduled.at.as_millis()
        );
        // Published under the lock so snapshots never go out of order
        events.send_replace(inner.snapshot());
    }
}
