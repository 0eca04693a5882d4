//! Scheduler loop driving recurring task generation.
//!
//! A [`Scheduler`] is an explicit component: it owns its [`Tracker`], its
//! [`Clock`] and its event channel, and is passed to whatever triggers it.
//! The background timer ([`Scheduler::start`]) and manual triggers
//! ([`Scheduler::run_now`], [`Scheduler::run_pass`]) run the identical pass
//! and are safe to run concurrently: the receipt primary key in the store is
//! the only synchronization point.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use cadence_core::{
//!     scheduler::{FixedClock, Scheduler, SchedulerConfig},
//!     TrackerBuilder,
//! };
//! use jiff::civil::date;
//!
//! # async fn example() -> cadence_core::Result<()> {
//! let tracker = TrackerBuilder::new()
//!     .with_database_path("/tmp/cadence.db")
//!     .build()
//!     .await?;
//! let scheduler = Scheduler::new(tracker, SchedulerConfig::default())
//!     .with_clock(Arc::new(FixedClock::new(date(2026, 5, 1))));
//!
//! let mut due = scheduler.subscribe();
//! let summary = scheduler.run_now().await?;
//! println!("{summary}");
//! while let Ok(event) = due.try_recv() {
//!     println!("due: {}", event.name);
//! }
//!
//! let handle = scheduler.start();
//! tokio::time::sleep(Duration::from_secs(1)).await;
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use jiff::civil::Date;
use log::{debug, error, info};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::{
    error::{Result, TrackerError},
    models::{PassSummary, TaskDue},
    params::GeneratePass,
    tracker::Tracker,
};

pub mod clock;
pub mod pass;


pub use clock::{Clock, FixedClock, SystemClock};

/// Buffered task-due events per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 256;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Timer and catch-up settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between background passes
    pub interval: Duration,
    /// How many days before today a pass may fill in after downtime
    pub catch_up_days: u32,
    /// Run a pass as soon as the loop starts instead of after one interval
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 60 * 60),
            catch_up_days: 7,
            run_on_start: true,
        }
    }
}

/// Periodic and on-demand driver for generation passes.
#[derive(Clone)]
pub struct Scheduler {
    tracker: Tracker,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    events: broadcast::Sender<TaskDue>,
}

impl Scheduler {
    /// Creates a scheduler reading dates from the system clock.
    pub fn new(tracker: Tracker, config: SchedulerConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tracker,
            clock: Arc::new(SystemClock),
            config,
            events,
        }
    }

    /// Replaces the clock, typically with a [`FixedClock`] in tests.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// Subscribes to [`TaskDue`] events for instances created from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskDue> {
        self.events.subscribe()
    }

    /// Runs one pass for `as_of` and publishes an event per new instance.
    pub async fn run_pass(&self, as_of: Date) -> Result<PassSummary> {
        self.run_pass_with(as_of, Arc::new(AtomicBool::new(false)))
            .await
    }

    /// Runs one pass for the clock's current date.
    pub async fn run_now(&self) -> Result<PassSummary> {
        self.run_pass(self.clock.today()).await
    }

    /// Manual trigger: runs a pass for the requested date, or today.
    pub async fn generate(&self, params: &GeneratePass) -> Result<PassSummary> {
        let as_of = params.date.unwrap_or_else(|| self.clock.today());
        self.run_pass(as_of).await
    }

    async fn run_pass_with(&self, as_of: Date, cancel: Arc<AtomicBool>) -> Result<PassSummary> {
        let catch_up_days = self.config.catch_up_days;
        let summary = self
            .tracker
            .with_database(move |db| pass::run_pass(db, as_of, catch_up_days, &cancel))
            .await?;

        for event in &summary.instances {
            if self.events.send(event.clone()).is_err() {
                debug!("No subscribers for task-due events");
                break;
            }
        }

        Ok(summary)
    }

    /// Spawns the background loop on the current tokio runtime.
    pub fn start(&self) -> SchedulerHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = self.clone();
        let worker_cancel = Arc::clone(&cancel);

        let join = tokio::spawn(async move { worker.run_loop(shutdown_rx, worker_cancel).await });

        SchedulerHandle {
            shutdown,
            cancel,
            join,
        }
    }

    async fn run_loop(self, mut shutdown: watch::Receiver<bool>, cancel: Arc<AtomicBool>) {
        let mut ticker = tokio::time::interval(self.config.interval.max(MIN_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.config.run_on_start {
            // The first tick of an interval completes immediately.
            ticker.tick().await;
        }
        info!(
            "Scheduler started with a {:?} interval",
            self.config.interval
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let today = self.clock.today();
                    match self.run_pass_with(today, Arc::clone(&cancel)).await {
                        Ok(summary) if summary.cancelled => break,
                        Ok(_) => {}
                        Err(e) => error!("Generation pass for {today} failed: {e}"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }
}

/// Handle to a running background loop.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    cancel: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signals shutdown and waits for the loop to exit. A pass in progress
    /// stops before its next template.
    pub async fn stop(self) -> Result<()> {
        self.cancel.store(true, Ordering::SeqCst);
        // The loop may already have exited and dropped its receiver.
        let _ = self.shutdown.send(true);
        self.join.await.map_err(TrackerError::join)
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
