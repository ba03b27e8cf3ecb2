//! Daily recompute of the alert plan.
//!
//! The plan goes stale once a day (days-until shifts, ages roll over), so it
//! is rebuilt at the next local midnight and every 24 hours after. The same
//! service serves on-demand recomputes after a settings or contacts change.
//! All runs go through one async mutex: a tick that comes due while another
//! run is in flight waits its turn instead of interleaving cancels and
//! submissions. The run itself reads contacts and writes the job store, so
//! it executes on the blocking pool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::clock::next_midnight;
use crate::jobs::ApplyReport;
use crate::pipeline::AlertPipeline;
use crate::storage::AlertsConfig;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Supplies current alert settings at the start of each run.
pub type SettingsLoader = Box<dyn Fn() -> AlertsConfig + Send + Sync>;

struct Inner {
    pipeline: AlertPipeline,
    settings: SettingsLoader,
    in_flight: Mutex<()>,
    runs: AtomicU64,
}

/// Serialized access to [`AlertPipeline::recompute`].
#[derive(Clone)]
pub struct RecomputeService {
    inner: Arc<Inner>,
}

impl RecomputeService {
    pub fn new(pipeline: AlertPipeline, settings: SettingsLoader) -> Self {
        Self {
            inner: Arc::new(Inner {
                pipeline,
                settings,
                in_flight: Mutex::new(()),
                runs: AtomicU64::new(0),
            }),
        }
    }

    /// Number of recomputes finished so far.
    pub fn completed_runs(&self) -> u64 {
        self.inner.runs.load(Ordering::SeqCst)
    }

    /// Recompute now, after any run already in flight.
    pub async fn trigger(&self) -> ApplyReport {
        let _guard = self.inner.in_flight.lock().await;
        let inner = Arc::clone(&self.inner);
        let run = tokio::task::spawn_blocking(move || {
            let settings = (inner.settings)();
            inner.pipeline.recompute(&settings)
        });
        let report = run.await.unwrap_or_else(|e| {
            tracing::warn!("recompute aborted: {e}");
            ApplyReport::default()
        });
        self.inner.runs.fetch_add(1, Ordering::SeqCst);
        report
    }

    /// Time from the pipeline clock's "now" to the next local midnight.
    pub fn until_midnight(&self) -> Duration {
        let now = self.inner.pipeline.clock().now();
        (next_midnight(now) - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Spawn the daily loop: first run at the next local midnight, then
    /// every 24 hours. Late ticks are delayed, never run concurrently.
    pub fn spawn_daily(&self) -> JoinHandle<()> {
        let service = self.clone();
        let first = tokio::time::Instant::now() + self.until_midnight();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first, DAY);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("daily recompute scheduled");

            loop {
                interval.tick().await;
                let report = service.trigger().await;
                tracing::debug!(
                    submitted = report.submitted,
                    cancelled = report.cancelled,
                    "daily recompute finished"
                );
            }
        })
    }
}
