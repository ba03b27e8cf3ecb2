//! Long-running mode: recompute at every local midnight and deliver alerts
//! as they come due.

use std::sync::Arc;
use std::time::Duration;

use birthdays_core::{
    AlertDispatcher, AlertPipeline, Config, ConfiguredContactBook, JobStore, RecomputeService,
};
use chrono::Utc;
use tokio::time::MissedTickBehavior;

use super::alerts::ConsoleNotifier;
use super::CliResult;

pub fn run(poll_secs: u64) -> CliResult {
    // Contacts and alert settings are both re-read from the config file on
    // every run.
    let contacts = ConfiguredContactBook::open_default()?;
    let store = Arc::new(JobStore::open_default()?);
    let pipeline = AlertPipeline::new(contacts, store.clone());
    let service = RecomputeService::new(pipeline, Box::new(|| Config::load_or_default().alerts));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(service, store, Duration::from_secs(poll_secs.max(1))));
    Ok(())
}

async fn serve(service: RecomputeService, store: Arc<JobStore>, poll_every: Duration) {
    let report = service.trigger().await;
    tracing::info!(
        submitted = report.submitted,
        cancelled = report.cancelled,
        "initial recompute finished"
    );
    let _daily = service.spawn_daily();

    let dispatcher = Arc::new(AlertDispatcher::new(ConsoleNotifier));
    let mut poll = tokio::time::interval(poll_every);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    println!("daemon running, checking for due alerts every {}s", poll_every.as_secs());

    loop {
        poll.tick().await;
        let dispatcher = Arc::clone(&dispatcher);
        let store = Arc::clone(&store);
        let fired =
            tokio::task::spawn_blocking(move || dispatcher.fire_due(&store, Utc::now())).await;
        match fired {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!("failed to fire due alerts: {e}"),
            Err(e) => tracing::warn!("alert delivery task aborted: {e}"),
        }
    }
}
