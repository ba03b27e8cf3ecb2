pub mod alerts;
pub mod config;
pub mod contacts;
pub mod daemon;

use std::sync::Arc;

use birthdays_core::{AlertPipeline, ApplyReport, Config, ContactBook, JobStore};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Contacts file and job store as configured, wired into a pipeline.
pub fn open_pipeline(config: &Config) -> CliResult<(Arc<JobStore>, AlertPipeline)> {
    let book = ContactBook::new(config.contacts_path()?);
    let store = Arc::new(JobStore::open_default()?);
    let pipeline = AlertPipeline::new(book, store.clone());
    Ok((store, pipeline))
}

/// Replace pending alerts with a fresh plan and report what changed.
pub fn reapply(config: &Config) -> CliResult<ApplyReport> {
    let (_, pipeline) = open_pipeline(config)?;
    let report = pipeline.recompute(&config.alerts);
    println!(
        "alerts rescheduled: {} submitted, {} cancelled, {} rejected",
        report.submitted, report.cancelled, report.rejected
    );
    Ok(report)
}
