//! Reconciles a freshly computed alert plan with the execution substrate.
//!
//! Every application cancels all three lead-time tags and resubmits the full
//! plan through [`ExecutionSubstrate::replace`]. Stale or duplicate jobs can
//! never outlive a recompute as long as the substrate applies a replacement
//! as one unit; the SQLite job store does, across processes.

use serde::{Deserialize, Serialize};

use super::substrate::{ExecutionSubstrate, JobRequest};
use crate::alerts::{AlertJob, LeadTimeOffset};
use crate::clock::Clock;

/// Outcome of one [`JobScheduler::apply`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Previously pending jobs dropped by tag cancellation.
    pub cancelled: usize,
    pub submitted: usize,
    /// Jobs the substrate refused. They are not retried.
    pub rejected: usize,
}

pub struct JobScheduler<'a> {
    substrate: &'a dyn ExecutionSubstrate,
    clock: &'a dyn Clock,
}

impl<'a> JobScheduler<'a> {
    pub fn new(substrate: &'a dyn ExecutionSubstrate, clock: &'a dyn Clock) -> Self {
        Self { substrate, clock }
    }

    /// Replace whatever this system has pending with `jobs`.
    ///
    /// `apply(&[])` leaves nothing pending.
    pub fn apply(&self, jobs: &[AlertJob]) -> ApplyReport {
        let mut report = ApplyReport::default();

        let now = self.clock.now();
        let requests = jobs
            .iter()
            .map(|job| JobRequest {
                delay_ms: u64::try_from((job.fire_at - now).num_milliseconds()).unwrap_or(0),
                tag: job.tag().to_string(),
                payload: job.payload.to_map(),
            })
            .collect();
        let tags = LeadTimeOffset::ALL.map(|offset| offset.tag());

        match self.substrate.replace(&tags, requests) {
            Ok(outcome) => {
                report.cancelled = outcome.cancelled;
                for (job, submission) in jobs.iter().zip(outcome.submissions) {
                    match submission {
                        Ok(_) => report.submitted += 1,
                        Err(e) => {
                            report.rejected += 1;
                            tracing::warn!(subject = %job.subject, tag = job.tag(), "job rejected: {e}");
                        }
                    }
                }
            }
            Err(e) => {
                report.rejected = jobs.len();
                tracing::warn!("alert plan not applied: {e}");
            }
        }

        tracing::info!(
            cancelled = report.cancelled,
            submitted = report.submitted,
            rejected = report.rejected,
            "alert plan applied"
        );
        report
    }
}
