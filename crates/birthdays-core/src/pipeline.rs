//! One recompute pass: contacts → anniversaries → alert plan → substrate.

use std::sync::Arc;

use crate::alerts::AlertJob;
use crate::anniversary::AnniversaryCollection;
use crate::clock::{Clock, SystemClock};
use crate::contacts::ContactSource;
use crate::jobs::{ApplyReport, ExecutionSubstrate, JobScheduler};
use crate::storage::AlertsConfig;

/// Wires the contact source, planner and substrate together.
///
/// Settings are passed into every call rather than held, so a preference
/// change takes effect on the next recompute.
pub struct AlertPipeline {
    contacts: Box<dyn ContactSource>,
    substrate: Arc<dyn ExecutionSubstrate>,
    clock: Arc<dyn Clock>,
}

impl AlertPipeline {
    pub fn new(contacts: impl ContactSource + 'static, substrate: Arc<dyn ExecutionSubstrate>) -> Self {
        Self {
            contacts: Box::new(contacts),
            substrate,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Today's anniversaries. An unreachable contact source yields an empty
    /// collection.
    pub fn collection(&self, settings: &AlertsConfig) -> AnniversaryCollection {
        let today = self.clock.today();
        match self.contacts.query() {
            Ok(records) => AnniversaryCollection::build(&records, today, &settings.resolver()),
            Err(e) => {
                tracing::warn!("contact source unavailable, nothing to schedule: {e}");
                AnniversaryCollection::empty(today)
            }
        }
    }

    /// The alert jobs a recompute would submit right now.
    pub fn plan(&self, settings: &AlertsConfig) -> Vec<AlertJob> {
        let collection = self.collection(settings);
        settings
            .planner()
            .plan(collection.as_slice(), &settings.offsets(), self.clock.now())
    }

    /// Recompute the plan and replace everything pending on the substrate.
    ///
    /// Concurrent recomputes are safe on substrates with an atomic
    /// [`ExecutionSubstrate::replace`]. In-process callers still go through
    /// [`crate::recompute::RecomputeService`] so runs queue in order.
    pub fn recompute(&self, settings: &AlertsConfig) -> ApplyReport {
        let jobs = self.plan(settings);
        JobScheduler::new(self.substrate.as_ref(), self.clock.as_ref()).apply(&jobs)
    }
}
