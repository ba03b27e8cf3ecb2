//! # Birthdays Core Library
//!
//! The recurrence and scheduling engine behind the Birthdays CLI. It turns a
//! list of contacts with (possibly yearless) birthdays into a set of one-shot
//! alert jobs on an execution substrate, and renders those jobs when they
//! fire.
//!
//! ## Architecture
//!
//! - **Anniversary**: parses raw dates and resolves each one to its next
//!   occurrence, days remaining and age reached
//! - **Alerts**: plans alert jobs for the enabled lead times, renders fired
//!   payloads and hands them to a notifier
//! - **Jobs**: the substrate seam and the cancel-all-then-resubmit adapter
//! - **Storage**: TOML configuration and the SQLite job store
//! - **Recompute**: the daily, non-overlapping recompute loop
//!
//! ## Key Components
//!
//! - [`AnniversaryResolver`]: next occurrence of an annual date
//! - [`AlertPlanner`]: anniversaries + lead times → alert jobs
//! - [`JobScheduler`]: replaces pending jobs with a fresh plan
//! - [`AlertPipeline`]: one full recompute pass
//! - [`Config`]: alert preferences

pub mod alerts;
pub mod anniversary;
pub mod clock;
pub mod contacts;
pub mod error;
pub mod jobs;
pub mod pipeline;
pub mod recompute;
pub mod storage;

pub use alerts::{
    AlertDispatcher, AlertJob, AlertKind, AlertOffsets, AlertPayload, AlertPlanner, LeadTimeOffset,
    Notification, Notifier,
};
pub use anniversary::{
    Anniversary, AnniversaryCollection, AnniversaryResolver, LeapDayPolicy, MonthDay, RawDate,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use contacts::{ConfiguredContactBook, ContactBook, ContactRecord, ContactSource};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use jobs::{
    ApplyReport, ExecutionSubstrate, JobRequest, JobScheduler, MemorySubstrate, Replacement,
};
pub use pipeline::AlertPipeline;
pub use recompute::RecomputeService;
pub use storage::{AlertsConfig, Config, JobStore};
