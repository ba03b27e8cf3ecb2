//! Alert jobs on the execution substrate.

mod adapter;
mod substrate;

pub use adapter::{ApplyReport, JobScheduler};
pub use substrate::{ExecutionSubstrate, JobId, JobRequest, MemoryJob, MemorySubstrate, Replacement};
