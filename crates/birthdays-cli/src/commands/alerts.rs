//! Alert planning and delivery commands for CLI.

use birthdays_core::error::Result as CoreResult;
use birthdays_core::{AlertDispatcher, Config, JobStore, Notification, Notifier};
use chrono::Utc;
use clap::Subcommand;

use super::{open_pipeline, reapply, CliResult};

#[derive(Subcommand)]
pub enum AlertsAction {
    /// Show the alerts a recompute would schedule now
    Plan {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace pending alerts with a fresh plan
    Apply,
    /// List pending alerts
    Pending {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deliver every alert that is due
    Fire,
}

/// Prints alerts to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) -> CoreResult<()> {
        println!("[{}] {}: {}", notification.dedupe_id, notification.title, notification.body);
        Ok(())
    }
}

pub fn run(action: AlertsAction) -> CliResult {
    let config = Config::load()?;

    match action {
        AlertsAction::Plan { json } => {
            let (_, pipeline) = open_pipeline(&config)?;
            let jobs = pipeline.plan(&config.alerts);
            if json {
                println!("{}", serde_json::to_string_pretty(&jobs)?);
            } else if jobs.is_empty() {
                println!("nothing to schedule");
            } else {
                for job in &jobs {
                    println!("{}  {:<20} {}", job.fire_at, job.tag(), job.subject);
                }
            }
        }
        AlertsAction::Apply => {
            reapply(&config)?;
        }
        AlertsAction::Pending { json } => {
            let pending = JobStore::open_default()?.pending()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pending)?);
            } else if pending.is_empty() {
                println!("no pending alerts");
            } else {
                for job in &pending {
                    let name = job.payload.get("name").and_then(|v| v.as_str()).unwrap_or("?");
                    println!("{}  {:<20} {}", job.due_at.to_rfc3339(), job.tag, name);
                }
            }
        }
        AlertsAction::Fire => {
            let store = JobStore::open_default()?;
            let delivered = AlertDispatcher::new(ConsoleNotifier).fire_due(&store, Utc::now())?;
            println!("{delivered} alert(s) delivered");
        }
    }
    Ok(())
}
