//! Execution of fired alert jobs.
//!
//! When the substrate runs a job it hands back the payload map. The
//! dispatcher decodes it, renders the text, and passes it to a [`Notifier`].
//! Any failure drops the alert; nothing is retried.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payload::{AlertPayload, PayloadMap};
use super::render::{dedupe_id, render};
use crate::error::Result;
use crate::storage::JobStore;

/// Delivery channel every birthday alert is posted on.
pub const CHANNEL_ID: &str = "birthday_notifications";

/// A rendered alert ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub channel: String,
    pub title: String,
    pub body: String,
    pub dedupe_id: String,
}

/// Delivery substrate (system notifications, console, chat...).
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Build the notification for a fired payload without delivering it.
///
/// # Errors
/// Returns an error if the payload cannot be decoded.
pub fn prepare_notification(payload: &PayloadMap) -> Result<Notification> {
    let payload = AlertPayload::from_map(payload)?;
    let rendered = render(&payload);
    Ok(Notification {
        channel: CHANNEL_ID.to_string(),
        title: rendered.title,
        body: rendered.body,
        dedupe_id: dedupe_id(&payload.name, payload.kind),
    })
}

/// Turns fired payloads into notifications.
pub struct AlertDispatcher<N> {
    notifier: N,
}

impl<N: Notifier> AlertDispatcher<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Render and deliver one fired job. Returns whether it was delivered.
    pub fn dispatch(&self, payload: &PayloadMap) -> bool {
        let notification = match prepare_notification(payload) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("dropping fired alert: {e}");
                return false;
            }
        };
        match self.notifier.notify(&notification) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(dedupe_id = %notification.dedupe_id, "alert delivery failed: {e}");
                false
            }
        }
    }

    /// Take every job due at `now` from the store and dispatch it.
    ///
    /// Jobs leave the store before delivery is attempted, so a failed
    /// delivery is lost rather than repeated. Returns how many were delivered.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn fire_due(&self, store: &JobStore, now: DateTime<Utc>) -> Result<usize> {
        let due = store.take_due(now)?;
        let delivered = due.iter().filter(|job| self.dispatch(&job.payload)).count();
        if !due.is_empty() {
            tracing::info!(due = due.len(), delivered, "fired due alerts");
        }
        Ok(delivered)
    }
}
