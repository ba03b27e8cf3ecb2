//! Alert planning, rendering and delivery.

mod dispatch;
mod offset;
mod payload;
mod plan;
mod render;

pub use dispatch::{prepare_notification, AlertDispatcher, Notification, Notifier, CHANNEL_ID};
pub use offset::{
    AlertKind, AlertOffsets, LeadTimeOffset, SAME_DAY_TAG, SEVEN_DAY_TAG, THREE_DAY_TAG,
};
pub use payload::{AlertPayload, PayloadMap};
pub use plan::{default_alert_time, AlertJob, AlertPlanner, DEFAULT_ALERT_HOUR};
pub use render::{dedupe_id, render, RenderedAlert};
