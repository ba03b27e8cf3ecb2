//! Annual anniversaries: parsing raw dates, resolving the next occurrence,
//! and ordering the tracked set by how soon each one comes up.

mod collection;
mod raw_date;
mod resolver;

pub use collection::{Anniversary, AnniversaryCollection};
pub use raw_date::{LeapDayPolicy, MonthDay, RawDate};
pub use resolver::{AnniversaryResolver, Resolution};
