//! Scheduler for the kiln buffer graph.
//!
//! Flattens the graph reachable from a requested buffer into a list of
//! [`ScheduleItem`]s, one per buffer that must be computed, with every item
//! placed after the items producing its sources.

pub mod error;
pub mod schedule;


pub use error::{Error, Result};
pub use schedule::{Schedule, ScheduleExt, ScheduleItem, create_schedule};
