//! Core traits for code generation.

use kiln_schedule::ScheduleItem;

use crate::{RenderedKernel, Result};

/// Backend-agnostic kernel synthesis interface.
pub trait Renderer {
    /// Emit one kernel implementing `item`'s operation over its operand views.
    fn render(&self, item: &ScheduleItem) -> Result<RenderedKernel>;

    /// Backend name (e.g. "c").
    fn backend_name(&self) -> &str;
}
