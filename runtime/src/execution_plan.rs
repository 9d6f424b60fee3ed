//! Pre-compiled execution plan.
//!
//! Separates one-time preparation (rendering and compiling every kernel of a
//! schedule) from execution (allocating targets and calling kernels in order).
//! Compilation finishes before any storage is allocated, so a failed build
//! never leaves a half-realized graph behind.
//!
//! # Example
//!
//! ```ignore
//! let plan = runner.prepare(&buffer.schedule()?)?;
//! plan.run()?;
//! ```

use std::rc::Rc;
use std::sync::Arc;

use kiln_device::Storage;
use kiln_schedule::ScheduleItem;
use smallvec::SmallVec;
use snafu::{OptionExt, ResultExt};

use crate::LoadedKernel;
use crate::error::{IrSnafu, Result, SourceNotRealizedSnafu};

/// A schedule item paired with its loaded kernel.
#[derive(Debug, Clone)]
pub struct PreparedKernel {
    pub item: ScheduleItem,
    /// Shared with the kernel cache.
    pub kernel: Arc<LoadedKernel>,
}

impl PreparedKernel {
    /// Realize the target, run the kernel over it and mark it computed.
    ///
    /// Already computed targets are left untouched. A target that only has
    /// storage allocated reuses that storage.
    pub fn execute(&self) -> Result<()> {
        let key = self.kernel.key().name();
        let target = &self.item.target;
        if target.is_computed() {
            tracing::trace!(kernel.name = %key, buffer = %target.id(), "target already computed");
            return Ok(());
        }

        let srcs = self
            .item
            .srcs
            .iter()
            .map(|src| {
                src.storage().filter(|_| src.is_computed()).context(SourceNotRealizedSnafu { key, id: src.id() })
            })
            .collect::<Result<SmallVec<[Rc<Storage>; 2]>>>()?;
        let out = target.realize().context(IrSnafu)?;
        let srcs: SmallVec<[&Storage; 2]> = srcs.iter().map(|s| s.as_ref()).collect();

        // SAFETY: storage is sized from each node's own tracker, which is the
        // layout the kernel was rendered against. A target is never its own source.
        unsafe { self.kernel.invoke(&out, &srcs)? };
        target.graph().mark_computed(target.id()).context(IrSnafu)
    }
}

/// Kernels for a whole schedule, in schedule order.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    kernels: Vec<PreparedKernel>,
}

impl ExecutionPlan {
    pub fn new(kernels: Vec<PreparedKernel>) -> Self {
        Self { kernels }
    }

    pub fn kernels(&self) -> &[PreparedKernel] {
        &self.kernels
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Execute every kernel strictly in order.
    pub fn run(&self) -> Result<()> {
        for kernel in &self.kernels {
            kernel.execute()?;
        }
        tracing::debug!(num_kernels = self.kernels.len(), "execution plan finished");
        Ok(())
    }
}
