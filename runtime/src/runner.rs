//! Schedule execution.

use std::rc::Rc;

use kiln_codegen::Renderer;
use kiln_codegen::c::CRenderer;
use kiln_device::Storage;
use kiln_ir::LazyBuffer;
use kiln_schedule::{Schedule, ScheduleExt};
use snafu::ResultExt;

use crate::error::{CodegenSnafu, IrSnafu, Result, ScheduleSnafu};
use crate::{ClangToolchain, ExecutionPlan, KernelCache, PreparedKernel, RuntimeConfig, Toolchain};

/// Renders, compiles and runs schedules against one kernel cache.
///
/// The cache lives exactly as long as the runner; independent runners never
/// share loaded kernels in memory.
pub struct Runner {
    config: RuntimeConfig,
    renderer: Box<dyn Renderer>,
    cache: KernelCache,
}

impl Runner {
    /// Runner compiling with the toolchain named in `config`.
    pub fn new(config: RuntimeConfig) -> Self {
        let toolchain = ClangToolchain::from_config(&config);
        Self::with_toolchain(config, toolchain)
    }

    pub fn with_toolchain(config: RuntimeConfig, toolchain: impl Toolchain + 'static) -> Self {
        let cache = KernelCache::new(&config, toolchain);
        Self { config, renderer: Box::new(CRenderer::new()), cache }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn cache(&self) -> &KernelCache {
        &self.cache
    }

    /// Render and compile every item of `schedule`.
    pub fn prepare(&self, schedule: &Schedule) -> Result<ExecutionPlan> {
        let kernels = schedule
            .iter()
            .map(|item| {
                let rendered = self.renderer.render(item).context(CodegenSnafu)?;
                let kernel = self.cache.get_or_compile(&rendered)?;
                Ok(PreparedKernel { item: item.clone(), kernel })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            backend = self.renderer.backend_name(),
            num_kernels = kernels.len(),
            "execution plan prepared"
        );
        Ok(ExecutionPlan::new(kernels))
    }

    /// Prepare and run `schedule`.
    pub fn execute(&self, schedule: &Schedule) -> Result<()> {
        self.prepare(schedule)?.run()
    }

    /// Schedule, execute and return the storage backing `buffer`'s node.
    pub fn materialize(&self, buffer: &LazyBuffer) -> Result<Rc<Storage>> {
        let schedule = buffer.schedule().context(ScheduleSnafu)?;
        self.execute(&schedule)?;
        buffer.realize().context(IrSnafu)
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .field("backend", &self.renderer.backend_name())
            .field("cache", &self.cache)
            .finish()
    }
}
