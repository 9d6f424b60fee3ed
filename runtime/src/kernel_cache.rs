//! Kernel deduplication cache.
//!
//! Maps kernel keys to loaded kernels. Keys are derived deterministically from
//! the operation, element type, shapes and argument, so two schedule items with
//! the same key share one compiled artifact.
//!
//! The cache has two levels:
//!
//! - **Memory**: kernels loaded by this cache instance, never evicted.
//! - **Disk**: `<key>.c` and `<key>.<dylib ext>` under the cache directory,
//!   reused across processes unless recompilation is forced.
//!
//! The whole check-compile-insert sequence runs under one lock, so concurrent
//! requests for the same key compile it once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_codegen::{KernelKey, RenderedKernel};
use parking_lot::Mutex;
use snafu::ResultExt;

use crate::error::{Error, IoSnafu, Result};
use crate::{LoadedKernel, RuntimeConfig, Toolchain};

/// Counters describing how requests were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Served from memory.
    pub hits: usize,
    /// Loaded from an artifact already on disk.
    pub disk_hits: usize,
    /// Required a toolchain invocation.
    pub compilations: usize,
}

#[derive(Default)]
struct CacheState {
    kernels: HashMap<KernelKey, Arc<LoadedKernel>>,
    stats: CacheStats,
}

pub struct KernelCache {
    dir: PathBuf,
    force_recompile: bool,
    toolchain: Box<dyn Toolchain>,
    state: Mutex<CacheState>,
}

impl KernelCache {
    pub fn new(config: &RuntimeConfig, toolchain: impl Toolchain + 'static) -> Self {
        Self {
            dir: config.cache_dir.clone(),
            force_recompile: config.force_recompile,
            toolchain: Box::new(toolchain),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn toolchain(&self) -> &dyn Toolchain {
        self.toolchain.as_ref()
    }

    /// Number of kernels loaded in memory.
    pub fn len(&self) -> usize {
        self.state.lock().kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &KernelKey) -> bool {
        self.state.lock().kernels.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }

    /// Path of the kernel source file for `key`.
    pub fn source_path(&self, key: &KernelKey) -> PathBuf {
        self.dir.join(format!("{key}.c"))
    }

    /// Path of the compiled artifact for `key`.
    pub fn artifact_path(&self, key: &KernelKey) -> PathBuf {
        self.dir.join(format!("{key}.{}", std::env::consts::DLL_EXTENSION))
    }

    /// Get the loaded kernel for `kernel.key`, compiling and loading it on a miss.
    ///
    /// A memory hit never touches the toolchain or the filesystem.
    pub fn get_or_compile(&self, kernel: &RenderedKernel) -> Result<Arc<LoadedKernel>> {
        let key = &kernel.key;
        let mut state = self.state.lock();

        if let Some(cached) = state.kernels.get(key) {
            let cached = Arc::clone(cached);
            state.stats.hits += 1;
            tracing::debug!(kernel.name = %key, "kernel cache hit");
            return Ok(cached);
        }

        let artifact = self.artifact_path(key);
        if !self.force_recompile && artifact.is_file() {
            state.stats.disk_hits += 1;
            tracing::debug!(kernel.name = %key, artifact = %artifact.display(), "reusing compiled artifact");
        } else {
            self.compile(kernel, &artifact)?;
            state.stats.compilations += 1;
        }

        let loaded = Arc::new(LoadedKernel::load(&artifact, kernel)?);
        state.kernels.insert(key.clone(), Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Build in a private scratch directory, then move the source and the
    /// artifact into place. Other processes sharing the cache directory only
    /// ever observe complete files.
    fn compile(&self, kernel: &RenderedKernel, artifact: &Path) -> Result<()> {
        let key = &kernel.key;
        tracing::debug!(kernel.name = %key, toolchain = self.toolchain.name(), "kernel cache miss");

        std::fs::create_dir_all(&self.dir).context(IoSnafu { path: &self.dir })?;
        let scratch =
            tempfile::Builder::new().prefix(".build-").tempdir_in(&self.dir).context(IoSnafu { path: &self.dir })?;
        let staged = scratch.path().join(format!("{key}.c"));
        let built = scratch.path().join(format!("{key}.{}", std::env::consts::DLL_EXTENSION));
        std::fs::write(&staged, &kernel.source).context(IoSnafu { path: &staged })?;

        let compiled = self.toolchain.compile(&staged, &built);

        // The source is kept on failure too, for inspection.
        let source = self.source_path(key);
        std::fs::rename(&staged, &source).context(IoSnafu { path: &source })?;
        compiled.map_err(|e| match e {
            Error::Compilation { compiler, diagnostics, .. } => {
                Error::Compilation { compiler, source_path: source.clone(), diagnostics }
            }
            other => other,
        })?;
        std::fs::rename(&built, artifact).context(IoSnafu { path: artifact })?;

        tracing::debug!(kernel.name = %key, artifact = %artifact.display(), "kernel compiled");
        Ok(())
    }
}

impl std::fmt::Debug for KernelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelCache")
            .field("dir", &self.dir)
            .field("force_recompile", &self.force_recompile)
            .field("toolchain", &self.toolchain.name())
            .field("len", &self.len())
            .finish()
    }
}
