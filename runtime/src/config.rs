//! Runtime configuration.
//!
//! Built either explicitly with [`RuntimeConfig::builder`] or from the
//! environment with [`RuntimeConfig::from_env`].

use std::path::{Path, PathBuf};

use bon::bon;

/// Optimization flag passed to the toolchain unless overridden.
pub const DEFAULT_OPT_LEVEL: &str = "-O2";

/// Settings for kernel compilation and the on-disk kernel cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// C compiler executable.
    pub compiler: String,
    /// Optimization flag, e.g. `-O2`.
    pub opt_level: String,
    /// Directory holding kernel sources and compiled artifacts.
    pub cache_dir: PathBuf,
    /// Always invoke the toolchain, overwriting artifacts left by earlier runs.
    pub force_recompile: bool,
}

#[bon]
impl RuntimeConfig {
    #[builder]
    pub fn new(
        #[builder(default = default_compiler())] compiler: String,
        #[builder(default = DEFAULT_OPT_LEVEL.to_string())] opt_level: String,
        #[builder(default = default_cache_dir())] cache_dir: PathBuf,
        #[builder(default = false)] force_recompile: bool,
    ) -> Self {
        Self { compiler, opt_level, cache_dir, force_recompile }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `KILN_CC` - C compiler (default: `clang` if found on `PATH`, else `cc`)
    /// * `KILN_OPT` - Optimization flag (default: `-O2`)
    /// * `KILN_CACHE_DIR` - Kernel cache directory (default: `<tmp>/kiln-kernels`)
    /// * `KILN_RECOMPILE` - Ignore compiled artifacts on disk if set
    pub fn from_env() -> Self {
        let compiler = std::env::var("KILN_CC").ok().filter(|s| !s.is_empty()).unwrap_or_else(default_compiler);
        let opt_level =
            std::env::var("KILN_OPT").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| DEFAULT_OPT_LEVEL.to_string());
        let cache_dir = std::env::var_os("KILN_CACHE_DIR").map(PathBuf::from).unwrap_or_else(default_cache_dir);
        let force_recompile = std::env::var_os("KILN_RECOMPILE").is_some();

        Self { compiler, opt_level, cache_dir, force_recompile }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_compiler() -> String {
    let compiler = if on_path("clang") { "clang" } else { "cc" };
    compiler.to_string()
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("kiln-kernels")
}

fn on_path(program: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(program)))
}

fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension(std::env::consts::EXE_EXTENSION).is_file()
}
