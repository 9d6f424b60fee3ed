//! Ahead-of-time compilation of kernel sources into shared libraries.

use std::path::Path;
use std::process::Command;

use snafu::{ResultExt, ensure};

use crate::error::{CompilationSnafu, Result, ToolchainSpawnSnafu};
use crate::RuntimeConfig;

/// External compiler turning one C translation unit into one shared library.
pub trait Toolchain: Send + Sync {
    /// Compile `source` into a shared library at `artifact`.
    fn compile(&self, source: &Path, artifact: &Path) -> Result<()>;

    /// Human-readable toolchain name for diagnostics.
    fn name(&self) -> &str;
}

/// Drives a clang-compatible command line: `<cc> -shared -fPIC <opt> -o <artifact> <source> -lm`.
#[derive(Debug, Clone)]
pub struct ClangToolchain {
    compiler: String,
    opt_level: String,
}

impl ClangToolchain {
    pub fn new(compiler: impl Into<String>, opt_level: impl Into<String>) -> Self {
        Self { compiler: compiler.into(), opt_level: opt_level.into() }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(&config.compiler, &config.opt_level)
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    pub fn opt_level(&self) -> &str {
        &self.opt_level
    }
}

impl Toolchain for ClangToolchain {
    fn compile(&self, source: &Path, artifact: &Path) -> Result<()> {
        tracing::debug!(
            compiler = %self.compiler,
            opt = %self.opt_level,
            source = %source.display(),
            "compiling kernel"
        );

        let output = Command::new(&self.compiler)
            .args(["-shared", "-fPIC", &self.opt_level, "-o"])
            .arg(artifact)
            .arg(source)
            .arg("-lm")
            .output()
            .context(ToolchainSpawnSnafu { compiler: &self.compiler })?;

        ensure!(
            output.status.success(),
            CompilationSnafu {
                compiler: &self.compiler,
                source_path: source,
                diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.compiler
    }
}
