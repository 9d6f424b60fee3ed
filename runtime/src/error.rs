//! Error types for kernel compilation and execution.

use std::path::PathBuf;

use kiln_dtype::DType;
use kiln_ir::BufferId;
use snafu::Snafu;

/// Result type for runtime operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("codegen error: {source}"))]
    Codegen { source: kiln_codegen::Error },

    #[snafu(display("schedule error: {source}"))]
    Schedule { source: kiln_schedule::Error },

    /// Graph-level failure while realizing a target, including allocation.
    #[snafu(display("graph error: {source}"))]
    Ir { source: kiln_ir::Error },

    /// The toolchain ran and rejected the source. `diagnostics` is its stderr verbatim.
    #[snafu(display("{compiler} failed to compile {}:\n{diagnostics}", source_path.display()))]
    Compilation { compiler: String, source_path: PathBuf, diagnostics: String },

    /// The toolchain executable could not be started.
    #[snafu(display("failed to run {compiler}: {source}"))]
    ToolchainSpawn { compiler: String, source: std::io::Error },

    #[snafu(display("I/O error at {}: {source}", path.display()))]
    Io { path: PathBuf, source: std::io::Error },

    /// The shared library could not be opened.
    #[snafu(display("failed to load {}: {source}", path.display()))]
    Load { path: PathBuf, source: libloading::Error },

    /// The artifact does not export the kernel's entry symbol.
    #[snafu(display("symbol '{key}' not found in compiled artifact: {source}"))]
    Link { key: String, source: libloading::Error },

    #[snafu(display("kernel '{key}' takes {arity} sources, at most 2 are supported"))]
    UnsupportedArity { key: String, arity: usize },

    #[snafu(display("kernel '{key}' expects {expected} sources, got {actual}"))]
    ArityMismatch { key: String, expected: usize, actual: usize },

    #[snafu(display("kernel '{key}' is compiled for {expected}, got {actual} storage"))]
    DTypeMismatch { key: String, expected: DType, actual: DType },

    /// A source reached execution before any item produced it.
    #[snafu(display("kernel '{key}' reads {id} before it is computed"))]
    SourceNotRealized { key: String, id: BufferId },
}
