//! Runtime execution for kiln kernels.
//!
//! Rendered kernels are compiled ahead of time by an external C toolchain
//! into shared libraries, loaded with `libloading` and called with raw
//! storage pointers.
//!
//! # Architecture
//!
//! - **Toolchain**: external compiler invocation ([`Toolchain`], [`ClangToolchain`])
//! - **Kernel cache**: per-runner memory cache over an on-disk artifact cache ([`KernelCache`])
//! - **Execution plan**: compile everything first, then allocate and run in order ([`ExecutionPlan`])
//! - **Runner**: schedule → plan → run ([`Runner`])

pub mod config;
pub mod error;
pub mod execution_plan;
pub mod kernel;
pub mod kernel_cache;
pub mod runner;
pub mod toolchain;


pub use config::RuntimeConfig;
pub use error::*;
pub use execution_plan::{ExecutionPlan, PreparedKernel};
pub use kernel::LoadedKernel;
pub use kernel_cache::{CacheStats, KernelCache};
pub use runner::Runner;
pub use toolchain::{ClangToolchain, Toolchain};
