//! Compiled kernels loaded from shared libraries.

use std::path::Path;

use kiln_codegen::{KernelKey, RenderedKernel};
use kiln_device::Storage;
use kiln_dtype::DType;
use snafu::{ResultExt, ensure};

use crate::error::*;

type NullaryFn = unsafe extern "C" fn(*mut u8);
type UnaryFn = unsafe extern "C" fn(*mut u8, *const u8);
type BinaryFn = unsafe extern "C" fn(*mut u8, *const u8, *const u8);

/// Entry point bound to its pointer-argument signature.
#[derive(Clone, Copy)]
enum EntryPoint {
    Nullary(NullaryFn),
    Unary(UnaryFn),
    Binary(BinaryFn),
}

/// A kernel whose entry point has been resolved in a loaded shared library.
pub struct LoadedKernel {
    key: KernelKey,
    dtype: DType,
    entry: EntryPoint,
    /// Keep the library alive (prevents dlclose).
    _lib: libloading::Library,
}

// SAFETY: the entry point is read-only compiled code in a library owned by
// this struct; calling it from any thread is sound as long as the pointers
// passed in are, which `invoke` leaves to its caller.
unsafe impl Send for LoadedKernel {}
unsafe impl Sync for LoadedKernel {}

impl LoadedKernel {
    /// Open `artifact` and bind `kernel`'s entry symbol by its arity.
    pub fn load(artifact: &Path, kernel: &RenderedKernel) -> Result<Self> {
        let key = kernel.entry_point();
        ensure!(kernel.arity <= 2, UnsupportedAritySnafu { key, arity: kernel.arity });

        // SAFETY: artifacts are produced from generated kernel sources, which
        // have no initialisers with side effects.
        let lib = unsafe { libloading::Library::new(artifact) }.context(LoadSnafu { path: artifact })?;

        // SAFETY: the generated signature is `void key(T* out, const T* in0, ...)`
        // with exactly `arity` source pointers, matching the bound fn types.
        let entry = unsafe {
            match kernel.arity {
                0 => EntryPoint::Nullary(*lib.get::<NullaryFn>(key.as_bytes()).context(LinkSnafu { key })?),
                1 => EntryPoint::Unary(*lib.get::<UnaryFn>(key.as_bytes()).context(LinkSnafu { key })?),
                _ => EntryPoint::Binary(*lib.get::<BinaryFn>(key.as_bytes()).context(LinkSnafu { key })?),
            }
        };

        tracing::debug!(kernel.name = %key, artifact = %artifact.display(), "kernel loaded");
        Ok(Self { key: kernel.key.clone(), dtype: kernel.dtype, entry, _lib: lib })
    }

    pub fn key(&self) -> &KernelKey {
        &self.key
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Number of source pointers after the output.
    pub fn arity(&self) -> usize {
        match self.entry {
            EntryPoint::Nullary(_) => 0,
            EntryPoint::Unary(_) => 1,
            EntryPoint::Binary(_) => 2,
        }
    }

    /// Run the kernel writing into `out` and reading `srcs` in operation order.
    ///
    /// # Safety
    ///
    /// Each storage must hold at least as many elements as the kernel's loops
    /// touch: the physical size of the target and of each source view it was
    /// rendered for. `out` must not be one of `srcs`.
    pub unsafe fn invoke(&self, out: &Storage, srcs: &[&Storage]) -> Result<()> {
        let key = self.key.name();
        ensure!(srcs.len() == self.arity(), ArityMismatchSnafu { key, expected: self.arity(), actual: srcs.len() });
        for storage in std::iter::once(out).chain(srcs.iter().copied()) {
            let actual = storage.dtype();
            ensure!(actual == self.dtype, DTypeMismatchSnafu { key, expected: self.dtype, actual });
        }

        tracing::debug!(kernel.name = %self.key, kernel.num_buffers = srcs.len() + 1, "executing kernel");

        // SAFETY: arity and dtypes are checked above, sizes are the caller's contract.
        unsafe {
            let out = out.as_raw_ptr();
            match self.entry {
                EntryPoint::Nullary(f) => f(out),
                EntryPoint::Unary(f) => f(out, srcs[0].as_raw_ptr()),
                EntryPoint::Binary(f) => f(out, srcs[0].as_raw_ptr(), srcs[1].as_raw_ptr()),
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for LoadedKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedKernel")
            .field("key", &self.key)
            .field("dtype", &self.dtype)
            .field("arity", &self.arity())
            .finish()
    }
}
