//! Types for code generation.

use kiln_dtype::DType;

use crate::KernelKey;

/// A rendered kernel ready for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedKernel {
    /// Cache key; also the entry symbol name.
    pub key: KernelKey,

    /// Complete translation unit.
    pub source: String,

    /// Number of source pointers after the output pointer.
    pub arity: usize,

    /// Element type of every pointer argument.
    pub dtype: DType,
}

impl RenderedKernel {
    pub fn entry_point(&self) -> &str {
        self.key.name()
    }
}
