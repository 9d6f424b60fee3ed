//! Error types for kernel synthesis.

use kiln_dtype::DType;
use kiln_ir::OpKind;
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Operation kind the synthesizer cannot emit a kernel for.
    #[snafu(display("unsupported operation {op}: {reason}"))]
    UnsupportedOperation { op: OpKind, reason: String },

    #[snafu(display("{op} requires an argument"))]
    MissingArgument { op: OpKind },

    #[snafu(display("{op} expects {expected} sources, got {actual}"))]
    ArityMismatch { op: OpKind, expected: usize, actual: usize },

    #[snafu(display("{op} mixes element types {expected} and {actual}"))]
    DTypeMismatch { op: OpKind, expected: DType, actual: DType },
}
