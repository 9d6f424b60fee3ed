use kiln_dtype::DType;
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Host allocation could not be satisfied.
    #[snafu(display("failed to allocate {len} elements of {dtype} ({reason})"))]
    Allocation { dtype: DType, len: usize, reason: String },

    /// Storage holds a different element type than requested.
    #[snafu(display("dtype mismatch: storage holds {actual}, requested {expected}"))]
    DTypeMismatch { expected: DType, actual: DType },

    #[snafu(display("size mismatch: expected {expected} elements, got {actual}"))]
    SizeMismatch { expected: usize, actual: usize },
}
