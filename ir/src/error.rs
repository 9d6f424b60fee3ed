use kiln_dtype::DType;
use snafu::Snafu;

use crate::{BufferId, LoadOp, OpArg, OpKind, shape::Shape};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Operand views differ, or a reshape/expand precondition does not hold.
    #[snafu(display("shape mismatch in {op}: expected {expected:?}, got {actual:?}"))]
    ShapeMismatch { op: OpKind, expected: Shape, actual: Shape },

    /// Zero-sized dimensions and element counts overflowing `usize` are rejected.
    #[snafu(display("invalid shape {shape:?}: dimensions must be positive and their product must fit in usize"))]
    InvalidShape { shape: Shape },

    /// Load requires a seed or constant that was not supplied.
    #[snafu(display("{op} load requires an argument"))]
    MissingArgument { op: LoadOp },

    #[snafu(display("{op} does not accept argument {arg}"))]
    InvalidArgument { op: OpKind, arg: OpArg },

    #[snafu(display("{op} expects {expected} sources, got {actual}"))]
    ArityMismatch { op: OpKind, expected: usize, actual: usize },

    #[snafu(display("{op} is not an elementwise operation"))]
    NotElementwise { op: OpKind },

    #[snafu(display("dtype mismatch: cannot combine {lhs} and {rhs}"))]
    DTypeMismatch { lhs: DType, rhs: DType },

    /// Sources belong to a different buffer arena.
    #[snafu(display("buffers belong to different graphs"))]
    GraphMismatch,

    #[snafu(display("axis {axis} out of range for rank {rank}"))]
    AxisOutOfRange { axis: usize, rank: usize },

    #[snafu(display("invalid permutation {order:?}: expected permutation of 0..{rank}"))]
    InvalidPermutation { order: Shape, rank: usize },

    #[snafu(display("padding has {actual} entries but shape has rank {rank}"))]
    InvalidPadding { actual: usize, rank: usize },

    /// External data does not fill the requested shape.
    #[snafu(display("data has {actual} elements, shape {shape:?} needs {expected}"))]
    DataLength { shape: Shape, expected: usize, actual: usize },

    #[snafu(display("{id} has no storage"))]
    NotRealized { id: BufferId },

    #[snafu(display("storage error for {id}"))]
    Storage { id: BufferId, source: kiln_device::Error },

    #[snafu(display("cannot view {id} as an array"))]
    Layout { id: BufferId, source: ndarray::ShapeError },
}
