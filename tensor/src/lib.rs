use std::cell::Cell;

use kiln_dtype::HasDType;
use kiln_ir::{Graph, LazyBuffer, LoadOp, OpArg};
use kiln_runtime::{Runner, RuntimeConfig};
use snafu::ResultExt;

pub mod error;
use error::*;

pub mod arithmetic;
pub mod matmul;
pub mod realize;
pub mod reduce;
pub mod shape_ops;
pub mod traits;

pub use error::{Error, Result};
pub use kiln_dtype::DType;

// Thread-local engine state: one buffer arena, one runner (with its kernel
// cache) and the seed counter for `Tensor::rand`.
thread_local! {
    static GRAPH: Graph = Graph::new();
    static RUNNER: Runner = Runner::new(RuntimeConfig::from_env());
    static NEXT_SEED: Cell<u64> = const { Cell::new(0) };
}

/// Tensor represents a multi-dimensional array with lazy evaluation.
///
/// Operations build a buffer graph without allocating anything. Storage is
/// only allocated for tensors created with [`Tensor::from_slice`] and when a
/// tensor is realized, which compiles and runs one kernel per scheduled
/// buffer.
///
/// # Examples
///
/// ```ignore
/// # use kiln_tensor::Tensor;
/// let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3])?;
/// let b = Tensor::full(&[3], 2.0)?;
/// let c = (&a * &b).realize()?;
/// assert_eq!(c.to_vec::<f32>()?, [2.0, 4.0, 6.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    buffer: LazyBuffer,
}

impl Tensor {
    fn new(buffer: LazyBuffer) -> Self {
        Self { buffer }
    }

    /// Wrap a buffer built directly on the graph API.
    pub fn from_buffer(buffer: LazyBuffer) -> Self {
        Self::new(buffer)
    }

    /// The thread's default graph, shared by every tensor created on this thread.
    pub fn graph() -> Graph {
        GRAPH.with(Graph::clone)
    }

    fn load(op: LoadOp, shape: &[usize], arg: Option<OpArg>, dtype: DType) -> Result<Self> {
        GRAPH.with(|g| g.load_with_dtype(op, shape, arg, dtype)).map(Self::new).context(IrSnafu)
    }

    /// Tensor with every element set to `value`.
    pub fn full(shape: &[usize], value: f64) -> Result<Self> {
        Self::full_with_dtype(shape, value, DType::default())
    }

    pub fn full_with_dtype(shape: &[usize], value: f64, dtype: DType) -> Result<Self> {
        Self::load(LoadOp::Const, shape, Some(OpArg::Value(value)), dtype)
    }

    pub fn zeros(shape: &[usize]) -> Result<Self> {
        Self::full(shape, 0.0)
    }

    pub fn ones(shape: &[usize]) -> Result<Self> {
        Self::full(shape, 1.0)
    }

    /// Uninitialised tensor. Realized storage is zero.
    pub fn empty(shape: &[usize]) -> Result<Self> {
        Self::load(LoadOp::Empty, shape, None, DType::default())
    }

    /// Uniform `[0, 1)` draws, seeded from the thread's seed counter.
    ///
    /// Each call takes the next seed, so two calls produce different tensors.
    pub fn rand(shape: &[usize]) -> Result<Self> {
        let seed = NEXT_SEED.with(|next| next.replace(next.get().wrapping_add(1)));
        Self::rand_seeded(shape, seed)
    }

    /// Uniform `[0, 1)` draws from an explicit seed.
    pub fn rand_seeded(shape: &[usize], seed: u64) -> Result<Self> {
        Self::load(LoadOp::Rand, shape, Some(OpArg::Seed(seed)), DType::default())
    }

    /// Reset the seed counter used by [`Tensor::rand`].
    pub fn manual_seed(seed: u64) {
        NEXT_SEED.with(|next| next.set(seed));
    }

    /// Copy `data` into an already realized tensor of the given shape.
    pub fn from_slice<T: HasDType>(data: &[T], shape: &[usize]) -> Result<Self> {
        GRAPH.with(|g| g.from_slice(data, shape)).map(Self::new).context(IrSnafu)
    }

    pub fn buffer(&self) -> &LazyBuffer {
        &self.buffer
    }

    pub fn shape(&self) -> &[usize] {
        self.buffer.shape()
    }

    pub fn rank(&self) -> usize {
        self.buffer.rank()
    }

    pub fn numel(&self) -> usize {
        self.buffer.tracker().logical_size()
    }

    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }

    /// Whether the tensor's contents have been computed (or were supplied).
    pub fn is_realized(&self) -> bool {
        self.buffer.is_computed()
    }
}

#[cfg(test)]
mod test;
