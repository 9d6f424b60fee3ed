//! Logical views of graph nodes and the graph-building operations on them.

use std::fmt;
use std::rc::Rc;

use kiln_device::{DeviceSpec, Storage};
use kiln_dtype::{DType, HasDType};
use ndarray::{ArrayD, IxDyn};
use smallvec::SmallVec;
use snafu::{OptionExt, ResultExt, ensure};

use crate::error::*;
use crate::shape::{Shape, is_permutation, validate_shape};
use crate::{
    BinaryOp, BufferId, BufferNode, Graph, LazyOp, MovementOp, OpArg, OpKind, ReduceOp, ShapeTracker, SourceView,
    UnaryOp,
};

/// A logical view of one buffer node.
///
/// `reshape` and `expand` return another view of the same node; every other
/// operation records a new node whose sources are snapshots of the views used.
#[derive(Clone)]
pub struct LazyBuffer {
    graph: Graph,
    id: BufferId,
    tracker: ShapeTracker,
}

impl LazyBuffer {
    pub(crate) fn new(graph: Graph, id: BufferId, tracker: ShapeTracker) -> Self {
        Self { graph, id, tracker }
    }

    /// View of `id` as described by `tracker`.
    pub fn from_source(graph: &Graph, src: &SourceView) -> Self {
        Self::new(graph.clone(), src.id, src.tracker.clone())
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn tracker(&self) -> &ShapeTracker {
        &self.tracker
    }

    pub fn shape(&self) -> &[usize] {
        self.tracker.shape()
    }

    pub fn factors(&self) -> &[usize] {
        self.tracker.factors()
    }

    pub fn rank(&self) -> usize {
        self.tracker.rank()
    }

    pub fn dtype(&self) -> DType {
        self.graph.dtype(self.id)
    }

    pub fn device(&self) -> DeviceSpec {
        self.graph.device(self.id)
    }

    /// Producing operation, `None` for external storage.
    pub fn op(&self) -> Option<LazyOp> {
        self.graph.op(self.id)
    }

    /// Whether the node has storage allocated.
    pub fn is_realized(&self) -> bool {
        self.graph.is_realized(self.id)
    }

    /// Whether the node's storage holds its final contents.
    pub fn is_computed(&self) -> bool {
        self.graph.is_computed(self.id)
    }

    pub fn storage(&self) -> Option<Rc<Storage>> {
        self.graph.storage(self.id)
    }

    /// Snapshot of this view for use as an operation source.
    pub fn source_view(&self) -> SourceView {
        SourceView { id: self.id, tracker: self.tracker.clone() }
    }

    /// The node as laid out in its own storage, without views pushed on top.
    pub fn node_view(&self) -> LazyBuffer {
        self.graph.buffer(self.id)
    }

    fn derive(&self, kind: impl Into<OpKind>, srcs: &[&LazyBuffer], arg: Option<OpArg>, tracker: ShapeTracker) -> Self {
        let op = LazyOp::new(kind, srcs.iter().map(|b| b.source_view()).collect(), arg);
        let node = BufferNode {
            op: Some(op),
            device: self.device(),
            dtype: self.dtype(),
            tracker: tracker.clone(),
            storage: None,
            computed: false,
        };
        Self::new(self.graph.clone(), self.graph.push(node), tracker)
    }

    fn check_compatible(&self, other: &LazyBuffer) -> Result<()> {
        ensure!(self.graph.same_graph(&other.graph), GraphMismatchSnafu);
        ensure!(self.dtype() == other.dtype(), DTypeMismatchSnafu { lhs: self.dtype(), rhs: other.dtype() });
        Ok(())
    }

    /// Record a unary or binary map over this view and `others`.
    ///
    /// All operands must have exactly this view's logical shape; broadcasting
    /// has to be requested beforehand with [`LazyBuffer::expand`].
    pub fn elementwise(&self, op: impl Into<OpKind>, others: &[&LazyBuffer]) -> Result<LazyBuffer> {
        let op = op.into();
        match op {
            OpKind::Unary(_) | OpKind::Binary(_) => {}
            _ => return NotElementwiseSnafu { op }.fail(),
        }
        let actual = others.len() + 1;
        ensure!(actual == op.arity(), ArityMismatchSnafu { op, expected: op.arity(), actual });

        if let OpKind::Binary(BinaryOp::MatMul) = op {
            return self.dot(others[0]);
        }

        for other in others {
            self.check_compatible(other)?;
            ensure!(
                other.shape() == self.shape(),
                ShapeMismatchSnafu {
                    op,
                    expected: Shape::from_slice(self.shape()),
                    actual: Shape::from_slice(other.shape())
                }
            );
        }

        // A map commutes with broadcast: a unary result keeps the source's factors
        // and only touches the unique physical elements.
        let tracker = match op {
            OpKind::Unary(_) => self.tracker.clone(),
            _ => ShapeTracker::from_shape(self.shape()),
        };
        let srcs: SmallVec<[&LazyBuffer; 2]> = std::iter::once(self).chain(others.iter().copied()).collect();
        Ok(self.derive(op, &srcs, None, tracker))
    }

    pub fn unary(&self, op: UnaryOp) -> Result<LazyBuffer> {
        self.elementwise(op, &[])
    }

    pub fn binary(&self, op: BinaryOp, other: &LazyBuffer) -> Result<LazyBuffer> {
        self.elementwise(op, &[other])
    }

    /// Free reinterpretation of the physical storage under a new shape.
    pub fn reshape(&self, shape: &[usize]) -> Result<LazyBuffer> {
        let mut tracker = self.tracker.clone();
        tracker.reshape(shape)?;
        Ok(Self::new(self.graph.clone(), self.id, tracker))
    }

    /// Free broadcast of size-1 dimensions.
    pub fn expand(&self, shape: &[usize]) -> Result<LazyBuffer> {
        let mut tracker = self.tracker.clone();
        tracker.expand(shape)?;
        Ok(Self::new(self.graph.clone(), self.id, tracker))
    }

    /// Reorder dimensions. Realizing the result copies every element.
    pub fn permute(&self, order: &[usize]) -> Result<LazyBuffer> {
        let order = Shape::from_slice(order);
        ensure!(is_permutation(&order, self.rank()), InvalidPermutationSnafu { order, rank: self.rank() });

        let shape: Shape = order.iter().map(|&axis| self.shape()[axis]).collect();
        Ok(self.derive(MovementOp::Permute, &[self], Some(OpArg::Order(order)), ShapeTracker::from_shape(&shape)))
    }

    /// Zero-pad each dimension by `(before, after)` elements.
    pub fn pad(&self, padding: &[(usize, usize)]) -> Result<LazyBuffer> {
        ensure!(padding.len() == self.rank(), InvalidPaddingSnafu { actual: padding.len(), rank: self.rank() });

        let padded: Option<Shape> = self
            .shape()
            .iter()
            .zip(padding)
            .map(|(&d, &(before, after))| d.checked_add(before)?.checked_add(after))
            .collect();
        let shape = validate_shape(&padded.context(InvalidShapeSnafu { shape: Shape::from_slice(self.shape()) })?)?;
        let arg = OpArg::Padding(SmallVec::from_slice(padding));
        Ok(self.derive(MovementOp::Pad, &[self], Some(arg), ShapeTracker::from_shape(&shape)))
    }

    /// Reduce along `dim`, removing it from the shape.
    pub fn reduce(&self, op: ReduceOp, dim: usize) -> Result<LazyBuffer> {
        ensure!(dim < self.rank(), AxisOutOfRangeSnafu { axis: dim, rank: self.rank() });

        let shape: Shape = self.shape().iter().enumerate().filter(|&(d, _)| d != dim).map(|(_, &s)| s).collect();
        Ok(self.derive(op, &[self], Some(OpArg::Axis(dim)), ShapeTracker::from_shape(&shape)))
    }

    pub fn sum(&self, dim: usize) -> Result<LazyBuffer> {
        self.reduce(ReduceOp::Sum, dim)
    }

    pub fn max(&self, dim: usize) -> Result<LazyBuffer> {
        self.reduce(ReduceOp::Max, dim)
    }

    /// Matrix product as a graph composition: broadcast both operands to
    /// `self.shape ++ other.shape[1..]`, multiply, then sum over the shared axis.
    ///
    /// Result shape is `self.shape[..-1] ++ other.shape[1..]`.
    pub fn matmul(&self, other: &LazyBuffer) -> Result<LazyBuffer> {
        let op = OpKind::Binary(BinaryOp::MatMul);
        self.check_compatible(other)?;
        let (rs, ro) = (self.rank(), other.rank());
        ensure!(rs > 0, AxisOutOfRangeSnafu { axis: 0usize, rank: rs });
        ensure!(ro > 0, AxisOutOfRangeSnafu { axis: 0usize, rank: ro });
        ensure!(
            self.shape()[rs - 1] == other.shape()[0],
            ShapeMismatchSnafu {
                op,
                expected: Shape::from_slice(self.shape()),
                actual: Shape::from_slice(other.shape())
            }
        );

        let target: Shape = self.shape().iter().chain(&other.shape()[1..]).copied().collect();
        let lhs = self.with_unit_dims(0, ro - 1).expand(&target)?;
        let rhs = other.with_unit_dims(rs - 1, 0).expand(&target)?;
        lhs.binary(BinaryOp::Mul, &rhs)?.sum(rs - 1)
    }

    /// Same node with size-1 dimensions around the current view, factors kept.
    fn with_unit_dims(&self, leading: usize, trailing: usize) -> LazyBuffer {
        let mut tracker = self.tracker.clone();
        tracker.insert_unit_dims(leading, trailing);
        Self::new(self.graph.clone(), self.id, tracker)
    }

    /// 2-D matrix product as a single `Binary.MatMul` node.
    pub fn dot(&self, other: &LazyBuffer) -> Result<LazyBuffer> {
        let op = OpKind::Binary(BinaryOp::MatMul);
        self.check_compatible(other)?;
        let compatible = self.rank() == 2 && other.rank() == 2 && self.shape()[1] == other.shape()[0];
        ensure!(
            compatible,
            ShapeMismatchSnafu {
                op,
                expected: Shape::from_slice(self.shape()),
                actual: Shape::from_slice(other.shape())
            }
        );

        let shape = validate_shape(&[self.shape()[0], other.shape()[1]])?;
        Ok(self.derive(op, &[self, other], None, ShapeTracker::from_shape(&shape)))
    }

    /// Allocate storage for the node (allocation only, no kernel runs).
    ///
    /// The node stays scheduled until a kernel has written it.
    pub fn realize(&self) -> Result<Rc<Storage>> {
        self.graph.realize(self.id)
    }

    /// Flat physical contents of the node's storage.
    pub fn to_vec<T: HasDType>(&self) -> Result<Vec<T>> {
        let storage = self.storage().context(NotRealizedSnafu { id: self.id })?;
        storage.to_vec::<T>().context(StorageSnafu { id: self.id })
    }

    /// Contents under this view's logical shape, broadcast dimensions re-read.
    pub fn to_ndarray<T: HasDType>(&self) -> Result<ArrayD<T>> {
        let data = self.to_vec::<T>()?;
        let physical = ArrayD::from_shape_vec(IxDyn(&self.tracker.physical_shape()), data)
            .context(LayoutSnafu { id: self.id })?;
        let logical = physical.broadcast(IxDyn(self.shape())).context(ShapeMismatchSnafu {
            op: OpKind::Movement(MovementOp::Expand),
            expected: self.tracker.physical_shape(),
            actual: Shape::from_slice(self.shape()),
        })?;
        Ok(logical.to_owned())
    }
}

impl PartialEq for LazyBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.graph.same_graph(&other.graph) && self.id == other.id && self.tracker == other.tracker
    }
}

impl fmt::Debug for LazyBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyBuffer")
            .field("id", &self.id)
            .field("shape", &self.shape())
            .field("factors", &self.factors())
            .finish()
    }
}

impl fmt::Display for LazyBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.id, self.shape())?;
        if !self.tracker.is_contiguous() {
            write!(f, "/{:?}", self.factors())?;
        }
        Ok(())
    }
}
