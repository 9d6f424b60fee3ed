//! Arena of buffer nodes.
//!
//! Nodes are addressed by stable [`BufferId`] indices and may only reference
//! nodes created before them, so the graph is acyclic by construction.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use kiln_device::{DeviceSpec, Storage};
use kiln_dtype::{DType, HasDType};
use smallvec::SmallVec;
use snafu::{ResultExt, ensure};

use crate::error::{
    DataLengthSnafu, InvalidArgumentSnafu, MissingArgumentSnafu, NotRealizedSnafu, Result, StorageSnafu,
};
use crate::shape::{numel, validate_shape};
use crate::{LazyBuffer, LazyOp, LoadOp, OpArg, OpKind, ShapeTracker};

/// Stable index of a node in its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(usize);

impl BufferId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf{}", self.0)
    }
}

/// One buffer: how it is produced, where it lives and, once realized, its storage.
#[derive(Debug, Clone)]
pub struct BufferNode {
    /// `None` only for externally supplied storage.
    pub op: Option<LazyOp>,
    pub device: DeviceSpec,
    pub dtype: DType,
    /// Layout of the node's own storage.
    pub tracker: ShapeTracker,
    pub storage: Option<Rc<Storage>>,
    /// Storage holds the node's final contents. Allocation alone does not set this.
    pub computed: bool,
}

/// Cheap-clone handle to a shared node arena.
#[derive(Clone, Default)]
pub struct Graph {
    nodes: Rc<RefCell<Vec<BufferNode>>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Whether both handles refer to the same arena.
    pub fn same_graph(&self, other: &Graph) -> bool {
        Rc::ptr_eq(&self.nodes, &other.nodes)
    }

    pub(crate) fn push(&self, node: BufferNode) -> BufferId {
        let mut nodes = self.nodes.borrow_mut();
        let id = BufferId(nodes.len());
        match &node.op {
            Some(op) => tracing::trace!(buffer = %id, op = %op.kind, shape = ?node.tracker.shape(), "buffer created"),
            None => tracing::trace!(buffer = %id, shape = ?node.tracker.shape(), "external buffer created"),
        }
        nodes.push(node);
        id
    }

    /// Run `f` against the node. Panics on an id from another graph.
    pub fn with_node<R>(&self, id: BufferId, f: impl FnOnce(&BufferNode) -> R) -> R {
        f(&self.nodes.borrow()[id.0])
    }

    pub fn op(&self, id: BufferId) -> Option<LazyOp> {
        self.with_node(id, |n| n.op.clone())
    }

    pub fn dtype(&self, id: BufferId) -> DType {
        self.with_node(id, |n| n.dtype)
    }

    pub fn device(&self, id: BufferId) -> DeviceSpec {
        self.with_node(id, |n| n.device)
    }

    pub fn tracker(&self, id: BufferId) -> ShapeTracker {
        self.with_node(id, |n| n.tracker.clone())
    }

    pub fn storage(&self, id: BufferId) -> Option<Rc<Storage>> {
        self.with_node(id, |n| n.storage.clone())
    }

    /// View of `id` as laid out in its own storage.
    pub fn buffer(&self, id: BufferId) -> LazyBuffer {
        LazyBuffer::new(self.clone(), id, self.tracker(id))
    }

    /// Whether storage has been allocated. Says nothing about its contents.
    pub fn is_realized(&self, id: BufferId) -> bool {
        self.with_node(id, |n| n.storage.is_some())
    }

    /// Whether the node's storage holds its final contents: external data, or
    /// the output of a kernel that already ran.
    pub fn is_computed(&self, id: BufferId) -> bool {
        self.with_node(id, |n| n.computed)
    }

    /// Record that a kernel has written the node's storage.
    pub fn mark_computed(&self, id: BufferId) -> Result<()> {
        ensure!(self.is_realized(id), NotRealizedSnafu { id });
        self.nodes.borrow_mut()[id.0].computed = true;
        tracing::trace!(buffer = %id, "buffer computed");
        Ok(())
    }

    /// Allocate storage for `id` sized to its physical element count.
    ///
    /// Storage is created once; later calls return the existing allocation.
    /// The node still needs a kernel run before its contents are meaningful.
    pub fn realize(&self, id: BufferId) -> Result<Rc<Storage>> {
        if let Some(storage) = self.storage(id) {
            return Ok(storage);
        }

        let (dtype, len) = self.with_node(id, |n| (n.dtype, n.tracker.physical_size()));
        let storage = Rc::new(Storage::allocate(dtype, len).context(StorageSnafu { id })?);
        self.nodes.borrow_mut()[id.0].storage = Some(storage.clone());

        tracing::debug!(buffer = %id, %dtype, len, "buffer realized");
        Ok(storage)
    }

    /// Record a source-free operation over `shape` with the default element type.
    pub fn load(&self, op: LoadOp, shape: &[usize], arg: Option<OpArg>) -> Result<LazyBuffer> {
        self.load_with_dtype(op, shape, arg, DType::default())
    }

    pub fn load_with_dtype(&self, op: LoadOp, shape: &[usize], arg: Option<OpArg>, dtype: DType) -> Result<LazyBuffer> {
        let shape = validate_shape(shape)?;
        match (op, &arg) {
            (LoadOp::Empty, None) | (LoadOp::Const, Some(OpArg::Value(_))) | (LoadOp::Rand, Some(OpArg::Seed(_))) => {}
            (LoadOp::Const | LoadOp::Rand, None) => return MissingArgumentSnafu { op }.fail(),
            (_, Some(arg)) => return InvalidArgumentSnafu { op: OpKind::Load(op), arg: arg.clone() }.fail(),
        }

        let tracker = ShapeTracker::from_shape(&shape);
        let node = BufferNode {
            op: Some(LazyOp::new(op, SmallVec::new(), arg)),
            device: DeviceSpec::Cpu,
            dtype,
            tracker: tracker.clone(),
            storage: None,
            computed: false,
        };
        Ok(LazyBuffer::new(self.clone(), self.push(node), tracker))
    }

    /// Wrap external data as an already-realized buffer.
    pub fn from_slice<T: HasDType>(&self, data: &[T], shape: &[usize]) -> Result<LazyBuffer> {
        let shape = validate_shape(shape)?;
        let expected = numel(&shape);
        ensure!(data.len() == expected, DataLengthSnafu { shape: shape.clone(), expected, actual: data.len() });

        // The node is pushed only once storage exists, so it takes the next index.
        let storage = Storage::from_slice(data).context(StorageSnafu { id: BufferId(self.len()) })?;
        let tracker = ShapeTracker::from_shape(&shape);
        let node = BufferNode {
            op: None,
            device: DeviceSpec::Cpu,
            dtype: T::DTYPE,
            tracker: tracker.clone(),
            storage: Some(Rc::new(storage)),
            computed: true,
        };

        Ok(LazyBuffer::new(self.clone(), self.push(node), tracker))
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph").field("nodes", &self.len()).finish()
    }
}
