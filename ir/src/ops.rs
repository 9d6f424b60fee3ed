//! Operation kinds and the lazy operation record.

use std::fmt;

use smallvec::SmallVec;

use crate::{BufferId, ShapeTracker, shape::Shape};

/// Source-free operations that produce a buffer from nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::EnumIter, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LoadOp {
    /// Zero-filled storage.
    Empty,
    /// Every element set to a scalar.
    Const,
    /// Seeded uniform draws in `[0, 1)`.
    Rand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::EnumIter, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum UnaryOp {
    /// Negation: -x
    Neg,
    /// Sine: sin(x)
    Sin,
    /// Square root: √x
    Sqrt,
    /// Base-2 exponential: 2^x
    Exp2,
    /// Base-2 logarithm: log₂(x)
    Log2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::EnumIter, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BinaryOp {
    Mul,
    Add,
    Sub,
    Div,
    Max,
    /// 2-D matrix product, built by [`crate::LazyBuffer::dot`].
    #[strum(serialize = "matmul")]
    MatMul,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::EnumIter, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReduceOp {
    Sum,
    Max,
}

/// Shape-changing operations.
///
/// Reshape and expand only push shape tracker entries and never become nodes.
/// Permute and pad move data and are realized like any other operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::EnumIter, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MovementOp {
    Reshape,
    Expand,
    Permute,
    Pad,
}

/// Closed set of operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Load(LoadOp),
    Unary(UnaryOp),
    Binary(BinaryOp),
    Reduce(ReduceOp),
    Movement(MovementOp),
}

impl OpKind {
    /// Lowercase family name (`load`, `unary`, ...).
    pub fn family(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Unary(_) => "unary",
            Self::Binary(_) => "binary",
            Self::Reduce(_) => "reduce",
            Self::Movement(_) => "movement",
        }
    }

    /// Lowercase operation name within the family.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load(op) => op.into(),
            Self::Unary(op) => op.into(),
            Self::Binary(op) => op.into(),
            Self::Reduce(op) => op.into(),
            Self::Movement(op) => op.into(),
        }
    }

    /// Number of sources the operation consumes.
    pub fn arity(&self) -> usize {
        match self {
            Self::Load(_) => 0,
            Self::Unary(_) | Self::Reduce(_) | Self::Movement(_) => 1,
            Self::Binary(_) => 2,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.family(), self.name())
    }
}

impl From<LoadOp> for OpKind {
    fn from(op: LoadOp) -> Self {
        Self::Load(op)
    }
}

impl From<UnaryOp> for OpKind {
    fn from(op: UnaryOp) -> Self {
        Self::Unary(op)
    }
}

impl From<BinaryOp> for OpKind {
    fn from(op: BinaryOp) -> Self {
        Self::Binary(op)
    }
}

impl From<ReduceOp> for OpKind {
    fn from(op: ReduceOp) -> Self {
        Self::Reduce(op)
    }
}

impl From<MovementOp> for OpKind {
    fn from(op: MovementOp) -> Self {
        Self::Movement(op)
    }
}

/// Scalar or tuple argument attached to an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OpArg {
    Seed(u64),
    Value(f64),
    Axis(usize),
    Order(Shape),
    /// `(before, after)` per dimension.
    Padding(SmallVec<[(usize, usize); 4]>),
}

impl fmt::Display for OpArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seed(seed) => write!(f, "seed={seed}"),
            Self::Value(value) => write!(f, "value={value}"),
            Self::Axis(axis) => write!(f, "axis={axis}"),
            Self::Order(order) => write!(f, "order={order:?}"),
            Self::Padding(padding) => write!(f, "padding={padding:?}"),
        }
    }
}

/// A source as observed by its consumer: the node plus the view taken of it.
///
/// Views pushed on the source after the consumer was built do not leak in.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceView {
    pub id: BufferId,
    pub tracker: ShapeTracker,
}

/// Immutable record of how a buffer is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyOp {
    pub kind: OpKind,
    pub srcs: SmallVec<[SourceView; 2]>,
    pub arg: Option<OpArg>,
}

impl LazyOp {
    pub fn new(kind: impl Into<OpKind>, srcs: SmallVec<[SourceView; 2]>, arg: Option<OpArg>) -> Self {
        Self { kind: kind.into(), srcs, arg }
    }

    pub fn load(op: LoadOp, arg: Option<OpArg>) -> Self {
        Self::new(op, SmallVec::new(), arg)
    }

    pub fn seed(&self) -> Option<u64> {
        match self.arg {
            Some(OpArg::Seed(seed)) => Some(seed),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self.arg {
            Some(OpArg::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn axis(&self) -> Option<usize> {
        match self.arg {
            Some(OpArg::Axis(axis)) => Some(axis),
            _ => None,
        }
    }

    pub fn order(&self) -> Option<&[usize]> {
        match &self.arg {
            Some(OpArg::Order(order)) => Some(order),
            _ => None,
        }
    }

    pub fn padding(&self) -> Option<&[(usize, usize)]> {
        match &self.arg {
            Some(OpArg::Padding(padding)) => Some(padding),
            _ => None,
        }
    }
}
