//! Lazy operation graph for the kiln tensor engine.
//!
//! Building an expression only records nodes; nothing is computed until a
//! schedule is executed by the runtime.
//!
//! # Module Organization
//!
//! - [`ops`] - Operation kinds, arguments and [`LazyOp`]
//! - [`shape`] - Shape type and validation helpers
//! - [`shape_tracker`] - Append-only view stack with broadcast factors
//! - [`graph`] - Buffer arena addressed by [`BufferId`]
//! - [`buffer`] - [`LazyBuffer`] views and graph-building operations
//! - [`error`] - Error types and result handling

pub mod buffer;
pub mod error;
pub mod graph;
pub mod ops;
pub mod shape;
pub mod shape_tracker;


pub use buffer::LazyBuffer;
pub use error::{Error, Result};
pub use graph::{BufferId, BufferNode, Graph};
pub use ops::{BinaryOp, LazyOp, LoadOp, MovementOp, OpArg, OpKind, ReduceOp, SourceView, UnaryOp};
pub use shape::Shape;
pub use shape_tracker::{ShapeTracker, View};

pub use kiln_device::{DeviceSpec, Storage};
pub use kiln_dtype::DType;
