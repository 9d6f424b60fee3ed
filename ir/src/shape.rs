//! Concrete shapes.

use smallvec::SmallVec;
use snafu::ensure;

use crate::error::{InvalidShapeSnafu, Result};

/// Dimension sizes, outermost first.
///
/// Inline capacity of 4 covers the ranks the engine deals with in practice.
pub type Shape = SmallVec<[usize; 4]>;

/// Reject shapes with zero-sized dimensions or an element count that does not
/// fit in `usize`. Rank 0 is a valid scalar shape.
pub fn validate_shape(shape: &[usize]) -> Result<Shape> {
    let size = shape.iter().try_fold(1usize, |acc, &d| if d > 0 { acc.checked_mul(d) } else { None });
    ensure!(size.is_some(), InvalidShapeSnafu { shape: Shape::from_slice(shape) });
    Ok(Shape::from_slice(shape))
}

/// Number of elements in `shape` (1 for rank 0).
///
/// Callers pass shapes that went through [`validate_shape`], so the product cannot overflow.
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Row-major strides for a dense buffer of the given shape.
pub fn contiguous_strides(shape: &[usize]) -> Shape {
    let mut strides: Shape = SmallVec::from_elem(1, shape.len());
    for d in (0..shape.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * shape[d + 1];
    }
    strides
}

/// Whether `order` is a permutation of `0..rank`.
pub fn is_permutation(order: &[usize], rank: usize) -> bool {
    if order.len() != rank {
        return false;
    }
    let mut seen: SmallVec<[bool; 8]> = SmallVec::from_elem(false, rank);
    order.iter().all(|&axis| axis < rank && !std::mem::replace(&mut seen[axis], true))
}
