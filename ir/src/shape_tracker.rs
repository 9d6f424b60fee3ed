//! Append-only stack of logical views with per-dimension broadcast factors.
//!
//! A factor of `1` means the dimension is backed by real storage. A factor
//! `f > 1` means the logical extent is `f` times the physical one and the
//! storage is re-read along that dimension. Since expand only grows size-1
//! dimensions, a broadcast dimension always has physical extent 1.

use smallvec::{SmallVec, smallvec};
use snafu::ensure;

use crate::error::{Result, ShapeMismatchSnafu};
use crate::shape::{Shape, contiguous_strides, numel, validate_shape};
use crate::{MovementOp, OpKind};

/// One entry of the tracker: logical shape and broadcast factors of equal rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct View {
    pub shape: Shape,
    pub factors: Shape,
}

impl View {
    fn dense(shape: &[usize]) -> Self {
        Self { shape: Shape::from_slice(shape), factors: smallvec![1; shape.len()] }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeTracker {
    views: SmallVec<[View; 2]>,
}

impl ShapeTracker {
    /// Single dense view over `shape`.
    pub fn from_shape(shape: &[usize]) -> Self {
        Self { views: smallvec![View::dense(shape)] }
    }

    fn current(&self) -> &View {
        // `views` is never empty: constructed with one entry and only pushed to.
        &self.views[self.views.len() - 1]
    }

    /// Full view history, oldest first.
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Current logical shape.
    pub fn shape(&self) -> &[usize] {
        &self.current().shape
    }

    /// Current broadcast factors.
    pub fn factors(&self) -> &[usize] {
        &self.current().factors
    }

    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Shape of the storage actually backing the current view.
    pub fn physical_shape(&self) -> Shape {
        let view = self.current();
        view.shape.iter().zip(&view.factors).map(|(&s, &f)| s / f).collect()
    }

    pub fn physical_size(&self) -> usize {
        numel(&self.physical_shape())
    }

    pub fn logical_size(&self) -> usize {
        numel(self.shape())
    }

    /// Element strides into physical storage, `0` on broadcast dimensions.
    pub fn strides(&self) -> Shape {
        let mut strides = contiguous_strides(&self.physical_shape());
        for (stride, &factor) in strides.iter_mut().zip(self.factors()) {
            if factor > 1 {
                *stride = 0;
            }
        }
        strides
    }

    /// True when no dimension is broadcast.
    pub fn is_contiguous(&self) -> bool {
        self.factors().iter().all(|&f| f == 1)
    }

    /// Reinterpret the physical storage under `shape`.
    ///
    /// The element count must equal the current physical size; factors reset to 1.
    pub fn reshape(&mut self, shape: &[usize]) -> Result<()> {
        let shape = validate_shape(shape)?;
        ensure!(
            numel(&shape) == self.physical_size(),
            ShapeMismatchSnafu {
                op: OpKind::Movement(MovementOp::Reshape),
                expected: self.physical_shape(),
                actual: shape
            }
        );

        self.views.push(View::dense(&shape));
        Ok(())
    }

    /// Surround the current view with `leading` and `trailing` size-1 dimensions.
    ///
    /// Unlike [`ShapeTracker::reshape`] this keeps the broadcast factors, so it
    /// also applies to views whose logical size exceeds the physical one.
    pub fn insert_unit_dims(&mut self, leading: usize, trailing: usize) {
        let current = self.current();
        let pad = |dims: &[usize]| -> Shape {
            let ones = |n| std::iter::repeat_n(1, n);
            ones(leading).chain(dims.iter().copied()).chain(ones(trailing)).collect()
        };
        let view = View { shape: pad(&current.shape), factors: pad(&current.factors) };
        self.views.push(view);
    }

    /// Broadcast size-1 dimensions of the current view up to `shape`.
    pub fn expand(&mut self, shape: &[usize]) -> Result<()> {
        let shape = validate_shape(shape)?;
        let current = self.current();
        let compatible = shape.len() == current.shape.len()
            && current.shape.iter().zip(&shape).all(|(&cur, &new)| cur == new || cur == 1);
        ensure!(
            compatible,
            ShapeMismatchSnafu {
                op: OpKind::Movement(MovementOp::Expand),
                expected: current.shape.clone(),
                actual: shape
            }
        );

        let factors =
            current.shape.iter().zip(&shape).zip(&current.factors).map(|((&cur, &new), &f)| new / cur * f).collect();
        self.views.push(View { shape, factors });
        Ok(())
    }
}
