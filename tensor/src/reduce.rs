use kiln_ir::ReduceOp;

use super::*;

impl Tensor {
    /// Reduce along `dim`, removing it from the shape.
    pub fn reduce(&self, op: ReduceOp, dim: usize) -> Result<Tensor> {
        self.buffer.reduce(op, dim).map(Self::new).context(IrSnafu)
    }

    pub fn sum(&self, dim: usize) -> Result<Tensor> {
        self.reduce(ReduceOp::Sum, dim)
    }

    pub fn max(&self, dim: usize) -> Result<Tensor> {
        self.reduce(ReduceOp::Max, dim)
    }

    /// Reduce along `dim` keeping it as a size-1 dimension.
    pub fn sum_keepdim(&self, dim: usize) -> Result<Tensor> {
        self.sum(dim)?.try_reshape(&keepdim_shape(self.shape(), dim))
    }

    pub fn max_keepdim(&self, dim: usize) -> Result<Tensor> {
        self.max(dim)?.try_reshape(&keepdim_shape(self.shape(), dim))
    }
}

fn keepdim_shape(shape: &[usize], dim: usize) -> Vec<usize> {
    shape.iter().enumerate().map(|(d, &s)| if d == dim { 1 } else { s }).collect()
}
