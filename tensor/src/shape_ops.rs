//! Movement operations.
//!
//! `reshape` and `expand` only change the view and never become kernels.
//! `permute` and `pad` move data and are realized like any other operation.

use super::*;

impl Tensor {
    /// Reinterpret the tensor's storage under `shape`.
    ///
    /// The element count must match the number of elements actually stored,
    /// so a broadcast tensor has to be realized under a dense op first.
    pub fn try_reshape(&self, shape: &[usize]) -> Result<Tensor> {
        self.buffer.reshape(shape).map(Self::new).context(IrSnafu)
    }

    /// Broadcast size-1 dimensions up to `shape` without copying.
    pub fn try_expand(&self, shape: &[usize]) -> Result<Tensor> {
        self.buffer.expand(shape).map(Self::new).context(IrSnafu)
    }

    /// Reorder dimensions: `result.shape[i] == self.shape[order[i]]`.
    pub fn try_permute(&self, order: &[usize]) -> Result<Tensor> {
        self.buffer.permute(order).map(Self::new).context(IrSnafu)
    }

    /// Zero-pad each dimension by `(before, after)`.
    pub fn try_pad(&self, padding: &[(usize, usize)]) -> Result<Tensor> {
        self.buffer.pad(padding).map(Self::new).context(IrSnafu)
    }

    /// Swap the two last dimensions.
    pub fn transpose(&self) -> Result<Tensor> {
        let rank = self.rank();
        let mut order: Vec<usize> = (0..rank).collect();
        if rank >= 2 {
            order.swap(rank - 2, rank - 1);
        }
        self.try_permute(&order)
    }
}
