use super::*;

impl Tensor {
    /// Matrix product built from broadcast, multiply and sum.
    ///
    /// Contracts the last dimension of `self` with the first of `other`;
    /// the result shape is `self.shape[..-1] ++ other.shape[1..]`.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor> {
        self.buffer.matmul(&other.buffer).map(Self::new).context(IrSnafu)
    }

    /// 2-D matrix product as a single kernel.
    pub fn dot(&self, other: &Tensor) -> Result<Tensor> {
        self.buffer.dot(&other.buffer).map(Self::new).context(IrSnafu)
    }
}
