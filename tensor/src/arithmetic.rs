use kiln_ir::{BinaryOp, UnaryOp};

use super::*;

/// Implements elementwise tensor operations on top of `LazyBuffer::binary`/`unary`.
///
/// Operands must already have equal shapes; broadcast with [`Tensor::try_expand`].
macro_rules! impl_tensor_ops {
    (
        binary { $($bin_method:ident => $bin_op:ident),* $(,)? }
        unary { $($un_method:ident => $un_op:ident),* $(,)? }
    ) => {
        $(
            #[track_caller]
            pub fn $bin_method(&self, other: &Tensor) -> Result<Tensor> {
                self.buffer.binary(BinaryOp::$bin_op, &other.buffer).map(Self::new).context(IrSnafu)
            }
        )*

        $(
            #[track_caller]
            pub fn $un_method(&self) -> Result<Tensor> {
                self.buffer.unary(UnaryOp::$un_op).map(Self::new).context(IrSnafu)
            }
        )*
    };
}

impl Tensor {
    impl_tensor_ops! {
        binary {
            try_add => Add,
            try_sub => Sub,
            try_mul => Mul,
            try_div => Div,
            try_max => Max,
        }
        unary {
            try_neg => Neg,
            sin => Sin,
            sqrt => Sqrt,
            exp2 => Exp2,
            log2 => Log2,
        }
    }
}
