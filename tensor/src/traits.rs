//! Operator sugar over the fallible graph-building methods.
//!
//! `a + b` records the same node as `a.try_add(&b)` and panics with the
//! graph error where the method would return it.

use crate::Tensor;

macro_rules! operator {
    ($trait:ident :: $method:ident => $try_method:ident) => {
        operator!(@impl $trait, $method, $try_method, &Tensor, &Tensor);
        operator!(@impl $trait, $method, $try_method, &Tensor, Tensor);
        operator!(@impl $trait, $method, $try_method, Tensor, &Tensor);
        operator!(@impl $trait, $method, $try_method, Tensor, Tensor);
    };
    (@impl $trait:ident, $method:ident, $try_method:ident, $lhs:ty, $rhs:ty) => {
        impl std::ops::$trait<$rhs> for $lhs {
            type Output = Tensor;

            #[track_caller]
            fn $method(self, rhs: $rhs) -> Tensor {
                match Tensor::$try_method(&self, &rhs) {
                    Ok(out) => out,
                    Err(err) => panic!("tensor `{}` failed: {err}", stringify!($method)),
                }
            }
        }
    };
}

operator!(Add::add => try_add);
operator!(Sub::sub => try_sub);
operator!(Mul::mul => try_mul);
operator!(Div::div => try_div);

impl std::ops::Neg for &Tensor {
    type Output = Tensor;

    #[track_caller]
    fn neg(self) -> Tensor {
        match self.try_neg() {
            Ok(out) => out,
            Err(err) => panic!("tensor `neg` failed: {err}"),
        }
    }
}

impl std::ops::Neg for Tensor {
    type Output = Tensor;

    #[track_caller]
    fn neg(self) -> Tensor {
        -&self
    }
}
