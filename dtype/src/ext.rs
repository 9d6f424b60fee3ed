use super::*;

/// Rust types that have a kiln element type.
///
/// `Copy + 'static` so storage can hand out plain slices of them.
pub trait HasDType: Copy + 'static {
    const DTYPE: DType;
}

macro_rules! impl_dtype_ext {
    ($($ty:ty => $dtype:expr),* $(,)?) => {
        $(impl HasDType for $ty { const DTYPE: DType = $dtype; })*
    };
}

impl_dtype_ext! {
    f32 => DType::Float32,
    f64 => DType::Float64,
}
