//! Element types understood by the kiln graph, kernel synthesizer and runtime.

pub mod ext;


pub use ext::HasDType;

/// Scalar element type of a buffer.
///
/// Only floating point types are supported: every kernel the synthesizer emits
/// (transcendentals, seeded draws, max with `-INFINITY` identity) is float-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(strum::EnumIter, strum::VariantArray, strum::AsRefStr, strum::Display)]
pub enum DType {
    #[default]
    Float32,
    Float64,
}

impl DType {
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// C spelling of the element type.
    pub const fn c_style(&self) -> &'static str {
        match self {
            Self::Float32 => "float",
            Self::Float64 => "double",
        }
    }

    /// Short identifier-safe name used in kernel keys.
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Float32 => "f32",
            Self::Float64 => "f64",
        }
    }

    /// Suffix for `math.h` functions (`sinf` vs `sin`).
    pub const fn math_suffix(&self) -> &'static str {
        match self {
            Self::Float32 => "f",
            Self::Float64 => "",
        }
    }
}
