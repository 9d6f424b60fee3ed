//! C type mapping and constant rendering for the C codegen backend.

use kiln_dtype::DType;
use kiln_ir::ReduceOp;

/// Render a float constant as a C literal of `dtype`.
pub fn c_float(f: f64, dtype: DType) -> String {
    if f.is_nan() {
        return match dtype {
            DType::Float32 => "__builtin_nanf(\"\")".to_string(),
            DType::Float64 => "__builtin_nan(\"\")".to_string(),
        };
    }

    if f.is_infinite() {
        let sign = if f.is_sign_negative() { "-" } else { "" };
        return format!("{sign}{}()", c_math_fn("__builtin_inf", dtype));
    }

    match dtype {
        DType::Float32 => {
            let f32_val = f as f32;
            if f32_val == 0.0 && f.is_sign_negative() {
                "-0.0f".to_string()
            } else if f32_val.is_infinite() {
                // Finite f64 outside the f32 range.
                format!("{}__builtin_inff()", if f32_val < 0.0 { "-" } else { "" })
            } else if f32_val.fract() == 0.0 && f32_val.abs() < 1e15 {
                format!("{:.1}f", f32_val)
            } else {
                format!("{:e}f", f32_val)
            }
        }
        DType::Float64 => {
            if f == 0.0 && f.is_sign_negative() {
                "-0.0".to_string()
            } else if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{:.1}", f)
            } else {
                format!("{:e}", f)
            }
        }
    }
}

/// Math function name with the dtype suffix (`sqrtf` for float, `sqrt` for double).
pub fn c_math_fn(name: &str, dtype: DType) -> String {
    format!("{name}{}", dtype.math_suffix())
}

/// Identity element of a reduction as a C literal.
pub fn c_reduce_identity(op: ReduceOp, dtype: DType) -> String {
    match op {
        ReduceOp::Sum => c_float(0.0, dtype),
        ReduceOp::Max => c_float(f64::NEG_INFINITY, dtype),
    }
}
