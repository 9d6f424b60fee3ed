//! Deterministic kernel names.
//!
//! Grammar: `<family>_<op>_<dtype>[_<shape>]{_<shape>_f<factors>}[_<arg>]`,
//! where the bare shape only appears for loads, each source contributes its
//! logical shape and broadcast factors, and dimensions are joined by `x`.
//! Everything that influences the emitted loop nest is part of the name, so
//! equal names always denote interchangeable kernels.

use std::fmt;

use kiln_ir::{OpArg, OpKind};
use kiln_schedule::ScheduleItem;

/// Cache key and entry symbol of a kernel. Always a valid C identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KernelKey(String);

impl KernelKey {
    pub fn for_item(item: &ScheduleItem) -> Self {
        let kind = item.op.kind;
        let mut name = format!("{}_{}_{}", kind.family(), kind.name(), item.target.dtype().short_name());

        if let OpKind::Load(_) = kind {
            write_dims(&mut name, item.target.shape());
        }
        for src in &item.srcs {
            write_dims(&mut name, src.shape());
            name.push_str("_f");
            name.push_str(&join(src.factors(), "x"));
        }

        let suffix = match &item.op.arg {
            None => String::new(),
            Some(OpArg::Seed(seed)) => format!("_seed{seed}"),
            // Bit pattern keeps signs, NaNs and exponents identifier-safe.
            Some(OpArg::Value(value)) => format!("_v{:016x}", value.to_bits()),
            Some(OpArg::Axis(axis)) => format!("_d{axis}"),
            Some(OpArg::Order(order)) => format!("_p{}", join(order, "_")),
            Some(OpArg::Padding(padding)) => {
                let flat: Vec<usize> = padding.iter().flat_map(|&(before, after)| [before, after]).collect();
                format!("_pad{}", join(&flat, "_"))
            }
        };
        name.push_str(&suffix);

        Self(name)
    }

    /// The key as a string, identical to the kernel's entry symbol.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KernelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn write_dims(name: &mut String, shape: &[usize]) {
    name.push('_');
    if shape.is_empty() {
        name.push('s');
    } else {
        name.push_str(&join(shape, "x"));
    }
}

fn join(values: &[usize], sep: &str) -> String {
    values.iter().map(usize::to_string).collect::<Vec<_>>().join(sep)
}
