//! C source code generation backend.
//!
//! Emits one C99 translation unit per schedule item, suitable for compilation
//! with `clang -shared -O2` and loading via `dlopen`.
//!
//! # Kernel Signature
//!
//! ```c
//! void <key>(float* restrict out, const float* restrict in0, ...);
//! ```
//! - `out` = target storage, sized to the target's physical element count
//! - `inK` = storage of source `K`, read through that source's view strides

pub mod ops;
pub mod types;

use kiln_dtype::DType;
use kiln_ir::shape::{contiguous_strides, numel};
use kiln_ir::{BinaryOp, LazyBuffer, LoadOp, MovementOp, OpKind, ReduceOp, UnaryOp};
use kiln_schedule::ScheduleItem;
use snafu::{OptionExt, ensure};

use crate::error::{ArityMismatchSnafu, DTypeMismatchSnafu, MissingArgumentSnafu, UnsupportedOperationSnafu};
use crate::rand::C_SPLITMIX64;
use crate::{KernelKey, RenderedKernel, Result};

use self::ops::{KernelWriter, index_expr, render_binary, render_reduce_accumulate, render_unary};
use self::types::{c_float, c_reduce_identity};

/// C source code renderer for CPU execution via the system toolchain.
pub struct CRenderer;

impl CRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::Renderer for CRenderer {
    fn render(&self, item: &ScheduleItem) -> Result<RenderedKernel> {
        let op = item.op.kind;
        let dtype = item.target.dtype();
        let arity = item.srcs.len();
        ensure!(arity == op.arity(), ArityMismatchSnafu { op, expected: op.arity(), actual: arity });
        for src in &item.srcs {
            ensure!(src.dtype() == dtype, DTypeMismatchSnafu { op, expected: dtype, actual: src.dtype() });
        }

        let key = KernelKey::for_item(item);
        let mut w = KernelWriter::new();
        match op {
            OpKind::Load(load) => render_load(&mut w, item, load, dtype)?,
            OpKind::Unary(unary) => render_map(&mut w, &item.srcs[0], unary, dtype),
            OpKind::Binary(BinaryOp::MatMul) => render_matmul(&mut w, &item.srcs[0], &item.srcs[1], dtype),
            OpKind::Binary(binary) => render_zip(&mut w, &item.srcs[0], &item.srcs[1], binary, dtype),
            OpKind::Reduce(reduce) => {
                let axis = item.op.axis().context(MissingArgumentSnafu { op })?;
                render_reduce(&mut w, &item.srcs[0], item.target.shape(), reduce, axis, dtype)
            }
            OpKind::Movement(MovementOp::Permute) => {
                let order = item.op.order().context(MissingArgumentSnafu { op })?;
                render_permute(&mut w, &item.srcs[0], item.target.shape(), order)
            }
            OpKind::Movement(MovementOp::Pad) => {
                let padding = item.op.padding().context(MissingArgumentSnafu { op })?;
                render_pad(&mut w, &item.srcs[0], item.target.shape(), padding, dtype)
            }
            OpKind::Movement(MovementOp::Reshape | MovementOp::Expand) => {
                return UnsupportedOperationSnafu { op, reason: "view changes are resolved by the shape tracker" }
                    .fail();
            }
        }

        let mut lines = vec!["#include <math.h>".to_string(), String::new()];
        if op == OpKind::Load(LoadOp::Rand) {
            lines.push(C_SPLITMIX64.to_string());
            lines.push(String::new());
        }
        lines.push(signature(&key, dtype, arity));
        lines.extend(w.finish());
        lines.push("}".to_string());
        lines.push(String::new());
        let source = lines.join("\n");

        tracing::debug!(kernel.name = %key, backend = self.backend_name(), "kernel rendered");
        tracing::trace!(kernel.name = %key, %source, "kernel source");

        Ok(RenderedKernel { key, source, arity, dtype })
    }

    fn backend_name(&self) -> &str {
        "c"
    }
}

/// Public render function for the C backend.
pub fn render(item: &ScheduleItem) -> Result<RenderedKernel> {
    crate::Renderer::render(&CRenderer::new(), item)
}

fn signature(key: &KernelKey, dtype: DType, arity: usize) -> String {
    let ty = dtype.c_style();
    let mut params = vec![format!("{ty}* restrict out")];
    params.extend((0..arity).map(|i| format!("const {ty}* restrict in{i}")));
    format!("void {key}({}) {{", params.join(", "))
}

/// Flat loop over the target's physical elements.
fn render_load(w: &mut KernelWriter, item: &ScheduleItem, load: LoadOp, dtype: DType) -> Result<()> {
    let op = item.op.kind;
    let i = w.open_loop(item.target.tracker().physical_size());
    let value = match load {
        // Storage is zeroed on allocation; writing zeros keeps the kernel re-entrant.
        LoadOp::Empty => c_float(0.0, dtype),
        LoadOp::Const => c_float(item.op.value().context(MissingArgumentSnafu { op })?, dtype),
        LoadOp::Rand => {
            let seed = item.op.seed().context(MissingArgumentSnafu { op })?;
            let draw = format!("kiln_splitmix64({seed}ULL, (unsigned long long){i})");
            match dtype {
                DType::Float32 => format!("(float)({draw} >> 40) * 0x1.0p-24f"),
                DType::Float64 => format!("(double)({draw} >> 11) * 0x1.0p-53"),
            }
        }
    };
    w.line(format!("out[{i}] = {value};"));
    w.close_loop();
    Ok(())
}

/// Unary maps run over the source's unique physical elements only; the output
/// keeps the source's broadcast factors.
fn render_map(w: &mut KernelWriter, src: &LazyBuffer, op: UnaryOp, dtype: DType) {
    let i = w.open_loop(src.tracker().physical_size());
    w.line(format!("out[{i}] = {};", render_unary(op, &format!("in0[{i}]"), dtype)));
    w.close_loop();
}

/// Binary maps iterate the full logical shape; each operand advances only
/// along its non-broadcast dimensions.
fn render_zip(w: &mut KernelWriter, lhs: &LazyBuffer, rhs: &LazyBuffer, op: BinaryOp, dtype: DType) {
    let shape = lhs.shape();
    let vars = w.open_loops(shape);
    let out = index_expr(vars.iter().zip(contiguous_strides(shape)));
    let l = index_expr(vars.iter().zip(lhs.tracker().strides()));
    let r = index_expr(vars.iter().zip(rhs.tracker().strides()));
    w.line(format!("out[{out}] = {};", render_binary(op, &format!("in0[{l}]"), &format!("in1[{r}]"), dtype)));
    w.close_loops(vars.len());
}

fn render_reduce(w: &mut KernelWriter, src: &LazyBuffer, out_shape: &[usize], op: ReduceOp, axis: usize, dtype: DType) {
    // Output is initialised here rather than relying on zeroed storage, which
    // would be wrong for max over negative inputs.
    let i = w.open_loop(numel(out_shape));
    w.line(format!("out[{i}] = {};", c_reduce_identity(op, dtype)));
    w.close_loop();

    let vars = w.open_loops(src.shape());
    let out_strides = contiguous_strides(out_shape);
    let kept = vars.iter().enumerate().filter(|&(d, _)| d != axis).map(|(_, var)| var);
    let out = index_expr(kept.zip(out_strides));
    let input = index_expr(vars.iter().zip(src.tracker().strides()));
    w.line(render_reduce_accumulate(op, &format!("out[{out}]"), &format!("in0[{input}]"), dtype));
    w.close_loops(vars.len());
}

/// Iterate the source shape and scatter each element to its permuted position.
fn render_permute(w: &mut KernelWriter, src: &LazyBuffer, out_shape: &[usize], order: &[usize]) {
    let vars = w.open_loops(src.shape());
    let out = index_expr(order.iter().map(|&axis| &vars[axis]).zip(contiguous_strides(out_shape)));
    let input = index_expr(vars.iter().zip(src.tracker().strides()));
    w.line(format!("out[{out}] = in0[{input}];"));
    w.close_loops(vars.len());
}

fn render_pad(w: &mut KernelWriter, src: &LazyBuffer, out_shape: &[usize], padding: &[(usize, usize)], dtype: DType) {
    let i = w.open_loop(numel(out_shape));
    w.line(format!("out[{i}] = {};", c_float(0.0, dtype)));
    w.close_loop();

    let vars = w.open_loops(src.shape());
    let shifted = vars.iter().zip(padding).map(|(var, &(before, _))| match before {
        0 => var.clone(),
        _ => format!("({var} + {before})"),
    });
    let out = index_expr(shifted.zip(contiguous_strides(out_shape)));
    let input = index_expr(vars.iter().zip(src.tracker().strides()));
    w.line(format!("out[{out}] = in0[{input}];"));
    w.close_loops(vars.len());
}

/// `out[m, n] = Σ_k a[m, k] * b[k, n]` with a local accumulator.
fn render_matmul(w: &mut KernelWriter, a: &LazyBuffer, b: &LazyBuffer, dtype: DType) {
    let (m, k, n) = (a.shape()[0], a.shape()[1], b.shape()[1]);
    let (sa, sb) = (a.tracker().strides(), b.tracker().strides());

    let rm = w.open_loop(m);
    let rn = w.open_loop(n);
    w.line(format!("{} acc = {};", dtype.c_style(), c_float(0.0, dtype)));
    let rk = w.open_loop(k);
    let l = index_expr([(&rm, sa[0]), (&rk, sa[1])]);
    let r = index_expr([(&rk, sb[0]), (&rn, sb[1])]);
    w.line(format!("acc += in0[{l}] * in1[{r}];"));
    w.close_loop();
    let out = index_expr([(&rm, n), (&rn, 1)]);
    w.line(format!("out[{out}] = acc;"));
    w.close_loops(2);
}
