//! Loop-nest emission and per-operation C expressions.

use kiln_dtype::DType;
use kiln_ir::{BinaryOp, ReduceOp, UnaryOp};

use super::types::c_math_fn;

/// Accumulates kernel body lines and tracks open loops.
pub struct KernelWriter {
    lines: Vec<String>,
    /// Current indentation depth.
    depth: usize,
    /// Loop variable counter, `ridx0`, `ridx1`, ...
    counter: usize,
}

impl KernelWriter {
    pub fn new() -> Self {
        Self { lines: Vec::new(), depth: 1, counter: 0 }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }

    /// Emit one statement at the current depth.
    pub fn line(&mut self, stmt: impl AsRef<str>) {
        let indent = self.indent();
        self.lines.push(format!("{indent}{}", stmt.as_ref()));
    }

    /// Open `for (long long ridxN = 0; ridxN < end; ridxN++)` and return `ridxN`.
    pub fn open_loop(&mut self, end: usize) -> String {
        let var = format!("ridx{}", self.counter);
        self.counter += 1;
        self.line(format!("for (long long {var} = 0; {var} < {end}; {var}++) {{"));
        self.depth += 1;
        var
    }

    /// One loop per dimension of `shape`, outermost first.
    pub fn open_loops(&mut self, shape: &[usize]) -> Vec<String> {
        shape.iter().map(|&end| self.open_loop(end)).collect()
    }

    pub fn close_loop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    pub fn close_loops(&mut self, count: usize) {
        for _ in 0..count {
            self.close_loop();
        }
    }

    pub fn finish(self) -> Vec<String> {
        self.lines
    }
}

impl Default for KernelWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear index `Σ var_d * stride_d`. Zero strides are skipped, so a broadcast
/// dimension does not advance the index.
pub fn index_expr<S: AsRef<str>>(terms: impl IntoIterator<Item = (S, usize)>) -> String {
    let parts: Vec<String> = terms
        .into_iter()
        .filter(|(_, stride)| *stride != 0)
        .map(|(var, stride)| match stride {
            1 => var.as_ref().to_string(),
            _ => format!("{} * {stride}", var.as_ref()),
        })
        .collect();
    if parts.is_empty() { "0".to_string() } else { parts.join(" + ") }
}

/// Render a unary operation as a C expression.
pub fn render_unary(op: UnaryOp, s: &str, dtype: DType) -> String {
    match op {
        UnaryOp::Neg => format!("(-{s})"),
        UnaryOp::Sin => format!("{}({s})", c_math_fn("sin", dtype)),
        UnaryOp::Sqrt => format!("{}({s})", c_math_fn("sqrt", dtype)),
        UnaryOp::Exp2 => format!("{}({s})", c_math_fn("exp2", dtype)),
        UnaryOp::Log2 => format!("{}({s})", c_math_fn("log2", dtype)),
    }
}

/// Render an elementwise binary operation as a C expression.
///
/// `MatMul` has its own loop nest and never reaches this function.
pub fn render_binary(op: BinaryOp, l: &str, r: &str, dtype: DType) -> String {
    match op {
        BinaryOp::Add => format!("({l} + {r})"),
        BinaryOp::Sub => format!("({l} - {r})"),
        BinaryOp::Mul | BinaryOp::MatMul => format!("({l} * {r})"),
        BinaryOp::Div => format!("({l} / {r})"),
        BinaryOp::Max => format!("{}({l}, {r})", c_math_fn("fmax", dtype)),
    }
}

/// Render a reduce accumulation statement.
pub fn render_reduce_accumulate(op: ReduceOp, acc: &str, val: &str, dtype: DType) -> String {
    match op {
        ReduceOp::Sum => format!("{acc} += {val};"),
        ReduceOp::Max => format!("{acc} = {}({acc}, {val});", c_math_fn("fmax", dtype)),
    }
}
