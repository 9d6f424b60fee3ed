use std::fmt;

use kiln_ir::{LazyBuffer, LazyOp, OpKind};
use smallvec::SmallVec;
use snafu::OptionExt;

use crate::error::{MissingOperationSnafu, Result};

/// One buffer to compute: its operation, the target node and the source views.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleItem {
    pub op: LazyOp,
    /// Target as laid out in its own storage.
    pub target: LazyBuffer,
    /// Sources in operation order, each as the view the operation observed.
    pub srcs: SmallVec<[LazyBuffer; 2]>,
}

impl ScheduleItem {
    pub fn kind(&self) -> OpKind {
        self.op.kind
    }
}

impl fmt::Display for ScheduleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}(", self.target, self.op.kind)?;
        for (i, src) in self.srcs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{src}")?;
        }
        write!(f, ")")?;
        if let Some(arg) = &self.op.arg {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

pub type Schedule = Vec<ScheduleItem>;

/// Linearize everything needed to realize `buffer`.
///
/// Iterative post-order DFS: each node is emitted after all of its sources
/// and at most once, however many consumers share it. Computed nodes (external
/// data, earlier results) are neither emitted nor traversed. Nodes that only
/// have storage allocated are still scheduled.
pub fn create_schedule(buffer: &LazyBuffer) -> Result<Schedule> {
    let graph = buffer.graph();
    let mut visited = vec![false; graph.len()];
    let mut schedule = Schedule::new();
    let mut stack = vec![(buffer.id(), false)];

    while let Some((id, processed)) = stack.pop() {
        if visited[id.index()] {
            continue;
        }

        if graph.is_computed(id) {
            visited[id.index()] = true;
            continue;
        }

        let op = graph.op(id).context(MissingOperationSnafu { id })?;
        if processed {
            visited[id.index()] = true;
            let target = graph.buffer(id);
            let srcs = op.srcs.iter().map(|src| LazyBuffer::from_source(graph, src)).collect();
            schedule.push(ScheduleItem { op, target, srcs });
        } else {
            stack.push((id, true));
            // Reverse so sources are emitted in operation order.
            for src in op.srcs.iter().rev() {
                if !visited[src.id.index()] {
                    stack.push((src.id, false));
                }
            }
        }
    }

    tracing::debug!(buffer = %buffer.id(), items = schedule.len(), "schedule created");
    Ok(schedule)
}

pub trait ScheduleExt {
    fn schedule(&self) -> Result<Schedule>;
}

impl ScheduleExt for LazyBuffer {
    fn schedule(&self) -> Result<Schedule> {
        create_schedule(self)
    }
}
