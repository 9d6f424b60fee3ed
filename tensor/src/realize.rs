//! Tensor realization (execution) API.
//!
//! 1. **Scheduling** - linearize every unrealized buffer the tensor depends on
//! 2. **Compilation** - render and compile one kernel per schedule item
//! 3. **Execution** - allocate each target and run its kernel in order

use kiln_runtime::Runner;
use kiln_schedule::{Schedule, ScheduleExt};
use ndarray::ArrayD;

use super::*;

impl Tensor {
    /// Realize this tensor on the thread's default runner.
    ///
    /// Already realized buffers are reused, so realizing twice is cheap.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3])?;
    /// let b = Tensor::from_slice(&[4.0f32, 5.0, 6.0], &[3])?;
    /// let c = (&a + &b).realize()?;
    /// // c's buffer now contains [5.0, 7.0, 9.0]
    /// ```
    pub fn realize(self) -> Result<Self> {
        RUNNER.with(|runner| self.realize_with(runner))
    }

    /// Realize this tensor with an explicit runner.
    pub fn realize_with(self, runner: &Runner) -> Result<Self> {
        let schedule = self.schedule()?;
        tracing::debug!(buffer = %self.buffer.id(), num_items = schedule.len(), "realizing tensor");
        runner.execute(&schedule).context(RuntimeSnafu)?;
        Ok(self)
    }

    /// Items that realizing this tensor would execute, sources first.
    pub fn schedule(&self) -> Result<Schedule> {
        self.buffer.schedule().context(ScheduleSnafu)
    }

    /// Flat physical contents. Requires a realized tensor.
    pub fn to_vec<T: HasDType>(&self) -> Result<Vec<T>> {
        self.buffer.to_vec::<T>().context(IrSnafu)
    }

    /// Contents under the logical shape, broadcast dimensions re-read.
    /// Requires a realized tensor.
    pub fn to_ndarray<T: HasDType>(&self) -> Result<ArrayD<T>> {
        self.buffer.to_ndarray::<T>().context(IrSnafu)
    }
}
