//! Kernel synthesis for kiln schedule items.
//!
//! Every [`kiln_schedule::ScheduleItem`] becomes one native function over raw
//! element pointers: output first, then sources in operation order.
//!
//! # Architecture
//!
//! - **Traits**: backend interface ([`Renderer`])
//! - **Key**: deterministic kernel names ([`KernelKey`]) that double as entry symbols
//! - **C**: loop-nest C99 backend compiled by the runtime's toolchain
//!
//! # Usage
//!
//! ```ignore
//! use kiln_codegen::c;
//!
//! let kernel = c::render(&schedule[0])?;
//! println!("{}", kernel.source);
//! ```

pub mod c;
pub mod error;
pub mod key;
pub mod rand;
pub mod traits;
pub mod types;


pub use error::*;
pub use key::KernelKey;
pub use traits::*;
pub use types::*;
