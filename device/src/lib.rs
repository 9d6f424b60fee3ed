//! Storage for realized buffers.
//!
//! The only device is the host CPU: kernels are native shared libraries
//! called with raw pointers into [`Storage`].

pub mod device;
pub mod error;
pub mod storage;


pub use device::DeviceSpec;
pub use error::{Error, Result};
pub use storage::Storage;
