//! Core functionality for lumen-memory
//!
//! This module contains the fundamental building blocks shared by every
//! allocator:
//! - The allocator contract and lifecycle traits
//! - The host-heap pool each allocator owns
//! - Common types and constants

mod host;
pub mod traits;
pub mod types;

pub(crate) use host::HostPool;
pub use traits::{Allocator, BasicMemoryUsage, Lifecycle, MemoryUsage};
pub use types::*;

/// Core prelude for convenient imports
pub mod prelude {
    pub use super::traits::{Allocator, Lifecycle, MemoryUsage};
    pub use super::types::*;
    pub use crate::error::{MemoryError, MemoryResult};
}
