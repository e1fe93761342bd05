//! Memory service configuration

use serde::{Deserialize, Serialize};

use crate::core::types::size::DEFAULT_DYNAMIC;
use crate::error::{MemoryError, MemoryResult};
use crate::tlsf::{BLOCK_SIZE_MAX, BLOCK_SIZE_MIN, Tlsf};

/// Heap size used when [`MemoryService::init`](super::MemoryService::init)
/// gets no configuration
pub const DEFAULT_MAXIMUM_DYNAMIC_SIZE: usize = DEFAULT_DYNAMIC + Tlsf::size_overhead() + 8;

/// Configuration for the memory service
///
/// Missing fields take their defaults, so `{}` is a valid document.
///
/// ```
/// use lumen_memory::service::MemoryServiceConfiguration;
///
/// let config = MemoryServiceConfiguration::from_json(r#"{ "maximum_dynamic_size": 1048576 }"#)?;
/// assert_eq!(config.maximum_dynamic_size, 1024 * 1024);
/// # Ok::<(), lumen_memory::MemoryError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryServiceConfiguration {
    /// Size in bytes of the pool backing the system heap
    pub maximum_dynamic_size: usize,
}

impl Default for MemoryServiceConfiguration {
    fn default() -> Self {
        Self {
            maximum_dynamic_size: DEFAULT_MAXIMUM_DYNAMIC_SIZE,
        }
    }
}

impl MemoryServiceConfiguration {
    pub fn new(maximum_dynamic_size: usize) -> Self {
        Self {
            maximum_dynamic_size,
        }
    }

    /// Parses and validates a JSON document
    pub fn from_json(json: &str) -> MemoryResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> MemoryResult<String> {
        serde_json::to_string_pretty(self).map_err(MemoryError::from)
    }

    /// Rejects heap sizes the TLSF pool cannot be built over
    pub fn validate(&self) -> MemoryResult<()> {
        let minimum = Tlsf::size_overhead() + BLOCK_SIZE_MIN;
        if self.maximum_dynamic_size < minimum {
            return Err(MemoryError::invalid_config(format!(
                "maximum_dynamic_size must be at least {minimum} bytes, got {}",
                self.maximum_dynamic_size
            )));
        }
        if self.maximum_dynamic_size >= BLOCK_SIZE_MAX {
            return Err(MemoryError::invalid_config(format!(
                "maximum_dynamic_size must be below {BLOCK_SIZE_MAX} bytes, got {}",
                self.maximum_dynamic_size
            )));
        }
        Ok(())
    }
}
