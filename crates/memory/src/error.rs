//! Standalone error types for lumen-memory
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.
//!
//! Capacity exhaustion is *not* an error in this crate: allocators report it
//! by returning `None` from `acquire`. The variants below cover lifecycle and
//! configuration failures (returned as `Err`) and integrity failures, which
//! are routed through [`crate::diagnostics::fatal`].

use thiserror::Error;

// ============================================================================
// Main Error Types
// ============================================================================

/// Memory management errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    // --- Host heap / layout errors ---
    #[error("Memory allocation failed: {size} bytes with {align} byte alignment")]
    AllocationFailed { size: usize, align: usize },

    #[error("Invalid memory layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("Invalid alignment: {alignment} (must be a power of two)")]
    InvalidAlignment { alignment: usize },

    #[error("Size overflow during operation: {operation}")]
    SizeOverflow { operation: String },

    // --- Configuration ---
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // --- Lifecycle ---
    #[error("{allocator} used before init()")]
    NotInitialized { allocator: &'static str },

    #[error("{allocator} is already initialized; call shutdown() first")]
    AlreadyInitialized { allocator: &'static str },

    // --- Integrity ---
    #[error("Invalid operation: {reason}")]
    InvalidOperation { reason: String },

    #[error("Memory leak on shutdown: {allocated_bytes} bytes still allocated in {allocation_count} block(s)")]
    LeakOnShutdown {
        allocated_bytes: usize,
        allocation_count: usize,
    },
}

impl MemoryError {
    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AllocationFailed { .. } => "MEM:ALLOC:FAILED",
            Self::InvalidLayout { .. } => "MEM:ALLOC:LAYOUT",
            Self::InvalidAlignment { .. } => "MEM:ALLOC:ALIGN",
            Self::SizeOverflow { .. } => "MEM:ALLOC:OVERFLOW",
            Self::InvalidConfig { .. } => "MEM:CONFIG:INVALID",
            Self::NotInitialized { .. } => "MEM:LIFECYCLE:UNINIT",
            Self::AlreadyInitialized { .. } => "MEM:LIFECYCLE:REINIT",
            Self::InvalidOperation { .. } => "MEM:INVALID_OP",
            Self::LeakOnShutdown { .. } => "MEM:SHUTDOWN:LEAK",
        }
    }

    /// Whether this error describes a broken invariant rather than a
    /// recoverable condition
    #[must_use]
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidOperation { .. }
                | Self::InvalidAlignment { .. }
                | Self::NotInitialized { .. }
                | Self::LeakOnShutdown { .. }
        )
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create allocation failed error
    pub fn allocation_failed(size: usize, align: usize) -> Self {
        Self::AllocationFailed { size, align }
    }

    /// Create invalid layout error
    pub fn invalid_layout(reason: &str) -> Self {
        Self::InvalidLayout {
            reason: reason.to_string(),
        }
    }

    /// Create invalid alignment error
    pub fn invalid_alignment(alignment: usize) -> Self {
        Self::InvalidAlignment { alignment }
    }

    /// Create size overflow error
    pub fn size_overflow(operation: &str) -> Self {
        Self::SizeOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create not-initialized error
    pub fn not_initialized(allocator: &'static str) -> Self {
        Self::NotInitialized { allocator }
    }

    /// Create already-initialized error
    pub fn already_initialized(allocator: &'static str) -> Self {
        Self::AlreadyInitialized { allocator }
    }

    /// Create invalid operation error
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }

    /// Create leak-on-shutdown error
    pub fn leak_on_shutdown(allocated_bytes: usize, allocation_count: usize) -> Self {
        Self::LeakOnShutdown {
            allocated_bytes,
            allocation_count,
        }
    }
}

impl From<serde_json::Error> for MemoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_config(format!("malformed configuration: {err}"))
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for memory operations
pub type MemoryResult<T> = core::result::Result<T, MemoryError>;

/// Generic result type alias
pub type Result<T> = MemoryResult<T>;

// ============================================================================
// Tests
// ============================================================================
