//! Common types and constants for memory management

/// Memory alignment requirements
pub mod alignment {
    /// Alignment of every pool obtained from the host heap
    pub const POOL_ALIGN: usize = 16;
}

/// Memory size constants
pub mod size {
    /// 1 Kilobyte
    pub const KB: usize = 1024;

    /// 1 Megabyte
    pub const MB: usize = 1024 * KB;

    /// 1 Gigabyte
    pub const GB: usize = 1024 * MB;

    /// Dynamic heap size used when the memory service gets no configuration,
    /// before pool bookkeeping is added
    pub const DEFAULT_DYNAMIC: usize = 32 * MB;
}
