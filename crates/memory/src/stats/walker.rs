//! Pool walkers
//!
//! A walker is handed every block of a pool in address order. Walkers only
//! observe; they never mutate the pool they visit.

use tracing::error;

use super::AllocatorStats;
#[cfg(feature = "debug-ui")]
use crate::debug_ui::DebugUi;
#[cfg(feature = "debug-ui")]
use crate::utils::format_bytes;

/// One block as seen during a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Address of the first usable byte
    pub address: usize,
    /// Usable size in bytes
    pub size: usize,
    /// Whether the block is currently handed out
    pub used: bool,
}

/// Visitor over the blocks of a pool
pub trait PoolWalker {
    /// Called once per block, in address order
    fn visit(&mut self, block: BlockInfo);
}

impl<F: FnMut(BlockInfo)> PoolWalker for F {
    fn visit(&mut self, block: BlockInfo) {
        self(block);
    }
}

/// Walker used at heap shutdown
///
/// Counts live blocks and logs one ERROR line per block still in use.
#[derive(Debug)]
pub struct ExitWalker<'a> {
    stats: &'a mut AllocatorStats,
}

impl<'a> ExitWalker<'a> {
    pub fn new(stats: &'a mut AllocatorStats) -> Self {
        Self { stats }
    }
}

impl PoolWalker for ExitWalker<'_> {
    fn visit(&mut self, block: BlockInfo) {
        self.stats.add_total(block.size);
        if block.used {
            self.stats.add(block.size);
            error!(
                address = format_args!("{:#x}", block.address),
                size = block.size,
                "Found active allocation"
            );
        }
    }
}

/// Walker that renders one text line per block into a [`DebugUi`]
#[cfg(feature = "debug-ui")]
pub struct UiWalker<'a> {
    stats: &'a mut AllocatorStats,
    ui: &'a mut dyn DebugUi,
}

#[cfg(feature = "debug-ui")]
impl<'a> UiWalker<'a> {
    pub fn new(stats: &'a mut AllocatorStats, ui: &'a mut dyn DebugUi) -> Self {
        Self { stats, ui }
    }
}

#[cfg(feature = "debug-ui")]
impl PoolWalker for UiWalker<'_> {
    fn visit(&mut self, block: BlockInfo) {
        self.stats.add_total(block.size);
        if block.used {
            self.stats.add(block.size);
        }
        self.ui.text(&format!(
            "{:#x} {} {}",
            block.address,
            if block.used { "used" } else { "free" },
            format_bytes(block.size)
        ));
    }
}
