//! Fatal diagnostics
//!
//! Integrity failures (invariant breaches, foreign pointers, leaks detected at
//! shutdown) are not recoverable. They are logged at ERROR level and then
//! abort the current thread of control with a panic. The workspace release
//! profile sets `panic = "abort"`, so in shipped builds this terminates the
//! process.

use tracing::error;

use crate::error::MemoryError;

/// Logs `error` and terminates.
///
/// The panic payload carries the error code and message so tests can match
/// on it with `#[should_panic(expected = ...)]`.
#[cold]
#[inline(never)]
#[track_caller]
pub fn fatal(error: &MemoryError) -> ! {
    error!(code = error.code(), "fatal memory diagnostic: {error}");
    panic!("fatal memory diagnostic [{}]: {error}", error.code());
}

/// Fires [`fatal`] when `condition` does not hold.
#[macro_export]
macro_rules! fatal_assert {
    ($condition:expr, $error:expr) => {
        if !$condition {
            $crate::diagnostics::fatal(&$error);
        }
    };
}
