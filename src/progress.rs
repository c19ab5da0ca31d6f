//! Progress reporting for long-running exports.
//!
//! This module provides a callback-based progress reporting mechanism for
//! callers who want push-based updates while an export runs. The export
//! orchestrator emits [`ProgressUpdate`] values at fixed milestones; percent
//! values are monotone non-decreasing within one run and finish at 100.
//!
//! The orchestrator makes no threading assumptions: callbacks are invoked
//! from whatever context the export runs in, and the caller is responsible
//! for marshaling them back to its own context.
//!
//! # Example
//!
//! ```rust
//! use chatsift::progress::{ProgressUpdate, ProgressFn};
//! use std::sync::Arc;
//!
//! let callback: ProgressFn = Arc::new(|update| {
//!     println!("{:>3}% {}", update.percent, update.message);
//! });
//!
//! callback(&ProgressUpdate::new(50, "Processing message content (500/1000)..."));
//! ```

use std::sync::Arc;

/// One progress milestone emitted during an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Completion percentage, 0-100.
    pub percent: u8,

    /// Human-readable description of the current stage.
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update.
    pub fn new(percent: u8, message: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            message: message.into(),
        }
    }

    /// Returns whether this update marks the end of the run.
    pub fn is_complete(&self) -> bool {
        self.percent >= 100
    }
}

/// Callback type for receiving progress updates.
///
/// Thread-safe so the export can run on a background thread while the caller
/// forwards updates to its own context.
///
/// # Example
///
/// ```rust
/// use chatsift::progress::{ProgressUpdate, ProgressFn};
/// use std::sync::Arc;
///
/// let callback: ProgressFn = Arc::new(|update| {
///     eprintln!("{}% - {}", update.percent, update.message);
/// });
/// callback(&ProgressUpdate::new(5, "Preparing data..."));
/// ```
pub type ProgressFn = Arc<dyn Fn(&ProgressUpdate) + Send + Sync>;

/// Creates a no-op progress callback.
///
/// Useful when you don't need progress updates but an API requires a callback.
pub fn no_progress() -> ProgressFn {
    Arc::new(|_| {})
}

/// Creates a progress callback that prints to stderr.
///
/// Useful for CLI applications that want simple progress output.
pub fn stderr_progress() -> ProgressFn {
    Arc::new(|update| {
        eprintln!("[{:>3}%] {}", update.percent, update.message);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_percent_clamped() {
        let update = ProgressUpdate::new(150, "overshoot");
        assert_eq!(update.percent, 100);
        assert!(update.is_complete());
    }

    #[test]
    fn test_is_complete() {
        assert!(!ProgressUpdate::new(99, "almost").is_complete());
        assert!(ProgressUpdate::new(100, "done").is_complete());
    }

    #[test]
    fn test_no_progress_callback() {
        let callback = no_progress();
        callback(&ProgressUpdate::new(0, "ignored")); // Should not panic
    }

    #[test]
    fn test_callback_receives_updates() {
        let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let callback: ProgressFn = Arc::new(move |update| {
            seen_clone.lock().unwrap().push(update.percent);
        });

        callback(&ProgressUpdate::new(5, "a"));
        callback(&ProgressUpdate::new(100, "b"));
        assert_eq!(*seen.lock().unwrap(), vec![5, 100]);
    }
}
