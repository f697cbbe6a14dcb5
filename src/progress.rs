//! Progress-callback trait for batch conversion events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::InvertConfigBuilder::progress_callback`] to receive
//! events as the batch scheduler finishes each document.
//!
//! # Delivery contract
//!
//! For a batch of N documents, exactly one of
//! [`on_document_complete`](BatchProgressCallback::on_document_complete) or
//! [`on_document_error`](BatchProgressCallback::on_document_error) fires per
//! document, each carrying a `(completed, total)` pair whose `completed`
//! counter is monotonically non-decreasing, followed by a single
//! [`on_batch_complete`](BatchProgressCallback::on_batch_complete) at
//! `(total, total)`, N + 1 notifications in all. Nothing is guaranteed
//! about timing or which document finishes first.
//!
//! The trait is `Send + Sync` because documents complete on different tasks
//! when the batch runs concurrently; implementations must protect their own
//! state (`AtomicUsize`, `Mutex`) accordingly.

use std::sync::Arc;

/// Called by the batch scheduler as documents finish.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any document is converted.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called when a document converts successfully.
    ///
    /// `completed` counts all finished documents so far (successes and
    /// failures combined); `1 <= completed <= total`.
    fn on_document_complete(&self, completed: usize, total: usize, source_name: &str) {
        let _ = (completed, total, source_name);
    }

    /// Called when a document fails.
    ///
    /// The failure is already logged; this hook exists so a UI can surface
    /// per-file errors if it chooses to.
    fn on_document_error(&self, completed: usize, total: usize, source_name: &str, error: &str) {
        let _ = (completed, total, source_name, error);
    }

    /// Called once after every document has been attempted, at
    /// `(total, total)`.
    fn on_batch_complete(&self, total: usize, succeeded: usize) {
        let _ = (total, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::InvertConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
