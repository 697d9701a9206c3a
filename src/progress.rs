//! Progress-callback trait for per-page render events.
//!
//! Inject an [`Arc<dyn RenderProgressCallback>`] via
//! [`crate::config::RenderConfigBuilder::progress_callback`] to be told as
//! the assembler emits each page. The CLI uses it for its page log; a job
//! runner could forward the events to a status table.
//!
//! # Example
//!
//! ```rust
//! use order_confirm_pdf::{RenderConfig, RenderProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: Arc<AtomicUsize>,
//! }
//!
//! impl RenderProgressCallback for CountingCallback {
//!     fn on_page_rendered(&self, page_number: usize, title: &str) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {page_number}: {title}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     rendered: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = RenderConfig::builder()
//!     .progress_callback(counter as Arc<dyn RenderProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the document assembler as it renders each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait RenderProgressCallback: Send + Sync {
    /// Called once the page plan is known, before dynamic pages render.
    ///
    /// # Arguments
    /// * `planned_pages`: instructions page plus planned pages
    fn on_render_start(&self, planned_pages: usize) {
        let _ = planned_pages;
    }

    /// Called after each logical page has been drawn.
    ///
    /// # Arguments
    /// * `page_number`: 1 for the instructions page, then 2, 3, …
    /// * `title`       page title
    fn on_page_rendered(&self, page_number: usize, title: &str) {
        let _ = (page_number, title);
    }

    /// Called once the document has been collected into a buffer.
    ///
    /// # Arguments
    /// * `physical_pages`: pages in the PDF, including overflow pages
    /// * `bytes`          size of the finished document
    fn on_render_complete(&self, physical_pages: usize, bytes: usize) {
        let _ = (physical_pages, bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RenderProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RenderConfig`].
pub type ProgressCallback = Arc<dyn RenderProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_render_start(3);
        cb.on_page_rendered(1, "Order Confirmation");
        cb.on_render_complete(3, 1024);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_render_start(2);
        cb.on_page_rendered(2, "Floor 1");
    }
}
