//! # order-confirm-pdf
//!
//! Render multi-page PDF order confirmations from order payloads of unknown
//! shape.
//!
//! ## What it does
//!
//! An order payload is whatever JSON the storefront sent: a build name,
//! customer and order details, and a `buildConfig` describing the house
//! being ordered. Any of it may be missing or of the wrong type. The
//! renderer never rejects a payload over its shape; it prints what it can
//! and falls back to defaults for the rest.
//!
//! ## Pipeline Overview
//!
//! ```text
//! payload
//!  │
//!  ├─ 1. Open      new PdfDocument + its chunk stream, collector attached
//!  ├─ 2. Page 1    instructions: title, details, summary, raw payload dump
//!  ├─ 3. Plan      one page per floor (+ optional feature pages)
//!  ├─ 4. Pages     header, floor body, placeholder, footer
//!  └─ 5. Collect   end the document, concatenate chunks into one buffer
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use order_confirm_pdf::{render_order, OrderPayload, RenderConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let payload = OrderPayload::new(json!({
//!         "buildName": "Lakeside Cabin",
//!         "buildConfig": { "floors": 2, "windowsPerFloor": [4, 3] }
//!     }));
//!     let pdf = render_order(&payload, &RenderConfig::default()).await?;
//!     std::fs::write("order.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `order2pdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! order-confirm-pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod document;
pub mod error;
pub mod job;
pub mod output;
pub mod payload;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::{plan_only, render_order, render_order_detailed, render_order_sync, render_to_file};
pub use config::{PageSize, RenderConfig, RenderConfigBuilder};
pub use error::{OrderPdfError, SinkError};
pub use job::{run_job, FsJobStore, JobOutcome, JobStatus, JobStore};
pub use output::{RenderOutput, RenderStats};
pub use payload::OrderPayload;
pub use pipeline::format::{format, format_date};
pub use pipeline::plan::{FeaturePage, PageContent, PageSpec};
pub use progress::{NoopProgressCallback, ProgressCallback, RenderProgressCallback};
pub use stream::collect;
