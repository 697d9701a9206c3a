//! Document assembly: payload in, finished PDF bytes out.
//!
//! Every render follows the same fixed sequence:
//!
//! ```text
//! open ──▶ instructions ──▶ plan ──▶ pages ──▶ end ──▶ collect
//!  │        (page 1)                 (2..)      │        ▲
//!  └──────────────── chunk stream ──────────────┴────────┘
//! ```
//!
//! The chunk stream comes out of [`PdfDocument::open`] together with the
//! document, and the collector owns it from that point on. Drawing is
//! synchronous; the one suspension point is awaiting the collector after
//! [`PdfDocument::end`]. Each call builds its own document and buffer.

use crate::config::RenderConfig;
use crate::document::pdf::PdfDocument;
use crate::document::DocumentSink;
use crate::error::OrderPdfError;
use crate::output::{RenderOutput, RenderStats};
use crate::payload::OrderPayload;
use crate::pipeline::instructions::render_instructions;
use crate::pipeline::pages::{render_page, RenderContext};
use crate::pipeline::plan::{self, PageSpec};
use crate::stream;
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// Render an order confirmation PDF.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Only stream failures: [`OrderPdfError::Stream`] or
/// [`OrderPdfError::StreamClosed`]. Payload shape never causes an error.
pub async fn render_order(payload: &OrderPayload, config: &RenderConfig) -> Result<Vec<u8>, OrderPdfError> {
    Ok(render_order_detailed(payload, config).await?.pdf)
}

/// Like [`render_order`], but also returns the plan and render statistics.
pub async fn render_order_detailed(
    payload: &OrderPayload,
    config: &RenderConfig,
) -> Result<RenderOutput, OrderPdfError> {
    let span = info_span!("render", request_id = %Uuid::new_v4());
    render_inner(payload, config).instrument(span).await
}

async fn render_inner(payload: &OrderPayload, config: &RenderConfig) -> Result<RenderOutput, OrderPdfError> {
    let start = Instant::now();
    let ctx = RenderContext::new(config, Utc::now());

    // ── Step 1: Open the document with its collector attached ────────────
    let (mut doc, chunks) = PdfDocument::open(config.layout());
    let collected = stream::collect(chunks);

    // ── Step 2: Instructions page ────────────────────────────────────────
    render_instructions(&mut doc, payload, &ctx);

    // ── Step 3: Plan the dynamic pages ───────────────────────────────────
    let pages = plan::plan(payload, config);
    let planned_pages = pages.len() + 1;
    info!("Rendering order document: {} planned pages", planned_pages);
    if let Some(ref cb) = config.progress_callback {
        cb.on_render_start(planned_pages);
        cb.on_page_rendered(1, "Order Confirmation");
    }

    // ── Step 4: Render each planned page in order ────────────────────────
    for spec in &pages {
        render_page(&mut doc, spec, payload, &ctx);
        debug!("Rendered page {}: {}", spec.page_number, spec.title);
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_rendered(spec.page_number, &spec.title);
        }
    }

    // ── Step 5: Finalise and collect ─────────────────────────────────────
    let physical_pages = doc.page_count();
    doc.end();
    let pdf = collected.await?;

    let stats = RenderStats {
        planned_pages,
        physical_pages,
        bytes: pdf.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Render complete: {} pages, {} bytes, {}ms",
        stats.physical_pages, stats.bytes, stats.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_render_complete(stats.physical_pages, stats.bytes);
    }

    Ok(RenderOutput { pdf, pages, stats })
}

/// Render an order and write the PDF to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn render_to_file(
    payload: &OrderPayload,
    output_path: impl AsRef<Path>,
    config: &RenderConfig,
) -> Result<RenderStats, OrderPdfError> {
    let output = render_order_detailed(payload, config).await?;
    write_atomic(output_path.as_ref(), &output.pdf).await?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`render_order`].
///
/// Creates a temporary tokio runtime internally, so it must not be called
/// from inside one.
pub fn render_order_sync(payload: &OrderPayload, config: &RenderConfig) -> Result<Vec<u8>, OrderPdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| OrderPdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(render_order(payload, config))
}

/// The dynamic pages a payload would produce, without rendering anything.
pub fn plan_only(payload: &OrderPayload, config: &RenderConfig) -> Vec<PageSpec> {
    plan::plan(payload, config)
}

/// Write `bytes` to `path` through a sibling `.tmp` file and a rename.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), OrderPdfError> {
    let write_err = |source: std::io::Error| OrderPdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
