//! Configuration types for order document rendering.
//!
//! Every rendering knob lives in [`RenderConfig`], built via its
//! [`RenderConfigBuilder`]. The payload decides *what* goes on the pages;
//! the config decides page geometry, time zone, safety limits and whether
//! the optional feature pages are planned.

use crate::document::PageLayout;
use crate::error::OrderPdfError;
use crate::progress::ProgressCallback;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for rendering an order document.
///
/// Built via [`RenderConfig::builder()`] or using
/// [`RenderConfig::default()`].
///
/// # Example
/// ```rust
/// use order_confirm_pdf::{PageSize, RenderConfig};
///
/// let config = RenderConfig::builder()
///     .page_size(PageSize::Letter)
///     .time_zone(chrono_tz::Europe::Oslo)
///     .feature_pages(true)
///     .build()
///     .unwrap();
/// assert!(config.feature_pages);
/// ```
#[derive(Clone)]
pub struct RenderConfig {
    /// Paper size. Default: A4.
    pub page_size: PageSize,

    /// Margin on all four sides, in points. Default: 50.
    pub margin: f32,

    /// Time zone used for every printed date and the footer timestamp.
    /// Default: UTC.
    pub time_zone: Tz,

    /// Plan the balcony / complex-roof pages after the floor pages.
    /// Default: false.
    pub feature_pages: bool,

    /// Upper bound on floor pages for a single order. Default: 100.
    ///
    /// `buildConfig.floors` comes straight from the client; without a cap a
    /// single request for a million floors would render a million pages.
    pub max_floor_pages: usize,

    /// Maximum bytes of pretty-printed JSON in the raw payload dump.
    /// Longer dumps are truncated. Default: 64 KiB.
    pub raw_payload_limit: usize,

    /// Instant printed as "Generated on" in every footer. Default: `None`
    /// (the moment rendering starts). Pin it for byte-identical output.
    pub generated_at: Option<DateTime<Utc>>,

    /// Download timeout for URL payload inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margin: 50.0,
            time_zone: Tz::UTC,
            feature_pages: false,
            max_floor_pages: 100,
            raw_payload_limit: 64 * 1024,
            generated_at: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("page_size", &self.page_size)
            .field("margin", &self.margin)
            .field("time_zone", &self.time_zone)
            .field("feature_pages", &self.feature_pages)
            .field("max_floor_pages", &self.max_floor_pages)
            .field("raw_payload_limit", &self.raw_payload_limit)
            .field("generated_at", &self.generated_at)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RenderProgressCallback>"),
            )
            .finish()
    }
}

impl RenderConfig {
    /// Create a new builder for `RenderConfig`.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            config: Self::default(),
        }
    }

    /// Page geometry for the document sink.
    pub fn layout(&self) -> PageLayout {
        let (width, height) = self.page_size.dimensions();
        PageLayout {
            width,
            height,
            margin: self.margin,
        }
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn margin(mut self, points: f32) -> Self {
        self.config.margin = points;
        self
    }

    pub fn time_zone(mut self, tz: Tz) -> Self {
        self.config.time_zone = tz;
        self
    }

    pub fn feature_pages(mut self, enabled: bool) -> Self {
        self.config.feature_pages = enabled;
        self
    }

    pub fn max_floor_pages(mut self, n: usize) -> Self {
        self.config.max_floor_pages = n.max(1);
        self
    }

    pub fn raw_payload_limit(mut self, bytes: usize) -> Self {
        self.config.raw_payload_limit = bytes;
        self
    }

    pub fn generated_at(mut self, instant: DateTime<Utc>) -> Self {
        self.config.generated_at = Some(instant);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenderConfig, OrderPdfError> {
        let c = &self.config;
        let (width, height) = c.page_size.dimensions();
        if !(width.is_finite() && height.is_finite()) || width < 144.0 || height < 144.0 {
            return Err(OrderPdfError::InvalidConfig(format!(
                "Page must be at least 144×144 pt, got {}×{}",
                width, height
            )));
        }
        if !c.margin.is_finite() || c.margin < 0.0 || c.margin * 2.0 >= width.min(height) - 72.0 {
            return Err(OrderPdfError::InvalidConfig(format!(
                "Margin {} leaves no room for content on a {}×{} pt page",
                c.margin, width, height
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Paper size of every page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// 595.28 × 841.89 pt (default).
    #[default]
    A4,
    /// 612 × 792 pt.
    Letter,
    /// 612 × 1008 pt.
    Legal,
    /// Explicit width × height in points.
    Custom { width: f32, height: f32 },
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}
