//! Page renderer: draws one planned page onto the document sink.
//!
//! Every dynamic page has the same frame: a centred header with the page
//! title, the page body, a muted placeholder line and the standard footer.
//! Bodies only print lines whose data is present; an out-of-range or missing
//! lookup drops the line, never the page.

use super::format::{format_in, format_timestamp};
use super::plan::{FeaturePage, PageContent, PageSpec};
use crate::config::RenderConfig;
use crate::document::{Color, DocumentSink, TextOptions};
use crate::payload::{field, is_truthy, OrderPayload};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};

// ── Palette ──────────────────────────────────────────────────────────────

pub(crate) const HEADING: Color = Color::grey(0x33);
pub(crate) const LABEL: Color = Color::grey(0x55);
pub(crate) const MUTED: Color = Color::grey(0x66);
pub(crate) const FAINT: Color = Color::grey(0x88);

pub(crate) const BODY_SIZE: f32 = 11.0;

const PLACEHOLDER: &str = "Detailed instructions to be added...";

/// Values shared by every page of one render.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Footer timestamp, already formatted.
    pub generated_on: String,
    pub time_zone: Tz,
    pub raw_payload_limit: usize,
}

impl RenderContext {
    pub fn new(config: &RenderConfig, now: DateTime<Utc>) -> Self {
        let instant = config.generated_at.unwrap_or(now);
        Self {
            generated_on: format_timestamp(instant, config.time_zone),
            time_zone: config.time_zone,
            raw_payload_limit: config.raw_payload_limit,
        }
    }

    /// Format a payload value in this render's time zone.
    pub fn format(&self, value: Option<&Value>) -> String {
        format_in(value, self.time_zone)
    }
}

/// Centred page title.
pub fn render_header(sink: &mut dyn DocumentSink, title: &str) {
    sink.set_font_size(18.0);
    sink.set_fill_color(HEADING);
    sink.text(title, TextOptions::centered());
    sink.move_down(1.0);
}

/// "Page N" and the generation timestamp at the bottom of the current page.
///
/// Positioned absolutely, so a footer never spills onto a page of its own.
pub fn render_footer(sink: &mut dyn DocumentSink, page_number: usize, ctx: &RenderContext) {
    let layout = sink.layout();
    let y = layout.height - 50.0;

    sink.set_font_size(9.0);
    sink.set_fill_color(FAINT);
    sink.text_at(
        &format!("Page {page_number}"),
        layout.margin,
        y,
        TextOptions::centered(),
    );
    sink.text_at(
        &format!("Generated on {}", ctx.generated_on),
        layout.margin,
        y + 12.0,
        TextOptions::centered(),
    );
}

/// Start a new page and render `spec` onto it.
pub fn render_page(
    sink: &mut dyn DocumentSink,
    spec: &PageSpec,
    payload: &OrderPayload,
    ctx: &RenderContext,
) {
    sink.add_page();
    render_header(sink, &spec.title);

    sink.set_font_size(BODY_SIZE);
    sink.set_fill_color(Color::BLACK);

    let build_config = payload.build_config();
    match &spec.content {
        PageContent::Floor { floor } => floor_body(sink, *floor, build_config, ctx),
        PageContent::Feature { feature } => feature_body(sink, *feature, build_config, ctx),
    }

    sink.move_down(1.0);
    sink.set_font_size(10.0);
    sink.set_fill_color(MUTED);
    sink.text(PLACEHOLDER, TextOptions::default());

    render_footer(sink, spec.page_number, ctx);
}

fn floor_body(
    sink: &mut dyn DocumentSink,
    floor: usize,
    build_config: Option<&Map<String, Value>>,
    ctx: &RenderContext,
) {
    sink.text(
        &format!("Assembly instructions for floor {floor}"),
        TextOptions::default(),
    );
    sink.move_down(0.5);

    let windows = field(build_config, "windowsPerFloor")
        .and_then(Value::as_array)
        .and_then(|per_floor| per_floor.get(floor.checked_sub(1)?))
        .filter(|w| !w.is_null());
    if let Some(windows) = windows {
        sink.text(
            &format!("Windows on this floor: {}", ctx.format(Some(windows))),
            TextOptions::default(),
        );
    }

    let height = field(build_config, "floorHeight");
    if is_truthy(height) {
        sink.text(
            &format!("Floor height: {}m", ctx.format(height)),
            TextOptions::default(),
        );
    }
}

fn feature_body(
    sink: &mut dyn DocumentSink,
    feature: FeaturePage,
    build_config: Option<&Map<String, Value>>,
    ctx: &RenderContext,
) {
    let (intro, lines): (&str, [(&str, &str); 2]) = match feature {
        FeaturePage::Balcony => (
            "Balcony assembly",
            [("Has balcony", "hasBalcony"), ("Has deck", "hasDeck")],
        ),
        FeaturePage::Roof => (
            "Roof assembly for a complex roof",
            [("Roof type", "roofType"), ("Roof color", "roofColor")],
        ),
    };

    sink.text(intro, TextOptions::default());
    sink.move_down(0.5);
    for (label, key) in lines {
        let value = field(build_config, key);
        if value.is_some_and(|v| !v.is_null()) {
            sink.text(
                &format!("{label}: {}", ctx.format(value)),
                TextOptions::default(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::testing::RecordingSink;
    use chrono::TimeZone;
    use serde_json::json;

    fn ctx() -> RenderContext {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap();
        RenderContext::new(&RenderConfig::default(), now)
    }

    fn floor_spec(floor: usize) -> PageSpec {
        PageSpec {
            page_number: floor + 1,
            title: format!("Floor {floor}"),
            content: PageContent::Floor { floor },
        }
    }

    fn render(spec: &PageSpec, payload: serde_json::Value) -> RecordingSink {
        let mut sink = RecordingSink::new();
        render_page(&mut sink, spec, &OrderPayload::new(payload), &ctx());
        sink
    }

    #[test]
    fn render_page_starts_a_new_page() {
        let sink = render(&floor_spec(1), json!({ "buildConfig": { "floors": 1 } }));
        assert_eq!(sink.page_count(), 2);
        assert!(sink.page_text(0).is_empty());
    }

    #[test]
    fn floor_page_shows_windows_for_its_floor() {
        let payload = json!({ "buildConfig": { "windowsPerFloor": [3, 4, 5], "floorHeight": 2.7 } });
        let text = render(&floor_spec(2), payload).page_text(1);
        assert!(text.contains("Floor 2"));
        assert!(text.contains("Assembly instructions for floor 2"));
        assert!(text.contains("Windows on this floor: 4"));
        assert!(text.contains("Floor height: 2.7m"));
        assert!(text.contains("Detailed instructions to be added..."));
    }

    #[test]
    fn out_of_range_windows_are_omitted() {
        let payload = json!({ "buildConfig": { "windowsPerFloor": [3, 4, 5] } });
        let text = render(&floor_spec(4), payload).page_text(1);
        assert!(text.contains("Assembly instructions for floor 4"));
        assert!(!text.contains("Windows on this floor"));
        assert!(!text.contains("Floor height"));
    }

    #[test]
    fn null_or_non_array_windows_are_omitted() {
        let text = render(
            &floor_spec(1),
            json!({ "buildConfig": { "windowsPerFloor": [null, 2] } }),
        )
        .page_text(1);
        assert!(!text.contains("Windows on this floor"));

        let text = render(
            &floor_spec(1),
            json!({ "buildConfig": { "windowsPerFloor": "many" } }),
        )
        .page_text(1);
        assert!(!text.contains("Windows on this floor"));
    }

    #[test]
    fn zero_windows_is_still_printed() {
        let text = render(
            &floor_spec(1),
            json!({ "buildConfig": { "windowsPerFloor": [0] } }),
        )
        .page_text(1);
        assert!(text.contains("Windows on this floor: 0"));
    }

    #[test]
    fn footer_carries_page_number_and_timestamp() {
        let text = render(&floor_spec(3), json!({})).page_text(1);
        assert!(text.contains("Page 4"));
        assert!(text.contains("Generated on 3/1/2024, 9:05:00 AM"));
    }

    #[test]
    fn pinned_generated_at_wins_over_now() {
        let pinned = Utc.with_ymd_and_hms(2020, 12, 31, 23, 0, 0).unwrap();
        let config = RenderConfig::builder().generated_at(pinned).build().unwrap();
        let ctx = RenderContext::new(&config, Utc::now());
        assert_eq!(ctx.generated_on, "12/31/2020, 11:00:00 PM");
    }

    #[test]
    fn balcony_page_lists_present_fields() {
        let spec = PageSpec {
            page_number: 3,
            title: FeaturePage::Balcony.title().into(),
            content: PageContent::Feature {
                feature: FeaturePage::Balcony,
            },
        };
        let text = render(&spec, json!({ "buildConfig": { "hasBalcony": true } })).page_text(1);
        assert!(text.contains("Balcony Assembly"));
        assert!(text.contains("Has balcony: Yes"));
        assert!(!text.contains("Has deck"));
    }

    #[test]
    fn roof_page_lists_roof_fields() {
        let spec = PageSpec {
            page_number: 3,
            title: FeaturePage::Roof.title().into(),
            content: PageContent::Feature {
                feature: FeaturePage::Roof,
            },
        };
        let payload = json!({ "buildConfig": { "roofType": "complex", "roofColor": "slate" } });
        let text = render(&spec, payload).page_text(1);
        assert!(text.contains("Roof type: complex"));
        assert!(text.contains("Roof color: slate"));
    }
}
