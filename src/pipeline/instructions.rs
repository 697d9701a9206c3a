//! Instructions page: the always-present first page of every document.
//!
//! Layout, top to bottom:
//!
//! 1. "Order Confirmation" title, plus the build name when there is one
//! 2. a short notice when the payload carries no order details at all
//! 3. Customer Details, Order Information and Build Summary blocks, each only
//!    when its section is a non-empty object
//! 4. Assembly Notes
//! 5. the raw payload, pretty-printed
//! 6. the page 1 footer
//!
//! Inside each block a line is printed only when its field is truthy. A long
//! raw dump flows onto continuation pages; the footer then lands on the last
//! of them.

use super::format::format_date_in;
use super::pages::{render_footer, RenderContext, BODY_SIZE, HEADING, LABEL, MUTED};
use crate::document::{Color, DocumentSink, TextOptions};
use crate::payload::{is_truthy, OrderPayload};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

const SERIALIZE_FALLBACK: &str = "Unable to serialize payload";
const TRUNCATED_MARKER: &str = "\n… (truncated)";

/// How a block line turns its field into text.
#[derive(Clone, Copy)]
enum Shown {
    Plain,
    Date,
    Meters,
}

const CUSTOMER_LINES: &[(&str, &str, Shown)] = &[
    ("Name", "name", Shown::Plain),
    ("User ID", "userId", Shown::Plain),
    ("Email", "email", Shown::Plain),
];

const ORDER_LINES: &[(&str, &str, Shown)] = &[
    ("Order ID", "orderId", Shown::Plain),
    ("Build ID", "buildId", Shown::Plain),
    ("Status", "status", Shown::Plain),
    ("Created", "createdAt", Shown::Date),
    ("Session ID", "sessionId", Shown::Plain),
];

const BUILD_LINES: &[(&str, &str, Shown)] = &[
    ("Floors", "floors", Shown::Plain),
    ("Depth", "depth", Shown::Meters),
    ("Width", "width", Shown::Meters),
    ("Shape", "shape", Shown::Plain),
    ("Roof", "roofType", Shown::Plain),
];

/// Draw the instructions page onto the sink's current page.
pub fn render_instructions(sink: &mut dyn DocumentSink, payload: &OrderPayload, ctx: &RenderContext) {
    sink.set_font_size(24.0);
    sink.set_fill_color(Color::BLACK);
    sink.text("Order Confirmation", TextOptions::centered());

    let build_name = payload.get("buildName");
    if is_truthy(build_name) {
        sink.move_down(0.5);
        sink.set_font_size(18.0);
        sink.text(&ctx.format(build_name), TextOptions::centered());
    }
    sink.move_down(1.5);

    let has_details = ["buildName", "customerDetails", "orderMetadata", "buildConfig"]
        .iter()
        .any(|key| is_truthy(payload.get(key)));
    if !has_details {
        sink.set_font_size(12.0);
        sink.set_fill_color(MUTED);
        sink.text("No order details provided.", TextOptions::centered());
        sink.move_down(1.0);
    }

    let blocks = [
        ("Customer Details", "customerDetails", CUSTOMER_LINES),
        ("Order Information", "orderMetadata", ORDER_LINES),
        ("Build Summary", "buildConfig", BUILD_LINES),
    ];
    for (heading, key, lines) in blocks {
        if let Some(section) = payload.non_empty_section(key) {
            render_block(sink, heading, section, lines, ctx);
        }
    }

    section_heading(sink, "Assembly Notes", 14.0);
    sink.set_font_size(BODY_SIZE);
    sink.set_fill_color(Color::BLACK);
    sink.text(
        "Detailed assembly instructions follow on subsequent pages.",
        TextOptions::default(),
    );
    sink.move_down(1.5);

    section_heading(sink, "Raw Payload:", 10.0);
    sink.set_font_size(8.0);
    sink.set_fill_color(LABEL);
    let width = sink.layout().width - 100.0;
    let dump = serialize_payload(payload, ctx.raw_payload_limit);
    sink.text(&dump, TextOptions::default().with_width(width));

    render_footer(sink, 1, ctx);
}

/// Pretty-printed JSON of `value`, at most `limit` bytes before the marker.
///
/// A value that refuses to serialise yields a fixed fallback line instead.
pub fn serialize_payload<T: Serialize + ?Sized>(value: &T, limit: usize) -> String {
    let mut dump = match serde_json::to_string_pretty(value) {
        Ok(dump) => dump,
        Err(e) => {
            warn!("Raw payload could not be serialised: {}", e);
            return SERIALIZE_FALLBACK.to_string();
        }
    };

    if dump.len() > limit {
        let mut cut = limit;
        while !dump.is_char_boundary(cut) {
            cut -= 1;
        }
        warn!("Raw payload dump truncated from {} to {} bytes", dump.len(), cut);
        dump.truncate(cut);
        dump.push_str(TRUNCATED_MARKER);
    }
    dump
}

fn section_heading(sink: &mut dyn DocumentSink, heading: &str, size: f32) {
    sink.set_font_size(size);
    sink.set_fill_color(HEADING);
    sink.text(heading, TextOptions::underlined());
    sink.move_down(0.3);
}

fn render_block(
    sink: &mut dyn DocumentSink,
    heading: &str,
    section: &Map<String, Value>,
    lines: &[(&str, &str, Shown)],
    ctx: &RenderContext,
) {
    section_heading(sink, heading, 14.0);
    sink.set_font_size(BODY_SIZE);
    sink.set_fill_color(Color::BLACK);

    for &(label, key, shown) in lines {
        let value = section.get(key);
        if !is_truthy(value) {
            continue;
        }
        let text = match shown {
            Shown::Plain => ctx.format(value),
            Shown::Date => format_date_in(value, ctx.time_zone),
            Shown::Meters => format!("{}m", ctx.format(value)),
        };
        sink.text(&format!("{label}: {text}"), TextOptions::default());
    }

    sink.move_down(1.0);
}
