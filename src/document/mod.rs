//! Drawing surface for the page renderers.
//!
//! Renderers talk to a [`DocumentSink`] only: set a font size and colour,
//! flow some text, move the cursor down, start a page. The concrete
//! [`pdf::PdfDocument`] turns those calls into `lopdf` content streams and,
//! when the document is ended, emits the serialised bytes as a sequence of
//! [`SinkEvent`]s.
//!
//! ```text
//! renderer ──▶ DocumentSink ──▶ PdfDocument ──▶ SinkEvent stream ──▶ collector
//!              (drawing calls)   (lopdf graph)   (Data… End|Error)
//! ```

pub mod metrics;
pub mod pdf;

use crate::error::SinkError;

/// One event on a document's output stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// A chunk of serialised document bytes, in emission order.
    Data(Vec<u8>),
    /// The document is complete; no further events follow.
    End,
    /// The document failed; no further events follow.
    Error(SinkError),
}

/// An RGB fill colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::grey(0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    /// Components scaled to the 0–1 range PDF operators expect.
    pub fn unit(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// Per-call text options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextOptions {
    pub align: Align,
    pub underline: bool,
    /// Wrap width in points. Defaults to the remaining width on the line.
    pub width: Option<f32>,
}

impl TextOptions {
    pub fn centered() -> Self {
        Self {
            align: Align::Center,
            ..Self::default()
        }
    }

    pub fn underlined() -> Self {
        Self {
            underline: true,
            ..Self::default()
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }
}

/// Physical page geometry in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageLayout {
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

/// The drawing operations renderers may issue.
///
/// Coordinates are top-down: `y = 0` is the top edge of the page.
pub trait DocumentSink {
    /// Finish the current page and start a fresh one with the cursor at the
    /// top margin. Font size and colour carry over.
    fn add_page(&mut self);

    fn set_font_size(&mut self, size: f32);

    fn set_fill_color(&mut self, color: Color);

    /// Flow `text` at the cursor. `\n` starts a new line, long lines wrap,
    /// and running past the bottom margin continues on a new page.
    fn text(&mut self, text: &str, options: TextOptions);

    /// Draw `text` starting at an absolute position. Never triggers a new
    /// page.
    fn text_at(&mut self, text: &str, x: f32, y: f32, options: TextOptions);

    /// Advance the cursor by `lines` line heights of the current font size.
    fn move_down(&mut self, lines: f32);

    fn layout(&self) -> PageLayout;

    /// Pages started so far, including the current one.
    fn page_count(&self) -> usize;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Sink that records the text drawn on each page.
    pub struct RecordingSink {
        pub pages: Vec<Vec<String>>,
        pub font_size: f32,
        pub fill_color: Color,
        layout: PageLayout,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self {
                pages: vec![Vec::new()],
                font_size: 12.0,
                fill_color: Color::BLACK,
                layout: PageLayout {
                    width: 595.28,
                    height: 841.89,
                    margin: 50.0,
                },
            }
        }

        pub fn page_text(&self, index: usize) -> String {
            self.pages.get(index).map(|p| p.join("\n")).unwrap_or_default()
        }

        pub fn all_text(&self) -> String {
            self.pages
                .iter()
                .map(|p| p.join("\n"))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }

    impl DocumentSink for RecordingSink {
        fn add_page(&mut self) {
            self.pages.push(Vec::new());
        }

        fn set_font_size(&mut self, size: f32) {
            self.font_size = size;
        }

        fn set_fill_color(&mut self, color: Color) {
            self.fill_color = color;
        }

        fn text(&mut self, text: &str, _options: TextOptions) {
            if let Some(page) = self.pages.last_mut() {
                page.push(text.to_string());
            }
        }

        fn text_at(&mut self, text: &str, _x: f32, _y: f32, options: TextOptions) {
            self.text(text, options);
        }

        fn move_down(&mut self, _lines: f32) {}

        fn layout(&self) -> PageLayout {
            self.layout
        }

        fn page_count(&self) -> usize {
            self.pages.len()
        }
    }
}
