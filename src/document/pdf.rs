//! `lopdf`-backed implementation of [`DocumentSink`].
//!
//! Pages are built as `lopdf` content streams while the renderers draw.
//! [`PdfDocument::end`] links the page tree, serialises the object graph and
//! pushes the bytes into the document's event channel in
//! [`CHUNK_SIZE`]-sized pieces, followed by [`SinkEvent::End`].
//!
//! The channel receiver is created in [`PdfDocument::open`] and returned
//! alongside the document, so a collector is always attached before the
//! first byte can be produced.

use super::metrics::{encode_win_ansi, text_width, wrap_line, ASCENT, LINE_HEIGHT};
use super::{Align, Color, DocumentSink, PageLayout, SinkEvent, TextOptions};
use crate::error::SinkError;
use crate::stream::ChunkStream;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::{self, BufWriter, Write};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

/// Size of the `Data` chunks emitted while serialising.
pub const CHUNK_SIZE: usize = 16 * 1024;

const FONT_RESOURCE: &str = "F1";

/// A PDF under construction.
pub struct PdfDocument {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    content: Content,
    layout: PageLayout,
    cursor_y: f32,
    font_size: f32,
    fill_color: Color,
    /// Font size and colour already set in the current page's content stream.
    emitted: Option<(f32, Color)>,
    failure: Option<SinkError>,
    events: mpsc::UnboundedSender<SinkEvent>,
}

impl PdfDocument {
    /// Open a new document with one blank page, together with its output
    /// stream.
    pub fn open(layout: PageLayout) -> (Self, ChunkStream) {
        let (events, receiver) = mpsc::unbounded_channel();
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();

        let doc = Self {
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            content: Content { operations: vec![] },
            layout,
            cursor_y: layout.margin,
            font_size: 12.0,
            fill_color: Color::BLACK,
            emitted: None,
            failure: None,
            events,
        };

        (doc, Box::pin(UnboundedReceiverStream::new(receiver)))
    }

    /// Finish the document and emit it on the stream.
    ///
    /// Consumes the document, so it can be closed exactly once. Failures are
    /// reported as a [`SinkEvent::Error`] rather than returned.
    pub fn end(mut self) {
        self.finish_page();

        if let Some(failure) = self.failure.take() {
            warn!("Document failed before serialisation: {}", failure);
            let _ = self.events.send(SinkEvent::Error(failure));
            return;
        }

        self.link_page_tree();

        let mut writer = BufWriter::with_capacity(
            CHUNK_SIZE,
            ChunkWriter {
                events: self.events.clone(),
            },
        );
        let result = self
            .document
            .save_to(&mut writer)
            .map_err(|e| e.to_string())
            .and_then(|_| writer.flush().map_err(|e| e.to_string()));

        let event = match result {
            Ok(()) => {
                debug!("Document serialised: {} pages", self.page_ids.len());
                SinkEvent::End
            }
            Err(detail) => SinkEvent::Error(SinkError::Serialize(detail)),
        };
        // A closed receiver means the caller stopped waiting; nothing to do.
        let _ = self.events.send(event);
    }

    fn link_page_tree(&mut self) {
        let font_id = self.document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.document.objects.insert(
            self.resources_id,
            Object::Dictionary(dictionary! {
                "Font" => dictionary! { FONT_RESOURCE => font_id },
            }),
        );

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.page_ids.len() as i64,
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::string_literal("Order Confirmation"),
            "Producer" => Object::string_literal(concat!("order-confirm-pdf ", env!("CARGO_PKG_VERSION"))),
        });
        self.document.trailer.set("Info", info_id);
    }

    /// Turn the current content stream into a page object.
    fn finish_page(&mut self) {
        let content = std::mem::replace(&mut self.content, Content { operations: vec![] });
        let page_number = self.page_ids.len() + 1;

        let bytes = match content.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.failure.get_or_insert(SinkError::Encode {
                    page: page_number,
                    detail: e.to_string(),
                });
                Vec::new()
            }
        };

        let content_id = self.document.add_object(Stream::new(dictionary! {}, bytes));
        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), self.layout.width.into(), self.layout.height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        self.emitted = None;
    }

    fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    /// Draw one already-wrapped line with its top edge at `top`.
    fn draw_line(&mut self, line: &str, x: f32, top: f32, underline: bool) {
        if line.trim().is_empty() {
            return;
        }
        let baseline = self.layout.height - top - self.font_size * ASCENT;
        let (r, g, b) = self.fill_color.unit();

        self.push("BT", vec![]);
        if self.emitted != Some((self.font_size, self.fill_color)) {
            self.push("Tf", vec![FONT_RESOURCE.into(), self.font_size.into()]);
            self.push("rg", vec![r.into(), g.into(), b.into()]);
            self.emitted = Some((self.font_size, self.fill_color));
        }
        self.push("Td", vec![x.into(), baseline.into()]);
        self.push("Tj", vec![Object::string_literal(encode_win_ansi(line))]);
        self.push("ET", vec![]);

        if underline {
            let y = baseline - self.font_size * 0.1;
            let width = text_width(line, self.font_size);
            self.push("RG", vec![r.into(), g.into(), b.into()]);
            self.push("w", vec![(self.font_size * 0.05).into()]);
            self.push("m", vec![x.into(), y.into()]);
            self.push("l", vec![(x + width).into(), y.into()]);
            self.push("S", vec![]);
        }
    }

    fn aligned_x(&self, line: &str, left: f32, width: f32, align: Align) -> f32 {
        match align {
            Align::Left => left,
            Align::Center => left + ((width - text_width(line, self.font_size)) / 2.0).max(0.0),
        }
    }
}

impl DocumentSink for PdfDocument {
    fn add_page(&mut self) {
        self.finish_page();
        self.cursor_y = self.layout.margin;
    }

    fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn text(&mut self, text: &str, options: TextOptions) {
        let left = self.layout.margin;
        let width = options.width.unwrap_or(self.layout.content_width());
        let bottom = self.layout.height - self.layout.margin;

        for raw in text.lines() {
            for line in wrap_line(raw, self.font_size, width) {
                let line_height = self.line_height();
                if self.cursor_y + line_height > bottom && self.cursor_y > self.layout.margin {
                    self.add_page();
                }
                let x = self.aligned_x(&line, left, width, options.align);
                self.draw_line(&line, x, self.cursor_y, options.underline);
                self.cursor_y += line_height;
            }
        }
    }

    fn text_at(&mut self, text: &str, x: f32, y: f32, options: TextOptions) {
        let width = options
            .width
            .unwrap_or(self.layout.width - x - self.layout.margin);
        self.cursor_y = y;

        for raw in text.lines() {
            for line in wrap_line(raw, self.font_size, width) {
                let left = self.aligned_x(&line, x, width, options.align);
                self.draw_line(&line, left, self.cursor_y, options.underline);
                self.cursor_y += self.line_height();
            }
        }
    }

    fn move_down(&mut self, lines: f32) {
        self.cursor_y += self.line_height() * lines;
    }

    fn layout(&self) -> PageLayout {
        self.layout
    }

    fn page_count(&self) -> usize {
        self.page_ids.len() + 1
    }
}

/// Forwards every write as a [`SinkEvent::Data`] chunk.
struct ChunkWriter {
    events: mpsc::UnboundedSender<SinkEvent>,
}

impl Write for ChunkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.events
            .send(SinkEvent::Data(buf.to_vec()))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "document stream receiver dropped"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
