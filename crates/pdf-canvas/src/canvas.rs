//! Flowing-text canvas over a from-scratch lopdf document

use crate::geometry::{MARGIN, PAGE_HEIGHT, PAGE_WIDTH};
use crate::text::{encode_win_ansi, generate_text_operations};
use crate::{PdfError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object};

/// Font resource name used for the built-in font
const FONT_RESOURCE: &str = "F1";

/// Default font size in points
const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Line leading as a multiple of the font size
const LEADING_FACTOR: f64 = 1.2;

/// A PDF document under construction, driven by a flowing text cursor
///
/// The canvas starts with a single empty page and the cursor at the top
/// margin. Each [`text`](PdfCanvas::text) call draws one line at the cursor
/// and advances down the page; when the cursor runs past the bottom margin
/// a new page is started automatically.
///
/// The canvas owns all of its state. Two canvases fed the same sequence of
/// calls serialize to byte-identical documents.
pub struct PdfCanvas {
    /// Content operations per page
    pages: Vec<Vec<Operation>>,
    /// Baseline of the next text line, in points from the page bottom
    cursor: f64,
    /// Current font size in points
    font_size: f64,
}

impl PdfCanvas {
    /// Create an empty canvas: one blank page, cursor at the top margin
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            cursor: top_baseline(DEFAULT_FONT_SIZE),
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Draw a line of text at the cursor and advance one line down
    pub fn text(&mut self, text: &str) {
        if self.cursor < MARGIN {
            self.start_new_page();
        }

        let ops = generate_text_operations(
            encode_win_ansi(text),
            MARGIN,
            self.cursor,
            FONT_RESOURCE,
            self.font_size,
        );
        // A canvas always has at least one page
        if let Some(page) = self.pages.last_mut() {
            page.extend(ops);
        }

        self.cursor -= self.font_size * LEADING_FACTOR;
    }

    /// Move the cursor down by `pts` points
    pub fn move_down(&mut self, pts: f64) {
        self.cursor -= pts;
    }

    /// Move the cursor up by `pts` points
    pub fn move_up(&mut self, pts: f64) {
        self.cursor += pts;
    }

    /// Start a new page and reset the cursor to the top margin
    pub fn start_new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = top_baseline(self.font_size);
    }

    /// Set the font size for subsequent text
    ///
    /// # Errors
    /// Returns [`PdfError::InvalidFontSize`] for non-positive or
    /// non-finite sizes.
    pub fn set_font_size(&mut self, pts: f64) -> Result<()> {
        if !pts.is_finite() || pts <= 0.0 {
            return Err(PdfError::InvalidFontSize(pts));
        }
        self.font_size = pts;
        Ok(())
    }

    /// Number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Current cursor baseline, in points from the page bottom
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Assemble and serialize the document to PDF bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_RESOURCE => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in &self.pages {
            let content = Content {
                operations: operations.clone(),
            };
            let encoded = content
                .encode()
                .map_err(|e| PdfError::EncodeError(e.to_string()))?;
            let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, encoded));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(PAGE_WIDTH as f32),
                Object::Real(PAGE_HEIGHT as f32),
            ],
        };
        doc.objects.insert(pages_id, pages_dict.into());

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }
}

impl Default for PdfCanvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Baseline of the first text line on a fresh page
fn top_baseline(font_size: f64) -> f64 {
    PAGE_HEIGHT - MARGIN - font_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_canvas_defaults() {
        let canvas = PdfCanvas::new();
        assert_eq!(canvas.page_count(), 1);
        assert_eq!(canvas.cursor(), PAGE_HEIGHT - MARGIN - 12.0);
    }

    #[test]
    fn test_text_advances_cursor() {
        let mut canvas = PdfCanvas::new();
        let before = canvas.cursor();
        canvas.text("line");
        assert_eq!(canvas.cursor(), before - 12.0 * 1.2);
    }

    #[test]
    fn test_move_down_and_up() {
        let mut canvas = PdfCanvas::new();
        let start = canvas.cursor();
        canvas.move_down(30.0);
        assert_eq!(canvas.cursor(), start - 30.0);
        canvas.move_up(10.0);
        assert_eq!(canvas.cursor(), start - 20.0);
    }

    #[test]
    fn test_start_new_page() {
        let mut canvas = PdfCanvas::new();
        canvas.text("page one");
        canvas.start_new_page();
        assert_eq!(canvas.page_count(), 2);
        assert_eq!(canvas.cursor(), PAGE_HEIGHT - MARGIN - 12.0);
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let mut canvas = PdfCanvas::new();
        canvas.move_down(PAGE_HEIGHT);
        canvas.text("spilled");
        assert_eq!(canvas.page_count(), 2);
    }

    #[test]
    fn test_set_font_size() {
        let mut canvas = PdfCanvas::new();
        canvas.set_font_size(18.0).unwrap();
        let before = canvas.cursor();
        canvas.text("big");
        assert_eq!(canvas.cursor(), before - 18.0 * 1.2);
    }

    #[test]
    fn test_set_font_size_rejects_invalid() {
        let mut canvas = PdfCanvas::new();
        assert!(matches!(
            canvas.set_font_size(0.0),
            Err(PdfError::InvalidFontSize(_))
        ));
        assert!(matches!(
            canvas.set_font_size(-3.0),
            Err(PdfError::InvalidFontSize(_))
        ));
        assert!(matches!(
            canvas.set_font_size(f64::NAN),
            Err(PdfError::InvalidFontSize(_))
        ));
    }

    #[test]
    fn test_to_bytes_is_pdf() {
        let mut canvas = PdfCanvas::new();
        canvas.text("Hello World!");
        let bytes = canvas.to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        let eof = b"%%EOF";
        assert!(bytes.windows(eof.len()).any(|w| w == eof));
    }

    #[test]
    fn test_to_bytes_contains_text() {
        let mut canvas = PdfCanvas::new();
        canvas.text("Hello World!");
        let bytes = canvas.to_bytes().unwrap();
        let needle = b"Hello World!";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_to_bytes_deterministic() {
        let build = || {
            let mut canvas = PdfCanvas::new();
            canvas.text("one");
            canvas.move_down(5.0);
            canvas.text("two");
            canvas.to_bytes().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_to_bytes_does_not_consume() {
        let mut canvas = PdfCanvas::new();
        canvas.text("stable");
        let first = canvas.to_bytes().unwrap();
        let second = canvas.to_bytes().unwrap();
        assert_eq!(first, second);
    }
}
