//! PDF Canvas - flowing-text PDF document builder
//!
//! This crate provides:
//! - Building a PDF document from scratch, page by page
//! - A flowing text cursor (each `text` call advances down the page)
//! - Serialization to raw PDF bytes
//!
//! Output is deterministic: the same sequence of canvas calls always
//! produces byte-identical documents.
//!
//! # Example
//!
//! ```ignore
//! use pdf_canvas::PdfCanvas;
//!
//! let mut canvas = PdfCanvas::new();
//! canvas.text("Hello, World!");
//! canvas.move_down(10.0);
//! canvas.text("Second line");
//! let bytes = canvas.to_bytes()?;
//! ```

mod canvas;
mod text;

pub use canvas::PdfCanvas;
pub use text::{encode_win_ansi, generate_text_operations};

use thiserror::Error;

/// Errors that can occur during PDF canvas operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Invalid font size: {0}")]
    InvalidFontSize(f64),

    #[error("Failed to encode content stream: {0}")]
    EncodeError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF canvas operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Page geometry, in PDF points (US Letter)
pub mod geometry {
    /// Page width
    pub const PAGE_WIDTH: f64 = 612.0;
    /// Page height
    pub const PAGE_HEIGHT: f64 = 792.0;
    /// Margin on all four sides
    pub const MARGIN: f64 = 36.0;
}
