//! Integration tests: canvas output parses back as a valid PDF

use lopdf::Document;
use pdf_canvas::PdfCanvas;
use pretty_assertions::assert_eq;

#[test]
fn output_parses_as_pdf() {
    let mut canvas = PdfCanvas::new();
    canvas.text("Hello World!");
    let bytes = canvas.to_bytes().unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn pages_round_trip() {
    let mut canvas = PdfCanvas::new();
    canvas.text("page one");
    canvas.start_new_page();
    canvas.text("page two");
    canvas.start_new_page();
    let bytes = canvas.to_bytes().unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[test]
fn empty_canvas_is_a_one_page_document() {
    let canvas = PdfCanvas::new();
    let bytes = canvas.to_bytes().unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn content_stream_holds_text_operators() {
    let mut canvas = PdfCanvas::new();
    canvas.text("Hello World!");
    let bytes = canvas.to_bytes().unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    let page_id = doc.get_pages()[&1];
    let content = doc.get_page_content(page_id).unwrap();
    let text = String::from_utf8_lossy(&content);
    assert!(text.contains("BT"));
    assert!(text.contains("(Hello World!) Tj"));
    assert!(text.contains("ET"));
}
