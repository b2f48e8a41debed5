//! Text encoding and operator generation

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

/// Encode text for a WinAnsi-encoded Type1 font
///
/// Characters above U+00FF have no single-byte representation and are
/// replaced with `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let cp = c as u32;
            if cp <= 0xFF {
                cp as u8
            } else {
                b'?'
            }
        })
        .collect()
}

/// Generate PDF operators for a single line of text
///
/// Creates the text operators (BT, Tf, Td, Tj, ET) to render a line
/// at a specific baseline position.
///
/// # Arguments
/// * `encoded` - WinAnsi-encoded text bytes
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Baseline Y coordinate in points (PDF coordinates, from bottom)
/// * `font_resource` - Font resource name (e.g., "F1")
/// * `font_size` - Font size in points
pub fn generate_text_operations(
    encoded: Vec<u8>,
    x: f64,
    y: f64,
    font_resource: &str,
    font_size: f64,
) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(font_resource.as_bytes().to_vec()),
                Object::Real(font_size as f32),
            ],
        ),
        Operation::new("Td", vec![Object::Real(x as f32), Object::Real(y as f32)]),
        Operation::new(
            "Tj",
            vec![Object::String(encoded, StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}
