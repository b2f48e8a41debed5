//! Template Engine - embedded drawing scripts rendered to PDF
//!
//! This crate provides:
//! - Compiling drawing-script source into a reusable [`Template`]
//! - Rendering with locals, a scope object, and an optional block
//! - File-extension registration via [`Registry`]
//! - Error locations in the template's own coordinate system
//!
//! A template is compiled once and can be rendered many times. Every render
//! gets a fresh [`pdf_canvas::PdfCanvas`] bound as `pdf`, so no state leaks
//! between renders.
//!
//! # Example
//!
//! ```ignore
//! use template::{Invocation, Template};
//!
//! let template = Template::new(r#"pdf.text("Hey #{name}!")"#)?;
//! let pdf_bytes = template.render_with(&Invocation::new().local("name", "Joe"))?;
//! ```
//!
//! # Script syntax
//!
//! One statement per line:
//!
//! ```text
//! # comment
//! pdf.text('Hello World!')
//! pdf.text("Hey #{name}!")
//! pdf.move_down(12)
//! pdf.font_size(18)
//! pdf.start_new_page
//! fail "something went wrong"
//! ```
//!
//! Double-quoted strings interpolate `#{...}` expressions: a bare name looks
//! up locals first and then the scope, `@name` reads only the scope, and
//! `yield` invokes the caller-supplied block.

mod diagnostics;
pub mod parser;
mod registry;
mod renderer;
mod template;

pub use diagnostics::{Location, SourceMap};
pub use registry::{Engine, PdfScriptEngine, Registry};
pub use renderer::{value_to_string, Invocation};
pub use template::{Template, TemplateSource};

use thiserror::Error;

/// Errors that can occur during template compilation and rendering
///
/// Two kinds of execution failure are distinguished: name-resolution
/// failures ([`UndefinedName`](TemplateError::UndefinedName),
/// [`UnknownMethod`](TemplateError::UnknownMethod)) and runtime failures
/// ([`Failed`](TemplateError::Failed),
/// [`MissingBlock`](TemplateError::MissingBlock)). Both carry the template's
/// declared file name and offset-adjusted line number.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("{location}: syntax error: {message}")]
    Syntax { location: Location, message: String },

    #[error("{location}: undefined name `{name}`")]
    UndefinedName { location: Location, name: String },

    #[error("{location}: unknown canvas method `{name}`")]
    UnknownMethod { location: Location, name: String },

    #[error("{location}: no block given (yield)")]
    MissingBlock { location: Location },

    #[error("{location}: {message}")]
    Failed { location: Location, message: String },

    #[error("{location}: {message}")]
    BadArguments { location: Location, message: String },

    #[error("Line offset must be at least 1, got {0}")]
    InvalidLineOffset(u32),

    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_canvas::PdfError),
}

impl TemplateError {
    /// The template-source location this error points at, if any
    pub fn location(&self) -> Option<&Location> {
        match self {
            TemplateError::Syntax { location, .. }
            | TemplateError::UndefinedName { location, .. }
            | TemplateError::UnknownMethod { location, .. }
            | TemplateError::MissingBlock { location }
            | TemplateError::Failed { location, .. }
            | TemplateError::BadArguments { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Whether this is a name-resolution failure (as opposed to a runtime
    /// failure signalled by the script itself)
    pub fn is_name_error(&self) -> bool {
        matches!(
            self,
            TemplateError::UndefinedName { .. } | TemplateError::UnknownMethod { .. }
        )
    }
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::new("test.prawn", 3)
    }

    #[test]
    fn test_error_kinds() {
        let name = TemplateError::UndefinedName {
            location: loc(),
            name: "name".into(),
        };
        let method = TemplateError::UnknownMethod {
            location: loc(),
            name: "texxt".into(),
        };
        let failed = TemplateError::Failed {
            location: loc(),
            message: "boom".into(),
        };
        assert!(name.is_name_error());
        assert!(method.is_name_error());
        assert!(!failed.is_name_error());
    }

    #[test]
    fn test_error_location_display() {
        let err = TemplateError::Failed {
            location: loc(),
            message: "expected fail".into(),
        };
        assert_eq!(err.to_string(), "test.prawn:3: expected fail");
        assert_eq!(err.location().unwrap().to_string(), "test.prawn:3");
    }
}
