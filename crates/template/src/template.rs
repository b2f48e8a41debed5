//! The compiled template unit

use crate::diagnostics::SourceMap;
use crate::parser::{parse_script, Script};
use crate::renderer::{execute, Invocation};
use crate::{Result, TemplateError};

/// File name used when none is declared
const DEFAULT_FILE: &str = "(template)";

/// Template source text, from a literal or a one-shot supplier
///
/// The supplier form mirrors deferred template loading: the closure is
/// invoked exactly once, when the template is constructed.
pub struct TemplateSource(String);

impl TemplateSource {
    /// Obtain the source from a supplier, invoked immediately and only once
    pub fn from_supplier(supplier: impl FnOnce() -> String) -> Self {
        Self(supplier())
    }
}

impl From<String> for TemplateSource {
    fn from(source: String) -> Self {
        Self(source)
    }
}

impl From<&str> for TemplateSource {
    fn from(source: &str) -> Self {
        Self(source.to_string())
    }
}

/// An immutable, compiled template
///
/// Construction parses the source once; [`render`](Template::render) can
/// then be called any number of times. Renders are independent: each gets
/// its own drawing canvas, and nothing carries over between calls.
///
/// The declared file name and starting line are used purely for
/// diagnostics. A template that is a fragment of a larger file declares the
/// line its source starts on, and all reported error locations line up with
/// the enclosing file.
#[derive(Debug)]
pub struct Template {
    source: String,
    map: SourceMap,
    script: Script,
}

impl Template {
    /// Compile a template with default diagnostics coordinates
    /// (`(template)`, line 1)
    pub fn new(source: impl Into<TemplateSource>) -> Result<Self> {
        Self::with_location(source, DEFAULT_FILE, 1)
    }

    /// Compile a template declaring its originating file and starting line
    ///
    /// `first_line` is the 1-based line in `file` at which the source
    /// begins; it must be at least 1.
    pub fn with_location(
        source: impl Into<TemplateSource>,
        file: impl Into<String>,
        first_line: u32,
    ) -> Result<Self> {
        if first_line < 1 {
            return Err(TemplateError::InvalidLineOffset(first_line));
        }

        let TemplateSource(source) = source.into();
        let map = SourceMap::new(file, first_line);
        let script = parse_script(&source, &map)?;

        Ok(Self {
            source,
            map,
            script,
        })
    }

    /// The template's source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared file name
    pub fn file(&self) -> &str {
        self.map.file()
    }

    /// Declared 1-based starting line
    pub fn first_line(&self) -> u32 {
        self.map.first_line()
    }

    /// Render with no scope, locals, or block
    pub fn render(&self) -> Result<Vec<u8>> {
        self.render_with(&Invocation::new())
    }

    /// Render against an invocation, producing PDF bytes
    pub fn render_with(&self, invocation: &Invocation<'_>) -> Result<Vec<u8>> {
        execute(&self.script, &self.map, invocation)
    }
}
