//! Source locations and the template coordinate mapping
//!
//! Templates are often fragments of a larger file, so a template carries the
//! file name and the 1-based line at which its source begins. The parser and
//! renderer work in line numbers relative to the source string; every error
//! is built through a [`SourceMap`], which translates those into the
//! template's declared coordinates. Internal line numbers never appear in
//! surfaced errors.

use std::fmt;

/// A position in a template's declared source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Declared file name of the template
    pub file: String,
    /// Absolute 1-based line number
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Maps line numbers relative to the source string onto the template's
/// declared file name and starting line
#[derive(Debug, Clone)]
pub struct SourceMap {
    file: String,
    first_line: u32,
}

impl SourceMap {
    /// `first_line` is the absolute line the source's first line sits on
    pub fn new(file: impl Into<String>, first_line: u32) -> Self {
        Self {
            file: file.into(),
            first_line,
        }
    }

    /// Declared file name
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Absolute line of the source's first line
    pub fn first_line(&self) -> u32 {
        self.first_line
    }

    /// Translate a 1-based line within the source string into an absolute
    /// location
    pub fn locate(&self, relative_line: u32) -> Location {
        Location::new(&self.file, self.first_line + relative_line - 1)
    }
}
