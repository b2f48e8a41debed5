//! File-extension registration for template engines

use crate::template::Template;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// A template engine that can be registered for file extensions
pub trait Engine: Send + Sync {
    /// Short engine name, for diagnostics
    fn name(&self) -> &'static str;

    /// Extensions this engine claims (without the leading dot)
    fn extensions(&self) -> &'static [&'static str];

    /// Compile source declaring its originating file and starting line
    fn compile(&self, source: &str, file: &str, first_line: u32) -> Result<Template>;
}

/// The drawing-script engine rendering to PDF
pub struct PdfScriptEngine;

impl Engine for PdfScriptEngine {
    fn name(&self) -> &'static str {
        "pdfscript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["prawn"]
    }

    fn compile(&self, source: &str, file: &str, first_line: u32) -> Result<Template> {
        Template::with_location(source, file, first_line)
    }
}

/// Maps file extensions to engines
///
/// Lookup uses the path's final extension, so compound extensions like
/// `report.pdf.prawn` resolve the same as `report.prawn`.
pub struct Registry {
    engines: HashMap<String, Arc<dyn Engine>>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
        }
    }

    /// Register an engine for all extensions it claims
    pub fn register(&mut self, engine: Arc<dyn Engine>) {
        for ext in engine.extensions() {
            self.engines.insert((*ext).to_string(), Arc::clone(&engine));
        }
    }

    /// Find the engine registered for a path's final extension
    pub fn lookup(&self, path: &str) -> Option<Arc<dyn Engine>> {
        let (stem, ext) = path.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        self.engines.get(ext).cloned()
    }
}

impl Default for Registry {
    /// A registry with the PDF script engine registered
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfScriptEngine));
        registry
    }
}
