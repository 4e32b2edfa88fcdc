//! Source front end: turns files into `ParsedFile` records.

mod annotation;
pub mod java;
pub mod kotlin;
pub mod language;

pub use language::SupportedLanguage;

use std::fs;
use std::path::Path;
use tracing::debug;
use tree_sitter::Parser;

use crate::error::{Result, ScanError};
use crate::symbols::ParsedFile;

/// Extract classes from already loaded source text.
pub fn extract_file(path: &Path, source: &str) -> Result<ParsedFile> {
    let language = SupportedLanguage::from_path(path)
        .ok_or_else(|| ScanError::UnsupportedLanguage(path.to_path_buf()))?;

    let mut parser = Parser::new();
    parser
        .set_language(&language.tree_sitter_language())
        .map_err(|e| ScanError::Grammar(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ScanError::Parse(path.to_path_buf()))?;

    let root = tree.root_node();
    if root.has_error() {
        debug!(file = %path.display(), "syntax errors; extracting what parsed");
    }

    let mut classes = match language {
        SupportedLanguage::Java => java::extract_java_classes(&root, source.as_bytes()),
        SupportedLanguage::Kotlin => kotlin::extract_kotlin_classes(&root, source.as_bytes()),
    };
    for class in &mut classes {
        class.file = path.to_path_buf();
    }

    debug!(
        file = %path.display(),
        language = language.name(),
        classes = classes.len(),
        "file parsed"
    );
    Ok(ParsedFile::new(path, classes))
}

/// Read and extract one file.
pub fn parse_file(path: &Path) -> Result<ParsedFile> {
    let source = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
    extract_file(path, &source)
}
