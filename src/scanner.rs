//! Source root scanner.
//!
//! Walks source roots respecting .gitignore, parses every supported file
//! with tree-sitter in parallel, and hands the records to the resolution
//! core in a stable path order.

use ignore::WalkBuilder;
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{RouteConfig, ScanConfig};
use crate::engine::resolve_endpoints;
use crate::error::{Result, ScanError};
use crate::parser::{parse_file, SupportedLanguage};
use crate::report::Report;
use crate::symbols::ParsedFile;

/// Parsed files in path order, plus files that could not be parsed.
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub files: Vec<ParsedFile>,
    pub skipped: Vec<(PathBuf, String)>,
}

impl ScanOutput {
    pub fn class_count(&self) -> usize {
        self.files.iter().map(|f| f.classes.len()).sum()
    }
}

/// Collect supported source files under `root`.
fn source_files(root: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(ScanError::io(
            root,
            io::Error::new(io::ErrorKind::NotFound, "source root does not exist"),
        ));
    }

    let files = WalkBuilder::new(root)
        .hidden(!config.hidden)
        .git_ignore(config.git_ignore)
        .git_global(config.git_ignore)
        .git_exclude(config.git_ignore)
        .follow_links(config.follow_links)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| SupportedLanguage::from_path(entry.path()).is_some())
        .map(|entry| entry.into_path())
        .collect();
    Ok(files)
}

/// Scan all roots and parse every supported file.
///
/// Files are sorted by path across all roots; that order decides which
/// class wins when a simple name is ambiguous.
pub fn scan_roots(roots: &[PathBuf], config: &RouteConfig) -> Result<ScanOutput> {
    if roots.is_empty() {
        return Err(ScanError::NoSourceRoots);
    }

    let mut paths = Vec::new();
    for root in roots {
        paths.extend(source_files(root, &config.scan)?);
    }
    paths.sort();
    paths.dedup();

    let results: Vec<(PathBuf, Result<ParsedFile>)> = paths
        .into_par_iter()
        .map(|path| {
            let parsed = parse_file(&path);
            (path, parsed)
        })
        .collect();

    let mut output = ScanOutput::default();
    for (path, result) in results {
        match result {
            Ok(parsed) => output.files.push(parsed),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping file");
                output.skipped.push((path, e.to_string()));
            }
        }
    }

    info!(
        roots = roots.len(),
        files = output.files.len(),
        classes = output.class_count(),
        skipped = output.skipped.len(),
        "scan complete"
    );
    Ok(output)
}

/// Scan one directory and resolve its endpoints.
pub fn scan_directory(root: &Path, config: &RouteConfig) -> Result<Report> {
    let output = scan_roots(&[root.to_path_buf()], config)?;
    Ok(resolve_endpoints(output.files, &config.resolve))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_empty_roots_rejected() {
        let err = scan_roots(&[], &RouteConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::NoSourceRoots));
    }

    #[test]
    fn test_missing_root_is_error() {
        let err = scan_roots(&[PathBuf::from("/nonexistent/routescope")], &RouteConfig::default())
            .unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[test]
    fn test_files_sorted_across_roots() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        write(b.path(), "z/Zeta.java", "class Zeta {}");
        write(a.path(), "m/Mu.java", "class Mu {}");
        write(a.path(), "a/Alpha.java", "class Alpha {}");
        write(a.path(), "notes.txt", "not java");

        let output = scan_roots(
            &[b.path().to_path_buf(), a.path().to_path_buf()],
            &RouteConfig::default(),
        )
        .unwrap();

        let paths: Vec<&PathBuf> = output.files.iter().map(|f| &f.path).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
        assert_eq!(output.files.len(), 3);
        assert_eq!(output.class_count(), 3);
        assert!(output.skipped.is_empty());
    }

    #[test]
    fn test_hidden_directories_skipped_by_default() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".hidden/Secret.java", "class Secret {}");
        write(dir.path(), "Visible.java", "class Visible {}");

        let output = scan_roots(&[dir.path().to_path_buf()], &RouteConfig::default()).unwrap();
        assert_eq!(output.files.len(), 1);

        let mut config = RouteConfig::default();
        config.scan.hidden = true;
        let output = scan_roots(&[dir.path().to_path_buf()], &config).unwrap();
        assert_eq!(output.files.len(), 2);
    }
}
