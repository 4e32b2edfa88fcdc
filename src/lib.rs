//! # routescope
//!
//! Static HTTP endpoint discovery for annotated controller class
//! hierarchies.
//!
//! Controllers often inherit handler methods from base classes that carry
//! their own route annotations. routescope indexes every class it parses,
//! walks each controller's superclass chain, and reports the full set of
//! endpoints the controller serves, under the right class prefix.
//!
//! ## Key Features
//!
//! - **Inheritance-aware**: handlers on ancestors are served under the
//!   controller's prefix
//! - **Never fails on bad input**: missing ancestors, cycles and malformed
//!   annotations become diagnostics
//! - **Deterministic**: identical input gives byte-identical output
//! - **Pluggable front end**: Java and Kotlin via tree-sitter, anything
//!   else via JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use routescope::{scan_directory, RouteConfig};
//! use std::path::Path;
//!
//! let report = scan_directory(Path::new("src/main/java"), &RouteConfig::default())?;
//! for endpoint in &report.endpoints {
//!     println!("{} {}", endpoint.http_method, endpoint.path);
//! }
//! # Ok::<(), routescope::ScanError>(())
//! ```

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod merge;
pub mod parser;
pub mod report;
pub mod scanner;
pub mod symbols;

// Re-exports for convenience
pub use error::{Result, ScanError};

pub use config::{GenericFallback, ResolveOptions, RouteConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use engine::{resolve_endpoints, resolve_table};
pub use hierarchy::{ChainEnd, HierarchyChain, HierarchyLinker};
pub use merge::{join_paths, AnnotationMerger};
pub use parser::SupportedLanguage;
pub use report::{ControllerSummary, Endpoint, Report};
pub use scanner::{scan_directory, scan_roots, ScanOutput};
pub use symbols::{
    ClassRecord, HttpMethod, Mapping, MethodRecord, ParsedFile, RouteAnnotation, SymbolTable,
};
