//! Soft-failure log shared by every resolution stage.
//!
//! Stages append; nothing reads until the report is assembled. A run
//! starts with an empty collector, and per-controller collectors are merged
//! back in controller order so the final log is deterministic.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::symbols::{ClassRecord, MethodRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Two or more classes share a simple name.
    AmbiguousSymbol,
    /// A superclass reference could not be followed.
    UnresolvedAncestor,
    /// A superclass chain loops back on itself.
    CyclicAncestor,
    /// A route annotation was unusable and skipped.
    MalformedAnnotation,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::AmbiguousSymbol => write!(f, "ambiguous-symbol"),
            DiagnosticKind::UnresolvedAncestor => write!(f, "unresolved-ancestor"),
            DiagnosticKind::CyclicAncestor => write!(f, "cyclic-ancestor"),
            DiagnosticKind::MalformedAnnotation => write!(f, "malformed-annotation"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Expected degradation, e.g. a framework base class.
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One soft failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Class the diagnostic is about: qualified name, or the bare simple
    /// name for ambiguous symbols.
    pub subject: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Diagnostic {
    pub fn ambiguous_symbol(name: &str, candidates: &[String], chosen: &str) -> Self {
        Self {
            kind: DiagnosticKind::AmbiguousSymbol,
            severity: Severity::Warning,
            subject: name.to_string(),
            detail: format!(
                "{} classes named {}: {}; default resolution picks {}",
                candidates.len(),
                name,
                candidates.join(", "),
                chosen
            ),
            file: None,
        }
    }

    pub fn unresolved_ancestor(class: &ClassRecord, missing: &str, external: bool) -> Self {
        let (severity, detail) = if external {
            (
                Severity::Info,
                format!("superclass {} is a framework/library class; not followed", missing),
            )
        } else {
            (
                Severity::Warning,
                format!("superclass {} not found in any source root", missing),
            )
        };
        Self {
            kind: DiagnosticKind::UnresolvedAncestor,
            severity,
            subject: class.qualified_name(),
            detail,
            file: non_empty(&class.file),
        }
    }

    pub fn cyclic_ancestor(class: &ClassRecord, cycle: &[String]) -> Self {
        Self {
            kind: DiagnosticKind::CyclicAncestor,
            severity: Severity::Warning,
            subject: class.qualified_name(),
            detail: format!("inheritance cycle: {}", cycle.join(" -> ")),
            file: non_empty(&class.file),
        }
    }

    /// The declaring line is part of the detail so overloads sharing a
    /// name are reported separately.
    pub fn malformed_annotation(class: &ClassRecord, method: &MethodRecord, problem: &str) -> Self {
        let location = if method.line_start > 0 {
            format!("{}#{} (line {})", class.name, method.name, method.line_start)
        } else {
            format!("{}#{}", class.name, method.name)
        };
        Self {
            kind: DiagnosticKind::MalformedAnnotation,
            severity: Severity::Warning,
            subject: class.qualified_name(),
            detail: format!("{}: {}", location, problem),
            file: non_empty(&class.file),
        }
    }

    /// Whether this diagnostic is about `class`.
    ///
    /// Only ambiguity reports use a bare simple name as subject; every other
    /// kind must match the qualified name exactly.
    pub fn concerns(&self, class: &ClassRecord) -> bool {
        self.subject == class.qualified_name()
            || (self.kind == DiagnosticKind::AmbiguousSymbol && self.subject == class.name)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}: {}", self.severity, self.kind, self.subject, self.detail)
    }
}

fn non_empty(path: &std::path::Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path.to_path_buf())
    }
}

/// Append-only diagnostic log.
///
/// Identical entries (same kind, subject and detail) are stored once.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    seen: HashSet<(DiagnosticKind, String, String)>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.is_new(&diagnostic) {
            return;
        }
        match diagnostic.severity {
            Severity::Warning => warn!(
                kind = %diagnostic.kind,
                subject = %diagnostic.subject,
                "{}",
                diagnostic.detail
            ),
            Severity::Info => debug!(
                kind = %diagnostic.kind,
                subject = %diagnostic.subject,
                "{}",
                diagnostic.detail
            ),
        }
        self.entries.push(diagnostic);
    }

    /// Append everything from another collector, keeping its order.
    /// Entries were logged when first pushed.
    pub fn merge(&mut self, other: Diagnostics) {
        for diagnostic in other.entries {
            if self.is_new(&diagnostic) {
                self.entries.push(diagnostic);
            }
        }
    }

    fn is_new(&mut self, diagnostic: &Diagnostic) -> bool {
        self.seen.insert((
            diagnostic.kind,
            diagnostic.subject.clone(),
            diagnostic.detail.clone(),
        ))
    }

    /// Take all entries, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.seen.clear();
        std::mem::take(&mut self.entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
