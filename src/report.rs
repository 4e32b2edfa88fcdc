//! Report assembler — flattens per-controller results into the final
//! report and attaches diagnostics to the controllers they concern.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::error::Result;
use crate::hierarchy::{ChainEnd, HierarchyChain};
use crate::symbols::{HttpMethod, MatchConstraints, Parameter, SymbolTable};

/// One resolved HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub http_method: HttpMethod,
    pub path: String,
    /// Concrete controller serving the endpoint (qualified name).
    pub controller: String,
    /// Class in the hierarchy that declares the handler method.
    pub declaring_class: String,
    pub declaring_method: String,
    /// File of the declaring class.
    pub file: PathBuf,
    pub line_range: (usize, usize),
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "MatchConstraints::is_empty")]
    pub constraints: MatchConstraints,
    /// The controller's chain stopped at a reference that could not be
    /// followed.
    pub unresolved_ancestor: bool,
}

impl Endpoint {
    /// Declared on an ancestor rather than the controller itself.
    pub fn is_inherited(&self) -> bool {
        self.controller != self.declaring_class
    }
}

/// Per-controller view of how resolution went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSummary {
    pub controller: String,
    pub file: PathBuf,
    /// Qualified names, child first.
    pub chain: Vec<String>,
    pub end: ChainEnd,
    pub endpoint_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub endpoints: Vec<Endpoint>,
    pub controllers: Vec<ControllerSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

/// What the linker and merger produced for one controller.
#[derive(Debug, Clone)]
pub struct ControllerResolution {
    pub chain: HierarchyChain,
    pub endpoints: Vec<Endpoint>,
}

/// Build the report. Resolutions must already be in discovery order;
/// `diagnostics` is drained.
pub fn assemble(
    table: &SymbolTable,
    resolutions: Vec<ControllerResolution>,
    diagnostics: &mut Diagnostics,
) -> Report {
    let diagnostics = diagnostics.drain();
    let mut report = Report {
        endpoints: Vec::new(),
        controllers: Vec::with_capacity(resolutions.len()),
        diagnostics: Vec::new(),
    };

    for resolution in resolutions {
        let controller = table.get(resolution.chain.start());
        let attached: Vec<Diagnostic> = diagnostics
            .iter()
            .filter(|d| {
                resolution
                    .chain
                    .links()
                    .iter()
                    .any(|&id| d.concerns(table.get(id)))
            })
            .cloned()
            .collect();

        report.controllers.push(ControllerSummary {
            controller: controller.qualified_name(),
            file: controller.file.clone(),
            chain: resolution
                .chain
                .links()
                .iter()
                .map(|&id| table.get(id).qualified_name())
                .collect(),
            end: resolution.chain.end().clone(),
            endpoint_count: resolution.endpoints.len(),
            diagnostics: attached,
        });
        report.endpoints.extend(resolution.endpoints);
    }

    report.diagnostics = diagnostics;
    report
}

impl Report {
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Human-readable listing: one line per endpoint, then diagnostics.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for endpoint in &self.endpoints {
            let _ = write!(
                out,
                "{:<7} {} ({}#{}",
                endpoint.http_method.as_str(),
                display_path(&endpoint.path),
                short_name(&endpoint.controller),
                endpoint.declaring_method
            );
            if endpoint.is_inherited() {
                let _ = write!(out, " via {}", short_name(&endpoint.declaring_class));
            }
            let _ = write!(
                out,
                ") [{}:{}]",
                endpoint.file.display(),
                endpoint.line_range.0
            );
            if !endpoint.constraints.headers.is_empty() {
                let _ = write!(out, " headers={}", endpoint.constraints.headers.join(","));
            }
            if endpoint.unresolved_ancestor {
                out.push_str(" [unresolved ancestor]");
            }
            out.push('\n');

            if !endpoint.parameters.is_empty() {
                let params: Vec<String> = endpoint
                    .parameters
                    .iter()
                    .map(|p| format!("{}:{} ({})", p.name, p.param_type, p.annotation))
                    .collect();
                let _ = writeln!(out, "        parameters: {}", params.join(", "));
            }
        }

        let _ = writeln!(
            out,
            "\n{} endpoints across {} controllers",
            self.endpoints.len(),
            self.controllers.len()
        );

        if !self.diagnostics.is_empty() {
            out.push_str("\nDiagnostics:\n");
            for diagnostic in &self.diagnostics {
                let _ = writeln!(out, "  {}", diagnostic);
            }
        }

        out
    }
}

fn short_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(empty)"
    } else {
        path
    }
}
