//! Resolution pipeline: symbol table → linker → merger → report.
//!
//! Controllers are independent once the table is built, so they are
//! resolved in parallel, each with its own diagnostics; results are merged
//! back in discovery order.

use rayon::prelude::*;
use tracing::info;

use crate::config::ResolveOptions;
use crate::diagnostics::Diagnostics;
use crate::hierarchy::HierarchyLinker;
use crate::merge::AnnotationMerger;
use crate::report::{assemble, ControllerResolution, Report};
use crate::symbols::{ClassId, ClassRecord, ParsedFile, SymbolTable};

/// Whether a class is resolved as a concrete controller.
pub fn is_controller(class: &ClassRecord, options: &ResolveOptions) -> bool {
    if class.is_abstract {
        return false;
    }
    class.has_marker(&options.controller_markers)
        || (options.prefix_marks_controller && class.prefix.is_some())
}

/// Controllers in discovery order.
pub fn controllers(table: &SymbolTable, options: &ResolveOptions) -> Vec<ClassId> {
    table
        .ids()
        .filter(|&id| is_controller(table.get(id), options))
        .collect()
}

/// Resolve every controller's endpoints from a set of parsed files.
///
/// `files` order is the tie-break order for ambiguous class names. Never
/// fails; problems end up in `Report::diagnostics`.
pub fn resolve_endpoints(files: Vec<ParsedFile>, options: &ResolveOptions) -> Report {
    let mut diagnostics = Diagnostics::new();
    let table = SymbolTable::build(files, &mut diagnostics);
    resolve_table(&table, options, diagnostics)
}

/// Resolve against an already built table. `diagnostics` carries whatever
/// the table build reported.
pub fn resolve_table(
    table: &SymbolTable,
    options: &ResolveOptions,
    mut diagnostics: Diagnostics,
) -> Report {
    let controllers = controllers(table, options);
    info!(
        classes = table.len(),
        controllers = controllers.len(),
        "resolving endpoints"
    );

    let linker = HierarchyLinker::new(table, options);
    let merger = AnnotationMerger::new(table, options);

    let results: Vec<(ControllerResolution, Diagnostics)> = controllers
        .par_iter()
        .map(|&id| {
            let mut local = Diagnostics::new();
            let chain = linker.link(id, &mut local);
            let endpoints = merger.merge(&chain, &mut local);
            (ControllerResolution { chain, endpoints }, local)
        })
        .collect();

    let mut resolutions = Vec::with_capacity(results.len());
    for (resolution, local) in results {
        diagnostics.merge(local);
        resolutions.push(resolution);
    }

    let report = assemble(table, resolutions, &mut diagnostics);
    info!(
        endpoints = report.endpoints.len(),
        diagnostics = report.diagnostics.len(),
        "resolution finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::hierarchy::ChainEnd;
    use crate::symbols::{HttpMethod, Mapping, MethodRecord, RouteAnnotation};

    fn route(mapping: Mapping, path: &str) -> RouteAnnotation {
        RouteAnnotation::new(mapping, Some(path))
    }

    /// The class_path fixture set: valid parent, missing parent, framework
    /// parent, and a file whose name differs from its class.
    fn class_path_files() -> Vec<ParsedFile> {
        vec![
            ParsedFile::new(
                "ExternalLibraryController.java",
                vec![ClassRecord::new("ExternalLibraryController")
                    .marked("RestController")
                    .with_prefix(Some("/api/external"))
                    .extends("JpaRepository")
                    .with_method(MethodRecord::new("getList", vec![route(Mapping::Get, "/list")]))
                    .with_method(MethodRecord::new("delete", vec![route(Mapping::Delete, "/{id}")]))],
            ),
            ParsedFile::new(
                "MissingParentController.java",
                vec![ClassRecord::new("MissingParentController")
                    .marked("RestController")
                    .with_prefix(Some("/api/missing"))
                    .extends("NonExistentParentClass")
                    .with_method(MethodRecord::new("getTest", vec![route(Mapping::Get, "/test")]))
                    .with_method(MethodRecord::new("update", vec![route(Mapping::Put, "/update")]))],
            ),
            ParsedFile::new(
                "SomeParentClass.java",
                vec![ClassRecord::new("SomeParentClass")
                    .with_method(MethodRecord::new("parentMethod", vec![route(Mapping::Get, "/method")]))
                    .with_method(MethodRecord::new("createParent", vec![route(Mapping::Post, "/create")]))],
            ),
            ParsedFile::new(
                "ValidParentController.java",
                vec![ClassRecord::new("ValidParentController")
                    .marked("RestController")
                    .with_prefix(Some("/api/child"))
                    .extends("SomeParentClass")
                    .with_method(MethodRecord::new("childMethod", vec![route(Mapping::Get, "/child-method")]))
                    .with_method(MethodRecord::new("delete", vec![route(Mapping::Delete, "/{id}")]))],
            ),
            ParsedFile::new(
                "WrongClassNameFile.java",
                vec![ClassRecord::new("ActualClassName")
                    .marked("RestController")
                    .with_prefix(Some("/api/wrong"))
                    .extends("SomeParentClass")
                    .with_method(MethodRecord::new("getActual", vec![route(Mapping::Get, "/actual")]))],
            ),
        ]
    }

    #[test]
    fn test_controller_detection() {
        let options = ResolveOptions::default();
        assert!(is_controller(&ClassRecord::new("A").marked("RestController"), &options));
        assert!(is_controller(&ClassRecord::new("B").with_prefix(Some("/b")), &options));
        assert!(!is_controller(&ClassRecord::new("C"), &options));

        let mut abstract_base = ClassRecord::new("D").marked("RestController");
        abstract_base.is_abstract = true;
        assert!(!is_controller(&abstract_base, &options));

        let strict = ResolveOptions {
            prefix_marks_controller: false,
            ..ResolveOptions::default()
        };
        assert!(!is_controller(&ClassRecord::new("B").with_prefix(Some("/b")), &strict));
    }

    #[test]
    fn test_class_path_fixtures() {
        let report = resolve_endpoints(class_path_files(), &ResolveOptions::default());

        let controllers: Vec<&str> = report
            .controllers
            .iter()
            .map(|c| c.controller.as_str())
            .collect();
        assert_eq!(
            controllers,
            vec![
                "ExternalLibraryController",
                "MissingParentController",
                "ValidParentController",
                "ActualClassName"
            ]
        );

        let external: Vec<_> = report
            .endpoints
            .iter()
            .filter(|e| e.controller == "ExternalLibraryController")
            .collect();
        assert_eq!(external.len(), 2);
        assert_eq!(external[0].path, "/api/external/list");
        assert_eq!(external[1].http_method, HttpMethod::Delete);
        assert!(external.iter().all(|e| e.unresolved_ancestor));

        let valid: Vec<&str> = report
            .endpoints
            .iter()
            .filter(|e| e.controller == "ValidParentController")
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(
            valid,
            vec!["/api/child/child-method", "/api/child/{id}", "/api/child/method", "/api/child/create"]
        );

        let wrong: Vec<_> = report
            .endpoints
            .iter()
            .filter(|e| e.controller == "ActualClassName")
            .collect();
        assert_eq!(wrong.len(), 3);
        assert_eq!(wrong[0].path, "/api/wrong/actual");
        assert_eq!(wrong[1].declaring_class, "SomeParentClass");
        assert!(wrong.iter().all(|e| !e.unresolved_ancestor));

        let unresolved: Vec<_> = report
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::UnresolvedAncestor)
            .collect();
        assert_eq!(unresolved.len(), 2);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(
            report.controllers[1].end,
            ChainEnd::Unresolved {
                reference: "NonExistentParentClass".to_string(),
                external: false
            }
        );
    }

    #[test]
    fn test_unrelated_controllers_survive_broken_ones() {
        let mut files = class_path_files();
        files.push(ParsedFile::new(
            "Loop.java",
            vec![
                ClassRecord::new("LoopA")
                    .marked("RestController")
                    .extends("LoopB")
                    .with_method(MethodRecord::new("a", vec![route(Mapping::Get, "/a")])),
                ClassRecord::new("LoopB")
                    .extends("LoopA")
                    .with_method(MethodRecord::new("b", vec![route(Mapping::Get, "/b")])),
            ],
        ));
        let report = resolve_endpoints(files, &ResolveOptions::default());

        let looped: Vec<&str> = report
            .endpoints
            .iter()
            .filter(|e| e.controller == "LoopA")
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(looped, vec!["/a", "/b"]);
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::CyclicAncestor));
        assert_eq!(report.controllers.len(), 5);
    }

    #[test]
    fn test_shared_missing_ancestor_reported_once() {
        let files = vec![ParsedFile::new(
            "Shared.java",
            vec![
                ClassRecord::new("Base").extends("Gone"),
                ClassRecord::new("One").marked("RestController").extends("Base"),
                ClassRecord::new("Two").marked("RestController").extends("Base"),
            ],
        )];
        let report = resolve_endpoints(files, &ResolveOptions::default());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.controllers[0].diagnostics.len(), 1);
        assert_eq!(report.controllers[1].diagnostics.len(), 1);
    }

    #[test]
    fn test_namesake_warning_stays_with_its_own_controller() {
        let files = vec![
            ParsedFile::new(
                "x/Base.java",
                vec![ClassRecord::new("Base")
                    .in_package("com.x")
                    .marked("RestController")
                    .with_method(MethodRecord::new("ok", vec![route(Mapping::Get, "/ok")]))],
            ),
            ParsedFile::new(
                "Base.kt",
                vec![ClassRecord::new("Base")
                    .marked("RestController")
                    .extends("Gone")
                    .with_method(MethodRecord::new("lost", vec![route(Mapping::Get, "/lost")]))],
            ),
        ];
        let report = resolve_endpoints(files, &ResolveOptions::default());

        let packaged = &report.controllers[0];
        assert_eq!(packaged.controller, "com.x.Base");
        let kinds: Vec<DiagnosticKind> = packaged.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::AmbiguousSymbol]);

        let unpackaged = &report.controllers[1];
        assert!(unpackaged
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::UnresolvedAncestor));
    }

    #[test]
    fn test_nested_parent_by_outer_name() {
        let files = vec![
            ParsedFile::new(
                "app/Outer.java",
                vec![
                    ClassRecord::new("Outer").in_package("com.app"),
                    ClassRecord::new("Inner")
                        .in_package("com.app")
                        .nested_in("Outer")
                        .with_method(MethodRecord::new("inner", vec![route(Mapping::Get, "/inner")])),
                ],
            ),
            ParsedFile::new(
                "app/Ctl.java",
                vec![ClassRecord::new("Ctl")
                    .in_package("com.app")
                    .marked("RestController")
                    .with_prefix(Some("/api/own"))
                    .extends("Outer.Inner")],
            ),
        ];
        let report = resolve_endpoints(files, &ResolveOptions::default());

        assert_eq!(report.endpoints.len(), 1);
        let endpoint = &report.endpoints[0];
        assert_eq!(endpoint.path, "/api/own/inner");
        assert_eq!(endpoint.declaring_class, "com.app.Outer.Inner");
        assert!(!endpoint.unresolved_ancestor);
        assert_eq!(report.controllers[0].end, ChainEnd::Root);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let options = ResolveOptions::default();
        let first = resolve_endpoints(class_path_files(), &options);
        let second = resolve_endpoints(class_path_files(), &options);
        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}
