//! Annotation merger — turns a controller's hierarchy chain into endpoints.
//!
//! The effective class prefix comes from the nearest class in the chain
//! that declares one; prefixes are never concatenated across ancestors.
//! Every route annotation on every method in the chain yields endpoints
//! under that prefix.

use tracing::debug;

use crate::config::{GenericFallback, ResolveOptions};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::hierarchy::HierarchyChain;
use crate::report::Endpoint;
use crate::symbols::{
    ClassRecord, HttpMethod, Mapping, MethodRecord, RouteAnnotation, SymbolTable,
};

pub struct AnnotationMerger<'a> {
    table: &'a SymbolTable,
    options: &'a ResolveOptions,
}

impl<'a> AnnotationMerger<'a> {
    pub fn new(table: &'a SymbolTable, options: &'a ResolveOptions) -> Self {
        Self { table, options }
    }

    /// Endpoints served by the controller at the start of `chain`, in chain
    /// order (controller first), then declaration order.
    pub fn merge(&self, chain: &HierarchyChain, diagnostics: &mut Diagnostics) -> Vec<Endpoint> {
        let controller = self.table.get(chain.start());
        let controller_name = controller.qualified_name();
        let prefix = effective_prefix(self.table, chain);
        let unresolved = chain.is_unresolved();
        let mut endpoints = Vec::new();

        for &id in chain.links() {
            let class = self.table.get(id);
            let declaring = class.qualified_name();
            for method in &class.methods {
                for annotation in &method.annotations {
                    let path = join_paths(&prefix, annotation.path.as_deref());
                    for verb in self.verbs(annotation, class, method, diagnostics) {
                        endpoints.push(Endpoint {
                            http_method: verb,
                            path: path.clone(),
                            controller: controller_name.clone(),
                            declaring_class: declaring.clone(),
                            declaring_method: method.name.clone(),
                            file: class.file.clone(),
                            line_range: (method.line_start, method.line_end),
                            parameters: method.parameters.clone(),
                            constraints: annotation.constraints.clone(),
                            unresolved_ancestor: unresolved,
                        });
                    }
                }
            }
        }

        debug!(
            controller = %controller_name,
            prefix = %prefix,
            endpoints = endpoints.len(),
            "annotations merged"
        );
        endpoints
    }

    /// Verbs an annotation expands to. Unusable verb attributes are
    /// reported and dropped.
    fn verbs(
        &self,
        annotation: &RouteAnnotation,
        class: &ClassRecord,
        method: &MethodRecord,
        diagnostics: &mut Diagnostics,
    ) -> Vec<HttpMethod> {
        if let Some(verb) = annotation.mapping.verb() {
            return vec![verb];
        }
        let Mapping::Generic {
            methods: raw_methods,
        } = &annotation.mapping
        else {
            return Vec::new();
        };

        if raw_methods.is_empty() {
            return match self.options.generic_without_method {
                GenericFallback::Any => vec![HttpMethod::Any],
                GenericFallback::Skip => {
                    diagnostics.push(Diagnostic::malformed_annotation(
                        class,
                        method,
                        "generic mapping has no method attribute; skipped",
                    ));
                    Vec::new()
                }
            };
        }

        let mut verbs = Vec::with_capacity(raw_methods.len());
        for raw in raw_methods {
            match HttpMethod::parse(raw) {
                Some(verb) if !verbs.contains(&verb) => verbs.push(verb),
                Some(_) => {}
                None => diagnostics.push(Diagnostic::malformed_annotation(
                    class,
                    method,
                    &format!("unknown request method {:?}; skipped", raw),
                )),
            }
        }
        verbs
    }
}

/// Path prefix from the nearest class in the chain declaring one; empty
/// when none does.
pub fn effective_prefix(table: &SymbolTable, chain: &HierarchyChain) -> String {
    chain
        .links()
        .iter()
        .find_map(|&id| table.get(id).prefix.as_ref())
        .and_then(|prefix| prefix.path.clone())
        .unwrap_or_default()
}

/// Combine a class prefix with a method path.
///
/// An absent or empty method path yields the prefix unchanged; an empty
/// prefix yields the method path unchanged. Otherwise exactly one `/`
/// separates the two.
pub fn join_paths(prefix: &str, path: Option<&str>) -> String {
    let path = path.unwrap_or_default();
    if path.is_empty() {
        return prefix.to_string();
    }
    if prefix.is_empty() {
        return path.to_string();
    }
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
