//! Symbol table — every declared class across all source roots.
//!
//! Classes live in a petgraph arena; `Extends` edges point from a class to
//! the class its superclass reference resolves to. Lookups go through two
//! indexes: simple name → candidates (in file order) and fully-qualified
//! name → class.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

use super::types::{ClassRecord, ParsedFile};
use crate::config::simple_name;
use crate::diagnostics::{Diagnostic, Diagnostics};

/// Arena index of a class.
pub type ClassId = NodeIndex;

/// Edge weight in the class graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Class extends class.
    Extends,
}

pub struct SymbolTable {
    graph: DiGraph<ClassRecord, Link>,
    /// Index: simple name -> candidates, in stable file order.
    simple_index: HashMap<String, Vec<ClassId>>,
    /// Index: `package.Outer.Name` -> class (first declaration wins).
    qualified_index: HashMap<String, ClassId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            simple_index: HashMap::new(),
            qualified_index: HashMap::new(),
        }
    }

    /// Build the table from parsed files.
    ///
    /// `files` order is the tie-break order for ambiguous names. Files are
    /// normalized in parallel and merged sequentially in that order.
    pub fn build(files: Vec<ParsedFile>, diagnostics: &mut Diagnostics) -> Self {
        let file_count = files.len();

        // Phase 1: per-file partial tables
        let partials: Vec<Vec<ClassRecord>> = files
            .into_par_iter()
            .map(|file| {
                file.classes
                    .into_iter()
                    .map(|mut class| {
                        if class.file.as_os_str().is_empty() {
                            class.file = file.path.clone();
                        }
                        class.superclass = class
                            .superclass
                            .as_deref()
                            .map(normalize_reference)
                            .filter(|s| !s.is_empty());
                        class
                    })
                    .collect()
            })
            .collect();

        // Phase 2: merge in file order
        let mut table = Self::new();
        for partial in partials {
            for class in partial {
                table.insert(class);
            }
        }

        // Phase 3: report name collisions, once per name, in discovery order
        for id in table.graph.node_indices() {
            let name = &table.graph[id].name;
            let candidates = &table.simple_index[name];
            if candidates.len() > 1 && candidates[0] == id {
                let names: Vec<String> = candidates
                    .iter()
                    .map(|&c| table.describe(c))
                    .collect();
                diagnostics.push(Diagnostic::ambiguous_symbol(name, &names, &names[0]));
            }
        }

        // Phase 4: link superclass references
        let ids: Vec<ClassId> = table.graph.node_indices().collect();
        let mut linked = 0;
        for id in ids {
            let target = table.graph[id]
                .superclass
                .as_deref()
                .and_then(|raw| table.resolve_reference(raw, id));
            if let Some(target) = target {
                table.graph.add_edge(id, target, Link::Extends);
                linked += 1;
            }
        }

        debug!(
            files = file_count,
            classes = table.len(),
            linked,
            "symbol table built"
        );
        table
    }

    fn insert(&mut self, class: ClassRecord) -> ClassId {
        let name = class.name.clone();
        let qualified = (class.package.is_some() || class.enclosing.is_some())
            .then(|| class.qualified_name());
        let id = self.graph.add_node(class);
        self.simple_index.entry(name).or_default().push(id);
        if let Some(qualified) = qualified {
            self.qualified_index.entry(qualified).or_insert(id);
        }
        id
    }

    // ─── Lookups ────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn get(&self, id: ClassId) -> &ClassRecord {
        &self.graph[id]
    }

    /// All classes in discovery order.
    pub fn ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.graph.node_indices()
    }

    /// Every class declared under a simple name, in file order.
    pub fn candidates(&self, name: &str) -> &[ClassId] {
        self.simple_index
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.candidates(name).len() > 1
    }

    /// Find a class by qualified name, or by simple name (first candidate).
    pub fn find(&self, name: &str) -> Option<ClassId> {
        self.qualified_index
            .get(name)
            .copied()
            .or_else(|| self.candidates(name).first().copied())
    }

    /// Resolve a superclass reference written inside class `from`.
    ///
    /// Dotted references are tried as written, then relative to `from`'s
    /// enclosing classes and package (`Outer.Inner` inside `com.app`), and
    /// finally against a same-named class without package info. Simple
    /// references prefer a candidate in `from`'s package, then the first
    /// candidate.
    pub fn resolve_reference(&self, raw: &str, from: ClassId) -> Option<ClassId> {
        let name = normalize_reference(raw);
        if name.is_empty() {
            return None;
        }

        if name.contains('.') {
            if let Some(&id) = self.qualified_index.get(name.as_str()) {
                return Some(id);
            }
            for scope in scopes(&self.graph[from]) {
                if let Some(&id) = self.qualified_index.get(&format!("{scope}.{name}")) {
                    return Some(id);
                }
            }
            return self
                .candidates(simple_name(&name))
                .iter()
                .copied()
                .find(|&c| self.graph[c].package.is_none() && self.graph[c].enclosing.is_none());
        }

        let candidates = self.candidates(&name);
        if let Some(package) = &self.graph[from].package {
            let same_package = candidates
                .iter()
                .copied()
                .find(|&c| self.graph[c].package.as_ref() == Some(package));
            if same_package.is_some() {
                return same_package;
            }
        }
        candidates.first().copied()
    }

    /// The class `id` extends, if its reference resolved.
    pub fn parent(&self, id: ClassId) -> Option<ClassId> {
        self.graph
            .edges_directed(id, Direction::Outgoing)
            .find(|e| *e.weight() == Link::Extends)
            .map(|e| e.target())
    }

    /// Classes that directly extend `id`, in discovery order.
    pub fn subclasses(&self, id: ClassId) -> Vec<ClassId> {
        let mut children: Vec<ClassId> = self
            .graph
            .edges_directed(id, Direction::Incoming)
            .filter(|e| *e.weight() == Link::Extends)
            .map(|e| e.source())
            .collect();
        children.sort();
        children
    }

    /// `package.Name (file)` for diagnostics.
    pub fn describe(&self, id: ClassId) -> String {
        let class = &self.graph[id];
        if class.file.as_os_str().is_empty() {
            class.qualified_name()
        } else {
            format!("{} ({})", class.qualified_name(), class.file.display())
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Lookup scopes of a class, innermost first: `com.app.Outer`, then
/// `com.app`.
fn scopes(class: &ClassRecord) -> Vec<String> {
    let package = class.package.as_deref().filter(|p| !p.is_empty());
    let mut outer: Vec<&str> = class
        .enclosing
        .as_deref()
        .map(|e| e.split('.').collect())
        .unwrap_or_default();
    let mut scopes = Vec::new();
    loop {
        let scope = package
            .into_iter()
            .chain(outer.iter().copied())
            .collect::<Vec<_>>()
            .join(".");
        if !scope.is_empty() {
            scopes.push(scope);
        }
        if outer.pop().is_none() {
            break;
        }
    }
    scopes
}

/// Strip generic arguments and constructor calls from a type reference:
/// `Base<T>` and `Base()` both become `Base`.
pub fn normalize_reference(raw: &str) -> String {
    raw.split(['<', '('])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
