//! Hierarchy linker — walks a class's superclass chain through the symbol
//! table.
//!
//! A chain is child-first and always finite: it ends at a class with no
//! superclass, at a reference that cannot be followed, or where a class
//! shows up a second time.

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::config::ResolveOptions;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::symbols::{ClassId, SymbolTable};

/// How a chain terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainEnd {
    /// The last class has no superclass (or extends a root class).
    Root,
    /// The last class extends something that cannot be followed.
    Unresolved {
        reference: String,
        /// Known framework/library base class rather than a missing one.
        external: bool,
    },
    /// The last class extends a class already in the chain.
    Cycle { back_to: String },
}

#[derive(Debug, Clone)]
pub struct HierarchyChain {
    links: Vec<ClassId>,
    end: ChainEnd,
}

impl HierarchyChain {
    /// Classes in the chain, child first.
    pub fn links(&self) -> &[ClassId] {
        &self.links
    }

    /// The class the chain was built for.
    pub fn start(&self) -> ClassId {
        self.links[0]
    }

    pub fn end(&self) -> &ChainEnd {
        &self.end
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self.end, ChainEnd::Unresolved { .. })
    }

    pub fn is_cyclic(&self) -> bool {
        matches!(self.end, ChainEnd::Cycle { .. })
    }

    /// Classes in root-first order.
    pub fn root_first(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.links.iter().rev().copied()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

pub struct HierarchyLinker<'a> {
    table: &'a SymbolTable,
    options: &'a ResolveOptions,
}

impl<'a> HierarchyLinker<'a> {
    pub fn new(table: &'a SymbolTable, options: &'a ResolveOptions) -> Self {
        Self { table, options }
    }

    /// Build the chain for `start`. Terminating links are reported to
    /// `diagnostics`; everything collected before them is kept.
    pub fn link(&self, start: ClassId, diagnostics: &mut Diagnostics) -> HierarchyChain {
        let mut links = vec![start];
        let mut visited: HashSet<ClassId> = HashSet::from([start]);
        let mut current = start;

        let end = loop {
            let class = self.table.get(current);
            let Some(reference) = class.superclass.as_deref() else {
                break ChainEnd::Root;
            };

            if self.options.is_root_class(reference) {
                break ChainEnd::Root;
            }

            if self.options.is_framework_base(reference) {
                diagnostics.push(Diagnostic::unresolved_ancestor(class, reference, true));
                break ChainEnd::Unresolved {
                    reference: reference.to_string(),
                    external: true,
                };
            }

            match self.table.parent(current) {
                None => {
                    diagnostics.push(Diagnostic::unresolved_ancestor(class, reference, false));
                    break ChainEnd::Unresolved {
                        reference: reference.to_string(),
                        external: false,
                    };
                }
                Some(parent) if visited.contains(&parent) => {
                    let back_to = self.table.get(parent).qualified_name();
                    let mut cycle: Vec<String> = links
                        .iter()
                        .skip_while(|&&id| id != parent)
                        .map(|&id| self.table.get(id).qualified_name())
                        .collect();
                    cycle.push(back_to.clone());
                    diagnostics.push(Diagnostic::cyclic_ancestor(class, &cycle));
                    break ChainEnd::Cycle { back_to };
                }
                Some(parent) => {
                    visited.insert(parent);
                    links.push(parent);
                    current = parent;
                }
            }
        };

        debug!(
            class = %self.table.get(start).qualified_name(),
            depth = links.len(),
            end = ?end,
            "hierarchy linked"
        );

        HierarchyChain { links, end }
    }
}
