//! Kotlin class extraction via AST traversal.
//!
//! Produces the same records as the Java front end:
//!   @RestController
//!   @RequestMapping("/api/users")
//!   class UserController : BaseController() {
//!       @GetMapping(value = ["/{id}"])
//!       fun get(@PathVariable id: Long): User = ...
//!   }
//!
//! The superclass is the delegation specifier written as a constructor
//! call (`: Base()`); bare types after the colon are interfaces.

use tree_sitter::Node;

use super::annotation::{strip_quotes, Annotation};
use crate::symbols::{
    normalize_reference, ClassRecord, MethodRecord, Parameter, RouteAnnotation, RoutePrefix,
};

/// Extract top-level and member classes from a Kotlin AST.
pub fn extract_kotlin_classes(root: &Node, source: &[u8]) -> Vec<ClassRecord> {
    let package = find_child(root, "package_header")
        .and_then(|header| find_child(&header, "identifier"))
        .and_then(|id| id.utf8_text(source).ok())
        .map(|s| s.trim().to_string());

    let mut classes = Vec::new();
    for i in 0..root.child_count() {
        if let Some(child) = root.child(i) {
            extract_from_node(&child, source, package.as_deref(), None, &mut classes);
        }
    }
    classes
}

fn extract_from_node(
    node: &Node,
    source: &[u8],
    package: Option<&str>,
    enclosing: Option<&str>,
    classes: &mut Vec<ClassRecord>,
) {
    if node.kind() != "class_declaration" {
        return;
    }
    let Some(name) = find_child(node, "type_identifier").and_then(|n| n.utf8_text(source).ok())
    else {
        return;
    };

    if !has_keyword(node, "interface") {
        classes.push(extract_class(node, name, source, package, enclosing));
    }

    let Some(body) = find_child(node, "class_body").or_else(|| find_child(node, "enum_class_body"))
    else {
        return;
    };
    let scope = match enclosing {
        Some(outer) => format!("{outer}.{name}"),
        None => name.to_string(),
    };
    for i in 0..body.child_count() {
        if let Some(member) = body.child(i) {
            extract_from_node(&member, source, package, Some(&scope), classes);
        }
    }
}

fn extract_class(
    node: &Node,
    name: &str,
    source: &[u8],
    package: Option<&str>,
    enclosing: Option<&str>,
) -> ClassRecord {
    let mut class = ClassRecord::new(name);
    class.package = package.map(|p| p.to_string());
    class.enclosing = enclosing.map(|e| e.to_string());
    class.line_start = node.start_position().row + 1;
    class.line_end = node.end_position().row + 1;

    if let Some(modifiers) = find_child(node, "modifiers") {
        // `open` and `final` only affect subclassing; concrete either way
        class.is_abstract = modifier_keywords(&modifiers, source).any(|m| m == "abstract");
        for annotation in annotations(&modifiers, source) {
            if annotation.name == "RequestMapping" {
                class.prefix = Some(RoutePrefix {
                    path: annotation.path(),
                });
            }
            class.markers.push(annotation.name);
        }
    }

    class.superclass = children(node)
        .filter(|c| c.kind() == "delegation_specifier")
        .find_map(|spec| find_child(&spec, "constructor_invocation"))
        .and_then(|call| find_child(&call, "user_type"))
        .and_then(|t| t.utf8_text(source).ok())
        .map(normalize_reference)
        .filter(|s| !s.is_empty());

    if let Some(body) = find_child(node, "class_body") {
        for child in children(&body) {
            if child.kind() == "function_declaration" {
                if let Some(method) = extract_method(&child, source) {
                    class.methods.push(method);
                }
            }
        }
    }

    class
}

/// A function with at least one route annotation.
fn extract_method(node: &Node, source: &[u8]) -> Option<MethodRecord> {
    let name = find_child(node, "simple_identifier").and_then(|n| n.utf8_text(source).ok())?;

    let modifiers = find_child(node, "modifiers")?;
    let routes: Vec<RouteAnnotation> = annotations(&modifiers, source)
        .into_iter()
        .filter_map(|annotation| annotation.into_route())
        .collect();
    if routes.is_empty() {
        return None;
    }

    let mut method = MethodRecord::new(name, routes);
    method.line_start = node.start_position().row + 1;
    method.line_end = node.end_position().row + 1;
    if let Some(params) = find_child(node, "function_value_parameters") {
        method.parameters = extract_parameters(&params, source);
    }
    Some(method)
}

/// Parameter annotations sit in a `parameter_modifiers` sibling just
/// before each `parameter`.
fn extract_parameters(node: &Node, source: &[u8]) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut pending: Vec<Annotation> = Vec::new();
    for child in children(node) {
        match child.kind() {
            "parameter_modifiers" => pending = annotations(&child, source),
            "parameter" => {
                let binding = pending.drain(..).find(Annotation::is_binding);
                let Some(binding) = binding else { continue };
                let name = find_child(&child, "simple_identifier")
                    .and_then(|n| n.utf8_text(source).ok());
                let param_type = child
                    .named_child(child.named_child_count().saturating_sub(1))
                    .filter(|t| t.kind() != "simple_identifier")
                    .and_then(|t| t.utf8_text(source).ok());
                if let (Some(name), Some(param_type)) = (name, param_type) {
                    parameters.push(Parameter {
                        name: name.to_string(),
                        param_type: param_type.to_string(),
                        annotation: binding.name,
                    });
                }
            }
            _ => {}
        }
    }
    parameters
}

// ─── Annotations ─────────────────────────────────────────────────────────────

/// All annotations inside a `modifiers` or `parameter_modifiers` node.
/// `@[A B]` contributes one annotation per entry.
fn annotations(modifiers: &Node, source: &[u8]) -> Vec<Annotation> {
    let mut found = Vec::new();
    for annotation in children(modifiers).filter(|c| c.kind() == "annotation") {
        for entry in children(&annotation) {
            match entry.kind() {
                "user_type" => {
                    if let Ok(name) = entry.utf8_text(source) {
                        found.push(Annotation::new(name, Vec::new()));
                    }
                }
                "constructor_invocation" => {
                    let Some(name) = find_child(&entry, "user_type")
                        .and_then(|n| n.utf8_text(source).ok())
                    else {
                        continue;
                    };
                    let attributes = find_child(&entry, "value_arguments")
                        .map(|args| extract_attributes(&args, source))
                        .unwrap_or_default();
                    found.push(Annotation::new(name, attributes));
                }
                _ => {}
            }
        }
    }
    found
}

/// Attributes of `value_arguments`: `key = expr` is named, anything else
/// is the positional `value`.
fn extract_attributes(args: &Node, source: &[u8]) -> Vec<(String, Vec<String>)> {
    let mut attributes = Vec::new();
    for argument in children(args).filter(|c| c.kind() == "value_argument") {
        let named: Vec<Node> = children(&argument)
            .filter(|c| c.is_named() && !c.is_extra() && c.kind() != "annotation")
            .collect();
        let Some(value) = named.last() else { continue };
        let key = if has_keyword(&argument, "=") && named.len() > 1 {
            named[0].utf8_text(source).ok().map(str::trim)
        } else {
            None
        };
        attributes.push((
            key.unwrap_or("value").to_string(),
            expression_values(value, source),
        ));
    }
    attributes
}

/// Flatten an argument expression: string literals are unquoted,
/// collection literals and `arrayOf(...)` are expanded, anything else is
/// kept as source text.
fn expression_values(node: &Node, source: &[u8]) -> Vec<String> {
    match node.kind() {
        "collection_literal" => children(node)
            .filter(|c| c.is_named() && !c.is_extra())
            .flat_map(|c| expression_values(&c, source))
            .collect(),
        "call_expression" if is_array_of(node, source) => children(node)
            .filter(|c| c.kind() == "call_suffix")
            .filter_map(|suffix| find_child(&suffix, "value_arguments"))
            .flat_map(|args| {
                children(&args)
                    .filter(|c| c.kind() == "value_argument")
                    .filter_map(|arg| last_named(&arg))
                    .flat_map(|value| expression_values(&value, source))
                    .collect::<Vec<_>>()
            })
            .collect(),
        "string_literal" => node
            .utf8_text(source)
            .ok()
            .map(|s| vec![strip_quotes(s)])
            .unwrap_or_default(),
        _ => node
            .utf8_text(source)
            .ok()
            .map(|s| vec![s.trim().to_string()])
            .unwrap_or_default(),
    }
}

fn is_array_of(call: &Node, source: &[u8]) -> bool {
    call.named_child(0)
        .and_then(|callee| callee.utf8_text(source).ok())
        .is_some_and(|callee| callee == "arrayOf")
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn children<'t>(node: &Node<'t>) -> impl Iterator<Item = Node<'t>> {
    let node = *node;
    (0..node.child_count()).filter_map(move |i| node.child(i))
}

fn find_child<'t>(node: &Node<'t>, kind: &str) -> Option<Node<'t>> {
    children(node).find(|child| child.kind() == kind)
}

fn last_named<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    children(node)
        .filter(|c| c.is_named() && !c.is_extra() && c.kind() != "annotation")
        .last()
}

fn has_keyword(node: &Node, keyword: &str) -> bool {
    children(node).any(|child| !child.is_named() && child.kind() == keyword)
}

/// Modifier keywords (`abstract`, `open`, `public`, ...) as written.
fn modifier_keywords<'a>(
    modifiers: &Node<'a>,
    source: &'a [u8],
) -> impl Iterator<Item = &'a str> {
    children(modifiers)
        .filter(|c| c.kind() != "annotation")
        .filter_map(move |c| c.utf8_text(source).ok())
        .map(str::trim)
}
