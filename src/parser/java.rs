//! Java class extraction via AST traversal.
//!
//! Collects every class declaration with what route resolution needs:
//!   @RestController
//!   @RequestMapping("/api/users")
//!   public class UserController extends BaseController {
//!       @GetMapping("/{id}")
//!       public User get(@PathVariable Long id) { ... }
//!   }

use tree_sitter::Node;

use super::annotation::{strip_quotes, Annotation};
use crate::symbols::{
    normalize_reference, ClassRecord, MethodRecord, Parameter, RouteAnnotation, RoutePrefix,
};

/// Extract top-level and member classes from a Java AST.
///
/// Local and anonymous classes inside method bodies are not part of the
/// type namespace and are never extracted.
pub fn extract_java_classes(root: &Node, source: &[u8]) -> Vec<ClassRecord> {
    let package = extract_package(root, source);
    let mut classes = Vec::new();
    for i in 0..root.child_count() {
        if let Some(child) = root.child(i) {
            extract_from_node(&child, source, package.as_deref(), None, &mut classes);
        }
    }
    classes
}

/// Package name from the `package` declaration, if any.
fn extract_package(root: &Node, source: &[u8]) -> Option<String> {
    let count = root.child_count();
    for i in 0..count {
        let Some(child) = root.child(i) else { continue };
        if child.kind() != "package_declaration" {
            continue;
        }
        for j in 0..child.child_count() {
            if let Some(name) = child.child(j) {
                if matches!(name.kind(), "scoped_identifier" | "identifier") {
                    return name.utf8_text(source).ok().map(|s| s.to_string());
                }
            }
        }
    }
    None
}

/// Walk a type declaration and its member types; outer classes come
/// before their nested ones. Method and constructor bodies are not entered.
fn extract_from_node(
    node: &Node,
    source: &[u8],
    package: Option<&str>,
    enclosing: Option<&str>,
    classes: &mut Vec<ClassRecord>,
) {
    if !matches!(
        node.kind(),
        "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration"
    ) {
        return;
    }
    let Some(name) = node
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())
    else {
        return;
    };

    if node.kind() == "class_declaration" {
        classes.push(extract_class(node, name, source, package, enclosing));
    }

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    let scope = match enclosing {
        Some(outer) => format!("{outer}.{name}"),
        None => name.to_string(),
    };
    for i in 0..body.child_count() {
        let Some(member) = body.child(i) else { continue };
        if member.kind() == "enum_body_declarations" {
            // enum constants come first; member types sit in this node
            for j in 0..member.child_count() {
                if let Some(inner) = member.child(j) {
                    extract_from_node(&inner, source, package, Some(&scope), classes);
                }
            }
        } else {
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
        class.is_abstract = has_keyword(&modifiers, "abstract");
        for annotation in annotations(&modifiers, source) {
            if annotation.name == "RequestMapping" {
                class.prefix = Some(RoutePrefix {
                    path: annotation.path(),
                });
            }
            class.markers.push(annotation.name);
        }
    }

    class.superclass = node
        .child_by_field_name("superclass")
        .and_then(|s| s.named_child(0))
        .and_then(|t| t.utf8_text(source).ok())
        .map(normalize_reference)
        .filter(|s| !s.is_empty());

    if let Some(body) = node.child_by_field_name("body") {
        for i in 0..body.child_count() {
            if let Some(child) = body.child(i) {
                if child.kind() == "method_declaration" {
                    if let Some(method) = extract_method(&child, source) {
                        class.methods.push(method);
                    }
                }
            }
        }
    }

    class
}

/// A method with at least one route annotation.
fn extract_method(node: &Node, source: &[u8]) -> Option<MethodRecord> {
    let name = node
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())?;

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
    if let Some(params) = node.child_by_field_name("parameters") {
        method.parameters = extract_parameters(&params, source);
    }
    Some(method)
}

fn extract_parameters(node: &Node, source: &[u8]) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    for i in 0..node.child_count() {
        let Some(param) = node.child(i) else { continue };
        if param.kind() != "formal_parameter" {
            continue;
        }
        let Some(modifiers) = find_child(&param, "modifiers") else {
            continue;
        };
        let Some(binding) = annotations(&modifiers, source)
            .into_iter()
            .find(Annotation::is_binding)
        else {
            continue;
        };

        let name = param
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source).ok());
        let param_type = param
            .child_by_field_name("type")
            .and_then(|n| n.utf8_text(source).ok());
        if let (Some(name), Some(param_type)) = (name, param_type) {
            parameters.push(Parameter {
                name: name.to_string(),
                param_type: param_type.to_string(),
                annotation: binding.name,
            });
        }
    }
    parameters
}

// ─── Annotations ─────────────────────────────────────────────────────────────

/// All annotations inside a `modifiers` node.
fn annotations(modifiers: &Node, source: &[u8]) -> Vec<Annotation> {
    let mut found = Vec::new();
    for i in 0..modifiers.child_count() {
        let Some(child) = modifiers.child(i) else { continue };
        if !matches!(child.kind(), "marker_annotation" | "annotation") {
            continue;
        }
        let Some(name) = child
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source).ok())
        else {
            continue;
        };
        let attributes = child
            .child_by_field_name("arguments")
            .map(|args| extract_attributes(&args, source))
            .unwrap_or_default();
        found.push(Annotation::new(name, attributes));
    }
    found
}

/// Attributes of an `annotation_argument_list`.
fn extract_attributes(args: &Node, source: &[u8]) -> Vec<(String, Vec<String>)> {
    let mut attributes = Vec::new();
    for i in 0..args.child_count() {
        let Some(child) = args.child(i) else { continue };
        if !child.is_named() || child.is_extra() {
            continue;
        }
        if child.kind() == "element_value_pair" {
            let key = child
                .child_by_field_name("key")
                .and_then(|k| k.utf8_text(source).ok());
            let value = child.child_by_field_name("value");
            if let (Some(key), Some(value)) = (key, value) {
                attributes.push((key.to_string(), element_values(&value, source)));
            }
        } else {
            attributes.push(("value".to_string(), element_values(&child, source)));
        }
    }
    attributes
}

/// Flatten an element value: string literals are unquoted, arrays are
/// expanded, anything else is kept as source text.
fn element_values(node: &Node, source: &[u8]) -> Vec<String> {
    match node.kind() {
        "element_value_array_initializer" => {
            let mut values = Vec::new();
            for i in 0..node.child_count() {
                if let Some(child) = node.child(i) {
                    if child.is_named() && !child.is_extra() {
                        values.extend(element_values(&child, source));
                    }
                }
            }
            values
        }
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

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn find_child<'t>(node: &Node<'t>, kind: &str) -> Option<Node<'t>> {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .find(|child| child.kind() == kind)
}

fn has_keyword(modifiers: &Node, keyword: &str) -> bool {
    (0..modifiers.child_count())
        .filter_map(|i| modifiers.child(i))
        .any(|child| child.kind() == keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{HttpMethod, Mapping};

    fn parse(source: &str) -> Vec<ClassRecord> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        extract_java_classes(&tree.root_node(), source.as_bytes())
    }

    const USER_CONTROLLER: &str = r#"package com.example.demo.controller;

import org.springframework.web.bind.annotation.*;

@RestController
@RequestMapping("/api/users")
public class UserController {

    private final UserService userService;

    public UserController(UserService userService) {
        this.userService = userService;
    }

    @GetMapping
    public ResponseEntity<?> getAllUsers() {
        return ResponseEntity.ok(userService.findAll());
    }

    @GetMapping("/{id}")
    public ResponseEntity<?> getUserById(@PathVariable Long id) {
        return ResponseEntity.ok(userService.findById(id));
    }

    @GetMapping(value = "/{id}")
    public ResponseEntity<?> getUserById2(@PathVariable Long id) {
        return ResponseEntity.ok(userService.findById(id));
    }

    @PostMapping
    public ResponseEntity<?> createUser(@RequestBody User user) {
        return ResponseEntity.ok(userService.save(user));
    }

    @RequestMapping(method = RequestMethod.POST, value = "/{id}", headers = XCustomHeader)
    public ResponseEntity<?> createUser2(@RequestBody User user) {
        return ResponseEntity.ok(userService.save(user));
    }
}
"#;

    #[test]
    fn test_user_controller() {
        let classes = parse(USER_CONTROLLER);
        assert_eq!(classes.len(), 1);

        let class = &classes[0];
        assert_eq!(class.name, "UserController");
        assert_eq!(class.package.as_deref(), Some("com.example.demo.controller"));
        assert_eq!(class.markers, vec!["RestController", "RequestMapping"]);
        assert_eq!(
            class.prefix.as_ref().and_then(|p| p.path.as_deref()),
            Some("/api/users")
        );
        assert!(class.superclass.is_none());
        assert!(!class.is_abstract);
        assert_eq!(class.line_start, 5);

        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["getAllUsers", "getUserById", "getUserById2", "createUser", "createUser2"]
        );

        let all = &class.methods[0].annotations[0];
        assert_eq!(all.mapping, Mapping::Get);
        assert_eq!(all.path, None);

        assert_eq!(class.methods[1].annotations[0].path.as_deref(), Some("/{id}"));
        assert_eq!(class.methods[2].annotations[0].path.as_deref(), Some("/{id}"));
        assert_eq!(
            class.methods[1].parameters,
            vec![Parameter {
                name: "id".to_string(),
                param_type: "Long".to_string(),
                annotation: "PathVariable".to_string(),
            }]
        );

        let generic = &class.methods[4].annotations[0];
        assert_eq!(
            generic.mapping,
            Mapping::Generic {
                methods: vec!["POST".to_string()]
            }
        );
        assert_eq!(generic.path.as_deref(), Some("/{id}"));
        assert_eq!(generic.constraints.headers, vec!["XCustomHeader"]);
        assert_eq!(class.methods[4].parameters[0].annotation, "RequestBody");
    }

    #[test]
    fn test_empty_path_is_kept_distinct() {
        let classes = parse(
            r#"@RestController
@RequestMapping("/api/users")
public class EmptyMappingController {
    @GetMapping("")
    public String list() { return "users"; }

    @PostMapping
    public String create() { return "created"; }
}
"#,
        );
        let methods = &classes[0].methods;
        assert_eq!(methods[0].annotations[0].path.as_deref(), Some(""));
        assert_eq!(methods[1].annotations[0].path, None);
    }

    #[test]
    fn test_superclass_and_modifiers() {
        let classes = parse(
            r#"package com.example;

public abstract class Base<T> extends com.example.core.Root<T> {
    @GetMapping("/health")
    public String health() { return "ok"; }

    public void helper() {}

    static class Inner extends Base<String> {
        @DeleteMapping(path = {"/a", "/b"})
        void remove() {}
    }
}
"#,
        );
        assert_eq!(classes.len(), 2);

        let base = &classes[0];
        assert!(base.is_abstract);
        assert_eq!(base.superclass.as_deref(), Some("com.example.core.Root"));
        assert_eq!(base.methods.len(), 1);
        assert_eq!(base.methods[0].line_start, 4);
        assert_eq!(base.methods[0].line_end, 5);

        let inner = &classes[1];
        assert_eq!(inner.name, "Inner");
        assert_eq!(inner.package.as_deref(), Some("com.example"));
        assert_eq!(inner.qualified_name(), "com.example.Base.Inner");
        assert_eq!(inner.superclass.as_deref(), Some("Base"));
        assert_eq!(inner.methods[0].annotations[0].path.as_deref(), Some("/a"));
    }

    #[test]
    fn test_generic_mapping_attributes() {
        let classes = parse(
            r#"@Controller
public class Multi {
    @RequestMapping(value = "/items", method = {RequestMethod.GET, RequestMethod.HEAD},
                    params = "page", consumes = {"application/json"}, produces = MediaType.TEXT)
    public String items(@RequestParam("page") int page, @RequestHeader String auth, String raw) {
        return "";
    }

    @org.springframework.web.bind.annotation.PutMapping(Routes.UPDATE)
    public void update() {}
}
"#,
        );
        let class = &classes[0];
        assert_eq!(class.markers, vec!["Controller"]);
        assert!(class.prefix.is_none());

        let items = &class.methods[0].annotations[0];
        assert_eq!(
            items.mapping,
            Mapping::Generic {
                methods: vec!["GET".to_string(), "HEAD".to_string()]
            }
        );
        assert_eq!(items.constraints.params, vec!["page"]);
        assert_eq!(items.constraints.consumes, vec!["application/json"]);
        assert_eq!(items.constraints.produces, vec!["MediaType.TEXT"]);

        let params = &class.methods[0].parameters;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "page");
        assert_eq!(params[0].param_type, "int");
        assert_eq!(params[1].annotation, "RequestHeader");

        let update = &class.methods[1].annotations[0];
        assert_eq!(update.mapping.verb(), Some(HttpMethod::Put));
        assert_eq!(update.path.as_deref(), Some("Routes.UPDATE"));
    }

    #[test]
    fn test_local_classes_are_not_extracted() {
        let classes = parse(
            r#"package com.app;

public class Helpers {
    void build() {
        class BaseController {
            @GetMapping("/hijacked")
            public String h() { return ""; }
        }
        Runnable r = new Runnable() {
            public void run() {}
        };
    }

    public Helpers() {
        class Scratch {}
    }
}
"#,
        );
        let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Helpers"]);
    }

    #[test]
    fn test_member_types_record_enclosing_path() {
        let classes = parse(
            r#"package com.app;

public class Outer {
    public static class Inner {
        @GetMapping("/inner")
        public String inner() { return ""; }

        static class Deeper {}
    }

    interface Api {
        class Impl {}
    }

    enum Kind {
        A, B;
        static class Holder {}
    }
}
"#,
        );
        let qualified: Vec<String> = classes.iter().map(|c| c.qualified_name()).collect();
        assert_eq!(
            qualified,
            vec![
                "com.app.Outer",
                "com.app.Outer.Inner",
                "com.app.Outer.Inner.Deeper",
                "com.app.Outer.Api.Impl",
                "com.app.Outer.Kind.Holder",
            ]
        );
        assert!(classes[0].enclosing.is_none());
        assert_eq!(classes[1].enclosing.as_deref(), Some("Outer"));
        assert_eq!(classes[1].package.as_deref(), Some("com.app"));
        assert_eq!(classes[1].methods.len(), 1);
    }
}
