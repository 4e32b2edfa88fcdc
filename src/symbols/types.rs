//! Parsed-file records consumed by the resolution core.
//!
//! These are the values the front end hands over: one `ParsedFile` per
//! source file, each holding the classes it declares with their route
//! annotations. All records derive serde so other front ends can feed the
//! core through JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// HTTP verb of a resolved endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    /// Generic mapping without a verb restriction.
    Any,
}

impl HttpMethod {
    /// Parse a verb name as written in a mapping attribute.
    ///
    /// Accepts `POST`, `post`, `RequestMethod.POST` and the like.
    pub fn parse(raw: &str) -> Option<Self> {
        let name = raw.trim().rsplit('.').next()?.trim();
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "HEAD" => Some(HttpMethod::Head),
            "OPTIONS" => Some(HttpMethod::Options),
            "TRACE" => Some(HttpMethod::Trace),
            "ANY" => Some(HttpMethod::Any),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which mapping annotation a route came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mapping {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    /// Multi-attribute mapping; verbs are raw attribute values and may be
    /// empty or unrecognizable.
    Generic {
        #[serde(default)]
        methods: Vec<String>,
    },
}

impl Mapping {
    /// Map a verb-specific annotation name (`GetMapping`, ...) to its kind.
    pub fn from_annotation(name: &str) -> Option<Self> {
        match name {
            "GetMapping" => Some(Mapping::Get),
            "PostMapping" => Some(Mapping::Post),
            "PutMapping" => Some(Mapping::Put),
            "DeleteMapping" => Some(Mapping::Delete),
            "PatchMapping" => Some(Mapping::Patch),
            "RequestMapping" => Some(Mapping::Generic {
                methods: Vec::new(),
            }),
            _ => None,
        }
    }

    /// The fixed verb of a verb-specific mapping. `None` for generic ones.
    pub fn verb(&self) -> Option<HttpMethod> {
        match self {
            Mapping::Get => Some(HttpMethod::Get),
            Mapping::Post => Some(HttpMethod::Post),
            Mapping::Put => Some(HttpMethod::Put),
            Mapping::Delete => Some(HttpMethod::Delete),
            Mapping::Patch => Some(HttpMethod::Patch),
            Mapping::Generic { .. } => None,
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Mapping::Generic { .. })
    }
}

/// Extra request-matching attributes carried by a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConstraints {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
}

impl MatchConstraints {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
            && self.params.is_empty()
            && self.consumes.is_empty()
            && self.produces.is_empty()
    }
}

/// A method-level route annotation.
///
/// `path` keeps absent (`None`), empty (`Some("")`) and non-empty values
/// apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAnnotation {
    pub mapping: Mapping,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "MatchConstraints::is_empty")]
    pub constraints: MatchConstraints,
}

impl RouteAnnotation {
    pub fn new(mapping: Mapping, path: Option<&str>) -> Self {
        Self {
            mapping,
            path: path.map(str::to_string),
            constraints: MatchConstraints::default(),
        }
    }

    /// A generic mapping with explicit verb attributes.
    pub fn generic(methods: &[&str], path: Option<&str>) -> Self {
        Self::new(
            Mapping::Generic {
                methods: methods.iter().map(|m| m.to_string()).collect(),
            },
            path,
        )
    }

    pub fn with_header(mut self, header: &str) -> Self {
        self.constraints.headers.push(header.to_string());
        self
    }
}

/// A handler parameter bound from the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: String,
    /// Binding annotation, e.g. `PathVariable`.
    pub annotation: String,
}

/// A method declaration with its route annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<RouteAnnotation>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub line_start: usize,
    #[serde(default)]
    pub line_end: usize,
}

impl MethodRecord {
    pub fn new(name: &str, annotations: Vec<RouteAnnotation>) -> Self {
        Self {
            name: name.to_string(),
            annotations,
            parameters: Vec::new(),
            line_start: 0,
            line_end: 0,
        }
    }
}

/// Class-level route prefix annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePrefix {
    #[serde(default)]
    pub path: Option<String>,
}

/// A declared class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    #[serde(default)]
    pub package: Option<String>,
    /// Dotted path of the enclosing classes for a nested class, e.g. `Outer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing: Option<String>,
    /// Superclass reference as written (generic arguments stripped).
    #[serde(default)]
    pub superclass: Option<String>,
    /// Names of every class-level annotation, last dotted segment only.
    #[serde(default)]
    pub markers: Vec<String>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub prefix: Option<RoutePrefix>,
    #[serde(default)]
    pub methods: Vec<MethodRecord>,
    /// Declaring file. Filled from the owning `ParsedFile` when empty.
    #[serde(default)]
    pub file: PathBuf,
    #[serde(default)]
    pub line_start: usize,
    #[serde(default)]
    pub line_end: usize,
}

impl ClassRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            package: None,
            enclosing: None,
            superclass: None,
            markers: Vec::new(),
            is_abstract: false,
            prefix: None,
            methods: Vec::new(),
            file: PathBuf::new(),
            line_start: 0,
            line_end: 0,
        }
    }

    pub fn in_package(mut self, package: &str) -> Self {
        self.package = Some(package.to_string());
        self
    }

    pub fn nested_in(mut self, enclosing: &str) -> Self {
        self.enclosing = Some(enclosing.to_string());
        self
    }

    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    pub fn marked(mut self, marker: &str) -> Self {
        self.markers.push(marker.to_string());
        self
    }

    pub fn with_prefix(mut self, path: Option<&str>) -> Self {
        self.prefix = Some(RoutePrefix {
            path: path.map(str::to_string),
        });
        self
    }

    pub fn with_method(mut self, method: MethodRecord) -> Self {
        self.methods.push(method);
        self
    }

    /// `package.Outer.Name`; package and enclosing classes are left out
    /// when unknown.
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if let Some(pkg) = self.package.as_deref().filter(|p| !p.is_empty()) {
            parts.push(pkg);
        }
        if let Some(outer) = self.enclosing.as_deref().filter(|o| !o.is_empty()) {
            parts.push(outer);
        }
        parts.push(&self.name);
        parts.join(".")
    }

    pub fn has_marker(&self, markers: &[String]) -> bool {
        self.markers.iter().any(|m| markers.contains(m))
    }
}

/// Everything the front end extracted from one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub path: PathBuf,
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
}

impl ParsedFile {
    pub fn new(path: impl Into<PathBuf>, classes: Vec<ClassRecord>) -> Self {
        Self {
            path: path.into(),
            classes,
        }
    }
}
