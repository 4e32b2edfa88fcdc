//! Language-neutral view of a source annotation.
//!
//! Each front end flattens its own annotation syntax into an [`Annotation`];
//! turning that into a [`RouteAnnotation`] is shared.

use crate::symbols::{Mapping, MatchConstraints, RouteAnnotation};

/// Parameter annotations that bind a handler argument to the request.
pub(crate) const BINDING_ANNOTATIONS: &[&str] =
    &["PathVariable", "RequestParam", "RequestBody", "RequestHeader"];

/// An annotation with its attribute values flattened to strings.
#[derive(Debug)]
pub(crate) struct Annotation {
    /// Last dotted segment of the annotation name.
    pub name: String,
    /// `(key, values)` in source order; a positional argument is `value`.
    pub attributes: Vec<(String, Vec<String>)>,
}

impl Annotation {
    pub fn new(name: &str, attributes: Vec<(String, Vec<String>)>) -> Self {
        Self {
            name: last_segment(name).to_string(),
            attributes,
        }
    }

    fn attribute(&self, key: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// `value` or `path`; arrays contribute their first element.
    pub fn path(&self) -> Option<String> {
        self.attribute("value")
            .or_else(|| self.attribute("path"))
            .and_then(|values| values.first().cloned())
    }

    fn values(&self, key: &str) -> Vec<String> {
        self.attribute(key).map(|v| v.to_vec()).unwrap_or_default()
    }

    pub fn is_binding(&self) -> bool {
        BINDING_ANNOTATIONS.contains(&self.name.as_str())
    }

    pub fn into_route(self) -> Option<RouteAnnotation> {
        let mut mapping = Mapping::from_annotation(&self.name)?;
        if let Mapping::Generic { methods } = &mut mapping {
            *methods = self
                .values("method")
                .iter()
                .map(|m| last_segment(m).to_string())
                .collect();
        }
        Some(RouteAnnotation {
            path: self.path(),
            constraints: MatchConstraints {
                headers: self.values("headers"),
                params: self.values("params"),
                consumes: self.values("consumes"),
                produces: self.values("produces"),
            },
            mapping,
        })
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name).trim()
}

/// Remove the quotes of a string literal, text block or raw string.
pub(crate) fn strip_quotes(text: &str) -> String {
    let text = text.trim();
    if let Some(inner) = text
        .strip_prefix("\"\"\"")
        .and_then(|s| s.strip_suffix("\"\"\""))
    {
        return inner.trim().to_string();
    }
    text.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::HttpMethod;

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"/api\""), "/api");
        assert_eq!(strip_quotes("\"\""), "");
        assert_eq!(strip_quotes("\"\"\"/raw\"\"\""), "/raw");
        assert_eq!(strip_quotes("plain"), "plain");
    }

    #[test]
    fn test_generic_methods_keep_last_segment() {
        let annotation = Annotation::new(
            "org.springframework.web.bind.annotation.RequestMapping",
            vec![
                ("method".to_string(), vec!["RequestMethod.POST".to_string(), "PUT".to_string()]),
                ("path".to_string(), vec!["/a".to_string(), "/b".to_string()]),
            ],
        );
        assert_eq!(annotation.name, "RequestMapping");

        let route = annotation.into_route().unwrap();
        assert_eq!(
            route.mapping,
            Mapping::Generic {
                methods: vec!["POST".to_string(), "PUT".to_string()]
            }
        );
        assert_eq!(route.path.as_deref(), Some("/a"));
    }

    #[test]
    fn test_non_route_annotation() {
        assert!(Annotation::new("Deprecated", Vec::new()).into_route().is_none());
        let get = Annotation::new("GetMapping", Vec::new()).into_route().unwrap();
        assert_eq!(get.mapping.verb(), Some(HttpMethod::Get));
        assert!(Annotation::new("PathVariable", Vec::new()).is_binding());
    }
}
