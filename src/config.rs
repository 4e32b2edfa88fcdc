//! Configuration loaded from `.routescope/config.toml`.
//!
//! ```toml
//! [scan]
//! hidden = false
//! git_ignore = true
//!
//! [resolve]
//! controller_markers = ["RestController", "Controller"]
//! framework_bases = ["JpaRepository", "HttpServlet"]
//! generic_without_method = "skip"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, ScanError};

/// Directory (under the first source root) holding the config file.
pub const CONFIG_DIR: &str = ".routescope";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub scan: ScanConfig,
    pub resolve: ResolveOptions,
}

/// File walking options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Include hidden files and directories.
    pub hidden: bool,
    /// Respect .gitignore / global gitignore / .git/info/exclude.
    pub git_ignore: bool,
    pub follow_links: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            hidden: false,
            git_ignore: true,
            follow_links: true,
        }
    }
}

/// What to do with a generic mapping that names no verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenericFallback {
    /// Drop the annotation and report it as malformed.
    Skip,
    /// Treat it as matching every verb.
    Any,
}

/// Options for the resolution core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Class annotations that mark a controller.
    pub controller_markers: Vec<String>,
    /// A concrete class with a class-level route prefix is a controller
    /// even without a marker.
    pub prefix_marks_controller: bool,
    /// Superclass names meaning "no superclass".
    pub root_classes: Vec<String>,
    /// Library and framework base classes. Never looked up; the chain
    /// stops there as an external unresolved ancestor.
    pub framework_bases: Vec<String>,
    pub generic_without_method: GenericFallback,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            controller_markers: strings(&["RestController", "Controller"]),
            prefix_marks_controller: true,
            root_classes: strings(&["Object", "java.lang.Object", "Any", "kotlin.Any"]),
            framework_bases: strings(&[
                // JDK
                "Exception",
                "RuntimeException",
                "Throwable",
                "Enum",
                "Record",
                "Number",
                // Spring Data / JPA
                "JpaRepository",
                "CrudRepository",
                "Repository",
                "PagingAndSortingRepository",
                "BaseEntity",
                "AbstractEntity",
                "AbstractAggregateRoot",
                "AbstractAuditable",
                "AbstractPersistable",
                // Spring Web / Servlet
                "ResponseEntityExceptionHandler",
                "WebMvcConfigurerAdapter",
                "HttpServlet",
                "GenericServlet",
            ]),
            generic_without_method: GenericFallback::Skip,
        }
    }
}

impl ResolveOptions {
    pub fn is_root_class(&self, name: &str) -> bool {
        let simple = simple_name(name);
        self.root_classes
            .iter()
            .any(|root| root == name || root == simple)
    }

    pub fn is_framework_base(&self, name: &str) -> bool {
        let simple = simple_name(name);
        self.framework_bases
            .iter()
            .any(|base| base == name || base == simple)
    }
}

impl RouteConfig {
    /// Default config location for a source root.
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load config, falling back to defaults when the file is missing or
    /// broken.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "config load failed, using defaults");
                Self::default()
            }
        }
    }

    /// Load config, reporting read and parse failures.
    pub fn try_load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        toml::from_str(&content).map_err(|source| ScanError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Last dotted segment of a possibly qualified name.
pub(crate) fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
