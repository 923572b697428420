use serde::Serialize;
use serde_json::Value;

use crate::{
    error::Result,
    function::Authentication,
    raw::{list_prop, prop_or_null, RawMap},
};

/// Structured metadata attached to functions and typedefs.
///
/// Annotations come either from an `annotations` map on the raw node or, when that map is absent,
/// from `@` directive lines in the documentation comment. Directives this crate does not know
/// about are kept as-is in [`unknown`](Self::unknown) for generators to interpret.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Annotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    /// Names of structure fields that may be left out (`@optional a b`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub unknown: RawMap,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Deprecation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

impl Deprecation {
    fn new(replacement: Option<&str>) -> Self {
        Self {
            replacement: replacement
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        }
    }
}

impl Annotations {
    pub const PROPERTY: &'static str = "annotations";

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn is_optional(&self, field: &str) -> bool {
        self.optional.iter().any(|f| f == field)
    }

    /// Annotations of a raw function or typedef node documented by `comment`. The structured
    /// form wins over directives in the comment.
    pub fn map_from_raw(node: &RawMap, comment: &str) -> Result<Self> {
        match prop_or_null::<&RawMap>(node, Self::PROPERTY)? {
            Some(structured) => Self::from_structured(structured),
            None => Self::from_comment(comment),
        }
    }

    fn from_structured(map: &RawMap) -> Result<Self> {
        let mut annotations = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "deprecated" => {
                    let replacement = prop_or_null::<&str>(map, key)?;
                    annotations.deprecated = Some(Deprecation::new(replacement));
                }
                "optional" => {
                    annotations.optional = list_prop::<&str>(map, key)?
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                }
                "authentication" => {
                    if let Some(mode) = prop_or_null::<&str>(map, key)? {
                        annotations.authentication = Some(mode.parse()?);
                    }
                }
                _ => {
                    annotations.unknown.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(annotations)
    }

    /// Parses `@name args...` directive lines out of a documentation comment.
    pub fn from_comment(comment: &str) -> Result<Self> {
        let mut annotations = Self::default();
        for line in comment.lines().map(str::trim) {
            let Some(directive) = line.strip_prefix('@') else {
                continue;
            };
            let mut words = directive.split_whitespace();
            let Some(name) = words.next() else {
                continue;
            };
            match name {
                "deprecated" => {
                    let replacement = words.collect::<Vec<_>>().join(" ");
                    annotations.deprecated = Some(Deprecation::new(Some(&replacement)));
                }
                "optional" => annotations.optional.extend(words.map(str::to_string)),
                "authentication" => {
                    let mode = words.next().unwrap_or_default();
                    annotations.authentication = Some(mode.parse()?);
                }
                _ => {
                    let args = words.map(|w| Value::String(w.to_string())).collect();
                    annotations
                        .unknown
                        .insert(name.to_string(), Value::Array(args));
                }
            }
        }
        Ok(annotations)
    }
}

/// The documentation text of a comment, without its `@` directive lines.
pub fn strip_directives(comment: &str) -> String {
    comment
        .lines()
        .filter(|line| !line.trim_start().starts_with('@'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
