use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{
    annotations::{strip_directives, Annotations},
    error::{KidlError, Result},
    parameter::Parameter,
    raw::{flag_prop, list_prop, prop, prop_or_null, RawMap},
    scope::TypeScope,
};

/// Whether calling a function requires an authenticated caller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Authentication {
    Required,
    Optional,
    #[default]
    None,
}

impl Authentication {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::None => "none",
        }
    }
}

impl FromStr for Authentication {
    type Err = KidlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "required" => Ok(Self::Required),
            "optional" => Ok(Self::Optional),
            "none" => Ok(Self::None),
            _ => Err(KidlError::UnknownAuthentication(s.to_string())),
        }
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function (funcdef) of a module.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    pub authentication: Authentication,
    pub is_async: bool,
    /// Documentation, without annotation directives.
    pub comment: String,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    pub annotations: Annotations,
    #[serde(skip)]
    definition: RawMap,
}

impl Function {
    pub const TAG_NAME: &'static str = "Funcdef";

    /// Maps a raw funcdef node. `default_authentication` applies when neither the node nor its
    /// annotations set a mode.
    pub fn map_from_raw(
        scope: &TypeScope,
        node: &RawMap,
        default_authentication: Authentication,
    ) -> Result<Self> {
        let name: &str = prop(node, "name")?;
        Self::map_named(scope, node, name, default_authentication)
            .map_err(|e| e.in_component("funcdef", name))
    }

    fn map_named(
        scope: &TypeScope,
        node: &RawMap,
        name: &str,
        default_authentication: Authentication,
    ) -> Result<Self> {
        let comment: &str = prop(node, "comment")?;
        let annotations = Annotations::map_from_raw(node, comment)?;

        let authentication = match prop_or_null::<&str>(node, "authentication")? {
            Some(mode) => mode.parse()?,
            None => annotations
                .authentication
                .unwrap_or(default_authentication),
        };

        let inputs = list_prop::<&RawMap>(node, "parameters")?
            .into_iter()
            .enumerate()
            .map(|(i, p)| Parameter::map_from_raw(scope, p, false, i + 1))
            .collect::<Result<_>>()?;
        let outputs = list_prop::<&RawMap>(node, "return_type")?
            .into_iter()
            .enumerate()
            .map(|(i, p)| Parameter::map_from_raw(scope, p, true, i + 1))
            .collect::<Result<_>>()?;

        Ok(Self {
            name: name.to_string(),
            authentication,
            is_async: flag_prop(node, "async")?,
            comment: strip_directives(comment),
            inputs,
            outputs,
            annotations,
            definition: node.clone(),
        })
    }

    /// The raw funcdef node this function was built from.
    pub fn raw_definition(&self) -> &RawMap {
        &self.definition
    }

    /// The documentation comment exactly as written, annotation directives included.
    pub fn literal_comment(&self) -> &str {
        self.definition
            .get("comment")
            .and_then(|c| c.as_str())
            .unwrap_or(&self.comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn int() -> Value {
        json!({ "!": "Scalar", "scalar_type": "int" })
    }

    fn build(node: Value, default: Authentication) -> Result<Function> {
        let scope = TypeScope::new("M");
        Function::map_from_raw(&scope, node.as_object().unwrap(), default)
    }

    #[test]
    fn parameters_keep_declaration_order() {
        let function = build(
            json!({ "!": "Funcdef", "name": "f", "comment": "", "parameters": [
                { "name": "c", "type": int() },
                { "type": int() },
                { "name": "a", "type": int() }
            ], "return_type": [{ "type": int() }, { "name": "b", "type": int() }] }),
            Authentication::None,
        )
        .unwrap();

        let inputs: Vec<_> = function.inputs.iter().map(|p| p.name.as_deref()).collect();
        assert_eq!(inputs, [Some("c"), Some("arg2"), Some("a")]);
        let outputs: Vec<_> = function.outputs.iter().map(|p| p.name.as_deref()).collect();
        assert_eq!(outputs, [None, Some("b")]);
    }

    #[test]
    fn authentication_precedence() {
        let node = |auth: Value, comment: &str| {
            json!({ "!": "Funcdef", "name": "f", "comment": comment, "authentication": auth,
                "parameters": [], "return_type": [] })
        };

        let explicit = build(node(json!("optional"), "@authentication none"), Authentication::Required);
        assert_eq!(explicit.unwrap().authentication, Authentication::Optional);

        let annotated = build(node(Value::Null, "@authentication none"), Authentication::Required);
        assert_eq!(annotated.unwrap().authentication, Authentication::None);

        let defaulted = build(node(Value::Null, "docs"), Authentication::Required);
        assert_eq!(defaulted.unwrap().authentication, Authentication::Required);

        let err = build(node(json!("maybe"), ""), Authentication::None).unwrap_err();
        assert!(matches!(err.root_cause(), KidlError::UnknownAuthentication(m) if m == "maybe"));
    }

    #[test]
    fn errors_name_the_function() {
        let err = build(
            json!({ "!": "Funcdef", "name": "broken", "comment": "", "parameters": {},
                "return_type": [] }),
            Authentication::None,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("broken"), "{message}");
        assert!(message.contains("parameters"), "{message}");
    }

    #[test]
    fn comment_is_kept_literally_and_cleaned() {
        let function = build(
            json!({ "!": "Funcdef", "name": "f", "comment": "Does f.\n@deprecated g",
                "async": "1", "parameters": [], "return_type": [] }),
            Authentication::None,
        )
        .unwrap();
        assert_eq!(function.comment, "Does f.");
        assert_eq!(function.literal_comment(), "Does f.\n@deprecated g");
        assert!(function.annotations.deprecated.is_some());
        assert!(function.is_async);
        assert_eq!(function.raw_definition().get("name"), Some(&json!("f")));
    }
}
