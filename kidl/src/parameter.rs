use serde::Serialize;

use crate::{
    error::Result,
    raw::{prop, prop_or_null, RawMap},
    scope::TypeScope,
    types::Type,
};

/// A function input or output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Parameter {
    /// The name as written in the specification, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_name: Option<String>,
    /// The name generators should use. Unnamed inputs get `arg<position>`; unnamed outputs stay
    /// unnamed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_: Type,
}

impl Parameter {
    /// Maps a raw parameter node. `position` is the 1-based position in the declaring list and is
    /// only used to name unnamed inputs.
    pub fn map_from_raw(
        scope: &TypeScope,
        node: &RawMap,
        is_output: bool,
        position: usize,
    ) -> Result<Self> {
        let declared_name = prop_or_null::<&str>(node, "name")?.map(str::to_string);
        let name = match &declared_name {
            Some(name) => Some(name.clone()),
            None if !is_output => Some(format!("arg{position}")),
            None => None,
        };
        let type_ = Type::map_from_raw(scope, prop(node, "type")?, None)?;
        Ok(Self {
            declared_name,
            name,
            type_,
        })
    }
}
