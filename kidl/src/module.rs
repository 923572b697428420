use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::{
    annotations::strip_directives,
    error::{KidlError, Result},
    function::{Authentication, Function},
    raw::{node_tag, prop, prop_or_null, typed_list, RawMap},
    scope::TypeScope,
    types::AliasType,
};

/// An element of a module body.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleComponent {
    Function(Function),
    Typedef(AliasType),
}

impl ModuleComponent {
    pub fn name(&self) -> &str {
        match self {
            Self::Function(function) => &function.name,
            Self::Typedef(alias) => &alias.name,
        }
    }
}

/// A module: named, ordered collection of functions and typedefs compiled as one unit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Module {
    pub name: String,
    pub comment: String,
    /// Authentication of functions that do not declare their own.
    pub default_authentication: Authentication,
    pub components: Vec<ModuleComponent>,
}

impl Module {
    pub const TAG_NAME: &'static str = "DefineModule";

    /// Maps a raw module definition. A module-level `authentication` overrides
    /// `default_authentication`.
    pub fn map_from_raw(
        scope: &mut TypeScope,
        node: &RawMap,
        default_authentication: Authentication,
    ) -> Result<Self> {
        let name: &str = prop(node, "module_name")?;
        Self::map_named(scope, node, name, default_authentication)
            .map_err(|e| e.in_component("module", name))
    }

    fn map_named(
        scope: &mut TypeScope,
        node: &RawMap,
        name: &str,
        default_authentication: Authentication,
    ) -> Result<Self> {
        match node_tag(node)? {
            Self::TAG_NAME => {}
            other => return Err(KidlError::UnknownComponentTag(other.to_string())),
        }
        let comment = prop_or_null::<&str>(node, "comment")?.unwrap_or_default();
        let default_authentication = match prop_or_null::<&str>(node, "authentication")? {
            Some(mode) => mode.parse()?,
            None => default_authentication,
        };
        scope.enter_module(name);
        let components =
            Self::map_components(scope, prop(node, "module_components")?, default_authentication)?;
        Ok(Self {
            name: name.to_string(),
            comment: strip_directives(comment),
            default_authentication,
            components,
        })
    }

    /// Maps the raw component list of the module `scope` is positioned on, in order.
    ///
    /// Typedefs are registered as they are encountered, so each component can only refer to
    /// typedefs declared before it.
    pub fn map_components(
        scope: &mut TypeScope,
        components: &[Value],
        default_authentication: Authentication,
    ) -> Result<Vec<ModuleComponent>> {
        let mut function_names = HashSet::new();
        let mut mapped = Vec::with_capacity(components.len());

        for component in typed_list::<&RawMap>("module_components", components)? {
            match node_tag(component)? {
                Function::TAG_NAME => {
                    let function = Function::map_from_raw(scope, component, default_authentication)?;
                    if !function_names.insert(function.name.clone()) {
                        return Err(KidlError::Duplicate {
                            kind: "funcdef",
                            name: function.name,
                            module: scope.current_module().to_string(),
                        });
                    }
                    tracing::debug!(name = %function.name, "mapped funcdef");
                    mapped.push(ModuleComponent::Function(function));
                }
                AliasType::TAG_NAME => {
                    // Top-level typedefs are always definitions; bare references make no sense
                    // as module components.
                    prop::<&RawMap>(component, "alias_type")?;
                    let alias = AliasType::map_from_raw(scope, component)?;
                    scope.register(&alias)?;
                    mapped.push(ModuleComponent::Typedef(alias));
                }
                other => return Err(KidlError::UnknownComponentTag(other.to_string())),
            }
        }
        Ok(mapped)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.components.iter().filter_map(|c| match c {
            ModuleComponent::Function(function) => Some(function),
            ModuleComponent::Typedef(_) => None,
        })
    }

    pub fn typedefs(&self) -> impl Iterator<Item = &AliasType> {
        self.components.iter().filter_map(|c| match c {
            ModuleComponent::Typedef(alias) => Some(alias),
            ModuleComponent::Function(_) => None,
        })
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn int() -> Value {
        json!({ "!": "Scalar", "scalar_type": "int" })
    }

    fn typedef(name: &str, aliased: Value) -> Value {
        json!({ "!": "Typedef", "name": name, "comment": "", "alias_type": aliased })
    }

    fn reference(name: &str) -> Value {
        json!({ "!": "Typedef", "name": name })
    }

    fn funcdef(name: &str, input: Value) -> Value {
        json!({ "!": "Funcdef", "name": name, "comment": "",
            "parameters": [{ "type": input }], "return_type": [] })
    }

    fn components(value: Value) -> Vec<Value> {
        match value {
            Value::Array(items) => items,
            _ => panic!("fixture must be a list"),
        }
    }

    fn map_module_components(raw: &[Value]) -> Result<Vec<ModuleComponent>> {
        let mut scope = TypeScope::new("M");
        Module::map_components(&mut scope, raw, Authentication::None)
    }

    #[test]
    fn component_order_is_preserved() {
        let raw = components(json!([
            typedef("A", int()),
            funcdef("z", reference("A")),
            typedef("B", json!({ "!": "List", "element_type": reference("A") })),
            funcdef("a", reference("B")),
        ]));
        let mapped = map_module_components(&raw).unwrap();
        let names: Vec<_> = mapped.iter().map(ModuleComponent::name).collect();
        assert_eq!(names, ["A", "z", "B", "a"]);
    }

    #[test]
    fn references_resolve_to_earlier_typedefs() {
        let raw = components(json!([typedef("A", int()), funcdef("f", reference("A"))]));
        let mapped = map_module_components(&raw).unwrap();
        let ModuleComponent::Function(f) = &mapped[1] else {
            panic!("expected a function");
        };
        let alias = f.inputs[0].type_.as_alias().unwrap();
        assert_eq!(alias.name, "A");
        assert_eq!(alias.module, "M");
        assert!(alias.aliased.is_scalar());
    }

    #[test]
    fn forward_references_are_rejected() {
        let raw = components(json!([funcdef("f", reference("A")), typedef("A", int())]));
        let err = map_module_components(&raw).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            KidlError::UnresolvedTypedef { name, .. } if name == "A"
        ));
        assert!(err.to_string().contains("funcdef \"f\""));
    }

    #[test]
    fn duplicates_are_rejected() {
        let raw = components(json!([funcdef("f", int()), funcdef("f", int())]));
        let err = map_module_components(&raw).unwrap_err();
        assert!(matches!(err, KidlError::Duplicate { kind: "funcdef", .. }));

        let raw = components(json!([typedef("A", int()), typedef("A", int())]));
        let err = map_module_components(&raw).unwrap_err();
        assert!(matches!(err, KidlError::Duplicate { kind: "typedef", .. }));
    }

    #[test]
    fn unknown_components_are_rejected() {
        let raw = components(json!([{ "!": "Constant", "name": "PI" }]));
        let err = map_module_components(&raw).unwrap_err();
        assert!(matches!(err, KidlError::UnknownComponentTag(ref tag) if tag == "Constant"));
    }

    #[test]
    fn module_definition_sets_default_authentication() {
        let node = json!({ "!": "DefineModule", "module_name": "M", "comment": "Mod.",
            "authentication": "required", "module_components": [funcdef("f", int())] });
        let mut scope = TypeScope::new("");
        let module =
            Module::map_from_raw(&mut scope, node.as_object().unwrap(), Authentication::None)
                .unwrap();
        assert_eq!(module.name, "M");
        assert_eq!(module.comment, "Mod.");
        assert_eq!(
            module.function("f").unwrap().authentication,
            Authentication::Required
        );
        assert_eq!(module.typedefs().count(), 0);
    }

    #[test]
    fn module_nodes_must_carry_the_module_tag() {
        let node = json!({ "!": "Funcdef", "module_name": "M", "module_components": [] });
        let mut scope = TypeScope::new("");
        let err = Module::map_from_raw(&mut scope, node.as_object().unwrap(), Authentication::None)
            .unwrap_err();
        assert!(matches!(
            err.root_cause(),
            KidlError::UnknownComponentTag(tag) if tag == "Funcdef"
        ));
        assert!(err.to_string().contains("module \"M\""), "{err}");

        let node = json!({ "!": "Bio::KBase::KIDL::KBT::DefineModule", "module_name": "M",
            "module_components": [] });
        assert!(Module::map_from_raw(&mut scope, node.as_object().unwrap(), Authentication::None)
            .is_ok());
    }
}
