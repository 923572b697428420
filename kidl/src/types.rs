use std::str::FromStr;

use serde::Serialize;

use crate::{
    annotations::{strip_directives, Annotations},
    error::{KidlError, Result},
    raw::{flag_prop, list_prop, node_tag, optional_list_prop, prop, prop_or_null, RawMap},
    scope::TypeScope,
};

/// A type as used in a function signature, a structure field or a typedef.
///
/// A type is either a structural [`BasicType`] or a named [`AliasType`] (typedef) that wraps
/// another type. Aliases may chain; [`Type::resolve()`] walks the chain to the terminal basic
/// type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Basic(BasicType),
    Alias(AliasType),
}

impl Type {
    /// Maps a raw type node. `typedef_annotations` are the annotations of the typedef this node is
    /// the direct aliased type of, if any; they end up on the resulting basic type.
    pub fn map_from_raw(
        scope: &TypeScope,
        node: &RawMap,
        typedef_annotations: Option<&Annotations>,
    ) -> Result<Self> {
        match node_tag(node)? {
            AliasType::TAG_NAME => AliasType::map_from_raw(scope, node).map(Self::Alias),
            _ => BasicType::map_from_raw(scope, node, typedef_annotations).map(Self::Basic),
        }
    }

    /// The first non-alias type reached by unwrapping aliases. A basic type resolves to itself.
    pub fn resolve(&self) -> &Type {
        let mut current = self;
        while let Self::Alias(alias) = current {
            current = &alias.aliased;
        }
        current
    }

    /// The terminal basic type of this type.
    pub fn resolved_basic(&self) -> &BasicType {
        match self.resolve() {
            Self::Basic(basic) => basic,
            Self::Alias(_) => unreachable!("resolve() never returns an alias"),
        }
    }

    /// Iterates over the aliases wrapping this type, outermost first.
    pub fn aliases(&self) -> AliasChain<'_> {
        AliasChain { current: self }
    }

    pub fn as_alias(&self) -> Option<&AliasType> {
        match self {
            Self::Alias(alias) => Some(alias),
            Self::Basic(_) => None,
        }
    }

    pub fn as_basic(&self) -> Option<&BasicType> {
        match self {
            Self::Basic(basic) => Some(basic),
            Self::Alias(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.resolved_basic().kind, BasicKind::Scalar(_))
    }
}

/// Iterator over the alias chain of a [`Type`]. Finite, since every alias owns its target.
pub struct AliasChain<'a> {
    current: &'a Type,
}

impl<'a> Iterator for AliasChain<'a> {
    type Item = &'a AliasType;

    fn next(&mut self) -> Option<Self::Item> {
        let alias = self.current.as_alias()?;
        self.current = &alias.aliased;
        Some(alias)
    }
}

/// A structural type, optionally carrying the annotations of the typedef that names it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BasicType {
    pub kind: BasicKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicKind {
    Scalar(ScalarKind),
    List(Box<Type>),
    Mapping { key: Box<Type>, value: Box<Type> },
    Tuple(Vec<TupleElement>),
    Structure(StructType),
    UnspecifiedObject,
}

impl BasicKind {
    /// The discriminator of this shape.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Scalar(scalar) => scalar.as_str(),
            Self::List(_) => "list",
            Self::Mapping { .. } => "mapping",
            Self::Tuple(_) => "tuple",
            Self::Structure(_) => "structure",
            Self::UnspecifiedObject => "unspecified_object",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Int,
    String,
    Float,
    Bytes,
    Boolean,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::String => "string",
            Self::Float => "float",
            Self::Bytes => "bytes",
            Self::Boolean => "boolean",
        }
    }
}

impl FromStr for ScalarKind {
    type Err = KidlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int" => Ok(Self::Int),
            "string" => Ok(Self::String),
            "float" => Ok(Self::Float),
            "bytes" => Ok(Self::Bytes),
            "boolean" => Ok(Self::Boolean),
            _ => Err(KidlError::UnknownScalarType(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TupleElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_: Type,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: Vec<StructField>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: Type,
    pub nullable: bool,
    /// Set when the enclosing typedef lists this field in `@optional`.
    pub optional: bool,
}

impl BasicType {
    pub const SCALAR_TAG_NAME: &'static str = "Scalar";
    pub const LIST_TAG_NAME: &'static str = "List";
    pub const MAPPING_TAG_NAME: &'static str = "Mapping";
    pub const TUPLE_TAG_NAME: &'static str = "Tuple";
    pub const STRUCT_TAG_NAME: &'static str = "Struct";
    pub const UNSPECIFIED_OBJECT_TAG_NAME: &'static str = "UnspecifiedObject";

    pub fn new(kind: BasicKind) -> Self {
        Self {
            kind,
            annotations: None,
        }
    }

    pub(crate) fn map_from_raw(
        scope: &TypeScope,
        node: &RawMap,
        typedef_annotations: Option<&Annotations>,
    ) -> Result<Self> {
        let kind = match node_tag(node)? {
            Self::SCALAR_TAG_NAME => BasicKind::Scalar(prop::<&str>(node, "scalar_type")?.parse()?),
            Self::LIST_TAG_NAME => {
                let element = Type::map_from_raw(scope, prop(node, "element_type")?, None)?;
                BasicKind::List(Box::new(element))
            }
            Self::MAPPING_TAG_NAME => {
                let key = Type::map_from_raw(scope, prop(node, "key_type")?, None)?;
                if !key.is_scalar() {
                    return Err(KidlError::InvalidMappingKey(key.to_string()));
                }
                let value = Type::map_from_raw(scope, prop(node, "value_type")?, None)?;
                BasicKind::Mapping {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            Self::TUPLE_TAG_NAME => {
                let names = optional_list_prop::<&str>(node, "element_names")?;
                let elements = list_prop::<&RawMap>(node, "element_types")?
                    .into_iter()
                    .enumerate()
                    .map(|(i, element)| {
                        Ok(TupleElement {
                            name: names
                                .get(i)
                                .filter(|name| !name.is_empty())
                                .map(|name| name.to_string()),
                            type_: Type::map_from_raw(scope, element, None)?,
                        })
                    })
                    .collect::<Result<_>>()?;
                BasicKind::Tuple(elements)
            }
            Self::STRUCT_TAG_NAME => {
                BasicKind::Structure(StructType::map_from_raw(scope, node, typedef_annotations)?)
            }
            Self::UNSPECIFIED_OBJECT_TAG_NAME => BasicKind::UnspecifiedObject,
            other => return Err(KidlError::UnknownTypeTag(other.to_string())),
        };

        Ok(Self {
            kind,
            annotations: typedef_annotations.filter(|a| !a.is_empty()).cloned(),
        })
    }

    /// The nested types of this type, in declaration order.
    pub fn children(&self) -> Vec<&Type> {
        match &self.kind {
            BasicKind::Scalar(_) | BasicKind::UnspecifiedObject => Vec::new(),
            BasicKind::List(element) => vec![element],
            BasicKind::Mapping { key, value } => vec![key, value],
            BasicKind::Tuple(elements) => elements.iter().map(|e| &e.type_).collect(),
            BasicKind::Structure(structure) => structure.fields.iter().map(|f| &f.type_).collect(),
        }
    }
}

impl StructType {
    fn map_from_raw(
        scope: &TypeScope,
        node: &RawMap,
        typedef_annotations: Option<&Annotations>,
    ) -> Result<Self> {
        let name = prop_or_null::<&str>(node, "name")?.map(str::to_string);
        let fields = list_prop::<&RawMap>(node, "items")?
            .into_iter()
            .map(|item| {
                let field_name: &str = prop(item, "name")?;
                let type_ = Type::map_from_raw(scope, prop(item, "item_type")?, None)
                    .map_err(|e| e.in_component("field", field_name))?;
                Ok(StructField {
                    name: field_name.to_string(),
                    type_,
                    nullable: flag_prop(item, "nullable")?,
                    optional: typedef_annotations.map_or(false, |a| a.is_optional(field_name)),
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self { name, fields })
    }
}

/// A typedef: a named, documented reference to another type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AliasType {
    pub name: String,
    /// Module the typedef was declared in.
    pub module: String,
    pub aliased: Box<Type>,
    pub comment: String,
    pub annotations: Annotations,
}

impl AliasType {
    pub const TAG_NAME: &'static str = "Typedef";

    /// Maps a raw typedef node. A node with an `alias_type` is a definition; a node without is a
    /// reference to a typedef already registered in `scope`.
    pub fn map_from_raw(scope: &TypeScope, node: &RawMap) -> Result<Self> {
        let name: &str = prop(node, "name")?;
        let module = prop_or_null::<&str>(node, "module")?;
        match prop_or_null::<&RawMap>(node, "alias_type")? {
            Some(aliased) => Self::define(scope, node, name, module, aliased)
                .map_err(|e| e.in_component("typedef", name)),
            None => scope.lookup(module, name).cloned(),
        }
    }

    fn define(
        scope: &TypeScope,
        node: &RawMap,
        name: &str,
        module: Option<&str>,
        aliased: &RawMap,
    ) -> Result<Self> {
        let comment = prop_or_null::<&str>(node, "comment")?.unwrap_or_default();
        let annotations = Annotations::map_from_raw(node, comment)?;
        let aliased = Type::map_from_raw(scope, aliased, Some(&annotations))?;
        Ok(Self {
            name: name.to_string(),
            module: module.unwrap_or(scope.current_module()).to_string(),
            aliased: Box::new(aliased),
            comment: strip_directives(comment),
            annotations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn build(scope: &TypeScope, node: Value) -> Result<Type> {
        Type::map_from_raw(scope, node.as_object().unwrap(), None)
    }

    fn scalar(name: &str) -> Value {
        json!({ "!": "Scalar", "scalar_type": name })
    }

    #[test]
    fn builds_composite_types() {
        let scope = TypeScope::new("M");
        let type_ = build(
            &scope,
            json!({ "!": "Mapping", "key_type": scalar("string"), "value_type": {
                "!": "List", "element_type": { "!": "Tuple",
                    "element_types": [scalar("int"), { "!": "UnspecifiedObject" }],
                    "element_names": ["count", ""] }
            }}),
        )
        .unwrap();

        let BasicKind::Mapping { key, value } = &type_.as_basic().unwrap().kind else {
            panic!("expected a mapping");
        };
        assert_eq!(key.resolved_basic().kind, BasicKind::Scalar(ScalarKind::String));
        let BasicKind::List(element) = &value.resolved_basic().kind else {
            panic!("expected a list");
        };
        let BasicKind::Tuple(elements) = &element.resolved_basic().kind else {
            panic!("expected a tuple");
        };
        assert_eq!(elements[0].name.as_deref(), Some("count"));
        assert_eq!(elements[1].name, None);
        assert_eq!(elements[1].type_.resolved_basic().kind.tag(), "unspecified_object");
    }

    #[test]
    fn unknown_tags_are_rejected_by_name() {
        let scope = TypeScope::new("M");
        let err = build(&scope, json!({ "!": "Set", "element_type": scalar("int") })).unwrap_err();
        assert!(matches!(err, KidlError::UnknownTypeTag(ref tag) if tag == "Set"));
        assert!(err.to_string().contains("Set"));

        let err = build(&scope, scalar("double")).unwrap_err();
        assert!(matches!(err, KidlError::UnknownScalarType(ref tag) if tag == "double"));
    }

    #[test]
    fn alias_chains_resolve_to_terminal_basic_type() {
        let scope = TypeScope::new("M");
        let type_ = build(
            &scope,
            json!({ "!": "Typedef", "name": "Outer", "comment": "", "alias_type": {
                "!": "Typedef", "name": "Middle", "comment": "", "alias_type": {
                    "!": "Typedef", "name": "Inner", "comment": "", "alias_type": scalar("float")
                }
            }}),
        )
        .unwrap();

        let names: Vec<_> = type_.aliases().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Outer", "Middle", "Inner"]);

        let resolved = type_.resolve();
        assert_eq!(resolved.resolved_basic().kind, BasicKind::Scalar(ScalarKind::Float));
        assert_eq!(resolved.resolve(), resolved);

        let basic = build(&scope, scalar("int")).unwrap();
        assert_eq!(basic.resolve(), &basic);
    }

    #[test]
    fn typedef_annotations_attach_to_direct_basic_target() {
        let scope = TypeScope::new("M");
        let type_ = build(
            &scope,
            json!({ "!": "Typedef", "name": "Person", "comment": "A person.\n@optional age",
                "alias_type": { "!": "Struct", "name": "Person", "items": [
                    { "!": "StructItem", "name": "name", "item_type": scalar("string"), "nullable": "0" },
                    { "!": "StructItem", "name": "age", "item_type": scalar("int"), "nullable": "1" }
                ]}
            }),
        )
        .unwrap();

        let alias = type_.as_alias().unwrap();
        assert_eq!(alias.comment, "A person.");
        assert_eq!(alias.module, "M");
        let basic = alias.aliased.as_basic().unwrap();
        assert_eq!(basic.annotations.as_ref().unwrap().optional, vec!["age"]);

        let BasicKind::Structure(structure) = &basic.kind else {
            panic!("expected a structure");
        };
        assert!(!structure.fields[0].optional);
        assert!(!structure.fields[0].nullable);
        assert!(structure.fields[1].optional);
        assert!(structure.fields[1].nullable);
    }

    #[test]
    fn annotations_stay_off_nested_aliases() {
        let scope = TypeScope::new("M");
        let type_ = build(
            &scope,
            json!({ "!": "Typedef", "name": "Outer", "comment": "@deprecated", "alias_type": {
                "!": "Typedef", "name": "Inner", "comment": "", "alias_type": scalar("int")
            }}),
        )
        .unwrap();
        assert_eq!(type_.resolved_basic().annotations, None);
    }

    #[test]
    fn mapping_keys_must_be_scalars() {
        let scope = TypeScope::new("M");
        let err = build(
            &scope,
            json!({ "!": "Mapping",
                "key_type": { "!": "List", "element_type": scalar("int") },
                "value_type": scalar("int") }),
        )
        .unwrap_err();
        assert!(matches!(err, KidlError::InvalidMappingKey(ref key) if key == "list<int>"));

        let ok = build(
            &scope,
            json!({ "!": "Mapping",
                "key_type": { "!": "Typedef", "name": "Id", "comment": "", "alias_type": scalar("string") },
                "value_type": scalar("int") }),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn undeclared_typedef_reference_fails() {
        let scope = TypeScope::new("M");
        let err = build(&scope, json!({ "!": "Typedef", "name": "Later" })).unwrap_err();
        assert!(matches!(
            err,
            KidlError::UnresolvedTypedef { ref module, ref name } if module == "M" && name == "Later"
        ));
    }
}
