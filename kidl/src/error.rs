use std::fmt;

use thiserror::Error;

/// Runtime shape of a raw parse tree value, as reported in errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    Null,
    Boolean,
    Number,
    String,
    List,
    Map,
}

impl Shape {
    pub fn of(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Map,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// Errors raised while mapping a raw parse tree onto the typed model.
///
/// None of these are recoverable: the specification file that produced the tree must be fixed.
#[derive(Debug, Error)]
pub enum KidlError {
    #[error("no property {property:?} in the map")]
    MissingProperty { property: String },

    #[error("property {property:?} is null")]
    NullProperty { property: String },

    #[error("value for property {property:?} is not a {expected}, it has shape: {actual}")]
    WrongShape {
        property: String,
        expected: Shape,
        actual: Shape,
    },

    #[error("item {index} of property {property:?} is not a {expected}, it has shape: {actual}")]
    WrongItemShape {
        property: String,
        index: usize,
        expected: Shape,
        actual: Shape,
    },

    #[error("value for property {property:?} is not an integer: {value:?}")]
    NotAnInteger { property: String, value: String },

    #[error("unsupported type: {0:?}")]
    UnknownTypeTag(String),

    #[error("unsupported scalar type: {0:?}")]
    UnknownScalarType(String),

    #[error("unsupported module component: {0:?}")]
    UnknownComponentTag(String),

    #[error("unsupported authentication mode: {0:?}")]
    UnknownAuthentication(String),

    #[error("typedef {name:?} is referenced before it is declared (module {module:?})")]
    UnresolvedTypedef { module: String, name: String },

    #[error("mapping key type must be a scalar, found {0}")]
    InvalidMappingKey(String),

    #[error("{kind} {name:?} is declared more than once in module {module:?}")]
    Duplicate {
        kind: &'static str,
        name: String,
        module: String,
    },

    #[error("in {kind} {name:?}: {source}")]
    InComponent {
        kind: &'static str,
        name: String,
        #[source]
        source: Box<KidlError>,
    },
}

impl KidlError {
    /// Wraps `self` with the component (funcdef, typedef, module) it was raised for.
    pub fn in_component(self, kind: &'static str, name: impl Into<String>) -> Self {
        Self::InComponent {
            kind,
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all component context stripped.
    pub fn root_cause(&self) -> &KidlError {
        let mut current = self;
        while let Self::InComponent { source, .. } = current {
            current = source;
        }
        current
    }
}

pub type Result<T, E = KidlError> = std::result::Result<T, E>;
