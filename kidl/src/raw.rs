//! Typed access to the untyped parse tree produced by the grammar-level parser.
//!
//! The tree is a [`serde_json::Value`]: maps, lists and strings (numbers, booleans and nulls are
//! tolerated where noted). Every lookup distinguishes three failures: the property is missing,
//! the property is null, or the property has the wrong shape.

use serde_json::{Map, Value};

use crate::error::{KidlError, Result, Shape};

pub type RawMap = Map<String, Value>;

/// Key holding the node kind in every typed map of the tree.
pub const TAG_KEY: &str = "!";

/// A shape a raw value can be viewed as.
pub trait FromRaw<'a>: Sized {
    const SHAPE: Shape;

    fn from_raw(value: &'a Value) -> Option<Self>;
}

impl<'a> FromRaw<'a> for &'a str {
    const SHAPE: Shape = Shape::String;

    fn from_raw(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl<'a> FromRaw<'a> for &'a [Value] {
    const SHAPE: Shape = Shape::List;

    fn from_raw(value: &'a Value) -> Option<Self> {
        value.as_array().map(Vec::as_slice)
    }
}

impl<'a> FromRaw<'a> for &'a RawMap {
    const SHAPE: Shape = Shape::Map;

    fn from_raw(value: &'a Value) -> Option<Self> {
        value.as_object()
    }
}

/// Views `value` (found under `property`) as a `T`.
pub fn convert<'a, T: FromRaw<'a>>(property: &str, value: &'a Value) -> Result<T> {
    T::from_raw(value).ok_or_else(|| KidlError::WrongShape {
        property: property.to_string(),
        expected: T::SHAPE,
        actual: Shape::of(value),
    })
}

/// Required property of shape `T`.
pub fn prop<'a, T: FromRaw<'a>>(map: &'a RawMap, property: &str) -> Result<T> {
    match map.get(property) {
        None => Err(KidlError::MissingProperty {
            property: property.to_string(),
        }),
        Some(Value::Null) => Err(KidlError::NullProperty {
            property: property.to_string(),
        }),
        Some(value) => convert(property, value),
    }
}

/// Optional property of shape `T`; both a missing key and a null value yield `None`.
pub fn prop_or_null<'a, T: FromRaw<'a>>(map: &'a RawMap, property: &str) -> Result<Option<T>> {
    match map.get(property) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => convert(property, value).map(Some),
    }
}

/// Re-asserts that every item of a list has shape `T`.
pub fn typed_list<'a, T: FromRaw<'a>>(property: &str, items: &'a [Value]) -> Result<Vec<T>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::from_raw(item).ok_or_else(|| KidlError::WrongItemShape {
                property: property.to_string(),
                index,
                expected: T::SHAPE,
                actual: Shape::of(item),
            })
        })
        .collect()
}

/// Required list property whose items all have shape `T`.
pub fn list_prop<'a, T: FromRaw<'a>>(map: &'a RawMap, property: &str) -> Result<Vec<T>> {
    typed_list(property, prop::<&[Value]>(map, property)?)
}

/// Like [`list_prop`], but a missing or null property is an empty list.
pub fn optional_list_prop<'a, T: FromRaw<'a>>(map: &'a RawMap, property: &str) -> Result<Vec<T>> {
    match prop_or_null::<&[Value]>(map, property)? {
        Some(items) => typed_list(property, items),
        None => Ok(Vec::new()),
    }
}

/// Optional integer property. The parser emits integers as strings; plain JSON integers are
/// accepted as well.
pub fn int_prop(map: &RawMap, property: &str) -> Result<Option<i64>> {
    let not_an_integer = |value: String| KidlError::NotAnInteger {
        property: property.to_string(),
        value,
    };
    match map.get(property) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| not_an_integer(s.clone())),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| not_an_integer(n.to_string())),
        Some(value) => Err(KidlError::WrongShape {
            property: property.to_string(),
            expected: Shape::String,
            actual: Shape::of(value),
        }),
    }
}

/// Integer property interpreted as a flag: absent or `0` is false.
pub fn flag_prop(map: &RawMap, property: &str) -> Result<bool> {
    Ok(int_prop(map, property)?.unwrap_or(0) != 0)
}

/// The node kind of a typed map. Tags may be package-qualified (`A::B::Scalar`); only the last
/// segment is returned.
pub fn node_tag(map: &RawMap) -> Result<&str> {
    let tag: &str = prop(map, TAG_KEY)?;
    Ok(tag.rsplit("::").next().unwrap_or(tag))
}
