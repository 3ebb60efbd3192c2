//! Mock values and the single `resolve` combinator every consumer of a mock goes through.

use std::{fmt, sync::Arc};

use async_graphql::{Name, PathSegment, Value as ConstValue};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// A mock for a GraphQL value.
///
/// `Undefined` means "nothing provided here" and lets lower layers or defaults fill the value in,
/// while `Null` is an explicit GraphQL null.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MockValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<MockValue>),
    Object(IndexMap<String, MockValue>),
    Resolver(MockResolver),
}

/// What a resolver function gets to see when it is invoked for a field.
pub struct ResolverParams<'a> {
    /// The mock value of the parent object.
    pub root: &'a MockValue,
    pub args: &'a serde_json::Map<String, serde_json::Value>,
    pub context: &'a serde_json::Value,
    pub info: &'a ResolveInfo,
}

#[derive(Clone, Debug, Default)]
pub struct ResolveInfo {
    pub parent_type: String,
    pub field_name: String,
    /// The declared return type, as written in the schema: `[Entry]!`.
    pub return_type: String,
    pub path: Vec<PathSegment>,
}

type ResolverFn = dyn Fn(&ResolverParams<'_>) -> MockValue + Send + Sync;

/// A function producing a mock value on demand.
#[derive(Clone)]
pub struct MockResolver(Arc<ResolverFn>);

impl MockResolver {
    pub fn new(resolver: impl Fn(&ResolverParams<'_>) -> MockValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(resolver))
    }

    pub fn call(&self, params: &ResolverParams<'_>) -> MockValue {
        (self.0)(params)
    }
}

impl fmt::Debug for MockResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MockResolver")
    }
}

impl PartialEq for MockResolver {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl MockValue {
    pub fn resolver(resolver: impl Fn(&ResolverParams<'_>) -> MockValue + Send + Sync + 'static) -> Self {
        Self::Resolver(MockResolver::new(resolver))
    }

    pub fn object<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<MockValue>,
    {
        Self::Object(fields.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }

    pub fn list<V: Into<MockValue>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_defined(&self) -> bool {
        !self.is_undefined()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn get(&self, key: &str) -> Option<&MockValue> {
        match self {
            Self::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// The `__typename` discriminator of an object value, if it has one.
    pub fn typename(&self) -> Option<&str> {
        self.get("__typename")?.as_str()
    }

    /// Turns a mock into a value: functions are called with the params, anything else is returned as is.
    pub fn resolve(&self, params: &ResolverParams<'_>) -> MockValue {
        match self {
            Self::Resolver(resolver) => resolver.call(params),
            other => other.clone(),
        }
    }

    /// The JSON rendering used in error messages. Undefined entries and unresolved functions are
    /// dropped from objects and become null inside lists.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Undefined | Self::Null | Self::Resolver(_) => serde_json::Value::Null,
            Self::Boolean(value) => serde_json::Value::Bool(*value),
            Self::Number(value) => serde_json::Value::Number(value.clone()),
            Self::String(value) => serde_json::Value::String(value.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .filter(|(_, value)| !matches!(value, Self::Undefined | Self::Resolver(_)))
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    pub(crate) fn into_const_value(self) -> ConstValue {
        match self {
            Self::Undefined | Self::Null | Self::Resolver(_) => ConstValue::Null,
            Self::Boolean(value) => ConstValue::Boolean(value),
            Self::Number(value) => ConstValue::Number(value),
            Self::String(value) => ConstValue::String(value),
            Self::List(items) => ConstValue::List(items.into_iter().map(Self::into_const_value).collect()),
            Self::Object(fields) => ConstValue::Object(
                fields
                    .into_iter()
                    .filter(|(_, value)| !matches!(value, Self::Undefined | Self::Resolver(_)))
                    .map(|(key, value)| (Name::new(key), value.into_const_value()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for MockValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Resolver(_) => f.write_str("[function]"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Merges `source` into `target` key by key.
///
/// Objects merge recursively, lists merge index-wise, an undefined source never overwrites and any
/// other source value replaces the target.
pub(crate) fn deep_merge(target: MockValue, source: &MockValue) -> MockValue {
    match (target, source) {
        (target, MockValue::Undefined) => target,
        (MockValue::Object(mut target), MockValue::Object(source)) => {
            for (key, value) in source {
                let slot = target.entry(key.clone()).or_default();
                *slot = deep_merge(std::mem::take(slot), value);
            }
            MockValue::Object(target)
        }
        (MockValue::List(mut target), MockValue::List(source)) => {
            for (index, value) in source.iter().enumerate() {
                match target.get_mut(index) {
                    Some(slot) => *slot = deep_merge(std::mem::take(slot), value),
                    None => target.push(deep_merge(MockValue::Undefined, value)),
                }
            }
            MockValue::List(target)
        }
        (_, MockValue::Object(_)) => deep_merge(MockValue::Object(IndexMap::new()), source),
        (_, MockValue::List(_)) => deep_merge(MockValue::List(Vec::new()), source),
        (_, source) => source.clone(),
    }
}

impl From<serde_json::Value> for MockValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Boolean(value),
            serde_json::Value::Number(value) => Self::Number(value),
            serde_json::Value::String(value) => Self::String(value),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(fields) => {
                Self::Object(fields.into_iter().map(|(key, value)| (key, value.into())).collect())
            }
        }
    }
}

impl From<&str> for MockValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for MockValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for MockValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for MockValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for MockValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<Vec<MockValue>> for MockValue {
    fn from(items: Vec<MockValue>) -> Self {
        Self::List(items)
    }
}

impl From<MockResolver> for MockValue {
    fn from(resolver: MockResolver) -> Self {
        Self::Resolver(resolver)
    }
}

impl<'de> Deserialize<'de> for MockValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Into::into)
    }
}
