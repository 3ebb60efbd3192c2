use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::{MockValue, MockingError};

/// Mocks keyed by GraphQL type name (or interface name).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TypeMocks(IndexMap<String, MockValue>);

impl TypeMocks {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, type_name: impl Into<String>, mock: impl Into<MockValue>) -> Self {
        self.insert(type_name, mock);
        self
    }

    pub fn insert(&mut self, type_name: impl Into<String>, mock: impl Into<MockValue>) {
        self.0.insert(type_name.into(), mock.into());
    }

    pub fn get(&self, type_name: &str) -> Option<&MockValue> {
        self.0.get(type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MockValue)> + '_ {
        self.0.iter().map(|(name, mock)| (name.as_str(), mock))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads literal mocks from a JSON object: `{"User": {"login": "ada"}}`.
    pub fn from_json(value: serde_json::Value) -> Result<Self, MockingError> {
        match value {
            serde_json::Value::Object(types) => Ok(types.into_iter().collect()),
            other => Err(MockingError::InvalidMocks(format!(
                "type mocks must be a JSON object keyed by type name, found {other}"
            ))),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for TypeMocks
where
    K: Into<String>,
    V: Into<MockValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, mock)| (name.into(), mock.into())).collect())
    }
}

type GeneratorFn = dyn Fn() -> TypeMocks + Send + Sync;

/// One group of mocks: either a fixed map, or a function called once per mocking call.
#[derive(Clone)]
pub enum MockSource {
    Map(TypeMocks),
    Generator(Arc<GeneratorFn>),
}

impl MockSource {
    pub(crate) fn materialize(&self) -> TypeMocks {
        match self {
            MockSource::Map(mocks) => mocks.clone(),
            MockSource::Generator(generate) => generate(),
        }
    }
}

impl fmt::Debug for MockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(mocks) => f.debug_tuple("Map").field(mocks).finish(),
            Self::Generator(_) => f.debug_tuple("Generator").finish_non_exhaustive(),
        }
    }
}

/// An ordered sequence of mock groups. Later groups take precedence over earlier ones.
#[derive(Clone, Debug, Default)]
pub struct Mocks(Vec<MockSource>);

impl Mocks {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, mocks: TypeMocks) -> Self {
        self.0.push(MockSource::Map(mocks));
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generate: impl Fn() -> TypeMocks + Send + Sync + 'static) -> Self {
        self.0.push(MockSource::Generator(Arc::new(generate)));
        self
    }

    pub fn push(&mut self, source: MockSource) {
        self.0.push(source);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn sources(&self) -> impl Iterator<Item = &MockSource> + '_ {
        self.0.iter()
    }
}

impl From<TypeMocks> for Mocks {
    fn from(mocks: TypeMocks) -> Self {
        Self::new().with(mocks)
    }
}

impl From<Vec<TypeMocks>> for Mocks {
    fn from(groups: Vec<TypeMocks>) -> Self {
        groups.into_iter().collect()
    }
}

impl FromIterator<TypeMocks> for Mocks {
    fn from_iter<I: IntoIterator<Item = TypeMocks>>(iter: I) -> Self {
        Self(iter.into_iter().map(MockSource::Map).collect())
    }
}

impl<'de> Deserialize<'de> for Mocks {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Groups {
            One(TypeMocks),
            Many(Vec<TypeMocks>),
        }

        Ok(match Groups::deserialize(deserializer)? {
            Groups::One(mocks) => mocks.into(),
            Groups::Many(groups) => groups.into(),
        })
    }
}

/// A materialized group of mocks, as seen by the type-mock lookup.
///
/// A layer with `preserve_previous` unset ends the lookup fold as soon as it produces a value.
#[derive(Debug)]
pub(crate) struct MockLayer {
    pub(crate) resolvers: TypeMocks,
    pub(crate) preserve_previous: bool,
}
