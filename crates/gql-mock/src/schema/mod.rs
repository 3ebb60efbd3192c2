mod dynamic;
mod model;

use async_graphql_parser::types::ServiceDocument;
use cynic_introspection::IntrospectionQuery;
use indexmap::IndexMap;

use crate::{MockValue, MockingError};

pub(crate) use self::{
    dynamic::{build_executable_schema, fragment_field_name},
    model::{FieldDefinition, SchemaModel, TypeKind},
};

/// Anything a mocking session can be built from.
#[derive(Debug)]
pub enum SchemaInput {
    Sdl(String),
    /// An introspection result: `{"__schema": ...}`, or a full response with the schema under `data`.
    Introspection(serde_json::Value),
    Definition(SchemaDefinition),
    /// Either a JSON string holding SDL, or an introspection result.
    Json(serde_json::Value),
}

impl From<&str> for SchemaInput {
    fn from(sdl: &str) -> Self {
        SchemaInput::Sdl(sdl.to_owned())
    }
}

impl From<String> for SchemaInput {
    fn from(sdl: String) -> Self {
        SchemaInput::Sdl(sdl)
    }
}

impl From<SchemaDefinition> for SchemaInput {
    fn from(definition: SchemaDefinition) -> Self {
        SchemaInput::Definition(definition)
    }
}

impl From<ServiceDocument> for SchemaInput {
    fn from(document: ServiceDocument) -> Self {
        SchemaInput::Definition(SchemaDefinition::new(document))
    }
}

impl From<serde_json::Value> for SchemaInput {
    fn from(value: serde_json::Value) -> Self {
        SchemaInput::Json(value)
    }
}

impl SchemaInput {
    pub(crate) fn load(self) -> Result<SchemaDefinition, MockingError> {
        match self {
            SchemaInput::Sdl(sdl) | SchemaInput::Json(serde_json::Value::String(sdl)) => SchemaDefinition::parse(&sdl),
            SchemaInput::Introspection(introspection) => from_introspection(introspection),
            SchemaInput::Definition(definition) => Ok(definition),
            SchemaInput::Json(value) if is_introspection(&value) => from_introspection(value),
            SchemaInput::Json(value) => Err(MockingError::InvalidSchemaInput(format!(
                "expected SDL or an introspection result, found {}",
                truncated(&value.to_string())
            ))),
        }
    }
}

/// A parsed schema, optionally carrying resolvers of its own.
///
/// The resolvers act as the lowest-precedence mocks of their type: they only contribute when no
/// other mock of that type produces a value.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    pub(crate) document: ServiceDocument,
    pub(crate) resolvers: IndexMap<String, IndexMap<String, MockValue>>,
}

impl SchemaDefinition {
    pub fn new(document: ServiceDocument) -> Self {
        SchemaDefinition {
            document,
            resolvers: IndexMap::new(),
        }
    }

    pub fn parse(sdl: &str) -> Result<Self, MockingError> {
        async_graphql_parser::parse_schema(sdl)
            .map(Self::new)
            .map_err(|err| MockingError::SchemaParse(err.to_string()))
    }

    #[must_use]
    pub fn with_resolver(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        resolver: impl Into<MockValue>,
    ) -> Self {
        self.resolvers
            .entry(type_name.into())
            .or_default()
            .insert(field_name.into(), resolver.into());
        self
    }
}

fn is_introspection(value: &serde_json::Value) -> bool {
    value.get("__schema").is_some() || value.get("data").and_then(|data| data.get("__schema")).is_some()
}

fn from_introspection(value: serde_json::Value) -> Result<SchemaDefinition, MockingError> {
    let value = match value {
        serde_json::Value::Object(mut response) if !response.contains_key("__schema") && response.contains_key("data") => {
            response.remove("data").unwrap_or_default()
        }
        other => other,
    };

    let introspection = serde_json::from_value::<IntrospectionQuery>(value)
        .map_err(|err| MockingError::InvalidSchemaInput(format!("reading introspection result: {err}")))?;
    let schema = introspection
        .into_schema()
        .map_err(|err| MockingError::SchemaParse(err.to_string()))?;

    SchemaDefinition::parse(&schema.to_sdl())
}

fn truncated(text: &str) -> String {
    const MAX: usize = 60;

    match text.char_indices().nth(MAX) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_owned(),
    }
}
