use async_graphql::ErrorExtensions;

/// Errors raised while setting up a mocking session or a single mocking call.
#[derive(Debug, thiserror::Error)]
pub enum MockingError {
    /// The schema input is neither SDL nor an introspection result
    #[error("invalid schema input: {0}")]
    InvalidSchemaInput(String),
    #[error("parsing schema: {0}")]
    SchemaParse(String),
    /// The schema parsed, but could not be turned into an executable schema
    #[error("building executable schema: {0}")]
    SchemaBuild(String),
    #[error("parsing document: {0}")]
    DocumentParse(#[from] graphql_parser::query::ParseError),
    #[error("no operation named \"{0}\" was registered")]
    UnknownOperation(String),
    /// A fragment-only document has more than one fragment and no target was given
    #[error("the document has multiple fragments, pick one of them as the target: {}", .0.join(", "))]
    AmbiguousFragment(Vec<String>),
    #[error("fragment \"{name}\" is not defined in the document (available: {})", .available.join(", "))]
    UnknownFragment { name: String, available: Vec<String> },
    #[error("fragment \"{fragment}\" targets \"{type_name}\", which is not an output composite type of the schema")]
    UnknownFragmentType { fragment: String, type_name: String },
    #[error("the document contains neither operations nor fragments")]
    EmptyDocument,
    #[error("invalid mocks: {0}")]
    InvalidMocks(String),
    #[error("reading configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while resolving a field. They end up in the `errors` of the mocked response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("No mock provided for scalar type \"{type_name}\" at path: {path}")]
    NoScalarMock { type_name: String, path: String },
    #[error("The mock for scalar type \"{type_name}\" resolved to undefined at path: {path}")]
    ScalarMockUndefined { type_name: String, path: String },
    #[error("A mock providing \"__typename\" property for type {type_name} is required, error at {path}")]
    MissingDiscriminator { type_name: String, path: String },
    #[error("expected list at path {path}, found {found}")]
    ExpectedList { path: String, found: String },
    #[error("expected item of list type at path {path}, found {found}")]
    ExpectedListItem { path: String, found: String },
    #[error("expected object at path {path}, found {found}")]
    ExpectedObject { path: String, found: String },
    #[error("expected item of object type at path {path}, found {found}")]
    ExpectedObjectItem { path: String, found: String },
    #[error("expected item of enum type at path {path}, found {found}")]
    ExpectedEnumItem { path: String, found: String },
    #[error("Cannot return null for non-nullable list item at path {path}")]
    NullListItem { path: String },
    #[error("Unexpected GraphQL type \"{type_name}\" for field {parent_type}.{field_name} at path: {path}")]
    UnexpectedType {
        type_name: String,
        parent_type: String,
        field_name: String,
        path: String,
    },
}

impl ResolveError {
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::NoScalarMock { .. } => "NO_SCALAR_MOCK",
            ResolveError::ScalarMockUndefined { .. } => "SCALAR_MOCK_UNDEFINED",
            ResolveError::MissingDiscriminator { .. } => "MISSING_TYPENAME",
            ResolveError::ExpectedList { .. } => "EXPECTED_LIST",
            ResolveError::ExpectedListItem { .. } => "EXPECTED_LIST_ITEM",
            ResolveError::ExpectedObject { .. } => "EXPECTED_OBJECT",
            ResolveError::ExpectedObjectItem { .. } => "EXPECTED_OBJECT_ITEM",
            ResolveError::ExpectedEnumItem { .. } => "EXPECTED_ENUM_ITEM",
            ResolveError::NullListItem { .. } => "NULL_LIST_ITEM",
            ResolveError::UnexpectedType { .. } => "UNEXPECTED_TYPE",
        }
    }
}

impl ErrorExtensions for ResolveError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, extensions| extensions.set("code", self.code()))
    }
}
