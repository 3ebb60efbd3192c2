//! Schema-driven mock responses for GraphQL operations.
//!
//! A [`Mocking`] session executes queries, mutations, subscriptions and standalone fragments
//! against a schema whose every field is resolved from layered, user-provided mocks. Whatever
//! nobody mocked falls back to defaults: random numbers and booleans, `"Hello World"` strings,
//! UUID ids, the first value of enums and two-element lists.
//!
//! ```ignore
//! let mocking = build_mocking(sdl, DocumentsMap::new(), MockingConfig::new())?;
//! let result = mocking
//!     .mock_document("{ currentUser { login } }", MockOptions::new().with_mocks(
//!         TypeMocks::new().with("User", MockValue::object([("login", "ada")])),
//!     ))
//!     .await?;
//! ```

mod config;
mod context;
mod defaults;
mod document;
mod error;
mod extension;
mod interceptor;
mod lookup;
mod mocking;
mod mocks;
mod path;
mod resolve;
mod schema;
mod value;

pub use self::{
    config::{MergingStrategy, MockOptions, MockingConfig},
    document::{add_typenames, DocumentInput, DocumentsMap, OperationDocument, OperationKind},
    error::{MockingError, ResolveError},
    mocking::{build_mocking, MockResult, Mocking},
    mocks::{MockSource, Mocks, TypeMocks},
    schema::{SchemaDefinition, SchemaInput},
    value::{MockResolver, MockValue, ResolveInfo, ResolverParams},
};
