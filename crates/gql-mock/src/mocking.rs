use std::sync::Arc;

use async_graphql::{dynamic::Schema, Request, Response, ServerError, Variables};
use futures::StreamExt;
use serde::Serialize;

use crate::{
    context::MockingState,
    document::{self, DocumentInput, DocumentsMap, OperationKind, PreparedDocument},
    schema::{build_executable_schema, SchemaInput, SchemaModel},
    MockOptions, MockingConfig, MockingError,
};

/// A mocking session: a schema, the registered documents and the session configuration.
pub struct Mocking {
    schema: Schema,
    model: Arc<SchemaModel>,
    documents: DocumentsMap,
    config: MockingConfig,
}

/// The outcome of a mocking call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockResult {
    /// `None` when execution produced no data at all.
    pub data: Option<serde_json::Value>,
    pub errors: Vec<ServerError>,
    pub document: String,
    /// The executed document, with `__typename` selections and the fragment wrapper query.
    pub augmented_document: String,
    pub variables: serde_json::Value,
    pub context: serde_json::Value,
}

pub fn build_mocking(
    schema: impl Into<SchemaInput>,
    documents: DocumentsMap,
    config: MockingConfig,
) -> Result<Mocking, MockingError> {
    let definition = schema.into().load()?;
    let model = Arc::new(SchemaModel::from_document(&definition.document)?);
    let schema = build_executable_schema(&model, &definition.resolvers)?;

    tracing::debug!(types = model.len(), documents = documents.len(), "built mocking schema");

    Ok(Mocking {
        schema,
        model,
        documents,
        config,
    })
}

impl Mocking {
    /// Mocks the registered document named `operation_name`.
    pub async fn mock(&self, operation_name: &str, options: MockOptions) -> Result<MockResult, MockingError> {
        let entry = self
            .documents
            .get(operation_name)
            .ok_or_else(|| MockingError::UnknownOperation(operation_name.to_owned()))?;

        let prepared = match entry.kind {
            OperationKind::Fragment => {
                let target = options.target_fragment.as_deref().or_else(|| {
                    entry
                        .document
                        .definitions
                        .iter()
                        .any(|definition| {
                            matches!(definition, graphql_parser::query::Definition::Fragment(fragment) if fragment.name == operation_name)
                        })
                        .then_some(operation_name)
                });
                document::prepare(entry.document.clone(), None, target, &self.model)?
            }
            OperationKind::Query | OperationKind::Mutation | OperationKind::Subscription => {
                document::prepare(entry.document.clone(), Some(operation_name), None, &self.model)?
            }
        };

        self.execute(prepared, options).await
    }

    /// Mocks an ad hoc document. Fragment-only documents are mocked through their target fragment.
    pub async fn mock_document(
        &self,
        document: impl Into<DocumentInput>,
        options: MockOptions,
    ) -> Result<MockResult, MockingError> {
        let document = document.into().into_document()?;
        let prepared = document::prepare(document, None, options.target_fragment.as_deref(), &self.model)?;

        self.execute(prepared, options).await
    }

    pub fn mock_blocking(&self, operation_name: &str, options: MockOptions) -> Result<MockResult, MockingError> {
        futures::executor::block_on(self.mock(operation_name, options))
    }

    pub fn mock_document_blocking(
        &self,
        document: impl Into<DocumentInput>,
        options: MockOptions,
    ) -> Result<MockResult, MockingError> {
        futures::executor::block_on(self.mock_document(document, options))
    }

    async fn execute(&self, prepared: PreparedDocument, options: MockOptions) -> Result<MockResult, MockingError> {
        let state = MockingState::build(&self.config, &options);
        let context = state.context.clone();
        let variables = options
            .variables
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        let mut request = Request::new(prepared.augmented_document.as_str())
            .variables(Variables::from_json(variables.clone()))
            .data(state);
        if let Some(operation_name) = &prepared.operation_name {
            request = request.operation_name(operation_name.as_str());
        }

        tracing::debug!(
            operation = ?prepared.operation_name,
            subscription = prepared.is_subscription,
            fragment = ?prepared.fragment_field,
            "mocking document"
        );

        let response = if prepared.is_subscription {
            let mut stream = Box::pin(self.schema.execute_stream(request));
            stream.next().await.unwrap_or_else(Response::default)
        } else {
            self.schema.execute(request).await
        };

        let data = response.data.into_json()?;
        let data = match &prepared.fragment_field {
            Some(field) => data.get(field).cloned(),
            None => Some(data),
        }
        .filter(|data| !data.is_null());

        Ok(MockResult {
            data,
            errors: response.errors,
            document: prepared.document,
            augmented_document: prepared.augmented_document,
            variables,
            context,
        })
    }
}
