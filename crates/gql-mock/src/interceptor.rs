use std::sync::Arc;

use async_graphql::{
    dynamic::{FieldValue, ResolverContext},
    ErrorExtensions, Name, PathSegment, Value as ConstValue,
};
use async_graphql_parser::types::{BaseType, Type};

use crate::{
    context::MockingState,
    mocks::MockLayer,
    path::{child_path, display_path, query_path},
    resolve::TypeResolver,
    schema::{FieldDefinition, SchemaModel, TypeKind},
    ResolveError,
    value::{MockValue, ResolveInfo, ResolverParams},
};

static UNDEFINED: MockValue = MockValue::Undefined;

/// Resolves one field of one object type from the mocks of the current call.
pub(crate) struct FieldInterceptor {
    schema: Arc<SchemaModel>,
    parent_type: String,
    field_name: String,
    field_type: Type,
    /// Interfaces of the return type, when it is an object type.
    return_interfaces: Vec<String>,
    schema_resolvers: Option<Arc<MockLayer>>,
}

impl FieldInterceptor {
    pub(crate) fn new(
        schema: Arc<SchemaModel>,
        parent_type: &str,
        field: &FieldDefinition,
        schema_resolvers: Option<Arc<MockLayer>>,
    ) -> Self {
        let return_interfaces = match &field.ty.base {
            BaseType::Named(name) => schema.object_interfaces(name).to_vec(),
            BaseType::List(_) => Vec::new(),
        };

        FieldInterceptor {
            schema,
            parent_type: parent_type.to_owned(),
            field_name: field.name.clone(),
            field_type: field.ty.clone(),
            return_interfaces,
            schema_resolvers,
        }
    }

    pub(crate) fn intercept<'v>(&self, ctx: &ResolverContext<'_>) -> async_graphql::Result<Option<FieldValue<'v>>> {
        let state = ctx.data::<MockingState>()?;
        let path = query_path(ctx.path_node.as_ref());
        let (field_name, path_prefix) = match path.split_last() {
            Some((PathSegment::Field(response_key), prefix)) => (response_key.as_str(), prefix),
            _ => (self.field_name.as_str(), &path[..]),
        };

        tracing::trace!(parent = %self.parent_type, field = field_name, path = %display_path(&path), "resolving mocked field");

        let root = ctx
            .parent_value
            .try_downcast_ref::<MockValue>()
            .unwrap_or(&UNDEFINED);
        let args = ctx
            .args
            .as_index_map()
            .iter()
            .map(|(name, value)| Ok((name.to_string(), value.clone().into_json()?)))
            .collect::<Result<serde_json::Map<_, _>, serde_json::Error>>()?;
        let info = ResolveInfo {
            parent_type: self.parent_type.clone(),
            field_name: field_name.to_owned(),
            return_type: self.field_type.to_string(),
            path: path.clone(),
        };
        let params = ResolverParams {
            root,
            args: &args,
            context: &state.context,
            info: &info,
        };
        let resolver = TypeResolver {
            schema: &self.schema,
            state,
            schema_resolvers: self.schema_resolvers.as_deref(),
            params: &params,
        };

        let type_mock = resolver.type_mock(&self.parent_type, path_prefix, &self.return_interfaces);
        let field_mock = type_mock.get(field_name).unwrap_or(&UNDEFINED);
        let existing = root.get(field_name).unwrap_or(&UNDEFINED);

        let mut null_items = Vec::new();
        let value = resolver
            .resolve_type(&self.field_type, existing, field_mock, &path)
            .and_then(|value| field_value(&self.schema, &self.field_type, value, &path, &mut null_items))
            .map_err(|err| err.extend())?;
        state.record_null_items(null_items);

        Ok(value)
    }
}

/// Objects travel down as `MockValue`s so that child interceptors can read their data.
///
/// The paths of `null` items of nullable lists are pushed to `null_items`, the engine would
/// otherwise resolve them like any other item.
fn field_value<'v>(
    schema: &SchemaModel,
    ty: &Type,
    value: MockValue,
    path: &[PathSegment],
    null_items: &mut Vec<String>,
) -> Result<Option<FieldValue<'v>>, ResolveError> {
    if matches!(value, MockValue::Null | MockValue::Undefined) {
        return Ok(None);
    }

    let name = match &ty.base {
        BaseType::List(item) => {
            let MockValue::List(elements) = value else {
                return Ok(Some(FieldValue::value(value.into_const_value())));
            };

            let mut items = Vec::with_capacity(elements.len());
            for (index, element) in elements.into_iter().enumerate() {
                let item_path = child_path(path, index);
                match field_value(schema, item, element, &item_path, null_items)? {
                    Some(item_value) => items.push(item_value),
                    None if item.nullable => {
                        null_items.push(display_path(&item_path));
                        items.push(FieldValue::NULL);
                    }
                    None => {
                        return Err(ResolveError::NullListItem {
                            path: display_path(&item_path),
                        })
                    }
                }
            }

            return Ok(Some(FieldValue::list(items)));
        }
        BaseType::Named(name) => name.as_str(),
    };

    Ok(Some(match schema.kind(name) {
        Some(TypeKind::Enum(_)) => FieldValue::value(match value {
            MockValue::String(item) => ConstValue::Enum(Name::new(item)),
            other => other.into_const_value(),
        }),
        Some(TypeKind::Object(_)) => FieldValue::owned_any(value),
        Some(TypeKind::Interface(_) | TypeKind::Union(_)) => match value.typename().map(str::to_owned) {
            Some(typename) => FieldValue::owned_any(value).with_type(typename),
            None => FieldValue::owned_any(value),
        },
        _ => FieldValue::value(value.into_const_value()),
    }))
}
