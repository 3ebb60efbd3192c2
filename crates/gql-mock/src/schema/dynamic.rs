//! Builds the executable `async-graphql` schema, with a mock interceptor on every output field.

use std::{collections::HashMap, sync::Arc};

use async_graphql::{
    dynamic::{
        Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Interface, InterfaceField, Object,
        Scalar, Schema, Subscription, SubscriptionField, SubscriptionFieldFuture, TypeRef, Union,
    },
    Name,
};
use async_graphql_parser::types::{BaseType, Type};
use indexmap::IndexMap;

use super::model::{FieldDefinition, InputValueDefinition, ObjectDefinition, SchemaModel, TypeKind};
use crate::{
    extension::NullListItems, interceptor::FieldInterceptor, mocks::MockLayer, MockValue, MockingError, TypeMocks,
};

const FRAGMENT_FIELD_PREFIX: &str = "_mockFragment_";

/// The synthetic query field used to execute a fragment on `type_name` on its own.
pub(crate) fn fragment_field_name(type_name: &str) -> String {
    format!("{FRAGMENT_FIELD_PREFIX}{type_name}")
}

pub(crate) fn build_executable_schema(
    model: &Arc<SchemaModel>,
    resolvers: &IndexMap<String, IndexMap<String, MockValue>>,
) -> Result<Schema, MockingError> {
    let schema_resolvers = resolvers
        .iter()
        .map(|(type_name, fields)| {
            let layer = MockLayer {
                resolvers: TypeMocks::new().with(type_name.as_str(), MockValue::Object(fields.clone())),
                preserve_previous: false,
            };
            (type_name.as_str(), Arc::new(layer))
        })
        .collect::<HashMap<_, _>>();

    let mut builder = Schema::build(model.query_type(), model.mutation_type(), model.subscription_type())
        .extension(NullListItems);

    for definition in model.types() {
        let name = definition.name.as_str();
        let resolvers = schema_resolvers.get(name).cloned();

        builder = match &definition.kind {
            TypeKind::Scalar if SchemaModel::is_builtin_scalar(name) => builder,
            TypeKind::Scalar => builder.register(Scalar::new(name)),
            TypeKind::Enum(values) => builder.register(
                values
                    .iter()
                    .fold(Enum::new(name), |enum_type, value| enum_type.item(EnumItem::new(value))),
            ),
            TypeKind::InputObject(fields) => builder.register(
                fields
                    .iter()
                    .fold(InputObject::new(name), |input, field| input.field(input_value(field))),
            ),
            TypeKind::Union(members) => builder.register(
                members
                    .iter()
                    .fold(Union::new(name), |union, member| union.possible_type(member)),
            ),
            TypeKind::Interface(interface) => builder.register(interface_type(name, interface)),
            TypeKind::Object(object) if Some(name) == model.subscription_type() => {
                builder.register(subscription_type(model, name, object, resolvers))
            }
            TypeKind::Object(object) => builder.register(object_type(model, name, object, resolvers)),
        };
    }

    builder.finish().map_err(|err| MockingError::SchemaBuild(err.to_string()))
}

fn object_type(
    model: &Arc<SchemaModel>,
    name: &str,
    object: &ObjectDefinition,
    resolvers: Option<Arc<MockLayer>>,
) -> Object {
    let mut object_type = object
        .implements
        .iter()
        .fold(Object::new(name), |object_type, interface| object_type.implement(interface));

    for field in &object.fields {
        let interceptor = FieldInterceptor::new(model.clone(), name, field, resolvers.clone());
        object_type = object_type.field(intercepted_field(field, interceptor));
    }

    if name == model.query_type() {
        for target in model.types().filter(|definition| is_fragment_target(model, &definition.name)) {
            let field = FieldDefinition {
                name: fragment_field_name(&target.name),
                ty: Type {
                    base: BaseType::Named(Name::new(&target.name)),
                    nullable: true,
                },
                arguments: Vec::new(),
            };
            let interceptor = FieldInterceptor::new(model.clone(), name, &field, resolvers.clone());
            object_type = object_type.field(intercepted_field(&field, interceptor));
        }
    }

    object_type
}

/// Subscription roots can't be returned by a query field, every other composite type can.
fn is_fragment_target(model: &SchemaModel, type_name: &str) -> bool {
    model.is_composite(type_name) && Some(type_name) != model.subscription_type()
}

fn intercepted_field(field: &FieldDefinition, interceptor: FieldInterceptor) -> Field {
    let interceptor = Arc::new(interceptor);

    field.arguments.iter().fold(
        Field::new(field.name.as_str(), type_ref(&field.ty), move |ctx| {
            let result = interceptor.intercept(&ctx);
            FieldFuture::new(async move { result })
        }),
        |field, argument| field.argument(input_value(argument)),
    )
}

fn subscription_type(
    model: &Arc<SchemaModel>,
    name: &str,
    object: &ObjectDefinition,
    resolvers: Option<Arc<MockLayer>>,
) -> Subscription {
    let mut subscription = Subscription::new(name);

    for field in &object.fields {
        let interceptor = Arc::new(FieldInterceptor::new(model.clone(), name, field, resolvers.clone()));
        let subscription_field = SubscriptionField::new(field.name.as_str(), type_ref(&field.ty), move |ctx| {
            let event = interceptor
                .intercept(&ctx)
                .map(|value| value.unwrap_or(FieldValue::NULL));
            SubscriptionFieldFuture::new(async move { Ok(futures::stream::once(async move { event })) })
        });

        subscription = subscription.field(
            field
                .arguments
                .iter()
                .fold(subscription_field, |field, argument| field.argument(input_value(argument))),
        );
    }

    subscription
}

fn interface_type(name: &str, interface: &ObjectDefinition) -> Interface {
    let interface_type = interface
        .implements
        .iter()
        .fold(Interface::new(name), |interface_type, parent| interface_type.implement(parent));

    interface.fields.iter().fold(interface_type, |interface_type, field| {
        interface_type.field(
            field.arguments.iter().fold(
                InterfaceField::new(field.name.as_str(), type_ref(&field.ty)),
                |field, argument| field.argument(input_value(argument)),
            ),
        )
    })
}

fn input_value(definition: &InputValueDefinition) -> InputValue {
    let input = InputValue::new(definition.name.as_str(), type_ref(&definition.ty));

    match &definition.default_value {
        Some(default_value) => input.default_value(default_value.clone()),
        None => input,
    }
}

fn type_ref(ty: &Type) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::named(name.as_str()),
        BaseType::List(item) => TypeRef::List(Box::new(type_ref(item))),
    };

    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}
