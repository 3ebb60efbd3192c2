//! The parts of a GraphQL schema the mock resolvers need, read from the SDL AST.

use async_graphql::Value as ConstValue;
use async_graphql_parser::types as ast;
use indexmap::IndexMap;

use crate::MockingError;

const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

#[derive(Debug)]
pub(crate) struct SchemaModel {
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    types: IndexMap<String, TypeDefinition>,
}

#[derive(Debug)]
pub(crate) struct TypeDefinition {
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
}

#[derive(Debug)]
pub(crate) enum TypeKind {
    Scalar,
    Object(ObjectDefinition),
    Interface(ObjectDefinition),
    Union(Vec<String>),
    Enum(Vec<String>),
    InputObject(Vec<InputValueDefinition>),
}

#[derive(Debug, Default)]
pub(crate) struct ObjectDefinition {
    pub(crate) implements: Vec<String>,
    pub(crate) fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone)]
pub(crate) struct FieldDefinition {
    pub(crate) name: String,
    pub(crate) ty: ast::Type,
    pub(crate) arguments: Vec<InputValueDefinition>,
}

#[derive(Debug, Clone)]
pub(crate) struct InputValueDefinition {
    pub(crate) name: String,
    pub(crate) ty: ast::Type,
    pub(crate) default_value: Option<ConstValue>,
}

#[derive(Default)]
struct RootNames {
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
}

impl SchemaModel {
    pub(crate) fn from_document(document: &ast::ServiceDocument) -> Result<Self, MockingError> {
        let mut types = BUILTIN_SCALARS
            .iter()
            .map(|name| {
                let definition = TypeDefinition {
                    name: (*name).to_owned(),
                    kind: TypeKind::Scalar,
                };
                ((*name).to_owned(), definition)
            })
            .collect::<IndexMap<_, _>>();
        let mut roots = RootNames::default();

        for definition in &document.definitions {
            match definition {
                ast::TypeSystemDefinition::Schema(schema) => {
                    let schema = &schema.node;
                    let name = |root: &Option<async_graphql_parser::Positioned<async_graphql::Name>>| {
                        root.as_ref().map(|name| name.node.to_string())
                    };
                    roots.query = name(&schema.query).or(roots.query);
                    roots.mutation = name(&schema.mutation).or(roots.mutation);
                    roots.subscription = name(&schema.subscription).or(roots.subscription);
                }
                ast::TypeSystemDefinition::Type(definition) => ingest_type(&mut types, &definition.node),
                ast::TypeSystemDefinition::Directive(_) => (),
            }
        }

        let existing = |name: &str| types.contains_key(name).then(|| name.to_owned());
        let query_type = roots
            .query
            .or_else(|| existing("Query"))
            .ok_or_else(|| MockingError::SchemaBuild("the schema does not define a query type".into()))?;
        let mutation_type = roots.mutation.or_else(|| existing("Mutation"));
        let subscription_type = roots.subscription.or_else(|| existing("Subscription"));

        Ok(SchemaModel {
            query_type,
            mutation_type,
            subscription_type,
            types,
        })
    }

    pub(crate) fn query_type(&self) -> &str {
        &self.query_type
    }

    pub(crate) fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub(crate) fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    pub(crate) fn types(&self) -> impl Iterator<Item = &TypeDefinition> + '_ {
        self.types.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.types.len()
    }

    pub(crate) fn kind(&self, type_name: &str) -> Option<&TypeKind> {
        self.types.get(type_name).map(|definition| &definition.kind)
    }

    pub(crate) fn is_builtin_scalar(type_name: &str) -> bool {
        BUILTIN_SCALARS.contains(&type_name)
    }

    /// Object, interface and union types: anything a fragment can be spread on.
    pub(crate) fn is_composite(&self, type_name: &str) -> bool {
        matches!(
            self.kind(type_name),
            Some(TypeKind::Object(_) | TypeKind::Interface(_) | TypeKind::Union(_))
        )
    }

    /// Interfaces implemented by an object type, empty for any other kind of type.
    pub(crate) fn object_interfaces(&self, type_name: &str) -> &[String] {
        match self.kind(type_name) {
            Some(TypeKind::Object(object)) => &object.implements,
            _ => &[],
        }
    }

    /// Whether `concrete` may stand in for the abstract type `abstract_type`.
    pub(crate) fn is_possible_type(&self, abstract_type: &str, concrete: &str) -> bool {
        match self.kind(abstract_type) {
            Some(TypeKind::Union(members)) => members.iter().any(|member| member == concrete),
            Some(TypeKind::Interface(_)) => self
                .object_interfaces(concrete)
                .iter()
                .any(|interface| interface == abstract_type),
            _ => false,
        }
    }
}

fn ingest_type(types: &mut IndexMap<String, TypeDefinition>, definition: &ast::TypeDefinition) {
    let name = definition.name.node.to_string();
    let kind = match &definition.kind {
        ast::TypeKind::Scalar => TypeKind::Scalar,
        ast::TypeKind::Object(object) => TypeKind::Object(ObjectDefinition::new(&object.implements, &object.fields)),
        ast::TypeKind::Interface(interface) => {
            TypeKind::Interface(ObjectDefinition::new(&interface.implements, &interface.fields))
        }
        ast::TypeKind::Union(union) => {
            TypeKind::Union(union.members.iter().map(|member| member.node.to_string()).collect())
        }
        ast::TypeKind::Enum(enum_type) => TypeKind::Enum(
            enum_type
                .values
                .iter()
                .map(|value| value.node.value.node.to_string())
                .collect(),
        ),
        ast::TypeKind::InputObject(input) => TypeKind::InputObject(
            input
                .fields
                .iter()
                .map(|field| InputValueDefinition::new(&field.node))
                .collect(),
        ),
    };

    match types.get_mut(&name) {
        Some(existing) => existing.kind.extend(kind),
        None => {
            types.insert(name.clone(), TypeDefinition { name, kind });
        }
    }
}

impl TypeKind {
    /// Folds an `extend type` (or a repeated definition) into the type it extends.
    fn extend(&mut self, extension: TypeKind) {
        match (self, extension) {
            (TypeKind::Object(base), TypeKind::Object(extension))
            | (TypeKind::Interface(base), TypeKind::Interface(extension)) => {
                base.implements.extend(extension.implements);
                base.fields.extend(extension.fields);
            }
            (TypeKind::Union(base), TypeKind::Union(extension)) | (TypeKind::Enum(base), TypeKind::Enum(extension)) => {
                base.extend(extension);
            }
            (TypeKind::InputObject(base), TypeKind::InputObject(extension)) => base.extend(extension),
            _ => (),
        }
    }
}

impl ObjectDefinition {
    fn new(
        implements: &[async_graphql_parser::Positioned<async_graphql::Name>],
        fields: &[async_graphql_parser::Positioned<ast::FieldDefinition>],
    ) -> Self {
        ObjectDefinition {
            implements: implements.iter().map(|name| name.node.to_string()).collect(),
            fields: fields
                .iter()
                .map(|field| FieldDefinition {
                    name: field.node.name.node.to_string(),
                    ty: field.node.ty.node.clone(),
                    arguments: field
                        .node
                        .arguments
                        .iter()
                        .map(|argument| InputValueDefinition::new(&argument.node))
                        .collect(),
                })
                .collect(),
        }
    }
}

impl InputValueDefinition {
    fn new(definition: &ast::InputValueDefinition) -> Self {
        InputValueDefinition {
            name: definition.name.node.to_string(),
            ty: definition.ty.node.clone(),
            default_value: definition.default_value.as_ref().map(|value| value.node.clone()),
        }
    }
}
