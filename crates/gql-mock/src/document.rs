//! Executable documents: registration, `__typename` augmentation and fragment wrapping.

use graphql_parser::{
    query::{
        Definition, Document, Field, FragmentDefinition, FragmentSpread, OperationDefinition, Query, Selection,
        SelectionSet, TypeCondition,
    },
    Pos,
};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    schema::{fragment_field_name, SchemaModel, TypeKind},
    MockingError,
};

const TYPENAME: &str = "__typename";
const FRAGMENT_QUERY_NAME: &str = "MockFragment";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
    Fragment,
}

/// A document registered under a name when the mocking session is built.
#[derive(Clone, Debug)]
pub struct OperationDocument {
    pub(crate) document: Document<'static, String>,
    pub(crate) kind: OperationKind,
}

impl OperationDocument {
    pub fn new(document: Document<'static, String>, kind: OperationKind) -> Self {
        OperationDocument { document, kind }
    }

    pub fn parse(source: &str, kind: OperationKind) -> Result<Self, MockingError> {
        Ok(Self::new(parse_document(source)?, kind))
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

/// Registered documents, by operation (or fragment) name.
pub type DocumentsMap = IndexMap<String, OperationDocument>;

/// A document to mock ad hoc, as source text or already parsed.
#[derive(Clone, Debug)]
pub enum DocumentInput {
    Source(String),
    Parsed(Document<'static, String>),
}

impl From<&str> for DocumentInput {
    fn from(source: &str) -> Self {
        DocumentInput::Source(source.to_owned())
    }
}

impl From<String> for DocumentInput {
    fn from(source: String) -> Self {
        DocumentInput::Source(source)
    }
}

impl From<Document<'static, String>> for DocumentInput {
    fn from(document: Document<'static, String>) -> Self {
        DocumentInput::Parsed(document)
    }
}

impl DocumentInput {
    pub(crate) fn into_document(self) -> Result<Document<'static, String>, MockingError> {
        match self {
            DocumentInput::Source(source) => parse_document(&source),
            DocumentInput::Parsed(document) => Ok(document),
        }
    }
}

fn parse_document(source: &str) -> Result<Document<'static, String>, MockingError> {
    Ok(graphql_parser::parse_query::<String>(source)?.into_static())
}

/// Adds a `__typename` selection to every non-empty selection set that lacks one.
///
/// Subscription roots are left alone, they must select a single field.
pub fn add_typenames<'a>(mut document: Document<'a, String>) -> Document<'a, String> {
    for definition in &mut document.definitions {
        match definition {
            Definition::Operation(OperationDefinition::Subscription(subscription)) => {
                for selection in &mut subscription.selection_set.items {
                    add_to_selection(selection);
                }
            }
            Definition::Operation(OperationDefinition::SelectionSet(selection_set)) => {
                add_to_selection_set(selection_set);
            }
            Definition::Operation(OperationDefinition::Query(query)) => add_to_selection_set(&mut query.selection_set),
            Definition::Operation(OperationDefinition::Mutation(mutation)) => {
                add_to_selection_set(&mut mutation.selection_set);
            }
            Definition::Fragment(fragment) => add_to_selection_set(&mut fragment.selection_set),
        }
    }

    document
}

fn add_to_selection_set(selection_set: &mut SelectionSet<'_, String>) {
    if selection_set.items.is_empty() {
        return;
    }

    for selection in &mut selection_set.items {
        add_to_selection(selection);
    }

    let has_typename = selection_set
        .items
        .iter()
        .any(|selection| matches!(selection, Selection::Field(field) if field.name == TYPENAME && field.alias.is_none()));

    if !has_typename {
        let position = selection_set.span.1;
        selection_set.items.push(Selection::Field(field(position, TYPENAME, Vec::new())));
    }
}

fn add_to_selection(selection: &mut Selection<'_, String>) {
    match selection {
        Selection::Field(field) => add_to_selection_set(&mut field.selection_set),
        Selection::InlineFragment(fragment) => add_to_selection_set(&mut fragment.selection_set),
        Selection::FragmentSpread(_) => (),
    }
}

fn field<'a>(position: Pos, name: &str, items: Vec<Selection<'a, String>>) -> Field<'a, String> {
    Field {
        position,
        alias: None,
        name: name.to_owned(),
        arguments: Vec::new(),
        directives: Vec::new(),
        selection_set: SelectionSet {
            span: (position, position),
            items,
        },
    }
}

/// A document ready to be executed against the mock schema.
#[derive(Debug)]
pub(crate) struct PreparedDocument {
    /// The document as given, printed.
    pub(crate) document: String,
    pub(crate) augmented_document: String,
    pub(crate) operation_name: Option<String>,
    pub(crate) is_subscription: bool,
    /// For fragments, the synthetic query field the fragment data ends up under.
    pub(crate) fragment_field: Option<String>,
}

pub(crate) fn prepare(
    document: Document<'static, String>,
    operation_name: Option<&str>,
    target_fragment: Option<&str>,
    schema: &SchemaModel,
) -> Result<PreparedDocument, MockingError> {
    let printed = document.to_string();

    let operations = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Operation(operation) => Some(operation),
            Definition::Fragment(_) => None,
        })
        .collect::<Vec<_>>();

    if !operations.is_empty() {
        let named = operation_name.filter(|name| operations.iter().any(|operation| name_of(operation) == Some(*name)));
        let selected = match named {
            Some(name) => operations.iter().find(|operation| name_of(operation) == Some(name)),
            None if operations.len() == 1 => operations.first(),
            None => None,
        };
        let is_subscription = selected.is_some_and(|operation| matches!(operation, OperationDefinition::Subscription(_)));
        let operation_name = named.map(str::to_owned);

        return Ok(PreparedDocument {
            document: printed,
            augmented_document: add_typenames(document).to_string(),
            operation_name,
            is_subscription,
            fragment_field: None,
        });
    }

    let fragments = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Fragment(fragment) => Some(fragment),
            Definition::Operation(_) => None,
        })
        .collect::<Vec<_>>();

    let target = select_fragment(&fragments, target_fragment)?;
    let fragment_name = target.name.clone();
    let TypeCondition::On(type_name) = &target.type_condition;
    let type_name = type_name.clone();

    if !schema.is_composite(&type_name) || Some(type_name.as_str()) == schema.subscription_type() {
        return Err(MockingError::UnknownFragmentType {
            fragment: fragment_name,
            type_name,
        });
    }

    let fragment_field = fragment_field_name(&type_name);
    let mut augmented = add_typenames(document);

    // The engine matches spreads against the concrete object type and its interfaces only, never
    // against the unions it belongs to.
    let inlined = match schema.kind(&type_name) {
        Some(TypeKind::Union(_)) => augmented
            .definitions
            .iter()
            .find_map(|definition| match definition {
                Definition::Fragment(fragment) if fragment.name == fragment_name => {
                    Some(fragment.selection_set.items.clone())
                }
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    augmented
        .definitions
        .insert(0, fragment_query(&fragment_field, &fragment_name, inlined));

    tracing::trace!(fragment = %fragment_name, on = %type_name, "wrapped fragment in a query");

    Ok(PreparedDocument {
        document: printed,
        augmented_document: augmented.to_string(),
        operation_name: None,
        is_subscription: false,
        fragment_field: Some(fragment_field),
    })
}

fn name_of<'d>(operation: &'d OperationDefinition<'static, String>) -> Option<&'d str> {
    match operation {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(query) => query.name.as_deref(),
        OperationDefinition::Mutation(mutation) => mutation.name.as_deref(),
        OperationDefinition::Subscription(subscription) => subscription.name.as_deref(),
    }
}

fn select_fragment<'d>(
    fragments: &[&'d FragmentDefinition<'static, String>],
    target: Option<&str>,
) -> Result<&'d FragmentDefinition<'static, String>, MockingError> {
    let names = || fragments.iter().map(|fragment| fragment.name.clone()).collect::<Vec<_>>();

    match (target, fragments) {
        (_, []) => Err(MockingError::EmptyDocument),
        (Some(target), _) => fragments
            .iter()
            .find(|fragment| fragment.name == target)
            .copied()
            .ok_or_else(|| MockingError::UnknownFragment {
                name: target.to_owned(),
                available: names(),
            }),
        (None, [only]) => Ok(*only),
        (None, _) => Err(MockingError::AmbiguousFragment(names())),
    }
}

/// `query MockFragment { _mockFragment_<Type> { ...Target } }`, followed by the `inlined` selections.
fn fragment_query(
    field_name: &str,
    fragment_name: &str,
    inlined: Vec<Selection<'static, String>>,
) -> Definition<'static, String> {
    let position = Pos { line: 1, column: 1 };
    let spread = Selection::FragmentSpread(FragmentSpread {
        position,
        fragment_name: fragment_name.to_owned(),
        directives: Vec::new(),
    });

    Definition::Operation(OperationDefinition::Query(Query {
        position,
        name: Some(FRAGMENT_QUERY_NAME.to_owned()),
        variable_definitions: Vec::new(),
        directives: Vec::new(),
        selection_set: SelectionSet {
            span: (position, position),
            items: vec![Selection::Field(field(
                position,
                field_name,
                std::iter::once(spread).chain(inlined).collect(),
            ))],
        },
    }))
}
