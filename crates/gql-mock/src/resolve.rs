//! Turns the mock data available for a field into a value of the field's declared type.

use async_graphql::PathSegment;
use async_graphql_parser::types::{BaseType, Type};
use indexmap::IndexMap;

use crate::{
    context::MockingState,
    lookup::TypeMockResolver,
    mocks::MockLayer,
    path::{child_path, display_path},
    schema::{SchemaModel, TypeKind},
    value::{deep_merge, MockValue, ResolverParams},
    MergingStrategy, ResolveError,
};

/// Length of lists nobody provided a mock for.
const DEFAULT_LIST_LENGTH: usize = 2;

pub(crate) struct TypeResolver<'a> {
    pub(crate) schema: &'a SchemaModel,
    pub(crate) state: &'a MockingState,
    /// Resolvers the schema itself provides for the parent type.
    pub(crate) schema_resolvers: Option<&'a MockLayer>,
    pub(crate) params: &'a ResolverParams<'a>,
}

impl<'a> TypeResolver<'a> {
    fn lookup<'b>(
        &'b self,
        type_name: &str,
        path_prefix: &[PathSegment],
        interfaces: &'b [String],
        take_first_resolved_only: bool,
    ) -> Option<TypeMockResolver<'b>> {
        TypeMockResolver::new(
            self.schema_resolvers.into_iter().chain(&self.state.layers),
            path_prefix,
            type_name,
            interfaces,
            take_first_resolved_only,
        )
    }

    fn resolve_lookup(&self, type_name: &str, path_prefix: &[PathSegment], interfaces: &[String], take_first: bool) -> Option<MockValue> {
        self.lookup(type_name, path_prefix, interfaces, take_first)
            .map(|resolver| resolver.resolve(&self.state.cache, self.params))
    }

    /// The mock object of `type_name` at `path_prefix`, also drawing from mocks of `interfaces`.
    pub(crate) fn type_mock(&self, type_name: &str, path_prefix: &[PathSegment], interfaces: &[String]) -> MockValue {
        self.resolve_lookup(type_name, path_prefix, interfaces, false)
            .unwrap_or_default()
    }

    pub(crate) fn resolve_type(
        &self,
        ty: &Type,
        existing: &MockValue,
        resolvable: &MockValue,
        path: &[PathSegment],
    ) -> Result<MockValue, ResolveError> {
        let name = match &ty.base {
            BaseType::List(item) => return self.resolve_list(item, existing, resolvable, path),
            BaseType::Named(name) => name.as_str(),
        };

        match self.schema.kind(name) {
            Some(TypeKind::Scalar) => self.resolve_scalar(name, existing, resolvable, path),
            Some(TypeKind::Enum(values)) => Ok(self.resolve_enum(name, values, existing, resolvable, path)),
            Some(TypeKind::Object(_)) => self.resolve_object(existing, resolvable, path),
            Some(TypeKind::Interface(_) | TypeKind::Union(_)) => self.resolve_abstract(name, existing, resolvable, path),
            Some(TypeKind::InputObject(_)) | None => Err(ResolveError::UnexpectedType {
                type_name: name.to_owned(),
                parent_type: self.params.info.parent_type.clone(),
                field_name: self.params.info.field_name.clone(),
                path: display_path(path),
            }),
        }
    }

    /// Combines the value provided by the parent with the mock, according to the merging strategy.
    fn merged(&self, existing: &MockValue, resolvable: &MockValue, deep: bool) -> MockValue {
        let existing = existing.resolve(self.params);
        let mocked = resolvable.resolve(self.params);

        let (winner, other) = match self.state.merging_strategy {
            MergingStrategy::PreserveDeeper => (existing, mocked),
            MergingStrategy::PreserveShallow => (mocked, existing),
        };

        if deep {
            deep_merge(other, &winner)
        } else if winner.is_defined() {
            winner
        } else {
            other
        }
    }

    fn resolve_scalar(
        &self,
        name: &str,
        existing: &MockValue,
        resolvable: &MockValue,
        path: &[PathSegment],
    ) -> Result<MockValue, ResolveError> {
        let value = self.merged(existing, resolvable, false);
        if value.is_defined() {
            return Ok(value);
        }

        match self.resolve_lookup(name, path, &[], true) {
            Some(MockValue::Undefined) => Err(ResolveError::ScalarMockUndefined {
                type_name: name.to_owned(),
                path: display_path(path),
            }),
            Some(value) => Ok(value),
            None => Err(ResolveError::NoScalarMock {
                type_name: name.to_owned(),
                path: display_path(path),
            }),
        }
    }

    fn resolve_enum(
        &self,
        name: &str,
        values: &[String],
        existing: &MockValue,
        resolvable: &MockValue,
        path: &[PathSegment],
    ) -> MockValue {
        let value = self.merged(existing, resolvable, false);
        if value.is_defined() {
            return value;
        }

        match self.resolve_lookup(name, path, &[], true) {
            Some(value) if value.is_defined() => value,
            _ => {
                tracing::trace!(enum_type = name, path = %display_path(path), "falling back to the first enum value");
                values.first().cloned().map_or(MockValue::Null, MockValue::String)
            }
        }
    }

    fn resolve_object(
        &self,
        existing: &MockValue,
        resolvable: &MockValue,
        path: &[PathSegment],
    ) -> Result<MockValue, ResolveError> {
        match self.merged(existing, resolvable, true) {
            MockValue::Undefined => Ok(MockValue::Object(IndexMap::new())),
            value @ (MockValue::Null | MockValue::Object(_)) => Ok(value),
            other => Err(ResolveError::ExpectedObject {
                path: display_path(path),
                found: other.to_string(),
            }),
        }
    }

    fn resolve_abstract(
        &self,
        name: &str,
        existing: &MockValue,
        resolvable: &MockValue,
        path: &[PathSegment],
    ) -> Result<MockValue, ResolveError> {
        let value = self.merged(existing, resolvable, true);
        if value.is_null() || self.has_discriminator(name, &value) {
            return Ok(value);
        }

        let mocked = self.resolve_lookup(name, path, &[], true).unwrap_or_default();
        let value = deep_merge(mocked, &value);

        if self.has_discriminator(name, &value) {
            Ok(value)
        } else {
            Err(ResolveError::MissingDiscriminator {
                type_name: name.to_owned(),
                path: display_path(path),
            })
        }
    }

    fn has_discriminator(&self, abstract_type: &str, value: &MockValue) -> bool {
        value
            .typename()
            .is_some_and(|typename| self.schema.is_possible_type(abstract_type, typename))
    }

    fn resolve_list(
        &self,
        item: &Type,
        existing: &MockValue,
        resolvable: &MockValue,
        path: &[PathSegment],
    ) -> Result<MockValue, ResolveError> {
        let elements = match self.merged(existing, resolvable, true) {
            MockValue::Undefined => return self.default_list(item, path),
            MockValue::Null => return Ok(MockValue::Null),
            MockValue::List(elements) => elements,
            other => {
                return Err(ResolveError::ExpectedList {
                    path: display_path(path),
                    found: other.to_string(),
                })
            }
        };

        elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                let path = child_path(path, index);
                let element = element.resolve(self.params);
                self.check_item(item, &element, &path)?;

                if element.is_null() {
                    Ok(MockValue::Null)
                } else {
                    self.resolve_type(item, &MockValue::Undefined, &element, &path)
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(MockValue::List)
    }

    fn default_list(&self, item: &Type, path: &[PathSegment]) -> Result<MockValue, ResolveError> {
        tracing::trace!(path = %display_path(path), "defaulting list");

        (0..DEFAULT_LIST_LENGTH)
            .map(|index| self.resolve_type(item, &MockValue::Undefined, &MockValue::Undefined, &child_path(path, index)))
            .collect::<Result<Vec<_>, _>>()
            .map(MockValue::List)
    }

    fn check_item(&self, item: &Type, element: &MockValue, path: &[PathSegment]) -> Result<(), ResolveError> {
        if matches!(element, MockValue::Null | MockValue::Undefined) {
            return Ok(());
        }

        let path = || display_path(path);
        let found = || element.to_string();

        match &item.base {
            BaseType::List(_) if !matches!(element, MockValue::List(_)) => Err(ResolveError::ExpectedListItem {
                path: path(),
                found: found(),
            }),
            BaseType::List(_) => Ok(()),
            BaseType::Named(name) => match self.schema.kind(name) {
                Some(TypeKind::Object(_) | TypeKind::Interface(_) | TypeKind::Union(_))
                    if !matches!(element, MockValue::Object(_)) =>
                {
                    Err(ResolveError::ExpectedObjectItem {
                        path: path(),
                        found: found(),
                    })
                }
                Some(TypeKind::Enum(_)) if !matches!(element, MockValue::String(_)) => {
                    Err(ResolveError::ExpectedEnumItem {
                        path: path(),
                        found: found(),
                    })
                }
                _ => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indoc::indoc;
    use serde_json::json;

    use super::*;
    use crate::{MockOptions, MockingConfig, ResolveInfo, TypeMocks};

    const SDL: &str = indoc! {"
        type Query { user: User actors: [Actor] tags: [[Tag]] count: Int when: Date }
        interface Actor { login: String }
        type User implements Actor { login: String htmlUrl: String }
        enum Tag { NEW HOT }
        scalar Date
        input Filter { login: String }
    "};

    struct Fixture {
        schema: Arc<SchemaModel>,
        state: MockingState,
        info: ResolveInfo,
    }

    impl Fixture {
        fn new(mocks: serde_json::Value, merging_strategy: MergingStrategy) -> Self {
            let document = async_graphql_parser::parse_schema(SDL).unwrap();
            let options = MockOptions::new()
                .with_mocks(TypeMocks::from_json(mocks).unwrap())
                .with_merging_strategy(merging_strategy);

            Fixture {
                schema: Arc::new(SchemaModel::from_document(&document).unwrap()),
                state: MockingState::build(&MockingConfig::new(), &options),
                info: ResolveInfo {
                    parent_type: "Query".into(),
                    field_name: "field".into(),
                    ..Default::default()
                },
            }
        }

        fn resolve(&self, ty: &str, existing: serde_json::Value, resolvable: MockValue) -> Result<serde_json::Value, ResolveError> {
            let args = serde_json::Map::new();
            let params = ResolverParams {
                root: &MockValue::Undefined,
                args: &args,
                context: &serde_json::Value::Null,
                info: &self.info,
            };
            let resolver = TypeResolver {
                schema: &self.schema,
                state: &self.state,
                schema_resolvers: None,
                params: &params,
            };
            let existing = if existing.is_null() { MockValue::Undefined } else { existing.into() };

            resolver
                .resolve_type(&Type::new(ty).unwrap(), &existing, &resolvable, &[PathSegment::Field("field".into())])
                .map(|value| value.to_json())
        }
    }

    #[test]
    fn scalars_fall_back_to_type_mocks() {
        let fixture = Fixture::new(json!({"Date": "2020-01-01"}), MergingStrategy::PreserveDeeper);

        assert_eq!(fixture.resolve("Date", json!(null), MockValue::Undefined), Ok(json!("2020-01-01")));
        assert_eq!(fixture.resolve("Date", json!("kept"), "mocked".into()), Ok(json!("kept")));
        assert_eq!(fixture.resolve("String", json!(null), MockValue::Undefined), Ok(json!("Hello World")));
    }

    #[test]
    fn shallow_strategy_prefers_the_mock() {
        let fixture = Fixture::new(json!({}), MergingStrategy::PreserveShallow);

        assert_eq!(fixture.resolve("String", json!("kept"), "mocked".into()), Ok(json!("mocked")));
        assert_eq!(
            fixture.resolve("User", json!({"login": "a", "htmlUrl": "b"}), MockValue::from(json!({"login": "c"}))),
            Ok(json!({"login": "c", "htmlUrl": "b"}))
        );
    }

    #[test]
    fn unmocked_scalars_fail() {
        let fixture = Fixture::new(json!({}), MergingStrategy::PreserveDeeper);

        assert_eq!(
            fixture.resolve("Date", json!(null), MockValue::Undefined),
            Err(ResolveError::NoScalarMock {
                type_name: "Date".into(),
                path: "field".into()
            })
        );
    }

    #[test]
    fn enums_default_to_their_first_value() {
        let fixture = Fixture::new(json!({}), MergingStrategy::PreserveDeeper);

        assert_eq!(fixture.resolve("Tag", json!(null), MockValue::Undefined), Ok(json!("NEW")));
        assert_eq!(fixture.resolve("Tag", json!(null), "HOT".into()), Ok(json!("HOT")));
    }

    #[test]
    fn nested_lists_default_to_two_by_two() {
        let fixture = Fixture::new(json!({}), MergingStrategy::PreserveDeeper);

        assert_eq!(
            fixture.resolve("[[Tag]]", json!(null), MockValue::Undefined),
            Ok(json!([["NEW", "NEW"], ["NEW", "NEW"]]))
        );
    }

    #[test]
    fn list_items_are_validated() {
        let fixture = Fixture::new(json!({}), MergingStrategy::PreserveDeeper);

        assert_eq!(
            fixture.resolve("[[Tag]]", json!(null), MockValue::from(json!([["HOT"], {"id": 15}]))),
            Err(ResolveError::ExpectedListItem {
                path: "field.1".into(),
                found: r#"{"id":15}"#.into()
            })
        );
        assert_eq!(
            fixture.resolve("[User]", json!(null), MockValue::from(json!([{}, []]))),
            Err(ResolveError::ExpectedObjectItem {
                path: "field.1".into(),
                found: "[]".into()
            })
        );
        assert_eq!(
            fixture.resolve("[Tag]", json!(null), MockValue::from(json!([1]))),
            Err(ResolveError::ExpectedEnumItem {
                path: "field.0".into(),
                found: "1".into()
            })
        );
        assert_eq!(
            fixture.resolve("[Tag]", json!(null), "HOT".into()),
            Err(ResolveError::ExpectedList {
                path: "field".into(),
                found: r#""HOT""#.into()
            })
        );
    }

    #[test]
    fn null_list_elements_are_kept() {
        let fixture = Fixture::new(json!({}), MergingStrategy::PreserveDeeper);

        assert_eq!(
            fixture.resolve("[User]", json!(null), MockValue::list([MockValue::Null, MockValue::Undefined])),
            Ok(json!([null, {}]))
        );
    }

    #[test]
    fn abstract_types_need_a_typename() {
        let fixture = Fixture::new(json!({}), MergingStrategy::PreserveDeeper);

        assert_eq!(
            fixture.resolve("[Actor]", json!(null), MockValue::from(json!([{"__typename": "User"}, {"login": "x"}]))),
            Err(ResolveError::MissingDiscriminator {
                type_name: "Actor".into(),
                path: "field.1".into()
            })
        );

        let fixture = Fixture::new(json!({"Actor": {"__typename": "User"}}), MergingStrategy::PreserveDeeper);
        assert_eq!(
            fixture.resolve("Actor", json!(null), MockValue::from(json!({"login": "x"}))),
            Ok(json!({"__typename": "User", "login": "x"}))
        );
    }

    #[test]
    fn input_types_are_unexpected_in_output_position() {
        let fixture = Fixture::new(json!({}), MergingStrategy::PreserveDeeper);

        assert!(matches!(
            fixture.resolve("Filter", json!(null), MockValue::Undefined),
            Err(ResolveError::UnexpectedType { .. })
        ));
    }
}
