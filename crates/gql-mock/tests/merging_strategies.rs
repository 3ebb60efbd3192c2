mod support;

use gql_mock::{build_mocking, MergingStrategy, MockOptions, Mocks, MockingConfig, TypeMocks};
use rstest::rstest;
use serde_json::json;
use support::{githunt, githunt_base_mocks, githunt_documents, GITHUNT_SDL};

fn mocks(groups: serde_json::Value) -> Mocks {
    match groups {
        serde_json::Value::Array(groups) => groups
            .into_iter()
            .map(|group| TypeMocks::from_json(group).unwrap())
            .collect(),
        group => TypeMocks::from_json(group).unwrap().into(),
    }
}

#[rstest]
#[case::shallow_type_value(
    json!({"Comment": {"postedBy": {"htmlUrl": "one"}}, "User": {"htmlUrl": "three"}}),
    MergingStrategy::PreserveShallow,
    "three"
)]
#[case::shallow_type_value_passed_first(
    json!({"User": {"htmlUrl": "three"}, "Comment": {"postedBy": {"htmlUrl": "one"}}}),
    MergingStrategy::PreserveShallow,
    "three"
)]
#[case::shallow_type_value_in_other_group(
    json!([{"Comment": {"postedBy": {"htmlUrl": "one"}}}, {"Comment": {"postedBy": {"htmlUrl": "two"}}, "User": {"htmlUrl": "three"}}]),
    MergingStrategy::PreserveShallow,
    "three"
)]
#[case::shallow_type_value_in_earlier_group(
    json!([{"User": {"htmlUrl": "three"}, "Comment": {"postedBy": {"htmlUrl": "one"}}}, {"Comment": {"postedBy": {"htmlUrl": "two"}}}]),
    MergingStrategy::PreserveShallow,
    "three"
)]
#[case::deeper_value(
    json!({"Comment": {"postedBy": {"htmlUrl": "one"}}, "User": {"htmlUrl": "three"}}),
    MergingStrategy::PreserveDeeper,
    "one"
)]
#[case::deeper_value_passed_later(
    json!({"User": {"htmlUrl": "three"}, "Comment": {"postedBy": {"htmlUrl": "one"}}}),
    MergingStrategy::PreserveDeeper,
    "one"
)]
#[case::deeper_value_in_later_group(
    json!([{"Comment": {"postedBy": {"htmlUrl": "one"}}}, {"Comment": {"postedBy": {"htmlUrl": "two"}}, "User": {"htmlUrl": "three"}}]),
    MergingStrategy::PreserveDeeper,
    "two"
)]
#[case::deeper_value_overridden_by_later_group(
    json!([{"User": {"htmlUrl": "three"}, "Comment": {"postedBy": {"htmlUrl": "one"}}}, {"Comment": {"postedBy": {"htmlUrl": "two"}}}]),
    MergingStrategy::PreserveDeeper,
    "two"
)]
fn merging_strategy_picks_the_winning_value(
    #[case] groups: serde_json::Value,
    #[case] merging_strategy: MergingStrategy,
    #[case] html_url: &str,
) {
    let result = githunt()
        .mock_blocking(
            "CommentsPageComment",
            MockOptions::new()
                .with_mocks(mocks(groups))
                .with_merging_strategy(merging_strategy),
        )
        .unwrap();

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.data.unwrap()["postedBy"]["htmlUrl"], json!(html_url));
}

#[tokio::test]
async fn scalar_mocks_fill_in_with_either_strategy() {
    let options = MockOptions::new()
        .with_mocks(mocks(json!({"User": {"htmlUrl": "three"}, "Comment": {"postedBy": {"htmlUrl": "one"}}})))
        .with_mock_generator(|| TypeMocks::new().with("String", "fake-string"))
        .with_merging_strategy(MergingStrategy::PreserveShallow);

    let result = githunt().mock("CommentsPageComment", options).await.unwrap();

    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let data = result.data.unwrap();
    assert_eq!(data["postedBy"]["htmlUrl"], json!("three"));
    assert_eq!(data["postedBy"]["login"], json!("fake-string"));
    assert_eq!(data["content"], json!("fake-string"));
}

#[tokio::test]
async fn shallow_merging_of_a_complex_query() {
    let mocks = mocks(json!({
        "User": {"login": "fake-User.login"},
        "Entry": {"comments": [{"postedBy": {"htmlUrl": "will-be-ignored"}}, {}]},
        "Comment": {
            "content": "a",
            "postedBy": {"login": "will-be-ignored", "htmlUrl": "fake-Comment.postedBy.htmlUrl"}
        }
    }));

    let result = githunt()
        .mock(
            "Comment",
            MockOptions::new()
                .with_mocks(mocks)
                .with_variables(json!({"repoFullName": "test"}))
                .with_merging_strategy(MergingStrategy::PreserveShallow),
        )
        .await
        .unwrap();

    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let data = result.data.unwrap();
    assert_eq!(data["currentUser"]["login"], json!("fake-User.login"));
    assert_eq!(data["currentUser"]["htmlUrl"], json!("Hello World"));

    for comment in data["entry"]["comments"].as_array().unwrap() {
        assert_eq!(comment["postedBy"]["login"], json!("fake-User.login"));
        assert_eq!(comment["postedBy"]["htmlUrl"], json!("fake-Comment.postedBy.htmlUrl"));
    }
}

#[tokio::test]
async fn session_strategy_applies_unless_overridden() {
    let mocking = build_mocking(
        GITHUNT_SDL,
        githunt_documents(),
        MockingConfig::new()
            .with_mocks(githunt_base_mocks())
            .with_merging_strategy(MergingStrategy::PreserveShallow),
    )
    .unwrap();
    let groups = json!({"Comment": {"postedBy": {"htmlUrl": "one"}}, "User": {"htmlUrl": "three"}});

    let result = mocking
        .mock("CommentsPageComment", MockOptions::new().with_mocks(mocks(groups.clone())))
        .await
        .unwrap();
    assert_eq!(result.data.unwrap()["postedBy"]["htmlUrl"], json!("three"));

    let result = mocking
        .mock(
            "CommentsPageComment",
            MockOptions::new()
                .with_mocks(mocks(groups))
                .with_merging_strategy(MergingStrategy::PreserveDeeper),
        )
        .await
        .unwrap();
    assert_eq!(result.data.unwrap()["postedBy"]["htmlUrl"], json!("one"));
}
