#![allow(dead_code)]

use gql_mock::{
    build_mocking, DocumentsMap, MockValue, Mocking, MockingConfig, OperationDocument, OperationKind, TypeMocks,
};
use indoc::indoc;

pub const GITHUNT_SDL: &str = indoc! {r#"
    scalar Date

    type Comment {
      id: Int!
      postedBy: User!
      createdAt: Date!
      content: String!
      repoName: String!
    }

    type Entry {
      repository: Repository!
      postedBy: User!
      createdAt: Date!
      score: Int!
      hotScore: Float!
      comments(limit: Int, offset: Int): [Comment]!
      commentCount: Int!
      id: Int!
      vote: Vote!
      type: FeedType!
    }

    enum FeedType {
      HOT
      NEW
      TOP
    }

    input VoteArgs {
      repoFullName: String!
      type: VoteType!
    }

    type Mutation {
      submitRepository(repoFullName: String!): Entry
      vote(args: VoteArgs!): Entry
      submitComment(repoFullName: String!, commentContent: String!): Comment
    }

    union Followable = Organization | Repository

    type Query {
      followSuggestion: Followable
      followSuggestions: [Followable]
      feed(type: FeedType = TOP, offset: Int, limit: Int): [Entry]
      entry(repoFullName: String!): Entry
      repository(repoFullName: String!): Repository
      currentUser: User
    }

    type Repository {
      name: String!
      fullName: String!
      description: String
      htmlUrl: String!
      stargazersCount: Int!
      openIssuesCount: Int
      owner: Actor!
      contributors: [Actor]
    }

    type Subscription {
      commentAdded(repoFullName: String!): Comment
    }

    interface Actor {
      avatarUrl: String!
      name: String!
    }

    type User implements Actor {
      login: String!
      avatarUrl: String!
      htmlUrl: String!
      name: String!
    }

    type Organization implements Actor {
      avatarUrl: String!
      name: String!
      websiteUrl: String
    }

    type Vote {
      voteValue: Int!
    }

    enum VoteType {
      UP
      DOWN
      CANCEL
    }

    schema {
      query: Query
      mutation: Mutation
      subscription: Subscription
    }
"#};

const COMMENTS_PAGE_COMMENT: &str = indoc! {"
    fragment CommentsPageComment on Comment {
      id
      postedBy {
        login
        htmlUrl
      }
      createdAt
      content
    }
"};

const VOTE_BUTTONS: &str = indoc! {"
    fragment VoteButtons on Entry {
      score
      vote {
        voteValue
      }
    }
"};

const REPO_INFO: &str = indoc! {"
    fragment RepoInfo on Entry {
      createdAt
      repository {
        description
        stargazersCount
        openIssuesCount
      }
      postedBy {
        htmlUrl
        login
      }
    }
"};

const FEED_ENTRY: &str = indoc! {"
    fragment FeedEntry on Entry {
      id
      commentCount
      repository {
        fullName
        htmlUrl
        owner {
          avatarUrl
        }
      }
      ...VoteButtons
      ...RepoInfo
    }
"};

const ON_COMMENT_ADDED: &str = indoc! {"
    subscription onCommentAdded($repoFullName: String!) {
      commentAdded(repoFullName: $repoFullName) {
        id
        postedBy {
          login
          htmlUrl
        }
        createdAt
        content
      }
    }
"};

const COMMENT: &str = indoc! {"
    query Comment($repoFullName: String!, $limit: Int, $offset: Int) {
      currentUser {
        login
        htmlUrl
      }
      entry(repoFullName: $repoFullName) {
        id
        postedBy {
          login
          htmlUrl
        }
        createdAt
        comments(limit: $limit, offset: $offset) {
          ...CommentsPageComment
        }
        comments2: comments(limit: $limit, offset: $offset) {
          ... {
            ... {
              ...CommentsPageComment
            }
          }
        }
        comments3: comments(limit: $limit, offset: $offset) {
          ... {
            ... on Comment {
              ...CommentsPageComment
            }
          }
        }
        commentCount
        repository {
          fullName
          htmlUrl
          ... on Repository {
            description
            openIssuesCount
            stargazersCount
          }
        }
      }
    }
"};

const FEED: &str = indoc! {"
    query Feed($type: FeedType!, $offset: Int, $limit: Int) {
      currentUser {
        login
      }
      feed(type: $type, offset: $offset, limit: $limit) {
        ...FeedEntry
      }
    }
"};

const SUBMIT_REPOSITORY: &str = indoc! {"
    mutation submitRepository($repoFullName: String!) {
      submitRepository(repoFullName: $repoFullName) {
        createdAt
      }
    }
"};

const FOLLOW_SUGGESTIONS: &str = indoc! {"
    query followSuggestions {
      followSuggestions {
        ... on Organization {
          name
          websiteUrl
        }
        ... on Repository {
          name
          htmlUrl
        }
      }
    }
"};

pub const DATE: &str = "2020-01-01T00:00:00Z";

pub fn githunt_documents() -> DocumentsMap {
    let document = |kind, sources: &[&str]| OperationDocument::parse(&sources.join("\n"), kind).unwrap();

    [
        ("CommentsPageComment", document(OperationKind::Fragment, &[COMMENTS_PAGE_COMMENT])),
        (
            "FeedEntry",
            document(OperationKind::Fragment, &[FEED_ENTRY, VOTE_BUTTONS, REPO_INFO]),
        ),
        ("onCommentAdded", document(OperationKind::Subscription, &[ON_COMMENT_ADDED])),
        ("Comment", document(OperationKind::Query, &[COMMENT, COMMENTS_PAGE_COMMENT])),
        (
            "Feed",
            document(OperationKind::Query, &[FEED, FEED_ENTRY, VOTE_BUTTONS, REPO_INFO]),
        ),
        ("submitRepository", document(OperationKind::Mutation, &[SUBMIT_REPOSITORY])),
        ("followSuggestions", document(OperationKind::Query, &[FOLLOW_SUGGESTIONS])),
    ]
    .into_iter()
    .map(|(name, document)| (name.to_owned(), document))
    .collect()
}

/// Session mocks every githunt test relies on: dates can't be defaulted and actors need a concrete type.
pub fn githunt_base_mocks() -> TypeMocks {
    TypeMocks::new()
        .with("Date", DATE)
        .with("Actor", MockValue::object([("__typename", "User")]))
}

pub fn githunt() -> Mocking {
    build_mocking(
        GITHUNT_SDL,
        githunt_documents(),
        MockingConfig::new().with_mocks(githunt_base_mocks()),
    )
    .unwrap()
}

pub const CATALOG_SDL: &str = indoc! {"
    schema {
      query: Query
    }

    type Query {
      fetchNestedInt: [[Int]]
      fetchNestedObj: [[Order]]
      fetchNestedScalar: [[Date]]
      fetchNestedEnum: [[FetchType]]
      fetchNestedInterface: [[List]]
      fetchNestedUnion: [[SearchResult]]
    }

    scalar Date

    enum FetchType {
      NEW
      OLD
    }

    type Product {
      id: Int
      name: String
    }

    type Order {
      id: Int
      date: Date
    }

    union SearchResult = Product | Order

    interface List {
      total: Int
    }

    type DistributorList implements List {
      total: Int
      distributors: [String]
    }

    type ProductIdsList implements List {
      total: Int
      ids: [Int]
    }
"};

/// Ints are pinned so that results are deterministic.
pub fn catalog() -> Mocking {
    let mocks = TypeMocks::new().with("Date", DATE).with("Int", 42_i64);

    build_mocking(CATALOG_SDL, DocumentsMap::new(), MockingConfig::new().with_mocks(mocks)).unwrap()
}
