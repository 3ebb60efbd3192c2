use async_graphql::{PathSegment, QueryPathNode, QueryPathSegment};

/// Renders a response path the way it shows up in error messages: `feed.0.postedBy`.
pub(crate) fn display_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| match segment {
            PathSegment::Field(name) => name.clone(),
            PathSegment::Index(index) => index.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// The response path of a query path node, root first. Segments are response keys.
pub(crate) fn query_path(mut node: Option<&QueryPathNode<'_>>) -> Vec<PathSegment> {
    let mut segments = Vec::new();

    while let Some(current) = node {
        segments.push(match current.segment {
            QueryPathSegment::Index(index) => PathSegment::Index(index),
            QueryPathSegment::Name(name) => PathSegment::Field(name.to_owned()),
        });
        node = current.parent;
    }

    segments.reverse();
    segments
}

pub(crate) fn child_path(path: &[PathSegment], index: usize) -> Vec<PathSegment> {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(PathSegment::Index(index));
    child
}

/// The resolution cache key of a type mock: the path prefix followed by the type name.
pub(crate) fn cache_key(path_prefix: &[PathSegment], type_name: &str) -> String {
    if path_prefix.is_empty() {
        return type_name.to_owned();
    }

    format!("{}.{type_name}", display_path(path_prefix))
}
