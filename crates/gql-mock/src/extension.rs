//! Keeps list items that were mocked as an explicit `null` null.

use std::sync::Arc;

use async_graphql::{
    extensions::{Extension, ExtensionContext, ExtensionFactory, NextResolve, ResolveInfo},
    QueryPathSegment, ServerResult, Value,
};

use crate::context::MockingState;

/// Registered on the executable schema. List items whose path the interceptor recorded as null
/// are not resolved at all.
pub(crate) struct NullListItems;

impl ExtensionFactory for NullListItems {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(NullListItemsExtension)
    }
}

struct NullListItemsExtension;

#[async_trait::async_trait]
impl Extension for NullListItemsExtension {
    async fn resolve(
        &self,
        ctx: &ExtensionContext<'_>,
        info: ResolveInfo<'_>,
        next: NextResolve<'_>,
    ) -> ServerResult<Option<Value>> {
        if let (QueryPathSegment::Index(_), Some(state)) = (info.path_node.segment, ctx.data_opt::<MockingState>()) {
            let path = info.path_node.to_string();

            if state.is_null_item(&path) {
                tracing::trace!(%path, "null list item");
                return Ok(None);
            }
        }

        next.run(ctx, info).await
    }
}
