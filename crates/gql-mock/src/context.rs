use std::collections::HashSet;

use parking_lot::Mutex;

use crate::{
    defaults::scalar_defaults,
    lookup::ResolutionCache,
    mocks::MockLayer,
    MergingStrategy, MockOptions, MockingConfig,
};

/// Everything the field interceptors need during one mocking call, handed over as request data.
#[derive(Debug)]
pub(crate) struct MockingState {
    /// Lowest precedence first.
    pub(crate) layers: Vec<MockLayer>,
    pub(crate) merging_strategy: MergingStrategy,
    pub(crate) cache: ResolutionCache,
    pub(crate) context: serde_json::Value,
    /// Dotted paths of list items mocked as an explicit `null`.
    null_items: Mutex<HashSet<String>>,
}

impl MockingState {
    pub(crate) fn build(config: &MockingConfig, options: &MockOptions) -> Self {
        let defaults = MockLayer {
            resolvers: scalar_defaults(),
            preserve_previous: false,
        };
        let layers = std::iter::once(defaults)
            .chain(
                config
                    .mocks
                    .sources()
                    .chain(options.mocks.sources())
                    .map(|source| MockLayer {
                        resolvers: source.materialize(),
                        preserve_previous: true,
                    }),
            )
            .collect::<Vec<_>>();

        let merging_strategy = options.merging_strategy.unwrap_or(config.merging_strategy);
        tracing::trace!(layers = layers.len(), ?merging_strategy, "built mocking state");

        MockingState {
            layers,
            merging_strategy,
            cache: ResolutionCache::default(),
            context: merge_context(&config.context, options.context.as_ref()),
            null_items: Mutex::default(),
        }
    }

    pub(crate) fn record_null_items(&self, paths: impl IntoIterator<Item = String>) {
        self.null_items.lock().extend(paths);
    }

    pub(crate) fn is_null_item(&self, path: &str) -> bool {
        self.null_items.lock().contains(path)
    }
}

/// Per-call keys win over session keys when both contexts are objects, otherwise the per-call
/// context replaces the session one.
fn merge_context(session: &serde_json::Value, call: Option<&serde_json::Value>) -> serde_json::Value {
    match (session, call) {
        (_, None) => session.clone(),
        (serde_json::Value::Object(session), Some(serde_json::Value::Object(call))) => {
            let mut merged = session.clone();
            merged.extend(call.clone());
            serde_json::Value::Object(merged)
        }
        (_, Some(call)) => call.clone(),
    }
}
