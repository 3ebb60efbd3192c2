use serde::{Deserialize, Serialize};

use crate::{Mocks, MockingError, TypeMocks};

/// Which side wins when a value is present both in the parent's data and in a type mock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergingStrategy {
    /// Data coming from the parent object wins over the mock of the field's own type.
    #[default]
    PreserveDeeper,
    /// The mock of the field's own type wins over data coming from the parent object.
    PreserveShallow,
}

/// Session-wide settings, shared by every call made through a [`crate::Mocking`].
///
/// ```toml
/// merging_strategy = "preserve-shallow"
///
/// [context]
/// user = "ada"
///
/// [mocks.User]
/// login = "ada"
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MockingConfig {
    pub mocks: Mocks,
    /// Handed to resolver functions as `params.context`.
    pub context: serde_json::Value,
    pub merging_strategy: MergingStrategy,
}

impl MockingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml(source: &str) -> Result<Self, MockingError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, MockingError> {
        Ok(serde_json::from_value(value)?)
    }

    #[must_use]
    pub fn with_mocks(mut self, mocks: impl Into<Mocks>) -> Self {
        self.mocks = mocks.into();
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_merging_strategy(mut self, merging_strategy: MergingStrategy) -> Self {
        self.merging_strategy = merging_strategy;
        self
    }
}

/// Settings of a single mocking call.
#[derive(Clone, Debug, Default)]
pub struct MockOptions {
    /// Mock groups layered on top of the session mocks.
    pub mocks: Mocks,
    pub variables: Option<serde_json::Value>,
    pub merging_strategy: Option<MergingStrategy>,
    /// Shallow-merged over the session context.
    pub context: Option<serde_json::Value>,
    /// The fragment to mock when the document only contains fragments.
    pub target_fragment: Option<String>,
}

impl MockOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mocks(mut self, mocks: impl Into<Mocks>) -> Self {
        self.mocks = mocks.into();
        self
    }

    #[must_use]
    pub fn with_mock_generator(mut self, generate: impl Fn() -> TypeMocks + Send + Sync + 'static) -> Self {
        self.mocks = self.mocks.with_generator(generate);
        self
    }

    #[must_use]
    pub fn with_variables(mut self, variables: serde_json::Value) -> Self {
        self.variables = Some(variables);
        self
    }

    #[must_use]
    pub fn with_merging_strategy(mut self, merging_strategy: MergingStrategy) -> Self {
        self.merging_strategy = Some(merging_strategy);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn with_target_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.target_fragment = Some(fragment.into());
        self
    }
}
