use serde::{Deserialize, Serialize};

/// Base name of the topic order-creation notifications go to.
pub const ORDER_CREATED: &str = "order--created";

/// Name of a bus topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Prepends a deployment prefix, e.g. `staging-` + `order--created`.
    pub fn with_prefix(prefix: &str, name: &str) -> Self {
        Self(format!("{prefix}{name}"))
    }

    /// The order-creation topic under the given prefix.
    pub fn order_created(prefix: &str) -> Self {
        Self::with_prefix(prefix, ORDER_CREATED)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
