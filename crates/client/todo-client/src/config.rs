use bon::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection settings for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct ClientConfig {
    /// Root URL of the todo API
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,

    /// Per-request timeout. Ignored on wasm32.
    pub timeout: Option<Duration>,

    #[builder(into, default = default_user_agent())]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("todo-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, None);
        assert!(config.user_agent.starts_with("todo-client/"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::builder()
            .base_url("https://todo.example.com/api/")
            .timeout(Duration::from_secs(5))
            .build();
        assert_eq!(config.base_url, "https://todo.example.com/api/");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
