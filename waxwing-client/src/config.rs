use std::env;

use url::Url;

use crate::error::ClientError;

/// Configuration for one page session. Built once at startup, from the
/// environment or explicitly, then handed to constructors by value;
/// nothing reads the environment after construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub ws_url: String,
    pub csrf_token: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            ws_url: "ws://localhost:8000".to_string(),
            csrf_token: String::new(),
        }
    }
}

impl ClientConfig {
    /// Reads `WAXWING_BASE_URL`, `WAXWING_WS_URL` and `WAXWING_CSRF_TOKEN`,
    /// falling back to the local-dev defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        let defaults = Self::default();
        let base_url = env::var("WAXWING_BASE_URL").unwrap_or(defaults.base_url);
        let ws_url = env::var("WAXWING_WS_URL").unwrap_or(defaults.ws_url);
        let csrf_token = env::var("WAXWING_CSRF_TOKEN").unwrap_or_default();
        Self::new(base_url, ws_url, csrf_token)
    }

    /// Validates both origins and strips trailing slashes so the endpoint
    /// builders can join paths uniformly.
    pub fn new(
        base_url: impl Into<String>,
        ws_url: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        let ws_url = ws_url.into();

        let parsed = Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("Invalid base URL {:?}: {}", base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ClientError::Config(format!(
                "Base URL must be http or https, got {:?}",
                parsed.scheme()
            )));
        }
        let parsed = Url::parse(&ws_url)
            .map_err(|e| ClientError::Config(format!("Invalid ws URL {:?}: {}", ws_url, e)))?;
        if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
            return Err(ClientError::Config(format!(
                "Ws URL must be ws or wss, got {:?}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ws_url: ws_url.trim_end_matches('/').to_string(),
            csrf_token: csrf_token.into(),
        })
    }

    pub fn like_endpoint(&self, post_id: &str) -> String {
        format!("{}/like/{}/", self.base_url, post_id)
    }

    pub fn comment_endpoint(&self, post_id: &str) -> String {
        format!("{}/comment/{}/", self.base_url, post_id)
    }

    pub fn notifications_endpoint(&self) -> String {
        format!("{}/notifications/ajax/", self.base_url)
    }

    pub fn chat_history_endpoint(&self, user_id: i64) -> String {
        format!("{}/chat/history/{}/", self.base_url, user_id)
    }

    pub fn notifications_socket(&self) -> String {
        format!("{}/ws/notifications/", self.ws_url)
    }

    pub fn chat_socket(&self, room: &str) -> String {
        format!("{}/ws/chat/{}/", self.ws_url, room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = ClientConfig::default();
        assert_eq!(
            config.like_endpoint("12"),
            "http://localhost:8000/like/12/"
        );
        assert_eq!(
            config.notifications_endpoint(),
            "http://localhost:8000/notifications/ajax/"
        );
        assert_eq!(
            config.notifications_socket(),
            "ws://localhost:8000/ws/notifications/"
        );
        assert_eq!(
            config.chat_socket("chat_1_3"),
            "ws://localhost:8000/ws/chat/chat_1_3/"
        );
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = ClientConfig::new("https://feed.example/", "wss://feed.example/", "tok")
            .unwrap();
        assert_eq!(config.comment_endpoint("9"), "https://feed.example/comment/9/");
        assert_eq!(
            config.notifications_socket(),
            "wss://feed.example/ws/notifications/"
        );
    }

    #[test]
    fn test_rejects_wrong_schemes() {
        assert!(ClientConfig::new("ftp://feed.example", "ws://feed.example", "").is_err());
        assert!(ClientConfig::new("http://feed.example", "http://feed.example", "").is_err());
        assert!(ClientConfig::new("not a url", "ws://feed.example", "").is_err());
    }

    #[test]
    fn test_from_env_reads_overrides() {
        temp_env::with_vars(
            [
                ("WAXWING_BASE_URL", Some("https://feed.example")),
                ("WAXWING_WS_URL", Some("wss://feed.example")),
                ("WAXWING_CSRF_TOKEN", Some("sekrit")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.base_url, "https://feed.example");
                assert_eq!(config.ws_url, "wss://feed.example");
                assert_eq!(config.csrf_token, "sekrit");
            },
        );
    }

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("WAXWING_BASE_URL", None::<&str>),
                ("WAXWING_WS_URL", None),
                ("WAXWING_CSRF_TOKEN", None),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.base_url, "http://localhost:8000");
                assert_eq!(config.csrf_token, "");
            },
        );
    }
}
