use reqwest::{Client, RequestBuilder};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::APP_USER_AGENT;

/// Shared HTTP session: one `reqwest::Client` per page plus the
/// anti-forgery token every mutating request carries. Header injection
/// happens here and nowhere else.
#[derive(Debug, Clone)]
pub struct Session {
    http: Client,
    config: ClientConfig,
}

impl Session {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Mutating request. The token travels in a header, never in the
    /// body, and the ajax marker tells the server which client class is
    /// calling.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http
            .post(url)
            .header("X-CSRFToken", self.config.csrf_token.as_str())
            .header("X-Requested-With", "XMLHttpRequest")
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url)
    }
}
