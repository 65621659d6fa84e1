// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Client configuration options.

use serde::Deserialize;

use crate::links;

/// Configuration for a [`Client`].
///
/// The defaults point at Twitter's production API. Every field can be loaded with serde; missing
/// fields keep their defaults.
///
/// ```
/// use egg_mode_v2::ClientConfig;
///
/// let config = ClientConfig::default().with_user_agent("my-app/1.0");
/// assert_eq!(config.api_url, "https://api.twitter.com");
/// ```
///
/// [`Client`]: struct.Client.html
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// The base URL relative endpoint templates are resolved against.
    pub api_url: String,
    /// The URL bearer tokens are requested from.
    pub token_url: String,
    /// The `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: links::API_BASE.to_string(),
            token_url: links::auth::BEARER_TOKEN.to_string(),
            user_agent: format!("egg-mode-v2/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL endpoint templates are resolved against.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the URL bearer tokens are requested from.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the full URL for the given endpoint template. Templates that are already absolute
    /// URLs are returned unchanged.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.api_url.trim_end_matches('/'), endpoint)
        }
    }
}
