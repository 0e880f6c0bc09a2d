//! Session configuration.
//!
//! Values come from code or from `APPVEYOR_*` environment variables:
//! `APPVEYOR_ENDPOINT`, `APPVEYOR_USER_AGENT` and, for
//! `AppveyorClient::from_env`, `APPVEYOR_TOKEN`.

use serde::Deserialize;

use crate::error::AppveyorError;

pub const DEFAULT_ENDPOINT: &str = "https://ci.appveyor.com";
pub const DEFAULT_USER_AGENT: &str = "appveyor-client-rs";

const ENV_PREFIX: &str = "APPVEYOR_";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Base URL; API paths (`/api/...`) are appended to it.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, AppveyorError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env()?)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Endpoint without trailing slashes.
    pub(crate) fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

#[derive(Deserialize)]
pub(crate) struct Credentials {
    pub token: String,
}

impl Credentials {
    pub(crate) fn from_env() -> Result<Self, AppveyorError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env()?)
    }
}
