//! Session and request dispatcher for the Appveyor API.
//!
//! # Design
//! `AppveyorClient` holds the endpoint, the default headers (content type,
//! user agent, bearer token) and a `Transport`. It never changes after
//! construction. Every call goes through `send`: the `Request` descriptor is
//! bound to the session by `build`, executed by the transport and the
//! response is classified by `dispatch::interpret`.
//!
//! Construction authenticates: the token is checked with a `GET /api/roles`
//! and a rejected token is returned as the same `AppveyorError::Api` any
//! other call would produce.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::config::{ClientConfig, Credentials};
use crate::dispatch::{self, Outcome};
use crate::error::AppveyorError;
use crate::http::{HttpRequest, Transport, UreqTransport};
use crate::request::{Request, JSON_CONTENT_TYPE};
use crate::resources::{Builds, Collaborators, Deployments, Environments, Projects, Roles, Users};

/// Cheap authenticated call used to validate the token.
const AUTH_CHECK_PATH: &str = "/api/roles";

const CONTENT_TYPE: &str = "Content-Type";

/// Authenticated Appveyor session.
#[derive(Clone)]
pub struct AppveyorClient<T = UreqTransport> {
    base_url: String,
    headers: Vec<(String, String)>,
    transport: T,
}

impl<T> fmt::Debug for AppveyorClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppveyorClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AppveyorClient<UreqTransport> {
    /// Connect over HTTPS and validate `token`.
    pub fn connect(token: &str, config: ClientConfig) -> Result<Self, AppveyorError> {
        Self::with_transport(token, config, UreqTransport::new())
    }

    /// Connect using `APPVEYOR_TOKEN` and the optional `APPVEYOR_*` settings.
    pub fn from_env() -> Result<Self, AppveyorError> {
        let credentials = Credentials::from_env()?;
        Self::connect(&credentials.token, ClientConfig::from_env()?)
    }
}

impl<T: Transport> AppveyorClient<T> {
    /// Build a session on top of `transport` and validate `token`.
    pub fn with_transport(
        token: &str,
        config: ClientConfig,
        transport: T,
    ) -> Result<Self, AppveyorError> {
        let client = Self {
            base_url: config.base_url().to_string(),
            headers: vec![
                (CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()),
                ("User-Agent".to_string(), config.user_agent),
                ("Authorization".to_string(), format!("Bearer {token}")),
            ],
            transport,
        };
        client.get(AUTH_CHECK_PATH)?;
        tracing::info!(endpoint = %client.base_url, "authenticated with appveyor");
        Ok(client)
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Bind a descriptor to this session without sending it.
    pub fn build(&self, request: &Request) -> Result<HttpRequest, AppveyorError> {
        let mut headers = self.headers.clone();
        let body = match &request.body {
            Some(body) => {
                if let Some(slot) = headers
                    .iter_mut()
                    .find(|(k, _)| k.eq_ignore_ascii_case(CONTENT_TYPE))
                {
                    slot.1 = body.content_type().to_string();
                }
                Some(body.render()?)
            }
            None => None,
        };
        Ok(HttpRequest {
            method: request.method,
            url: format!("{}{}", self.base_url, request.path),
            headers,
            body,
        })
    }

    /// Send one request and interpret the response.
    pub fn send(&self, request: Request) -> Outcome {
        let http_request = self.build(&request)?;
        tracing::debug!(method = %http_request.method, url = %http_request.url, "sending request");
        let response = self.transport.execute(&http_request)?;
        tracing::debug!(status = response.status, url = %http_request.url, "received response");
        dispatch::interpret(&response, request.format)
    }

    pub fn get(&self, path: &str) -> Outcome {
        self.send(Request::get(path))
    }

    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Outcome {
        self.send(Request::post(path).json(body)?)
    }

    pub fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Outcome {
        self.send(Request::put(path).json(body)?)
    }

    pub fn delete(&self, path: &str) -> Outcome {
        self.send(Request::delete(path))
    }

    pub fn users(&self) -> Users<'_, T> {
        Users::new(self)
    }

    pub fn collaborators(&self) -> Collaborators<'_, T> {
        Collaborators::new(self)
    }

    pub fn roles(&self) -> Roles<'_, T> {
        Roles::new(self)
    }

    pub fn projects(&self) -> Projects<'_, T> {
        Projects::new(self)
    }

    pub fn builds(&self) -> Builds<'_, T> {
        Builds::new(self)
    }

    pub fn environments(&self) -> Environments<'_, T> {
        Environments::new(self)
    }

    pub fn deployments(&self) -> Deployments<'_, T> {
        Deployments::new(self)
    }

    /// Account name and project slug of the project built from
    /// `repo_full_name` (e.g. `owner/repo`, case-insensitive).
    pub fn account_slug_for_repo(
        &self,
        repo_full_name: &str,
    ) -> Result<(String, String), AppveyorError> {
        let projects = self.projects().get()?.unwrap_or(Value::Null);
        projects
            .as_array()
            .into_iter()
            .flatten()
            .find(|project| {
                project["repositoryName"]
                    .as_str()
                    .is_some_and(|name| name.eq_ignore_ascii_case(repo_full_name))
            })
            .and_then(|project| {
                let account = project["accountName"].as_str()?;
                let slug = project["slug"].as_str()?;
                Some((account.to_string(), slug.to_string()))
            })
            .ok_or_else(|| AppveyorError::UnknownRepository(repo_full_name.to_string()))
    }
}
