//! Blocking client for the Appveyor REST API.
//!
//! # Overview
//! `AppveyorClient` authenticates with a bearer token and exposes the API
//! grouped by resource: `users()`, `collaborators()`, `roles()`,
//! `projects()`, `builds()`, `environments()` and `deployments()`. Every
//! method returns an `Outcome`: `Some(json)` for 200, `None` for 204, or an
//! `AppveyorError`.
//!
//! # Design
//! - Resource methods only build `Request` descriptors; the client binds
//!   them to the session, a `Transport` executes them, and
//!   `dispatch::interpret` classifies the response.
//! - The default transport is a pooled `ureq` agent. Any other HTTP stack
//!   can be plugged in through `AppveyorClient::with_transport`.
//! - Argument checks (build target, password, repository provider) run
//!   before anything is sent.
//!
//! ```no_run
//! use appveyor_client::{AppveyorClient, BuildOptions, ClientConfig};
//!
//! # fn main() -> Result<(), appveyor_client::AppveyorError> {
//! let client = AppveyorClient::connect("token", ClientConfig::default())?;
//! let build = client
//!     .builds()
//!     .start("acme", "demo-app", &BuildOptions::branch("main"))?;
//! println!("{build:?}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod request;
pub mod resources;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::AppveyorClient;
pub use config::ClientConfig;
pub use dispatch::{interpret, Outcome, ResponseFormat, GENERIC_FAILURE_MESSAGE};
pub use error::AppveyorError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use request::{Request, RequestBody};
pub use types::{
    BuildOptions, EnvironmentVariables, HistoryQuery, NewUser, RepositoryProvider, StartDeployment,
};
