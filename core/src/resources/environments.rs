//! Deployment environments (`/api/environments`).

use serde::Serialize;

use crate::client::AppveyorClient;
use crate::dispatch::Outcome;
use crate::http::Transport;
use crate::request::Request;
use crate::resources::collection_path;

const ENVIRONMENTS: &str = "/api/environments";

pub struct Environments<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Environments<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn get(&self) -> Outcome {
        self.client.send(Request::get(ENVIRONMENTS))
    }

    pub fn settings(&self, environment_id: u64) -> Outcome {
        let path = format!("{ENVIRONMENTS}/{environment_id}/settings");
        self.client.send(Request::get(path))
    }

    pub fn deployments(&self, environment_id: u64) -> Outcome {
        let path = format!("{ENVIRONMENTS}/{environment_id}/deployments");
        self.client.send(Request::get(path))
    }

    /// Create an environment from its `name`, `provider` and `settings`.
    pub fn add<E: Serialize + ?Sized>(&self, environment: &E) -> Outcome {
        self.client.send(Request::post(ENVIRONMENTS).json(environment)?)
    }

    /// Replace an environment; `deploymentEnvironmentId` identifies it.
    pub fn update<E: Serialize + ?Sized>(&self, environment: &E) -> Outcome {
        self.client.send(Request::put(ENVIRONMENTS).json(environment)?)
    }

    pub fn delete(&self, environment_id: u64) -> Outcome {
        self.client.send(Request::delete(collection_path(ENVIRONMENTS, Some(environment_id))))
    }
}
