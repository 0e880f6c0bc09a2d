//! Deployments (`/api/deployments`).

use serde::Serialize;

use crate::client::AppveyorClient;
use crate::dispatch::Outcome;
use crate::http::Transport;
use crate::request::Request;
use crate::resources::collection_path;
use crate::types::StartDeployment;

const DEPLOYMENTS: &str = "/api/deployments";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StopDeployment {
    deployment_id: u64,
}

pub struct Deployments<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Deployments<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn get(&self, deployment_id: u64) -> Outcome {
        self.client.send(Request::get(collection_path(DEPLOYMENTS, Some(deployment_id))))
    }

    pub fn start(&self, deployment: &StartDeployment) -> Outcome {
        self.client.send(Request::post(DEPLOYMENTS).json(deployment)?)
    }

    pub fn cancel(&self, deployment_id: u64) -> Outcome {
        let body = StopDeployment { deployment_id };
        self.client.send(Request::put(format!("{DEPLOYMENTS}/stop")).json(&body)?)
    }
}
