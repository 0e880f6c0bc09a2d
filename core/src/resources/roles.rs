//! Roles and their permission tree (`/api/roles`).

use serde::Serialize;

use crate::client::AppveyorClient;
use crate::dispatch::Outcome;
use crate::http::Transport;
use crate::request::Request;
use crate::resources::collection_path;

const ROLES: &str = "/api/roles";

#[derive(Serialize)]
struct NewRole<'a> {
    name: &'a str,
}

pub struct Roles<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Roles<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn get(&self, role_id: Option<u64>) -> Outcome {
        self.client.send(Request::get(collection_path(ROLES, role_id)))
    }

    pub fn add(&self, name: &str) -> Outcome {
        self.client.send(Request::post(ROLES).json(&NewRole { name })?)
    }

    /// Replace a role, including its `groups[].permissions[].allowed` flags.
    pub fn update<R: Serialize + ?Sized>(&self, role: &R) -> Outcome {
        self.client.send(Request::put(ROLES).json(role)?)
    }

    pub fn delete(&self, role_id: u64) -> Outcome {
        self.client.send(Request::delete(collection_path(ROLES, Some(role_id))))
    }
}
