//! Collaborators (`/api/collaborators`): users from other accounts with a
//! role on this one.

use serde::Serialize;

use crate::client::AppveyorClient;
use crate::dispatch::Outcome;
use crate::http::Transport;
use crate::request::Request;
use crate::resources::collection_path;

const COLLABORATORS: &str = "/api/collaborators";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCollaborator<'a> {
    email: &'a str,
    role_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollaboratorRole {
    user_id: u64,
    role_id: u64,
}

pub struct Collaborators<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Collaborators<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn get(&self, user_id: Option<u64>) -> Outcome {
        self.client.send(Request::get(collection_path(COLLABORATORS, user_id)))
    }

    pub fn add(&self, email: &str, role_id: u64) -> Outcome {
        let body = NewCollaborator { email, role_id };
        self.client.send(Request::post(COLLABORATORS).json(&body)?)
    }

    /// Change the role of an existing collaborator.
    pub fn update(&self, user_id: u64, role_id: u64) -> Outcome {
        let body = CollaboratorRole { user_id, role_id };
        self.client.send(Request::put(COLLABORATORS).json(&body)?)
    }

    pub fn delete(&self, user_id: u64) -> Outcome {
        self.client.send(Request::delete(collection_path(COLLABORATORS, Some(user_id))))
    }
}
