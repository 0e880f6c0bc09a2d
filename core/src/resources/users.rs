//! Account users (`/api/users`).

use serde::Serialize;

use crate::client::AppveyorClient;
use crate::dispatch::Outcome;
use crate::error::AppveyorError;
use crate::http::Transport;
use crate::request::Request;
use crate::resources::collection_path;
use crate::types::NewUser;

const USERS: &str = "/api/users";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddUserBody<'a> {
    full_name: &'a str,
    email: &'a str,
    role_id: u64,
    generate_password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirm_password: Option<&'a str>,
}

pub struct Users<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Users<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    /// All users, or one when `user_id` is given.
    pub fn get(&self, user_id: Option<u64>) -> Outcome {
        self.client.send(Request::get(collection_path(USERS, user_id)))
    }

    /// Fails with a usage error when no password (or an empty one) is given
    /// and generation was not requested.
    pub fn add(&self, user: &NewUser) -> Outcome {
        let given = user.password.as_deref().filter(|p| !p.is_empty());
        let password = match (given, user.generate_password) {
            (_, true) => None,
            (Some(password), false) => Some(password),
            (None, false) => {
                return Err(AppveyorError::usage(
                    "a password is required unless generate_password is set",
                ))
            }
        };
        let body = AddUserBody {
            full_name: &user.full_name,
            email: &user.email,
            role_id: user.role_id,
            generate_password: user.generate_password,
            password,
            confirm_password: password,
        };
        self.client.send(Request::post(USERS).json(&body)?)
    }

    /// Replace a user record (`userId` identifies it).
    pub fn update<U: Serialize + ?Sized>(&self, user: &U) -> Outcome {
        self.client.send(Request::put(USERS).json(user)?)
    }

    pub fn delete(&self, user_id: u64) -> Outcome {
        self.client.send(Request::delete(collection_path(USERS, Some(user_id))))
    }
}
