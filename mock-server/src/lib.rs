//! In-memory stand-in for the Appveyor REST API.
//!
//! Every route requires `Authorization: Bearer <token>`; anything else is
//! answered with 401 and an empty body. Unknown ids give 404 with an empty
//! body and invalid payloads give 400 with a JSON `message`.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

mod handlers;
pub mod model;

use handlers::*;
pub use model::Store;

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub token: Arc<str>,
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn app(token: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        token: Arc::from(token),
    };
    Router::new()
        .route("/api/roles", get(list_roles).post(add_role).put(update_role))
        .route("/api/roles/{id}", get(get_role).delete(delete_role))
        .route("/api/users", get(list_users).post(add_user).put(update_user))
        .route("/api/users/{id}", get(get_user).delete(delete_user))
        .route(
            "/api/collaborators",
            get(list_collaborators)
                .post(add_collaborator)
                .put(update_collaborator),
        )
        .route(
            "/api/collaborators/{id}",
            get(get_collaborator).delete(delete_collaborator),
        )
        .route(
            "/api/projects",
            get(list_projects).post(add_project).put(update_project),
        )
        .route(
            "/api/projects/{account}/{slug}",
            get(last_build).delete(delete_project),
        )
        .route(
            "/api/projects/{account}/{slug}/branch/{branch}",
            get(last_branch_build),
        )
        .route(
            "/api/projects/{account}/{slug}/build/{version}",
            get(build_by_version),
        )
        .route("/api/projects/{account}/{slug}/history", get(history))
        .route(
            "/api/projects/{account}/{slug}/deployments",
            get(project_deployments),
        )
        .route(
            "/api/projects/{account}/{slug}/settings/yaml",
            get(get_settings_yaml).put(put_settings_yaml),
        )
        .route(
            "/api/projects/{account}/{slug}/settings/build-number",
            put(update_build_number),
        )
        .route(
            "/api/projects/{account}/{slug}/buildcache",
            delete(delete_build_cache),
        )
        .route("/api/builds", post(start_build))
        .route("/api/builds/{account}/{slug}/{version}", delete(cancel_build))
        .route("/api/buildjobs/{job_id}/log", get(build_log))
        .route(
            "/api/environments",
            get(list_environments)
                .post(add_environment)
                .put(update_environment),
        )
        .route("/api/environments/{id}", delete(delete_environment))
        .route(
            "/api/environments/{id}/settings",
            get(environment_settings),
        )
        .route(
            "/api/environments/{id}/deployments",
            get(environment_deployments),
        )
        .route("/api/deployments", post(start_deployment))
        .route("/api/deployments/stop", put(stop_deployment))
        .route("/api/deployments/{id}", get(get_deployment))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.token);
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    tracing::debug!(method = %request.method(), uri = %request.uri(), "mock request");
    if presented != Some(expected.as_str()) {
        tracing::debug!(uri = %request.uri(), "rejected bearer token");
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}
