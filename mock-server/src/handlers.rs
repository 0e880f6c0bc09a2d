//! Route handlers, one per Appveyor endpoint.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::{
    random_key, slugify, Build, Collaborator, Deployment, Environment, Job, Project, Role, User,
    ACCOUNT_NAME, DEFAULT_SETTINGS_YAML, REPOSITORY_PROVIDERS,
};
use crate::{ApiError, ApiResult, Db};

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct NewRole {
    pub name: String,
}

pub async fn list_roles(State(db): State<Db>) -> Json<Vec<Role>> {
    let store = db.read().await;
    Json(store.roles.values().cloned().collect())
}

pub async fn get_role(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<Role>> {
    let store = db.read().await;
    store.roles.get(&id).cloned().map(Json).ok_or(ApiError::NotFound)
}

pub async fn add_role(State(db): State<Db>, Json(input): Json<NewRole>) -> ApiResult<Json<Role>> {
    if input.name.trim().is_empty() {
        return Err(ApiError::bad_request("Role name is required"));
    }
    let mut store = db.write().await;
    if store.roles.values().any(|r| r.name.eq_ignore_ascii_case(&input.name)) {
        return Err(ApiError::bad_request(format!("Role '{}' already exists", input.name)));
    }
    let role = Role {
        role_id: store.next_id(),
        name: input.name,
        is_system: false,
        groups: Vec::new(),
    };
    store.roles.insert(role.role_id, role.clone());
    Ok(Json(role))
}

pub async fn update_role(State(db): State<Db>, Json(input): Json<Role>) -> ApiResult<Json<Role>> {
    let mut store = db.write().await;
    let role = store.roles.get_mut(&input.role_id).ok_or(ApiError::NotFound)?;
    if role.is_system {
        return Err(ApiError::bad_request("System roles cannot be modified"));
    }
    role.name = input.name;
    role.groups = input.groups;
    Ok(Json(role.clone()))
}

pub async fn delete_role(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let role = store.roles.get(&id).ok_or(ApiError::NotFound)?;
    if role.is_system {
        return Err(ApiError::bad_request("System roles cannot be deleted"));
    }
    store.roles.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub role_id: u64,
    #[serde(default)]
    pub generate_password: bool,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

pub async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let store = db.read().await;
    Json(store.users.values().cloned().collect())
}

pub async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<User>> {
    let store = db.read().await;
    store.users.get(&id).cloned().map(Json).ok_or(ApiError::NotFound)
}

pub async fn add_user(State(db): State<Db>, Json(input): Json<NewUser>) -> ApiResult<Json<User>> {
    if !input.generate_password {
        match (&input.password, &input.confirm_password) {
            (Some(password), Some(confirm)) if !password.is_empty() && password == confirm => {}
            _ => return Err(ApiError::bad_request("Password and confirmation do not match")),
        }
    }
    let mut store = db.write().await;
    if !store.roles.contains_key(&input.role_id) {
        return Err(ApiError::bad_request(format!("Unknown role {}", input.role_id)));
    }
    if store.users.values().any(|u| u.email.eq_ignore_ascii_case(&input.email)) {
        return Err(ApiError::bad_request("User with this email already exists"));
    }
    let user = User {
        user_id: store.next_id(),
        full_name: input.full_name,
        email: input.email,
        role_id: input.role_id,
    };
    store.users.insert(user.user_id, user.clone());
    Ok(Json(user))
}

pub async fn update_user(State(db): State<Db>, Json(input): Json<User>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    if !store.roles.contains_key(&input.role_id) {
        return Err(ApiError::bad_request(format!("Unknown role {}", input.role_id)));
    }
    let user = store.users.get_mut(&input.user_id).ok_or(ApiError::NotFound)?;
    *user = input;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .users
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApiError::NotFound)
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollaborator {
    pub email: String,
    pub role_id: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorRole {
    pub user_id: u64,
    pub role_id: u64,
}

pub async fn list_collaborators(State(db): State<Db>) -> Json<Vec<Collaborator>> {
    let store = db.read().await;
    Json(store.collaborators.values().cloned().collect())
}

pub async fn get_collaborator(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Collaborator>> {
    let store = db.read().await;
    store.collaborators.get(&id).cloned().map(Json).ok_or(ApiError::NotFound)
}

pub async fn add_collaborator(
    State(db): State<Db>,
    Json(input): Json<NewCollaborator>,
) -> ApiResult<Json<Collaborator>> {
    let mut store = db.write().await;
    if !store.roles.contains_key(&input.role_id) {
        return Err(ApiError::bad_request(format!("Unknown role {}", input.role_id)));
    }
    let collaborator = Collaborator {
        user_id: store.next_id(),
        email: input.email,
        role_id: input.role_id,
    };
    store.collaborators.insert(collaborator.user_id, collaborator.clone());
    Ok(Json(collaborator))
}

pub async fn update_collaborator(
    State(db): State<Db>,
    Json(input): Json<CollaboratorRole>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    if !store.roles.contains_key(&input.role_id) {
        return Err(ApiError::bad_request(format!("Unknown role {}", input.role_id)));
    }
    let collaborator = store
        .collaborators
        .get_mut(&input.user_id)
        .ok_or(ApiError::NotFound)?;
    collaborator.role_id = input.role_id;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_collaborator(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .collaborators
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApiError::NotFound)
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub repository_provider: String,
    pub repository_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub project_id: u64,
    pub name: Option<String>,
    pub repository_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    #[serde(default = "default_records_number")]
    pub records_number: usize,
    pub start_build_id: Option<u64>,
    pub branch: Option<String>,
}

fn default_records_number() -> usize {
    50
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildNumber {
    pub next_build_number: u64,
}

pub async fn list_projects(State(db): State<Db>) -> Json<Vec<Project>> {
    let store = db.read().await;
    Json(store.projects.clone())
}

pub async fn add_project(
    State(db): State<Db>,
    Json(input): Json<NewProject>,
) -> ApiResult<Json<Project>> {
    if !REPOSITORY_PROVIDERS.contains(&input.repository_provider.as_str()) {
        return Err(ApiError::bad_request(format!(
            "Unknown repository provider '{}'",
            input.repository_provider
        )));
    }
    let slug = slugify(&input.repository_name);
    if slug.is_empty() {
        return Err(ApiError::bad_request("Repository name is required"));
    }
    let mut store = db.write().await;
    if store.project(ACCOUNT_NAME, &slug).is_some() {
        return Err(ApiError::bad_request(format!("Project '{slug}' already exists")));
    }
    let project = Project {
        project_id: store.next_id(),
        account_name: ACCOUNT_NAME.to_string(),
        name: slug.clone(),
        slug,
        repository_type: input.repository_provider,
        repository_name: input.repository_name,
        next_build_number: 1,
        settings_yaml: DEFAULT_SETTINGS_YAML.to_string(),
        builds: Vec::new(),
    };
    store.projects.push(project.clone());
    Ok(Json(project))
}

pub async fn update_project(
    State(db): State<Db>,
    Json(input): Json<ProjectUpdate>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let project = store
        .projects
        .iter_mut()
        .find(|p| p.project_id == input.project_id)
        .ok_or(ApiError::NotFound)?;
    if let Some(name) = input.name {
        project.name = name;
    }
    if let Some(repository_name) = input.repository_name {
        project.repository_name = repository_name;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_project(
    State(db): State<Db>,
    Path((account, slug)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let before = store.projects.len();
    store
        .projects
        .retain(|p| !(p.account_name == account && p.slug == slug));
    if store.projects.len() == before {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn last_build(
    State(db): State<Db>,
    Path((account, slug)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let project = store.project(&account, &slug).ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "project": project, "build": project.builds.last() })))
}

pub async fn last_branch_build(
    State(db): State<Db>,
    Path((account, slug, branch)): Path<(String, String, String)>,
) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let project = store.project(&account, &slug).ok_or(ApiError::NotFound)?;
    let build = project
        .builds
        .iter()
        .rev()
        .find(|b| b.branch.as_deref() == Some(branch.as_str()))
        .ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "project": project, "build": build })))
}

pub async fn build_by_version(
    State(db): State<Db>,
    Path((account, slug, version)): Path<(String, String, String)>,
) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let project = store.project(&account, &slug).ok_or(ApiError::NotFound)?;
    let build = project
        .builds
        .iter()
        .find(|b| b.version == version)
        .ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "project": project, "build": build })))
}

pub async fn history(
    State(db): State<Db>,
    Path((account, slug)): Path<(String, String)>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let project = store.project(&account, &slug).ok_or(ApiError::NotFound)?;
    let builds: Vec<&Build> = project
        .builds
        .iter()
        .rev()
        .filter(|b| params.start_build_id.is_none_or(|start| b.build_id < start))
        .filter(|b| params.branch.is_none() || b.branch == params.branch)
        .take(params.records_number)
        .collect();
    Ok(Json(json!({ "project": project, "builds": builds })))
}

pub async fn project_deployments(
    State(db): State<Db>,
    Path((account, slug)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let project = store.project(&account, &slug).ok_or(ApiError::NotFound)?;
    let deployments: Vec<&Deployment> = store
        .deployments
        .values()
        .filter(|d| d.account_name == account && d.project_slug == slug)
        .collect();
    Ok(Json(json!({ "project": project, "deployments": deployments })))
}

pub async fn get_settings_yaml(
    State(db): State<Db>,
    Path((account, slug)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let store = db.read().await;
    let project = store.project(&account, &slug).ok_or(ApiError::NotFound)?;
    Ok(([(header::CONTENT_TYPE, "text/plain")], project.settings_yaml.clone()))
}

pub async fn put_settings_yaml(
    State(db): State<Db>,
    Path((account, slug)): Path<(String, String)>,
    yaml: String,
) -> ApiResult<StatusCode> {
    if yaml.trim().is_empty() {
        return Err(ApiError::bad_request("Settings YAML is empty"));
    }
    let mut store = db.write().await;
    let project = store.project_mut(&account, &slug).ok_or(ApiError::NotFound)?;
    project.settings_yaml = yaml;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_build_number(
    State(db): State<Db>,
    Path((account, slug)): Path<(String, String)>,
    Json(input): Json<BuildNumber>,
) -> ApiResult<StatusCode> {
    if input.next_build_number == 0 {
        return Err(ApiError::bad_request("Build number must be positive"));
    }
    let mut store = db.write().await;
    let project = store.project_mut(&account, &slug).ok_or(ApiError::NotFound)?;
    project.next_build_number = input.next_build_number;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_build_cache(
    State(db): State<Db>,
    Path((account, slug)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let store = db.read().await;
    store.project(&account, &slug).ok_or(ApiError::NotFound)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Builds
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBuild {
    pub account_name: String,
    pub project_slug: String,
    pub branch: Option<String>,
    pub commit_id: Option<String>,
    pub pull_request_id: Option<u64>,
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
}

pub async fn start_build(
    State(db): State<Db>,
    Json(input): Json<StartBuild>,
) -> ApiResult<Json<Build>> {
    let targets = [
        input.branch.is_some(),
        input.commit_id.is_some(),
        input.pull_request_id.is_some(),
    ];
    if targets.iter().filter(|set| **set).count() != 1 {
        return Err(ApiError::bad_request(
            "Specify one of branch, commitId or pullRequestId",
        ));
    }
    let mut store = db.write().await;
    store
        .project(&input.account_name, &input.project_slug)
        .ok_or(ApiError::NotFound)?;
    let build_id = store.next_id();
    let project = store
        .project_mut(&input.account_name, &input.project_slug)
        .ok_or(ApiError::NotFound)?;
    let build_number = project.next_build_number;
    project.next_build_number += 1;
    let build = Build {
        build_id,
        build_number,
        version: format!("1.0.{build_number}"),
        branch: input.branch,
        commit_id: input.commit_id,
        pull_request_id: input.pull_request_id,
        status: "queued".to_string(),
        jobs: vec![Job {
            job_id: random_key(),
            name: "Environment: default".to_string(),
            status: "queued".to_string(),
        }],
        environment_variables: input.environment_variables,
    };
    project.builds.push(build.clone());
    Ok(Json(build))
}

pub async fn cancel_build(
    State(db): State<Db>,
    Path((account, slug, version)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let project = store.project_mut(&account, &slug).ok_or(ApiError::NotFound)?;
    let build = project
        .builds
        .iter_mut()
        .find(|b| b.version == version)
        .ok_or(ApiError::NotFound)?;
    build.status = "cancelled".to_string();
    for job in &mut build.jobs {
        job.status = "cancelled".to_string();
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn build_log(
    State(db): State<Db>,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let store = db.read().await;
    let (build, job) = store.job(&job_id).ok_or(ApiError::NotFound)?;
    let log = format!(
        "Build {} started\n{}: {}\n",
        build.version, job.name, job.status
    );
    Ok(([(header::CONTENT_TYPE, "text/plain")], log))
}

// ---------------------------------------------------------------------------
// Environments
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct NewEnvironment {
    pub name: String,
    pub provider: String,
    #[serde(default)]
    pub settings: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentUpdate {
    pub deployment_environment_id: u64,
    pub name: String,
    pub provider: Option<String>,
    #[serde(default)]
    pub settings: Value,
}

pub async fn list_environments(State(db): State<Db>) -> Json<Vec<Environment>> {
    let store = db.read().await;
    Json(store.environments.values().cloned().collect())
}

pub async fn add_environment(
    State(db): State<Db>,
    Json(input): Json<NewEnvironment>,
) -> ApiResult<Json<Environment>> {
    let mut store = db.write().await;
    if store.environments.values().any(|e| e.name == input.name) {
        return Err(ApiError::bad_request(format!(
            "Environment '{}' already exists",
            input.name
        )));
    }
    let environment = Environment {
        deployment_environment_id: store.next_id(),
        name: input.name,
        provider: input.provider,
        environment_access_key: random_key(),
        settings: input.settings,
    };
    store
        .environments
        .insert(environment.deployment_environment_id, environment.clone());
    Ok(Json(environment))
}

pub async fn update_environment(
    State(db): State<Db>,
    Json(input): Json<EnvironmentUpdate>,
) -> ApiResult<Json<Environment>> {
    let mut store = db.write().await;
    let environment = store
        .environments
        .get_mut(&input.deployment_environment_id)
        .ok_or(ApiError::NotFound)?;
    environment.name = input.name;
    if let Some(provider) = input.provider {
        environment.provider = provider;
    }
    environment.settings = input.settings;
    Ok(Json(environment.clone()))
}

pub async fn delete_environment(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .environments
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApiError::NotFound)
}

pub async fn environment_settings(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let environment = store.environments.get(&id).ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "environment": environment })))
}

pub async fn environment_deployments(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let environment = store.environments.get(&id).ok_or(ApiError::NotFound)?;
    let deployments: Vec<&Deployment> = store
        .deployments
        .values()
        .filter(|d| d.environment_name == environment.name)
        .collect();
    Ok(Json(json!({ "environment": environment, "deployments": deployments })))
}

// ---------------------------------------------------------------------------
// Deployments
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDeployment {
    pub environment_name: String,
    pub account_name: String,
    pub project_slug: String,
    pub build_version: String,
    pub build_job_id: Option<String>,
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDeployment {
    pub deployment_id: u64,
}

pub async fn start_deployment(
    State(db): State<Db>,
    Json(input): Json<StartDeployment>,
) -> ApiResult<Json<Deployment>> {
    let mut store = db.write().await;
    if !store
        .environments
        .values()
        .any(|e| e.name == input.environment_name)
    {
        return Err(ApiError::bad_request(format!(
            "Environment '{}' not found",
            input.environment_name
        )));
    }
    let project = store
        .project(&input.account_name, &input.project_slug)
        .ok_or(ApiError::NotFound)?;
    let build = project
        .builds
        .iter()
        .find(|b| b.version == input.build_version)
        .ok_or(ApiError::NotFound)?;
    if let Some(job_id) = &input.build_job_id {
        if !build.jobs.iter().any(|j| &j.job_id == job_id) {
            return Err(ApiError::bad_request(format!(
                "Job '{job_id}' is not part of build {}",
                build.version
            )));
        }
    }
    let deployment = Deployment {
        deployment_id: store.next_id(),
        account_name: input.account_name,
        project_slug: input.project_slug,
        environment_name: input.environment_name,
        build_version: input.build_version,
        build_job_id: input.build_job_id,
        environment_variables: input.environment_variables,
        status: "queued".to_string(),
    };
    store
        .deployments
        .insert(deployment.deployment_id, deployment.clone());
    Ok(Json(deployment))
}

pub async fn get_deployment(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let deployment = store.deployments.get(&id).ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "deployment": deployment })))
}

pub async fn stop_deployment(
    State(db): State<Db>,
    Json(input): Json<StopDeployment>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let deployment = store
        .deployments
        .get_mut(&input.deployment_id)
        .ok_or(ApiError::NotFound)?;
    deployment.status = "cancelled".to_string();
    Ok(StatusCode::NO_CONTENT)
}
