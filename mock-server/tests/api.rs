use axum::{
    http::{self, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use mock_server::{
    app,
    model::{Build, Deployment, Environment, Project, Role, User},
};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "test-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

async fn send(app: &Router, request: Request<String>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn create_project(app: &Router) -> Project {
    let resp = send(
        app,
        json_request(
            "POST",
            "/api/projects",
            r#"{"repositoryProvider":"gitHub","repositoryName":"acme/demo-app"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

async fn start_build(app: &Router, body: &str) -> Response {
    send(app, json_request("POST", "/api/builds", body)).await
}

// --- auth ---

#[tokio::test]
async fn missing_token_returns_401_with_empty_body() {
    let resp = app(TOKEN)
        .oneshot(
            Request::builder()
                .uri("/api/roles")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn wrong_token_returns_401() {
    let resp = app(TOKEN)
        .oneshot(
            Request::builder()
                .uri("/api/projects")
                .header(http::header::AUTHORIZATION, "Bearer wrong")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- roles ---

#[tokio::test]
async fn system_roles_are_seeded() {
    let resp = app(TOKEN).oneshot(request("GET", "/api/roles")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let roles: Vec<Role> = body_json(resp).await;
    assert_eq!(roles.len(), 2);
    assert!(roles.iter().all(|r| r.is_system));
}

#[tokio::test]
async fn system_role_cannot_be_deleted() {
    let resp = app(TOKEN)
        .oneshot(request("DELETE", "/api/roles/4"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "System roles cannot be deleted");
}

#[tokio::test]
async fn unknown_role_returns_404_with_empty_body() {
    let resp = app(TOKEN)
        .oneshot(request("GET", "/api/roles/999"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn role_missing_name_returns_422() {
    let resp = app(TOKEN)
        .oneshot(json_request("POST", "/api/roles", r#"{"title":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- users ---

#[tokio::test]
async fn user_password_mismatch_returns_400() {
    let resp = app(TOKEN)
        .oneshot(json_request(
            "POST",
            "/api/users",
            r#"{"fullName":"Jane","email":"jane@example.com","roleId":4,
                "generatePassword":false,"password":"a","confirmPassword":"b"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_with_unknown_role_returns_400() {
    let resp = app(TOKEN)
        .oneshot(json_request(
            "POST",
            "/api/users",
            r#"{"fullName":"Jane","email":"jane@example.com","roleId":77,"generatePassword":true}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_lifecycle() {
    let app = app(TOKEN);

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            r#"{"fullName":"Jane","email":"jane@example.com","roleId":5,"generatePassword":true}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.full_name, "Jane");

    let update = format!(
        r#"{{"userId":{},"fullName":"Jane Doe","email":"jane@example.com","roleId":4}}"#,
        user.user_id
    );
    let resp = send(&app, json_request("PUT", "/api/users", &update)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, request("GET", &format!("/api/users/{}", user.user_id))).await;
    let fetched: User = body_json(resp).await;
    assert_eq!(fetched.full_name, "Jane Doe");
    assert_eq!(fetched.role_id, 4);

    let resp = send(&app, request("DELETE", &format!("/api/users/{}", user.user_id))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(&app, request("GET", &format!("/api/users/{}", user.user_id))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- projects and builds ---

#[tokio::test]
async fn unknown_provider_returns_400() {
    let resp = app(TOKEN)
        .oneshot(json_request(
            "POST",
            "/api/projects",
            r#"{"repositoryProvider":"svn","repositoryName":"acme/x"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn build_with_two_targets_returns_400() {
    let app = app(TOKEN);
    create_project(&app).await;

    let resp = start_build(
        &app,
        r#"{"accountName":"acme","projectSlug":"demo-app","branch":"main","pullRequestId":3}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn build_lifecycle() {
    let app = app(TOKEN);
    let project = create_project(&app).await;
    assert_eq!(project.slug, "demo-app");
    assert_eq!(project.account_name, "acme");

    let resp = start_build(
        &app,
        r#"{"accountName":"acme","projectSlug":"demo-app","branch":"main"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let first: Build = body_json(resp).await;
    assert_eq!(first.version, "1.0.1");

    let resp = start_build(
        &app,
        r#"{"accountName":"acme","projectSlug":"demo-app","commitId":"3e9d9468"}"#,
    )
    .await;
    let second: Build = body_json(resp).await;
    assert_eq!(second.version, "1.0.2");

    // last build
    let resp = send(&app, request("GET", "/api/projects/acme/demo-app")).await;
    let last: Value = body_json(resp).await;
    assert_eq!(last["build"]["version"], "1.0.2");
    assert_eq!(last["project"]["slug"], "demo-app");

    // last build of a branch
    let resp = send(&app, request("GET", "/api/projects/acme/demo-app/branch/main")).await;
    let last: Value = body_json(resp).await;
    assert_eq!(last["build"]["version"], "1.0.1");

    // history, newest first
    let resp = send(
        &app,
        request("GET", "/api/projects/acme/demo-app/history?recordsNumber=1"),
    )
    .await;
    let history: Value = body_json(resp).await;
    assert_eq!(history["builds"].as_array().unwrap().len(), 1);
    assert_eq!(history["builds"][0]["version"], "1.0.2");

    // log
    let job_id = &first.jobs[0].job_id;
    let resp = send(&app, request("GET", &format!("/api/buildjobs/{job_id}/log"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let log = body_bytes(resp).await;
    assert!(String::from_utf8_lossy(&log).contains("1.0.1"));

    // cancel
    let resp = send(&app, request("DELETE", "/api/builds/acme/demo-app/1.0.2")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&app, request("GET", "/api/projects/acme/demo-app/build/1.0.2")).await;
    let cancelled: Value = body_json(resp).await;
    assert_eq!(cancelled["build"]["status"], "cancelled");
}

#[tokio::test]
async fn project_settings_round_trip() {
    let app = app(TOKEN);
    create_project(&app).await;

    let resp = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri("/api/projects/acme/demo-app/settings/yaml")
            .header(http::header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .header(http::header::CONTENT_TYPE, "text/plain")
            .body("version: 2.0.{build}\n".to_string())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, request("GET", "/api/projects/acme/demo-app/settings/yaml")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "text/plain"
    );
    assert_eq!(body_bytes(resp).await.as_ref(), b"version: 2.0.{build}\n");

    let resp = send(
        &app,
        json_request(
            "PUT",
            "/api/projects/acme/demo-app/settings/build-number",
            r#"{"nextBuildNumber":40}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = start_build(
        &app,
        r#"{"accountName":"acme","projectSlug":"demo-app","pullRequestId":12}"#,
    )
    .await;
    let build: Build = body_json(resp).await;
    assert_eq!(build.version, "1.0.40");

    let resp = send(&app, request("DELETE", "/api/projects/acme/demo-app/buildcache")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, request("DELETE", "/api/projects/acme/demo-app")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&app, request("GET", "/api/projects/acme/demo-app")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- environments and deployments ---

#[tokio::test]
async fn deployment_lifecycle() {
    let app = app(TOKEN);
    create_project(&app).await;
    let resp = start_build(
        &app,
        r#"{"accountName":"acme","projectSlug":"demo-app","branch":"main"}"#,
    )
    .await;
    let build: Build = body_json(resp).await;

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/environments",
            r#"{"name":"production","provider":"FTP","settings":{"providerSettings":[]}}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let environment: Environment = body_json(resp).await;
    assert!(!environment.environment_access_key.is_empty());
    let env_id = environment.deployment_environment_id;

    let body = format!(
        r#"{{"environmentName":"production","accountName":"acme","projectSlug":"demo-app",
            "buildVersion":"{}","buildJobId":"{}","environmentVariables":{{"SITE":"blue"}}}}"#,
        build.version, build.jobs[0].job_id
    );
    let resp = send(&app, json_request("POST", "/api/deployments", &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deployment: Deployment = body_json(resp).await;
    assert_eq!(deployment.environment_variables["SITE"], "blue");

    let resp = send(
        &app,
        request("GET", &format!("/api/environments/{env_id}/deployments")),
    )
    .await;
    let listed: Value = body_json(resp).await;
    assert_eq!(listed["deployments"].as_array().unwrap().len(), 1);

    let resp = send(&app, request("GET", "/api/projects/acme/demo-app/deployments")).await;
    let listed: Value = body_json(resp).await;
    assert_eq!(listed["deployments"][0]["deploymentId"], deployment.deployment_id);

    let stop = format!(r#"{{"deploymentId":{}}}"#, deployment.deployment_id);
    let resp = send(&app, json_request("PUT", "/api/deployments/stop", &stop)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(
        &app,
        request("GET", &format!("/api/deployments/{}", deployment.deployment_id)),
    )
    .await;
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched["deployment"]["status"], "cancelled");

    let resp = send(&app, request("DELETE", &format!("/api/environments/{env_id}"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(
        &app,
        request("GET", &format!("/api/environments/{env_id}/settings")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deployment_to_unknown_environment_returns_400() {
    let app = app(TOKEN);
    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/deployments",
            r#"{"environmentName":"nowhere","accountName":"acme","projectSlug":"demo-app","buildVersion":"1.0.1"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
