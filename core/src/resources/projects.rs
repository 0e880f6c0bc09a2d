//! Projects (`/api/projects`): builds, history, settings and lifecycle.

use serde::Serialize;

use crate::client::AppveyorClient;
use crate::dispatch::Outcome;
use crate::http::Transport;
use crate::request::{encode, Request, TEXT_CONTENT_TYPE};
use crate::types::{HistoryQuery, RepositoryProvider};

const PROJECTS: &str = "/api/projects";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewProject<'a> {
    repository_provider: RepositoryProvider,
    repository_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildNumber {
    next_build_number: u64,
}

fn project_path(account_name: &str, project_slug: &str) -> String {
    format!("{PROJECTS}/{}/{}", encode(account_name), encode(project_slug))
}

pub struct Projects<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Projects<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn get(&self) -> Outcome {
        self.client.send(Request::get(PROJECTS))
    }

    pub fn last_build(&self, account_name: &str, project_slug: &str) -> Outcome {
        self.client.send(Request::get(project_path(account_name, project_slug)))
    }

    pub fn last_branch_build(
        &self,
        account_name: &str,
        project_slug: &str,
        branch: &str,
    ) -> Outcome {
        let path = format!(
            "{}/branch/{}",
            project_path(account_name, project_slug),
            encode(branch)
        );
        self.client.send(Request::get(path))
    }

    pub fn build(&self, account_name: &str, project_slug: &str, build_version: &str) -> Outcome {
        let path = format!(
            "{}/build/{}",
            project_path(account_name, project_slug),
            encode(build_version)
        );
        self.client.send(Request::get(path))
    }

    pub fn history(&self, account_name: &str, project_slug: &str, query: &HistoryQuery) -> Outcome {
        let mut path = format!(
            "{}/history?recordsNumber={}",
            project_path(account_name, project_slug),
            query.records_number
        );
        if let Some(start_build_id) = query.start_build_id {
            path.push_str(&format!("&startBuildId={start_build_id}"));
        }
        if let Some(branch) = &query.branch {
            path.push_str(&format!("&branch={}", encode(branch)));
        }
        self.client.send(Request::get(path))
    }

    pub fn deployments(&self, account_name: &str, project_slug: &str) -> Outcome {
        let path = format!("{}/deployments", project_path(account_name, project_slug));
        self.client.send(Request::get(path))
    }

    /// Project settings as `appveyor.yml` text.
    pub fn settings(&self, account_name: &str, project_slug: &str) -> Outcome {
        let path = format!("{}/settings/yaml", project_path(account_name, project_slug));
        self.client.send(Request::get(path).text_response())
    }

    /// `repository_provider` must be one of the `RepositoryProvider` wire
    /// names; anything else is rejected before sending.
    pub fn add(&self, repository_provider: &str, repository_name: &str) -> Outcome {
        let body = NewProject {
            repository_provider: repository_provider.parse()?,
            repository_name,
        };
        self.client.send(Request::post(PROJECTS).json(&body)?)
    }

    /// Replace the full project settings object.
    pub fn update<P: Serialize + ?Sized>(&self, project: &P) -> Outcome {
        self.client.send(Request::put(PROJECTS).json(project)?)
    }

    pub fn update_settings(&self, account_name: &str, project_slug: &str, yaml: &str) -> Outcome {
        let path = format!("{}/settings/yaml", project_path(account_name, project_slug));
        self.client.send(Request::put(path).raw(TEXT_CONTENT_TYPE, yaml))
    }

    pub fn update_build_number(
        &self,
        account_name: &str,
        project_slug: &str,
        next_build_number: u64,
    ) -> Outcome {
        let path = format!("{}/settings/build-number", project_path(account_name, project_slug));
        let body = BuildNumber { next_build_number };
        self.client.send(Request::put(path).json(&body)?)
    }

    pub fn delete_build_cache(&self, account_name: &str, project_slug: &str) -> Outcome {
        let path = format!("{}/buildcache", project_path(account_name, project_slug));
        self.client.send(Request::delete(path))
    }

    pub fn delete(&self, account_name: &str, project_slug: &str) -> Outcome {
        self.client.send(Request::delete(project_path(account_name, project_slug)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{body_json, client_with};
    use crate::{AppveyorError, HttpMethod};
    use serde_json::{json, Value};

    const BASE: &str = "https://ci.appveyor.com";

    #[test]
    fn read_endpoints_build_expected_urls() {
        let client = client_with(vec![(200, "[]"); 6]);
        let projects = client.projects();

        projects.get().unwrap();
        assert_eq!(client.transport().last().url, format!("{BASE}/api/projects"));

        projects.last_build("acme", "demo-app").unwrap();
        assert_eq!(client.transport().last().url, format!("{BASE}/api/projects/acme/demo-app"));

        projects.last_branch_build("acme", "demo-app", "feature/login").unwrap();
        assert_eq!(
            client.transport().last().url,
            format!("{BASE}/api/projects/acme/demo-app/branch/feature%2Flogin")
        );

        projects.build("acme", "demo-app", "1.0.15").unwrap();
        assert_eq!(
            client.transport().last().url,
            format!("{BASE}/api/projects/acme/demo-app/build/1.0.15")
        );

        projects.deployments("acme", "demo-app").unwrap();
        assert_eq!(
            client.transport().last().url,
            format!("{BASE}/api/projects/acme/demo-app/deployments")
        );
    }

    #[test]
    fn history_query_parameters() {
        let client = client_with(vec![(200, "[]"), (200, "{}"), (200, "{}")]);

        client
            .projects()
            .history("acme", "demo-app", &HistoryQuery::default())
            .unwrap();
        assert_eq!(
            client.transport().last().url,
            format!("{BASE}/api/projects/acme/demo-app/history?recordsNumber=50")
        );

        let query = HistoryQuery {
            records_number: 10,
            start_build_id: Some(1200),
            branch: Some("release/2.x".to_string()),
        };
        client.projects().history("acme", "demo-app", &query).unwrap();
        let expected = "/api/projects/acme/demo-app/history\
                        ?recordsNumber=10&startBuildId=1200&branch=release%2F2.x";
        assert_eq!(client.transport().last().url, format!("{BASE}{expected}"));
    }

    #[test]
    fn settings_yaml_is_returned_as_text() {
        let client = client_with(vec![(200, "[]"), (200, "version: 1.0.{build}\n")]);
        let yaml = client.projects().settings("acme", "demo-app").unwrap();
        assert_eq!(yaml, Some(Value::String("version: 1.0.{build}\n".to_string())));
        assert_eq!(
            client.transport().last().url,
            format!("{BASE}/api/projects/acme/demo-app/settings/yaml")
        );
    }

    #[test]
    fn add_accepts_known_provider() {
        let client = client_with(vec![(200, "[]"), (200, r#"{"projectId":1}"#)]);
        client.projects().add("gitHub", "acme/demo-app").unwrap();
        let req = client.transport().last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            body_json(&req),
            json!({"repositoryProvider": "gitHub", "repositoryName": "acme/demo-app"})
        );
    }

    #[test]
    fn add_rejects_unknown_provider_before_sending() {
        let client = client_with(vec![(200, "[]")]);
        let err = client.projects().add("svn", "acme/demo-app").unwrap_err();
        match err {
            AppveyorError::Usage(message) => {
                assert!(message.contains("subversion"));
                assert!(message.contains("gitHub"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[test]
    fn write_endpoints() {
        let client = client_with(vec![
            (200, "[]"),
            (204, ""),
            (204, ""),
            (204, ""),
            (204, ""),
            (204, ""),
        ]);
        let projects = client.projects();

        projects.update(&json!({"projectId": 1, "name": "demo-app"})).unwrap();
        let req = client.transport().last();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, format!("{BASE}/api/projects"));

        projects.update_settings("acme", "demo-app", "version: 2.0.{build}\n").unwrap();
        let req = client.transport().last();
        assert_eq!(req.url, format!("{BASE}/api/projects/acme/demo-app/settings/yaml"));
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.body.as_deref(), Some("version: 2.0.{build}\n"));

        projects.update_build_number("acme", "demo-app", 42).unwrap();
        let req = client.transport().last();
        assert_eq!(req.url, format!("{BASE}/api/projects/acme/demo-app/settings/build-number"));
        assert_eq!(body_json(&req), json!({"nextBuildNumber": 42}));

        projects.delete_build_cache("acme", "demo-app").unwrap();
        let req = client.transport().last();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, format!("{BASE}/api/projects/acme/demo-app/buildcache"));

        projects.delete("acme", "demo-app").unwrap();
        let req = client.transport().last();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, format!("{BASE}/api/projects/acme/demo-app"));
    }
}
