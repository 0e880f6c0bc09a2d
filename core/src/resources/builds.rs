//! Builds (`/api/builds`, `/api/buildjobs`).

use serde::Serialize;

use crate::client::AppveyorClient;
use crate::dispatch::Outcome;
use crate::error::AppveyorError;
use crate::http::Transport;
use crate::request::{encode, Request};
use crate::types::{BuildOptions, EnvironmentVariables};

const BUILDS: &str = "/api/builds";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartBuild<'a> {
    account_name: &'a str,
    project_slug: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pull_request_id: Option<u64>,
    #[serde(skip_serializing_if = "no_variables")]
    environment_variables: &'a EnvironmentVariables,
}

fn no_variables(variables: &&EnvironmentVariables) -> bool {
    variables.is_empty()
}

pub struct Builds<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Builds<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    /// Start a build of a branch, a commit or a GitHub pull request.
    ///
    /// Exactly one of `branch`, `commit_id` and `pull_request_id` must be
    /// set; otherwise a usage error is returned and nothing is sent.
    /// An empty branch or commit id counts as unset.
    pub fn start(&self, account_name: &str, project_slug: &str, options: &BuildOptions) -> Outcome {
        let branch = options.branch.as_deref().filter(|b| !b.is_empty());
        let commit_id = options.commit_id.as_deref().filter(|c| !c.is_empty());
        let targets = [
            branch.is_some(),
            commit_id.is_some(),
            options.pull_request_id.is_some(),
        ];
        if targets.iter().filter(|set| **set).count() != 1 {
            return Err(AppveyorError::usage(
                "provide exactly one of branch, commit id or pull request id",
            ));
        }
        let body = StartBuild {
            account_name,
            project_slug,
            branch,
            commit_id,
            pull_request_id: options.pull_request_id,
            environment_variables: &options.environment_variables,
        };
        self.client.send(Request::post(BUILDS).json(&body)?)
    }

    pub fn cancel(&self, account_name: &str, project_slug: &str, build_version: &str) -> Outcome {
        let path = format!(
            "{BUILDS}/{}/{}/{}",
            encode(account_name),
            encode(project_slug),
            encode(build_version)
        );
        self.client.send(Request::delete(path))
    }

    /// Plain-text log of one build job.
    pub fn log(&self, job_id: &str) -> Outcome {
        let path = format!("/api/buildjobs/{}/log", encode(job_id));
        self.client.send(Request::get(path).text_response())
    }
}
