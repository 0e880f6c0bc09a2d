//! Caller-facing input types for the resource groups.
//!
//! Responses stay `serde_json::Value`: the Appveyor payloads are large and
//! loosely versioned. Inputs are typed so that contradictory arguments are
//! caught before anything is sent.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppveyorError;

/// Build or deployment environment variables, name to value.
pub type EnvironmentVariables = BTreeMap<String, String>;

/// Input for `Users::add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub role_id: u64,
    pub password: Option<String>,
    pub generate_password: bool,
}

impl NewUser {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>, role_id: u64) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            role_id,
            password: None,
            generate_password: false,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Let Appveyor generate and mail the password.
    pub fn with_generated_password(mut self) -> Self {
        self.generate_password = true;
        self
    }
}

/// Source control providers accepted by `Projects::add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepositoryProvider {
    GitHub,
    BitBucket,
    Vso,
    GitLab,
    Kiln,
    Stash,
    Git,
    Mercurial,
    Subversion,
}

impl RepositoryProvider {
    pub const ALL: [RepositoryProvider; 9] = [
        RepositoryProvider::GitHub,
        RepositoryProvider::BitBucket,
        RepositoryProvider::Vso,
        RepositoryProvider::GitLab,
        RepositoryProvider::Kiln,
        RepositoryProvider::Stash,
        RepositoryProvider::Git,
        RepositoryProvider::Mercurial,
        RepositoryProvider::Subversion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryProvider::GitHub => "gitHub",
            RepositoryProvider::BitBucket => "bitBucket",
            RepositoryProvider::Vso => "vso",
            RepositoryProvider::GitLab => "gitLab",
            RepositoryProvider::Kiln => "kiln",
            RepositoryProvider::Stash => "stash",
            RepositoryProvider::Git => "git",
            RepositoryProvider::Mercurial => "mercurial",
            RepositoryProvider::Subversion => "subversion",
        }
    }
}

impl fmt::Display for RepositoryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepositoryProvider {
    type Err = AppveyorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepositoryProvider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = RepositoryProvider::ALL.iter().map(|p| p.as_str()).collect();
                AppveyorError::usage(format!(
                    "invalid repository provider '{s}', must be one of [{}]",
                    valid.join(", ")
                ))
            })
    }
}

/// What `Builds::start` should build. Exactly one target must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub branch: Option<String>,
    pub commit_id: Option<String>,
    pub pull_request_id: Option<u64>,
    pub environment_variables: EnvironmentVariables,
}

impl BuildOptions {
    /// Most recent commit on a branch.
    pub fn branch(branch: impl Into<String>) -> Self {
        Self {
            branch: Some(branch.into()),
            ..Self::default()
        }
    }

    pub fn commit(commit_id: impl Into<String>) -> Self {
        Self {
            commit_id: Some(commit_id.into()),
            ..Self::default()
        }
    }

    /// GitHub pull request.
    pub fn pull_request(number: u64) -> Self {
        Self {
            pull_request_id: Some(number),
            ..Self::default()
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables.insert(name.into(), value.into());
        self
    }
}

/// Input for `Deployments::start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDeployment {
    pub environment_name: String,
    pub account_name: String,
    pub project_slug: String,
    pub build_version: String,
    /// Job whose artifacts are deployed when the build has several jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_job_id: Option<String>,
    pub environment_variables: EnvironmentVariables,
}

impl StartDeployment {
    pub fn new(
        account_name: impl Into<String>,
        project_slug: impl Into<String>,
        environment_name: impl Into<String>,
        build_version: impl Into<String>,
    ) -> Self {
        Self {
            environment_name: environment_name.into(),
            account_name: account_name.into(),
            project_slug: project_slug.into(),
            build_version: build_version.into(),
            build_job_id: None,
            environment_variables: EnvironmentVariables::new(),
        }
    }

    pub fn with_build_job(mut self, job_id: impl Into<String>) -> Self {
        self.build_job_id = Some(job_id.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables.insert(name.into(), value.into());
        self
    }
}

/// Paging for `Projects::history`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub records_number: u32,
    /// Return builds older than this one.
    pub start_build_id: Option<u64>,
    pub branch: Option<String>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            records_number: 50,
            start_build_id: None,
            branch: None,
        }
    }
}
