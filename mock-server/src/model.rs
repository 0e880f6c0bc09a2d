//! Records held by the mock and the store that owns them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Every project created through the mock belongs to this account.
pub const ACCOUNT_NAME: &str = "acme";

pub const DEFAULT_SETTINGS_YAML: &str = "version: 1.0.{build}\nbuild:\n  verbosity: minimal\n";

pub const REPOSITORY_PROVIDERS: [&str; 9] = [
    "gitHub",
    "bitBucket",
    "vso",
    "gitLab",
    "kiln",
    "stash",
    "git",
    "mercurial",
    "subversion",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_id: u64,
    pub name: String,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub groups: Vec<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: u64,
    pub full_name: String,
    pub email: String,
    pub role_id: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub user_id: u64,
    pub email: String,
    pub role_id: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub name: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub build_id: u64,
    pub build_number: u64,
    pub version: String,
    pub branch: Option<String>,
    pub commit_id: Option<String>,
    pub pull_request_id: Option<u64>,
    pub status: String,
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: u64,
    pub account_name: String,
    pub name: String,
    pub slug: String,
    pub repository_type: String,
    pub repository_name: String,
    pub next_build_number: u64,
    #[serde(skip)]
    pub settings_yaml: String,
    #[serde(skip)]
    pub builds: Vec<Build>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub deployment_environment_id: u64,
    pub name: String,
    pub provider: String,
    pub environment_access_key: String,
    #[serde(default)]
    pub settings: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub deployment_id: u64,
    pub account_name: String,
    pub project_slug: String,
    pub environment_name: String,
    pub build_version: String,
    pub build_job_id: Option<String>,
    pub environment_variables: BTreeMap<String, String>,
    pub status: String,
}

/// In-memory account state.
#[derive(Debug)]
pub struct Store {
    next_id: u64,
    pub roles: BTreeMap<u64, Role>,
    pub users: BTreeMap<u64, User>,
    pub collaborators: BTreeMap<u64, Collaborator>,
    pub projects: Vec<Project>,
    pub environments: BTreeMap<u64, Environment>,
    pub deployments: BTreeMap<u64, Deployment>,
}

impl Default for Store {
    fn default() -> Self {
        let mut roles = BTreeMap::new();
        for (role_id, name) in [(4, "Administrator"), (5, "User")] {
            roles.insert(
                role_id,
                Role {
                    role_id,
                    name: name.to_string(),
                    is_system: true,
                    groups: Vec::new(),
                },
            );
        }
        Self {
            next_id: 1000,
            roles,
            users: BTreeMap::new(),
            collaborators: BTreeMap::new(),
            projects: Vec::new(),
            environments: BTreeMap::new(),
            deployments: BTreeMap::new(),
        }
    }
}

impl Store {
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn project(&self, account_name: &str, slug: &str) -> Option<&Project> {
        self.projects
            .iter()
            .find(|p| p.account_name == account_name && p.slug == slug)
    }

    pub fn project_mut(&mut self, account_name: &str, slug: &str) -> Option<&mut Project> {
        self.projects
            .iter_mut()
            .find(|p| p.account_name == account_name && p.slug == slug)
    }

    pub fn job(&self, job_id: &str) -> Option<(&Build, &Job)> {
        self.projects
            .iter()
            .flat_map(|p| p.builds.iter())
            .find_map(|b| b.jobs.iter().find(|j| j.job_id == job_id).map(|j| (b, j)))
    }
}

/// Project slug derived from the repository name: last path segment,
/// lowercased, with runs of other characters collapsed to `-`.
pub fn slugify(repository_name: &str) -> String {
    let last = repository_name.rsplit('/').next().unwrap_or(repository_name);
    let mut slug = String::with_capacity(last.len());
    for c in last.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

pub fn random_key() -> String {
    Uuid::new_v4().simple().to_string()
}
