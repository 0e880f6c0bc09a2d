//! Resource groups.
//!
//! Each group borrows an `AppveyorClient` and turns its method arguments
//! into a `Request` descriptor. Argument checks that can fail happen here,
//! before `send` is reached.

mod builds;
mod collaborators;
mod deployments;
mod environments;
mod projects;
mod roles;
mod users;

pub use builds::Builds;
pub use collaborators::Collaborators;
pub use deployments::Deployments;
pub use environments::Environments;
pub use projects::Projects;
pub use roles::Roles;
pub use users::Users;

/// `base` or `base/{id}`.
pub(crate) fn collection_path(base: &str, id: Option<u64>) -> String {
    match id {
        Some(id) => format!("{base}/{id}"),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_path_appends_optional_id() {
        assert_eq!(collection_path("/api/users", None), "/api/users");
        assert_eq!(collection_path("/api/users", Some(3019)), "/api/users/3019");
    }
}
