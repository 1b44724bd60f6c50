//! Project use-case service: creation with user assignment, scoped reads,
//! full replace and delete.
//!
//! # Invariants
//! - Create and update check, in this order: project name, users list,
//!   target lookup, then each user entry in input order. The first failure
//!   aborts the call before anything is written.
//! - A project is only visible through the client it belongs to.
//! - The assigned-user set is replaced, never merged.

use crate::model::client::ClientId;
use crate::model::now_epoch_ms;
use crate::model::project::{Project, ProjectId};
use crate::model::user::UserId;
use crate::repo::project_repo::{NewProject, ProjectRepository};
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One entry of an incoming users list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRef {
    /// Entry carrying a user identifier.
    Id(UserId),
    /// Entry whose identifier field is present but null; it never resolves.
    NullId,
    /// Entry without a usable identifier field.
    Malformed,
}

/// Parsed create/update input for a project.
///
/// `None` stands for any absent or empty value; callers decide what counts
/// as empty for their wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInput {
    pub project_name: Option<String>,
    pub users: Option<Vec<UserRef>>,
}

#[derive(Debug)]
pub enum ProjectServiceError {
    MissingProjectName,
    MissingUsers,
    InvalidUserData,
    ClientNotFound(ClientId),
    UserNotFound(UserId),
    /// A users entry named no user at all (`"id": null`).
    UnresolvableUser,
    ProjectNotFound(ProjectId),
    Repo(RepoError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingProjectName => write!(f, "Project name is required"),
            Self::MissingUsers => write!(f, "Users list is required"),
            Self::InvalidUserData => write!(f, "Invalid user data format"),
            Self::ClientNotFound(id) => write!(f, "client not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::UnresolvableUser => write!(f, "user not found: null id"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "project",
                id,
            } => Self::ProjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a project under `client_id` owned by `requester` and assigns
    /// exactly the resolved users.
    pub fn create_project(
        &self,
        client_id: ClientId,
        input: &ProjectInput,
        requester: UserId,
    ) -> Result<Project, ProjectServiceError> {
        let project_name = required_project_name(input)?;
        let entries = required_users(input)?;

        if !self.repo.client_exists(client_id)? {
            return Err(ProjectServiceError::ClientNotFound(client_id));
        }
        let user_ids = self.resolve_users(entries)?;

        Ok(self.repo.create_project(&NewProject {
            project_name,
            client_id,
            created_by: requester,
            created_at: now_epoch_ms(),
            user_ids: &user_ids,
        })?)
    }

    /// Replaces the name and user set of a project owned by `client_id`.
    pub fn update_project(
        &self,
        client_id: ClientId,
        id: ProjectId,
        input: &ProjectInput,
    ) -> Result<Project, ProjectServiceError> {
        let project_name = required_project_name(input)?;
        let entries = required_users(input)?;

        self.get_project(client_id, id)?;
        let user_ids = self.resolve_users(entries)?;

        self.repo.replace_project(id, project_name, &user_ids)?;
        self.get_project(client_id, id)
    }

    /// Loads a project, treating a project of another client as absent.
    pub fn get_project(
        &self,
        client_id: ClientId,
        id: ProjectId,
    ) -> Result<Project, ProjectServiceError> {
        self.repo
            .get_project(id)?
            .filter(|project| project.client_id == client_id)
            .ok_or(ProjectServiceError::ProjectNotFound(id))
    }

    pub fn list_projects(&self, client_id: ClientId) -> Result<Vec<Project>, ProjectServiceError> {
        if !self.repo.client_exists(client_id)? {
            return Err(ProjectServiceError::ClientNotFound(client_id));
        }
        Ok(self.repo.list_client_projects(client_id)?)
    }

    pub fn delete_project(
        &self,
        client_id: ClientId,
        id: ProjectId,
    ) -> Result<(), ProjectServiceError> {
        self.get_project(client_id, id)?;
        Ok(self.repo.delete_project(id)?)
    }

    /// Projects the requester is assigned to, in store order.
    pub fn user_projects(&self, requester: UserId) -> RepoResult<Vec<Project>> {
        self.repo.list_user_projects(requester)
    }

    fn resolve_users(&self, entries: &[UserRef]) -> Result<Vec<UserId>, ProjectServiceError> {
        let mut user_ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let user_id = match *entry {
                UserRef::Id(user_id) => user_id,
                UserRef::NullId => return Err(ProjectServiceError::UnresolvableUser),
                UserRef::Malformed => return Err(ProjectServiceError::InvalidUserData),
            };
            if !self.repo.user_exists(user_id)? {
                return Err(ProjectServiceError::UserNotFound(user_id));
            }
            user_ids.push(user_id);
        }
        Ok(user_ids)
    }
}

// Only an empty name counts as missing; the value is stored as given.
fn required_project_name(input: &ProjectInput) -> Result<&str, ProjectServiceError> {
    input
        .project_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or(ProjectServiceError::MissingProjectName)
}

fn required_users(input: &ProjectInput) -> Result<&[UserRef], ProjectServiceError> {
    input
        .users
        .as_deref()
        .filter(|entries| !entries.is_empty())
        .ok_or(ProjectServiceError::MissingUsers)
}
