//! Project collection handler, nested under a parent client.
//!
//! # Invariants
//! - Create and update reject a missing name, then a missing users list,
//!   before any lookup; nothing is written unless every user resolves.
//! - Business-rule failures answer `400 {"error": ...}`; unknown client,
//!   user or project ids answer `404`, and so does a user entry whose `id`
//!   is null.
//! - `user_projects` ignores client scoping and lists the requester's own
//!   assignments.

use crate::context::RequestContext;
use crate::input::project_input;
use crate::response::{ApiResponse, Status};
use clientdesk_core::{
    ClientId, ProjectId, ProjectService, ProjectServiceError, RepoResult,
    SqliteProjectRepository,
};
use log::{error, info, warn};
use serde_json::Value;

pub struct ProjectResource<'conn> {
    service: ProjectService<SqliteProjectRepository<'conn>>,
}

impl<'conn> ProjectResource<'conn> {
    pub fn try_new(conn: &'conn rusqlite::Connection) -> RepoResult<Self> {
        Ok(Self {
            service: ProjectService::new(SqliteProjectRepository::try_new(conn)?),
        })
    }

    /// `GET /clients/{client_id}/projects`
    pub fn list(&self, ctx: &RequestContext, client_id: ClientId) -> ApiResponse {
        match self.service.list_projects(client_id) {
            Ok(projects) => ApiResponse::serialized(Status::Ok, &projects),
            Err(err) => failure(ctx, "project_list", &err),
        }
    }

    /// `GET /clients/{client_id}/projects/{id}`
    pub fn retrieve(&self, ctx: &RequestContext, client_id: ClientId, id: ProjectId) -> ApiResponse {
        match self.service.get_project(client_id, id) {
            Ok(project) => ApiResponse::serialized(Status::Ok, &project),
            Err(err) => failure(ctx, "project_retrieve", &err),
        }
    }

    /// `POST /clients/{client_id}/projects`
    pub fn create(&self, ctx: &RequestContext, client_id: ClientId, input: &Value) -> ApiResponse {
        let input = project_input(input);
        match self.service.create_project(client_id, &input, ctx.requester) {
            Ok(project) => {
                info!(
                    "event=project_create module=api status=ok request_id={} requester={} client_id={client_id} project_id={} users={}",
                    ctx.request_id,
                    ctx.requester,
                    project.id,
                    project.users.len()
                );
                ApiResponse::serialized(Status::Created, &project)
            }
            Err(err) => failure(ctx, "project_create", &err),
        }
    }

    /// `PUT /clients/{client_id}/projects/{id}`
    ///
    /// Full replace: name and users are required exactly as on create.
    pub fn update(
        &self,
        ctx: &RequestContext,
        client_id: ClientId,
        id: ProjectId,
        input: &Value,
    ) -> ApiResponse {
        let input = project_input(input);
        match self.service.update_project(client_id, id, &input) {
            Ok(project) => {
                info!(
                    "event=project_update module=api status=ok request_id={} project_id={} users={}",
                    ctx.request_id,
                    project.id,
                    project.users.len()
                );
                ApiResponse::serialized(Status::Ok, &project)
            }
            Err(err) => failure(ctx, "project_update", &err),
        }
    }

    /// `DELETE /clients/{client_id}/projects/{id}`
    pub fn destroy(&self, ctx: &RequestContext, client_id: ClientId, id: ProjectId) -> ApiResponse {
        match self.service.delete_project(client_id, id) {
            Ok(()) => {
                info!(
                    "event=project_destroy module=api status=ok request_id={} project_id={id}",
                    ctx.request_id
                );
                ApiResponse::no_content()
            }
            Err(err) => failure(ctx, "project_destroy", &err),
        }
    }

    /// `GET /projects/user_projects`
    pub fn user_projects(&self, ctx: &RequestContext) -> ApiResponse {
        match self.service.user_projects(ctx.requester) {
            Ok(projects) => {
                info!(
                    "event=user_projects module=api status=ok request_id={} requester={} count={}",
                    ctx.request_id,
                    ctx.requester,
                    projects.len()
                );
                ApiResponse::serialized(Status::Ok, &projects)
            }
            Err(err) => {
                error!(
                    "event=user_projects module=api status=error request_id={} error={err}",
                    ctx.request_id
                );
                ApiResponse::internal_error()
            }
        }
    }
}

fn failure(ctx: &RequestContext, event: &str, err: &ProjectServiceError) -> ApiResponse {
    match err {
        ProjectServiceError::MissingProjectName
        | ProjectServiceError::MissingUsers
        | ProjectServiceError::InvalidUserData => {
            warn!(
                "event={event} module=api status=rejected request_id={} reason=\"{err}\"",
                ctx.request_id
            );
            ApiResponse::error_message(err.to_string())
        }
        ProjectServiceError::ClientNotFound(_)
        | ProjectServiceError::UserNotFound(_)
        | ProjectServiceError::UnresolvableUser
        | ProjectServiceError::ProjectNotFound(_) => {
            warn!(
                "event={event} module=api status=not_found request_id={} reason=\"{err}\"",
                ctx.request_id
            );
            ApiResponse::not_found()
        }
        ProjectServiceError::Repo(repo_err) => {
            error!(
                "event={event} module=api status=error request_id={} error={repo_err}",
                ctx.request_id
            );
            ApiResponse::internal_error()
        }
    }
}
