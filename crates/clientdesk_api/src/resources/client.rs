//! Client collection handler.
//!
//! # Invariants
//! - `created_by` is stamped from the request context; any `created_by`,
//!   `id` or timestamp in the body is ignored.
//! - Update is partial: only a supplied `client_name` changes, while
//!   `updated_at` always moves forward.
//! - Every client is visible to every authenticated requester.

use crate::context::RequestContext;
use crate::input::{optional_string, FieldError};
use crate::response::{ApiResponse, Status};
use clientdesk_core::{
    ClientId, ClientService, ClientServiceError, ClientValidationError, RepoResult,
    SqliteClientRepository,
};
use log::{error, info, warn};
use serde_json::{json, Value};

const NAME_FIELD: &str = "client_name";

pub struct ClientResource<'conn> {
    service: ClientService<SqliteClientRepository<'conn>>,
}

impl<'conn> ClientResource<'conn> {
    pub fn try_new(conn: &'conn rusqlite::Connection) -> RepoResult<Self> {
        Ok(Self {
            service: ClientService::new(SqliteClientRepository::try_new(conn)?),
        })
    }

    /// `GET /clients`
    pub fn list(&self, ctx: &RequestContext) -> ApiResponse {
        match self.service.list_clients() {
            Ok(clients) => {
                info!(
                    "event=client_list module=api status=ok request_id={} count={}",
                    ctx.request_id,
                    clients.len()
                );
                ApiResponse::serialized(Status::Ok, &clients)
            }
            Err(err) => {
                error!(
                    "event=client_list module=api status=error request_id={} error={err}",
                    ctx.request_id
                );
                ApiResponse::internal_error()
            }
        }
    }

    /// `GET /clients/{id}`
    pub fn retrieve(&self, ctx: &RequestContext, id: ClientId) -> ApiResponse {
        match self.service.get_client(id) {
            Ok(client) => ApiResponse::serialized(Status::Ok, &client),
            Err(err) => failure(ctx, "client_retrieve", &err),
        }
    }

    /// `POST /clients`
    pub fn create(&self, ctx: &RequestContext, input: &Value) -> ApiResponse {
        if !input.is_object() {
            return ApiResponse::bad_request(json!({
                "non_field_errors": ["Invalid data. Expected a dictionary."]
            }));
        }
        let client_name = match optional_string(input, NAME_FIELD) {
            Ok(value) => value,
            Err(field_err) => return field_error(ctx, "client_create", field_err),
        };

        match self.service.create_client(client_name, ctx.requester) {
            Ok(client) => {
                info!(
                    "event=client_create module=api status=ok request_id={} requester={} client_id={}",
                    ctx.request_id, ctx.requester, client.id
                );
                ApiResponse::serialized(Status::Created, &client)
            }
            Err(err) => failure(ctx, "client_create", &err),
        }
    }

    /// `PUT /clients/{id}`
    ///
    /// An unknown id answers `404` before the body is inspected.
    pub fn update(&self, ctx: &RequestContext, id: ClientId, input: &Value) -> ApiResponse {
        if let Err(err) = self.service.get_client(id) {
            return failure(ctx, "client_update", &err);
        }
        let client_name = match optional_string(input, NAME_FIELD) {
            Ok(value) => value,
            Err(field_err) => return field_error(ctx, "client_update", field_err),
        };

        match self.service.update_client(id, client_name) {
            Ok(client) => {
                info!(
                    "event=client_update module=api status=ok request_id={} client_id={} renamed={}",
                    ctx.request_id,
                    client.id,
                    client_name.is_some()
                );
                ApiResponse::serialized(Status::Ok, &client)
            }
            Err(err) => failure(ctx, "client_update", &err),
        }
    }

    /// `DELETE /clients/{id}`
    ///
    /// Projects of the client are removed with it.
    pub fn destroy(&self, ctx: &RequestContext, id: ClientId) -> ApiResponse {
        match self.service.delete_client(id) {
            Ok(()) => {
                info!(
                    "event=client_destroy module=api status=ok request_id={} client_id={id}",
                    ctx.request_id
                );
                ApiResponse::no_content()
            }
            Err(err) => failure(ctx, "client_destroy", &err),
        }
    }
}

fn field_error(ctx: &RequestContext, event: &str, err: FieldError) -> ApiResponse {
    warn!(
        "event={event} module=api status=rejected request_id={} field={NAME_FIELD}",
        ctx.request_id
    );
    ApiResponse::bad_request(json!({ NAME_FIELD: [err.message()] }))
}

fn failure(ctx: &RequestContext, event: &str, err: &ClientServiceError) -> ApiResponse {
    match err {
        ClientServiceError::Validation(validation) => {
            warn!(
                "event={event} module=api status=rejected request_id={} reason={validation}",
                ctx.request_id
            );
            ApiResponse::bad_request(json!({ NAME_FIELD: [validation_message(*validation)] }))
        }
        ClientServiceError::ClientNotFound(id) => {
            warn!(
                "event={event} module=api status=not_found request_id={} client_id={id}",
                ctx.request_id
            );
            ApiResponse::not_found()
        }
        ClientServiceError::Repo(repo_err) => {
            error!(
                "event={event} module=api status=error request_id={} error={repo_err}",
                ctx.request_id
            );
            ApiResponse::internal_error()
        }
    }
}

fn validation_message(err: ClientValidationError) -> String {
    match err {
        ClientValidationError::MissingName => "This field is required.".to_string(),
        ClientValidationError::BlankName => "This field may not be blank.".to_string(),
        ClientValidationError::NameTooLong { max_chars } => {
            format!("Ensure this field has no more than {max_chars} characters.")
        }
    }
}
