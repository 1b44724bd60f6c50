//! Operator entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the database.
//! - Provision users, since identity lives outside the resource handlers.
//! - Dispatch one `METHOD PATH [BODY]` request and print status plus body.
//!
//! # Invariants
//! - Exit code is `0` for 2xx responses, `1` for error responses and `2`
//!   when the request could not be dispatched at all.

use clap::{Parser, Subcommand, ValueEnum};
use clientdesk_api::{ApiResponse, ClientResource, ProjectResource, RequestContext};
use clientdesk_core::db::{open_db, DbError};
use clientdesk_core::{
    init_logging, AppConfig, ClientId, ConfigError, LoggingError, ProjectId, RepoError,
    SqliteUserRepository, UserId, UserService, UserServiceError,
};
use log::{error, info, warn};
use rusqlite::Connection;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "clientdesk", version, about = "Client and project registry")]
struct Cli {
    /// SQLite database file (overrides CLIENTDESK_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides CLIENTDESK_LOG_LEVEL)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotating log files (overrides CLIENTDESK_LOG_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Health check
    Ping,
    /// Print the core version
    Version,
    /// Provision or list users
    Users {
        #[command(subcommand)]
        action: UsersCommand,
    },
    /// Send one request to the resource handlers
    Request {
        /// Authenticated user issuing the request
        #[arg(long = "as", value_name = "USER_ID")]
        requester: UserId,
        #[arg(value_enum, ignore_case = true)]
        method: Method,
        path: String,
        /// JSON request body
        body: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    Add { username: String },
    List,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Clients,
    Client(ClientId),
    Projects(ClientId),
    Project(ClientId, ProjectId),
    UserProjects,
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
    User(UserServiceError),
    Json(serde_json::Error),
    UnknownRequester(UserId),
    UnknownRoute(String),
    MethodNotAllowed { method: Method, path: String },
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::User(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
            Self::UnknownRequester(id) => write!(f, "no user with id {id}"),
            Self::UnknownRoute(path) => write!(f, "no route for `{path}`"),
            Self::MethodNotAllowed { method, path } => {
                write!(f, "method {method} not allowed on `{path}`")
            }
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::User(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<UserServiceError> for CliError {
    fn from(value: UserServiceError) -> Self {
        Self::User(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match &cli.command {
        Command::Ping => {
            println!("clientdesk_core ping={}", clientdesk_core::ping());
            return Ok(ExitCode::SUCCESS);
        }
        Command::Version => {
            println!("clientdesk_core version={}", clientdesk_core::core_version());
            return Ok(ExitCode::SUCCESS);
        }
        Command::Users { .. } | Command::Request { .. } => {}
    }

    let config = resolve_config(&cli)?;
    init_logging(&config.logging())?;
    let conn = open_db(&config.db_path)?;

    match cli.command {
        Command::Users { action } => {
            let users = UserService::new(SqliteUserRepository::try_new(&conn)?);
            match action {
                UsersCommand::Add { username } => print_json(&users.create_user(&username)?)?,
                UsersCommand::List => print_json(&users.list_users()?)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Request {
            requester,
            method,
            path,
            body,
        } => {
            let body = match body.as_deref() {
                Some(raw) => serde_json::from_str(raw)?,
                None => Value::Object(Default::default()),
            };
            let response = handle_request(&conn, requester, method, &path, &body)?;
            print_response(&response)?;
            Ok(if response.status.code() < 400 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Ping | Command::Version => Ok(ExitCode::SUCCESS),
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    Ok(config)
}

/// Authenticates `requester`, then routes the request to its handler.
fn handle_request(
    conn: &Connection,
    requester: UserId,
    method: Method,
    path: &str,
    body: &Value,
) -> Result<ApiResponse, CliError> {
    let known = UserService::new(SqliteUserRepository::try_new(conn)?)
        .get_user(requester)?
        .is_some();
    if !known {
        warn!("event=request_auth module=cli status=rejected requester={requester}");
        return Err(CliError::UnknownRequester(requester));
    }

    let route = parse_route(path).ok_or_else(|| CliError::UnknownRoute(path.to_string()))?;
    let ctx = RequestContext::new(requester);
    info!(
        "event=request_dispatch module=cli status=ok request_id={} method={method} route={route:?}",
        ctx.request_id
    );
    dispatch(conn, &ctx, method, route, body).ok_or_else(|| CliError::MethodNotAllowed {
        method,
        path: path.to_string(),
    })
}

fn parse_route(path: &str) -> Option<Route> {
    let path = path.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["clients"] => Some(Route::Clients),
        ["clients", id] => Some(Route::Client(id.parse().ok()?)),
        ["clients", client_id, "projects"] => Some(Route::Projects(client_id.parse().ok()?)),
        ["clients", client_id, "projects", id] => {
            Some(Route::Project(client_id.parse().ok()?, id.parse().ok()?))
        }
        ["projects", "user_projects"] => Some(Route::UserProjects),
        _ => None,
    }
}

/// Runs the handler for `method` on `route`; `None` when the route does not
/// accept the method.
fn dispatch(
    conn: &Connection,
    ctx: &RequestContext,
    method: Method,
    route: Route,
    body: &Value,
) -> Option<ApiResponse> {
    match route {
        Route::Clients | Route::Client(_) => {
            let clients = match ClientResource::try_new(conn) {
                Ok(resource) => resource,
                Err(err) => return Some(unavailable(ctx, &err)),
            };
            match (method, route) {
                (Method::Get, Route::Clients) => Some(clients.list(ctx)),
                (Method::Post, Route::Clients) => Some(clients.create(ctx, body)),
                (Method::Get, Route::Client(id)) => Some(clients.retrieve(ctx, id)),
                (Method::Put, Route::Client(id)) => Some(clients.update(ctx, id, body)),
                (Method::Delete, Route::Client(id)) => Some(clients.destroy(ctx, id)),
                _ => None,
            }
        }
        Route::Projects(_) | Route::Project(..) | Route::UserProjects => {
            let projects = match ProjectResource::try_new(conn) {
                Ok(resource) => resource,
                Err(err) => return Some(unavailable(ctx, &err)),
            };
            match (method, route) {
                (Method::Get, Route::Projects(cid)) => Some(projects.list(ctx, cid)),
                (Method::Post, Route::Projects(cid)) => Some(projects.create(ctx, cid, body)),
                (Method::Get, Route::Project(cid, id)) => Some(projects.retrieve(ctx, cid, id)),
                (Method::Put, Route::Project(cid, id)) => {
                    Some(projects.update(ctx, cid, id, body))
                }
                (Method::Delete, Route::Project(cid, id)) => {
                    Some(projects.destroy(ctx, cid, id))
                }
                (Method::Get, Route::UserProjects) => Some(projects.user_projects(ctx)),
                _ => None,
            }
        }
    }
}

fn unavailable(ctx: &RequestContext, err: &RepoError) -> ApiResponse {
    error!(
        "event=request_dispatch module=cli status=error request_id={} error={err}",
        ctx.request_id
    );
    ApiResponse::internal_error()
}

fn print_response(response: &ApiResponse) -> Result<(), serde_json::Error> {
    println!("{}", response.status.code());
    if let Some(body) = &response.body {
        println!("{}", serde_json::to_string_pretty(body)?);
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{dispatch, handle_request, parse_route, Cli, CliError, Command, Method, Route};
    use clap::{CommandFactory, Parser};
    use clientdesk_api::{RequestContext, Status};
    use clientdesk_core::db::{open_db, open_db_in_memory};
    use clientdesk_core::{SqliteUserRepository, UserRepository};
    use serde_json::json;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn request_arguments_parse_with_global_flags() {
        let cli = Cli::try_parse_from([
            "clientdesk",
            "request",
            "--as",
            "3",
            "post",
            "/clients",
            r#"{"client_name":"Acme"}"#,
            "--db",
            "/tmp/x.sqlite3",
        ])
        .unwrap();

        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/x.sqlite3")));
        match cli.command {
            Command::Request {
                requester,
                method,
                path,
                body,
            } => {
                assert_eq!(requester, 3);
                assert_eq!(method, Method::Post);
                assert_eq!(path, "/clients");
                assert_eq!(body.as_deref(), Some(r#"{"client_name":"Acme"}"#));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_route_maps_every_resource_path() {
        assert_eq!(parse_route("/clients"), Some(Route::Clients));
        assert_eq!(parse_route("/clients/"), Some(Route::Clients));
        assert_eq!(parse_route("/clients/3"), Some(Route::Client(3)));
        assert_eq!(parse_route("/clients/3/projects"), Some(Route::Projects(3)));
        assert_eq!(parse_route("/clients/3/projects/9/"), Some(Route::Project(3, 9)));
        assert_eq!(
            parse_route("/projects/user_projects?page=1"),
            Some(Route::UserProjects)
        );
    }

    #[test]
    fn parse_route_rejects_unknown_paths_and_non_numeric_ids() {
        assert_eq!(parse_route("/"), None);
        assert_eq!(parse_route("/clients/acme"), None);
        assert_eq!(parse_route("/clients/3/tasks"), None);
        assert_eq!(parse_route("/projects"), None);
    }

    #[test]
    fn dispatch_runs_client_and_project_handlers() {
        let conn = open_db_in_memory().unwrap();
        let owner = SqliteUserRepository::try_new(&conn)
            .unwrap()
            .create_user("owner")
            .unwrap();
        let ctx = RequestContext::new(owner.id);

        let created = dispatch(
            &conn,
            &ctx,
            Method::Post,
            Route::Clients,
            &json!({ "client_name": "Acme" }),
        )
        .unwrap();
        assert_eq!(created.status, Status::Created);
        let client_id = created.body.unwrap()["id"].as_i64().unwrap();

        let project = dispatch(
            &conn,
            &ctx,
            Method::Post,
            Route::Projects(client_id),
            &json!({ "project_name": "Launch", "users": [{ "id": owner.id }] }),
        )
        .unwrap();
        assert_eq!(project.status, Status::Created);

        let mine = dispatch(&conn, &ctx, Method::Get, Route::UserProjects, &json!({})).unwrap();
        assert_eq!(mine.body.unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn dispatch_rejects_methods_a_route_does_not_accept() {
        let conn = open_db_in_memory().unwrap();
        let ctx = RequestContext::new(1);
        assert!(dispatch(&conn, &ctx, Method::Delete, Route::Clients, &json!({})).is_none());
        assert!(
            dispatch(&conn, &ctx, Method::Post, Route::UserProjects, &json!({})).is_none()
        );
    }

    #[test]
    fn handle_request_requires_a_known_requester() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db(dir.path().join("clientdesk.sqlite3")).unwrap();

        let err = handle_request(&conn, 42, Method::Get, "/clients", &json!({})).unwrap_err();
        assert!(matches!(err, CliError::UnknownRequester(42)));

        let user = SqliteUserRepository::try_new(&conn)
            .unwrap()
            .create_user("owner")
            .unwrap();
        let err = handle_request(&conn, user.id, Method::Get, "/nowhere", &json!({}))
            .unwrap_err();
        assert!(matches!(err, CliError::UnknownRoute(path) if path == "/nowhere"));

        let listed = handle_request(&conn, user.id, Method::Get, "/clients", &json!({})).unwrap();
        assert_eq!(listed.status, Status::Ok);
        assert_eq!(listed.body, Some(json!([])));
    }
}
