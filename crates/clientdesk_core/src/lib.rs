//! Core domain logic for clientdesk: clients, their projects and the users
//! assigned to them.
//! This crate owns every business invariant; handler crates only translate.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::client::{Client, ClientId, ClientValidationError, CLIENT_NAME_MAX_CHARS};
pub use model::project::{Project, ProjectId};
pub use model::user::{User, UserId};
pub use repo::client_repo::{ClientRepository, SqliteClientRepository};
pub use repo::project_repo::{NewProject, ProjectRepository, SqliteProjectRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::client_service::{ClientService, ClientServiceError};
pub use service::project_service::{ProjectInput, ProjectService, ProjectServiceError, UserRef};
pub use service::user_service::{UserService, UserServiceError};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
