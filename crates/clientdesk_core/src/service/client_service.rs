//! Client use-case service.
//!
//! # Invariants
//! - The creator of a client is always the requester passed in by the
//!   caller; there is no way to supply it through input.
//! - Update looks the client up before validating a new name, so a missing
//!   client reports `ClientNotFound` even when the name is also invalid.
//! - Every successful update advances `updated_at`.

use crate::model::client::{validate_client_name, Client, ClientId, ClientValidationError};
use crate::model::now_epoch_ms;
use crate::model::user::UserId;
use crate::repo::client_repo::ClientRepository;
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ClientServiceError {
    Validation(ClientValidationError),
    ClientNotFound(ClientId),
    Repo(RepoError),
}

impl Display for ClientServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ClientNotFound(id) => write!(f, "client not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ClientServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ClientNotFound(_) => None,
        }
    }
}

impl From<ClientValidationError> for ClientServiceError {
    fn from(value: ClientValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ClientServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "client",
                id,
            } => Self::ClientNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct ClientService<R: ClientRepository> {
    repo: R,
}

impl<R: ClientRepository> ClientService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a client owned by `requester`.
    pub fn create_client(
        &self,
        client_name: Option<&str>,
        requester: UserId,
    ) -> Result<Client, ClientServiceError> {
        let client_name = validate_client_name(client_name)?;
        Ok(self
            .repo
            .create_client(&client_name, requester, now_epoch_ms())?)
    }

    /// Applies a partial update: the name changes only when supplied, the
    /// update timestamp always moves forward.
    pub fn update_client(
        &self,
        id: ClientId,
        client_name: Option<&str>,
    ) -> Result<Client, ClientServiceError> {
        let mut client = self.get_client(id)?;
        if let Some(name) = client_name {
            client.client_name = validate_client_name(Some(name))?;
        }
        client.refresh_updated_at(now_epoch_ms());
        self.repo.update_client(&client)?;
        Ok(client)
    }

    pub fn delete_client(&self, id: ClientId) -> Result<(), ClientServiceError> {
        Ok(self.repo.delete_client(id)?)
    }

    pub fn get_client(&self, id: ClientId) -> Result<Client, ClientServiceError> {
        self.repo
            .get_client(id)?
            .ok_or(ClientServiceError::ClientNotFound(id))
    }

    pub fn list_clients(&self) -> RepoResult<Vec<Client>> {
        self.repo.list_clients()
    }
}
