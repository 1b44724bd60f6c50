//! Client repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `created_by` and `created_at` are written once at insert and never
//!   touched by `update_client`.
//! - Deleting a client cascades to its projects through the schema's
//!   foreign keys.

use crate::model::client::{Client, ClientId};
use crate::model::user::UserId;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult, TableShape};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CLIENTS_TABLE: TableShape = (
    "clients",
    &["id", "client_name", "created_by", "created_at", "updated_at"],
);

const CLIENT_SELECT_SQL: &str = "SELECT
    id,
    client_name,
    created_by,
    created_at,
    updated_at
FROM clients";

/// Repository interface for client CRUD.
pub trait ClientRepository {
    /// Inserts a client with `created_at == updated_at == now_ms`.
    fn create_client(
        &self,
        client_name: &str,
        created_by: UserId,
        now_ms: i64,
    ) -> RepoResult<Client>;
    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>>;
    /// Lists all clients ordered by id.
    fn list_clients(&self) -> RepoResult<Vec<Client>>;
    /// Persists `client_name` and `updated_at` of an existing client.
    fn update_client(&self, client: &Client) -> RepoResult<()>;
    fn delete_client(&self, id: ClientId) -> RepoResult<()>;
}

pub struct SqliteClientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClientRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[CLIENTS_TABLE])?;
        Ok(Self { conn })
    }
}

impl ClientRepository for SqliteClientRepository<'_> {
    fn create_client(
        &self,
        client_name: &str,
        created_by: UserId,
        now_ms: i64,
    ) -> RepoResult<Client> {
        self.conn.execute(
            "INSERT INTO clients (client_name, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3);",
            params![client_name, created_by, now_ms],
        )?;

        Ok(Client {
            id: self.conn.last_insert_rowid(),
            client_name: client_name.to_string(),
            created_by,
            created_at: now_ms,
            updated_at: now_ms,
        })
    }

    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>> {
        let client = self
            .conn
            .query_row(
                &format!("{CLIENT_SELECT_SQL} WHERE id = ?1;"),
                params![id],
                parse_client_row,
            )
            .optional()?;
        Ok(client)
    }

    fn list_clients(&self) -> RepoResult<Vec<Client>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLIENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let clients = stmt
            .query_map([], parse_client_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clients)
    }

    fn update_client(&self, client: &Client) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE clients
             SET
                client_name = ?1,
                updated_at = ?2
             WHERE id = ?3;",
            params![client.client_name.as_str(), client.updated_at, client.id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "client",
                id: client.id,
            });
        }
        Ok(())
    }

    fn delete_client(&self, id: ClientId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM clients WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "client",
                id,
            });
        }
        Ok(())
    }
}

fn parse_client_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get("id")?,
        client_name: row.get("client_name")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
