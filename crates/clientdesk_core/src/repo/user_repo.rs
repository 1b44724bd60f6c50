//! User lookup and provisioning.

use crate::model::user::{User, UserId};
use crate::repo::{ensure_connection_ready, RepoResult, TableShape};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USERS_TABLE: TableShape = ("users", &["id", "username"]);

/// Repository interface for user identities.
pub trait UserRepository {
    fn create_user(&self, username: &str) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Lists all users ordered by id.
    fn list_users(&self) -> RepoResult<Vec<User>>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[USERS_TABLE])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, username: &str) -> RepoResult<User> {
        self.conn
            .execute("INSERT INTO users (username) VALUES (?1);", [username])?;
        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: username.to_string(),
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username FROM users WHERE id = ?1;",
                params![id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username FROM users WHERE username = ?1;",
                [username],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username FROM users ORDER BY id ASC;")?;
        let users = stmt
            .query_map([], parse_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
    })
}
