//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist projects together with their assigned-user set.
//! - Answer the existence lookups the project workflow validates against.
//!
//! # Invariants
//! - A project row and its `project_users` rows are written in one
//!   transaction; a failure leaves neither behind.
//! - Assigning users replaces the whole set; duplicates collapse.
//! - Reads return `users` in ascending id order.

use crate::model::client::ClientId;
use crate::model::project::{Project, ProjectId};
use crate::model::user::UserId;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult, TableShape};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

const PROJECT_TABLES: &[TableShape] = &[
    ("clients", &["id"]),
    ("users", &["id"]),
    (
        "projects",
        &["id", "project_name", "client_id", "created_by", "created_at"],
    ),
    ("project_users", &["project_id", "user_id"]),
];

const PROJECT_SELECT_SQL: &str = "SELECT
    p.id AS id,
    p.project_name AS project_name,
    p.client_id AS client_id,
    p.created_by AS created_by,
    p.created_at AS created_at
FROM projects p";

/// Insert model for one project and its initial user set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject<'a> {
    pub project_name: &'a str,
    pub client_id: ClientId,
    pub created_by: UserId,
    pub created_at: i64,
    pub user_ids: &'a [UserId],
}

/// Repository interface for project CRUD and user assignment.
pub trait ProjectRepository {
    fn client_exists(&self, client_id: ClientId) -> RepoResult<bool>;
    fn user_exists(&self, user_id: UserId) -> RepoResult<bool>;
    /// Inserts the project and assigns `user_ids` atomically.
    fn create_project(&self, project: &NewProject<'_>) -> RepoResult<Project>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Lists projects of one client ordered by id.
    fn list_client_projects(&self, client_id: ClientId) -> RepoResult<Vec<Project>>;
    /// Lists projects whose user set contains `user_id`, ordered by id.
    fn list_user_projects(&self, user_id: UserId) -> RepoResult<Vec<Project>>;
    /// Replaces the name and the full user set of an existing project.
    fn replace_project(
        &self,
        id: ProjectId,
        project_name: &str,
        user_ids: &[UserId],
    ) -> RepoResult<()>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, PROJECT_TABLES)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn client_exists(&self, client_id: ClientId) -> RepoResult<bool> {
        row_exists(self.conn, "SELECT EXISTS(SELECT 1 FROM clients WHERE id = ?1);", client_id)
    }

    fn user_exists(&self, user_id: UserId) -> RepoResult<bool> {
        row_exists(self.conn, "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);", user_id)
    }

    fn create_project(&self, project: &NewProject<'_>) -> RepoResult<Project> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO projects (project_name, client_id, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                project.project_name,
                project.client_id,
                project.created_by,
                project.created_at,
            ],
        )?;
        let project_id = tx.last_insert_rowid();
        assign_users(&tx, project_id, project.user_ids)?;
        tx.commit()?;

        load_required_project(self.conn, project_id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let row = self
            .conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE p.id = ?1;"),
                params![id],
                parse_project_row,
            )
            .optional()?;

        match row {
            Some(head) => Ok(Some(attach_users(self.conn, head)?)),
            None => Ok(None),
        }
    }

    fn list_client_projects(&self, client_id: ClientId) -> RepoResult<Vec<Project>> {
        list_projects(
            self.conn,
            &format!("{PROJECT_SELECT_SQL} WHERE p.client_id = ?1 ORDER BY p.id ASC;"),
            client_id,
        )
    }

    fn list_user_projects(&self, user_id: UserId) -> RepoResult<Vec<Project>> {
        list_projects(
            self.conn,
            &format!(
                "{PROJECT_SELECT_SQL}
                 INNER JOIN project_users pu ON pu.project_id = p.id
                 WHERE pu.user_id = ?1
                 ORDER BY p.id ASC;"
            ),
            user_id,
        )
    }

    fn replace_project(
        &self,
        id: ProjectId,
        project_name: &str,
        user_ids: &[UserId],
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE projects SET project_name = ?1 WHERE id = ?2;",
            params![project_name, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }

        assign_users(&tx, id, user_ids)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }
}

/// Row shape before the user set is attached.
struct ProjectHead {
    id: ProjectId,
    project_name: String,
    client_id: ClientId,
    created_by: UserId,
    created_at: i64,
}

fn parse_project_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectHead> {
    Ok(ProjectHead {
        id: row.get("id")?,
        project_name: row.get("project_name")?,
        client_id: row.get("client_id")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
    })
}

fn attach_users(conn: &Connection, head: ProjectHead) -> RepoResult<Project> {
    let users = load_project_users(conn, head.id)?;
    Ok(Project {
        id: head.id,
        project_name: head.project_name,
        client_id: head.client_id,
        users,
        created_by: head.created_by,
        created_at: head.created_at,
    })
}

fn list_projects(conn: &Connection, sql: &str, key: i64) -> RepoResult<Vec<Project>> {
    let mut stmt = conn.prepare(sql)?;
    let heads = stmt
        .query_map(params![key], parse_project_row)?
        .collect::<Result<Vec<_>, _>>()?;

    heads
        .into_iter()
        .map(|head| attach_users(conn, head))
        .collect()
}

fn load_required_project(conn: &Connection, id: ProjectId) -> RepoResult<Project> {
    let head = conn
        .query_row(
            &format!("{PROJECT_SELECT_SQL} WHERE p.id = ?1;"),
            params![id],
            parse_project_row,
        )
        .optional()?
        .ok_or_else(|| RepoError::InvalidData(format!("project {id} missing after write")))?;
    attach_users(conn, head)
}

fn load_project_users(conn: &Connection, project_id: ProjectId) -> RepoResult<Vec<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT user_id
         FROM project_users
         WHERE project_id = ?1
         ORDER BY user_id ASC;",
    )?;
    let users = stmt
        .query_map(params![project_id], |row| row.get(0))?
        .collect::<Result<Vec<UserId>, _>>()?;
    Ok(users)
}

fn assign_users(conn: &Connection, project_id: ProjectId, user_ids: &[UserId]) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM project_users WHERE project_id = ?1;",
        params![project_id],
    )?;
    for user_id in user_ids {
        conn.execute(
            "INSERT OR IGNORE INTO project_users (project_id, user_id) VALUES (?1, ?2);",
            params![project_id, user_id],
        )?;
    }
    Ok(())
}

fn row_exists(conn: &Connection, sql: &str, id: i64) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, params![id], |row| row.get(0))?;
    Ok(exists == 1)
}
