// src/db/users.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::ServerError;

/// A user mirrored from the external identity provider. Not otherwise
/// involved in lead/event logic.
#[derive(Debug, Clone, serde::Serialize)]
pub struct User {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
}

/// Upsert-on-change handler, keyed by the provider's external id.
pub fn upsert_user(
    conn: &Connection,
    external_id: &str,
    name: &str,
    email: &str,
    image_url: Option<&str>,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert into users (external_id, name, email, image_url, created_at)
         values (?1, ?2, ?3, ?4, ?5)
         on conflict(external_id) do update set
           name = excluded.name,
           email = excluded.email,
           image_url = excluded.image_url",
        params![external_id, name, email, image_url, now],
    )
    .map_err(|e| ServerError::DbError(format!("upsert user failed: {e}")))?;

    conn.query_row(
        "select id from users where external_id = ?",
        params![external_id],
        |r| r.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("select user id failed: {e}")))
}

/// Delete-on-remove handler. Removing an unknown id is a no-op: the
/// provider may replay deletions.
pub fn delete_user(conn: &Connection, external_id: &str) -> Result<(), ServerError> {
    conn.execute(
        "delete from users where external_id = ?",
        params![external_id],
    )
    .map_err(|e| ServerError::DbError(format!("delete user failed: {e}")))?;
    Ok(())
}

pub fn get_user_by_external_id(
    conn: &Connection,
    external_id: &str,
) -> Result<Option<User>, ServerError> {
    conn.query_row(
        "select id, external_id, name, email, image_url from users where external_id = ?",
        params![external_id],
        |r| {
            Ok(User {
                id: r.get(0)?,
                external_id: r.get(1)?,
                name: r.get(2)?,
                email: r.get(3)?,
                image_url: r.get(4)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user failed: {e}")))
}
