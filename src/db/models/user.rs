//! User and session models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. Administrators share the table with regular
/// members; `is_admin` is the stored flag (0 or 1).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub password_hash: String,
    pub is_admin: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A server-side login session. `token_hash` is the SHA-256 of the
/// random token held by the browser; `scope` separates member logins
/// from admin logins.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub scope: String,
    pub token_hash: String,
    pub created_at: String,
}
