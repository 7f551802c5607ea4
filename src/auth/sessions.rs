//! Server-side session store.
//!
//! A login creates a row keyed by the SHA-256 of a random token; the
//! browser holds only the token in a cookie. Member and admin logins
//! live in separate scopes with separate cookies, so an admin session
//! never opens the member area and vice versa. Sessions do not expire
//! on their own; they end at logout.

use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::db::{DbPool, Session};

#[derive(Debug, Error)]
#[error("session store failure: {0}")]
pub struct SessionError(#[from] sqlx::Error);

/// The two login namespaces. Each carries its own cookie and its own
/// redirect targets for the guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScope {
    User,
    Admin,
}

impl SessionScope {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionScope::User => "user",
            SessionScope::Admin => "admin",
        }
    }

    pub fn cookie_name(self) -> &'static str {
        match self {
            SessionScope::User => "rosterd_session",
            SessionScope::Admin => "rosterd_admin_session",
        }
    }

    /// Where an unauthenticated request in this scope is sent.
    pub fn login_route(self) -> &'static str {
        match self {
            SessionScope::User => "/login",
            SessionScope::Admin => "/admin",
        }
    }

    /// Where an already-signed-in visitor to a login page is sent.
    pub fn home_route(self) -> &'static str {
        match self {
            SessionScope::User => "/home",
            SessionScope::Admin => "/admin/home",
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    db: DbPool,
}

impl SessionStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Create a session for `user_id` and return the fresh token that
    /// goes into the cookie. The token itself is never stored.
    pub async fn open(&self, scope: SessionScope, user_id: &str) -> Result<String, SessionError> {
        let token = generate_token();
        let token_hash = hash_token(&token);
        let session_id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO sessions (id, user_id, scope, token_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&session_id)
        .bind(user_id)
        .bind(scope.as_str())
        .bind(&token_hash)
        .bind(&created_at)
        .execute(&self.db)
        .await?;

        debug!(user_id = %user_id, scope = scope.as_str(), "opened session");
        Ok(token)
    }

    /// Resolve a cookie token to the user id it was opened for, within
    /// one scope. Unknown or foreign-scope tokens resolve to `None`.
    pub async fn resolve(
        &self,
        scope: SessionScope,
        token: &str,
    ) -> Result<Option<String>, SessionError> {
        let token_hash = hash_token(token);
        let session: Option<Session> =
            sqlx::query_as("SELECT * FROM sessions WHERE scope = ? AND token_hash = ?")
                .bind(scope.as_str())
                .bind(&token_hash)
                .fetch_optional(&self.db)
                .await?;
        Ok(session.map(|s| s.user_id))
    }

    /// Delete the session behind a token. Deleting a token that no
    /// longer resolves is not an error.
    pub async fn destroy(&self, scope: SessionScope, token: &str) -> Result<(), SessionError> {
        let token_hash = hash_token(token);
        sqlx::query("DELETE FROM sessions WHERE scope = ? AND token_hash = ?")
            .bind(scope.as_str())
            .bind(&token_hash)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Generate a random token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn store() -> SessionStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::migrate(&pool).await.unwrap();
        SessionStore::new(pool)
    }

    #[tokio::test]
    async fn open_then_resolve_returns_the_user() {
        let store = store().await;
        let token = store.open(SessionScope::User, "u-1").await.unwrap();
        let resolved = store.resolve(SessionScope::User, &token).await.unwrap();
        assert_eq!(resolved.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn scopes_are_isolated() {
        let store = store().await;
        let token = store.open(SessionScope::User, "u-1").await.unwrap();
        let as_admin = store.resolve(SessionScope::Admin, &token).await.unwrap();
        assert_eq!(as_admin, None);
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let store = store().await;
        let resolved = store
            .resolve(SessionScope::User, "deadbeef")
            .await
            .unwrap();
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn destroy_ends_the_session() {
        let store = store().await;
        let token = store.open(SessionScope::Admin, "u-2").await.unwrap();
        store.destroy(SessionScope::Admin, &token).await.unwrap();
        let resolved = store.resolve(SessionScope::Admin, &token).await.unwrap();
        assert_eq!(resolved, None);

        // a second destroy of the same token is a no-op
        store.destroy(SessionScope::Admin, &token).await.unwrap();
    }

    #[tokio::test]
    async fn sessions_survive_for_a_deleted_user_id() {
        // No foreign key ties sessions to users; a session opened for a
        // row that later disappears still resolves, and the guards are
        // expected to handle the missing record downstream.
        let store = store().await;
        let token = store.open(SessionScope::User, "ghost").await.unwrap();
        let resolved = store.resolve(SessionScope::User, &token).await.unwrap();
        assert_eq!(resolved.as_deref(), Some("ghost"));
    }
}
