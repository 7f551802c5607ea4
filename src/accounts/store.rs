//! SQLite-backed persistence for user records.

use thiserror::Error;

use crate::db::{DbPool, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with this email already exists")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.message().contains("UNIQUE constraint failed: users.email") {
                return StoreError::DuplicateEmail;
            }
        }
        StoreError::Database(err)
    }
}

/// CRUD access to the `users` table. Email uniqueness is enforced by
/// the schema; the store only translates the constraint violation into
/// [`StoreError::DuplicateEmail`].
#[derive(Clone)]
pub struct UserStore {
    db: DbPool,
}

impl UserStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, contact, password_hash, is_admin, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.contact)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    /// Update the editable fields of a record. The password hash and
    /// the admin flag are never touched here. Returns `false` when no
    /// row matched the id.
    pub async fn update_contact_details(
        &self,
        id: &str,
        name: &str,
        email: &str,
        contact: &str,
        updated_at: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET name = ?, email = ?, contact = ?, updated_at = ? WHERE id = ?",
        )
        .bind(name)
        .bind(email)
        .bind(contact)
        .bind(updated_at)
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a record. Deleting an id that is already gone is a no-op.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// All non-admin records, sorted by name.
    pub async fn list_members(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as("SELECT * FROM users WHERE is_admin = 0 ORDER BY name ASC")
            .fetch_all(&self.db)
            .await?;
        Ok(users)
    }

    /// Non-admin records whose name contains `fragment`, matched
    /// case-insensitively, sorted by name. The caller is expected to
    /// have sanitized the fragment already.
    pub async fn search_members(&self, fragment: &str) -> Result<Vec<User>, StoreError> {
        let pattern = format!("%{}%", fragment);
        let users = sqlx::query_as(
            "SELECT * FROM users WHERE is_admin = 0 AND lower(name) LIKE lower(?) ORDER BY name ASC",
        )
        .bind(&pattern)
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }
}
