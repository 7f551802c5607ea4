//! Account service: registration, credential checks, profile edits and
//! the admin roster operations. All handlers go through this layer;
//! none of them touch SQL directly.

pub mod store;

use thiserror::Error;
use tracing::{debug, info};

use crate::auth::password::{self, HashError};
use crate::db::User;
use store::{StoreError, UserStore};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("no account with that email")]
    NotFound,
    #[error("password does not match")]
    WrongPassword,
    #[error("account is not an administrator")]
    NotAdmin,
    #[error("{0}")]
    Validation(&'static str),
    #[error(transparent)]
    Hashing(#[from] HashError),
    #[error("store failure: {0}")]
    Store(sqlx::Error),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AccountError::DuplicateEmail,
            StoreError::Database(err) => AccountError::Store(err),
        }
    }
}

#[derive(Clone)]
pub struct AccountService {
    users: UserStore,
}

impl AccountService {
    pub fn new(users: UserStore) -> Self {
        Self { users }
    }

    /// Create a regular member account. Every field is required; the
    /// email must not collide with an existing record.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        contact: &str,
        password: &str,
    ) -> Result<User, AccountError> {
        if name.is_empty() || email.is_empty() || contact.is_empty() || password.is_empty() {
            return Err(AccountError::Validation("all fields are required"));
        }
        self.create(name, email, contact, password, false).await
    }

    /// Check an email/password pair. `require_admin` additionally
    /// demands the admin flag, for the dashboard login.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
        require_admin: bool,
    ) -> Result<User, AccountError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AccountError::NotFound)?;

        if !password::verify(password, &user.password_hash)? {
            return Err(AccountError::WrongPassword);
        }
        if require_admin && user.is_admin == 0 {
            return Err(AccountError::NotAdmin);
        }
        Ok(user)
    }

    pub async fn find(&self, id: &str) -> Result<Option<User>, AccountError> {
        Ok(self.users.find_by_id(id).await?)
    }

    /// Update name, email and contact of a record. The password and
    /// the admin flag are left alone.
    pub async fn update_profile(
        &self,
        id: &str,
        name: &str,
        email: &str,
        contact: &str,
    ) -> Result<User, AccountError> {
        let updated_at = chrono::Utc::now().to_rfc3339();
        let updated = self
            .users
            .update_contact_details(id, name, email, contact, &updated_at)
            .await?;
        if !updated {
            return Err(AccountError::NotFound);
        }
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    /// Remove a record. Ids that are already gone are ignored.
    pub async fn delete(&self, id: &str) -> Result<(), AccountError> {
        self.users.delete(id).await?;
        info!(user_id = %id, "deleted user record");
        Ok(())
    }

    /// All member records for the dashboard, sorted by name.
    pub async fn list(&self) -> Result<Vec<User>, AccountError> {
        Ok(self.users.list_members().await?)
    }

    /// Name search over member records. The query is stripped down to
    /// ASCII alphanumerics before it reaches the database, so LIKE
    /// metacharacters in user input have no effect.
    pub async fn search(&self, raw_query: &str) -> Result<Vec<User>, AccountError> {
        let fragment = sanitize_query(raw_query);
        Ok(self.users.search_members(&fragment).await?)
    }

    /// Make sure the configured administrator account exists. Called
    /// once at startup; an existing account is left untouched.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<(), AccountError> {
        if self.users.find_by_email(email).await?.is_some() {
            debug!(email = %email, "administrator account already present");
            return Ok(());
        }
        let admin = self.create("Administrator", email, "", password, true).await?;
        info!(user_id = %admin.id, email = %email, "seeded administrator account");
        Ok(())
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        contact: &str,
        password: &str,
        admin: bool,
    ) -> Result<User, AccountError> {
        let password_hash = password::hash(password)?;
        let now = chrono::Utc::now().to_rfc3339();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            contact: contact.to_string(),
            password_hash,
            is_admin: admin as i64,
            created_at: now.clone(),
            updated_at: now,
        };
        self.users.insert(&user).await?;
        info!(user_id = %user.id, email = %user.email, "created account");
        Ok(user)
    }
}

/// Strip everything but ASCII letters and digits from a search query.
fn sanitize_query(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn service() -> AccountService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::migrate(&pool).await.unwrap();
        AccountService::new(UserStore::new(pool))
    }

    #[tokio::test]
    async fn register_then_verify() {
        let svc = service().await;
        let user = svc
            .register("Ann", "ann@example.com", "555-0100", "secret")
            .await
            .unwrap();
        assert_eq!(user.is_admin, 0);
        assert_ne!(user.password_hash, "secret");

        let verified = svc
            .verify_credentials("ann@example.com", "secret", false)
            .await
            .unwrap();
        assert_eq!(verified.id, user.id);
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let svc = service().await;
        let err = svc.register("Ann", "", "555-0100", "secret").await.unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_registration_keeps_the_original() {
        let svc = service().await;
        svc.register("Ann", "ann@example.com", "555-0100", "secret")
            .await
            .unwrap();
        let err = svc
            .register("Impostor", "ann@example.com", "555-0199", "other")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::DuplicateEmail));

        let kept = svc
            .verify_credentials("ann@example.com", "secret", false)
            .await
            .unwrap();
        assert_eq!(kept.name, "Ann");
    }

    #[tokio::test]
    async fn racing_registrations_admit_exactly_one() {
        let svc = service().await;
        let a = svc.register("Ann", "race@example.com", "1", "pw-a");
        let b = svc.register("Ann B", "race@example.com", "2", "pw-b");
        let (ra, rb) = tokio::join!(a, b);
        assert_eq!(ra.is_ok() as u8 + rb.is_ok() as u8, 1);
        let err = if ra.is_err() { ra.unwrap_err() } else { rb.unwrap_err() };
        assert!(matches!(err, AccountError::DuplicateEmail));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_distinct() {
        let svc = service().await;
        svc.register("Ann", "ann@example.com", "555-0100", "secret")
            .await
            .unwrap();

        let err = svc
            .verify_credentials("ann@example.com", "wrong", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::WrongPassword));

        let err = svc
            .verify_credentials("nobody@example.com", "secret", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotFound));
    }

    #[tokio::test]
    async fn admin_check_rejects_regular_members() {
        let svc = service().await;
        svc.register("Ann", "ann@example.com", "555-0100", "secret")
            .await
            .unwrap();
        let err = svc
            .verify_credentials("ann@example.com", "secret", true)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotAdmin));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent_and_grants_the_flag() {
        let svc = service().await;
        svc.ensure_admin("root@example.com", "adminpw").await.unwrap();
        svc.ensure_admin("root@example.com", "changed-later").await.unwrap();

        // the original password still works; the second call was a no-op
        let admin = svc
            .verify_credentials("root@example.com", "adminpw", true)
            .await
            .unwrap();
        assert_eq!(admin.is_admin, 1);
    }

    #[tokio::test]
    async fn admins_never_show_up_in_listings_or_search() {
        let svc = service().await;
        svc.ensure_admin("root@example.com", "adminpw").await.unwrap();
        svc.register("Ann", "ann@example.com", "555-0100", "secret")
            .await
            .unwrap();

        let all = svc.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Ann");

        let hits = svc.search("administrator").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn search_strips_non_alphanumerics() {
        let svc = service().await;
        svc.register("Alice", "alice@example.com", "555-0100", "pw")
            .await
            .unwrap();
        svc.register("Bob", "bob@example.com", "555-0101", "pw")
            .await
            .unwrap();

        // "%" would otherwise match everything through LIKE
        let hits = svc.search(" a%l_i-c ").await.unwrap();
        let names: Vec<&str> = hits.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Alice"]);
    }

    #[tokio::test]
    async fn update_profile_leaves_password_and_flag_alone() {
        let svc = service().await;
        let user = svc
            .register("Ann", "ann@example.com", "555-0100", "secret")
            .await
            .unwrap();

        let updated = svc
            .update_profile(&user.id, "Ann Smith", "ann.smith@example.com", "555-0200")
            .await
            .unwrap();
        assert_eq!(updated.name, "Ann Smith");
        assert_eq!(updated.email, "ann.smith@example.com");
        assert_eq!(updated.contact, "555-0200");
        assert_eq!(updated.password_hash, user.password_hash);
        assert_eq!(updated.is_admin, 0);

        // the old login keeps working with the new email
        svc.verify_credentials("ann.smith@example.com", "secret", false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_profile_to_taken_email_fails() {
        let svc = service().await;
        let ann = svc
            .register("Ann", "ann@example.com", "555-0100", "pw")
            .await
            .unwrap();
        svc.register("Bob", "bob@example.com", "555-0101", "pw")
            .await
            .unwrap();

        let err = svc
            .update_profile(&ann.id, "Ann", "bob@example.com", "555-0100")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::DuplicateEmail));
    }

    #[tokio::test]
    async fn update_of_a_vanished_record_is_not_found() {
        let svc = service().await;
        let err = svc
            .update_profile("gone", "X", "x@example.com", "1")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotFound));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let svc = service().await;
        let user = svc
            .register("Ann", "ann@example.com", "555-0100", "pw")
            .await
            .unwrap();
        svc.delete(&user.id).await.unwrap();
        svc.delete(&user.id).await.unwrap();
        assert!(svc.find(&user.id).await.unwrap().is_none());
    }
}
