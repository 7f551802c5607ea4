pub mod accounts;
pub mod auth;
pub mod config;
pub mod db;
pub mod web;

pub use db::DbPool;

use accounts::{store::UserStore, AccountService};
use auth::SessionStore;

/// Shared state handed to every handler. The services are cheap clones
/// over the same connection pool.
pub struct AppState {
    pub accounts: AccountService,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        let accounts = AccountService::new(UserStore::new(db.clone()));
        let sessions = SessionStore::new(db);
        Self { accounts, sessions }
    }
}
