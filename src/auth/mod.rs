pub mod guard;
pub mod password;
pub mod sessions;

pub use sessions::{SessionScope, SessionStore};
