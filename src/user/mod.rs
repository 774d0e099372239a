pub mod auth;
pub mod permissions;
mod sqlite_user_store;
mod user_store;

pub use auth::{AuthToken, AuthTokenValue};
pub use permissions::UserRole;
pub use sqlite_user_store::SqliteUserStore;
pub use user_store::UserStore;
