use super::auth::{AuthToken, AuthTokenValue};
use super::permissions::UserRole;
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns its id.
    fn create_user(&self, user_handle: &str) -> Result<usize>;

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>>;

    fn get_user_handle(&self, user_id: usize) -> Result<Option<String>>;

    /// Adding a role the user already has is a no-op.
    fn add_user_role(&self, user_id: usize, role: UserRole) -> Result<()>;

    fn get_user_roles(&self, user_id: usize) -> Result<Vec<UserRole>>;

    fn add_auth_token(&self, token: &AuthToken) -> Result<()>;

    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>>;

    fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()>;
}
