//! Test fixture creation for the user and prompt databases

use super::constants::*;
use anyhow::Result;
use prompts_server::prompts::{
    PromptReminder, PromptStore, ReminderNotifier, SqlitePromptStore,
};
use prompts_server::user::{AuthToken, AuthTokenValue, SqliteUserStore, UserRole, UserStore};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;
use tempfile::TempDir;

/// Ids of the users created by [`create_test_db_with_users`].
pub struct TestUserIds {
    pub admin: usize,
    pub regular: usize,
}

fn add_user_with_token(
    store: &SqliteUserStore,
    handle: &str,
    role: UserRole,
    token: &str,
) -> Result<usize> {
    let user_id = store.create_user(handle)?;
    store.add_user_role(user_id, role)?;
    store.add_auth_token(&AuthToken {
        user_id,
        value: AuthTokenValue(token.to_string()),
        created: SystemTime::now(),
        last_used: None,
    })?;
    Ok(user_id)
}

/// Creates a temporary db directory with one admin and one regular user, each
/// holding a known session token.
/// Returns (temp_dir, user_db_path, prompts_db_path, user ids)
pub fn create_test_db_with_users() -> Result<(TempDir, PathBuf, PathBuf, TestUserIds)> {
    let dir = TempDir::new()?;
    let user_db_path = dir.path().join("user.db");
    let prompts_db_path = dir.path().join("prompts.db");

    let store = SqliteUserStore::new(&user_db_path)?;
    let admin = add_user_with_token(&store, ADMIN_USER, UserRole::Admin, ADMIN_TOKEN)?;
    let regular = add_user_with_token(&store, TEST_USER, UserRole::Regular, TEST_USER_TOKEN)?;

    // Creates the schema up front.
    let _prompts = SqlitePromptStore::new(&prompts_db_path)?;

    Ok((dir, user_db_path, prompts_db_path, TestUserIds { admin, regular }))
}

/// Adds a prompt due `due_offset_secs` from now (negative means overdue).
pub fn add_prompt(
    store: &dyn PromptStore,
    user_id: usize,
    text: &str,
    due_offset_secs: i64,
) -> Result<i64> {
    let due_at = chrono::Utc::now().timestamp() + due_offset_secs;
    store.add_prompt(user_id, text, due_at)
}

/// Notifier that keeps every reminder in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    pub reminders: Mutex<Vec<PromptReminder>>,
}

impl RecordingNotifier {
    pub fn reminded_prompt_ids(&self) -> Vec<i64> {
        self.reminders
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt_id)
            .collect()
    }
}

impl ReminderNotifier for RecordingNotifier {
    fn notify(&self, reminder: &PromptReminder) -> Result<()> {
        self.reminders.lock().unwrap().push(reminder.clone());
        Ok(())
    }
}
