//! Administrative command line for the user and prompt databases.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use prompts_server::prompts::{PromptStore, SqlitePromptStore};
use prompts_server::user::{AuthToken, SqliteUserStore, UserRole, UserStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding user.db and prompts.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates a user with the given handle.
    AddUser { user_handle: String },

    /// Adds a role (Admin or Regular) to a user.
    AddRole { user_handle: String, role: String },

    /// Issues a new session token for a user and prints it.
    IssueToken { user_handle: String },

    /// Creates a prompt for a user, due in the given number of hours.
    AddPrompt {
        user_handle: String,
        text: String,
        #[clap(long, default_value_t = 24)]
        due_in_hours: i64,
    },

    /// Marks a prompt as answered, so it is no longer reminded.
    AnswerPrompt { prompt_id: i64 },
}

fn require_user_id(user_store: &dyn UserStore, user_handle: &str) -> Result<usize> {
    match user_store.get_user_id(user_handle)? {
        Some(id) => Ok(id),
        None => bail!("User {} not found", user_handle),
    }
}

fn execute(db_dir: &std::path::Path, command: Command) -> Result<()> {
    let user_store = SqliteUserStore::new(db_dir.join("user.db"))?;

    match command {
        Command::AddUser { user_handle } => {
            let id = user_store.create_user(&user_handle)?;
            println!("Created user {} with id {}", user_handle, id);
        }
        Command::AddRole { user_handle, role } => {
            let role = UserRole::from_str(&role)
                .with_context(|| format!("Unknown role {}, expected Admin or Regular", role))?;
            let user_id = require_user_id(&user_store, &user_handle)?;
            user_store.add_user_role(user_id, role)?;
            println!("User {} now has role {}", user_handle, role);
        }
        Command::IssueToken { user_handle } => {
            let user_id = require_user_id(&user_store, &user_handle)?;
            let token = AuthToken::new_for_user(user_id);
            user_store.add_auth_token(&token)?;
            println!("{}", token.value.0);
        }
        Command::AddPrompt {
            user_handle,
            text,
            due_in_hours,
        } => {
            let user_id = require_user_id(&user_store, &user_handle)?;
            let prompt_store = SqlitePromptStore::new(db_dir.join("prompts.db"))?;
            let due_at = (Utc::now() + Duration::hours(due_in_hours)).timestamp();
            let prompt_id = prompt_store.add_prompt(user_id, &text, due_at)?;
            println!("Created prompt {} for {}", prompt_id, user_handle);
        }
        Command::AnswerPrompt { prompt_id } => {
            let prompt_store = SqlitePromptStore::new(db_dir.join("prompts.db"))?;
            if !prompt_store.mark_answered(prompt_id, Utc::now().timestamp())? {
                bail!("Prompt {} not found or already answered", prompt_id);
            }
            println!("Prompt {} answered", prompt_id);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    if !cli_args.db_dir.is_dir() {
        bail!("Database directory does not exist: {:?}", cli_args.db_dir);
    }
    execute(&cli_args.db_dir, cli_args.command)
}
