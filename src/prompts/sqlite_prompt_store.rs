use super::{Prompt, PromptStore};
use crate::sqlite_column;
use crate::sqlite_persistence::{open_versioned, Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

const PROMPT_TABLE_V_0: Table = Table {
    name: "prompt",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("user_id", &SqlType::Integer, non_null = true),
        sqlite_column!("text", &SqlType::Text, non_null = true),
        sqlite_column!("due_at", &SqlType::Integer, non_null = true),
        sqlite_column!("answered_at", &SqlType::Integer),
        sqlite_column!("reminded_at", &SqlType::Integer),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[
        ("idx_prompt_due_at", "due_at"),
        ("idx_prompt_user_id", "user_id"),
    ],
};

const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[PROMPT_TABLE_V_0],
    migration: None,
}];

const PROMPT_COLUMNS: &str = "id, user_id, text, due_at, answered_at, reminded_at";

fn prompt_from_row(row: &Row) -> rusqlite::Result<Prompt> {
    Ok(Prompt {
        id: row.get(0)?,
        user_id: row.get::<_, i64>(1)? as usize,
        text: row.get(2)?,
        due_at: row.get(3)?,
        answered_at: row.get(4)?,
        reminded_at: row.get(5)?,
    })
}

#[derive(Clone)]
pub struct SqlitePromptStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePromptStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned(db_path.as_ref(), VERSIONED_SCHEMAS)
            .with_context(|| format!("Failed to open prompts db at {:?}", db_path.as_ref()))?;
        Ok(SqlitePromptStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl PromptStore for SqlitePromptStore {
    fn add_prompt(&self, user_id: usize, text: &str, due_at: i64) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, text, due_at) VALUES (?1, ?2, ?3)",
                PROMPT_TABLE_V_0.name
            ),
            params![user_id, text, due_at],
        )
        .with_context(|| format!("Failed to add prompt for user {}", user_id))?;
        Ok(conn.last_insert_rowid())
    }

    fn get_prompt(&self, prompt_id: i64) -> Result<Option<Prompt>> {
        let conn = self.conn.lock().unwrap();
        let prompt = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    PROMPT_COLUMNS, PROMPT_TABLE_V_0.name
                ),
                params![prompt_id],
                prompt_from_row,
            )
            .optional()?;
        Ok(prompt)
    }

    fn mark_answered(&self, prompt_id: i64, answered_at: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET answered_at = ?1 WHERE id = ?2 AND answered_at IS NULL",
                PROMPT_TABLE_V_0.name
            ),
            params![answered_at, prompt_id],
        )?;
        Ok(updated > 0)
    }

    fn list_overdue_prompts(&self, now: i64) -> Result<Vec<Prompt>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} \
             WHERE due_at <= ?1 AND answered_at IS NULL AND reminded_at IS NULL \
             ORDER BY due_at, id",
            PROMPT_COLUMNS, PROMPT_TABLE_V_0.name
        ))?;
        let prompts = stmt
            .query_map(params![now], prompt_from_row)?
            .collect::<Result<Vec<Prompt>, _>>()?;
        Ok(prompts)
    }

    fn claim_reminder(&self, prompt_id: i64, reminded_at: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET reminded_at = ?1 WHERE id = ?2 AND reminded_at IS NULL",
                PROMPT_TABLE_V_0.name
            ),
            params![reminded_at, prompt_id],
        )?;
        Ok(updated == 1)
    }

    fn release_reminder(&self, prompt_id: i64, reminded_at: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE {} SET reminded_at = NULL WHERE id = ?1 AND reminded_at = ?2",
                PROMPT_TABLE_V_0.name
            ),
            params![prompt_id, reminded_at],
        )?;
        Ok(())
    }
}
