use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use crate::user::{AuthToken, AuthTokenValue, UserRole, UserStore};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::debug;

const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_handle", "handle")],
};

const USER_ROLE_TABLE_V_0: Table = Table {
    name: "user_role",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("role", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["user_id", "role"]],
    indices: &[],
};

const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[("idx_auth_token_value", "value")],
};

const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[USER_TABLE_V_0, USER_ROLE_TABLE_V_0, AUTH_TOKEN_TABLE_V_0],
    migration: None,
}];

fn system_time_from_secs(secs: i64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned(db_path.as_ref(), VERSIONED_SCHEMAS)
            .with_context(|| format!("Failed to open user db at {:?}", db_path.as_ref()))?;
        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, user_handle: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("INSERT INTO {} (handle) VALUES (?1)", USER_TABLE_V_0.name),
            params![user_handle],
        )
        .with_context(|| format!("Failed to create user {}", user_handle))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                &format!("SELECT id FROM {} WHERE handle = ?1", USER_TABLE_V_0.name),
                params![user_handle],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|id| id as usize))
    }

    fn get_user_handle(&self, user_id: usize) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let handle = conn
            .query_row(
                &format!("SELECT handle FROM {} WHERE id = ?1", USER_TABLE_V_0.name),
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(handle)
    }

    fn add_user_role(&self, user_id: usize, role: UserRole) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (user_id, role) VALUES (?1, ?2)",
                USER_ROLE_TABLE_V_0.name
            ),
            params![user_id, role.as_str()],
        )
        .with_context(|| format!("Failed to add role {} to user {}", role, user_id))?;
        Ok(())
    }

    fn get_user_roles(&self, user_id: usize) -> Result<Vec<UserRole>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT role FROM {} WHERE user_id = ?1 ORDER BY role",
            USER_ROLE_TABLE_V_0.name
        ))?;
        let raw_roles = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;

        let roles = raw_roles
            .iter()
            .filter_map(|raw| {
                let role = UserRole::from_str(raw);
                if role.is_none() {
                    debug!("Ignoring unknown role {} for user_id={}", raw, user_id);
                }
                role
            })
            .collect();
        Ok(roles)
    }

    fn add_auth_token(&self, token: &AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, value) VALUES (?1, ?2)",
                AUTH_TOKEN_TABLE_V_0.name
            ),
            params![token.user_id, token.value.0],
        )
        .with_context(|| format!("Failed to add auth token for user {}", token.user_id))?;
        Ok(())
    }

    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let token = conn
            .query_row(
                &format!(
                    "SELECT user_id, value, created, last_used FROM {} WHERE value = ?1",
                    AUTH_TOKEN_TABLE_V_0.name
                ),
                params![value.0],
                |row| {
                    Ok(AuthToken {
                        user_id: row.get::<_, i64>(0)? as usize,
                        value: AuthTokenValue(row.get(1)?),
                        created: system_time_from_secs(row.get(2)?),
                        last_used: row.get::<_, Option<i64>>(3)?.map(system_time_from_secs),
                    })
                },
            )
            .optional()?;
        Ok(token)
    }

    fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE {} SET last_used = ?1 WHERE value = ?2",
                AUTH_TOKEN_TABLE_V_0.name
            ),
            params![now_secs(), value.0],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_store() -> (TempDir, SqliteUserStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteUserStore::new(dir.path().join("user.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn creates_and_finds_users() {
        let (_dir, store) = make_store();

        let id = store.create_user("alice").unwrap();
        assert_eq!(store.get_user_id("alice").unwrap(), Some(id));
        assert_eq!(store.get_user_handle(id).unwrap(), Some("alice".to_string()));
        assert_eq!(store.get_user_id("bob").unwrap(), None);
        assert_eq!(store.get_user_handle(id + 100).unwrap(), None);
    }

    #[test]
    fn duplicate_handle_fails() {
        let (_dir, store) = make_store();
        store.create_user("alice").unwrap();
        assert!(store.create_user("alice").is_err());
    }

    #[test]
    fn roles_are_deduplicated() {
        let (_dir, store) = make_store();
        let id = store.create_user("alice").unwrap();

        assert!(store.get_user_roles(id).unwrap().is_empty());

        store.add_user_role(id, UserRole::Admin).unwrap();
        store.add_user_role(id, UserRole::Admin).unwrap();
        store.add_user_role(id, UserRole::Regular).unwrap();

        let roles = store.get_user_roles(id).unwrap();
        assert_eq!(roles, vec![UserRole::Admin, UserRole::Regular]);
    }

    #[test]
    fn auth_token_lifecycle() {
        let (_dir, store) = make_store();
        let id = store.create_user("alice").unwrap();
        let token = AuthToken::new_for_user(id);

        store.add_auth_token(&token).unwrap();

        let found = store.get_auth_token(&token.value).unwrap().unwrap();
        assert_eq!(found.user_id, id);
        assert!(found.last_used.is_none());

        store.update_auth_token_last_used(&token.value).unwrap();
        let found = store.get_auth_token(&token.value).unwrap().unwrap();
        assert!(found.last_used.is_some());

        let missing = AuthTokenValue("nope".to_string());
        assert!(store.get_auth_token(&missing).unwrap().is_none());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user.db");
        let id = {
            let store = SqliteUserStore::new(&path).unwrap();
            let id = store.create_user("alice").unwrap();
            store.add_user_role(id, UserRole::Admin).unwrap();
            id
        };

        let store = SqliteUserStore::new(&path).unwrap();
        assert_eq!(store.get_user_roles(id).unwrap(), vec![UserRole::Admin]);
    }
}
