//! SQLite-backed admin store.

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::Path;

use crate::record::{
    GrantFields, GrantId, GrantRecord, GroupFields, GroupId, GroupRecord, NameFields, NameId,
    NameRecord,
};
use crate::{Error, Result};

/// SQLite-backed store for names, groups, and permission grants.
pub struct AdminStore {
    conn: Connection,
}

impl AdminStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS names (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                email TEXT,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS groups (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS group_object_permissions (
                id INTEGER PRIMARY KEY,
                group_id INTEGER NOT NULL REFERENCES groups(id),
                capability TEXT NOT NULL,
                object_pk TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_grants_group
                ON group_object_permissions(group_id);
            "#,
        )?;
        Ok(())
    }

    // --- names ---

    /// All name records, ordered by id ascending.
    pub fn list_names(&self) -> Result<Vec<NameRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, full_name, email, password_hash, created_at
             FROM names ORDER BY id",
        )?;
        let rows = stmt.query_map([], name_from_row)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Fetch a single name record.
    pub fn get_name(&self, id: NameId) -> Result<NameRecord> {
        self.conn
            .query_row(
                "SELECT id, username, full_name, email, password_hash, created_at
                 FROM names WHERE id = ?1",
                [id.0],
                name_from_row,
            )
            .map_err(|e| not_found(e, format!("name {id}")))
    }

    /// Insert a name record, returning it with its generated id.
    pub fn insert_name(&self, fields: NameFields) -> Result<NameRecord> {
        self.conn.execute(
            "INSERT INTO names (username, full_name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                fields.username,
                fields.full_name,
                fields.email,
                fields.password_hash,
                Utc::now().to_rfc3339(),
            ],
        )?;
        self.get_name(NameId(self.conn.last_insert_rowid()))
    }

    /// Replace the writable fields of an existing name record.
    pub fn update_name(&self, id: NameId, fields: NameFields) -> Result<NameRecord> {
        let changed = self.conn.execute(
            "UPDATE names SET username = ?1, full_name = ?2, email = ?3, password_hash = ?4
             WHERE id = ?5",
            params![
                fields.username,
                fields.full_name,
                fields.email,
                fields.password_hash,
                id.0,
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("name {id}")));
        }
        self.get_name(id)
    }

    /// Delete one name record, failing if it does not exist.
    pub fn delete_name(&self, id: NameId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM names WHERE id = ?1", [id.0])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("name {id}")));
        }
        Ok(())
    }

    /// Delete every name record whose id is in `ids`, returning the count
    /// removed. The id set is bound as placeholders, never interpolated.
    pub fn delete_names_in(&self, ids: &[NameId]) -> Result<usize> {
        self.delete_in("names", ids.iter().map(|id| id.0))
    }

    // --- groups ---

    /// All group records, ordered by id ascending.
    pub fn list_groups(&self) -> Result<Vec<GroupRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at FROM groups ORDER BY id",
        )?;
        let rows = stmt.query_map([], group_from_row)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Fetch a single group record.
    pub fn get_group(&self, id: GroupId) -> Result<GroupRecord> {
        self.conn
            .query_row(
                "SELECT id, name, description, created_at FROM groups WHERE id = ?1",
                [id.0],
                group_from_row,
            )
            .map_err(|e| not_found(e, format!("group {id}")))
    }

    /// Insert a group record, returning it with its generated id.
    pub fn insert_group(&self, fields: GroupFields) -> Result<GroupRecord> {
        self.conn.execute(
            "INSERT INTO groups (name, description, created_at) VALUES (?1, ?2, ?3)",
            params![fields.name, fields.description, Utc::now().to_rfc3339()],
        )?;
        self.get_group(GroupId(self.conn.last_insert_rowid()))
    }

    /// Replace the writable fields of an existing group record.
    pub fn update_group(&self, id: GroupId, fields: GroupFields) -> Result<GroupRecord> {
        let changed = self.conn.execute(
            "UPDATE groups SET name = ?1, description = ?2 WHERE id = ?3",
            params![fields.name, fields.description, id.0],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("group {id}")));
        }
        self.get_group(id)
    }

    /// Delete one group record, failing if it does not exist.
    pub fn delete_group(&self, id: GroupId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM groups WHERE id = ?1", [id.0])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("group {id}")));
        }
        Ok(())
    }

    /// Delete every group record whose id is in `ids`.
    pub fn delete_groups_in(&self, ids: &[GroupId]) -> Result<usize> {
        self.delete_in("groups", ids.iter().map(|id| id.0))
    }

    // --- grants ---

    /// All grant records, ordered by id ascending.
    pub fn list_grants(&self) -> Result<Vec<GrantRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, group_id, capability, object_pk, created_at
             FROM group_object_permissions ORDER BY id",
        )?;
        let rows = stmt.query_map([], grant_from_row)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Fetch a single grant record.
    pub fn get_grant(&self, id: GrantId) -> Result<GrantRecord> {
        self.conn
            .query_row(
                "SELECT id, group_id, capability, object_pk, created_at
                 FROM group_object_permissions WHERE id = ?1",
                [id.0],
                grant_from_row,
            )
            .map_err(|e| not_found(e, format!("grant {id}")))
    }

    /// Insert a grant record. The referenced group must already exist:
    /// grants are created only by explicit assignment.
    pub fn insert_grant(&self, fields: GrantFields) -> Result<GrantRecord> {
        self.get_group(fields.group_id)?;
        self.conn.execute(
            "INSERT INTO group_object_permissions (group_id, capability, object_pk, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                fields.group_id.0,
                fields.capability,
                fields.object_pk,
                Utc::now().to_rfc3339(),
            ],
        )?;
        self.get_grant(GrantId(self.conn.last_insert_rowid()))
    }

    /// Replace the writable fields of an existing grant record.
    pub fn update_grant(&self, id: GrantId, fields: GrantFields) -> Result<GrantRecord> {
        self.get_group(fields.group_id)?;
        let changed = self.conn.execute(
            "UPDATE group_object_permissions
             SET group_id = ?1, capability = ?2, object_pk = ?3 WHERE id = ?4",
            params![fields.group_id.0, fields.capability, fields.object_pk, id.0],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("grant {id}")));
        }
        self.get_grant(id)
    }

    /// Delete one grant record, failing if it does not exist.
    pub fn delete_grant(&self, id: GrantId) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM group_object_permissions WHERE id = ?1",
            [id.0],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("grant {id}")));
        }
        Ok(())
    }

    /// Delete every grant record whose id is in `ids`.
    pub fn delete_grants_in(&self, ids: &[GrantId]) -> Result<usize> {
        self.delete_in("group_object_permissions", ids.iter().map(|id| id.0))
    }

    fn delete_in(&self, table: &str, ids: impl ExactSizeIterator<Item = i64>) -> Result<usize> {
        if ids.len() == 0 {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM {table} WHERE id IN ({placeholders})");
        Ok(self.conn.execute(&sql, params_from_iter(ids))?)
    }
}

fn not_found(e: rusqlite::Error, what: String) -> Error {
    match e {
        rusqlite::Error::QueryReturnedNoRows => Error::NotFound(what),
        other => Error::Database(other),
    }
}

fn name_from_row(row: &Row<'_>) -> rusqlite::Result<NameRecord> {
    Ok(NameRecord {
        id: NameId(row.get(0)?),
        username: row.get(1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
        password_hash: row.get(4)?,
        created_at: parse_timestamp(5, row.get(5)?)?,
    })
}

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<GroupRecord> {
    Ok(GroupRecord {
        id: GroupId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_timestamp(3, row.get(3)?)?,
    })
}

fn grant_from_row(row: &Row<'_>) -> rusqlite::Result<GrantRecord> {
    Ok(GrantRecord {
        id: GrantId(row.get(0)?),
        group_id: GroupId(row.get(1)?),
        capability: row.get(2)?,
        object_pk: row.get(3)?,
        created_at: parse_timestamp(4, row.get(4)?)?,
    })
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    raw.parse().map_err(|e: chrono::ParseError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
