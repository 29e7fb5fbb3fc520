use rusqlite::{Connection, Row};
use serde_json::Value;

use crate::error::PlayerDbError;
use crate::roster::RosterRecord;

/// A character record from the database.
#[derive(Debug, Clone)]
pub struct CharacterRecord {
    pub id: i64,
    pub account_id: i64,
    pub key: String,
    pub first_name: String,
    pub last_name: String,
    pub codename1: Option<String>,
    pub codename2: Option<String>,
    /// Dialogue node the character's creation stopped at; `None` once committed.
    pub chargen_step: Option<String>,
    pub sheet: Value,
    pub created_at: String,
}

impl CharacterRecord {
    pub fn is_in_progress(&self) -> bool {
        self.chargen_step.is_some()
    }
}

/// Final identity and sheet written when character creation completes.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub key: String,
    pub first_name: String,
    pub last_name: String,
    pub sheet: Value,
}

const COLUMNS: &str =
    "id, account_id, key, first_name, last_name, codename1, codename2, chargen_step, sheet, created_at";

/// A row with its sheet still as stored text.
struct CharacterRow {
    record: CharacterRecord,
    sheet: String,
}

impl CharacterRow {
    fn decode(self) -> Result<CharacterRecord, PlayerDbError> {
        Ok(CharacterRecord {
            sheet: serde_json::from_str(&self.sheet)?,
            ..self.record
        })
    }
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<CharacterRow> {
    Ok(CharacterRow {
        record: CharacterRecord {
            id: row.get(0)?,
            account_id: row.get(1)?,
            key: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            codename1: row.get(5)?,
            codename2: row.get(6)?,
            chargen_step: row.get(7)?,
            sheet: Value::Null,
            created_at: row.get(9)?,
        },
        sheet: row.get(8)?,
    })
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Repository for character operations.
pub struct CharacterRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CharacterRepo<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create an in-progress character under a placeholder key.
    pub fn create_placeholder(
        &self,
        account_id: i64,
        key: &str,
        chargen_step: &str,
    ) -> Result<CharacterRecord, PlayerDbError> {
        if self.get_by_key(key)?.is_some() {
            return Err(PlayerDbError::CharacterKeyTaken(key.to_string()));
        }

        self.conn.execute(
            "INSERT INTO characters (account_id, key, chargen_step) VALUES (?1, ?2, ?3)",
            rusqlite::params![account_id, key, chargen_step],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(character_id = id, account_id, key, "placeholder character created");
        self.load(id)
    }

    /// The account's in-progress character, if any.
    pub fn in_progress(&self, account_id: i64) -> Result<Option<CharacterRecord>, PlayerDbError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM characters WHERE account_id = ?1 AND chargen_step IS NOT NULL ORDER BY id LIMIT 1"
        );
        self.query_optional(&sql, rusqlite::params![account_id])
    }

    pub fn set_chargen_step(&self, id: i64, step: Option<&str>) -> Result<(), PlayerDbError> {
        let rows = self.conn.execute(
            "UPDATE characters SET chargen_step = ?1 WHERE id = ?2",
            rusqlite::params![step, id],
        )?;
        if rows == 0 {
            return Err(PlayerDbError::CharacterNotFound(id));
        }
        Ok(())
    }

    /// List all characters for an account, in-progress ones included.
    pub fn list_for_account(&self, account_id: i64) -> Result<Vec<CharacterRecord>, PlayerDbError> {
        let sql = format!("SELECT {COLUMNS} FROM characters WHERE account_id = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params![account_id], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(CharacterRow::decode).collect()
    }

    /// Find a finished character of this account by key or first name (case-insensitive).
    pub fn find_playable(&self, account_id: i64, name: &str) -> Result<Option<CharacterRecord>, PlayerDbError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE account_id = ?1 AND chargen_step IS NULL AND (key = ?2 OR first_name = ?2)
             ORDER BY id LIMIT 1"
        );
        self.query_optional(&sql, rusqlite::params![account_id, name])
    }

    /// Load a character by ID.
    pub fn load(&self, id: i64) -> Result<CharacterRecord, PlayerDbError> {
        let sql = format!("SELECT {COLUMNS} FROM characters WHERE id = ?1");
        self.query_optional(&sql, rusqlite::params![id])?
            .ok_or(PlayerDbError::CharacterNotFound(id))
    }

    /// Get a character by key (case-insensitive).
    pub fn get_by_key(&self, key: &str) -> Result<Option<CharacterRecord>, PlayerDbError> {
        let sql = format!("SELECT {COLUMNS} FROM characters WHERE key = ?1");
        self.query_optional(&sql, rusqlite::params![key])
    }

    /// Whether another character already uses this first + last name.
    pub fn full_name_taken(&self, first: &str, last: &str, except: Option<i64>) -> Result<bool, PlayerDbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM characters WHERE first_name = ?1 AND last_name = ?2 AND id != ?3",
            rusqlite::params![first, last, except.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether another character uses `name` as either of its codenames.
    pub fn codename_taken(&self, name: &str, except: Option<i64>) -> Result<bool, PlayerDbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM characters WHERE (codename1 = ?1 OR codename2 = ?1) AND id != ?2",
            rusqlite::params![name, except.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Finish creation: write identity and sheet, clear the step marker and
    /// append the roster entry, all in one transaction.
    pub fn commit(&self, id: i64, record: &CommitRecord, entry: &RosterRecord) -> Result<(), PlayerDbError> {
        let current = self.load(id)?;
        if !current.is_in_progress() {
            return Err(PlayerDbError::AlreadyCommitted(id));
        }

        let sheet_str = serde_json::to_string(&record.sheet)?;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "UPDATE characters
             SET key = ?1, first_name = ?2, last_name = ?3, sheet = ?4, chargen_step = NULL
             WHERE id = ?5",
            rusqlite::params![record.key, record.first_name, record.last_name, sheet_str, id],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                PlayerDbError::CharacterKeyTaken(record.key.clone())
            } else {
                e.into()
            }
        })?;

        tx.execute(
            "INSERT INTO roster (account_id, character_id, name, tier, archetype, modifier)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                current.account_id,
                id,
                entry.name,
                entry.tier,
                entry.archetype,
                entry.modifier
            ],
        )?;

        tx.commit()?;
        tracing::info!(character_id = id, account_id = current.account_id, key = %record.key, "character committed");
        Ok(())
    }

    fn query_optional(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Option<CharacterRecord>, PlayerDbError> {
        let mut stmt = self.conn.prepare(sql)?;
        match stmt.query_row(params, from_row) {
            Ok(row) => row.decode().map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
