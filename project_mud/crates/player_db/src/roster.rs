use rusqlite::Connection;

use crate::error::PlayerDbError;

/// Display summary of a finished character. Rows are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRecord {
    pub name: String,
    pub tier: i64,
    pub archetype: String,
    pub modifier: Option<String>,
}

/// Repository for the per-account roster.
pub struct RosterRepo<'a> {
    conn: &'a Connection,
}

impl<'a> RosterRepo<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Roster entries for an account in the order they were appended.
    pub fn list_for_account(&self, account_id: i64) -> Result<Vec<RosterRecord>, PlayerDbError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, tier, archetype, modifier FROM roster WHERE account_id = ?1 ORDER BY id",
        )?;
        let records = stmt
            .query_map(rusqlite::params![account_id], |row| {
                Ok(RosterRecord {
                    name: row.get(0)?,
                    tier: row.get(1)?,
                    archetype: row.get(2)?,
                    modifier: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
