use rusqlite::Connection;

use crate::error::PlayerDbError;

pub fn create_tables(conn: &Connection) -> Result<(), PlayerDbError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS accounts (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash TEXT NOT NULL,
            karma         INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL DEFAULT (datetime('now')),
            last_login    TEXT,
            last_ip       TEXT
        );

        CREATE TABLE IF NOT EXISTS characters (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id   INTEGER NOT NULL REFERENCES accounts(id),
            key          TEXT NOT NULL UNIQUE COLLATE NOCASE,
            first_name   TEXT NOT NULL DEFAULT '' COLLATE NOCASE,
            last_name    TEXT NOT NULL DEFAULT '' COLLATE NOCASE,
            codename1    TEXT COLLATE NOCASE,
            codename2    TEXT COLLATE NOCASE,
            chargen_step TEXT,
            sheet        TEXT NOT NULL DEFAULT '{}',
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS roster (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id   INTEGER NOT NULL REFERENCES accounts(id),
            character_id INTEGER NOT NULL REFERENCES characters(id),
            name         TEXT NOT NULL,
            tier         INTEGER NOT NULL,
            archetype    TEXT NOT NULL,
            modifier     TEXT,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}
