use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::rand_core::OsRng;
use password_hash::SaltString;
use rusqlite::Connection;

use crate::error::PlayerDbError;

/// An account record.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub karma: i64,
    pub created_at: String,
    pub last_login: Option<String>,
}

/// Repository for account operations.
pub struct AccountRepo<'a> {
    conn: &'a Connection,
}

impl<'a> AccountRepo<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new account with the given username and password. Password
    /// strength is the caller's policy.
    pub fn create(&self, username: &str, password: &str, ip: &str) -> Result<Account, PlayerDbError> {
        if self.get_by_username(username)?.is_some() {
            return Err(PlayerDbError::AccountExists(username.to_string()));
        }

        let password_hash = hash_password(password)?;

        self.conn.execute(
            "INSERT INTO accounts (username, password_hash, last_login, last_ip) VALUES (?1, ?2, datetime('now'), ?3)",
            rusqlite::params![username, password_hash, ip],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(account_id = id, username, ip, "account created");

        Ok(Account {
            id,
            username: username.to_string(),
            karma: 0,
            created_at: String::new(),
            last_login: None,
        })
    }

    /// Authenticate with username and password. Returns the account on success.
    pub fn authenticate(&self, username: &str, password: &str, ip: &str) -> Result<Account, PlayerDbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, password_hash, karma, created_at, last_login FROM accounts WHERE username = ?1",
        )?;

        let result = stmt.query_row(rusqlite::params![username], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        });

        let (id, username, password_hash, karma, created_at, last_login) = match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(PlayerDbError::AccountNotFound(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = verify_password(password, &password_hash) {
            tracing::warn!(account_id = id, ip, "failed login attempt");
            return Err(e);
        }

        self.conn.execute(
            "UPDATE accounts SET last_login = datetime('now'), last_ip = ?1 WHERE id = ?2",
            rusqlite::params![ip, id],
        )?;

        Ok(Account {
            id,
            username,
            karma,
            created_at,
            last_login,
        })
    }

    /// Get an account by username (case-insensitive).
    pub fn get_by_username(&self, username: &str) -> Result<Option<Account>, PlayerDbError> {
        self.query_one(
            "SELECT id, username, karma, created_at, last_login FROM accounts WHERE username = ?1",
            rusqlite::params![username],
        )
    }

    pub fn get(&self, id: i64) -> Result<Option<Account>, PlayerDbError> {
        self.query_one(
            "SELECT id, username, karma, created_at, last_login FROM accounts WHERE id = ?1",
            rusqlite::params![id],
        )
    }

    pub fn set_karma(&self, id: i64, karma: i64) -> Result<(), PlayerDbError> {
        let rows = self.conn.execute(
            "UPDATE accounts SET karma = ?1 WHERE id = ?2",
            rusqlite::params![karma, id],
        )?;
        if rows == 0 {
            return Err(PlayerDbError::AccountNotFound(id.to_string()));
        }
        Ok(())
    }

    fn query_one(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Option<Account>, PlayerDbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let result = stmt.query_row(params, |row| {
            Ok(Account {
                id: row.get(0)?,
                username: row.get(1)?,
                karma: row.get(2)?,
                created_at: row.get(3)?,
                last_login: row.get(4)?,
            })
        });

        match result {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn hash_password(password: &str) -> Result<String, PlayerDbError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PlayerDbError::HashError(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<(), PlayerDbError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PlayerDbError::HashError(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PlayerDbError::InvalidPassword)
}
