//! Collaborator capabilities the dialogues consume. The storage engine,
//! account authentication and the global name directory all live behind
//! these traits; `memory::MemoryHost` and the server's SQLite host implement
//! them.

use serde::{Deserialize, Serialize};

use crate::chargen::draft::CharacterSheet;
use crate::error::{AuthError, HostError};
use crate::roster::RosterEntry;

/// Shortest password a new account may use.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
    pub id: AccountId,
    pub username: String,
}

/// A finished character the account may puppet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableCharacter {
    pub id: CharacterId,
    pub name: String,
}

/// An account's unfinished character and the node its creation stopped at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCharacter {
    pub id: CharacterId,
    pub key: String,
    pub step: String,
}

/// Shared directory of names already in use by other characters.
///
/// Comparisons are case-insensitive. `except` excludes the character being
/// edited so it never collides with itself.
pub trait NameDirectory {
    fn full_name_taken(&self, first: &str, last: &str, except: Option<CharacterId>) -> bool;

    fn codename_taken(&self, name: &str, except: Option<CharacterId>) -> bool;
}

/// Account lookup and authentication used by the login dialogue.
pub trait AccountGate {
    fn account_exists(&self, username: &str) -> Result<bool, HostError>;

    fn create_account(&mut self, username: &str, password: &str, address: &str) -> Result<AccountRef, AuthError>;

    fn authenticate(&mut self, username: &str, password: &str, address: &str) -> Result<AccountRef, AuthError>;

    fn find_playable(&self, account: AccountId, name: &str) -> Result<Option<PlayableCharacter>, HostError>;

    fn roster(&self, account: AccountId) -> Result<Vec<RosterEntry>, HostError>;
}

/// Persistent character storage used by the creation dialogue.
pub trait CharacterVault {
    /// The name directory this store checks uniqueness against.
    fn names(&self) -> &dyn NameDirectory;

    fn karma(&self, account: AccountId) -> Result<i64, HostError>;

    /// All characters of the account, in-progress ones included.
    fn character_count(&self, account: AccountId) -> Result<usize, HostError>;

    fn in_progress(&self, account: AccountId) -> Result<Option<PendingCharacter>, HostError>;

    fn create_placeholder(&mut self, account: AccountId, key: &str, step: &str) -> Result<CharacterId, HostError>;

    fn set_chargen_step(&mut self, character: CharacterId, step: &str) -> Result<(), HostError>;

    /// Copy the sheet onto the character, clear its step marker and append
    /// the roster entry. Must apply entirely or not at all.
    fn commit(&mut self, character: CharacterId, sheet: &CharacterSheet, entry: &RosterEntry) -> Result<(), HostError>;
}

/// Everything a connection needs from its host.
pub trait GameHost: AccountGate + CharacterVault {}

impl<T: AccountGate + CharacterVault + ?Sized> GameHost for T {}
