//! SQLite-backed collaborator: the server's `GameHost` over `player_db`.

use mud::chargen::draft::CharacterSheet;
use mud::error::{AuthError, HostError};
use mud::host::{
    AccountGate, AccountId, AccountRef, CharacterId, CharacterVault, NameDirectory, PendingCharacter,
    PlayableCharacter, MIN_PASSWORD_LEN,
};
use mud::roster::RosterEntry;
use player_db::{CommitRecord, PlayerDb, PlayerDbError, RosterRecord};

pub struct DbHost {
    db: PlayerDb,
}

impl DbHost {
    pub fn new(db: PlayerDb) -> Self {
        Self { db }
    }
}

fn storage(e: PlayerDbError) -> HostError {
    match e {
        PlayerDbError::Database(_) | PlayerDbError::HashError(_) | PlayerDbError::Serde(_) => {
            HostError::Storage(e.to_string())
        }
        other => HostError::Rejected(other.to_string()),
    }
}

fn auth(e: PlayerDbError) -> AuthError {
    match e {
        PlayerDbError::AccountNotFound(_) | PlayerDbError::InvalidPassword => AuthError::InvalidCredentials,
        PlayerDbError::AccountExists(name) => AuthError::UsernameTaken(name),
        other => AuthError::Storage(other.to_string()),
    }
}

fn roster_entry(record: RosterRecord) -> RosterEntry {
    RosterEntry {
        name: record.name,
        tier: u8::try_from(record.tier).unwrap_or(0),
        archetype: record.archetype,
        modifier: record.modifier,
    }
}

/// A lookup failure counts as taken, so a broken directory never lets a
/// duplicate name through.
fn taken_or_closed(result: Result<bool, PlayerDbError>) -> bool {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "name directory lookup failed");
        true
    })
}

impl NameDirectory for DbHost {
    fn full_name_taken(&self, first: &str, last: &str, except: Option<CharacterId>) -> bool {
        taken_or_closed(self.db.character().full_name_taken(first, last, except.map(|c| c.0)))
    }

    fn codename_taken(&self, name: &str, except: Option<CharacterId>) -> bool {
        taken_or_closed(self.db.character().codename_taken(name, except.map(|c| c.0)))
    }
}

impl AccountGate for DbHost {
    fn account_exists(&self, username: &str) -> Result<bool, HostError> {
        Ok(self.db.account().get_by_username(username).map_err(storage)?.is_some())
    }

    fn create_account(&mut self, username: &str, password: &str, address: &str) -> Result<AccountRef, AuthError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword { min: MIN_PASSWORD_LEN });
        }
        let account = self.db.account().create(username, password, address).map_err(auth)?;
        Ok(AccountRef {
            id: AccountId(account.id),
            username: account.username,
        })
    }

    fn authenticate(&mut self, username: &str, password: &str, address: &str) -> Result<AccountRef, AuthError> {
        let account = self.db.account().authenticate(username, password, address).map_err(auth)?;
        Ok(AccountRef {
            id: AccountId(account.id),
            username: account.username,
        })
    }

    fn find_playable(&self, account: AccountId, name: &str) -> Result<Option<PlayableCharacter>, HostError> {
        let record = self.db.character().find_playable(account.0, name.trim()).map_err(storage)?;
        Ok(record.map(|r| PlayableCharacter {
            id: CharacterId(r.id),
            name: r.key,
        }))
    }

    fn roster(&self, account: AccountId) -> Result<Vec<RosterEntry>, HostError> {
        let records = self.db.roster().list_for_account(account.0).map_err(storage)?;
        Ok(records.into_iter().map(roster_entry).collect())
    }
}

impl CharacterVault for DbHost {
    fn names(&self) -> &dyn NameDirectory {
        self
    }

    fn karma(&self, account: AccountId) -> Result<i64, HostError> {
        self.db
            .account()
            .get(account.0)
            .map_err(storage)?
            .map(|a| a.karma)
            .ok_or_else(|| HostError::Rejected(format!("unknown account {}", account.0)))
    }

    fn character_count(&self, account: AccountId) -> Result<usize, HostError> {
        Ok(self.db.character().list_for_account(account.0).map_err(storage)?.len())
    }

    fn in_progress(&self, account: AccountId) -> Result<Option<PendingCharacter>, HostError> {
        let record = self.db.character().in_progress(account.0).map_err(storage)?;
        Ok(record.and_then(|r| {
            r.chargen_step.map(|step| PendingCharacter {
                id: CharacterId(r.id),
                key: r.key,
                step,
            })
        }))
    }

    fn create_placeholder(&mut self, account: AccountId, key: &str, step: &str) -> Result<CharacterId, HostError> {
        let record = self.db.character().create_placeholder(account.0, key, step).map_err(storage)?;
        Ok(CharacterId(record.id))
    }

    fn set_chargen_step(&mut self, character: CharacterId, step: &str) -> Result<(), HostError> {
        self.db.character().set_chargen_step(character.0, Some(step)).map_err(storage)
    }

    fn commit(&mut self, character: CharacterId, sheet: &CharacterSheet, entry: &RosterEntry) -> Result<(), HostError> {
        let record = CommitRecord {
            key: sheet.full_name(),
            first_name: sheet.first_name.clone(),
            last_name: sheet.last_name.clone(),
            sheet: serde_json::to_value(sheet).map_err(|e| HostError::Storage(e.to_string()))?,
        };
        let roster = RosterRecord {
            name: entry.name.clone(),
            tier: i64::from(entry.tier),
            archetype: entry.archetype.clone(),
            modifier: entry.modifier.clone(),
        };
        self.db.character().commit(character.0, &record, &roster).map_err(storage)
    }
}
