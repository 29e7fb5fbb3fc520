//! In-memory collaborator. Backs the server when no database is configured
//! and serves as the injected fake in tests. Passwords are compared in
//! plain text and nothing survives a restart.

use crate::chargen::draft::CharacterSheet;
use crate::error::{AuthError, HostError};
use crate::host::{
    AccountGate, AccountId, AccountRef, CharacterId, CharacterVault, NameDirectory, PendingCharacter,
    PlayableCharacter, MIN_PASSWORD_LEN,
};
use crate::roster::RosterEntry;

#[derive(Debug, Clone)]
pub struct MemoryAccount {
    pub id: AccountId,
    pub username: String,
    password: String,
    pub karma: i64,
    pub roster: Vec<RosterEntry>,
    pub last_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredCharacter {
    pub id: CharacterId,
    /// `None` for characters no account owns, such as staff-made NPCs.
    pub account: Option<AccountId>,
    pub key: String,
    pub first_name: String,
    pub last_name: String,
    pub codenames: [String; 2],
    /// Creation node marker; `None` once committed.
    pub step: Option<String>,
    pub sheet: Option<CharacterSheet>,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    accounts: Vec<MemoryAccount>,
    characters: Vec<StoredCharacter>,
    next_id: i64,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn account_mut(&mut self, id: AccountId) -> Result<&mut MemoryAccount, HostError> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| HostError::Rejected(format!("unknown account {}", id.0)))
    }

    fn find_account(&self, id: AccountId) -> Result<&MemoryAccount, HostError> {
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| HostError::Rejected(format!("unknown account {}", id.0)))
    }

    fn key_in_use(&self, key: &str, except: Option<CharacterId>) -> bool {
        self.characters
            .iter()
            .any(|c| Some(c.id) != except && c.key.eq_ignore_ascii_case(key))
    }

    pub fn character(&self, id: CharacterId) -> Option<&StoredCharacter> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn characters(&self) -> &[StoredCharacter] {
        &self.characters
    }

    pub fn account(&self, id: AccountId) -> Option<&MemoryAccount> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn set_karma(&mut self, account: AccountId, karma: i64) -> Result<(), HostError> {
        self.account_mut(account)?.karma = karma;
        Ok(())
    }

    fn push_character(&mut self, account: Option<AccountId>, first: &str, last: &str, codenames: [&str; 2]) -> CharacterId {
        let id = CharacterId(self.allocate_id());
        let key = if last.is_empty() {
            first.to_string()
        } else {
            format!("{first} {last}")
        };
        self.characters.push(StoredCharacter {
            id,
            account,
            key,
            first_name: first.to_string(),
            last_name: last.to_string(),
            codenames: codenames.map(str::to_string),
            step: None,
            sheet: None,
        });
        id
    }

    /// Register a character no account owns, occupying its names and codenames.
    pub fn add_named_character(&mut self, first: &str, last: &str, codenames: [&str; 2]) -> CharacterId {
        self.push_character(None, first, last, codenames)
    }

    /// Add a finished character to `account`, with its roster entry.
    pub fn add_character_for(&mut self, account: AccountId, first: &str, last: &str) -> CharacterId {
        let id = self.push_character(Some(account), first, last, ["", ""]);
        let name = self.character(id).map(|c| c.key.clone()).unwrap_or_default();
        if let Ok(acc) = self.account_mut(account) {
            acc.roster.push(RosterEntry {
                name,
                tier: 1,
                archetype: "Bystander".to_string(),
                modifier: None,
            });
        }
        id
    }
}

impl NameDirectory for MemoryHost {
    fn full_name_taken(&self, first: &str, last: &str, except: Option<CharacterId>) -> bool {
        self.characters.iter().any(|c| {
            Some(c.id) != except
                && !c.first_name.is_empty()
                && c.first_name.eq_ignore_ascii_case(first)
                && c.last_name.eq_ignore_ascii_case(last)
        })
    }

    fn codename_taken(&self, name: &str, except: Option<CharacterId>) -> bool {
        self.characters.iter().any(|c| {
            Some(c.id) != except
                && c.codenames
                    .iter()
                    .any(|code| !code.is_empty() && code.eq_ignore_ascii_case(name))
        })
    }
}

impl AccountGate for MemoryHost {
    fn account_exists(&self, username: &str) -> Result<bool, HostError> {
        Ok(self.accounts.iter().any(|a| a.username.eq_ignore_ascii_case(username)))
    }

    fn create_account(&mut self, username: &str, password: &str, address: &str) -> Result<AccountRef, AuthError> {
        if self.accounts.iter().any(|a| a.username.eq_ignore_ascii_case(username)) {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword { min: MIN_PASSWORD_LEN });
        }
        let id = AccountId(self.allocate_id());
        self.accounts.push(MemoryAccount {
            id,
            username: username.to_string(),
            password: password.to_string(),
            karma: 0,
            roster: Vec::new(),
            last_address: Some(address.to_string()),
        });
        tracing::info!(account = id.0, username, "account created");
        Ok(AccountRef {
            id,
            username: username.to_string(),
        })
    }

    fn authenticate(&mut self, username: &str, password: &str, address: &str) -> Result<AccountRef, AuthError> {
        let account = self
            .accounts
            .iter_mut()
            .find(|a| a.username.eq_ignore_ascii_case(username))
            .filter(|a| a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        account.last_address = Some(address.to_string());
        Ok(AccountRef {
            id: account.id,
            username: account.username.clone(),
        })
    }

    fn find_playable(&self, account: AccountId, name: &str) -> Result<Option<PlayableCharacter>, HostError> {
        let name = name.trim();
        Ok(self
            .characters
            .iter()
            .filter(|c| c.account == Some(account) && c.step.is_none())
            .find(|c| c.key.eq_ignore_ascii_case(name) || c.first_name.eq_ignore_ascii_case(name))
            .map(|c| PlayableCharacter {
                id: c.id,
                name: c.key.clone(),
            }))
    }

    fn roster(&self, account: AccountId) -> Result<Vec<RosterEntry>, HostError> {
        Ok(self.find_account(account)?.roster.clone())
    }
}

impl CharacterVault for MemoryHost {
    fn names(&self) -> &dyn NameDirectory {
        self
    }

    fn karma(&self, account: AccountId) -> Result<i64, HostError> {
        Ok(self.find_account(account)?.karma)
    }

    fn character_count(&self, account: AccountId) -> Result<usize, HostError> {
        Ok(self.characters.iter().filter(|c| c.account == Some(account)).count())
    }

    fn in_progress(&self, account: AccountId) -> Result<Option<PendingCharacter>, HostError> {
        Ok(self
            .characters
            .iter()
            .filter(|c| c.account == Some(account))
            .find_map(|c| {
                c.step.as_ref().map(|step| PendingCharacter {
                    id: c.id,
                    key: c.key.clone(),
                    step: step.clone(),
                })
            }))
    }

    fn create_placeholder(&mut self, account: AccountId, key: &str, step: &str) -> Result<CharacterId, HostError> {
        self.find_account(account)?;
        if self.key_in_use(key, None) {
            return Err(HostError::Rejected(format!("character key '{key}' is taken")));
        }
        let id = CharacterId(self.allocate_id());
        self.characters.push(StoredCharacter {
            id,
            account: Some(account),
            key: key.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            codenames: [String::new(), String::new()],
            step: Some(step.to_string()),
            sheet: None,
        });
        Ok(id)
    }

    fn set_chargen_step(&mut self, character: CharacterId, step: &str) -> Result<(), HostError> {
        let stored = self
            .characters
            .iter_mut()
            .find(|c| c.id == character)
            .ok_or_else(|| HostError::Rejected(format!("unknown character {}", character.0)))?;
        stored.step = Some(step.to_string());
        Ok(())
    }

    fn commit(&mut self, character: CharacterId, sheet: &CharacterSheet, entry: &RosterEntry) -> Result<(), HostError> {
        let key = sheet.full_name();
        let owner = match self.character(character) {
            Some(c) if c.step.is_none() => {
                return Err(HostError::Rejected(format!("character {} is already committed", character.0)))
            }
            Some(c) => c.account,
            None => return Err(HostError::Rejected(format!("unknown character {}", character.0))),
        };
        if self.key_in_use(&key, Some(character)) {
            return Err(HostError::Rejected(format!("character key '{key}' is taken")));
        }
        let owner = owner.ok_or_else(|| HostError::Rejected(format!("character {} has no account", character.0)))?;
        self.find_account(owner)?;

        if let Some(stored) = self.characters.iter_mut().find(|c| c.id == character) {
            stored.key = key;
            stored.first_name = sheet.first_name.clone();
            stored.last_name = sheet.last_name.clone();
            stored.step = None;
            stored.sheet = Some(sheet.clone());
        }
        self.account_mut(owner)?.roster.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_are_case_insensitive() {
        let mut host = MemoryHost::new();
        host.create_account("Ada", "password1", "a").unwrap();
        assert!(host.account_exists("ADA").unwrap());
        assert!(matches!(
            host.create_account("ada", "password1", "a"),
            Err(AuthError::UsernameTaken(_))
        ));
        let account = host.authenticate("aDa", "password1", "b").unwrap();
        assert_eq!(account.username, "Ada");
        assert_eq!(host.account(account.id).unwrap().last_address.as_deref(), Some("b"));
        assert!(matches!(
            host.authenticate("ada", "nope", "b"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn weak_password_rejected() {
        let mut host = MemoryHost::new();
        assert!(matches!(
            host.create_account("ada", "short", "a"),
            Err(AuthError::WeakPassword { min: 8 })
        ));
        assert!(!host.account_exists("ada").unwrap());
    }

    #[test]
    fn in_progress_characters_are_not_playable() {
        let mut host = MemoryHost::new();
        let account = host.create_account("ada", "password1", "a").unwrap();
        host.create_placeholder(account.id, "AbCdEfGhIj", "node_chargen").unwrap();
        assert!(host.find_playable(account.id, "AbCdEfGhIj").unwrap().is_none());
        assert_eq!(host.character_count(account.id).unwrap(), 1);

        host.add_character_for(account.id, "Ada", "Byron");
        let found = host.find_playable(account.id, "ada").unwrap().unwrap();
        assert_eq!(found.name, "Ada Byron");
        assert!(host.find_playable(account.id, "ADA BYRON").unwrap().is_some());
    }

    #[test]
    fn commit_applies_once() {
        use chrono::NaiveDate;

        use crate::appearance::{Eyes, Hair};
        use crate::chargen::draft::{Draft, Update};
        use crate::rules::GameClock;

        let mut host = MemoryHost::new();
        let account = host.create_account("ada", "password1", "a").unwrap();
        let id = host.create_placeholder(account.id, "AbCdEfGhIj", "node_chargen").unwrap();

        let mut draft = Draft::default();
        draft.apply(Update::FirstName("Ada".into()));
        draft.apply(Update::Hair(Hair::Red));
        draft.apply(Update::Eyes(Eyes::Red));
        let clock = GameClock::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 2);
        let sheet = draft.to_sheet(&clock).unwrap();
        let entry = RosterEntry {
            name: "Ada".into(),
            tier: 1,
            archetype: "Bystander".into(),
            modifier: None,
        };

        host.commit(id, &sheet, &entry).unwrap();
        assert_eq!(host.character(id).unwrap().key, "Ada");
        assert!(host.commit(id, &sheet, &entry).is_err());
        assert_eq!(host.roster(account.id).unwrap().len(), 1);
        assert!(host.set_chargen_step(CharacterId(999), "x").is_err());
    }

    #[test]
    fn placeholder_keys_are_unique() {
        let mut host = MemoryHost::new();
        let account = host.create_account("ada", "password1", "a").unwrap();
        host.create_placeholder(account.id, "SameKey123", "node_chargen").unwrap();
        assert!(host.create_placeholder(account.id, "samekey123", "node_chargen").is_err());
    }
}
