use crate::chargen::draft::Draft;
use crate::chargen::fields::ValidationContext;
use crate::chargen::readiness::Readiness;
use crate::error::ChargenError;
use crate::host::{AccountId, CharacterId, CharacterVault};
use crate::roster::RosterEntry;
use crate::rules::GameClock;

/// Write a finished draft onto its character and append the roster entry.
///
/// Readiness is checked again against the store's current names and karma,
/// so a name claimed since the sheet was last shown is caught here. Nothing
/// is written unless every check passes.
pub fn commit(
    host: &mut dyn CharacterVault,
    clock: &GameClock,
    minimum_age: u32,
    account: AccountId,
    character: CharacterId,
    draft: &Draft,
) -> Result<RosterEntry, ChargenError> {
    let karma = host.karma(account)?;
    let readiness = {
        let ctx = ValidationContext {
            names: host.names(),
            clock,
            minimum_age,
            character: Some(character),
        };
        Readiness::evaluate(&ctx, draft, karma)
    };
    if !readiness.is_ready() {
        tracing::info!(character = character.0, failing = ?readiness.failing, "commit refused, draft not ready");
        return Err(ChargenError::NotReady(readiness.failing));
    }

    let sheet = draft.to_sheet(clock)?;
    let entry = RosterEntry {
        name: sheet.full_name(),
        tier: sheet.tier,
        archetype: sheet.archetype.clone(),
        modifier: sheet.modifier.clone(),
    };
    host.commit(character, &sheet, &entry)?;

    tracing::info!(account = account.0, character = character.0, name = %entry.name, "character committed");
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::appearance::{Eyes, Hair};
    use crate::chargen::draft::Update;
    use crate::chargen::fields::Field;
    use crate::host::{AccountGate, CharacterVault};
    use crate::memory::MemoryHost;

    fn clock() -> GameClock {
        GameClock::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 2)
    }

    fn ready_draft() -> Draft {
        let mut draft = Draft::default();
        draft.apply(Update::FirstName("Ada".into()));
        draft.apply(Update::LastName("Byron".into()));
        draft.apply(Update::Hair(Hair::Auburn));
        draft.apply(Update::Eyes(Eyes::Amber));
        draft.apply(Update::Trait("Quietly brilliant".into()));
        draft
    }

    #[test]
    fn commit_writes_sheet_and_roster() {
        let mut host = MemoryHost::new();
        let account = host.create_account("ada", "password1", "test").unwrap();
        let character = host.create_placeholder(account.id, "Xy12Ab34Cd", "node_chargen").unwrap();

        let entry = commit(&mut host, &clock(), 18, account.id, character, &ready_draft()).unwrap();
        assert_eq!(entry.name, "Ada Byron");
        assert_eq!(entry.archetype, "Bystander");

        assert_eq!(host.roster(account.id).unwrap(), vec![entry]);
        assert!(host.in_progress(account.id).unwrap().is_none());
        let stored = host.character(character).unwrap();
        assert_eq!(stored.key, "Ada Byron");
        assert_eq!(stored.sheet.as_ref().map(|s| s.eyes), Some(Eyes::Amber));
    }

    #[test]
    fn unready_draft_writes_nothing() {
        let mut host = MemoryHost::new();
        let account = host.create_account("ada", "password1", "test").unwrap();
        let character = host.create_placeholder(account.id, "Xy12Ab34Cd", "node_chargen").unwrap();
        let mut draft = ready_draft();
        draft.hair = None;

        match commit(&mut host, &clock(), 18, account.id, character, &draft) {
            Err(ChargenError::NotReady(fields)) => assert_eq!(fields, vec![Field::Hair]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(host.roster(account.id).unwrap().is_empty());
        let stored = host.character(character).unwrap();
        assert!(stored.sheet.is_none());
        assert_eq!(stored.step.as_deref(), Some("node_chargen"));
    }

    #[test]
    fn name_claimed_after_render_is_caught() {
        let mut host = MemoryHost::new();
        let account = host.create_account("ada", "password1", "test").unwrap();
        let character = host.create_placeholder(account.id, "Xy12Ab34Cd", "node_chargen").unwrap();
        host.add_named_character("Ada", "Byron", ["", ""]);

        let result = commit(&mut host, &clock(), 18, account.id, character, &ready_draft());
        assert!(matches!(result, Err(ChargenError::NotReady(ref f)) if f.contains(&Field::FirstName)));
        assert!(host.roster(account.id).unwrap().is_empty());
    }
}
