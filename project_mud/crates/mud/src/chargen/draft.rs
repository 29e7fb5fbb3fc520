//! The in-progress character record and its committed form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::appearance::{Eyes, Hair};
use crate::chargen::fields::Field;
use crate::error::ChargenError;
use crate::race::Race;
use crate::rules::GameClock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronouns {
    pub they: String,
    pub them: String,
    pub their: String,
}

impl Pronouns {
    pub fn new(they: &str, them: &str, their: &str) -> Self {
        Self {
            they: they.to_string(),
            them: them.to_string(),
            their: their.to_string(),
        }
    }

    pub fn joined(&self) -> String {
        format!("{} {} {}", self.they, self.them, self.their)
    }
}

impl Default for Pronouns {
    fn default() -> Self {
        Self::new("they", "them", "their")
    }
}

/// A parsed field value ready to be stored on the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    FirstName(String),
    LastName(String),
    Email(String),
    Pronouns(Pronouns),
    Race(Race),
    Tier(u8),
    Birthday(NaiveDate),
    Feet(u8),
    Inches(u8),
    Hair(Hair),
    Hairstyle(String),
    Eyes(Eyes),
    Trait(String),
    Intro(String),
}

impl Update {
    pub fn field(&self) -> Field {
        match self {
            Update::FirstName(_) => Field::FirstName,
            Update::LastName(_) => Field::LastName,
            Update::Email(_) => Field::Email,
            Update::Pronouns(_) => Field::Pronouns,
            Update::Race(_) => Field::Race,
            Update::Tier(_) => Field::Tier,
            Update::Birthday(_) => Field::Birthday,
            Update::Feet(_) => Field::Feet,
            Update::Inches(_) => Field::Inches,
            Update::Hair(_) => Field::Hair,
            Update::Hairstyle(_) => Field::Hairstyle,
            Update::Eyes(_) => Field::Eyes,
            Update::Trait(_) => Field::Trait,
            Update::Intro(_) => Field::Intro,
        }
    }
}

/// Mutable character data for one creation session. Every field always holds
/// something renderable; whether it is acceptable is the validators' call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// `None` until the player picks a name.
    pub first_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub pronouns: Pronouns,
    pub race: Race,
    pub tier: u8,
    /// Reserved; nothing sets it yet.
    pub modifier: Option<String>,
    pub birthday: NaiveDate,
    pub feet: u8,
    pub inches: u8,
    pub hair: Option<Hair>,
    pub hairstyle: String,
    pub eyes: Option<Eyes>,
    pub personality: String,
    pub intro: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            first_name: None,
            last_name: String::new(),
            email: String::new(),
            pronouns: Pronouns::default(),
            race: Race::Human,
            tier: 1,
            modifier: None,
            birthday: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap_or_default(),
            feet: 5,
            inches: 7,
            hair: None,
            hairstyle: String::new(),
            eyes: None,
            personality: String::new(),
            intro: "A newcomer".to_string(),
        }
    }
}

impl Draft {
    pub fn apply(&mut self, update: Update) {
        match update {
            Update::FirstName(name) => self.first_name = Some(name),
            Update::LastName(name) => self.last_name = name,
            Update::Email(email) => self.email = email,
            Update::Pronouns(pronouns) => self.pronouns = pronouns,
            Update::Race(race) => {
                self.race = race;
                self.tier = race.clamp_tier(self.tier);
            }
            Update::Tier(tier) => self.tier = tier,
            Update::Birthday(date) => self.birthday = date,
            Update::Feet(feet) => self.feet = feet,
            Update::Inches(inches) => self.inches = inches,
            Update::Hair(hair) => self.hair = Some(hair),
            Update::Hairstyle(text) => self.hairstyle = text,
            Update::Eyes(eyes) => self.eyes = Some(eyes),
            Update::Trait(text) => self.personality = text,
            Update::Intro(text) => self.intro = text,
        }
    }

    /// First name, plus the last name when there is one.
    pub fn full_name(&self) -> Option<String> {
        let first = self.first_name.as_deref()?;
        if self.last_name.is_empty() {
            Some(first.to_string())
        } else {
            Some(format!("{first} {}", self.last_name))
        }
    }

    /// Freeze the draft into the form stored on the character. Fails when a
    /// field that has no stored default is still unset.
    pub fn to_sheet(&self, clock: &GameClock) -> Result<CharacterSheet, ChargenError> {
        let mut unset = Vec::new();
        if self.first_name.is_none() {
            unset.push(Field::FirstName);
        }
        if self.hair.is_none() {
            unset.push(Field::Hair);
        }
        if self.eyes.is_none() {
            unset.push(Field::Eyes);
        }
        let (Some(first_name), Some(hair), Some(eyes)) = (&self.first_name, self.hair, self.eyes) else {
            return Err(ChargenError::NotReady(unset));
        };

        Ok(CharacterSheet {
            first_name: first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            pronouns: self.pronouns.clone(),
            race: self.race,
            tier: self.tier,
            archetype: self.race.archetype(self.tier)?.to_string(),
            modifier: self.modifier.clone(),
            birthday: self.birthday,
            age: clock.age_on(self.birthday),
            feet: self.feet,
            inches: self.inches,
            hair,
            hairstyle: self.hairstyle.clone(),
            eyes,
            personality: self.personality.clone(),
            intro: self.intro.clone(),
        })
    }
}

/// Committed character data as persisted by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub pronouns: Pronouns,
    pub race: Race,
    pub tier: u8,
    pub archetype: String,
    pub modifier: Option<String>,
    pub birthday: NaiveDate,
    pub age: i32,
    pub feet: u8,
    pub inches: u8,
    pub hair: Hair,
    pub hairstyle: String,
    pub eyes: Eyes,
    #[serde(rename = "trait")]
    pub personality: String,
    pub intro: String,
}

impl CharacterSheet {
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> GameClock {
        GameClock::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), 2)
    }

    #[test]
    fn defaults_render_without_gaps() {
        let draft = Draft::default();
        assert_eq!(draft.first_name, None);
        assert_eq!(draft.pronouns.joined(), "they them their");
        assert_eq!(draft.race, Race::Human);
        assert_eq!(draft.tier, 1);
        assert_eq!(draft.birthday, NaiveDate::from_ymd_opt(1980, 1, 1).unwrap());
        assert_eq!((draft.feet, draft.inches), (5, 7));
        assert_eq!(draft.intro, "A newcomer");
    }

    #[test]
    fn race_change_clamps_tier() {
        let mut draft = Draft::default();
        draft.apply(Update::Race(Race::Avalonian));
        assert_eq!(draft.tier, 3);

        draft.apply(Update::Tier(5));
        draft.apply(Update::Race(Race::Human));
        assert_eq!(draft.tier, 5);
        draft.apply(Update::Race(Race::Avalonian));
        assert_eq!(draft.tier, 5);
    }

    #[test]
    fn full_name_joins_parts() {
        let mut draft = Draft::default();
        assert_eq!(draft.full_name(), None);
        draft.apply(Update::FirstName("Ada".into()));
        assert_eq!(draft.full_name().as_deref(), Some("Ada"));
        draft.apply(Update::LastName("Byron".into()));
        assert_eq!(draft.full_name().as_deref(), Some("Ada Byron"));
    }

    #[test]
    fn sheet_requires_name_hair_and_eyes() {
        let mut draft = Draft::default();
        match draft.to_sheet(&clock()) {
            Err(ChargenError::NotReady(fields)) => {
                assert_eq!(fields, vec![Field::FirstName, Field::Hair, Field::Eyes])
            }
            other => panic!("unexpected {other:?}"),
        }

        draft.apply(Update::FirstName("Ada".into()));
        draft.apply(Update::Hair(Hair::Red));
        draft.apply(Update::Eyes(Eyes::Green));
        let sheet = draft.to_sheet(&clock()).unwrap();
        assert_eq!(sheet.archetype, "Bystander");
        assert_eq!(sheet.age, 47);
        assert_eq!(sheet.full_name(), "Ada");
    }

    #[test]
    fn sheet_serializes_trait_key() {
        let mut draft = Draft::default();
        draft.apply(Update::FirstName("Ada".into()));
        draft.apply(Update::Hair(Hair::Red));
        draft.apply(Update::Eyes(Eyes::Green));
        draft.apply(Update::Trait("Curious".into()));
        let json = serde_json::to_value(draft.to_sheet(&clock()).unwrap()).unwrap();
        assert_eq!(json["trait"], "Curious");
        assert_eq!(json["race"], "Human");
    }
}
