//! Pure per-field checks. Each takes only the values it inspects so the
//! readiness evaluator can report exactly which fields fail.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::appearance::{MAX_FEET, MAX_INCHES, MIN_FEET, MIN_INCHES};
use crate::chargen::draft::Pronouns;
use crate::host::{CharacterId, NameDirectory};
use crate::race::Race;
use crate::rules::GameClock;

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_TEXT_LEN: usize = 5;
pub const MIN_PRONOUN_LEN: usize = 2;
pub const MAX_PRONOUN_LEN: usize = 10;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

fn name_part_valid(name: &str) -> bool {
    name.chars().count() >= MIN_NAME_LEN && name.chars().all(char::is_alphanumeric)
}

pub fn first_name_valid(first: &str) -> bool {
    name_part_valid(first)
}

/// Last names are optional.
pub fn last_name_valid(last: &str) -> bool {
    last.is_empty() || name_part_valid(last)
}

/// True when the full name matches another character's, or the first name
/// matches one of another character's codenames.
pub fn name_collides(
    names: &dyn NameDirectory,
    first: &str,
    last: &str,
    except: Option<CharacterId>,
) -> bool {
    names.full_name_taken(first, last, except) || names.codename_taken(first, except)
}

pub fn name_valid(
    names: &dyn NameDirectory,
    first: Option<&str>,
    last: &str,
    except: Option<CharacterId>,
) -> bool {
    match first {
        Some(first) => {
            first_name_valid(first) && last_name_valid(last) && !name_collides(names, first, last, except)
        }
        None => false,
    }
}

/// Empty means no email; anything else must look like an address.
pub fn email_valid(email: &str) -> bool {
    email.is_empty() || EMAIL_RE.is_match(email)
}

pub fn pronoun_valid(word: &str) -> bool {
    (MIN_PRONOUN_LEN..=MAX_PRONOUN_LEN).contains(&word.chars().count()) && word.chars().all(char::is_alphabetic)
}

/// Exactly three pronouns separated by whitespace. Repeats are allowed.
pub fn parse_pronouns(input: &str) -> Option<Pronouns> {
    let words: Vec<&str> = input.split_whitespace().collect();
    match words.as_slice() {
        [they, them, their] if words.iter().all(|w| pronoun_valid(w)) => Some(Pronouns::new(
            &they.to_lowercase(),
            &them.to_lowercase(),
            &their.to_lowercase(),
        )),
        _ => None,
    }
}

pub fn pronouns_valid(pronouns: &Pronouns) -> bool {
    [&pronouns.they, &pronouns.them, &pronouns.their]
        .iter()
        .all(|w| pronoun_valid(w))
}

pub fn race_tier_valid(race: Race, tier: u8) -> bool {
    race.is_valid_tier(tier)
}

pub fn feet_valid(feet: u8) -> bool {
    (MIN_FEET..=MAX_FEET).contains(&feet)
}

pub fn inches_valid(inches: u8) -> bool {
    (MIN_INCHES..=MAX_INCHES).contains(&inches)
}

/// At least five characters once surrounding whitespace is dropped.
pub fn text_valid(text: &str) -> bool {
    text.trim().chars().count() >= MIN_TEXT_LEN
}

/// Hairstyle may be left empty.
pub fn hairstyle_valid(text: &str) -> bool {
    text.is_empty() || text_valid(text)
}

pub fn birthday_valid(birthday: NaiveDate, clock: &GameClock, minimum_age: u32) -> bool {
    i64::from(clock.age_on(birthday)) >= i64::from(minimum_age)
}

/// Parse `YYYY MM DD`. Runs of whitespace count as one separator.
pub fn parse_birthday(input: &str) -> Option<NaiveDate> {
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&normalized, "%Y %m %d").ok()
}

/// The reserved modifier slot must stay empty for now.
pub fn modifier_valid(modifier: Option<&str>) -> bool {
    modifier.is_none()
}
