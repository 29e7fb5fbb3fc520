//! Field registry: one row per editable field holding its command keys,
//! sheet label, help text, parser, validator and display formatter.

use strum::{EnumIter, IntoEnumIterator};

use crate::appearance::{Eyes, Hair, MAX_FEET, MAX_INCHES, MIN_FEET, MIN_INCHES};
use crate::chargen::draft::{Draft, Update};
use crate::chargen::validators as v;
use crate::host::{CharacterId, NameDirectory};
use crate::race::{Race, MAX_TIER, MIN_TIER};
use crate::rules::GameClock;
use crate::text::{listify, ordinal};

const CLEAR: &str = "clear";

const NAME_TAKEN: &str = "Your first and last name can't match the first and last name of someone else. \
Also, your first name can't match one of someone else's codenames.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Pronouns,
    Race,
    Tier,
    Modifier,
    Birthday,
    Feet,
    Inches,
    Hair,
    Hairstyle,
    Eyes,
    Trait,
    Intro,
}

/// What the validators need beyond the draft itself.
pub struct ValidationContext<'a> {
    pub names: &'a dyn NameDirectory,
    pub clock: &'a GameClock,
    pub minimum_age: u32,
    /// The character being edited, excluded from name collisions.
    pub character: Option<CharacterId>,
}

type Parser = fn(&ValidationContext<'_>, &Draft, &str) -> Result<Update, String>;
type Validator = fn(&ValidationContext<'_>, &Draft) -> bool;
type Formatter = fn(&Draft) -> String;

struct FieldEntry {
    field: Field,
    keys: &'static [&'static str],
    label: &'static str,
    help: &'static str,
    parse: Parser,
    validate: Validator,
    display: Formatter,
}

static FIELDS: [FieldEntry; 15] = [
    FieldEntry {
        field: Field::FirstName,
        keys: &["first", "firstname"],
        label: "First Name",
        help: "Your character's first name. At least two letters or numbers, and it must not \
match someone else's full name or codename.",
        parse: parse_first_name,
        validate: validate_name,
        display: |d| d.first_name.clone().unwrap_or_else(|| "unset".to_string()),
    },
    FieldEntry {
        field: Field::LastName,
        keys: &["last", "lastname"],
        label: "Last Name",
        help: "Your character's last name. Optional; if set, at least two letters or numbers. \
Use '`clast clear`x' to remove it.",
        parse: parse_last_name,
        validate: validate_name,
        display: |d| d.last_name.clone(),
    },
    FieldEntry {
        field: Field::Email,
        keys: &["email"],
        label: "Email",
        help: "An optional contact address for staff. Use '`cemail clear`x' to remove it.",
        parse: parse_email,
        validate: |_, d| v::email_valid(&d.email),
        display: |d| d.email.clone(),
    },
    FieldEntry {
        field: Field::Pronouns,
        keys: &["pronouns"],
        label: "Pronouns",
        help: "Three pronouns separated by spaces, for example '`cpronouns she her hers`x'. \
Each must be two to ten letters long.",
        parse: parse_pronouns,
        validate: |_, d| v::pronouns_valid(&d.pronouns),
        display: |d| d.pronouns.joined(),
    },
    FieldEntry {
        field: Field::Race,
        keys: &["race"],
        label: "Race",
        help: "Your character's origin. Each race allows a different range of tiers; changing \
race moves your tier into the new range. See '`chelp archetypes`x'.",
        parse: parse_race,
        validate: validate_race_tier,
        display: |d| d.race.markup(),
    },
    FieldEntry {
        field: Field::Tier,
        keys: &["tier"],
        label: "Tier",
        help: "Your character's power level, from 1 to 5. Together with race it decides your \
archetype. See '`chelp archetypes`x'.",
        parse: parse_tier,
        validate: validate_race_tier,
        display: |d| d.tier.to_string(),
    },
    FieldEntry {
        field: Field::Modifier,
        keys: &["modifier", "modifiers"],
        label: "Modifiers",
        help: "Modifiers refine an archetype. None are available yet.",
        parse: |_, _, _| Err("Modifiers are not available yet.".to_string()),
        validate: |_, d| v::modifier_valid(d.modifier.as_deref()),
        display: |d| d.modifier.clone().unwrap_or_default(),
    },
    FieldEntry {
        field: Field::Birthday,
        keys: &["birthday"],
        label: "Birthday",
        help: "Your character's date of birth as '`cYYYY MM DD`x'. Your character must be of \
age in the game's present, which runs a few years ahead of ours.",
        parse: parse_birthday,
        validate: |ctx, d| v::birthday_valid(d.birthday, ctx.clock, ctx.minimum_age),
        display: display_birthday,
    },
    FieldEntry {
        field: Field::Feet,
        keys: &["feet"],
        label: "Feet",
        help: "Height in feet, from 5 to 6. Set inches separately.",
        parse: |_, _, raw| parse_height(raw, "feet", MIN_FEET, MAX_FEET).map(Update::Feet),
        validate: |_, d| v::feet_valid(d.feet),
        display: |d| d.feet.to_string(),
    },
    FieldEntry {
        field: Field::Inches,
        keys: &["inches"],
        label: "Inches",
        help: "The inches part of your height, from 0 to 11.",
        parse: |_, _, raw| parse_height(raw, "inches", MIN_INCHES, MAX_INCHES).map(Update::Inches),
        validate: |_, d| v::inches_valid(d.inches),
        display: |d| d.inches.to_string(),
    },
    FieldEntry {
        field: Field::Hair,
        keys: &["hair"],
        label: "Hair",
        help: "Your character's natural hair colour.",
        parse: |_, _, raw| {
            Hair::lookup(raw)
                .map(Update::Hair)
                .ok_or_else(|| format!("Invalid hair color. Valid colors: {}", listify(&Hair::all_markup())))
        },
        validate: |_, d| d.hair.is_some(),
        display: |d| d.hair.map(Hair::markup).unwrap_or_default().to_string(),
    },
    FieldEntry {
        field: Field::Hairstyle,
        keys: &["hairstyle"],
        label: "Hairstyle",
        help: "A short description of how your character wears their hair. Optional; use \
'`chairstyle clear`x' to remove it.",
        parse: |_, _, raw| {
            if raw.eq_ignore_ascii_case(CLEAR) {
                return Ok(Update::Hairstyle(String::new()));
            }
            parse_text(raw, "Hairstyle").map(Update::Hairstyle)
        },
        validate: |_, d| v::hairstyle_valid(&d.hairstyle),
        display: |d| d.hairstyle.clone(),
    },
    FieldEntry {
        field: Field::Eyes,
        keys: &["eyes"],
        label: "Eyes",
        help: "Your character's eye colour.",
        parse: |_, _, raw| {
            Eyes::lookup(raw)
                .map(Update::Eyes)
                .ok_or_else(|| format!("Invalid eyes color. Valid colors: {}", listify(&Eyes::all_markup())))
        },
        validate: |_, d| d.eyes.is_some(),
        display: |d| d.eyes.map(Eyes::markup).unwrap_or_default().to_string(),
    },
    FieldEntry {
        field: Field::Trait,
        keys: &["trait"],
        label: "Trait",
        help: "One defining trait others notice about your character, at least five characters.",
        parse: |_, _, raw| parse_text(raw, "Trait").map(Update::Trait),
        validate: |_, d| v::text_valid(&d.personality),
        display: |d| d.personality.clone(),
    },
    FieldEntry {
        field: Field::Intro,
        keys: &["intro"],
        label: "Intro",
        help: "How your character appears to people who don't know their name yet.",
        parse: |_, _, raw| parse_text(raw, "Intro").map(Update::Intro),
        validate: |_, d| v::text_valid(&d.intro),
        display: |d| d.intro.clone(),
    },
];

impl Field {
    fn entry(self) -> &'static FieldEntry {
        let entry = &FIELDS[self as usize];
        debug_assert_eq!(entry.field, self);
        entry
    }

    /// Command words that edit this field.
    pub fn keys(self) -> &'static [&'static str] {
        self.entry().keys
    }

    pub fn label(self) -> &'static str {
        self.entry().label
    }

    pub fn help(self) -> &'static str {
        self.entry().help
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::iter().find(|field| field.keys().iter().any(|k| k.eq_ignore_ascii_case(key)))
    }

    /// Turn player input into an update, or a message explaining the rejection.
    pub fn parse(self, ctx: &ValidationContext<'_>, draft: &Draft, raw: &str) -> Result<Update, String> {
        (self.entry().parse)(ctx, draft, raw.trim())
    }

    pub fn is_valid(self, ctx: &ValidationContext<'_>, draft: &Draft) -> bool {
        (self.entry().validate)(ctx, draft)
    }

    pub fn display(self, draft: &Draft) -> String {
        (self.entry().display)(draft)
    }
}

fn validate_name(ctx: &ValidationContext<'_>, d: &Draft) -> bool {
    v::name_valid(ctx.names, d.first_name.as_deref(), &d.last_name, ctx.character)
}

fn validate_race_tier(_: &ValidationContext<'_>, d: &Draft) -> bool {
    v::race_tier_valid(d.race, d.tier)
}

fn parse_first_name(ctx: &ValidationContext<'_>, d: &Draft, raw: &str) -> Result<Update, String> {
    if !v::first_name_valid(raw) {
        return Err("First names must be at least two characters long and contain only letters and numbers.".into());
    }
    if v::name_collides(ctx.names, raw, &d.last_name, ctx.character) {
        return Err(NAME_TAKEN.into());
    }
    Ok(Update::FirstName(raw.to_string()))
}

fn parse_last_name(ctx: &ValidationContext<'_>, d: &Draft, raw: &str) -> Result<Update, String> {
    let last = if raw.eq_ignore_ascii_case(CLEAR) { "" } else { raw };
    if !v::last_name_valid(last) {
        return Err("Last names must be at least two characters long and contain only letters and numbers.".into());
    }
    if let Some(first) = d.first_name.as_deref() {
        if v::name_collides(ctx.names, first, last, ctx.character) {
            return Err(NAME_TAKEN.into());
        }
    }
    Ok(Update::LastName(last.to_string()))
}

fn parse_email(_: &ValidationContext<'_>, _: &Draft, raw: &str) -> Result<Update, String> {
    if raw.eq_ignore_ascii_case(CLEAR) {
        return Ok(Update::Email(String::new()));
    }
    if !v::email_valid(raw) {
        return Err("Invalid email address.".into());
    }
    Ok(Update::Email(raw.to_string()))
}

fn parse_pronouns(_: &ValidationContext<'_>, _: &Draft, raw: &str) -> Result<Update, String> {
    v::parse_pronouns(raw).map(Update::Pronouns).ok_or_else(|| {
        "Invalid pronouns. Please enter three pronouns separated by spaces, each between two and ten letters long."
            .to_string()
    })
}

fn parse_race(_: &ValidationContext<'_>, _: &Draft, raw: &str) -> Result<Update, String> {
    Race::lookup(raw)
        .map(Update::Race)
        .ok_or_else(|| "Invalid race. Please see `chelp archetypes`x for a list of valid races.".to_string())
}

fn parse_tier(_: &ValidationContext<'_>, d: &Draft, raw: &str) -> Result<Update, String> {
    let Ok(tier) = raw.parse::<u8>() else {
        return Err(format!("Invalid tier. Please enter a number between {MIN_TIER} and {MAX_TIER}."));
    };
    if !d.race.is_valid_tier(tier) {
        let range = d.race.tier_range();
        return Err(format!(
            "Invalid tier. {} characters must be tier {} to {}. Please see `chelp archetypes`x.",
            d.race.markup(),
            range.start(),
            range.end()
        ));
    }
    Ok(Update::Tier(tier))
}

fn parse_birthday(ctx: &ValidationContext<'_>, _: &Draft, raw: &str) -> Result<Update, String> {
    let Some(date) = v::parse_birthday(raw) else {
        return Err("Invalid birthday. Please enter a date in the format `cYYYY MM DD`x.".into());
    };
    if !v::birthday_valid(date, ctx.clock, ctx.minimum_age) {
        return Err(format!("Your character must be at least {} years old.", ctx.minimum_age));
    }
    Ok(Update::Birthday(date))
}

fn parse_height(raw: &str, what: &str, min: u8, max: u8) -> Result<u8, String> {
    match raw.parse::<u8>() {
        Ok(n) if (min..=max).contains(&n) => Ok(n),
        _ => Err(format!("Invalid {what}. Please enter a number between {min} and {max}.")),
    }
}

fn parse_text(raw: &str, label: &str) -> Result<String, String> {
    if !v::text_valid(raw) {
        return Err(format!("{label} must be at least five characters long."));
    }
    Ok(raw.to_string())
}

fn display_birthday(d: &Draft) -> String {
    use chrono::Datelike;
    let b = d.birthday;
    format!(
        "{} {} {} `Y(`c{} {}`Y,`c {}`Y)[`xyyyy mm dd`Y]",
        b.year(),
        b.month(),
        b.day(),
        b.format("%B"),
        ordinal(b.day()),
        b.year()
    )
}
