//! Readiness is exactly "every validator passes and the cost is affordable",
//! whatever order fields were edited in: the failing set always equals the
//! fields currently broken, and repairing them in any order restores a
//! ready draft.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use proptest::prelude::*;

use mud::appearance::{Eyes, Hair};
use mud::chargen::draft::{Draft, Pronouns, Update};
use mud::chargen::fields::{Field, ValidationContext};
use mud::chargen::readiness::Readiness;
use mud::memory::MemoryHost;
use mud::GameClock;

fn clock() -> GameClock {
    GameClock::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), 2)
}

struct Name {
    first: String,
    last: String,
}

fn ready_draft(name: &Name) -> Draft {
    let mut draft = Draft::default();
    for update in [
        Update::FirstName(name.first.clone()),
        Update::LastName(name.last.clone()),
        Update::Hair(Hair::Black),
        Update::Eyes(Eyes::Green),
        Update::Trait("Quietly ambitious".to_string()),
    ] {
        draft.apply(update);
    }
    draft
}

/// Puts one part of the draft into a bad state, or back into a good one.
/// Each touches a different part of the draft; `fields` are the validators
/// that fail while it is broken.
struct Breakage {
    fields: &'static [Field],
    break_it: fn(&mut Draft),
    repair: fn(&mut Draft, &Name),
}

const NAME_FIELDS: &[Field] = &[Field::FirstName, Field::LastName];

static BREAKAGES: [Breakage; 14] = [
    Breakage {
        fields: NAME_FIELDS,
        break_it: |d| d.apply(Update::FirstName("x".into())),
        repair: |d, n| d.apply(Update::FirstName(n.first.clone())),
    },
    Breakage {
        fields: NAME_FIELDS,
        break_it: |d| d.apply(Update::LastName("q".into())),
        repair: |d, n| d.apply(Update::LastName(n.last.clone())),
    },
    Breakage {
        fields: &[Field::Email],
        break_it: |d| d.apply(Update::Email("nope@".into())),
        repair: |d, _| d.apply(Update::Email(String::new())),
    },
    Breakage {
        fields: &[Field::Pronouns],
        break_it: |d| d.apply(Update::Pronouns(Pronouns::new("x", "them", "their"))),
        repair: |d, _| d.apply(Update::Pronouns(Pronouns::default())),
    },
    Breakage {
        fields: &[Field::Race, Field::Tier],
        break_it: |d| d.apply(Update::Tier(9)),
        repair: |d, _| d.apply(Update::Tier(1)),
    },
    Breakage {
        fields: &[Field::Modifier],
        break_it: |d| d.modifier = Some("Gadgeteer".into()),
        repair: |d, _| d.modifier = None,
    },
    Breakage {
        fields: &[Field::Birthday],
        break_it: |d| d.apply(Update::Birthday(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())),
        repair: |d, _| d.apply(Update::Birthday(NaiveDate::from_ymd_opt(1980, 1, 1).unwrap())),
    },
    Breakage {
        fields: &[Field::Feet],
        break_it: |d| d.apply(Update::Feet(9)),
        repair: |d, _| d.apply(Update::Feet(5)),
    },
    Breakage {
        fields: &[Field::Inches],
        break_it: |d| d.apply(Update::Inches(12)),
        repair: |d, _| d.apply(Update::Inches(7)),
    },
    Breakage {
        fields: &[Field::Hair],
        break_it: |d| d.hair = None,
        repair: |d, _| d.apply(Update::Hair(Hair::Red)),
    },
    Breakage {
        fields: &[Field::Hairstyle],
        break_it: |d| d.apply(Update::Hairstyle("abc".into())),
        repair: |d, _| d.apply(Update::Hairstyle(String::new())),
    },
    Breakage {
        fields: &[Field::Eyes],
        break_it: |d| d.eyes = None,
        repair: |d, _| d.apply(Update::Eyes(Eyes::Blue)),
    },
    Breakage {
        fields: &[Field::Trait],
        break_it: |d| d.apply(Update::Trait("hey".into())),
        repair: |d, _| d.apply(Update::Trait("Quietly ambitious".into())),
    },
    Breakage {
        fields: &[Field::Intro],
        break_it: |d| d.apply(Update::Intro(String::new())),
        repair: |d, _| d.apply(Update::Intro("A newcomer".into())),
    },
];

fn expected_failing(broken: &BTreeSet<usize>) -> BTreeSet<Field> {
    broken
        .iter()
        .flat_map(|&i| BREAKAGES[i].fields.iter().copied())
        .collect()
}

fn failing(ctx: &ValidationContext<'_>, draft: &Draft, karma: i64) -> BTreeSet<Field> {
    Readiness::evaluate(ctx, draft, karma).failing.into_iter().collect()
}

fn shuffled() -> impl Strategy<Value = Vec<usize>> {
    Just((0..BREAKAGES.len()).collect::<Vec<_>>()).prop_shuffle()
}

#[test]
fn every_field_can_fail() {
    let covered: BTreeSet<Field> = BREAKAGES.iter().flat_map(|b| b.fields.iter().copied()).collect();
    let all: BTreeSet<Field> = <Field as strum::IntoEnumIterator>::iter().collect();
    assert_eq!(covered, all);
}

proptest! {
    #[test]
    fn failing_set_tracks_broken_fields_in_any_order(
        first in "[A-Z][a-z]{2,9}",
        last in "[A-Z][a-z]{2,9}",
        break_order in shuffled(),
        repair_order in shuffled(),
        count in 1usize..=14,
        karma in 0i64..1_000,
    ) {
        let host = MemoryHost::new();
        let clock = clock();
        let ctx = ValidationContext {
            names: &host,
            clock: &clock,
            minimum_age: 18,
            character: None,
        };
        let name = Name { first, last };

        let mut draft = ready_draft(&name);
        prop_assert!(Readiness::evaluate(&ctx, &draft, karma).is_ready());

        let mut broken = BTreeSet::new();
        for &i in &break_order[..count] {
            (BREAKAGES[i].break_it)(&mut draft);
            broken.insert(i);
            prop_assert_eq!(failing(&ctx, &draft, karma), expected_failing(&broken));
            prop_assert!(!Readiness::evaluate(&ctx, &draft, karma).is_ready());
        }

        let to_repair: Vec<usize> = repair_order.iter().copied().filter(|i| broken.contains(i)).collect();
        for i in to_repair {
            (BREAKAGES[i].repair)(&mut draft, &name);
            broken.remove(&i);
            prop_assert_eq!(failing(&ctx, &draft, karma), expected_failing(&broken));
        }
        prop_assert!(broken.is_empty());
        prop_assert!(Readiness::evaluate(&ctx, &draft, karma).is_ready());
    }

    #[test]
    fn negative_karma_is_never_ready(first in "[A-Z][a-z]{2,9}", karma in -1_000i64..0) {
        let host = MemoryHost::new();
        let clock = clock();
        let ctx = ValidationContext {
            names: &host,
            clock: &clock,
            minimum_age: 18,
            character: None,
        };
        let name = Name { first, last: String::new() };
        let readiness = Readiness::evaluate(&ctx, &ready_draft(&name), karma);
        prop_assert!(readiness.failing.is_empty());
        prop_assert!(!readiness.is_ready());
    }
}
