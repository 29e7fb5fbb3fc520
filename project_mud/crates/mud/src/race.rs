//! Playable races, their tier ranges and per-tier archetype labels.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::ChargenError;

pub const MIN_TIER: u8 = 1;
pub const MAX_TIER: u8 = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Race {
    Human,
    Metahuman,
    Magicker,
    Alien,
    Synthetic,
    Avalonian,
    Diver,
}

/// Static description of one race.
#[derive(Debug)]
pub struct RaceInfo {
    pub race: Race,
    /// Tick markup colour prefix used for the race and its archetypes.
    pub color: &'static str,
    pub min_tier: u8,
    pub max_tier: u8,
    /// Archetype label per tier, index 0 is tier 1.
    pub archetypes: [&'static str; MAX_TIER as usize],
    pub aliases: &'static [&'static str],
}

static RACES: [RaceInfo; 7] = [
    RaceInfo {
        race: Race::Human,
        color: "`c",
        min_tier: 1,
        max_tier: 5,
        archetypes: ["Bystander", "Regular Person", "Important Person", "Dedicated Human", "'Super'Human"],
        aliases: &[],
    },
    RaceInfo {
        race: Race::Metahuman,
        color: "`W",
        min_tier: 2,
        max_tier: 5,
        archetypes: ["", "Rookie Metahuman", "Metahuman", "Veteran Metahuman", "S-Class Metahuman"],
        aliases: &["meta"],
    },
    RaceInfo {
        race: Race::Magicker,
        color: "`R",
        min_tier: 2,
        max_tier: 5,
        archetypes: ["", "Dabbler", "Practitioner", "Magician", "Supreme"],
        aliases: &[],
    },
    RaceInfo {
        race: Race::Alien,
        color: "`G",
        min_tier: 2,
        max_tier: 5,
        archetypes: ["", "Rookie Alien", "Alien", "Veteran Alien", "Higher Lifeform"],
        aliases: &[],
    },
    RaceInfo {
        race: Race::Synthetic,
        color: "`D",
        min_tier: 2,
        max_tier: 5,
        archetypes: ["", "Prototype Synthetic", "Synthetic", "Advanced Synthetic", "Perfect Synthetic"],
        aliases: &["synth"],
    },
    RaceInfo {
        race: Race::Avalonian,
        color: "`C",
        min_tier: 3,
        max_tier: 5,
        archetypes: ["", "", "Avalonian", "Avalonian Knight", "Avalonian Noble"],
        aliases: &[],
    },
    RaceInfo {
        race: Race::Diver,
        color: "`Y",
        min_tier: 3,
        max_tier: 5,
        archetypes: ["", "", "Diver", "Veteran Diver", "Elder Diver"],
        aliases: &[],
    },
];

impl Race {
    pub fn info(self) -> &'static RaceInfo {
        &RACES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Resolve a race by name or alias, ignoring case.
    pub fn lookup(input: &str) -> Option<Race> {
        let input = input.trim();
        if let Ok(race) = input.parse::<Race>() {
            return Some(race);
        }
        Race::iter().find(|race| {
            race.info()
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(input))
        })
    }

    pub fn tier_range(self) -> RangeInclusive<u8> {
        let info = self.info();
        info.min_tier..=info.max_tier
    }

    pub fn is_valid_tier(self, tier: u8) -> bool {
        self.tier_range().contains(&tier)
    }

    /// Nearest tier inside this race's range.
    pub fn clamp_tier(self, tier: u8) -> u8 {
        let info = self.info();
        tier.clamp(info.min_tier, info.max_tier)
    }

    /// Plain archetype label. A tier outside the race's range is an error.
    pub fn archetype(self, tier: u8) -> Result<&'static str, ChargenError> {
        if !self.is_valid_tier(tier) {
            return Err(ChargenError::TierOutOfRange { race: self, tier });
        }
        Ok(self.info().archetypes[usize::from(tier - 1)])
    }

    /// Archetype label wrapped in the race's colour markup.
    pub fn archetype_markup(self, tier: u8) -> Result<String, ChargenError> {
        Ok(format!("{}{}`x", self.info().color, self.archetype(tier)?))
    }

    pub fn markup(self) -> String {
        format!("{}{}`x", self.info().color, self.name())
    }
}

/// One line per race listing its tiers and archetypes.
pub fn archetype_table() -> String {
    Race::iter()
        .map(|race| {
            let labels: Vec<String> = race
                .tier_range()
                .map(|tier| format!("`c{tier}`x {}", race.info().archetypes[usize::from(tier - 1)]))
                .collect();
            format!("{}`Y:`x {}", race.markup(), labels.join("`Y,`x "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
