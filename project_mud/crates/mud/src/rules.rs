//! Tunables for character creation and the in-fiction calendar.

use chrono::{Datelike, FixedOffset, Months, NaiveDate, Offset, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargenRules {
    /// How far the game's calendar runs ahead of the real one.
    pub years_in_the_future: u32,
    pub minimum_character_age: u32,
    /// Timezone of the game's "today", in hours east of UTC.
    pub utc_offset_hours: i32,
    pub max_characters_per_account: usize,
}

impl Default for ChargenRules {
    fn default() -> Self {
        Self {
            years_in_the_future: 2,
            minimum_character_age: 18,
            utc_offset_hours: -8,
            max_characters_per_account: 10,
        }
    }
}

impl ChargenRules {
    pub fn offset(&self) -> FixedOffset {
        match self.utc_offset_hours.checked_mul(3600).and_then(FixedOffset::east_opt) {
            Some(offset) => offset,
            None => {
                tracing::warn!(hours = self.utc_offset_hours, "utc offset out of range, using UTC");
                Utc.fix()
            }
        }
    }

    /// A clock reading the real date in the configured timezone.
    pub fn clock(&self) -> GameClock {
        let today = Utc::now().with_timezone(&self.offset()).date_naive();
        GameClock::new(today, self.years_in_the_future)
    }
}

/// Real-world "today" plus the in-fiction year shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    real_today: NaiveDate,
    years_ahead: u32,
}

impl GameClock {
    pub fn new(real_today: NaiveDate, years_ahead: u32) -> Self {
        Self {
            real_today,
            years_ahead,
        }
    }

    pub fn real_today(&self) -> NaiveDate {
        self.real_today
    }

    /// The in-fiction date. February 29 lands on February 28 in common years.
    pub fn game_today(&self) -> NaiveDate {
        self.real_today
            .checked_add_months(Months::new(self.years_ahead.saturating_mul(12)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whole years lived by someone born on `birth` as of the game's today.
    /// Negative when `birth` is in the game's future.
    pub fn age_on(&self, birth: NaiveDate) -> i32 {
        let today = self.game_today();
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        years
    }
}
