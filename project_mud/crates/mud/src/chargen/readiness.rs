use strum::IntoEnumIterator;

use crate::chargen::draft::Draft;
use crate::chargen::fields::{Field, ValidationContext};

/// Karma cost of creating a character from `draft`. Always free for now.
pub fn karma_cost(_draft: &Draft) -> i64 {
    0
}

/// Outcome of running every validator against a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    /// Fields whose validator currently fails, in sheet order.
    pub failing: Vec<Field>,
    pub cost: i64,
    pub karma: i64,
}

impl Readiness {
    pub fn evaluate(ctx: &ValidationContext<'_>, draft: &Draft, karma: i64) -> Self {
        Self {
            failing: Field::iter().filter(|field| !field.is_valid(ctx, draft)).collect(),
            cost: karma_cost(draft),
            karma,
        }
    }

    pub fn can_afford(&self) -> bool {
        self.cost <= self.karma
    }

    pub fn is_ready(&self) -> bool {
        self.failing.is_empty() && self.can_afford()
    }

    pub fn is_failing(&self, field: Field) -> bool {
        self.failing.contains(&field)
    }
}
