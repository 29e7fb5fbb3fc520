//! Display-only character summaries listed at account login.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::race::MAX_TIER;

const TIER_COLORS: [&str; MAX_TIER as usize + 1] = ["", "`c", "`C", "`Y", "`p", "`M"];

/// One committed character as shown on the account overview. Written once
/// at commit time and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub tier: u8,
    pub archetype: String,
    pub modifier: Option<String>,
}

impl fmt::Display for RosterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.trim();
        if self.archetype.is_empty() {
            return write!(f, "`W{name}`x");
        }
        let color = TIER_COLORS.get(usize::from(self.tier)).copied().unwrap_or("");
        write!(f, "`W{name}`Y: `xTier {color}{}`x {}", self.tier, self.archetype)?;
        match &self.modifier {
            Some(modifier) => write!(f, " `Y(`x{modifier}`Y)`x"),
            None => f.write_str("`x"),
        }
    }
}

/// The account overview shown on the character-selection node.
pub fn account_overview(username: &str, entries: &[RosterEntry]) -> String {
    let mut out = String::new();
    out.push_str("`Y--------------------------------------------------------------------`x\n");
    out.push_str(&format!("Account`Y:`c {username}`x\n\n"));
    if entries.is_empty() {
        out.push_str("You have no characters yet.\n");
    } else {
        out.push_str("Characters`Y:`x\n");
        for entry in entries {
            out.push_str(&format!("  {entry}\n"));
        }
    }
    out.push('\n');
    out.push_str("Enter a character name to play, '`ccreate`x' to make a new one, or '`cquit`x'.\n");
    out.push_str("`Y--------------------------------------------------------------------`x");
    out
}
