pub mod appearance;
pub mod chargen;
pub mod connection;
pub mod dialogue;
pub mod error;
pub mod host;
pub mod login;
pub mod memory;
pub mod ooc;
pub mod race;
pub mod roster;
pub mod rules;
pub mod screens;
pub mod text;

pub use connection::{Connection, Phase};
pub use host::{AccountGate, CharacterVault, GameHost, NameDirectory};
pub use rules::{ChargenRules, GameClock};
