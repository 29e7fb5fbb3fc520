pub mod account;
pub mod character;
pub mod db;
pub mod error;
pub mod roster;
mod schema;

pub use account::{Account, AccountRepo};
pub use character::{CharacterRecord, CharacterRepo, CommitRecord};
pub use db::PlayerDb;
pub use error::PlayerDbError;
pub use roster::{RosterRecord, RosterRepo};
