use thiserror::Error;

use crate::chargen::fields::Field;
use crate::race::Race;

/// Failure reported by a storage collaborator.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Rejected(String),
}

/// Login collaborator failures. `Display` is shown to the connecting user.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Incorrect username or password.")]
    InvalidCredentials,

    #[error("Sorry, the username '{0}' is already taken.")]
    UsernameTaken(String),

    #[error("Passwords must be at least {min} characters long.")]
    WeakPassword { min: usize },

    #[error("An error occurred. Please try again later.")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum ChargenError {
    #[error("invalid tier {tier} for race {race:?}")]
    TierOutOfRange { race: Race, tier: u8 },

    #[error("character is not ready: {}", .0.iter().map(|f| f.label()).collect::<Vec<_>>().join(", "))]
    NotReady(Vec<Field>),

    #[error("account already has {0} characters")]
    RosterFull(usize),

    #[error(transparent)]
    Host(#[from] HostError),
}

/// A node failed to render. Aborts the running dialogue.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("collaborator failure in node {node}: {source}")]
    Host {
        node: String,
        #[source]
        source: HostError,
    },

    #[error("node {node} entered without {missing}")]
    MissingState { node: String, missing: &'static str },
}
