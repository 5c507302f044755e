//! Error types for the simulation.

use crate::types::{Location, OrganismId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("location {location} is outside the {depth}x{width} field")]
    OutOfBounds {
        location: Location,
        depth: usize,
        width: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `act` was invoked on an organism that had already died.
    #[error("organism {0} was asked to act after its death")]
    DeadOrganism(OrganismId),

    /// A living id has no backing record in the population store.
    #[error("organism {0} is missing from the population")]
    UnknownOrganism(OrganismId),

    #[error("location {0} is already occupied")]
    Occupied(Location),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Invariant violations point at a scheduler defect rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Error::DeadOrganism(_) | Error::UnknownOrganism(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
