//! Error types for `critter-core`.

use thiserror::Error;

use crate::entity::Id;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
  #[error("animal {animal_id} references missing species {species_id}")]
  MissingSpecies { animal_id: Id, species_id: Id },

  #[error("enclosure {enclosure_id} references missing habitat {habitat_id}")]
  MissingHabitat { enclosure_id: Id, habitat_id: Id },

  #[error("animal {animal_id} references missing enclosure {enclosure_id}")]
  MissingEnclosure { animal_id: Id, enclosure_id: Id },

  #[error("task {0} references both an animal and an enclosure")]
  AmbiguousTaskOwner(Id),

  #[error("repeat interval must be a positive number of hours, got {0}")]
  InvalidInterval(f64),

  #[error("{0} name must not be empty")]
  EmptyName(&'static str),
}

impl Error {
  /// Whether this error stems from a foreign key that did not resolve.
  ///
  /// Callers holding a cache use this to tell "reference data has not caught
  /// up yet" apart from bad user input.
  pub fn is_referential(&self) -> bool {
    matches!(
      self,
      Self::MissingSpecies { .. }
        | Self::MissingHabitat { .. }
        | Self::MissingEnclosure { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
