//! Error types for `critter-client`.

use critter_core::entity::Id;
use thiserror::Error;

/// An error from one of the [`critter_core::source::CritterSource`]
/// implementations in this crate.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("invalid input: {0}")]
  Invalid(#[from] critter_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} → {status}")]
  Status {
    method: &'static str,
    path:   String,
    status: u16,
  },

  #[error("{kind} {id} not found")]
  NotFound { kind: &'static str, id: Id },
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// An error surfaced by [`crate::cache::QueryCache`].
#[derive(Debug, Error)]
pub enum CacheError<E>
where
  E: std::error::Error + 'static,
{
  #[error("data source error: {0}")]
  Source(#[source] E),

  #[error("derivation error: {0}")]
  Derive(#[from] critter_core::Error),

  #[error("{0} not found")]
  Missing(String),
}
