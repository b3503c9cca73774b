//! Core types and the derivation layer for the critter front-end.
//!
//! Raw backend records go in; ordered, nested subjects and their badge
//! status come out. The derivations are pure: no I/O, no shared state, and
//! the current instant is always passed in. This crate is free of HTTP and
//! async-runtime dependencies; the data-access contract is the
//! [`source::CritterSource`] trait.

pub mod clock;
pub mod due;
pub mod entity;
pub mod error;
pub mod family;
pub mod join;
pub mod source;
pub mod status;
pub mod subject;

#[cfg(test)]
mod fixtures;

pub use error::{Error, Result};
