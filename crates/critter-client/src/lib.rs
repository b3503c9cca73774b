//! Data access for the critter front-end.
//!
//! Provides two [`critter_core::source::CritterSource`] implementations (the
//! REST [`ApiClient`] and the in-process [`MemorySource`]), the
//! [`QueryCache`] that sits in front of either, and the [`Context`] handle
//! that ties a source, its cache and a clock together.

pub mod cache;
pub mod context;
pub mod error;
pub mod memory;
pub mod rest;

pub use cache::{QueryCache, Snapshot};
pub use context::{Context, FamilyEntry};
pub use error::{CacheError, ClientError, Result};
pub use memory::{MemorySource, Records};
pub use rest::{ApiClient, ApiConfig};
