//! The `CritterSource` trait and the invalidation contract.
//!
//! The trait is implemented by data-access backends (the REST client and the
//! in-memory source in `critter-client`). The derivation layer never calls
//! it; caches do, and re-run the derivation on whatever they fetched.

use std::future::Future;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::entity::{
  Animal, Enclosure, Habitat, Id, NewAnimal, NewEnclosure, NewTask, Species,
  Task, TaskPatch,
};

// ─── Collections ─────────────────────────────────────────────────────────────

/// A raw collection served by the backend.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumIter,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
  Animals,
  Enclosures,
  Habitats,
  Species,
  Tasks,
}

/// A write the backend has accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Mutation {
  CreateAnimal,
  UpdateAnimal,
  DeleteAnimal,
  CreateEnclosure,
  UpdateEnclosure,
  DeleteEnclosure,
  CreateTask,
  UpdateTask,
  DeleteTask,
  CompleteTask,
}

impl Mutation {
  /// The collections whose cached copies are stale once this mutation
  /// succeeds. Deletes cascade server-side: an animal takes its tasks with
  /// it, and an enclosure releases its animals and takes its tasks.
  pub fn invalidates(self) -> &'static [Collection] {
    use Collection as C;
    match self {
      Self::CreateAnimal | Self::UpdateAnimal => &[C::Animals],
      Self::DeleteAnimal => &[C::Animals, C::Tasks],
      Self::CreateEnclosure | Self::UpdateEnclosure => &[C::Enclosures],
      Self::DeleteEnclosure => &[C::Enclosures, C::Animals, C::Tasks],
      Self::CreateTask
      | Self::UpdateTask
      | Self::DeleteTask
      | Self::CompleteTask => &[C::Tasks],
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the backend that owns animals, enclosures, reference
/// data and tasks.
///
/// Creates validate their input before any request is made. All methods
/// return `Send` futures so the trait can be driven from a multi-threaded
/// tokio runtime.
pub trait CritterSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn list_animals(
    &self,
  ) -> impl Future<Output = Result<Vec<Animal>, Self::Error>> + Send + '_;

  fn list_enclosures(
    &self,
  ) -> impl Future<Output = Result<Vec<Enclosure>, Self::Error>> + Send + '_;

  fn list_habitats(
    &self,
  ) -> impl Future<Output = Result<Vec<Habitat>, Self::Error>> + Send + '_;

  fn list_species(
    &self,
  ) -> impl Future<Output = Result<Vec<Species>, Self::Error>> + Send + '_;

  fn list_tasks(
    &self,
  ) -> impl Future<Output = Result<Vec<Task>, Self::Error>> + Send + '_;

  // ── Animals ───────────────────────────────────────────────────────────

  fn create_animal(
    &self,
    input: NewAnimal,
  ) -> impl Future<Output = Result<Animal, Self::Error>> + Send + '_;

  /// Replace every writable field of animal `id`.
  fn update_animal(
    &self,
    id: Id,
    input: NewAnimal,
  ) -> impl Future<Output = Result<Animal, Self::Error>> + Send + '_;

  fn delete_animal(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Enclosures ────────────────────────────────────────────────────────

  fn create_enclosure(
    &self,
    input: NewEnclosure,
  ) -> impl Future<Output = Result<Enclosure, Self::Error>> + Send + '_;

  fn update_enclosure(
    &self,
    id: Id,
    input: NewEnclosure,
  ) -> impl Future<Output = Result<Enclosure, Self::Error>> + Send + '_;

  fn delete_enclosure(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Tasks ─────────────────────────────────────────────────────────────

  fn create_task(
    &self,
    input: NewTask,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  fn update_task(
    &self,
    id: Id,
    patch: TaskPatch,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  fn delete_task(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Mark task `id` complete. The backend stamps `lastCompleted`.
  fn complete_task(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;
}
