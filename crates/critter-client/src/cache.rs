//! [`QueryCache`] — a read-through cache of the raw collections.
//!
//! The cache holds no source of truth of its own. Each collection is either
//! loaded or not; [`QueryCache::snapshot`] fills whatever is missing and hands
//! out an immutable [`Snapshot`] that the derivation layer runs over.
//!
//! Mutations take the write lock for their whole duration and refetch every
//! collection they dirty before releasing it, so a snapshot never mixes data
//! from before and after the same write.

use std::{future::Future, sync::Arc};

use chrono::{DateTime, Utc};
use critter_core::{
  entity::{
    Animal, Enclosure, Habitat, Id, NewAnimal, NewEnclosure, NewTask, Species,
    Task, TaskPatch,
  },
  family::organize_family,
  join::{animal_to_subject_long, enclosure_to_subject_long},
  source::{Collection, CritterSource, Mutation},
  subject::{AnimalDetail, EnclosureDetail, Subject},
};
use strum::IntoEnumIterator;
use tokio::sync::RwLock;

use crate::CacheError;

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Every raw collection as of one point in the cache's history.
#[derive(Debug, Clone)]
pub struct Snapshot {
  pub animals:    Arc<Vec<Animal>>,
  pub enclosures: Arc<Vec<Enclosure>>,
  pub habitats:   Arc<Vec<Habitat>>,
  pub species:    Arc<Vec<Species>>,
  pub tasks:      Arc<Vec<Task>>,
}

impl Snapshot {
  /// The ordered subject list.
  pub fn family(&self) -> critter_core::Result<Vec<Subject>> {
    organize_family(
      &self.enclosures,
      &self.animals,
      &self.habitats,
      &self.species,
      &self.tasks,
    )
  }

  /// Fully resolved animal, or `None` if no animal has this id.
  pub fn animal_detail(&self, id: Id) -> critter_core::Result<Option<AnimalDetail>> {
    self
      .animals
      .iter()
      .find(|a| a.id == id)
      .map(|a| {
        animal_to_subject_long(
          a,
          &self.species,
          &self.tasks,
          &self.enclosures,
          &self.habitats,
        )
      })
      .transpose()
  }

  /// Fully resolved enclosure, or `None` if no enclosure has this id.
  pub fn enclosure_detail(
    &self,
    id: Id,
  ) -> critter_core::Result<Option<EnclosureDetail>> {
    self
      .enclosures
      .iter()
      .find(|e| e.id == id)
      .map(|e| {
        enclosure_to_subject_long(
          e,
          &self.animals,
          &self.habitats,
          &self.species,
          &self.tasks,
        )
      })
      .transpose()
  }

  pub fn task(&self, id: Id) -> Option<&Task> {
    self.tasks.iter().find(|t| t.id == id)
  }
}

// ─── Slots ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Slots {
  animals:    Option<Arc<Vec<Animal>>>,
  enclosures: Option<Arc<Vec<Enclosure>>>,
  habitats:   Option<Arc<Vec<Habitat>>>,
  species:    Option<Arc<Vec<Species>>>,
  tasks:      Option<Arc<Vec<Task>>>,
}

impl Slots {
  fn clear(&mut self, collection: Collection) {
    match collection {
      Collection::Animals => self.animals = None,
      Collection::Enclosures => self.enclosures = None,
      Collection::Habitats => self.habitats = None,
      Collection::Species => self.species = None,
      Collection::Tasks => self.tasks = None,
    }
  }

  fn is_loaded(&self, collection: Collection) -> bool {
    match collection {
      Collection::Animals => self.animals.is_some(),
      Collection::Enclosures => self.enclosures.is_some(),
      Collection::Habitats => self.habitats.is_some(),
      Collection::Species => self.species.is_some(),
      Collection::Tasks => self.tasks.is_some(),
    }
  }

  /// A snapshot, if every collection is loaded.
  fn snapshot(&self) -> Option<Snapshot> {
    Some(Snapshot {
      animals:    self.animals.clone()?,
      enclosures: self.enclosures.clone()?,
      habitats:   self.habitats.clone()?,
      species:    self.species.clone()?,
      tasks:      self.tasks.clone()?,
    })
  }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

pub struct QueryCache<S> {
  source: Arc<S>,
  slots:  RwLock<Slots>,
}

impl<S: CritterSource> QueryCache<S> {
  pub fn new(source: Arc<S>) -> Self {
    Self {
      source,
      slots: RwLock::new(Slots::default()),
    }
  }

  pub fn source(&self) -> &S { &self.source }

  async fn load(
    &self,
    slots: &mut Slots,
    collection: Collection,
  ) -> Result<(), CacheError<S::Error>> {
    tracing::debug!(%collection, "fetching");
    let src = &self.source;
    match collection {
      Collection::Animals => {
        slots.animals = Some(Arc::new(src.list_animals().await.map_err(CacheError::Source)?));
      }
      Collection::Enclosures => {
        slots.enclosures =
          Some(Arc::new(src.list_enclosures().await.map_err(CacheError::Source)?));
      }
      Collection::Habitats => {
        slots.habitats = Some(Arc::new(src.list_habitats().await.map_err(CacheError::Source)?));
      }
      Collection::Species => {
        slots.species = Some(Arc::new(src.list_species().await.map_err(CacheError::Source)?));
      }
      Collection::Tasks => {
        slots.tasks = Some(Arc::new(src.list_tasks().await.map_err(CacheError::Source)?));
      }
    }
    Ok(())
  }

  /// Load `collection` from the source, replacing any cached copy.
  pub async fn fetch(&self, collection: Collection) -> Result<(), CacheError<S::Error>> {
    let mut slots = self.slots.write().await;
    self.load(&mut slots, collection).await
  }

  /// Drop the cached copy of `collection`; the next snapshot refetches it.
  pub async fn invalidate(&self, collection: Collection) {
    tracing::debug!(%collection, "invalidated");
    self.slots.write().await.clear(collection);
  }

  /// Drop every cached collection.
  pub async fn invalidate_all(&self) {
    let mut slots = self.slots.write().await;
    for collection in Collection::iter() {
      slots.clear(collection);
    }
  }

  /// The current collections, fetching any that are not cached.
  pub async fn snapshot(&self) -> Result<Snapshot, CacheError<S::Error>> {
    if let Some(snapshot) = self.slots.read().await.snapshot() {
      return Ok(snapshot);
    }

    let mut slots = self.slots.write().await;
    for collection in Collection::iter() {
      if !slots.is_loaded(collection) {
        self.load(&mut slots, collection).await?;
      }
    }
    slots
      .snapshot()
      .ok_or_else(|| CacheError::Missing("cached collection".into()))
  }

  /// Invalidate and refetch everything `mutation` dirties.
  async fn refresh(
    &self,
    slots: &mut Slots,
    mutation: Mutation,
  ) -> Result<(), CacheError<S::Error>> {
    let dirty = mutation.invalidates();
    for collection in dirty {
      slots.clear(*collection);
    }
    for collection in dirty {
      self.load(slots, *collection).await?;
    }
    Ok(())
  }

  async fn mutate<'a, T, Fut>(
    &'a self,
    mutation: Mutation,
    op: impl FnOnce(&'a S) -> Fut,
  ) -> Result<T, CacheError<S::Error>>
  where
    Fut: Future<Output = Result<T, S::Error>>,
  {
    let mut slots = self.slots.write().await;
    let out = op(&self.source).await.map_err(|e| {
      tracing::warn!(%mutation, error = %e, "mutation failed");
      CacheError::Source(e)
    })?;
    tracing::info!(%mutation, "mutation applied");
    // The write stands even if the refetch fails; the dirty slots stay
    // cleared and the next snapshot retries them.
    if let Err(e) = self.refresh(&mut slots, mutation).await {
      tracing::warn!(%mutation, error = %e, "refetch after write failed");
    }
    Ok(out)
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  pub async fn create_animal(&self, input: NewAnimal) -> Result<Animal, CacheError<S::Error>> {
    self.mutate(Mutation::CreateAnimal, |s| s.create_animal(input)).await
  }

  pub async fn update_animal(
    &self,
    id: Id,
    input: NewAnimal,
  ) -> Result<Animal, CacheError<S::Error>> {
    self.mutate(Mutation::UpdateAnimal, |s| s.update_animal(id, input)).await
  }

  pub async fn delete_animal(&self, id: Id) -> Result<(), CacheError<S::Error>> {
    self.mutate(Mutation::DeleteAnimal, |s| s.delete_animal(id)).await
  }

  pub async fn create_enclosure(
    &self,
    input: NewEnclosure,
  ) -> Result<Enclosure, CacheError<S::Error>> {
    self.mutate(Mutation::CreateEnclosure, |s| s.create_enclosure(input)).await
  }

  pub async fn update_enclosure(
    &self,
    id: Id,
    input: NewEnclosure,
  ) -> Result<Enclosure, CacheError<S::Error>> {
    self
      .mutate(Mutation::UpdateEnclosure, |s| s.update_enclosure(id, input))
      .await
  }

  pub async fn delete_enclosure(&self, id: Id) -> Result<(), CacheError<S::Error>> {
    self.mutate(Mutation::DeleteEnclosure, |s| s.delete_enclosure(id)).await
  }

  pub async fn create_task(&self, input: NewTask) -> Result<Task, CacheError<S::Error>> {
    self.mutate(Mutation::CreateTask, |s| s.create_task(input)).await
  }

  pub async fn update_task(
    &self,
    id: Id,
    patch: TaskPatch,
  ) -> Result<Task, CacheError<S::Error>> {
    self.mutate(Mutation::UpdateTask, |s| s.update_task(id, patch)).await
  }

  pub async fn delete_task(&self, id: Id) -> Result<(), CacheError<S::Error>> {
    self.mutate(Mutation::DeleteTask, |s| s.delete_task(id)).await
  }

  /// Complete task `id`, showing it as done before the backend answers.
  ///
  /// The cached task is marked complete as of `now` and the lock released
  /// while the request is in flight. On success the tasks collection is
  /// refetched; on failure it is refetched too, which rolls the optimistic
  /// edit back, and the source error is returned.
  pub async fn complete_task(
    &self,
    id: Id,
    now: DateTime<Utc>,
  ) -> Result<Task, CacheError<S::Error>> {
    {
      let mut slots = self.slots.write().await;
      if let Some(tasks) = slots.tasks.as_mut()
        && let Some(task) = Arc::make_mut(tasks).iter_mut().find(|t| t.id == id)
      {
        task.complete = true;
        task.last_completed = now;
      }
    }

    let result = self.source.complete_task(id).await;

    let mut slots = self.slots.write().await;
    match result {
      Ok(task) => {
        tracing::info!(task_id = id, "task completed");
        if let Err(refetch) = self.refresh(&mut slots, Mutation::CompleteTask).await {
          tracing::warn!(task_id = id, error = %refetch, "refetch after completion failed");
        }
        Ok(task)
      }
      Err(e) => {
        tracing::warn!(task_id = id, error = %e, "completion failed, rolling back");
        if let Err(refetch) = self.refresh(&mut slots, Mutation::CompleteTask).await {
          tracing::warn!(error = %refetch, "rollback refetch failed");
        }
        Err(CacheError::Source(e))
      }
    }
  }
}
