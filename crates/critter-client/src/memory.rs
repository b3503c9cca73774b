//! [`MemorySource`] — an in-process [`CritterSource`].
//!
//! Backs the `--demo` mode of the CLI and stands in for the backend in
//! tests. It enforces the same referential rules the real backend does and
//! cascades deletes the way [`Mutation::invalidates`] describes.
//!
//! [`Mutation::invalidates`]: critter_core::source::Mutation::invalidates

use std::{
  collections::HashMap,
  sync::{
    Mutex, RwLock,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::{DateTime, TimeDelta, Utc};
use critter_core::{
  clock::Clock,
  entity::{
    Animal, Enclosure, Habitat, Id, NewAnimal, NewEnclosure, NewTask, Species,
    Task, TaskOwner, TaskPatch,
  },
  source::{Collection, CritterSource},
};

use crate::{ClientError, Result};

// ─── Records ─────────────────────────────────────────────────────────────────

/// Every raw collection, owned.
#[derive(Debug, Clone, Default)]
pub struct Records {
  pub animals:    Vec<Animal>,
  pub enclosures: Vec<Enclosure>,
  pub habitats:   Vec<Habitat>,
  pub species:    Vec<Species>,
  pub tasks:      Vec<Task>,
}

impl Records {
  fn max_id(&self) -> Id {
    let ids = self
      .animals
      .iter()
      .map(|a| a.id)
      .chain(self.enclosures.iter().map(|e| e.id))
      .chain(self.habitats.iter().map(|h| h.id))
      .chain(self.species.iter().map(|s| s.id))
      .chain(self.tasks.iter().map(|t| t.id));
    ids.max().unwrap_or(0)
  }
}

struct State {
  records: Records,
  next_id: Id,
}

impl State {
  fn allocate(&mut self) -> Id {
    let id = self.next_id;
    self.next_id += 1;
    id
  }

  fn require_species(&self, id: Id) -> Result<()> {
    if self.records.species.iter().any(|s| s.id == id) {
      Ok(())
    } else {
      Err(ClientError::NotFound { kind: "species", id })
    }
  }

  fn require_habitat(&self, id: Id) -> Result<()> {
    if self.records.habitats.iter().any(|h| h.id == id) {
      Ok(())
    } else {
      Err(ClientError::NotFound { kind: "habitat", id })
    }
  }

  fn require_enclosure(&self, id: Option<Id>) -> Result<()> {
    match id {
      Some(id) if !self.records.enclosures.iter().any(|e| e.id == id) => {
        Err(ClientError::NotFound { kind: "enclosure", id })
      }
      _ => Ok(()),
    }
  }

  fn require_owner(&self, owner: TaskOwner) -> Result<()> {
    match owner {
      TaskOwner::Animal(id) if !self.records.animals.iter().any(|a| a.id == id) => {
        Err(ClientError::NotFound { kind: "animal", id })
      }
      TaskOwner::Enclosure(id) => self.require_enclosure(Some(id)),
      TaskOwner::Animal(_) => Ok(()),
    }
  }

  fn task_mut(&mut self, id: Id) -> Result<&mut Task> {
    self
      .records
      .tasks
      .iter_mut()
      .find(|t| t.id == id)
      .ok_or(ClientError::NotFound { kind: "task", id })
  }
}

fn animal_from(id: Id, input: NewAnimal) -> Animal {
  Animal {
    id,
    name: input.name,
    image: input.image,
    gender: input.gender,
    dob: input.dob,
    personality: input.personality,
    diet: input.diet,
    routine: input.routine,
    extra_notes: input.extra_notes,
    species_id: input.species_id,
    enclosure_id: input.enclosure_id,
    is_memorialized: input.is_memorialized,
    last_message: input.last_message,
    memorial_date: input.memorial_date,
  }
}

fn enclosure_from(id: Id, input: NewEnclosure) -> Enclosure {
  Enclosure {
    id,
    name: input.name,
    image: input.image,
    notes: input.notes,
    habitat_id: input.habitat_id,
  }
}

// ─── Source ──────────────────────────────────────────────────────────────────

/// A [`CritterSource`] over in-process collections.
pub struct MemorySource {
  state:   RwLock<State>,
  clock:   Box<dyn Clock>,
  lists:   Mutex<HashMap<Collection, usize>>,
  offline: AtomicBool,
}

impl MemorySource {
  pub fn new(records: Records, clock: impl Clock + 'static) -> Self {
    let next_id = records.max_id() + 1;
    Self {
      state:   RwLock::new(State { records, next_id }),
      clock:   Box::new(clock),
      lists:   Mutex::new(HashMap::new()),
      offline: AtomicBool::new(false),
    }
  }

  /// A small household of reptiles, amphibians and a rabbit, with tasks in
  /// every due state relative to `now`.
  pub fn demo(clock: impl Clock + 'static) -> Self {
    let now = clock.now();
    Self::new(demo_records(now), clock)
  }

  /// How many times `collection` has been listed.
  pub fn list_count(&self, collection: Collection) -> usize {
    self
      .lists
      .lock()
      .map(|m| m.get(&collection).copied().unwrap_or(0))
      .unwrap_or(0)
  }

  /// While offline every mutation fails with `503`; reads keep working.
  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }

  /// A copy of everything currently stored.
  pub fn records(&self) -> Records { self.read().records.clone() }

  fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
    self.state.read().unwrap_or_else(|e| e.into_inner())
  }

  fn write(&self, path: String) -> Result<std::sync::RwLockWriteGuard<'_, State>> {
    if self.offline.load(Ordering::SeqCst) {
      return Err(ClientError::Status { method: "MEMORY", path, status: 503 });
    }
    Ok(self.state.write().unwrap_or_else(|e| e.into_inner()))
  }

  fn listed<T: Clone>(
    &self,
    collection: Collection,
    pick: impl FnOnce(&Records) -> &Vec<T>,
  ) -> Vec<T> {
    if let Ok(mut lists) = self.lists.lock() {
      *lists.entry(collection).or_default() += 1;
    }
    pick(&self.read().records).clone()
  }
}

impl CritterSource for MemorySource {
  type Error = ClientError;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_animals(&self) -> Result<Vec<Animal>> {
    Ok(self.listed(Collection::Animals, |r| &r.animals))
  }

  async fn list_enclosures(&self) -> Result<Vec<Enclosure>> {
    Ok(self.listed(Collection::Enclosures, |r| &r.enclosures))
  }

  async fn list_habitats(&self) -> Result<Vec<Habitat>> {
    Ok(self.listed(Collection::Habitats, |r| &r.habitats))
  }

  async fn list_species(&self) -> Result<Vec<Species>> {
    Ok(self.listed(Collection::Species, |r| &r.species))
  }

  async fn list_tasks(&self) -> Result<Vec<Task>> {
    Ok(self.listed(Collection::Tasks, |r| &r.tasks))
  }

  // ── Animals ───────────────────────────────────────────────────────────────

  async fn create_animal(&self, input: NewAnimal) -> Result<Animal> {
    input.validate()?;
    let mut state = self.write("/animals".into())?;
    state.require_species(input.species_id)?;
    state.require_enclosure(input.enclosure_id)?;
    let animal = animal_from(state.allocate(), input);
    state.records.animals.push(animal.clone());
    Ok(animal)
  }

  async fn update_animal(&self, id: Id, input: NewAnimal) -> Result<Animal> {
    input.validate()?;
    let mut state = self.write(format!("/animals/{id}"))?;
    state.require_species(input.species_id)?;
    state.require_enclosure(input.enclosure_id)?;
    let slot = state
      .records
      .animals
      .iter_mut()
      .find(|a| a.id == id)
      .ok_or(ClientError::NotFound { kind: "animal", id })?;
    *slot = animal_from(id, input);
    Ok(slot.clone())
  }

  async fn delete_animal(&self, id: Id) -> Result<()> {
    let mut state = self.write(format!("/animals/{id}"))?;
    let before = state.records.animals.len();
    state.records.animals.retain(|a| a.id != id);
    if state.records.animals.len() == before {
      return Err(ClientError::NotFound { kind: "animal", id });
    }
    state.records.tasks.retain(|t| t.animal_id() != Some(id));
    Ok(())
  }

  // ── Enclosures ────────────────────────────────────────────────────────────

  async fn create_enclosure(&self, input: NewEnclosure) -> Result<Enclosure> {
    input.validate()?;
    let mut state = self.write("/enclosures".into())?;
    state.require_habitat(input.habitat_id)?;
    let enclosure = enclosure_from(state.allocate(), input);
    state.records.enclosures.push(enclosure.clone());
    Ok(enclosure)
  }

  async fn update_enclosure(
    &self,
    id: Id,
    input: NewEnclosure,
  ) -> Result<Enclosure> {
    input.validate()?;
    let mut state = self.write(format!("/enclosures/{id}"))?;
    state.require_habitat(input.habitat_id)?;
    let slot = state
      .records
      .enclosures
      .iter_mut()
      .find(|e| e.id == id)
      .ok_or(ClientError::NotFound { kind: "enclosure", id })?;
    *slot = enclosure_from(id, input);
    Ok(slot.clone())
  }

  async fn delete_enclosure(&self, id: Id) -> Result<()> {
    let mut state = self.write(format!("/enclosures/{id}"))?;
    let before = state.records.enclosures.len();
    state.records.enclosures.retain(|e| e.id != id);
    if state.records.enclosures.len() == before {
      return Err(ClientError::NotFound { kind: "enclosure", id });
    }
    for animal in &mut state.records.animals {
      if animal.enclosure_id == Some(id) {
        animal.enclosure_id = None;
      }
    }
    state.records.tasks.retain(|t| t.enclosure_id() != Some(id));
    Ok(())
  }

  // ── Tasks ─────────────────────────────────────────────────────────────────

  async fn create_task(&self, input: NewTask) -> Result<Task> {
    input.validate()?;
    let now = self.clock.now();
    let mut state = self.write("/tasks".into())?;
    state.require_owner(input.owner)?;
    let task = Task {
      id:                  state.allocate(),
      name:                input.name,
      description:         input.description,
      complete:            false,
      last_completed:      now,
      repeat_interv_hours: input.repeat_interv_hours,
      owner:               Some(input.owner),
    };
    state.records.tasks.push(task.clone());
    Ok(task)
  }

  async fn update_task(&self, id: Id, patch: TaskPatch) -> Result<Task> {
    patch.validate()?;
    let mut state = self.write(format!("/tasks/{id}"))?;
    let task = state.task_mut(id)?;
    patch.apply(task);
    Ok(task.clone())
  }

  async fn delete_task(&self, id: Id) -> Result<()> {
    let mut state = self.write(format!("/tasks/{id}"))?;
    let before = state.records.tasks.len();
    state.records.tasks.retain(|t| t.id != id);
    if state.records.tasks.len() == before {
      return Err(ClientError::NotFound { kind: "task", id });
    }
    Ok(())
  }

  async fn complete_task(&self, id: Id) -> Result<Task> {
    let now = self.clock.now();
    let mut state = self.write(format!("/tasks/{id}/complete"))?;
    let task = state.task_mut(id)?;
    task.complete = true;
    task.last_completed = now;
    Ok(task.clone())
  }
}

// ─── Demo data ───────────────────────────────────────────────────────────────

fn demo_records(now: DateTime<Utc>) -> Records {
  let habitat = |id, name: &str, humidity: &str, day: &str, night: &str| Habitat {
    id,
    name: name.into(),
    description: String::new(),
    image: String::new(),
    humidity: humidity.into(),
    temp_day: day.into(),
    temp_night: night.into(),
  };
  let species = |id, common: &str, scientific: &str, habitat_id| Species {
    id,
    common_name: common.into(),
    scientific_name: scientific.into(),
    image: String::new(),
    description: String::new(),
    habitat_id,
    diet: String::new(),
    sociality: String::new(),
    lifespan: String::new(),
    size: String::new(),
    weight: String::new(),
    conservation_status: String::new(),
    care_notes: String::new(),
  };
  let enclosure = |id, name: &str, habitat_id| Enclosure {
    id,
    name: name.into(),
    image: String::new(),
    notes: String::new(),
    habitat_id,
  };
  let animal = |id, name: &str, species_id, enclosure_id| {
    animal_from(id, NewAnimal {
      enclosure_id,
      ..NewAnimal::new(name, species_id)
    })
  };
  let task = |id, name: &str, hours_ago: i64, interval: f64, owner| Task {
    id,
    name: name.into(),
    description: String::new(),
    complete: false,
    last_completed: now - TimeDelta::hours(hours_ago),
    repeat_interv_hours: interval,
    owner: Some(owner),
  };

  Records {
    habitats:   vec![
      habitat(1, "Desert", "20-30%", "28-35°C", "20-24°C"),
      habitat(2, "Rainforest", "70-90%", "24-28°C", "20-22°C"),
      habitat(3, "Grassland", "40-60%", "18-24°C", "10-16°C"),
    ],
    species:    vec![
      species(10, "Leopard Gecko", "Eublepharis macularius", 1),
      species(11, "Red-eyed Tree Frog", "Agalychnis callidryas", 2),
      species(12, "Bearded Dragon", "Pogona vitticeps", 1),
      species(13, "Holland Lop", "Oryctolagus cuniculus", 3),
    ],
    enclosures: vec![
      enclosure(20, "Sand Tank", 1),
      enclosure(21, "Frog Terrarium", 2),
      enclosure(22, "Rabbit Run", 3),
    ],
    animals:    vec![
      animal(30, "Clover", 13, None),
      animal(31, "Basil", 10, Some(20)),
      animal(32, "Sage", 10, Some(20)),
      animal(33, "Kermit", 11, Some(21)),
      animal(34, "Pebble", 12, None),
    ],
    tasks:      vec![
      task(40, "Feed crickets", 30, 48.0, TaskOwner::Animal(31)),
      task(41, "Dust with calcium", 200, 168.0, TaskOwner::Animal(32)),
      task(42, "Mist terrarium", 60, 12.0, TaskOwner::Enclosure(21)),
      task(43, "Spot clean", 20, 24.0, TaskOwner::Enclosure(20)),
      task(44, "Fresh hay", 26, 24.0, TaskOwner::Animal(30)),
      task(45, "Bath", 2, 72.0, TaskOwner::Animal(34)),
    ],
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use critter_core::{clock::FixedClock, family::organize_family};

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
  }

  fn source() -> MemorySource { MemorySource::demo(FixedClock(now())) }

  #[tokio::test]
  async fn demo_data_is_referentially_valid() {
    let r = source().records();
    let family =
      organize_family(&r.enclosures, &r.animals, &r.habitats, &r.species, &r.tasks)
        .unwrap();
    assert_eq!(family.len(), 2 + 3);
  }

  #[tokio::test]
  async fn create_assigns_fresh_ids() {
    let s = source();
    let a = s.create_animal(NewAnimal::new("Fig", 10)).await.unwrap();
    let b = s.create_animal(NewAnimal::new("Olive", 10)).await.unwrap();
    assert!(a.id > 45);
    assert_eq!(b.id, a.id + 1);
    assert_eq!(s.list_animals().await.unwrap().len(), 7);
  }

  #[tokio::test]
  async fn create_rejects_unknown_references() {
    let s = source();
    let err = s.create_animal(NewAnimal::new("Fig", 999)).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { kind: "species", id: 999 }));

    let err = s
      .create_task(NewTask::new("Feed", 24.0, TaskOwner::Animal(999)))
      .await
      .unwrap_err();
    assert!(matches!(err, ClientError::NotFound { kind: "animal", id: 999 }));
  }

  #[tokio::test]
  async fn create_task_validates_interval() {
    let err = source()
      .create_task(NewTask::new("Feed", 0.0, TaskOwner::Animal(31)))
      .await
      .unwrap_err();
    assert!(matches!(err, ClientError::Invalid(_)));
  }

  #[tokio::test]
  async fn complete_stamps_now() {
    let s = source();
    let task = s.complete_task(41).await.unwrap();
    assert!(task.complete);
    assert_eq!(task.last_completed, now());
  }

  #[tokio::test]
  async fn delete_enclosure_releases_animals_and_drops_tasks() {
    let s = source();
    s.delete_enclosure(20).await.unwrap();
    let r = s.records();
    assert!(r.animals.iter().all(|a| a.enclosure_id != Some(20)));
    assert_eq!(r.animals.iter().filter(|a| a.enclosure_id.is_none()).count(), 4);
    assert!(r.tasks.iter().all(|t| t.enclosure_id() != Some(20)));
  }

  #[tokio::test]
  async fn delete_animal_drops_its_tasks() {
    let s = source();
    s.delete_animal(31).await.unwrap();
    assert!(s.records().tasks.iter().all(|t| t.animal_id() != Some(31)));
    assert!(matches!(
      s.delete_animal(31).await,
      Err(ClientError::NotFound { kind: "animal", id: 31 })
    ));
  }

  #[tokio::test]
  async fn offline_blocks_writes_only() {
    let s = source();
    s.set_offline(true);
    assert!(matches!(
      s.complete_task(40).await,
      Err(ClientError::Status { status: 503, .. })
    ));
    assert_eq!(s.list_tasks().await.unwrap().len(), 6);
    assert_eq!(s.list_count(Collection::Tasks), 1);
  }
}
