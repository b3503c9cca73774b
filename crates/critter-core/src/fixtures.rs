//! Record builders shared by the unit tests.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::entity::{Animal, Enclosure, Habitat, Id, Species, Task, TaskOwner};

pub fn now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn habitat(id: Id, name: &str) -> Habitat {
  Habitat {
    id,
    name: name.into(),
    description: String::new(),
    image: format!("{}.png", name.to_lowercase()),
    humidity: String::new(),
    temp_day: String::new(),
    temp_night: String::new(),
  }
}

pub fn species(id: Id, name: &str, habitat_id: Id) -> Species {
  Species {
    id,
    common_name: name.into(),
    scientific_name: String::new(),
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
  }
}

pub fn animal(id: Id, name: &str, species_id: Id, enclosure_id: Option<Id>) -> Animal {
  Animal {
    id,
    name: name.into(),
    image: String::new(),
    gender: String::new(),
    dob: None,
    personality: String::new(),
    diet: String::new(),
    routine: String::new(),
    extra_notes: String::new(),
    species_id,
    enclosure_id,
    is_memorialized: false,
    last_message: None,
    memorial_date: None,
  }
}

pub fn enclosure(id: Id, name: &str, habitat_id: Id) -> Enclosure {
  Enclosure {
    id,
    name: name.into(),
    image: String::new(),
    notes: String::new(),
    habitat_id,
  }
}

/// A daily task completed `hours_ago` hours before [`now`].
pub fn task_at(
  id: Id,
  owner: Option<TaskOwner>,
  hours_ago: i64,
  complete: bool,
) -> Task {
  Task {
    id,
    name: format!("task {id}"),
    description: String::new(),
    complete,
    last_completed: now() - TimeDelta::hours(hours_ago),
    repeat_interv_hours: 24.0,
    owner,
  }
}

pub fn animal_task(id: Id, animal_id: Id) -> Task {
  task_at(id, Some(TaskOwner::Animal(animal_id)), 0, false)
}

pub fn enclosure_task(id: Id, enclosure_id: Id) -> Task {
  task_at(id, Some(TaskOwner::Enclosure(enclosure_id)), 0, false)
}

pub fn orphan_task(id: Id) -> Task { task_at(id, None, 0, false) }
