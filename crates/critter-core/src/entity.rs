//! Raw backend records: animals, enclosures, habitats, species and tasks.
//!
//! These map 1:1 onto the JSON the backend serves. Optional foreign keys are
//! normalised here, at the deserialisation boundary: `null`, a missing field
//! and `0` all become `None`, so nothing downstream has to remember that zero
//! once meant "unassigned".

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Integer surrogate key, unique within its collection.
pub type Id = i64;

/// Deserialise an optional foreign key, folding `0` into `None`.
fn optional_id<'de, D>(deserializer: D) -> Result<Option<Id>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<Id>::deserialize(deserializer)?;
  Ok(raw.filter(|id| *id != 0))
}

// ─── Reference data ──────────────────────────────────────────────────────────

/// A habitat type. Read-only from the application's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habitat {
  pub id:          Id,
  pub name:        String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub image:       String,
  #[serde(default)]
  pub humidity:    String,
  /// Daytime temperature range, free text (e.g. "26-32°C").
  #[serde(default)]
  pub temp_day:    String,
  #[serde(default)]
  pub temp_night:  String,
}

/// Species reference data. Read-only from the application's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
  pub id:                  Id,
  pub common_name:         String,
  #[serde(default)]
  pub scientific_name:     String,
  #[serde(default)]
  pub image:               String,
  #[serde(default)]
  pub description:         String,
  pub habitat_id:          Id,
  #[serde(default)]
  pub diet:                String,
  #[serde(default)]
  pub sociality:           String,
  #[serde(default)]
  pub lifespan:            String,
  #[serde(default)]
  pub size:                String,
  #[serde(default)]
  pub weight:              String,
  #[serde(default)]
  pub conservation_status: String,
  #[serde(default)]
  pub care_notes:          String,
}

// ─── Owned records ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
  pub id:              Id,
  pub name:            String,
  /// Empty means "use the species image"; see [`Animal::display_image`].
  #[serde(default)]
  pub image:           String,
  #[serde(default)]
  pub gender:          String,
  pub dob:             Option<NaiveDate>,
  #[serde(default)]
  pub personality:     String,
  #[serde(default)]
  pub diet:            String,
  #[serde(default)]
  pub routine:         String,
  #[serde(default)]
  pub extra_notes:     String,
  pub species_id:      Id,
  #[serde(default, deserialize_with = "optional_id")]
  pub enclosure_id:    Option<Id>,
  #[serde(default)]
  pub is_memorialized: bool,
  #[serde(default)]
  pub last_message:    Option<String>,
  #[serde(default)]
  pub memorial_date:   Option<NaiveDate>,
}

impl Animal {
  /// The animal's own image, falling back to its species' image when unset.
  pub fn display_image<'a>(&'a self, species: &'a Species) -> &'a str {
    if self.image.is_empty() {
      &species.image
    } else {
      &self.image
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enclosure {
  pub id:         Id,
  pub name:       String,
  #[serde(default)]
  pub image:      String,
  #[serde(default)]
  pub notes:      String,
  pub habitat_id: Id,
}

// ─── Tasks ───────────────────────────────────────────────────────────────────

/// The single subject a task belongs to.
///
/// Flattened into its parent this serialises as either `"animalId": n` or
/// `"enclosureId": n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskOwner {
  #[serde(rename = "animalId")]
  Animal(Id),
  #[serde(rename = "enclosureId")]
  Enclosure(Id),
}

/// A recurring care task.
///
/// `owner` is `None` for orphaned records; those are kept so that they can
/// still be listed, but never surface in a derived subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
  pub id:                  Id,
  pub name:                String,
  pub description:         String,
  pub complete:            bool,
  pub last_completed:      DateTime<Utc>,
  /// Recurrence period in hours. Not validated here; see [`crate::due`].
  pub repeat_interv_hours: f64,
  pub owner:               Option<TaskOwner>,
}

impl Task {
  pub fn animal_id(&self) -> Option<Id> {
    match self.owner {
      Some(TaskOwner::Animal(id)) => Some(id),
      _ => None,
    }
  }

  pub fn enclosure_id(&self) -> Option<Id> {
    match self.owner {
      Some(TaskOwner::Enclosure(id)) => Some(id),
      _ => None,
    }
  }
}

/// Wire shape of a task, with both foreign keys spelled out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
  id:                  Id,
  name:                String,
  #[serde(default)]
  description:         String,
  #[serde(default)]
  complete:            bool,
  last_completed:      DateTime<Utc>,
  repeat_interv_hours: f64,
  #[serde(default, deserialize_with = "optional_id")]
  animal_id:           Option<Id>,
  #[serde(default, deserialize_with = "optional_id")]
  enclosure_id:        Option<Id>,
}

impl TryFrom<TaskRecord> for Task {
  type Error = Error;

  fn try_from(r: TaskRecord) -> Result<Self> {
    let owner = match (r.animal_id, r.enclosure_id) {
      (Some(_), Some(_)) => return Err(Error::AmbiguousTaskOwner(r.id)),
      (Some(id), None) => Some(TaskOwner::Animal(id)),
      (None, Some(id)) => Some(TaskOwner::Enclosure(id)),
      (None, None) => None,
    };
    Ok(Self {
      id: r.id,
      name: r.name,
      description: r.description,
      complete: r.complete,
      last_completed: r.last_completed,
      repeat_interv_hours: r.repeat_interv_hours,
      owner,
    })
  }
}

impl From<Task> for TaskRecord {
  fn from(t: Task) -> Self {
    Self {
      animal_id:           t.animal_id(),
      enclosure_id:        t.enclosure_id(),
      id:                  t.id,
      name:                t.name,
      description:         t.description,
      complete:            t.complete,
      last_completed:      t.last_completed,
      repeat_interv_hours: t.repeat_interv_hours,
    }
  }
}

// ─── Write models ────────────────────────────────────────────────────────────

fn require_name(kind: &'static str, name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(Error::EmptyName(kind));
  }
  Ok(())
}

fn require_interval(hours: f64) -> Result<()> {
  if !hours.is_finite() || hours <= 0.0 {
    return Err(Error::InvalidInterval(hours));
  }
  Ok(())
}

/// Body for creating an animal, or replacing one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimal {
  pub name:            String,
  pub image:           String,
  pub gender:          String,
  pub dob:             Option<NaiveDate>,
  pub personality:     String,
  pub diet:            String,
  pub routine:         String,
  pub extra_notes:     String,
  pub species_id:      Id,
  pub enclosure_id:    Option<Id>,
  pub is_memorialized: bool,
  pub last_message:    Option<String>,
  pub memorial_date:   Option<NaiveDate>,
}

impl NewAnimal {
  /// Convenience constructor with every optional field left empty.
  pub fn new(name: impl Into<String>, species_id: Id) -> Self {
    Self {
      name: name.into(),
      species_id,
      ..Self::default()
    }
  }

  pub fn validate(&self) -> Result<()> { require_name("animal", &self.name) }
}

impl From<&Animal> for NewAnimal {
  fn from(a: &Animal) -> Self {
    Self {
      name:            a.name.clone(),
      image:           a.image.clone(),
      gender:          a.gender.clone(),
      dob:             a.dob,
      personality:     a.personality.clone(),
      diet:            a.diet.clone(),
      routine:         a.routine.clone(),
      extra_notes:     a.extra_notes.clone(),
      species_id:      a.species_id,
      enclosure_id:    a.enclosure_id,
      is_memorialized: a.is_memorialized,
      last_message:    a.last_message.clone(),
      memorial_date:   a.memorial_date,
    }
  }
}

/// Body for creating an enclosure, or replacing one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEnclosure {
  pub name:       String,
  pub image:      String,
  pub notes:      String,
  pub habitat_id: Id,
}

impl NewEnclosure {
  pub fn new(name: impl Into<String>, habitat_id: Id) -> Self {
    Self {
      name: name.into(),
      habitat_id,
      ..Self::default()
    }
  }

  pub fn validate(&self) -> Result<()> {
    require_name("enclosure", &self.name)
  }
}

/// Body for creating a task. `lastCompleted` is set by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
  pub name:                String,
  pub description:         String,
  pub repeat_interv_hours: f64,
  #[serde(flatten)]
  pub owner:               TaskOwner,
}

impl NewTask {
  pub fn new(
    name: impl Into<String>,
    repeat_interv_hours: f64,
    owner: TaskOwner,
  ) -> Self {
    Self {
      name: name.into(),
      description: String::new(),
      repeat_interv_hours,
      owner,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require_name("task", &self.name)?;
    require_interval(self.repeat_interv_hours)
  }
}

/// Partial update of a task; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name:                Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub repeat_interv_hours: Option<f64>,
}

impl TaskPatch {
  pub fn validate(&self) -> Result<()> {
    if let Some(name) = &self.name {
      require_name("task", name)?;
    }
    if let Some(hours) = self.repeat_interv_hours {
      require_interval(hours)?;
    }
    Ok(())
  }

  /// Apply the patch to a task in place.
  pub fn apply(&self, task: &mut Task) {
    if let Some(name) = &self.name {
      task.name = name.clone();
    }
    if let Some(description) = &self.description {
      task.description = description.clone();
    }
    if let Some(hours) = self.repeat_interv_hours {
      task.repeat_interv_hours = hours;
    }
  }
}
