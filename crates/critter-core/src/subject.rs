//! Subjects — the derived view models the front-end renders.
//!
//! A subject is either a standalone animal or an enclosure with its animals
//! nested inside. Subjects are never stored: they are rebuilt from the raw
//! collections on every pass and discarded afterwards. Only the source ids
//! survive, as list keys.

use serde::{Deserialize, Serialize};

use crate::entity::{Animal, Enclosure, Habitat, Id, Species, Task};

// ─── Briefs ──────────────────────────────────────────────────────────────────

/// The slice of a species a subject card needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesBrief {
  pub species_id: Id,
  pub name:       String,
  pub image:      String,
}

impl From<&Species> for SpeciesBrief {
  fn from(s: &Species) -> Self {
    Self {
      species_id: s.id,
      name:       s.common_name.clone(),
      image:      s.image.clone(),
    }
  }
}

/// The slice of a habitat a subject card needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitatBrief {
  pub habitat_id: Id,
  pub name:       String,
  pub image:      String,
}

impl From<&Habitat> for HabitatBrief {
  fn from(h: &Habitat) -> Self {
    Self {
      habitat_id: h.id,
      name:       h.name.clone(),
      image:      h.image.clone(),
    }
  }
}

// ─── Subjects ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSubject {
  pub animal_id: Id,
  pub name:      String,
  /// The animal's own image; empty means "use the species image".
  pub image:     String,
  pub species:   SpeciesBrief,
  /// Tasks owned by this animal only.
  pub tasks:     Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnclosureSubject {
  pub enclosure_id: Id,
  pub name:         String,
  pub image:        String,
  pub habitat:      HabitatBrief,
  /// Animals living in this enclosure, in input order.
  pub animals:      Vec<AnimalSubject>,
  /// Tasks owned by the enclosure itself, not by its animals.
  pub tasks:        Vec<Task>,
}

/// Identifies a subject across recomputations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SubjectKey {
  Animal(Id),
  Enclosure(Id),
}

/// One entry of the family list. The variant is fixed when the subject is
/// built and never re-derived from its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
  Animal(AnimalSubject),
  Enclosure(EnclosureSubject),
}

impl Subject {
  pub fn key(&self) -> SubjectKey {
    match self {
      Self::Animal(a) => SubjectKey::Animal(a.animal_id),
      Self::Enclosure(e) => SubjectKey::Enclosure(e.enclosure_id),
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Self::Animal(a) => &a.name,
      Self::Enclosure(e) => &e.name,
    }
  }

  /// Tasks owned directly by this subject. Nested animals' tasks are not
  /// included; see [`Subject::all_tasks`].
  pub fn own_tasks(&self) -> &[Task] {
    match self {
      Self::Animal(a) => &a.tasks,
      Self::Enclosure(e) => &e.tasks,
    }
  }

  /// Own tasks followed by those of every nested animal.
  pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
    let nested: &[AnimalSubject] = match self {
      Self::Animal(_) => &[],
      Self::Enclosure(e) => &e.animals,
    };
    self
      .own_tasks()
      .iter()
      .chain(nested.iter().flat_map(|a| a.tasks.iter()))
  }
}

// ─── Detail views ────────────────────────────────────────────────────────────

/// An animal with every related record resolved in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalDetail {
  pub animal:    Animal,
  pub species:   Species,
  pub enclosure: Option<Enclosure>,
  /// Habitat of `enclosure`; `None` whenever `enclosure` is.
  pub habitat:   Option<Habitat>,
  pub tasks:     Vec<Task>,
}

/// An enclosure with its habitat and animals resolved in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnclosureDetail {
  pub enclosure: Enclosure,
  pub habitat:   Habitat,
  pub animals:   Vec<AnimalDetail>,
  pub tasks:     Vec<Task>,
}
