//! Entity joins: resolve foreign keys into nested subjects.
//!
//! Species and habitats are reference data, loaded before anything else, so
//! a lookup that fails is a referential-integrity violation and is reported
//! as such rather than papered over with a default.

use crate::{
  Error, Result,
  entity::{Animal, Enclosure, Habitat, Id, Species, Task},
  subject::{
    AnimalDetail, AnimalSubject, EnclosureDetail, EnclosureSubject,
    HabitatBrief, SpeciesBrief,
  },
};

// ─── Lookups ─────────────────────────────────────────────────────────────────

fn find_species<'a>(animal: &Animal, species: &'a [Species]) -> Result<&'a Species> {
  species
    .iter()
    .find(|s| s.id == animal.species_id)
    .ok_or(Error::MissingSpecies {
      animal_id:  animal.id,
      species_id: animal.species_id,
    })
}

fn find_habitat<'a>(
  enclosure: &Enclosure,
  habitats: &'a [Habitat],
) -> Result<&'a Habitat> {
  habitats
    .iter()
    .find(|h| h.id == enclosure.habitat_id)
    .ok_or(Error::MissingHabitat {
      enclosure_id: enclosure.id,
      habitat_id:   enclosure.habitat_id,
    })
}

fn tasks_of_animal(id: Id, tasks: &[Task]) -> Vec<Task> {
  tasks
    .iter()
    .filter(|t| t.animal_id() == Some(id))
    .cloned()
    .collect()
}

fn tasks_of_enclosure(id: Id, tasks: &[Task]) -> Vec<Task> {
  tasks
    .iter()
    .filter(|t| t.enclosure_id() == Some(id))
    .cloned()
    .collect()
}

fn animals_in(id: Id, animals: &[Animal]) -> impl Iterator<Item = &Animal> {
  animals.iter().filter(move |a| a.enclosure_id == Some(id))
}

// ─── Short form ──────────────────────────────────────────────────────────────

/// Build the card-sized subject for `animal`: its identity, a species brief,
/// and the tasks it owns.
pub fn animal_to_subject(
  animal: &Animal,
  species: &[Species],
  tasks: &[Task],
) -> Result<AnimalSubject> {
  let sp = find_species(animal, species)?;
  Ok(AnimalSubject {
    animal_id: animal.id,
    name:      animal.name.clone(),
    image:     animal.image.clone(),
    species:   SpeciesBrief::from(sp),
    tasks:     tasks_of_animal(animal.id, tasks),
  })
}

/// Build the card-sized subject for `enclosure`, with every animal assigned
/// to it nested (in input order) and the tasks the enclosure itself owns.
pub fn enclosure_to_subject(
  enclosure: &Enclosure,
  animals: &[Animal],
  habitats: &[Habitat],
  species: &[Species],
  tasks: &[Task],
) -> Result<EnclosureSubject> {
  let habitat = find_habitat(enclosure, habitats)?;
  let nested = animals_in(enclosure.id, animals)
    .map(|a| animal_to_subject(a, species, tasks))
    .collect::<Result<Vec<_>>>()?;

  Ok(EnclosureSubject {
    enclosure_id: enclosure.id,
    name:         enclosure.name.clone(),
    image:        enclosure.image.clone(),
    habitat:      HabitatBrief::from(habitat),
    animals:      nested,
    tasks:        tasks_of_enclosure(enclosure.id, tasks),
  })
}

// ─── Long form ───────────────────────────────────────────────────────────────

/// Resolve `animal` with its full species, enclosure and habitat records.
///
/// An animal without an enclosure yields `enclosure: None, habitat: None`.
/// An enclosure id that does not resolve is an error.
pub fn animal_to_subject_long(
  animal: &Animal,
  species: &[Species],
  tasks: &[Task],
  enclosures: &[Enclosure],
  habitats: &[Habitat],
) -> Result<AnimalDetail> {
  let sp = find_species(animal, species)?;

  let enclosure = match animal.enclosure_id {
    None => None,
    Some(enclosure_id) => Some(
      enclosures
        .iter()
        .find(|e| e.id == enclosure_id)
        .ok_or(Error::MissingEnclosure {
          animal_id: animal.id,
          enclosure_id,
        })?,
    ),
  };
  let habitat = enclosure
    .map(|e| find_habitat(e, habitats))
    .transpose()?;

  Ok(AnimalDetail {
    animal:    animal.clone(),
    species:   sp.clone(),
    enclosure: enclosure.cloned(),
    habitat:   habitat.cloned(),
    tasks:     tasks_of_animal(animal.id, tasks),
  })
}

/// Resolve `enclosure` with its full habitat and fully-resolved animals.
/// Each nested animal keeps only the tasks it owns.
pub fn enclosure_to_subject_long(
  enclosure: &Enclosure,
  animals: &[Animal],
  habitats: &[Habitat],
  species: &[Species],
  tasks: &[Task],
) -> Result<EnclosureDetail> {
  let habitat = find_habitat(enclosure, habitats)?;
  let enclosures = std::slice::from_ref(enclosure);
  let nested = animals_in(enclosure.id, animals)
    .map(|a| animal_to_subject_long(a, species, tasks, enclosures, habitats))
    .collect::<Result<Vec<_>>>()?;

  Ok(EnclosureDetail {
    enclosure: enclosure.clone(),
    habitat:   habitat.clone(),
    animals:   nested,
    tasks:     tasks_of_enclosure(enclosure.id, tasks),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fixtures::*;

  #[test]
  fn animal_subject_keeps_only_its_tasks() {
    let species = vec![species(1, "Leopard Gecko", 10)];
    let tasks = vec![
      animal_task(1, 7),
      animal_task(2, 8),
      enclosure_task(3, 7),
      orphan_task(4),
    ];
    let subject =
      animal_to_subject(&animal(7, "Basil", 1, None), &species, &tasks).unwrap();

    assert_eq!(subject.animal_id, 7);
    assert_eq!(subject.species.name, "Leopard Gecko");
    assert_eq!(subject.tasks.iter().map(|t| t.id).collect::<Vec<_>>(), [1]);
  }

  #[test]
  fn missing_species_fails_fast() {
    let err = animal_to_subject(&animal(7, "Basil", 99, None), &[], &[])
      .unwrap_err();
    assert_eq!(err, Error::MissingSpecies { animal_id: 7, species_id: 99 });
    assert!(err.is_referential());
  }

  #[test]
  fn enclosure_subject_nests_its_animals() {
    let habitats = vec![habitat(10, "Desert")];
    let species = vec![species(1, "Leopard Gecko", 10)];
    let animals = vec![
      animal(1, "Basil", 1, Some(5)),
      animal(2, "Sage", 1, None),
      animal(3, "Thyme", 1, Some(5)),
      animal(4, "Dill", 1, Some(6)),
    ];
    let tasks = vec![enclosure_task(1, 5), animal_task(2, 3), enclosure_task(3, 6)];

    let subject = enclosure_to_subject(
      &enclosure(5, "Tank A", 10),
      &animals,
      &habitats,
      &species,
      &tasks,
    )
    .unwrap();

    assert_eq!(subject.habitat.name, "Desert");
    let names: Vec<_> = subject.animals.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Basil", "Thyme"]);
    assert_eq!(subject.tasks.iter().map(|t| t.id).collect::<Vec<_>>(), [1]);
    assert_eq!(subject.animals[1].tasks.len(), 1);
  }

  #[test]
  fn missing_habitat_fails_fast() {
    let err =
      enclosure_to_subject(&enclosure(5, "Tank A", 10), &[], &[], &[], &[])
        .unwrap_err();
    assert_eq!(err, Error::MissingHabitat { enclosure_id: 5, habitat_id: 10 });
  }

  #[test]
  fn long_animal_resolves_enclosure_and_habitat() {
    let habitats = vec![habitat(10, "Desert")];
    let species = vec![species(1, "Leopard Gecko", 10)];
    let enclosures = vec![enclosure(5, "Tank A", 10)];
    let tasks = vec![animal_task(1, 7)];

    let housed = animal_to_subject_long(
      &animal(7, "Basil", 1, Some(5)),
      &species,
      &tasks,
      &enclosures,
      &habitats,
    )
    .unwrap();
    assert_eq!(housed.enclosure.as_ref().map(|e| e.id), Some(5));
    assert_eq!(housed.habitat.as_ref().map(|h| h.name.as_str()), Some("Desert"));
    assert_eq!(housed.tasks.len(), 1);

    let loose = animal_to_subject_long(
      &animal(8, "Sage", 1, None),
      &species,
      &tasks,
      &enclosures,
      &habitats,
    )
    .unwrap();
    assert!(loose.enclosure.is_none());
    assert!(loose.habitat.is_none());
    assert!(loose.tasks.is_empty());
  }

  #[test]
  fn long_animal_with_dangling_enclosure_fails() {
    let species = vec![species(1, "Leopard Gecko", 10)];
    let err = animal_to_subject_long(
      &animal(7, "Basil", 1, Some(42)),
      &species,
      &[],
      &[],
      &[],
    )
    .unwrap_err();
    assert_eq!(err, Error::MissingEnclosure { animal_id: 7, enclosure_id: 42 });
  }

  #[test]
  fn long_enclosure_keeps_per_animal_tasks() {
    let habitats = vec![habitat(10, "Desert")];
    let species = vec![species(1, "Leopard Gecko", 10)];
    let animals = vec![animal(1, "Basil", 1, Some(5)), animal(2, "Thyme", 1, Some(5))];
    let tasks = vec![animal_task(1, 1), animal_task(2, 2), animal_task(3, 2)];

    let detail = enclosure_to_subject_long(
      &enclosure(5, "Tank A", 10),
      &animals,
      &habitats,
      &species,
      &tasks,
    )
    .unwrap();

    assert_eq!(detail.habitat.name, "Desert");
    assert_eq!(detail.animals.len(), 2);
    assert_eq!(detail.animals[0].tasks.len(), 1);
    assert_eq!(detail.animals[1].tasks.len(), 2);
    assert!(detail.tasks.is_empty());
    assert!(detail.animals.iter().all(|a| a.enclosure.is_some()));
  }
}
