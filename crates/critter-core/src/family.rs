//! The family list, every animal and enclosure as one ordered sequence.
//!
//! Unassigned animals come first, in input order. Every enclosure follows,
//! whether or not anything lives in it, ordered by habitat name from Z to A.
//! The front-end lays subjects out in a fixed grid keyed on this order, so
//! the order is part of the contract.

use std::cmp::Ordering;

use feruca::Collator;

use crate::{
  Error, Result,
  entity::{Animal, Enclosure, Habitat, Species, Task},
  join::{animal_to_subject, enclosure_to_subject},
  subject::{EnclosureSubject, Subject},
};

/// Unicode Collation Algorithm order with the CLDR root tailoring: accents
/// and case only break ties, and lowercase sorts before uppercase.
pub fn collate(a: &str, b: &str) -> Ordering {
  Collator::default().collate(a, b)
}

/// Sort enclosure subjects by descending habitat name. The sort is stable,
/// so enclosures sharing a habitat keep their input order.
pub fn sort_by_habitat_desc(subjects: &mut [EnclosureSubject]) {
  let mut collator = Collator::default();
  subjects.sort_by(|a, b| {
    collator.collate(b.habitat.name.as_str(), a.habitat.name.as_str())
  });
}

/// Build the ordered subject list from the raw collections.
///
/// Fails if any reference does not resolve, including an animal assigned to
/// an enclosure that is not in `enclosures`; such an animal would otherwise
/// vanish from the list.
pub fn organize_family(
  enclosures: &[Enclosure],
  animals: &[Animal],
  habitats: &[Habitat],
  species: &[Species],
  tasks: &[Task],
) -> Result<Vec<Subject>> {
  let (assigned, unassigned): (Vec<&Animal>, Vec<&Animal>) =
    animals.iter().partition(|a| a.enclosure_id.is_some());

  if let Some((animal_id, enclosure_id)) = assigned.iter().find_map(|a| {
    let enclosure_id = a.enclosure_id?;
    (!enclosures.iter().any(|e| e.id == enclosure_id))
      .then_some((a.id, enclosure_id))
  }) {
    return Err(Error::MissingEnclosure { animal_id, enclosure_id });
  }

  let mut family = unassigned
    .into_iter()
    .map(|a| animal_to_subject(a, species, tasks).map(Subject::Animal))
    .collect::<Result<Vec<_>>>()?;

  let mut housed = enclosures
    .iter()
    .map(|e| enclosure_to_subject(e, animals, habitats, species, tasks))
    .collect::<Result<Vec<_>>>()?;
  sort_by_habitat_desc(&mut housed);

  family.extend(housed.into_iter().map(Subject::Enclosure));
  Ok(family)
}
