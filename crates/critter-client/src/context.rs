//! [`Context`] — the explicit handle the front-end threads through its views.
//!
//! It bundles the data source (which carries the session's bearer token),
//! the query cache in front of it, and the clock used to evaluate due
//! status. There is no global state; whoever renders holds a `Context`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use critter_core::{
  clock::{Clock, SystemClock},
  entity::{Id, Task},
  source::CritterSource,
  status::{SubjectStatus, subject_status},
  subject::Subject,
};
use serde::Serialize;

use crate::{CacheError, QueryCache, Snapshot};

/// A subject together with its badge flags at the time it was derived.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyEntry {
  pub subject: Subject,
  pub status:  SubjectStatus,
}

pub struct Context<S, C = SystemClock> {
  cache: QueryCache<S>,
  clock: C,
}

impl<S: CritterSource> Context<S> {
  pub fn new(source: S) -> Self { Self::with_clock(source, SystemClock) }
}

impl<S: CritterSource, C: Clock> Context<S, C> {
  pub fn with_clock(source: S, clock: C) -> Self {
    Self {
      cache: QueryCache::new(Arc::new(source)),
      clock,
    }
  }

  pub fn source(&self) -> &S { self.cache.source() }

  pub fn now(&self) -> DateTime<Utc> { self.clock.now() }

  pub async fn snapshot(&self) -> Result<Snapshot, CacheError<S::Error>> {
    self.cache.snapshot().await
  }

  /// Derive the family list from the current snapshot, with each subject's
  /// status evaluated at the same instant.
  pub async fn family(&self) -> Result<Vec<FamilyEntry>, CacheError<S::Error>> {
    let snapshot = self.cache.snapshot().await?;
    let now = self.now();
    let family = snapshot
      .family()?
      .into_iter()
      .map(|subject| FamilyEntry {
        status: subject_status(&subject, now),
        subject,
      })
      .collect();
    Ok(family)
  }

  /// Complete a task; the same path serves the UI and reminder triggers.
  pub async fn complete_task(&self, id: Id) -> Result<Task, CacheError<S::Error>> {
    self.cache.complete_task(id, self.now()).await
  }

  /// Drop every cached collection so the next read refetches.
  pub async fn refresh(&self) { self.cache.invalidate_all().await }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeDelta, TimeZone};
  use critter_core::{clock::FixedClock, subject::SubjectKey};

  use super::*;
  use crate::MemorySource;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
  }

  fn status_of(family: &[FamilyEntry], key: SubjectKey) -> SubjectStatus {
    family
      .iter()
      .find(|e| e.subject.key() == key)
      .map(|e| e.status)
      .unwrap()
  }

  #[tokio::test]
  async fn family_carries_badges() {
    let ctx = Context::with_clock(MemorySource::demo(FixedClock(now())), FixedClock(now()));
    let family = ctx.family().await.unwrap();

    // Fresh hay: 26 h ago on a 24 h cycle, due but within grace.
    assert_eq!(status_of(&family, SubjectKey::Animal(30)), SubjectStatus {
      incomplete: true,
      overdue:    false,
    });
    // Mist terrarium: 60 h ago on a 12 h cycle.
    assert!(status_of(&family, SubjectKey::Enclosure(21)).overdue);
    // Calcium dusting for Sage is overdue, which lifts the Sand Tank.
    assert!(status_of(&family, SubjectKey::Enclosure(20)).overdue);
    assert!(!status_of(&family, SubjectKey::Enclosure(22)).incomplete);
  }

  #[tokio::test]
  async fn completing_clears_the_badge() {
    let ctx = Context::with_clock(MemorySource::demo(FixedClock(now())), FixedClock(now()));
    ctx.complete_task(42).await.unwrap();
    let family = ctx.family().await.unwrap();
    assert_eq!(
      status_of(&family, SubjectKey::Enclosure(21)),
      SubjectStatus::default()
    );
  }

  #[tokio::test]
  async fn status_follows_the_clock() {
    let later = now() + TimeDelta::hours(100);
    let ctx = Context::with_clock(MemorySource::demo(FixedClock(now())), FixedClock(later));
    let family = ctx.family().await.unwrap();
    assert!(status_of(&family, SubjectKey::Animal(34)).overdue);
  }
}
