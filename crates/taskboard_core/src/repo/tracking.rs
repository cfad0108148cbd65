//! Per-family change tracking for one unit of work.
//!
//! # Invariants
//! - Entries keep the order in which aggregates were first tracked.
//! - A tracked copy always shadows the persisted row with the same id.

use super::{RepoError, RepoResult};
use crate::model::event::DomainEvent;
use crate::model::Aggregate;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryState {
    Added,
    Modified,
}

#[derive(Debug)]
pub(crate) struct Tracked<T> {
    pub(crate) entity: T,
    pub(crate) state: EntryState,
}

#[derive(Debug)]
pub(crate) struct Tracker<T> {
    entity: &'static str,
    entries: Vec<Tracked<T>>,
}

impl<T: Aggregate + Clone> Tracker<T> {
    pub(crate) fn new(entity: &'static str) -> Self {
        Self {
            entity,
            entries: Vec::new(),
        }
    }

    pub(crate) fn get(&self, id: Uuid) -> Option<&T> {
        self.position(id).map(|index| &self.entries[index].entity)
    }

    pub(crate) fn contains(&self, id: Uuid) -> bool {
        self.position(id).is_some()
    }

    pub(crate) fn add(&mut self, entity: T) -> RepoResult<()> {
        let id = entity.aggregate_id();
        if self.contains(id) {
            return Err(RepoError::AlreadyTracked {
                entity: self.entity,
                id,
            });
        }
        self.entries.push(Tracked {
            entity,
            state: EntryState::Added,
        });
        Ok(())
    }

    /// Replaces the tracked copy, or starts tracking a loaded aggregate.
    pub(crate) fn update(&mut self, entity: T) {
        match self.position(entity.aggregate_id()) {
            Some(index) => self.entries[index].entity = entity,
            None => self.entries.push(Tracked {
                entity,
                state: EntryState::Modified,
            }),
        }
    }

    /// Overlays tracked copies onto persisted rows and filters the result.
    ///
    /// `rows` must come from a query at least as wide as `keep`.
    pub(crate) fn overlay(&self, rows: Vec<T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
        let mut merged: Vec<T> = rows
            .into_iter()
            .filter(|row| !self.contains(row.aggregate_id()))
            .collect();
        merged.extend(self.entries.iter().map(|entry| entry.entity.clone()));
        merged.retain(|entity| keep(entity));
        merged
    }

    pub(crate) fn entries(&self) -> &[Tracked<T>] {
        &self.entries
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|entry| &entry.entity)
    }

    /// Drains every tracked buffer, aggregate by aggregate in tracking order.
    pub(crate) fn drain_events(&mut self) -> Vec<DomainEvent> {
        self.entries
            .iter_mut()
            .flat_map(|entry| entry.entity.drain_events())
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.entity.aggregate_id() == id)
    }
}
