//! EntityCache - the client-side mirror of server-owned entities.
//!
//! Entities are keyed by id and iterated in insertion order. Inserting an
//! entity whose id is already present replaces it in place.
//!
//! Besides the plain operations the cache offers sequenced variants
//! ([`EntityCache::apply_upsert`], [`EntityCache::apply_remove`]) that only take
//! effect if no later-issued operation has already touched the same id, and
//! [`Checkpoint`]s that undo an optimistic change.

use crate::{entity::normalize_date, parse_date, Entity, OpToken};
use std::collections::HashMap;

/// Entities sharing one day, in the order produced by [`EntityCache::grouped_by_date`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup<'a, E> {
    /// The normalized date shared by every entity in the group
    pub date: String,
    pub entities: Vec<&'a E>,
}

/// State captured before an optimistic mutation, used to undo it.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint<E> {
    id: String,
    /// Previous entry and its position
    previous: Option<(usize, E)>,
    stamp: Option<OpToken>,
    selected: Option<String>,
}

impl<E> Checkpoint<E> {
    /// The id this checkpoint covers.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// An in-memory, keyed, insertion-ordered collection of entities.
#[derive(Debug, Clone)]
pub struct EntityCache<E: Entity> {
    entries: Vec<E>,
    index: HashMap<String, usize>,
    /// Last applied token per id; kept after removal
    stamps: HashMap<String, OpToken>,
    selected: Option<String>,
}

impl<E: Entity> Default for EntityCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityCache<E> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            stamps: HashMap::new(),
            selected: None,
        }
    }

    /// Insert or replace an entity by id.
    ///
    /// The date is normalized to its day-only form first. A replaced entity
    /// keeps its position.
    pub fn upsert(&mut self, mut entity: E) {
        let day = normalize_date(entity.date()).to_string();
        entity.set_date(day);

        match self.index.get(entity.id()) {
            Some(&pos) => self.entries[pos] = entity,
            None => {
                self.index.insert(entity.id().to_string(), self.entries.len());
                self.entries.push(entity);
            }
        }
    }

    /// Remove an entity. Absent ids are ignored.
    ///
    /// Returns the removed entity. Clears the selection if it pointed at it.
    pub fn remove(&mut self, id: &str) -> Option<E> {
        let pos = self.index.remove(id)?;
        let removed = self.entries.remove(pos);

        for entry in &self.entries[pos..] {
            if let Some(slot) = self.index.get_mut(entry.id()) {
                *slot -= 1;
            }
        }

        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }

        Some(removed)
    }

    /// Get an entity by id.
    pub fn get(&self, id: &str) -> Option<&E> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.iter()
    }

    // Selection

    /// Select a cached entity by id. Returns false if the id is unknown.
    pub fn select(&mut self, id: &str) -> bool {
        if self.contains(id) {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Upsert `entity` and select it.
    pub fn select_entity(&mut self, entity: E) {
        let id = entity.id().to_string();
        self.upsert(entity);
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The selected entity, if any.
    pub fn selected(&self) -> Option<&E> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    // Derived views

    /// Entities sorted ascending by date.
    ///
    /// The sort is stable, so entities on the same day keep insertion order.
    /// Entities whose date does not parse come last.
    pub fn by_date(&self) -> Vec<&E> {
        let mut sorted: Vec<&E> = self.entries.iter().collect();
        sorted.sort_by_key(|e| {
            let day = parse_date(e.date());
            (day.is_none(), day)
        });
        sorted
    }

    /// [`by_date`](Self::by_date) partitioned into one group per date.
    pub fn grouped_by_date(&self) -> Vec<DateGroup<'_, E>> {
        let mut groups: Vec<DateGroup<'_, E>> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for entity in self.by_date() {
            let date = entity.date();
            match positions.get(date) {
                Some(&pos) => groups[pos].entities.push(entity),
                None => {
                    positions.insert(date, groups.len());
                    groups.push(DateGroup {
                        date: date.to_string(),
                        entities: vec![entity],
                    });
                }
            }
        }

        groups
    }

    // Sequenced operations

    /// The token of the last sequenced operation applied to `id`.
    pub fn stamp(&self, id: &str) -> Option<OpToken> {
        self.stamps.get(id).copied()
    }

    fn is_superseded(&self, id: &str, token: OpToken) -> bool {
        self.stamps
            .get(id)
            .is_some_and(|applied| token.issued_before(applied))
    }

    /// Upsert unless an operation issued after `token` already touched the id.
    ///
    /// Returns whether the entity was applied.
    pub fn apply_upsert(&mut self, entity: E, token: OpToken) -> bool {
        if self.is_superseded(entity.id(), token) {
            return false;
        }
        self.stamps.insert(entity.id().to_string(), token);
        self.upsert(entity);
        true
    }

    /// Remove unless an operation issued after `token` already touched the id.
    ///
    /// The stamp is recorded even if the id was absent, so an older
    /// completion cannot bring it back.
    pub fn apply_remove(&mut self, id: &str, token: OpToken) -> bool {
        if self.is_superseded(id, token) {
            return false;
        }
        self.stamps.insert(id.to_string(), token);
        self.remove(id);
        true
    }

    /// Capture the state of `id` before an optimistic mutation.
    pub fn checkpoint(&self, id: &str) -> Checkpoint<E> {
        Checkpoint {
            id: id.to_string(),
            previous: self
                .index
                .get(id)
                .map(|&pos| (pos, self.entries[pos].clone())),
            stamp: self.stamp(id),
            selected: self.selected.clone(),
        }
    }

    /// Undo the mutation made under `token` after `checkpoint` was taken.
    ///
    /// Does nothing and returns false if a later operation has since been
    /// applied to the same id.
    pub fn restore(&mut self, checkpoint: Checkpoint<E>, token: OpToken) -> bool {
        let Checkpoint {
            id,
            previous,
            stamp,
            selected,
        } = checkpoint;

        if self.stamp(&id) != Some(token) {
            return false;
        }

        let was_selected = self.selected.as_deref() == Some(id.as_str());

        match previous {
            Some((pos, entity)) => match self.index.get(&id) {
                Some(&current) => self.entries[current] = entity,
                None => self.insert_at(pos, entity),
            },
            None => {
                self.remove(&id);
            }
        }

        match stamp {
            Some(stamp) => self.stamps.insert(id, stamp),
            None => self.stamps.remove(&id),
        };

        if was_selected {
            self.selected = selected.filter(|prev| self.contains(prev));
        }

        true
    }

    fn insert_at(&mut self, pos: usize, entity: E) {
        let pos = pos.min(self.entries.len());
        self.entries.insert(pos, entity);
        for (offset, entry) in self.entries[pos..].iter().enumerate() {
            self.index.insert(entry.id().to_string(), pos + offset);
        }
    }
}
