// Champion pool: stable interning of champion names to dense ids.

use std::collections::HashMap;

use serde::Serialize;

use crate::corpus::CompletedDraft;

/// Dense index of a champion inside a [`ChampionPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChampionId(usize);

impl ChampionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Every champion known to the models, in first-seen order.
///
/// Insertion order is preserved because recommendation ranking falls back to
/// it as the final tie-break.
#[derive(Debug, Clone, Default)]
pub struct ChampionPool {
    names: Vec<String>,
    index: HashMap<String, ChampionId>,
}

impl ChampionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern every champion named in the corpus, then any roster extras.
    /// Blank names are ignored.
    pub fn from_corpus<'a>(
        corpus: &[CompletedDraft],
        roster: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut pool = ChampionPool::new();
        for draft in corpus {
            for name in draft.champions() {
                pool.intern(name);
            }
        }
        for name in roster {
            pool.intern(name);
        }
        pool
    }

    /// Return the id for `name`, adding it if unseen. Returns `None` for a
    /// blank name.
    pub fn intern(&mut self, name: &str) -> Option<ChampionId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if let Some(&id) = self.index.get(name) {
            return Some(id);
        }
        let id = ChampionId(self.names.len());
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        Some(id)
    }

    pub fn id(&self, name: &str) -> Option<ChampionId> {
        self.index.get(name.trim()).copied()
    }

    pub fn name(&self, id: ChampionId) -> &str {
        &self.names[id.0]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.id(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(id, name)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ChampionId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (ChampionId(i), n.as_str()))
    }
}
