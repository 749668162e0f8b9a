// Model assembly: champion pool, relationship graph and power table.

use serde::Serialize;
use tracing::{info, warn};

use crate::champion::{ChampionId, ChampionPool};
use crate::corpus::CompletedDraft;
use crate::graph::{ChampionGraph, DEFAULT_MIN_OCCURRENCES};
use crate::power::PowerTable;

/// Options for [`build_models`].
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Minimum shared games before a synergy or counter edge is trusted.
    pub min_occurrences: u32,
    /// Champion names that belong to the selectable pool even when the
    /// corpus never mentions them.
    pub roster: Vec<String>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        ModelOptions {
            min_occurrences: DEFAULT_MIN_OCCURRENCES,
            roster: Vec::new(),
        }
    }
}

/// Immutable models shared by every evaluation and recommendation query.
#[derive(Debug, Clone, Default)]
pub struct DraftModels {
    pool: ChampionPool,
    graph: ChampionGraph,
    power: PowerTable,
}

/// Read-only view of one champion's corpus statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionSummary {
    pub name: String,
    pub games: u32,
    pub wins: u32,
    pub bans: u32,
    pub power: f64,
    pub pick_frequency: f64,
    pub ban_rate: f64,
    /// Picked or banned, as a fraction of drafts.
    pub presence: f64,
    /// False when the champion has no recorded games.
    pub known: bool,
}

/// Build every model from the corpus in one synchronous pass.
///
/// A corpus with no drafts yields empty models: every evaluation is neutral
/// and recommendations are empty.
pub fn build_models(corpus: &[CompletedDraft], options: &ModelOptions) -> DraftModels {
    if corpus.is_empty() {
        warn!("building models from an empty corpus; evaluations will be neutral");
    }

    let pool = ChampionPool::from_corpus(corpus, options.roster.iter().map(String::as_str));
    let graph = ChampionGraph::build(corpus, &pool, options.min_occurrences);
    let power = PowerTable::build(corpus, &pool);

    info!(
        "models built from {} drafts: {} champions, {} synergy pairs, {} counter pairs",
        corpus.len(),
        pool.len(),
        graph.synergy_pair_count(),
        graph.counter_pair_count()
    );

    DraftModels { pool, graph, power }
}

impl DraftModels {
    pub fn pool(&self) -> &ChampionPool {
        &self.pool
    }

    pub fn graph(&self) -> &ChampionGraph {
        &self.graph
    }

    pub fn power(&self) -> &PowerTable {
        &self.power
    }

    pub fn drafts(&self) -> usize {
        self.power.drafts()
    }

    /// True when there is no data to score against.
    pub fn is_empty(&self) -> bool {
        self.drafts() == 0 || self.pool.is_empty()
    }

    pub fn champion_id(&self, name: &str) -> Option<ChampionId> {
        self.pool.id(name)
    }

    pub fn summary(&self, name: &str) -> ChampionSummary {
        let id = self.pool.id(name);
        let record = self.power.record(id);
        ChampionSummary {
            name: id
                .map(|id| self.pool.name(id).to_string())
                .unwrap_or_else(|| name.trim().to_string()),
            games: record.games,
            wins: record.wins,
            bans: record.bans,
            power: self.power.power(id),
            pick_frequency: self.power.pick_frequency(id),
            ban_rate: self.power.ban_rate(id),
            presence: self.power.presence(id),
            known: record.games > 0,
        }
    }

    /// Summaries for every pooled champion, in pool order.
    pub fn champions(&self) -> Vec<ChampionSummary> {
        self.pool.iter().map(|(_, name)| self.summary(name)).collect()
    }
}
