// Champion relationship graph: pairwise synergy and counter weights.
//
// Synergy edges are undirected and count how often two champions shared a
// side and how often that side won. Counter edges are directed: (A, B) counts
// games where A was picked against B and how many of those A's side won. Pairs
// observed fewer than `min_occurrences` times resolve to the neutral score.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::champion::{ChampionId, ChampionPool};
use crate::corpus::CompletedDraft;
use crate::draft::slot::Side;

/// Minimum number of shared games before an edge is trusted.
pub const DEFAULT_MIN_OCCURRENCES: u32 = 3;

/// Score reported for pairs without enough data.
pub const NEUTRAL_SCORE: f64 = 0.5;

// ---------------------------------------------------------------------------
// Edge types
// ---------------------------------------------------------------------------

/// Raw counts for one edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PairTally {
    pub games: u32,
    pub wins: u32,
}

impl PairTally {
    fn record(&mut self, won: bool) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
    }
}

/// A resolved edge weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeScore {
    /// Win rate in [0, 1], or [`NEUTRAL_SCORE`] when not confident.
    pub score: f64,
    pub games: u32,
    pub wins: u32,
    /// Whether `games` met the minimum-occurrence threshold.
    pub confident: bool,
}

impl EdgeScore {
    pub fn neutral() -> Self {
        EdgeScore {
            score: NEUTRAL_SCORE,
            games: 0,
            wins: 0,
            confident: false,
        }
    }

    fn from_tally(tally: PairTally, min_occurrences: u32) -> Self {
        if tally.games == 0 || tally.games < min_occurrences {
            return EdgeScore {
                score: NEUTRAL_SCORE,
                games: tally.games,
                wins: tally.wins,
                confident: false,
            };
        }
        EdgeScore {
            score: f64::from(tally.wins) / f64::from(tally.games),
            games: tally.games,
            wins: tally.wins,
            confident: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Read-only synergy/counter model built from a corpus.
#[derive(Debug, Clone, Default)]
pub struct ChampionGraph {
    /// Keyed by (lower id, higher id).
    synergy: HashMap<(ChampionId, ChampionId), PairTally>,
    /// Keyed by (champion, opponent).
    counter: HashMap<(ChampionId, ChampionId), PairTally>,
    min_occurrences: u32,
}

impl ChampionGraph {
    /// Build the graph from every draft in `corpus`.
    ///
    /// `pool` must already contain every champion named in the corpus.
    /// Duplicate names within one side are counted once.
    pub fn build(corpus: &[CompletedDraft], pool: &ChampionPool, min_occurrences: u32) -> Self {
        let mut graph = ChampionGraph {
            synergy: HashMap::new(),
            counter: HashMap::new(),
            min_occurrences,
        };

        for draft in corpus {
            let team1 = resolve_picks(pool, &draft.team1.picks);
            let team2 = resolve_picks(pool, &draft.team2.picks);

            for (side, picks) in [(Side::Team1, &team1), (Side::Team2, &team2)] {
                let won = draft.won(side);
                for (i, &a) in picks.iter().enumerate() {
                    for &b in &picks[i + 1..] {
                        graph.synergy.entry(synergy_key(a, b)).or_default().record(won);
                    }
                }
            }

            for &a in &team1 {
                for &b in &team2 {
                    if a == b {
                        continue;
                    }
                    graph
                        .counter
                        .entry((a, b))
                        .or_default()
                        .record(draft.won(Side::Team1));
                    graph
                        .counter
                        .entry((b, a))
                        .or_default()
                        .record(draft.won(Side::Team2));
                }
            }
        }

        debug!(
            "champion graph built: {} synergy pairs, {} counter pairs (min occurrences {})",
            graph.synergy.len(),
            graph.counter.len(),
            min_occurrences
        );

        graph
    }

    /// Joint win rate of `a` and `b` on the same side. Symmetric.
    pub fn synergy(&self, a: ChampionId, b: ChampionId) -> EdgeScore {
        if a == b {
            return EdgeScore::neutral();
        }
        self.synergy
            .get(&synergy_key(a, b))
            .map(|t| EdgeScore::from_tally(*t, self.min_occurrences))
            .unwrap_or_else(EdgeScore::neutral)
    }

    /// Win rate of `champion` when picked against `opponent`.
    pub fn counter(&self, champion: ChampionId, opponent: ChampionId) -> EdgeScore {
        self.counter
            .get(&(champion, opponent))
            .map(|t| EdgeScore::from_tally(*t, self.min_occurrences))
            .unwrap_or_else(EdgeScore::neutral)
    }

    pub fn min_occurrences(&self) -> u32 {
        self.min_occurrences
    }

    /// Number of distinct same-side pairs observed.
    pub fn synergy_pair_count(&self) -> usize {
        self.synergy.len()
    }

    /// Number of distinct directed opposition pairs observed.
    pub fn counter_pair_count(&self) -> usize {
        self.counter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synergy.is_empty() && self.counter.is_empty()
    }
}

fn synergy_key(a: ChampionId, b: ChampionId) -> (ChampionId, ChampionId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Map pick names to ids, dropping blanks, unknowns and repeats.
fn resolve_picks(pool: &ChampionPool, picks: &[String]) -> Vec<ChampionId> {
    let mut ids: Vec<ChampionId> = Vec::with_capacity(picks.len());
    for name in picks {
        if let Some(id) = pool.id(name) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TeamDraft;

    fn draft(t1: &[&str], t2: &[&str], winner: Side) -> CompletedDraft {
        CompletedDraft::new(
            TeamDraft::new(t1.iter().copied(), Vec::<String>::new()),
            TeamDraft::new(t2.iter().copied(), Vec::<String>::new()),
            winner,
        )
    }

    fn build(corpus: &[CompletedDraft], min: u32) -> (ChampionPool, ChampionGraph) {
        let pool = ChampionPool::from_corpus(corpus, []);
        let graph = ChampionGraph::build(corpus, &pool, min);
        (pool, graph)
    }

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn synergy_is_joint_win_rate_and_symmetric() {
        let mut corpus = Vec::new();
        for _ in 0..4 {
            corpus.push(draft(&["A", "B"], &["D"], Side::Team1));
        }
        corpus.push(draft(&["B", "A"], &["D"], Side::Team2));

        let (pool, graph) = build(&corpus, DEFAULT_MIN_OCCURRENCES);
        let a = pool.id("A").unwrap();
        let b = pool.id("B").unwrap();

        let ab = graph.synergy(a, b);
        let ba = graph.synergy(b, a);
        assert_eq!(ab, ba);
        assert_eq!(ab.games, 5);
        assert_eq!(ab.wins, 4);
        assert!(ab.confident);
        assert!(approx_eq(ab.score, 0.8, 1e-9));
    }

    #[test]
    fn below_threshold_is_neutral_and_not_confident() {
        let corpus = vec![
            draft(&["A", "B"], &["C"], Side::Team1),
            draft(&["A", "B"], &["C"], Side::Team1),
        ];
        let (pool, graph) = build(&corpus, 3);
        let a = pool.id("A").unwrap();
        let b = pool.id("B").unwrap();
        let c = pool.id("C").unwrap();

        let syn = graph.synergy(a, b);
        assert_eq!(syn.games, 2);
        assert!(!syn.confident);
        assert_eq!(syn.score, NEUTRAL_SCORE);

        let ctr = graph.counter(a, c);
        assert!(!ctr.confident);
        assert_eq!(ctr.score, NEUTRAL_SCORE);
    }

    #[test]
    fn counter_edges_are_directed() {
        let mut corpus = vec![draft(&["A"], &["C"], Side::Team1)];
        for _ in 0..3 {
            corpus.push(draft(&["A"], &["C"], Side::Team2));
        }
        let (pool, graph) = build(&corpus, 3);
        let a = pool.id("A").unwrap();
        let c = pool.id("C").unwrap();

        let c_vs_a = graph.counter(c, a);
        let a_vs_c = graph.counter(a, c);
        assert_eq!(c_vs_a.games, 4);
        assert!(approx_eq(c_vs_a.score, 0.75, 1e-9));
        assert!(approx_eq(a_vs_c.score, 0.25, 1e-9));
    }

    #[test]
    fn counter_counts_both_sides_of_the_draft() {
        // C on team1 this time: the (C, A) edge still accumulates.
        let corpus = vec![
            draft(&["A"], &["C"], Side::Team2),
            draft(&["C"], &["A"], Side::Team1),
            draft(&["C"], &["A"], Side::Team2),
        ];
        let (pool, graph) = build(&corpus, 1);
        let a = pool.id("A").unwrap();
        let c = pool.id("C").unwrap();
        let edge = graph.counter(c, a);
        assert_eq!(edge.games, 3);
        assert_eq!(edge.wins, 2);
    }

    #[test]
    fn unseen_pairs_and_self_pairs_are_neutral() {
        let corpus = vec![draft(&["A"], &["B"], Side::Team1)];
        let (pool, graph) = build(&corpus, 1);
        let a = pool.id("A").unwrap();
        let b = pool.id("B").unwrap();
        assert_eq!(graph.synergy(a, b), EdgeScore::neutral());
        assert_eq!(graph.synergy(a, a), EdgeScore::neutral());
        assert_eq!(graph.counter(a, a), EdgeScore::neutral());
    }

    #[test]
    fn duplicate_picks_on_a_side_count_once() {
        let corpus = vec![draft(&["A", "A", "B"], &["C"], Side::Team1)];
        let (pool, graph) = build(&corpus, 1);
        let a = pool.id("A").unwrap();
        let b = pool.id("B").unwrap();
        let c = pool.id("C").unwrap();
        assert_eq!(graph.synergy(a, b).games, 1);
        assert_eq!(graph.counter(a, c).games, 1);
        assert_eq!(graph.synergy_pair_count(), 1);
        assert_eq!(graph.counter_pair_count(), 4);
    }

    #[test]
    fn empty_corpus_builds_empty_graph() {
        let (_, graph) = build(&[], DEFAULT_MIN_OCCURRENCES);
        assert!(graph.is_empty());
        assert_eq!(graph.min_occurrences(), DEFAULT_MIN_OCCURRENCES);
    }
}
