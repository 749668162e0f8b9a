// Champion power table: aggregate win rate per champion.

use serde::Serialize;
use tracing::debug;

use crate::champion::{ChampionId, ChampionPool};
use crate::corpus::CompletedDraft;
use crate::draft::slot::Side;
use crate::graph::NEUTRAL_SCORE;

/// Aggregate counts for one champion across the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChampionRecord {
    /// Drafts in which the champion was picked.
    pub games: u32,
    pub wins: u32,
    /// Drafts in which either side banned the champion.
    pub bans: u32,
}

impl ChampionRecord {
    pub fn win_rate(&self) -> Option<f64> {
        if self.games == 0 {
            None
        } else {
            Some(f64::from(self.wins) / f64::from(self.games))
        }
    }
}

/// Per-champion strength in [0, 1].
///
/// Champions with no recorded games (including ones absent from the corpus)
/// take the mean power of the champions that were played, so unseen
/// champions are neither favored nor buried.
#[derive(Debug, Clone, Default)]
pub struct PowerTable {
    records: Vec<ChampionRecord>,
    mean_power: f64,
    drafts: usize,
}

impl PowerTable {
    pub fn build(corpus: &[CompletedDraft], pool: &ChampionPool) -> Self {
        let mut records = vec![ChampionRecord::default(); pool.len()];

        for draft in corpus {
            for side in [Side::Team1, Side::Team2] {
                let team = draft.team(side);
                let won = draft.won(side);
                let mut seen: Vec<ChampionId> = Vec::with_capacity(team.picks.len());
                for name in &team.picks {
                    let Some(id) = pool.id(name) else {
                        continue;
                    };
                    if seen.contains(&id) {
                        continue;
                    }
                    seen.push(id);
                    let rec = &mut records[id.index()];
                    rec.games += 1;
                    if won {
                        rec.wins += 1;
                    }
                }
            }

            let mut banned: Vec<ChampionId> = Vec::new();
            for name in draft.team1.bans.iter().chain(&draft.team2.bans) {
                if let Some(id) = pool.id(name) {
                    if !banned.contains(&id) {
                        banned.push(id);
                        records[id.index()].bans += 1;
                    }
                }
            }
        }

        let played: Vec<f64> = records.iter().filter_map(ChampionRecord::win_rate).collect();
        let mean_power = if played.is_empty() {
            NEUTRAL_SCORE
        } else {
            played.iter().sum::<f64>() / played.len() as f64
        };

        debug!(
            "power table built: {} of {} champions played, mean power {:.3}",
            played.len(),
            records.len(),
            mean_power
        );

        PowerTable {
            records,
            mean_power,
            drafts: corpus.len(),
        }
    }

    /// Power for a champion, falling back to the mean for unknown or unplayed
    /// champions.
    pub fn power(&self, id: Option<ChampionId>) -> f64 {
        id.and_then(|id| self.records.get(id.index()))
            .and_then(ChampionRecord::win_rate)
            .map(|wr| wr.clamp(0.0, 1.0))
            .unwrap_or(self.mean_power)
    }

    /// Whether the champion has at least one recorded game.
    pub fn is_known(&self, id: Option<ChampionId>) -> bool {
        self.record(id).games > 0
    }

    pub fn record(&self, id: Option<ChampionId>) -> ChampionRecord {
        id.and_then(|id| self.records.get(id.index()).copied())
            .unwrap_or_default()
    }

    /// Fraction of drafts in which the champion was picked.
    pub fn pick_frequency(&self, id: Option<ChampionId>) -> f64 {
        self.rate(self.record(id).games)
    }

    /// Fraction of drafts in which the champion was banned.
    pub fn ban_rate(&self, id: Option<ChampionId>) -> f64 {
        self.rate(self.record(id).bans)
    }

    /// Fraction of drafts in which the champion was picked or banned.
    pub fn presence(&self, id: Option<ChampionId>) -> f64 {
        let rec = self.record(id);
        self.rate(rec.games + rec.bans).min(1.0)
    }

    pub fn mean_power(&self) -> f64 {
        self.mean_power
    }

    pub fn drafts(&self) -> usize {
        self.drafts
    }

    fn rate(&self, count: u32) -> f64 {
        if self.drafts == 0 {
            0.0
        } else {
            f64::from(count) / self.drafts as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TeamDraft;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn sample_corpus() -> Vec<CompletedDraft> {
        vec![
            CompletedDraft::new(
                TeamDraft::new(["A", "B"], ["X"]),
                TeamDraft::new(["C"], ["X"]),
                Side::Team1,
            ),
            CompletedDraft::new(
                TeamDraft::new(["A"], Vec::<String>::new()),
                TeamDraft::new(["C"], ["B"]),
                Side::Team2,
            ),
        ]
    }

    #[test]
    fn power_is_win_rate() {
        let corpus = sample_corpus();
        let pool = ChampionPool::from_corpus(&corpus, []);
        let table = PowerTable::build(&corpus, &pool);

        assert!(approx_eq(table.power(pool.id("A")), 0.5, 1e-9));
        assert!(approx_eq(table.power(pool.id("B")), 1.0, 1e-9));
        assert!(approx_eq(table.power(pool.id("C")), 0.5, 1e-9));
        assert_eq!(table.record(pool.id("A")).games, 2);
        assert_eq!(table.drafts(), 2);
    }

    #[test]
    fn unplayed_and_unknown_champions_get_mean_power() {
        let corpus = sample_corpus();
        let pool = ChampionPool::from_corpus(&corpus, ["E"]);
        let table = PowerTable::build(&corpus, &pool);

        // Mean over played champions A (0.5), B (1.0), C (0.5).
        let mean = 2.0 / 3.0;
        assert!(approx_eq(table.mean_power(), mean, 1e-9));
        // X was only banned; E only appears on the roster.
        assert!(approx_eq(table.power(pool.id("X")), mean, 1e-9));
        assert!(approx_eq(table.power(pool.id("E")), mean, 1e-9));
        assert!(approx_eq(table.power(None), mean, 1e-9));
        assert!(!table.is_known(pool.id("X")));
        assert!(!table.is_known(None));
        assert!(table.is_known(pool.id("A")));
    }

    #[test]
    fn bans_and_frequencies() {
        let corpus = sample_corpus();
        let pool = ChampionPool::from_corpus(&corpus, []);
        let table = PowerTable::build(&corpus, &pool);

        // X banned by both sides in one draft counts once.
        assert_eq!(table.record(pool.id("X")).bans, 1);
        assert!(approx_eq(table.ban_rate(pool.id("X")), 0.5, 1e-9));
        assert!(approx_eq(table.pick_frequency(pool.id("A")), 1.0, 1e-9));
        assert!(approx_eq(table.presence(pool.id("B")), 1.0, 1e-9));
    }

    #[test]
    fn empty_corpus_is_neutral() {
        let pool = ChampionPool::from_corpus(&[], ["A"]);
        let table = PowerTable::build(&[], &pool);
        assert_eq!(table.mean_power(), NEUTRAL_SCORE);
        assert_eq!(table.power(pool.id("A")), NEUTRAL_SCORE);
        assert_eq!(table.pick_frequency(pool.id("A")), 0.0);
    }
}
