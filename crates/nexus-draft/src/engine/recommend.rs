// Recommendation ranking for the next pick or ban.
//
// Each legal candidate is added to the lineup of the side it would benefit:
// the acting side for a pick, the opposing side for a ban (a ban denies the
// opponent's best option). The composite score is that side's resulting win
// probability. Ties fall back to raw power, then corpus pick frequency, then
// candidate order.

use serde::Serialize;

use crate::champion::ChampionId;
use crate::draft::{DraftState, Phase, Side, Slot};
use crate::engine::evaluate::{
    evaluate_lineups, pair_advantage, pair_synergy, resolve, Lineup, COUNTER_WEIGHT, POWER_WEIGHT,
    SYNERGY_WEIGHT,
};
use crate::graph::NEUTRAL_SCORE;
use crate::models::DraftModels;

/// Minimum weighted contribution for a term to be named as a reason.
pub const REASON_THRESHOLD: f64 = 0.02;

/// How far above neutral a single edge must sit to be listed by name.
const NOTABLE_EDGE_MARGIN: f64 = 0.05;

/// Pick frequency above which a ban candidate is called "commonly picked".
const COMMON_PICK_FREQUENCY: f64 = 0.3;

// ---------------------------------------------------------------------------
// Priority tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    /// Top decile of the ranking.
    Critical,
    /// Up to the 30th percentile.
    High,
    /// Up to the 60th percentile.
    Medium,
    Low,
}

impl PriorityTier {
    /// Band a zero-based rank within a ranking of `total` candidates. The
    /// top candidate is always critical.
    pub fn from_rank(rank: usize, total: usize) -> Self {
        let cutoff = |fraction: f64| (total as f64 * fraction).ceil() as usize;
        if rank < cutoff(0.10).max(1) {
            PriorityTier::Critical
        } else if rank < cutoff(0.30) {
            PriorityTier::High
        } else if rank < cutoff(0.60) {
            PriorityTier::Medium
        } else {
            PriorityTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityTier::Critical => "CRITICAL",
            PriorityTier::High => "HIGH",
            PriorityTier::Medium => "MEDIUM",
            PriorityTier::Low => "LOW",
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Weighted deviation of each term from neutral for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TermContributions {
    pub power: f64,
    pub synergy: f64,
    pub counter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub champion: String,
    /// Whether this is a pick or a ban suggestion.
    pub action: Phase,
    /// Side whose lineup the candidate was scored into.
    pub scored_for: Side,
    /// Win probability of `scored_for` with the candidate added.
    pub score: f64,
    /// Change in `scored_for`'s win probability versus the current draft.
    pub win_rate_impact: f64,
    pub tier: PriorityTier,
    pub reasons: Vec<String>,
    /// Teammates of `scored_for` the candidate pairs well with.
    pub synergies: Vec<String>,
    /// Opponents of `scored_for` the candidate beats.
    pub counters: Vec<String>,
    pub contributions: TermContributions,
    pub power: f64,
    pub pick_frequency: f64,
    /// Cleared when the champion has no recorded games.
    pub confident: bool,
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Score and order every candidate. Tiers are assigned over the full
/// ranking, so truncating the result afterwards leaves them unchanged.
pub(crate) fn rank_candidates(
    models: &DraftModels,
    state: &DraftState,
    slot: Slot,
    candidates: Vec<String>,
) -> Vec<Recommendation> {
    let scored_for = match slot.phase {
        Phase::Pick => slot.side,
        Phase::Ban => slot.side.opponent(),
    };
    let allies_names = state.picks(scored_for);
    let rivals_names = state.picks(scored_for.opponent());
    let allies = resolve(models, allies_names);
    let rivals = resolve(models, rivals_names);
    let baseline = evaluate_lineups(models, &allies, &rivals).team1;

    let mut ranked: Vec<(usize, Recommendation)> = candidates
        .into_iter()
        .enumerate()
        .map(|(order, champion)| {
            let id = models.champion_id(&champion);
            let mut with_candidate: Lineup = allies.clone();
            with_candidate.push(id);
            let score = evaluate_lineups(models, &with_candidate, &rivals).team1;

            let ctx = CandidateContext {
                models,
                id,
                allies: &allies,
                allies_names,
                rivals: &rivals,
                rivals_names,
            };
            let synergies = ctx.notable_synergies();
            let counters = ctx.notable_counters();
            let contributions = ctx.contributions();
            let power = models.power().power(id);
            let pick_frequency = models.power().pick_frequency(id);
            let reasons = build_reasons(
                slot.phase,
                &contributions,
                &synergies,
                &counters,
                power,
                pick_frequency,
            );

            let rec = Recommendation {
                champion,
                action: slot.phase,
                scored_for,
                score,
                win_rate_impact: score - baseline,
                tier: PriorityTier::Low,
                reasons,
                synergies,
                counters,
                contributions,
                power,
                pick_frequency,
                confident: models.power().is_known(id),
            };
            (order, rec)
        })
        .collect();

    ranked.sort_by(|(oa, a), (ob, b)| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.power.total_cmp(&a.power))
            .then_with(|| b.pick_frequency.total_cmp(&a.pick_frequency))
            .then_with(|| oa.cmp(ob))
    });

    let total = ranked.len();
    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (_, mut rec))| {
            rec.tier = PriorityTier::from_rank(rank, total);
            rec
        })
        .collect()
}

/// One candidate against the current lineups.
struct CandidateContext<'a> {
    models: &'a DraftModels,
    id: Option<ChampionId>,
    allies: &'a [Option<ChampionId>],
    allies_names: &'a [String],
    rivals: &'a [Option<ChampionId>],
    rivals_names: &'a [String],
}

impl CandidateContext<'_> {
    /// Mean synergy of the candidate with each ally; neutral with no allies.
    fn synergy(&self) -> f64 {
        if self.allies.is_empty() {
            return NEUTRAL_SCORE;
        }
        let total: f64 = self
            .allies
            .iter()
            .map(|&ally| pair_synergy(self.models, self.id, ally))
            .sum();
        total / self.allies.len() as f64
    }

    /// Mean counter differential of the candidate against each rival.
    fn counter(&self) -> f64 {
        if self.rivals.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .rivals
            .iter()
            .map(|&rival| pair_advantage(self.models, self.id, rival))
            .sum();
        total / self.rivals.len() as f64
    }

    fn contributions(&self) -> TermContributions {
        TermContributions {
            power: POWER_WEIGHT * (self.models.power().power(self.id) - NEUTRAL_SCORE),
            synergy: SYNERGY_WEIGHT * (self.synergy() - NEUTRAL_SCORE),
            counter: COUNTER_WEIGHT * self.counter(),
        }
    }

    /// Allies with a trusted synergy edge clearly above neutral.
    fn notable_synergies(&self) -> Vec<String> {
        let Some(id) = self.id else {
            return Vec::new();
        };
        let mut found: Vec<(f64, String)> = self
            .allies
            .iter()
            .zip(self.allies_names)
            .filter_map(|(&ally, name)| {
                let edge = self.models.graph().synergy(id, ally?);
                (edge.confident && edge.score >= NEUTRAL_SCORE + NOTABLE_EDGE_MARGIN)
                    .then(|| (edge.score, format!("{} ({:.0}%)", name, edge.score * 100.0)))
            })
            .collect();
        found.sort_by(|a, b| b.0.total_cmp(&a.0));
        found.into_iter().map(|(_, s)| s).collect()
    }

    /// Rivals the candidate wins against on a trusted counter edge.
    fn notable_counters(&self) -> Vec<String> {
        let Some(id) = self.id else {
            return Vec::new();
        };
        let mut found: Vec<(f64, String)> = self
            .rivals
            .iter()
            .zip(self.rivals_names)
            .filter_map(|(&rival, name)| {
                let edge = self.models.graph().counter(id, rival?);
                (edge.confident && edge.score >= NEUTRAL_SCORE + NOTABLE_EDGE_MARGIN).then(|| {
                    (
                        edge.score,
                        format!("{} ({:.0}% WR)", name, edge.score * 100.0),
                    )
                })
            })
            .collect();
        found.sort_by(|a, b| b.0.total_cmp(&a.0));
        found.into_iter().map(|(_, s)| s).collect()
    }
}

fn build_reasons(
    phase: Phase,
    contributions: &TermContributions,
    synergies: &[String],
    counters: &[String],
    power: f64,
    pick_frequency: f64,
) -> Vec<String> {
    let mut reasons = Vec::new();
    // Named edges are appended when there are any; the term itself is
    // reported on its contribution alone.
    let naming = |lead: &str, items: &[String], fallback: &str| {
        if items.is_empty() {
            fallback.to_string()
        } else {
            let top: Vec<&str> = items.iter().take(2).map(String::as_str).collect();
            format!("{lead} {}", top.join(", "))
        }
    };

    match phase {
        Phase::Pick => {
            if contributions.synergy >= REASON_THRESHOLD {
                reasons.push(naming(
                    "Strong synergy with",
                    synergies,
                    "Strong synergy with our picks",
                ));
            }
            if contributions.counter >= REASON_THRESHOLD {
                reasons.push(naming("Counters", counters, "Counters enemy picks"));
            }
            if contributions.power >= REASON_THRESHOLD {
                reasons.push(format!("Strong meta pick ({:.1}% WR)", power * 100.0));
            }
            if reasons.is_empty() {
                reasons.push("Solid option".to_string());
            }
        }
        Phase::Ban => {
            if contributions.synergy >= REASON_THRESHOLD {
                reasons.push(naming(
                    "Denies enemy synergy with",
                    synergies,
                    "Denies enemy synergy",
                ));
            }
            if contributions.counter >= REASON_THRESHOLD {
                reasons.push(naming("Counters our", counters, "Counters our picks"));
            }
            if contributions.power >= REASON_THRESHOLD {
                reasons.push(format!("High win rate ({:.1}%)", power * 100.0));
            }
            if pick_frequency > COMMON_PICK_FREQUENCY {
                reasons.push(format!(
                    "Commonly picked ({:.0}% pick rate)",
                    pick_frequency * 100.0
                ));
            }
            if reasons.is_empty() {
                reasons.push("Standard ban".to_string());
            }
        }
    }

    reasons
}
