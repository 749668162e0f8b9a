// Win probability from power, synergy and counter terms.
//
// For each side: mean power of its picks and mean synergy over its same-side
// pairs. Across sides: team1's counter advantage, the mean over cross pairs
// of counter(t1, t2) - counter(t2, t1). The weighted difference is squashed
// through a logistic into (0, 1).

use serde::Serialize;

use crate::champion::ChampionId;
use crate::draft::Side;
use crate::graph::NEUTRAL_SCORE;
use crate::models::DraftModels;

/// Weight of the mean-power difference.
pub const POWER_WEIGHT: f64 = 1.0;
/// Weight of the mean-synergy difference.
pub const SYNERGY_WEIGHT: f64 = 0.3;
/// Weight of team1's counter advantage.
pub const COUNTER_WEIGHT: f64 = 0.4;
/// Slope of the logistic applied to the weighted score difference.
pub const LOGISTIC_STEEPNESS: f64 = 4.0;

/// The terms behind a [`WinProbability`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationFactors {
    pub team1_power: f64,
    pub team2_power: f64,
    pub team1_synergy: f64,
    pub team2_synergy: f64,
    /// Mean counter differential from team1's point of view, in [-1, 1].
    pub counter_advantage: f64,
    /// Weighted team1 minus team2 score before squashing.
    pub score_difference: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinProbability {
    pub team1: f64,
    pub team2: f64,
    pub factors: EvaluationFactors,
}

impl WinProbability {
    pub fn for_side(&self, side: Side) -> f64 {
        match side {
            Side::Team1 => self.team1,
            Side::Team2 => self.team2,
        }
    }
}

/// Resolved picks for one side. `None` marks a champion unknown to the pool.
pub(crate) type Lineup = Vec<Option<ChampionId>>;

pub(crate) fn resolve(models: &DraftModels, names: &[String]) -> Lineup {
    names.iter().map(|n| models.champion_id(n)).collect()
}

pub(crate) fn mean_power(models: &DraftModels, lineup: &[Option<ChampionId>]) -> f64 {
    if lineup.is_empty() {
        return NEUTRAL_SCORE;
    }
    let total: f64 = lineup.iter().map(|&id| models.power().power(id)).sum();
    total / lineup.len() as f64
}

/// Mean synergy over same-side pairs; neutral with fewer than two picks.
pub(crate) fn mean_synergy(models: &DraftModels, lineup: &[Option<ChampionId>]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, &a) in lineup.iter().enumerate() {
        for &b in &lineup[i + 1..] {
            total += pair_synergy(models, a, b);
            pairs += 1;
        }
    }
    if pairs == 0 {
        NEUTRAL_SCORE
    } else {
        total / pairs as f64
    }
}

/// Mean counter differential of `ours` against `theirs`; zero when either
/// side has no picks.
pub(crate) fn counter_advantage(
    models: &DraftModels,
    ours: &[Option<ChampionId>],
    theirs: &[Option<ChampionId>],
) -> f64 {
    if ours.is_empty() || theirs.is_empty() {
        return 0.0;
    }
    let mut total = 0.0;
    for &a in ours {
        for &b in theirs {
            total += pair_advantage(models, a, b);
        }
    }
    total / (ours.len() * theirs.len()) as f64
}

pub(crate) fn pair_synergy(
    models: &DraftModels,
    a: Option<ChampionId>,
    b: Option<ChampionId>,
) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => models.graph().synergy(a, b).score,
        _ => NEUTRAL_SCORE,
    }
}

/// counter(a, b) - counter(b, a); zero if either champion is unknown.
pub(crate) fn pair_advantage(
    models: &DraftModels,
    a: Option<ChampionId>,
    b: Option<ChampionId>,
) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => {
            models.graph().counter(a, b).score - models.graph().counter(b, a).score
        }
        _ => 0.0,
    }
}

pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Score two resolved lineups. `team1` here is whichever lineup the caller
/// wants the first probability for.
pub(crate) fn evaluate_lineups(
    models: &DraftModels,
    team1: &[Option<ChampionId>],
    team2: &[Option<ChampionId>],
) -> WinProbability {
    let team1_power = mean_power(models, team1);
    let team2_power = mean_power(models, team2);
    let team1_synergy = mean_synergy(models, team1);
    let team2_synergy = mean_synergy(models, team2);
    let counter_advantage = counter_advantage(models, team1, team2);

    let score_difference = POWER_WEIGHT * (team1_power - team2_power)
        + SYNERGY_WEIGHT * (team1_synergy - team2_synergy)
        + COUNTER_WEIGHT * counter_advantage;

    let p1 = logistic(LOGISTIC_STEEPNESS * score_difference);

    WinProbability {
        team1: p1,
        team2: 1.0 - p1,
        factors: EvaluationFactors {
            team1_power,
            team2_power,
            team1_synergy,
            team2_synergy,
            counter_advantage,
            score_difference,
        },
    }
}
