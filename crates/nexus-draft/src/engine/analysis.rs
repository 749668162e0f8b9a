// Composition analysis and greedy draft completion.

use serde::Serialize;

use crate::draft::{DraftAction, DraftState, Side, Slot};
use crate::engine::evaluate::{evaluate_lineups, resolve, WinProbability};
use crate::engine::recommend::Recommendation;
use crate::graph::NEUTRAL_SCORE;
use crate::models::DraftModels;

/// Distance from neutral before a term is called out as a strength or
/// weakness.
pub const ANALYSIS_MARGIN: f64 = 0.05;

/// One side's composition measured against the other side's picks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAnalysis {
    pub side: Side,
    pub champions: Vec<String>,
    pub power: f64,
    pub synergy: f64,
    /// Mean counter differential against the opposing picks.
    pub counter_advantage: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl TeamAnalysis {
    pub(crate) fn build(models: &DraftModels, state: &DraftState, side: Side) -> Self {
        let champions = state.picks(side).to_vec();
        let ours = resolve(models, &champions);
        let theirs = resolve(models, state.picks(side.opponent()));
        let factors = evaluate_lineups(models, &ours, &theirs).factors;

        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();
        if !champions.is_empty() {
            let power = factors.team1_power - NEUTRAL_SCORE;
            if power > ANALYSIS_MARGIN {
                strengths.push(format!("Strong champion power (+{:.1}%)", power * 100.0));
            } else if power < -ANALYSIS_MARGIN {
                weaknesses.push(format!("Weak champion power ({:.1}%)", power * 100.0));
            }

            let synergy = factors.team1_synergy - NEUTRAL_SCORE;
            if synergy > ANALYSIS_MARGIN {
                strengths.push(format!("Strong team synergy (+{:.1}%)", synergy * 100.0));
            } else if synergy < -ANALYSIS_MARGIN {
                weaknesses.push(format!("Poor team synergy ({:.1}%)", synergy * 100.0));
            }

            let counter = factors.counter_advantage;
            if counter > ANALYSIS_MARGIN {
                strengths.push(format!("Favorable matchup (+{:.1}%)", counter * 100.0));
            } else if counter < -ANALYSIS_MARGIN {
                weaknesses.push(format!("Unfavorable matchup ({:.1}%)", counter * 100.0));
            }
        }

        TeamAnalysis {
            side,
            champions,
            power: factors.team1_power,
            synergy: factors.team1_synergy,
            counter_advantage: factors.counter_advantage,
            strengths,
            weaknesses,
        }
    }
}

/// Snapshot of a draft: the current odds, what to do next, and both
/// compositions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftAnalysis {
    pub win_probability: WinProbability,
    /// `None` once the draft is complete.
    pub next_slot: Option<Slot>,
    pub slot_description: String,
    pub recommendations: Vec<Recommendation>,
    pub team1: TeamAnalysis,
    pub team2: TeamAnalysis,
}

/// Result of playing out the remaining slots with the top recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedDraft {
    pub state: DraftState,
    /// The actions chosen, in slot order.
    pub actions: Vec<DraftAction>,
    pub win_probability: WinProbability,
    /// False when the pool ran out of candidates before the last slot.
    pub complete: bool,
}
