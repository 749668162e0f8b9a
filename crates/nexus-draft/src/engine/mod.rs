// Draft engine: evaluation, recommendation and analysis over shared models.

pub mod analysis;
pub mod evaluate;
pub mod recommend;

use std::sync::Arc;

use tracing::debug;

use crate::draft::{DraftAction, DraftFormat, DraftSequence, DraftState, Side};
use crate::error::DraftError;
use crate::models::DraftModels;

pub use analysis::{DraftAnalysis, SimulatedDraft, TeamAnalysis, ANALYSIS_MARGIN};
pub use evaluate::{
    logistic, EvaluationFactors, WinProbability, COUNTER_WEIGHT, LOGISTIC_STEEPNESS,
    POWER_WEIGHT, SYNERGY_WEIGHT,
};
pub use recommend::{PriorityTier, Recommendation, TermContributions, REASON_THRESHOLD};

/// Query facade over one set of models and one draft schedule.
///
/// Cheap to clone: the models sit behind an `Arc`, and every query takes the
/// draft state by reference, so any number of drafts can be served at once.
#[derive(Debug, Clone)]
pub struct DraftEngine {
    models: Arc<DraftModels>,
    sequence: DraftSequence,
}

impl DraftEngine {
    pub fn new(models: Arc<DraftModels>, format: DraftFormat) -> Self {
        DraftEngine {
            models,
            sequence: DraftSequence::new(format),
        }
    }

    pub fn models(&self) -> &DraftModels {
        &self.models
    }

    pub fn sequence(&self) -> &DraftSequence {
        &self.sequence
    }

    pub fn start(&self) -> DraftState {
        self.sequence.start()
    }

    pub fn apply(
        &self,
        state: &DraftState,
        action: &DraftAction,
    ) -> Result<DraftState, DraftError> {
        self.sequence.apply(state, action)
    }

    pub fn legal_actions(&self, state: &DraftState) -> Vec<String> {
        self.sequence.legal_actions(state, self.models.pool())
    }

    /// Win probability of the picks made so far. Bans do not enter the
    /// score. Never fails: unknown champions score as average and an empty
    /// draft is exactly even.
    pub fn evaluate(&self, state: &DraftState) -> WinProbability {
        let team1 = evaluate::resolve(&self.models, state.picks(Side::Team1));
        let team2 = evaluate::resolve(&self.models, state.picks(Side::Team2));
        evaluate::evaluate_lineups(&self.models, &team1, &team2)
    }

    /// Up to `limit` ranked suggestions for the next slot.
    ///
    /// Fails with [`DraftError::DraftComplete`] on a finished draft and with
    /// [`DraftError::InconsistentState`] when `state` does not fit the
    /// schedule. Empty models give an empty list.
    pub fn recommend(
        &self,
        state: &DraftState,
        limit: usize,
    ) -> Result<Vec<recommend::Recommendation>, DraftError> {
        if self.sequence.is_terminal(state) {
            return Err(DraftError::DraftComplete);
        }
        let slot = self
            .sequence
            .current_slot(state)?
            .ok_or(DraftError::DraftComplete)?;

        if self.models.is_empty() {
            debug!("no models loaded; returning no recommendations");
            return Ok(Vec::new());
        }

        let candidates = self.legal_actions(state);
        let mut ranked = recommend::rank_candidates(&self.models, state, slot, candidates);
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Odds, next-slot suggestions and both compositions in one call.
    /// Recommendations are empty once the draft is complete.
    pub fn analyze(&self, state: &DraftState, limit: usize) -> Result<DraftAnalysis, DraftError> {
        let next_slot = self.sequence.current_slot(state)?;
        let recommendations = match next_slot {
            Some(_) => self.recommend(state, limit)?,
            None => Vec::new(),
        };
        let slot_description = self.sequence.format().describe(state.actions_taken());

        Ok(DraftAnalysis {
            win_probability: self.evaluate(state),
            next_slot,
            slot_description,
            recommendations,
            team1: TeamAnalysis::build(&self.models, state, Side::Team1),
            team2: TeamAnalysis::build(&self.models, state, Side::Team2),
        })
    }

    /// Fill every remaining slot with the top recommendation. Stops early if
    /// no candidate is left.
    pub fn simulate_to_completion(&self, state: &DraftState) -> Result<SimulatedDraft, DraftError> {
        self.sequence.validate(state)?;
        let mut current = state.clone();
        let mut actions = Vec::with_capacity(self.sequence.remaining_slots(state).len());

        while !self.sequence.is_terminal(&current) {
            let Some(slot) = self.sequence.current_slot(&current)? else {
                break;
            };
            let Some(best) = self.recommend(&current, 1)?.into_iter().next() else {
                debug!("simulation stopped at slot {}: no candidates", slot.index);
                break;
            };
            let action = DraftAction::new(slot.phase, slot.side, best.champion);
            current = self.sequence.apply(&current, &action)?;
            actions.push(action);
        }

        Ok(SimulatedDraft {
            complete: self.sequence.is_terminal(&current),
            win_probability: self.evaluate(&current),
            state: current,
            actions,
        })
    }
}
