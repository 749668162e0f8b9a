// Draft sequence state machine.
//
// States are slot indices 0..N of the format. `apply` moves a state from slot
// i to slot i + 1 when the draft is not complete, the champion is available,
// and the declared phase and side match the schedule. Any mismatch is an
// error; nothing is corrected on the caller's behalf.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::champion::ChampionPool;
use crate::draft::format::DraftFormat;
use crate::draft::slot::{Phase, Side, Slot};
use crate::draft::state::{DraftState, TeamSelections};
use crate::error::DraftError;

/// A single ban or pick declared by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftAction {
    pub phase: Phase,
    pub side: Side,
    pub champion: String,
}

impl DraftAction {
    pub fn new(phase: Phase, side: Side, champion: impl Into<String>) -> Self {
        DraftAction {
            phase,
            side,
            champion: champion.into(),
        }
    }

    pub fn ban(side: Side, champion: impl Into<String>) -> Self {
        Self::new(Phase::Ban, side, champion)
    }

    pub fn pick(side: Side, champion: impl Into<String>) -> Self {
        Self::new(Phase::Pick, side, champion)
    }
}

/// The schedule-driven transition function. Holds no per-draft data, so one
/// instance serves any number of concurrent drafts.
#[derive(Debug, Clone, Default)]
pub struct DraftSequence {
    format: DraftFormat,
}

impl DraftSequence {
    pub fn new(format: DraftFormat) -> Self {
        DraftSequence { format }
    }

    pub fn format(&self) -> &DraftFormat {
        &self.format
    }

    /// An empty draft at slot 0.
    pub fn start(&self) -> DraftState {
        DraftState::new(&self.format)
    }

    /// Rebuild a state from already-made selections, deriving the markers
    /// from the schedule. Fails if the selections could not have been
    /// produced by this schedule.
    pub fn resume(
        &self,
        team1: TeamSelections,
        team2: TeamSelections,
    ) -> Result<DraftState, DraftError> {
        let mut state = self.start();
        state.team1 = team1;
        state.team2 = team2;
        self.set_markers(&mut state);
        self.validate(&state)?;
        Ok(state)
    }

    /// Replay actions from the start of the draft.
    pub fn replay<'a>(
        &self,
        actions: impl IntoIterator<Item = &'a DraftAction>,
    ) -> Result<DraftState, DraftError> {
        let mut state = self.start();
        for action in actions {
            state = self.apply(&state, action)?;
        }
        Ok(state)
    }

    /// Check a caller-supplied state against the schedule: the availability
    /// invariant, per-side phase counts, and the phase/turn markers.
    pub fn validate(&self, state: &DraftState) -> Result<(), DraftError> {
        state.check_availability()?;

        let taken = state.actions_taken();
        if taken > self.format.len() {
            return Err(DraftError::inconsistent(format!(
                "{taken} actions recorded but the schedule has {} slots",
                self.format.len()
            )));
        }

        let expected = self.format.prefix_counts(taken);
        let actual = state.counts();
        for side in [Side::Team1, Side::Team2] {
            for phase in [Phase::Ban, Phase::Pick] {
                let e = expected[side.index()][phase.index()];
                let a = actual[side.index()][phase.index()];
                if e != a {
                    return Err(DraftError::inconsistent(format!(
                        "{side} has {a} {phase}s after {taken} actions, schedule expects {e}"
                    )));
                }
            }
        }

        match self.format.slot(taken) {
            Some(slot) => {
                if state.complete {
                    return Err(DraftError::inconsistent(format!(
                        "marked complete with slot {taken} still open"
                    )));
                }
                if state.phase != slot.phase || state.turn != slot.side {
                    return Err(DraftError::inconsistent(format!(
                        "slot {taken} is a {} for {}, state says {} for {}",
                        slot.phase, slot.side, state.phase, state.turn
                    )));
                }
            }
            None => {
                if !state.complete {
                    return Err(DraftError::inconsistent(
                        "every slot is filled but the draft is not marked complete",
                    ));
                }
            }
        }

        Ok(())
    }

    /// The slot the state is waiting on, or `None` once the draft is complete.
    pub fn current_slot(&self, state: &DraftState) -> Result<Option<Slot>, DraftError> {
        self.validate(state)?;
        Ok(self.format.slot(state.actions_taken()))
    }

    pub fn is_terminal(&self, state: &DraftState) -> bool {
        state.complete || state.actions_taken() >= self.format.len()
    }

    /// Slots not yet filled.
    pub fn remaining_slots(&self, state: &DraftState) -> &[Slot] {
        let taken = state.actions_taken().min(self.format.len());
        &self.format.slots()[taken..]
    }

    /// Apply one action, returning the next state.
    pub fn apply(
        &self,
        state: &DraftState,
        action: &DraftAction,
    ) -> Result<DraftState, DraftError> {
        if self.is_terminal(state) {
            return Err(DraftError::DraftComplete);
        }
        let slot = self
            .current_slot(state)?
            .ok_or(DraftError::DraftComplete)?;

        let champion = action.champion.trim();
        if champion.is_empty() {
            return Err(DraftError::BlankChampion);
        }
        if state.contains(champion) {
            return Err(DraftError::ChampionUnavailable {
                champion: champion.to_string(),
            });
        }
        if action.phase != slot.phase {
            return Err(DraftError::PhaseMismatch {
                slot: slot.index,
                expected: slot.phase,
                got: action.phase,
            });
        }
        if action.side != slot.side {
            return Err(DraftError::TurnMismatch {
                slot: slot.index,
                expected: slot.side,
                got: action.side,
            });
        }

        let mut next = state.clone();
        next.push(slot.side, slot.phase, champion.to_string());
        self.set_markers(&mut next);

        debug!(
            "slot {} {} {} -> {}",
            slot.index, slot.side, slot.phase, champion
        );

        Ok(next)
    }

    /// Champions in `pool` not yet picked or banned. Empty once the draft is
    /// complete.
    pub fn legal_actions(&self, state: &DraftState, pool: &ChampionPool) -> Vec<String> {
        if self.is_terminal(state) {
            return Vec::new();
        }
        let taken = state.unavailable();
        pool.iter()
            .filter(|(_, name)| !taken.contains(name))
            .map(|(_, name)| name.to_string())
            .collect()
    }

    fn set_markers(&self, state: &mut DraftState) {
        match self.format.slot(state.actions_taken()) {
            Some(slot) => {
                state.phase = slot.phase;
                state.turn = slot.side;
                state.complete = false;
            }
            None => {
                if let Some(last) = self.format.slots().last() {
                    state.phase = last.phase;
                    state.turn = last.side;
                }
                state.complete = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::format::{ScheduleBlock, TurnOrder};

    fn pick_only(rounds: usize) -> DraftSequence {
        DraftSequence::new(
            DraftFormat::from_blocks(vec![ScheduleBlock::new(
                Phase::Pick,
                rounds,
                Side::Team1,
                TurnOrder::Alternating,
            )])
            .unwrap(),
        )
    }

    /// Actions that fill the standard schedule with champions C0..C19.
    fn full_standard_actions(seq: &DraftSequence) -> Vec<DraftAction> {
        seq.format()
            .slots()
            .iter()
            .map(|s| DraftAction::new(s.phase, s.side, format!("C{}", s.index)))
            .collect()
    }

    #[test]
    fn apply_advances_through_the_schedule() {
        let seq = DraftSequence::default();
        let s0 = seq.start();
        let s1 = seq.apply(&s0, &DraftAction::ban(Side::Team1, "Ahri")).unwrap();
        assert_eq!(s1.bans(Side::Team1), ["Ahri"]);
        assert_eq!(s1.phase, Phase::Ban);
        assert_eq!(s1.turn, Side::Team2);
        // The input state is untouched.
        assert_eq!(s0.actions_taken(), 0);
    }

    #[test]
    fn apply_rejects_wrong_turn_and_phase() {
        let seq = DraftSequence::default();
        let s0 = seq.start();
        assert_eq!(
            seq.apply(&s0, &DraftAction::ban(Side::Team2, "Ahri")),
            Err(DraftError::TurnMismatch {
                slot: 0,
                expected: Side::Team1,
                got: Side::Team2
            })
        );
        assert_eq!(
            seq.apply(&s0, &DraftAction::pick(Side::Team1, "Ahri")),
            Err(DraftError::PhaseMismatch {
                slot: 0,
                expected: Phase::Ban,
                got: Phase::Pick
            })
        );
    }

    #[test]
    fn apply_rejects_unavailable_and_blank_champions() {
        let seq = DraftSequence::default();
        let s1 = seq.apply(&seq.start(), &DraftAction::ban(Side::Team1, "Ahri")).unwrap();
        assert_eq!(
            seq.apply(&s1, &DraftAction::ban(Side::Team2, " Ahri ")),
            Err(DraftError::ChampionUnavailable {
                champion: "Ahri".into()
            })
        );
        assert_eq!(
            seq.apply(&s1, &DraftAction::ban(Side::Team2, "  ")),
            Err(DraftError::BlankChampion)
        );
    }

    #[test]
    fn full_draft_reaches_terminal_and_rejects_more() {
        let seq = DraftSequence::default();
        let actions = full_standard_actions(&seq);
        let done = seq.replay(&actions).unwrap();
        assert!(done.complete);
        assert!(seq.is_terminal(&done));
        assert_eq!(done.picks(Side::Team1).len(), 5);
        assert_eq!(done.bans(Side::Team2).len(), 5);
        assert_eq!(seq.current_slot(&done).unwrap(), None);
        assert!(seq.remaining_slots(&done).is_empty());
        assert_eq!(
            seq.apply(&done, &DraftAction::pick(Side::Team2, "Extra")),
            Err(DraftError::DraftComplete)
        );
    }

    #[test]
    fn replayed_states_keep_lists_disjoint() {
        let seq = DraftSequence::default();
        let actions = full_standard_actions(&seq);
        let mut state = seq.start();
        for action in &actions {
            state = seq.apply(&state, action).unwrap();
            assert!(state.check_availability().is_ok());
            assert!(seq.validate(&state).is_ok());
        }
    }

    #[test]
    fn validate_rejects_wrong_markers() {
        let seq = pick_only(2);
        let mut state = seq.start();
        state.team1.picks.push("A".into());
        // Markers still say team1 to pick; schedule says team2.
        assert!(matches!(
            seq.validate(&state),
            Err(DraftError::InconsistentState { .. })
        ));
        state.turn = Side::Team2;
        assert!(seq.validate(&state).is_ok());
    }

    #[test]
    fn validate_rejects_counts_the_schedule_cannot_produce() {
        let seq = pick_only(2);
        let mut state = seq.start();
        state.team1.picks.push("A".into());
        state.team1.picks.push("B".into());
        assert!(matches!(
            seq.validate(&state),
            Err(DraftError::InconsistentState { .. })
        ));
    }

    #[test]
    fn resume_derives_markers() {
        let seq = pick_only(2);
        let state = seq
            .resume(
                TeamSelections::new(["A"], Vec::<String>::new()),
                TeamSelections::new(["C"], Vec::<String>::new()),
            )
            .unwrap();
        assert_eq!(state.turn, Side::Team1);
        assert_eq!(state.phase, Phase::Pick);
        assert!(!state.complete);

        let err = seq
            .resume(
                TeamSelections::new(["A", "B"], Vec::<String>::new()),
                TeamSelections::default(),
            )
            .unwrap_err();
        assert!(err.is_invalid_action());
    }

    #[test]
    fn legal_actions_exclude_every_list() {
        let seq = pick_only(2);
        let mut pool = ChampionPool::new();
        for name in ["A", "B", "C", "D"] {
            pool.intern(name);
        }
        let state = seq
            .resume(
                TeamSelections::new(["A"], ["D"]),
                TeamSelections::new(["C"], Vec::<String>::new()),
            );
        // Bans are not part of a pick-only schedule.
        assert!(state.is_err());

        let state = seq
            .resume(
                TeamSelections::new(["A"], Vec::<String>::new()),
                TeamSelections::new(["C"], Vec::<String>::new()),
            )
            .unwrap();
        assert_eq!(seq.legal_actions(&state, &pool), vec!["B", "D"]);
    }

    #[test]
    fn legal_actions_empty_when_terminal() {
        let seq = pick_only(1);
        let mut pool = ChampionPool::new();
        for name in ["A", "B", "C"] {
            pool.intern(name);
        }
        let state = seq
            .replay(&[DraftAction::pick(Side::Team1, "A"), DraftAction::pick(Side::Team2, "B")])
            .unwrap();
        assert!(state.complete);
        assert!(seq.legal_actions(&state, &pool).is_empty());
    }
}
