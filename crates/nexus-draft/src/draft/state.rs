// Draft state: picks and bans per side plus the phase/turn markers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::draft::format::DraftFormat;
use crate::draft::slot::{Phase, Side};
use crate::error::DraftError;

/// Everything one side has picked and banned so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSelections {
    /// Picks in the order they were made.
    #[serde(default)]
    pub picks: Vec<String>,
    #[serde(default)]
    pub bans: Vec<String>,
}

impl TeamSelections {
    pub fn new<P, B>(picks: P, bans: B) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        TeamSelections {
            picks: picks.into_iter().map(Into::into).collect(),
            bans: bans.into_iter().map(Into::into).collect(),
        }
    }

    pub fn list(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::Ban => &self.bans,
            Phase::Pick => &self.picks,
        }
    }

    fn list_mut(&mut self, phase: Phase) -> &mut Vec<String> {
        match phase {
            Phase::Ban => &mut self.bans,
            Phase::Pick => &mut self.picks,
        }
    }
}

/// A partial or complete draft.
///
/// Values are advanced only by [`DraftSequence::apply`], which returns a new
/// state; a state is never edited in place once handed to a caller.
///
/// [`DraftSequence::apply`]: crate::draft::sequence::DraftSequence::apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    pub team1: TeamSelections,
    pub team2: TeamSelections,
    /// Phase of the next slot (of the last slot once complete).
    pub phase: Phase,
    /// Side to act next (the last actor once complete).
    pub turn: Side,
    /// Set once every slot of the schedule is filled.
    #[serde(default)]
    pub complete: bool,
}

impl DraftState {
    /// An empty draft positioned at the first slot of `format`.
    pub fn new(format: &DraftFormat) -> Self {
        let (phase, turn, complete) = match format.slot(0) {
            Some(slot) => (slot.phase, slot.side, false),
            None => (Phase::Ban, Side::Team1, true),
        };
        DraftState {
            team1: TeamSelections::default(),
            team2: TeamSelections::default(),
            phase,
            turn,
            complete,
        }
    }

    pub fn team(&self, side: Side) -> &TeamSelections {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    pub(crate) fn team_mut(&mut self, side: Side) -> &mut TeamSelections {
        match side {
            Side::Team1 => &mut self.team1,
            Side::Team2 => &mut self.team2,
        }
    }

    pub fn picks(&self, side: Side) -> &[String] {
        &self.team(side).picks
    }

    pub fn bans(&self, side: Side) -> &[String] {
        &self.team(side).bans
    }

    /// Number of slots already filled.
    pub fn actions_taken(&self) -> usize {
        self.team1.picks.len()
            + self.team1.bans.len()
            + self.team2.picks.len()
            + self.team2.bans.len()
    }

    /// Whether `champion` appears in any of the four lists.
    pub fn contains(&self, champion: &str) -> bool {
        let champion = champion.trim();
        self.all_selections().any(|c| c.trim() == champion)
    }

    /// Every picked or banned champion.
    pub fn unavailable(&self) -> HashSet<&str> {
        self.all_selections().map(|c| c.trim()).collect()
    }

    /// Check that no champion appears in more than one list (or twice in one).
    pub fn check_availability(&self) -> Result<(), DraftError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for champion in self.all_selections() {
            let champion = champion.trim();
            if champion.is_empty() {
                return Err(DraftError::inconsistent("draft contains a blank champion"));
            }
            if !seen.insert(champion) {
                return Err(DraftError::inconsistent(format!(
                    "champion `{champion}` appears more than once"
                )));
            }
        }
        Ok(())
    }

    /// Count of actions per `[side][phase]`.
    pub(crate) fn counts(&self) -> [[usize; 2]; 2] {
        let mut counts = [[0usize; 2]; 2];
        for side in [Side::Team1, Side::Team2] {
            for phase in [Phase::Ban, Phase::Pick] {
                counts[side.index()][phase.index()] = self.team(side).list(phase).len();
            }
        }
        counts
    }

    pub(crate) fn push(&mut self, side: Side, phase: Phase, champion: String) {
        self.team_mut(side).list_mut(phase).push(champion);
    }

    fn all_selections(&self) -> impl Iterator<Item = &String> {
        self.team1
            .picks
            .iter()
            .chain(&self.team1.bans)
            .chain(&self.team2.picks)
            .chain(&self.team2.bans)
    }
}
