// Draft schedule: the fixed ordered list of (phase, side) slots.
//
// A format is a list of blocks. Each block gives every side the same number
// of actions of one phase; `order` decides how the two sides interleave.

use serde::{Deserialize, Serialize};

use crate::draft::slot::{Phase, Side, Slot};
use crate::error::DraftError;

/// How the two sides interleave within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOrder {
    /// first, other, first, other, ...
    #[default]
    Alternating,
    /// first, other, other, first, first, other, ...
    Snake,
}

/// One contiguous run of bans or picks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub phase: Phase,
    /// Actions per side in this block.
    pub rounds: usize,
    /// Side taking the first action of the block.
    pub first: Side,
    #[serde(default)]
    pub order: TurnOrder,
}

impl ScheduleBlock {
    pub fn new(phase: Phase, rounds: usize, first: Side, order: TurnOrder) -> Self {
        ScheduleBlock {
            phase,
            rounds,
            first,
            order,
        }
    }

    /// Side acting at position `k` within this block.
    fn side_at(&self, k: usize) -> Side {
        let first_acts = match self.order {
            TurnOrder::Alternating => k % 2 == 0,
            TurnOrder::Snake => ((k + 1) / 2) % 2 == 0,
        };
        if first_acts {
            self.first
        } else {
            self.first.opponent()
        }
    }
}

/// The expanded, validated schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftFormat {
    blocks: Vec<ScheduleBlock>,
    slots: Vec<Slot>,
}

impl DraftFormat {
    /// Standard competitive draft: three bans each, three picks each, two
    /// bans each, two picks each (20 actions).
    pub fn standard() -> Self {
        let blocks = vec![
            ScheduleBlock::new(Phase::Ban, 3, Side::Team1, TurnOrder::Alternating),
            ScheduleBlock::new(Phase::Pick, 3, Side::Team1, TurnOrder::Snake),
            ScheduleBlock::new(Phase::Ban, 2, Side::Team2, TurnOrder::Alternating),
            ScheduleBlock::new(Phase::Pick, 2, Side::Team2, TurnOrder::Snake),
        ];
        Self::expand(blocks)
    }

    /// Build a format from explicit blocks.
    ///
    /// Rejects an empty schedule and zero-round blocks.
    pub fn from_blocks(blocks: Vec<ScheduleBlock>) -> Result<Self, DraftError> {
        if blocks.is_empty() {
            return Err(DraftError::InvalidFormat {
                message: "schedule must contain at least one block".into(),
            });
        }
        if let Some(i) = blocks.iter().position(|b| b.rounds == 0) {
            return Err(DraftError::InvalidFormat {
                message: format!("block {i} has zero rounds"),
            });
        }
        Ok(Self::expand(blocks))
    }

    fn expand(blocks: Vec<ScheduleBlock>) -> Self {
        let mut slots = Vec::new();
        for (b, block) in blocks.iter().enumerate() {
            for k in 0..block.rounds * 2 {
                slots.push(Slot {
                    index: slots.len(),
                    phase: block.phase,
                    side: block.side_at(k),
                    block: b,
                    position_in_block: k,
                });
            }
        }
        DraftFormat { blocks, slots }
    }

    pub fn blocks(&self) -> &[ScheduleBlock] {
        &self.blocks
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied()
    }

    /// Total number of actions in the draft.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Actions of `phase` each side makes over the whole draft.
    pub fn per_side(&self, phase: Phase) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.phase == phase)
            .map(|b| b.rounds)
            .sum()
    }

    /// Count of actions per `[side][phase]` in the first `taken` slots.
    pub(crate) fn prefix_counts(&self, taken: usize) -> [[usize; 2]; 2] {
        let mut counts = [[0usize; 2]; 2];
        for slot in self.slots.iter().take(taken) {
            counts[slot.side.index()][slot.phase.index()] += 1;
        }
        counts
    }

    /// Human-readable label such as "First Ban Phase - Ban 2".
    pub fn describe(&self, index: usize) -> String {
        let Some(slot) = self.slot(index) else {
            return "Draft Complete".to_string();
        };
        let ordinal = self.blocks[..slot.block]
            .iter()
            .filter(|b| b.phase == slot.phase)
            .count();
        let (phase_name, action_name) = match slot.phase {
            Phase::Ban => ("Ban Phase", "Ban"),
            Phase::Pick => ("Pick Phase", "Pick"),
        };
        let position = slot.position_in_block + 1;
        match ordinal {
            0 => format!("First {phase_name} - {action_name} {position}"),
            1 => format!("Second {phase_name} - {action_name} {position}"),
            2 => format!("Third {phase_name} - {action_name} {position}"),
            n => format!("{phase_name} {} - {action_name} {position}", n + 1),
        }
    }
}

impl Default for DraftFormat {
    fn default() -> Self {
        Self::standard()
    }
}
