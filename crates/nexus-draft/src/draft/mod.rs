// Draft schedule, state, and the sequence state machine.

pub mod format;
pub mod sequence;
pub mod slot;
pub mod state;

pub use format::{DraftFormat, ScheduleBlock, TurnOrder};
pub use sequence::{DraftAction, DraftSequence};
pub use slot::{Phase, Side, Slot};
pub use state::{DraftState, TeamSelections};
