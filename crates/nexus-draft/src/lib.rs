// Library root for nexus-draft: champion relationship models and the draft
// evaluation engine built on them.

pub mod champion;
pub mod corpus;
pub mod draft;
pub mod engine;
pub mod error;
pub mod graph;
pub mod models;
pub mod power;

pub use champion::{ChampionId, ChampionPool};
pub use corpus::{CompletedDraft, TeamDraft};
pub use draft::{
    DraftAction, DraftFormat, DraftSequence, DraftState, Phase, ScheduleBlock, Side, Slot,
    TeamSelections, TurnOrder,
};
pub use engine::{
    DraftAnalysis, DraftEngine, PriorityTier, Recommendation, SimulatedDraft, TeamAnalysis,
    WinProbability,
};
pub use error::DraftError;
pub use graph::{ChampionGraph, EdgeScore};
pub use models::{build_models, ChampionSummary, DraftModels, ModelOptions};
pub use power::PowerTable;
