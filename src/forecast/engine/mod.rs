// src/forecast/engine/mod.rs
//! Grid state independent of Bevy: overlay, tracker, change-set builder,
//! autosave scheduling and the session that ties them together.

pub mod autosave;
pub mod change_set;
pub mod error;
pub mod grid;
pub mod overlay;
pub mod tracker;

pub use autosave::AutosaveScheduler;
pub use change_set::{build_change_set, CellWarning, ChangeFields, ChangeRecord, InvalidNumberPolicy};
pub use error::GridError;
pub use grid::{
    FetchRequest, ForecastGrid, GridPhase, GridSnapshot, GridTimings, PostRequest, SaveRequest,
    SaveTrigger,
};
pub use overlay::EditOverlay;
pub use tracker::{ModificationSummary, PostEligibility, RowStatus};
