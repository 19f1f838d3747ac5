//! Voyage Log Engine
//!
//! Platform-agnostic core logic for tracking player-submitted voyage
//! records: a Monte Carlo estimator for natural voyage duration, an
//! import validation pipeline with ordered checkpoints, a chainable
//! query engine for derived statistics, and the canonical log store.
//! Presentation, localization, and the concrete persistent backend are
//! external collaborators; the backend is abstracted behind
//! [`VoyageStorage`].

pub mod constants;
pub mod entry;
pub mod estimator;
pub mod import;
pub mod query;
pub mod skills;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use entry::{
    AllData, ExportVersion, Item, PlayerEntry, VOYAGE_SEATS, VoyageEntry, VoyageExport,
    VoyageState, VoyagerRecord, seat_index,
};
pub use estimator::{Estimate, Estimator};
pub use import::{Checkpoint, CheckpointList, CheckpointName, ImportError, PlayerExport};
pub use query::Query;
pub use skills::{Skill, SkillId, SkillSet, combined_odds, pass_probability};
pub use stats::{
    SeatUsage, longest_voyage, mean_voyage_duration, most_travelled_voyagers, most_used_voyagers,
    oldest_voyage, seat_usage, total_voyage_time,
};
pub use store::{SubscriptionId, VoyageLog, VoyageStorage};
