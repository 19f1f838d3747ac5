//! Raw player-export wire format and the import checkpoint pipeline types.
//!
//! The game exports a nested player document; the first element of
//! `character.voyage` is the import candidate. Validation progress is
//! reported as an ordered checkpoint list which doubles as the failure
//! payload when an import is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::constants::SECONDS_PER_TICK;
use crate::entry::{Item, VoyageEntry, VoyageState, VoyagerRecord, seat_index};
use crate::skills::{SkillId, SkillSet};

/// Ordered stage names of the import validation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckpointName {
    /// Raw text parsed as a structured player export.
    ParsedJson,
    /// The export carried at least one voyage record.
    VoyageFound,
    /// The candidate voyage is no longer running.
    VoyageCompleted,
    /// No stored voyage shares the candidate's id.
    VoyageUnique,
    /// Informational: the observed duration fell within the simulated
    /// natural range. Never gates persistence.
    VoyageNotExtended,
    /// The entry was committed to the log.
    VoyageSaved,
}

/// One named pipeline stage with its pass/fail outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub name: CheckpointName,
    pub completed: bool,
}

impl Checkpoint {
    #[must_use]
    pub const fn passed(name: CheckpointName) -> Self {
        Self {
            name,
            completed: true,
        }
    }

    #[must_use]
    pub const fn failed(name: CheckpointName) -> Self {
        Self {
            name,
            completed: false,
        }
    }
}

/// Checkpoint sequence for one import attempt; at most six stages, inline.
pub type CheckpointList = SmallVec<[Checkpoint; 6]>;

/// Why an import was rejected. Both variants carry the checkpoints
/// recorded up to the abort so callers can render which stage failed.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The raw text was not a structured player export.
    #[error("import text is not a valid player export: {source}")]
    Parse {
        checkpoints: CheckpointList,
        #[source]
        source: serde_json::Error,
    },
    /// A gating checkpoint failed: voyage absent, still running, or a
    /// duplicate of a stored entry.
    #[error("voyage failed import validation")]
    Validation { checkpoints: CheckpointList },
}

impl ImportError {
    /// The checkpoints recorded before the abort.
    #[must_use]
    pub fn checkpoints(&self) -> &CheckpointList {
        match self {
            Self::Parse { checkpoints, .. } | Self::Validation { checkpoints } => checkpoints,
        }
    }
}

// Wire format ---------------------------------------------------------------

/// Top-level game export document.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerExport {
    pub player: RawPlayer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    pub id: u64,
    pub dbid: u64,
    #[serde(default)]
    pub fleet: RawFleet,
    pub character: RawCharacter,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFleet {
    #[serde(default)]
    pub slabel: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCharacter {
    pub display_name: String,
    #[serde(default)]
    pub voyage: Vec<RawVoyage>,
}

/// One voyage as the game exports it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVoyage {
    pub id: u64,
    #[serde(default)]
    pub ship_trait: Option<String>,
    pub skills: RawVoyageSkills,
    pub state: VoyageState,
    pub max_hp: i32,
    pub hp: i32,
    pub log_index: u32,
    #[serde(default)]
    pub pending_rewards: RawRewards,
    pub created_at: DateTime<Utc>,
    pub ship_id: u64,
    #[serde(default)]
    pub skill_aggregates: SkillSet,
    #[serde(default)]
    pub crew_slots: Vec<RawCrewSlot>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawVoyageSkills {
    pub primary_skill: SkillId,
    pub secondary_skill: SkillId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRewards {
    #[serde(default)]
    pub loot: Vec<RawLoot>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawLoot {
    pub id: u64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCrewSlot {
    pub symbol: String,
    #[serde(rename = "trait", default)]
    pub trait_name: String,
    pub crew: RawCrew,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCrew {
    pub id: u64,
    pub symbol: String,
    #[serde(default)]
    pub skills: SkillSet,
    pub rarity: u32,
    #[serde(default)]
    pub traits: Vec<String>,
}

impl RawVoyage {
    /// Build a candidate [`VoyageEntry`] from the raw record.
    ///
    /// The `extended` flag is left false; classification against the
    /// estimator happens where the store commits the entry.
    #[must_use]
    pub fn into_entry(self, dbid: u64, fleet: &str) -> VoyageEntry {
        let seats = self
            .crew_slots
            .into_iter()
            .map(|slot| {
                let trait_match = slot.crew.traits.contains(&slot.trait_name);
                VoyagerRecord {
                    seat_index: seat_index(&slot.symbol),
                    voyager_id: slot.crew.id,
                    symbol: slot.crew.symbol,
                    skills: slot.crew.skills,
                    rarity: slot.crew.rarity,
                    trait_name: slot.trait_name,
                    trait_match,
                }
            })
            .collect();
        let loot = self
            .pending_rewards
            .loot
            .into_iter()
            .map(|stack| Item {
                id: stack.id,
                quantity: stack.quantity,
            })
            .collect();

        VoyageEntry {
            id: self.id,
            date_started: self.created_at,
            dbid,
            duration: self.log_index * SECONDS_PER_TICK,
            fleet: fleet.to_string(),
            start_am: self.max_hp,
            final_am: self.hp,
            ship_id: self.ship_id,
            ship_trait: self.ship_trait,
            primary_skill: self.skills.primary_skill,
            secondary_skill: self.skills.secondary_skill,
            seats,
            aggregates: self.skill_aggregates,
            loot,
            extended: false,
        }
    }
}
