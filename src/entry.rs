//! Canonical domain records for logged voyages and players.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{EXPORT_VERSION_MAJOR, EXPORT_VERSION_MINOR};
use crate::skills::{SkillId, SkillSet};

/// Seat slots of a voyage, in fixed order. A full voyage crews all twelve.
pub const VOYAGE_SEATS: [&str; 12] = [
    "captain_slot",
    "first_officer",
    "chief_communications_officer",
    "communications_officer",
    "chief_engineering_officer",
    "engineering_officer",
    "chief_medical_officer",
    "medical_officer",
    "chief_science_officer",
    "science_officer",
    "chief_security_officer",
    "security_officer",
];

/// Position of a seat symbol within [`VOYAGE_SEATS`], or -1 when unknown.
#[must_use]
pub fn seat_index(symbol: &str) -> i32 {
    VOYAGE_SEATS
        .iter()
        .position(|seat| *seat == symbol)
        .map_or(-1, |index| index as i32)
}

/// Lifecycle states the game reports for a voyage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoyageState {
    /// Still running; cannot be logged yet.
    Started,
    Failed,
    Recalled,
    Completed,
}

/// One stack of voyage loot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub quantity: u32,
}

/// A crew member occupying one voyage seat. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoyagerRecord {
    pub seat_index: i32,
    pub voyager_id: u64,
    pub symbol: String,
    pub skills: SkillSet,
    pub rarity: u32,
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub trait_match: bool,
}

/// A committed voyage record. `id` is globally unique across the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoyageEntry {
    pub id: u64,
    pub date_started: DateTime<Utc>,
    /// Owning player.
    pub dbid: u64,
    /// Observed duration in seconds.
    pub duration: u32,
    pub fleet: String,
    pub start_am: i32,
    pub final_am: i32,
    pub ship_id: u64,
    #[serde(default)]
    pub ship_trait: Option<String>,
    pub primary_skill: SkillId,
    pub secondary_skill: SkillId,
    pub seats: Vec<VoyagerRecord>,
    pub aggregates: SkillSet,
    #[serde(default)]
    pub loot: Vec<Item>,
    /// Whether the observed duration exceeded the simulated natural
    /// maximum. Derived once at import and never recomputed.
    pub extended: bool,
}

/// A player who has submitted voyages. `dbid` is unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub id: u64,
    pub dbid: u64,
    pub current_player_name: String,
}

/// The persisted shape of the whole log: every player and voyage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllData {
    #[serde(default)]
    pub players: Vec<PlayerEntry>,
    #[serde(default)]
    pub voyages: Vec<VoyageEntry>,
}

/// Version stamp written on exported snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportVersion {
    pub major: u32,
    pub minor: u32,
}

impl ExportVersion {
    /// The version this crate writes.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            major: EXPORT_VERSION_MAJOR,
            minor: EXPORT_VERSION_MINOR,
        }
    }
}

impl Default for ExportVersion {
    fn default() -> Self {
        Self::current()
    }
}

/// Export file format: a versioned snapshot of the log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoyageExport {
    #[serde(default)]
    pub version: ExportVersion,
    #[serde(default)]
    pub players: Vec<PlayerEntry>,
    #[serde(default)]
    pub voyages: Vec<VoyageEntry>,
}
