//! Shared fixtures for the end-to-end store scenarios.
#![allow(dead_code)] // each test target uses a different subset

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use voyagelog::{AllData, VoyageStorage};

/// In-memory stand-in for the opaque blob-store backend, counting writes.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<AllData>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn persisted(&self) -> Option<AllData> {
        self.blob.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoyageStorage for MemoryStorage {
    type Error = Infallible;

    async fn get(&self, _key: &str) -> Result<Option<AllData>, Self::Error> {
        Ok(self.blob.lock().unwrap().clone())
    }

    async fn set(&self, _key: &str, data: &AllData) -> Result<(), Self::Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.blob.lock().unwrap() = Some(data.clone());
        Ok(())
    }
}

pub const SEAT_SYMBOLS: [&str; 12] = [
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

/// Build a raw game export carrying one voyage in the given state.
///
/// The aggregates describe a crew strong enough that a one-hour voyage is
/// always well inside the estimator's natural range.
pub fn raw_export(
    dbid: u64,
    player_name: &str,
    voyage_id: u64,
    state: &str,
    log_index: u32,
) -> String {
    let crew_slots: Vec<serde_json::Value> = SEAT_SYMBOLS
        .iter()
        .enumerate()
        .map(|(index, symbol)| {
            json!({
                "symbol": symbol,
                "trait": "explorer",
                "crew": {
                    "id": 40_000 + index as u64,
                    "symbol": format!("crew_{index}"),
                    "skills": {
                        "command_skill": {
                            "core": 600 + 20 * index,
                            "range_min": 80,
                            "range_max": 220
                        }
                    },
                    "rarity": 4,
                    "traits": if index % 2 == 0 { vec!["explorer"] } else { vec!["diplomat"] }
                }
            })
        })
        .collect();

    json!({
        "player": {
            "id": dbid + 7,
            "dbid": dbid,
            "fleet": { "slabel": "Delta Flyers" },
            "character": {
                "display_name": player_name,
                "voyage": [{
                    "id": voyage_id,
                    "ship_trait": "explorer",
                    "skills": {
                        "primary_skill": "science_skill",
                        "secondary_skill": "diplomacy_skill"
                    },
                    "state": state,
                    "max_hp": 2625,
                    "hp": 0,
                    "log_index": log_index,
                    "pending_rewards": { "loot": [{ "id": 9001, "quantity": 2 }] },
                    "created_at": "2024-03-01T12:00:00Z",
                    "ship_id": 815,
                    "skill_aggregates": {
                        "command_skill": { "core": 6652, "range_min": 1141, "range_max": 2508 },
                        "diplomacy_skill": { "core": 9908, "range_min": 1876, "range_max": 3781 },
                        "engineering_skill": { "core": 3867, "range_min": 616, "range_max": 1264 },
                        "medicine_skill": { "core": 2552, "range_min": 510, "range_max": 1153 },
                        "science_skill": { "core": 9767, "range_min": 1908, "range_max": 4245 },
                        "security_skill": { "core": 6214, "range_min": 1175, "range_max": 2479 }
                    },
                    "crew_slots": crew_slots
                }]
            }
        }
    })
    .to_string()
}

/// An export whose character has no voyages at all.
pub fn raw_export_without_voyage(dbid: u64) -> String {
    json!({
        "player": {
            "id": dbid + 7,
            "dbid": dbid,
            "fleet": { "slabel": "Delta Flyers" },
            "character": {
                "display_name": "Voyageless",
                "voyage": []
            }
        }
    })
    .to_string()
}
