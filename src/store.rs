//! The voyage log store: canonical collections, import pipeline, and
//! persistence against an opaque blob-store boundary.
//!
//! The store is an owned context object with a single logical writer:
//! every mutation takes `&mut self`, which serializes the uniqueness
//! check against the commit. Persistence is fire-and-forget — a failed
//! write is logged, the in-memory effect stands, and subscribers are
//! notified after every attempt regardless of its outcome.

use async_trait::async_trait;

use crate::constants::VOYAGE_LOG_KEY;
use crate::entry::{AllData, ExportVersion, PlayerEntry, VoyageEntry, VoyageExport};
use crate::estimator::Estimator;
use crate::import::{Checkpoint, CheckpointList, CheckpointName, ImportError, PlayerExport};
use crate::query::Query;
use crate::stats::{SeatUsage, seat_usage};

/// The persistent blob-store boundary: an opaque asynchronous get/set
/// keyed blob store. Implementations live outside this crate.
#[async_trait]
pub trait VoyageStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the persisted log, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<AllData>, Self::Error>;

    /// Persist the full log.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    async fn set(&self, key: &str, data: &AllData) -> Result<(), Self::Error>;
}

/// Handle for deterministically unregistering a change subscriber.
pub type SubscriptionId = u64;

type Subscriber = Box<dyn Fn() + Send>;

/// Canonical in-memory log of voyages and players.
///
/// Invariants: no two stored voyages share an `id`, no two stored
/// players share a `dbid`.
pub struct VoyageLog<S: VoyageStorage> {
    storage: S,
    estimator: Estimator,
    players: Vec<PlayerEntry>,
    voyages: Vec<VoyageEntry>,
    loading: bool,
    loaded: bool,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: SubscriptionId,
}

impl<S: VoyageStorage> VoyageLog<S> {
    /// Empty store with the default estimator.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_estimator(storage, Estimator::default())
    }

    /// Empty store classifying extended voyages with a custom estimator.
    #[must_use]
    pub fn with_estimator(storage: S, estimator: Estimator) -> Self {
        Self {
            storage,
            estimator,
            players: Vec::new(),
            voyages: Vec::new(),
            loading: false,
            loaded: false,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Whether the initial load has completed.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the initial load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The estimator used to classify extended voyages.
    #[must_use]
    pub const fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Pull persisted state from the blob store, deduplicating by key.
    ///
    /// A read failure leaves the store empty; either way the store ends
    /// loaded and subscribers are notified. Calling again is a no-op.
    pub async fn load(&mut self) {
        if self.loading || self.loaded {
            return;
        }
        self.loading = true;
        match self.storage.get(VOYAGE_LOG_KEY).await {
            Ok(Some(data)) => {
                self.players = dedupe_players(data.players);
                self.voyages = dedupe_voyages(data.voyages);
            }
            Ok(None) => {}
            Err(err) => {
                log::error!("failed to load voyage log: {err}");
            }
        }
        self.loading = false;
        self.loaded = true;
        self.notify();
    }

    /// Register a change subscriber; fired after load and every mutation.
    pub fn subscribe(&mut self, callback: impl Fn() + Send + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Drop a subscriber. Returns false when the id was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    fn notify(&self) {
        log::debug!("notifying {} voyage log subscribers", self.subscribers.len());
        for (_, subscriber) in &self.subscribers {
            subscriber();
        }
    }

    /// Persist the full log, then notify. A write failure is logged and
    /// swallowed; the in-memory mutation stands either way.
    async fn persist(&mut self) {
        let data = AllData {
            players: self.players.clone(),
            voyages: self.voyages.clone(),
        };
        if let Err(err) = self.storage.set(VOYAGE_LOG_KEY, &data).await {
            log::error!("failed to store voyage log: {err}");
        }
        self.notify();
    }

    /// Append a voyage unless its id is already stored. Persists and
    /// notifies; returns whether the entry was added.
    pub async fn add_voyage(&mut self, entry: VoyageEntry) -> bool {
        let added = self.push_voyage(entry);
        self.persist().await;
        added
    }

    /// Upsert a player by `dbid`. Persists and notifies; returns whether
    /// a new row was added (as opposed to renaming an existing one).
    pub async fn add_player(&mut self, player: PlayerEntry) -> bool {
        let added = self.upsert_player(player);
        self.persist().await;
        added
    }

    fn push_voyage(&mut self, entry: VoyageEntry) -> bool {
        if self.voyages.iter().any(|existing| existing.id == entry.id) {
            return false;
        }
        self.voyages.push(entry);
        true
    }

    fn upsert_player(&mut self, player: PlayerEntry) -> bool {
        match self
            .players
            .iter_mut()
            .find(|existing| existing.dbid == player.dbid)
        {
            Some(existing) => {
                // Policy choice: a repeat import refreshes the display name.
                existing.current_player_name = player.current_player_name;
                existing.id = player.id;
                false
            }
            None => {
                self.players.push(player);
                true
            }
        }
    }

    /// Run one raw game export through the import validation pipeline.
    ///
    /// Checkpoints are recorded in pipeline order. `voyageCompleted` and
    /// `voyageUnique` are both evaluated before either aborts the import;
    /// `voyageNotExtended` is informational and never gates persistence.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] carrying the checkpoints recorded up to
    /// the abort when the text fails to parse or a gating stage fails.
    pub async fn import_voyage(&mut self, json: &str) -> Result<CheckpointList, ImportError> {
        let mut checkpoints = CheckpointList::new();

        let export: PlayerExport = match serde_json::from_str(json) {
            Ok(export) => {
                checkpoints.push(Checkpoint::passed(CheckpointName::ParsedJson));
                export
            }
            Err(source) => {
                checkpoints.push(Checkpoint::failed(CheckpointName::ParsedJson));
                return Err(ImportError::Parse {
                    checkpoints,
                    source,
                });
            }
        };

        let player = export.player;
        let Some(raw) = player.character.voyage.into_iter().next() else {
            checkpoints.push(Checkpoint::failed(CheckpointName::VoyageFound));
            return Err(ImportError::Validation { checkpoints });
        };
        checkpoints.push(Checkpoint::passed(CheckpointName::VoyageFound));

        let completed = raw.state != crate::entry::VoyageState::Started;
        checkpoints.push(Checkpoint {
            name: CheckpointName::VoyageCompleted,
            completed,
        });
        let unique = !self.voyages.iter().any(|entry| entry.id == raw.id);
        checkpoints.push(Checkpoint {
            name: CheckpointName::VoyageUnique,
            completed: unique,
        });
        if !completed || !unique {
            return Err(ImportError::Validation { checkpoints });
        }

        let mut entry = raw.into_entry(player.dbid, &player.fleet.slabel);
        let estimate = self.estimator.estimate(
            entry.start_am,
            entry.primary_skill,
            entry.secondary_skill,
            &entry.aggregates,
        );
        entry.extended = entry.duration > estimate.max;
        checkpoints.push(Checkpoint {
            name: CheckpointName::VoyageNotExtended,
            completed: !entry.extended,
        });

        self.push_voyage(entry);
        self.upsert_player(PlayerEntry {
            id: player.id,
            dbid: player.dbid,
            current_player_name: player.character.display_name,
        });
        self.persist().await;
        checkpoints.push(Checkpoint::passed(CheckpointName::VoyageSaved));

        Ok(checkpoints)
    }

    /// Bulk-merge an exported snapshot through the same uniqueness
    /// reducers used at load time; duplicate rows are dropped. Returns
    /// the number of voyages actually added.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the blob is not a valid export.
    pub async fn import_data(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let export: VoyageExport = serde_json::from_str(json)?;
        let before = self.voyages.len();
        for voyage in export.voyages {
            self.push_voyage(voyage);
        }
        for player in export.players {
            if !self.players.iter().any(|existing| existing.dbid == player.dbid) {
                self.players.push(player);
            }
        }
        let added = self.voyages.len() - before;
        self.persist().await;
        Ok(added)
    }

    /// Serialize the log as a versioned export document.
    ///
    /// # Errors
    ///
    /// Returns the underlying serialization error, which only occurs if a
    /// stored record cannot be represented as JSON.
    pub fn export_data(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&VoyageExport {
            version: ExportVersion::current(),
            players: self.players.clone(),
            voyages: self.voyages.clone(),
        })
    }

    /// Retain only players and voyages whose `dbid` is in the filter; an
    /// empty filter empties the store. Persists once, notifies once.
    pub async fn clear(&mut self, player_filter: &[u64]) {
        self.voyages
            .retain(|voyage| player_filter.contains(&voyage.dbid));
        self.players
            .retain(|player| player_filter.contains(&player.dbid));
        self.persist().await;
    }

    /// Pop the most recently added voyage, persist, notify.
    pub async fn remove_last_voyage(&mut self) -> Option<VoyageEntry> {
        let removed = self.voyages.pop();
        self.persist().await;
        removed
    }

    /// Replace in-memory state with the bundled sample fixture and
    /// notify. Does not persist.
    pub fn load_sample_data(&mut self) {
        let sample: AllData = serde_json::from_str(include_str!("../assets/sample.json"))
            .expect("valid bundled sample data");
        self.players = sample.players;
        self.voyages = sample.voyages;
        self.notify();
    }

    /// Query over the stored voyages.
    #[must_use]
    pub fn voyages(&self) -> Query<VoyageEntry> {
        Query::new(self.voyages.clone())
    }

    /// Query over the stored players.
    #[must_use]
    pub fn players(&self) -> Query<PlayerEntry> {
        Query::new(self.players.clone())
    }

    /// Query over every crewed seat across all stored voyages.
    #[must_use]
    pub fn seat_usage(&self) -> Query<SeatUsage> {
        seat_usage(&self.voyages())
    }
}

fn dedupe_voyages(voyages: Vec<VoyageEntry>) -> Vec<VoyageEntry> {
    voyages.into_iter().fold(Vec::new(), |mut unique, voyage| {
        if !unique.iter().any(|existing| existing.id == voyage.id) {
            unique.push(voyage);
        }
        unique
    })
}

fn dedupe_players(players: Vec<PlayerEntry>) -> Vec<PlayerEntry> {
    players.into_iter().fold(Vec::new(), |mut unique, player| {
        if !unique.iter().any(|existing| existing.dbid == player.dbid) {
            unique.push(player);
        }
        unique
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::SkillId;
    use chrono::{TimeZone, Utc};
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemoryStorage {
        blob: Arc<Mutex<Option<AllData>>>,
        writes: Arc<AtomicUsize>,
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

    #[derive(Debug, thiserror::Error)]
    #[error("backend offline")]
    struct OfflineError;

    struct FailingStorage;

    #[async_trait]
    impl VoyageStorage for FailingStorage {
        type Error = OfflineError;

        async fn get(&self, _key: &str) -> Result<Option<AllData>, Self::Error> {
            Err(OfflineError)
        }

        async fn set(&self, _key: &str, _data: &AllData) -> Result<(), Self::Error> {
            Err(OfflineError)
        }
    }

    fn voyage(id: u64, dbid: u64) -> VoyageEntry {
        VoyageEntry {
            id,
            date_started: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            dbid,
            duration: 3600,
            fleet: String::new(),
            start_am: 2500,
            final_am: 0,
            ship_id: 1,
            ship_trait: None,
            primary_skill: SkillId::Science,
            secondary_skill: SkillId::Diplomacy,
            seats: Vec::new(),
            aggregates: Default::default(),
            loot: Vec::new(),
            extended: false,
        }
    }

    fn player(dbid: u64, name: &str) -> PlayerEntry {
        PlayerEntry {
            id: dbid * 100,
            dbid,
            current_player_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn load_deduplicates_persisted_rows() {
        let storage = MemoryStorage::default();
        *storage.blob.lock().unwrap() = Some(AllData {
            players: vec![player(1, "kira"), player(1, "kira-duplicate"), player(2, "odo")],
            voyages: vec![voyage(10, 1), voyage(10, 1), voyage(11, 2)],
        });

        let mut log = VoyageLog::new(storage);
        log.load().await;

        assert!(log.is_loaded());
        assert_eq!(log.players().count(), 2);
        assert_eq!(log.voyages().count(), 2);
        assert_eq!(
            log.players().first().unwrap().current_player_name,
            "kira"
        );
    }

    #[tokio::test]
    async fn load_is_idempotent_and_notifies_once() {
        let storage = MemoryStorage::default();
        let mut log = VoyageLog::new(storage);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        log.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        log.load().await;
        log.load().await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn load_failure_leaves_an_empty_loaded_store() {
        let mut log = VoyageLog::new(FailingStorage);
        log.load().await;

        assert!(log.is_loaded());
        assert_eq!(log.voyages().count(), 0);
    }

    #[tokio::test]
    async fn add_voyage_rejects_duplicate_ids() {
        let mut log = VoyageLog::new(MemoryStorage::default());
        assert!(log.add_voyage(voyage(1, 5)).await);
        assert!(!log.add_voyage(voyage(1, 5)).await);
        assert_eq!(log.voyages().count(), 1);
    }

    #[tokio::test]
    async fn add_player_renames_existing_dbid() {
        let mut log = VoyageLog::new(MemoryStorage::default());
        assert!(log.add_player(player(7, "old name")).await);
        assert!(!log.add_player(player(7, "new name")).await);
        assert_eq!(log.players().count(), 1);
        assert_eq!(
            log.players().first().unwrap().current_player_name,
            "new name"
        );
    }

    #[tokio::test]
    async fn mutation_persists_despite_write_failure() {
        let mut log = VoyageLog::new(FailingStorage);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        log.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(log.add_voyage(voyage(3, 9)).await);

        assert_eq!(log.voyages().count(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clear_with_filter_retains_matching_players() {
        let storage = MemoryStorage::default();
        let mut log = VoyageLog::new(storage.clone());
        log.add_player(player(1, "kira")).await;
        log.add_player(player(2, "odo")).await;
        log.add_voyage(voyage(10, 1)).await;
        log.add_voyage(voyage(11, 2)).await;

        let writes_before = storage.writes.load(Ordering::SeqCst);
        log.clear(&[2]).await;

        assert_eq!(log.players().count(), 1);
        assert_eq!(log.players().first().unwrap().dbid, 2);
        assert_eq!(log.voyages().count(), 1);
        assert_eq!(log.voyages().first().unwrap().dbid, 2);
        assert_eq!(storage.writes.load(Ordering::SeqCst), writes_before + 1);
    }

    #[tokio::test]
    async fn remove_last_voyage_pops_most_recent() {
        let mut log = VoyageLog::new(MemoryStorage::default());
        log.add_voyage(voyage(1, 1)).await;
        log.add_voyage(voyage(2, 1)).await;

        let removed = log.remove_last_voyage().await;

        assert_eq!(removed.map(|entry| entry.id), Some(2));
        assert_eq!(log.voyages().count(), 1);

        log.remove_last_voyage().await;
        assert!(log.remove_last_voyage().await.is_none());
    }

    #[tokio::test]
    async fn export_then_import_round_trips_and_dedupes() {
        let mut log = VoyageLog::new(MemoryStorage::default());
        log.add_player(player(1, "kira")).await;
        log.add_voyage(voyage(10, 1)).await;

        let blob = log.export_data().unwrap();
        // Re-importing the same snapshot adds nothing.
        let added = log.import_data(&blob).await.unwrap();
        assert_eq!(added, 0);
        assert_eq!(log.voyages().count(), 1);
        assert_eq!(log.players().count(), 1);

        let mut fresh = VoyageLog::new(MemoryStorage::default());
        let added = fresh.import_data(&blob).await.unwrap();
        assert_eq!(added, 1);
        assert_eq!(fresh.players().count(), 1);
    }

    #[tokio::test]
    async fn import_data_rejects_malformed_blobs() {
        let mut log = VoyageLog::new(MemoryStorage::default());
        assert!(log.import_data("not json").await.is_err());
        assert_eq!(log.voyages().count(), 0);
    }

    #[test]
    fn unsubscribe_is_deterministic() {
        let mut log = VoyageLog::new(MemoryStorage::default());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let id = log.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(log.unsubscribe(id));
        assert!(!log.unsubscribe(id));
        log.load_sample_data();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn load_sample_data_replaces_state_without_persisting() {
        let storage = MemoryStorage::default();
        let mut log = VoyageLog::new(storage.clone());
        log.load_sample_data();

        assert!(log.voyages().count() > 0);
        assert!(log.players().count() > 0);
        assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
    }
}
