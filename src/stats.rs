//! Derived statistics over the logged voyages, built on the query engine.

use chrono::{DateTime, Utc};

use crate::entry::{VoyageEntry, VoyagerRecord};
use crate::query::Query;

/// A seat assignment flattened out of its voyage, carrying just enough
/// context for per-voyager aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatUsage {
    pub voyager: VoyagerRecord,
    pub voyage_id: u64,
    /// Duration of the voyage this seat belonged to, in seconds.
    pub duration: u32,
}

/// Flatten every crewed seat across all voyages.
#[must_use]
pub fn seat_usage(voyages: &Query<VoyageEntry>) -> Query<SeatUsage> {
    voyages.reduce(
        |mut seats: Vec<SeatUsage>, voyage| {
            seats.extend(voyage.seats.iter().map(|seat| SeatUsage {
                voyager: seat.clone(),
                voyage_id: voyage.id,
                duration: voyage.duration,
            }));
            seats
        },
        Vec::new(),
    )
    .into()
}

/// Duration of the longest logged voyage, in seconds.
#[must_use]
pub fn longest_voyage(voyages: &Query<VoyageEntry>) -> Option<u32> {
    voyages
        .map(|voyage| voyage.duration)
        .sort(|duration| *duration, false)
        .first()
        .copied()
}

/// Mean voyage duration in seconds, or `None` for an empty log.
#[must_use]
pub fn mean_voyage_duration(voyages: &Query<VoyageEntry>) -> Option<f64> {
    if voyages.count() == 0 {
        return None;
    }
    let total: u64 = voyages.reduce(|sum, voyage| sum + u64::from(voyage.duration), 0);
    Some(total as f64 / voyages.count() as f64)
}

/// Start timestamp of the earliest logged voyage.
#[must_use]
pub fn oldest_voyage(voyages: &Query<VoyageEntry>) -> Option<DateTime<Utc>> {
    voyages
        .sort(|voyage| voyage.date_started.timestamp_millis(), true)
        .first()
        .map(|voyage| voyage.date_started)
}

/// Total seconds voyaged across all given seat assignments.
#[must_use]
pub fn total_voyage_time(seats: &Query<SeatUsage>) -> u64 {
    seats.reduce(|total, seat| total + u64::from(seat.duration), 0)
}

/// Voyagers tied for the most seat assignments, as `(symbol, count)`.
///
/// Ranks the twelve most-seated voyagers and keeps the leading run of
/// ties, so co-leaders are all reported.
#[must_use]
pub fn most_used_voyagers(seats: &Query<SeatUsage>) -> Vec<(String, usize)> {
    let ranked = seats
        .group(|seat| seat.voyager.symbol.clone())
        .map(|(symbol, voyages)| (symbol.clone(), voyages.count()))
        .sort(|(_, count)| *count, false)
        .limit(12);
    leading_ties(&ranked)
}

/// Voyagers tied for the most accumulated voyage time, as
/// `(symbol, total seconds)`.
#[must_use]
pub fn most_travelled_voyagers(seats: &Query<SeatUsage>) -> Vec<(String, u64)> {
    let ranked = seats
        .group(|seat| seat.voyager.symbol.clone())
        .map(|(symbol, voyages)| (symbol.clone(), total_voyage_time(voyages)))
        .sort(|(_, total)| *total, false)
        .limit(12);
    leading_ties(&ranked)
}

/// Leading run of entries whose value ties the first entry.
fn leading_ties<K: Clone, V: PartialEq + Clone>(ranked: &Query<(K, V)>) -> Vec<(K, V)> {
    ranked.reduce(
        |mut best: Vec<(K, V)>, next| {
            if best.is_empty() || best[0].1 == next.1 {
                best.push(next.clone());
            }
            best
        },
        Vec::new(),
    )
}
