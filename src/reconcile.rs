//! Turns successive snapshots into completed travel segments.
//!
//! The feed never says a station visit is over. It just stops reporting the
//! station, and later stops reporting the trip. [`reconcile`] diffs the last
//! durable snapshot against a fresh observation and infers both.
//!
//! Per prior trip:
//! - still observed: merge legs, then scan for adjacent completed pairs;
//! - vanished: apply the disappearance rules in [`judge_disappearance`].
//!
//! Trips seen for the first time are stored verbatim.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use crate::model::{Leg, Segment, Snapshot, Trip};

/// How far back a completed leg may lie for a vanished trip to be trusted.
pub const DISAPPEARANCE_WINDOW_MINUTES: i64 = 30;

/// Output of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Becomes the next durable snapshot.
    pub snapshot: Snapshot,
    /// Segments finished since `prior`, in trip id then travel order.
    pub completed: Vec<Segment>,
}

/// What to do with a trip that is missing from the current observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disappearance {
    /// Nothing completed recently: a stale ghost, forget it.
    Discard,
    /// Two legs, first done: the feed dropped the trip just before the final
    /// arrival would have been seen. Complete it and emit the last segment.
    Complete,
    /// Probably a glitch in the feed. Keep it and let a later poll decide.
    Retain,
}

/// Diffs `prior` against `current` at instant `now`.
///
/// Pure and deterministic: no I/O, and the same inputs always give the same
/// output.
pub fn reconcile(prior: &Snapshot, current: &Snapshot, now: DateTime<Utc>) -> Reconciliation {
    let mut out = Reconciliation::default();

    for trip in prior.trips() {
        match current.get(&trip.trip_id) {
            Some(observed) => {
                let merged = merge_legs(&trip.legs, &observed.legs);
                let (pending, segments) = scan_adjacent(trip, merged);
                out.completed.extend(segments);
                if pending.is_empty() {
                    debug!(trip_id = %trip.trip_id, "Trip fully consumed");
                } else {
                    out.snapshot.insert(observed.with_legs(pending));
                }
            }
            None => {
                let decision = judge_disappearance(trip, now);
                debug!(trip_id = %trip.trip_id, ?decision, "Trip vanished from feed");
                match decision {
                    Disappearance::Discard => {}
                    Disappearance::Complete => {
                        let mut legs = trip.legs.clone();
                        if let Some(last) = legs.last_mut() {
                            last.is_complete = true;
                        }
                        let (_, segments) = scan_adjacent(trip, legs);
                        out.completed.extend(segments);
                    }
                    Disappearance::Retain => {
                        out.snapshot.insert(trip.clone());
                    }
                }
            }
        }
    }

    for trip in current.trips() {
        if !prior.contains(&trip.trip_id) {
            out.snapshot.insert(trip.clone());
        }
    }

    out
}

/// Applies the newest observation to a trip's previous leg list.
///
/// Completed legs are kept as they were. A pending leg whose station is no
/// longer reported is complete; otherwise the fresh prediction replaces it.
/// Stations that only appear in `observed` are ignored.
pub fn merge_legs(previous: &[Leg], observed: &[Leg]) -> Vec<Leg> {
    previous
        .iter()
        .map(|leg| {
            if leg.is_complete {
                return leg.clone();
            }
            match observed.iter().find(|o| o.stop_id == leg.stop_id) {
                Some(fresh) => fresh.clone(),
                None => {
                    trace!(stop_id = %leg.stop_id, "Leg completed by omission");
                    Leg {
                        is_complete: true,
                        ..leg.clone()
                    }
                }
            }
        })
        .collect()
}

/// Walks `legs` in travel order pairing adjacent completed legs.
///
/// Returns the legs to keep and the segments found. A completed leg waiting
/// on a pending successor is carried; a completed tail leg is dropped.
pub fn scan_adjacent(trip: &Trip, legs: Vec<Leg>) -> (Vec<Leg>, Vec<Segment>) {
    let mut pending = Vec::new();
    let mut completed = Vec::new();

    for (i, leg) in legs.iter().enumerate() {
        if !leg.is_complete {
            pending.push(leg.clone());
            continue;
        }
        let Some(next) = legs.get(i + 1) else {
            break;
        };
        if next.is_complete {
            completed.push(Segment::between(trip, leg, next));
        } else {
            pending.push(leg.clone());
        }
    }

    (pending, completed)
}

/// Decides the fate of a trip absent from the current observation.
///
/// The two-leg completion rule is a heuristic; a short trip that disappears
/// for some other reason will be completed too.
pub fn judge_disappearance(trip: &Trip, now: DateTime<Utc>) -> Disappearance {
    let cutoff = now - Duration::minutes(DISAPPEARANCE_WINDOW_MINUTES);
    let latest = trip
        .legs
        .iter()
        .filter(|l| l.is_complete)
        .filter_map(Leg::last_event_at)
        .max();

    match latest {
        Some(at) if at > cutoff => {
            if trip.legs.len() == 2 && trip.legs[0].is_complete {
                Disappearance::Complete
            } else {
                Disappearance::Retain
            }
        }
        _ => Disappearance::Discard,
    }
}
