//! Canonical trip model shared by decoding, reconciliation and storage.
//!
//! Every optional wire field stays an `Option` here. An epoch-zero timestamp is
//! a real value and must not be confused with "not reported".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Travel direction as reported by the NYCT trip descriptor.
///
/// Uptown and Bronx-bound trains run `North`, downtown and Brooklyn-bound trains
/// run `South`. `East` and `West` are defined by the feed but not used today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

/// One station-level prediction within a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub stop_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_track: Option<String>,
    /// Only set by the feed for the first station of the remaining trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_track: Option<String>,
    /// Set once the feed stops reporting this station. Never reverts.
    #[serde(default)]
    pub is_complete: bool,
}

impl Leg {
    pub fn new(stop_id: impl Into<String>) -> Self {
        Self {
            stop_id: stop_id.into(),
            arrival: None,
            departure: None,
            scheduled_track: None,
            actual_track: None,
            is_complete: false,
        }
    }

    /// Last known event time at this station: departure, falling back to arrival.
    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.departure.or(self.arrival)
    }
}

/// One scheduled vehicle run across an ordered sequence of stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    pub train_id: String,
    /// The trip has been bound to a physical train by ATS.
    pub is_assigned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub legs: Vec<Leg>,
}

impl Trip {
    /// Same trip identity, different leg list.
    pub fn with_legs(&self, legs: Vec<Leg>) -> Self {
        Self {
            trip_id: self.trip_id.clone(),
            route_id: self.route_id.clone(),
            train_id: self.train_id.clone(),
            is_assigned: self.is_assigned,
            direction: self.direction,
            legs,
        }
    }
}

/// A vehicle travelled from one station to the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub from_station: String,
    pub to_station: String,
    pub depart_at: Option<DateTime<Utc>>,
    pub arrive_at: Option<DateTime<Utc>>,
    pub trip_id: String,
    pub route_id: String,
    pub train_id: String,
    pub is_assigned: bool,
    pub scheduled_track: Option<String>,
    pub actual_track: Option<String>,
}

impl Segment {
    /// Builds the segment for an adjacent pair of completed legs of `trip`.
    pub fn between(trip: &Trip, from: &Leg, to: &Leg) -> Self {
        Self {
            from_station: from.stop_id.clone(),
            to_station: to.stop_id.clone(),
            depart_at: from.departure,
            arrive_at: to.arrival,
            trip_id: trip.trip_id.clone(),
            route_id: trip.route_id.clone(),
            train_id: trip.train_id.clone(),
            is_assigned: trip.is_assigned,
            scheduled_track: from.scheduled_track.clone(),
            actual_track: from.actual_track.clone(),
        }
    }
}

/// All known trips at one point in time, keyed by trip id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    trips: BTreeMap<String, Trip>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `trip`, returning any trip previously stored under the same id.
    pub fn insert(&mut self, trip: Trip) -> Option<Trip> {
        self.trips.insert(trip.trip_id.clone(), trip)
    }

    pub fn get(&self, trip_id: &str) -> Option<&Trip> {
        self.trips.get(trip_id)
    }

    pub fn contains(&self, trip_id: &str) -> bool {
        self.trips.contains_key(trip_id)
    }

    /// Trips in trip id order.
    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips.values()
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

impl FromIterator<Trip> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Trip>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for trip in iter {
            snapshot.insert(trip);
        }
        snapshot
    }
}

/// Start and end of a time range; either side may be open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

/// Window in which the feed's trips replace the static schedule for a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripReplacementPeriod {
    pub route_id: String,
    pub replacement_period: TimeRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedHeader {
    pub gtfs_realtime_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub nyct_subway_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trip_replacement_periods: Vec<TripReplacementPeriod>,
}

/// One decoded feed: its header plus every trip update it carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedStatus {
    pub header: FeedHeader,
    pub trips: Vec<Trip>,
}
