//! Protobuf parser for the NYCT subway GTFS Realtime feeds.
//!
//! [`parse_feed`] decodes the raw message; [`decode_status`] lowers it into the
//! canonical [`FeedStatus`] model.

use chrono::{DateTime, Utc};
use prost::Message;

use crate::error::DecodeError;
use crate::gtfs_rt::{self, FeedMessage, nyct_trip_descriptor, trip_update};
use crate::model::{
    Direction, FeedHeader, FeedStatus, Leg, TimeRange, Trip, TripReplacementPeriod,
};

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage, DecodeError> {
    Ok(FeedMessage::decode(bytes)?)
}

/// Converts a decoded message into header plus trips.
///
/// Entities without a trip update (vehicle positions) are skipped. A missing
/// required field anywhere fails the whole feed.
pub fn decode_status(message: &FeedMessage) -> Result<FeedStatus, DecodeError> {
    let header = decode_header(&message.header)?;
    let trips = message
        .entity
        .iter()
        .filter_map(|e| e.trip_update.as_ref())
        .map(decode_trip)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeedStatus { header, trips })
}

fn decode_header(header: &gtfs_rt::FeedHeader) -> Result<FeedHeader, DecodeError> {
    let nyct = header
        .nyct_feed_header
        .as_ref()
        .ok_or(DecodeError::MissingField("header.nyct_feed_header"))?;

    let trip_replacement_periods = nyct
        .trip_replacement_period
        .iter()
        .map(|p| {
            let route_id = p
                .route_id
                .clone()
                .ok_or(DecodeError::MissingField("trip_replacement_period.route_id"))?;
            let replacement_period = match &p.replacement_period {
                Some(range) => TimeRange {
                    start: range.start.map(unsigned_time).transpose()?,
                    end: range.end.map(unsigned_time).transpose()?,
                },
                None => TimeRange::default(),
            };
            Ok(TripReplacementPeriod {
                route_id,
                replacement_period,
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    Ok(FeedHeader {
        gtfs_realtime_version: header.gtfs_realtime_version.clone(),
        timestamp: header.timestamp.map(unsigned_time).transpose()?,
        nyct_subway_version: nyct.nyct_subway_version.clone(),
        trip_replacement_periods,
    })
}

fn decode_trip(update: &gtfs_rt::TripUpdate) -> Result<Trip, DecodeError> {
    let descriptor = &update.trip;
    let nyct = descriptor
        .nyct_trip_descriptor
        .as_ref()
        .ok_or(DecodeError::MissingField("trip.nyct_trip_descriptor"))?;

    Ok(Trip {
        trip_id: descriptor
            .trip_id
            .clone()
            .ok_or(DecodeError::MissingField("trip.trip_id"))?,
        route_id: descriptor
            .route_id
            .clone()
            .ok_or(DecodeError::MissingField("trip.route_id"))?,
        train_id: nyct
            .train_id
            .clone()
            .ok_or(DecodeError::MissingField("trip.nyct_trip_descriptor.train_id"))?,
        is_assigned: nyct.is_assigned.unwrap_or(false),
        direction: nyct.direction.and_then(decode_direction),
        legs: update
            .stop_time_update
            .iter()
            .map(decode_leg)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn decode_direction(raw: i32) -> Option<Direction> {
    match nyct_trip_descriptor::Direction::try_from(raw).ok()? {
        nyct_trip_descriptor::Direction::North => Some(Direction::North),
        nyct_trip_descriptor::Direction::East => Some(Direction::East),
        nyct_trip_descriptor::Direction::South => Some(Direction::South),
        nyct_trip_descriptor::Direction::West => Some(Direction::West),
    }
}

fn decode_leg(update: &trip_update::StopTimeUpdate) -> Result<Leg, DecodeError> {
    let track = update.nyct_stop_time_update.as_ref();
    Ok(Leg {
        stop_id: update
            .stop_id
            .clone()
            .ok_or(DecodeError::MissingField("stop_time_update.stop_id"))?,
        arrival: event_time(update.arrival.as_ref())?,
        departure: event_time(update.departure.as_ref())?,
        scheduled_track: track.and_then(|t| t.scheduled_track.clone()),
        actual_track: track.and_then(|t| t.actual_track.clone()),
        is_complete: false,
    })
}

fn event_time(
    event: Option<&trip_update::StopTimeEvent>,
) -> Result<Option<DateTime<Utc>>, DecodeError> {
    event.and_then(|e| e.time).map(signed_time).transpose()
}

fn signed_time(secs: i64) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::from_timestamp(secs, 0).ok_or(DecodeError::TimestampOutOfRange(secs))
}

fn unsigned_time(secs: u64) -> Result<DateTime<Utc>, DecodeError> {
    let secs = i64::try_from(secs).map_err(|_| DecodeError::TimestampOutOfRange(i64::MAX))?;
    signed_time(secs)
}
