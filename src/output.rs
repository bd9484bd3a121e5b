//! Persistence and logging of snapshots and completed segments.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::model::{Segment, Snapshot};
use crate::static_data::StaticData;

/// Writes `snapshot` as pretty-printed JSON to `path`, replacing the file.
pub fn write_snapshot(path: &str, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).with_context(|| format!("Writing {path}"))?;
    debug!(path, trips = snapshot.len(), "Snapshot written");
    Ok(())
}

/// Emits one structured event for a completed segment.
///
/// Station and route names are attached when static data is available.
pub fn log_segment(segment: &Segment, names: Option<&StaticData>) {
    let from_name = names.and_then(|n| n.station_name(&segment.from_station));
    let to_name = names.and_then(|n| n.station_name(&segment.to_station));
    let route_name = names.and_then(|n| n.route_name(&segment.route_id));

    info!(
        trip_id = %segment.trip_id,
        route_id = %segment.route_id,
        train_id = %segment.train_id,
        from = %segment.from_station,
        to = %segment.to_station,
        from_name,
        to_name,
        route_name,
        depart_at = ?segment.depart_at,
        arrive_at = ?segment.arrive_at,
        scheduled_track = ?segment.scheduled_track,
        actual_track = ?segment.actual_track,
        "A segment completed"
    );
}
