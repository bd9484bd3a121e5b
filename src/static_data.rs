//! Static reference data used to make segment logs readable.
//!
//! Loads GTFS `routes.txt` and the MTA `Stations.csv` from a directory. Only
//! the columns needed for name lookups are read; extra columns are ignored.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    #[serde(default)]
    pub route_color: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Station {
    #[serde(rename = "Station ID")]
    pub station_id: u32,
    /// Parent stop id, without the N/S platform suffix used in real-time feeds.
    #[serde(rename = "GTFS Stop ID")]
    pub gtfs_stop_id: String,
    #[serde(rename = "Line")]
    pub line: String,
    #[serde(rename = "Stop Name")]
    pub name: String,
    #[serde(rename = "Borough")]
    pub borough: String,
    #[serde(rename = "Structure")]
    pub structure: String,
    #[serde(rename = "GTFS Latitude")]
    pub latitude: f64,
    #[serde(rename = "GTFS Longitude")]
    pub longitude: f64,
}

/// Reads every row of the CSV file at `path` into `T`.
pub fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Opening {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result.with_context(|| format!("Parsing {}", path.display()))?;
        rows.push(record);
    }

    Ok(rows)
}

/// Name lookups for stations and routes.
#[derive(Debug, Default)]
pub struct StaticData {
    stations: HashMap<String, Station>,
    routes: HashMap<String, Route>,
}

impl StaticData {
    pub const STATIONS_FILE: &'static str = "Stations.csv";
    pub const ROUTES_FILE: &'static str = "routes.txt";

    /// Loads `Stations.csv` and `routes.txt` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let stations: Vec<Station> = load_csv(&dir.join(Self::STATIONS_FILE))?;
        let routes: Vec<Route> = load_csv(&dir.join(Self::ROUTES_FILE))?;
        info!(
            stations = stations.len(),
            routes = routes.len(),
            "Static data loaded"
        );
        Ok(Self::from_parts(stations, routes))
    }

    pub fn from_parts(stations: Vec<Station>, routes: Vec<Route>) -> Self {
        Self {
            stations: stations
                .into_iter()
                .map(|s| (s.gtfs_stop_id.clone(), s))
                .collect(),
            routes: routes
                .into_iter()
                .map(|r| (r.route_id.clone(), r))
                .collect(),
        }
    }

    /// Looks up the station for a real-time stop id such as `F27N`.
    pub fn station(&self, stop_id: &str) -> Option<&Station> {
        self.stations
            .get(stop_id)
            .or_else(|| self.stations.get(parent_stop_id(stop_id)))
    }

    pub fn station_name(&self, stop_id: &str) -> Option<&str> {
        self.station(stop_id).map(|s| s.name.as_str())
    }

    pub fn route_name(&self, route_id: &str) -> Option<&str> {
        self.routes.get(route_id).map(|r| r.route_long_name.as_str())
    }
}

/// Strips the platform direction suffix from a stop id.
fn parent_stop_id(stop_id: &str) -> &str {
    stop_id
        .strip_suffix('N')
        .or_else(|| stop_id.strip_suffix('S'))
        .unwrap_or(stop_id)
}
