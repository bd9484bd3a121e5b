//! Runtime configuration: feed endpoints and environment settings.

use anyhow::{Context, Result};
use clap::ValueEnum;
use reqwest::Url;

/// Public base of the MTA real-time feed service.
pub const DEFAULT_BASE_URL: &str = "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/";

/// Subway feed divisions, one GTFS-RT endpoint each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Division {
    Ace,
    Bdfm,
    G,
    Jz,
    Nqrw,
    L,
    /// 1, 2, 3, 4, 5, 6, 7 and the 42 St shuttle.
    Numbered,
    /// Staten Island Railway.
    Si,
}

impl Division {
    pub const ALL: [Division; 8] = [
        Division::Ace,
        Division::Bdfm,
        Division::G,
        Division::Jz,
        Division::Nqrw,
        Division::L,
        Division::Numbered,
        Division::Si,
    ];

    /// Path segment of the division's feed, already percent-encoded.
    pub fn feed_path(self) -> &'static str {
        match self {
            Division::Ace => "nyct%2Fgtfs-ace",
            Division::Bdfm => "nyct%2Fgtfs-bdfm",
            Division::G => "nyct%2Fgtfs-g",
            Division::Jz => "nyct%2Fgtfs-jz",
            Division::Nqrw => "nyct%2Fgtfs-nqrw",
            Division::L => "nyct%2Fgtfs-l",
            Division::Numbered => "nyct%2Fgtfs",
            Division::Si => "nyct%2Fgtfs-si",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Division::Ace => "ace",
            Division::Bdfm => "bdfm",
            Division::G => "g",
            Division::Jz => "jz",
            Division::Nqrw => "nqrw",
            Division::L => "l",
            Division::Numbered => "numbered",
            Division::Si => "si",
        }
    }

    pub fn endpoint(self, base: &Url) -> Result<Url> {
        base.join(self.feed_path())
            .with_context(|| format!("Invalid feed url for division {}", self.name()))
    }
}

/// Settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
}

impl Settings {
    pub const API_KEY_VAR: &'static str = "MTA_API_KEY";

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(Self::API_KEY_VAR)
            .with_context(|| format!("{} must be set", Self::API_KEY_VAR))?;
        Ok(Self { api_key })
    }
}

/// Resolves the divisions to poll; an empty selection means all of them.
pub fn selected_divisions(requested: &[Division]) -> Vec<Division> {
    if requested.is_empty() {
        Division::ALL.to_vec()
    } else {
        requested.to_vec()
    }
}
