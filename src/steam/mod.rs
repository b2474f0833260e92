//! Steam store metadata lookup
//!
//! A thin client over the store's `appdetails` endpoint with an in-memory
//! cache of successful lookups.

pub mod cache;
pub mod client;

pub use cache::MetadataCache;
pub use client::SteamClient;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Client-visible messages of the lookup endpoint
pub mod messages {
    pub const INVALID_APP_ID: &str = "Invalid App ID";
    pub const GAME_NOT_FOUND: &str = "Game not found";
    pub const INTERNAL_ERROR: &str = "Internal server error";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOverview {
    pub final_formatted: String,
}

/// The subset of store data the front-end renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetails {
    pub name: String,
    #[serde(default)]
    pub header_image: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_overview: Option<PriceOverview>,
}

/// One entry of the store's answer, keyed by app id
#[derive(Debug, Deserialize)]
pub(crate) struct AppDetailsEntry {
    pub success: bool,
    #[serde(default)]
    pub data: Option<GameDetails>,
}

pub(crate) type AppDetailsResponse = HashMap<String, AppDetailsEntry>;

#[derive(Error, Debug)]
pub enum SteamLookupError {
    #[error("Steam request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Steam responded with status {0}")]
    Status(http::StatusCode),
}

/// Body of `GET /api/games/{appid}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLookupResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<GameDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GameLookupResponse {
    pub fn found(details: GameDetails) -> Self {
        Self {
            success: true,
            data: Some(details),
            error: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
        }
    }
}
