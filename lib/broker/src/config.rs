//! Centralized broker configuration.
//!
//! This module provides strongly-typed configuration for the broker,
//! loaded via the `config` crate from environment variables.

use serde::Deserialize;
use switchboard_core::ParticipantId;

/// Broker configuration.
#[derive(Debug, Deserialize)]
pub struct BrokerConfig {
    /// Platform ids of participants allowed to use moderation and
    /// broadcast operations.
    #[serde(default)]
    pub administrators: Vec<i64>,

    /// Notice text overrides.
    #[serde(default)]
    pub notices: NoticeConfig,
}

/// User-facing notice texts, overridable per deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct NoticeConfig {
    /// Sent once after a successful registration.
    #[serde(default = "default_welcome")]
    pub welcome: String,

    /// Sent to both sides of a fresh pairing.
    #[serde(default = "default_partner_found")]
    pub partner_found: String,

    /// Sent to a requester entering the waiting queue.
    #[serde(default = "default_waiting")]
    pub waiting: String,

    /// Sent to a requester whose own ticket headed the queue.
    #[serde(default = "default_still_searching")]
    pub still_searching: String,

    /// Sent to the remaining partner when a session is closed.
    #[serde(default = "default_partner_left")]
    pub partner_left: String,

    /// Acknowledgment sent to whoever closed the session.
    #[serde(default = "default_session_ended")]
    pub session_ended: String,

    /// Prefix of the map-link text sent back to a location's sender.
    #[serde(default = "default_location_sent")]
    pub location_sent: String,

    /// Prefix of the map-link text sent to the location's recipient.
    #[serde(default = "default_location_received")]
    pub location_received: String,
}

fn default_welcome() -> String {
    "Welcome! Use /search to find a partner.".to_string()
}

fn default_partner_found() -> String {
    "Partner found! Say hi.".to_string()
}

fn default_waiting() -> String {
    "Looking for a partner...".to_string()
}

fn default_still_searching() -> String {
    "Still searching, hang tight.".to_string()
}

fn default_partner_left() -> String {
    "Your partner has left the chat.".to_string()
}

fn default_session_ended() -> String {
    "Chat ended. Use /search to find a new partner.".to_string()
}

fn default_location_sent() -> String {
    "You shared your location:".to_string()
}

fn default_location_received() -> String {
    "Your partner shared a location:".to_string()
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            welcome: default_welcome(),
            partner_found: default_partner_found(),
            waiting: default_waiting(),
            still_searching: default_still_searching(),
            partner_left: default_partner_left(),
            session_ended: default_session_ended(),
            location_sent: default_location_sent(),
            location_received: default_location_received(),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            administrators: Vec::new(),
            notices: NoticeConfig::default(),
        }
    }
}

impl BrokerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if present configuration values are invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Administrator ids as participant ids.
    #[must_use]
    pub fn administrator_ids(&self) -> Vec<ParticipantId> {
        self.administrators
            .iter()
            .copied()
            .map(ParticipantId::new)
            .collect()
    }
}
