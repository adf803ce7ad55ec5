//! Message payload types.
//!
//! Inbound content is modeled as a closed tagged variant type so the
//! relay dispatcher handles every kind exhaustively, rather than
//! branching on attribute presence.

use serde::{Deserialize, Serialize};

/// The kind of a payload, without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// Plain text message.
    Text,
    /// Photo by platform file reference.
    Photo,
    /// Voice note by platform file reference.
    Voice,
    /// Sticker by platform file reference.
    Sticker,
    /// Geographic location.
    Location,
}

impl PayloadKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Voice => "voice",
            Self::Sticker => "sticker",
            Self::Location => "location",
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message payload relayed between session partners.
///
/// Media variants carry the platform's opaque file reference; the
/// broker never transcodes content, it forwards the reference unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// Plain text.
    Text {
        /// The message text.
        text: String,
    },
    /// A photo.
    Photo {
        /// Platform file reference for the photo.
        file_ref: String,
        /// Optional caption.
        caption: Option<String>,
    },
    /// A voice note.
    Voice {
        /// Platform file reference for the voice note.
        file_ref: String,
    },
    /// A sticker.
    Sticker {
        /// Platform file reference for the sticker.
        file_ref: String,
    },
    /// A geographic location.
    Location {
        /// Latitude in degrees.
        latitude: f64,
        /// Longitude in degrees.
        longitude: f64,
    },
}

impl Payload {
    /// Creates a text payload.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates a photo payload.
    #[must_use]
    pub fn photo(file_ref: impl Into<String>) -> Self {
        Self::Photo {
            file_ref: file_ref.into(),
            caption: None,
        }
    }

    /// Creates a voice payload.
    #[must_use]
    pub fn voice(file_ref: impl Into<String>) -> Self {
        Self::Voice {
            file_ref: file_ref.into(),
        }
    }

    /// Creates a sticker payload.
    #[must_use]
    pub fn sticker(file_ref: impl Into<String>) -> Self {
        Self::Sticker {
            file_ref: file_ref.into(),
        }
    }

    /// Creates a location payload.
    #[must_use]
    pub fn location(latitude: f64, longitude: f64) -> Self {
        Self::Location {
            latitude,
            longitude,
        }
    }

    /// Returns the kind of this payload.
    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Text { .. } => PayloadKind::Text,
            Self::Photo { .. } => PayloadKind::Photo,
            Self::Voice { .. } => PayloadKind::Voice,
            Self::Sticker { .. } => PayloadKind::Sticker,
            Self::Location { .. } => PayloadKind::Location,
        }
    }

    /// Returns a map link for location payloads, `None` otherwise.
    ///
    /// The link is the derived artifact fanned out to both session
    /// members when a location is relayed.
    #[must_use]
    pub fn map_link(&self) -> Option<String> {
        match self {
            Self::Location {
                latitude,
                longitude,
            } => Some(format!(
                "https://www.google.com/maps?q={latitude},{longitude}"
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Payload::text("hi").kind(), PayloadKind::Text);
        assert_eq!(Payload::voice("file_1").kind(), PayloadKind::Voice);
        assert_eq!(Payload::location(1.0, 2.0).kind(), PayloadKind::Location);
    }

    #[test]
    fn map_link_only_for_locations() {
        let loc = Payload::location(-6.2, 106.8);
        assert_eq!(
            loc.map_link().expect("location has a link"),
            "https://www.google.com/maps?q=-6.2,106.8"
        );
        assert!(Payload::text("hi").map_link().is_none());
    }

    #[test]
    fn payload_serde_is_tagged() {
        let json = serde_json::to_string(&Payload::photo("abc")).expect("serialize");
        assert!(json.contains("\"type\":\"photo\""));
        let parsed: Payload = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.kind(), PayloadKind::Photo);
    }
}
