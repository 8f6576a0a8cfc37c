#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the hydrant map server.
//!
//! The REST types are serialized to JSON in `camelCase`. The [`telegram`]
//! module mirrors the subset of the Telegram Bot API the webhook reads and
//! writes, using Telegram's own `snake_case` field names.

use hydrant_map_hydrant_models::{Coordinate, DisplayEntry};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `true` when the server answers.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
    /// Number of hydrants in the loaded catalog.
    pub hydrants: usize,
}

/// Body of `POST /api/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResolveRequest {
    /// Free-text address, as typed into a navigator.
    pub address: String,
}

/// Query parameters of `GET /api/map`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQueryParams {
    /// Free-text address.
    pub address: String,
}

/// A resolved address with its nearest hydrants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResolution {
    /// Where the address was geocoded to.
    pub center: Coordinate,
    /// Canonical address reported by the geocoder.
    pub matched_address: Option<String>,
    /// Ranked hydrants, nearest first.
    pub entries: Vec<DisplayEntry>,
    /// Markdown caption as sent to chat users.
    pub caption: String,
    /// Hydrants listed in `entries` but left off the map.
    pub truncated_markers: usize,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable failure class, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub mod telegram {
    //! Telegram Bot API types used by the webhook.
    //!
    //! See <https://core.telegram.org/bots/api>

    use serde::{Deserialize, Serialize};

    /// An incoming update.
    #[derive(Debug, Clone, Deserialize)]
    pub struct Update {
        /// Update identifier.
        pub update_id: i64,
        /// New incoming message, if this update carries one.
        pub message: Option<Message>,
    }

    /// A chat message.
    #[derive(Debug, Clone, Deserialize)]
    pub struct Message {
        /// Message identifier within the chat.
        pub message_id: i64,
        /// Sender; absent for channel posts.
        pub from: Option<User>,
        /// Chat the message belongs to.
        pub chat: Chat,
        /// UTF-8 text, for text messages.
        pub text: Option<String>,
    }

    /// A Telegram user.
    #[derive(Debug, Clone, Deserialize)]
    pub struct User {
        /// User identifier.
        pub id: i64,
        /// `@username`, if set.
        pub username: Option<String>,
        /// First name.
        #[serde(default)]
        pub first_name: String,
        /// Last name, if set.
        pub last_name: Option<String>,
    }

    /// A chat.
    #[derive(Debug, Clone, Deserialize)]
    pub struct Chat {
        /// Chat identifier.
        pub id: i64,
    }

    /// Body of `sendMessage`.
    #[derive(Debug, Clone, Serialize)]
    pub struct SendMessage<'a> {
        /// Target chat.
        pub chat_id: i64,
        /// Message text.
        pub text: &'a str,
        /// `Markdown`, `MarkdownV2` or `HTML`.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub parse_mode: Option<&'a str>,
    }

    /// Envelope of every Bot API response.
    #[derive(Debug, Clone, Deserialize)]
    pub struct ApiResponse {
        /// Whether the call succeeded.
        pub ok: bool,
        /// Error description when `ok` is false.
        pub description: Option<String>,
    }
}
