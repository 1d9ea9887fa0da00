// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated identity.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Identity of an authenticated user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable user id; every persisted entity is keyed by it
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    /// Avatar URL
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl Identity {
    /// Fixed identity used by the demo login in local mode.
    pub fn demo() -> Self {
        Self {
            uid: "mock-123".to_string(),
            display_name: Some("Demo User".to_string()),
            email: Some("demo@example.com".to_string()),
            photo_url: Some("https://picsum.photos/200".to_string()),
        }
    }
}
