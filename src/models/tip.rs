// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Generated, cited health tips.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One piece of health guidance with source attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct HealthTip {
    pub id: String,
    pub title: String,
    /// Markdown
    pub content: String,
    pub source_name: String,
    pub source_url: String,
    pub category: String,
}

impl HealthTip {
    /// Served when tip generation fails.
    pub fn fallback() -> Self {
        Self {
            id: "fallback-1".to_string(),
            title: "Stay Hydrated".to_string(),
            content: "Drinking water is essential for your health.".to_string(),
            source_name: "Mayo Clinic".to_string(),
            source_url: "https://www.mayoclinic.org".to_string(),
            category: "General".to_string(),
        }
    }
}
