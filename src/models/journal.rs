// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Daily journal entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

pub const MIN_MOOD: u8 = 1;
pub const MAX_MOOD: u8 = 5;
pub const MAX_SLEEP_HOURS: f64 = 12.0;

const DEFAULT_MOOD: u8 = 3;
const DEFAULT_SLEEP_HOURS: f64 = 7.0;

/// The single daily record for one user on one calendar date.
///
/// Stored at: `users/{uid}/journal/{date}` (remote) or
/// `journal_{uid}_{date}` (local). The date is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Calendar day ("YYYY-MM-DD")
    pub date: NaiveDate,
    /// Completed routine item ids (membership only)
    #[serde(default)]
    pub completed_routine_ids: BTreeSet<String>,
    #[validate(range(min = 1, max = 5))]
    pub mood: u8,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub notes: String,
    #[serde(default)]
    pub water_intake_cups: u32,
    #[validate(custom(function = "validate_sleep_hours"))]
    pub sleep_hours: f64,
}

/// Sleep is recorded in half-hour steps between 0 and 12 hours.
fn validate_sleep_hours(hours: f64) -> Result<(), ValidationError> {
    if !(0.0..=MAX_SLEEP_HOURS).contains(&hours) {
        return Err(ValidationError::new("sleep_hours_range"));
    }
    if (hours * 2.0).fract() != 0.0 {
        return Err(ValidationError::new("sleep_hours_half_hour"));
    }
    Ok(())
}

impl JournalEntry {
    /// Zeroed draft for a day with no entry yet.
    pub fn blank(date: NaiveDate) -> Self {
        Self {
            date,
            completed_routine_ids: BTreeSet::new(),
            mood: DEFAULT_MOOD,
            notes: String::new(),
            water_intake_cups: 0,
            sleep_hours: DEFAULT_SLEEP_HOURS,
        }
    }

    /// Flip completion of a routine item.
    ///
    /// Returns `true` if the item is now marked completed.
    pub fn toggle_routine(&mut self, routine_id: &str) -> bool {
        if self.completed_routine_ids.remove(routine_id) {
            false
        } else {
            self.completed_routine_ids.insert(routine_id.to_string());
            true
        }
    }

    /// Add or remove cups of water. Never goes below zero.
    pub fn adjust_water(&mut self, delta: i32) {
        let next = i64::from(self.water_intake_cups) + i64::from(delta);
        self.water_intake_cups = next.clamp(0, i64::from(u32::MAX)) as u32;
    }

    pub fn is_completed(&self, routine_id: &str) -> bool {
        self.completed_routine_ids.contains(routine_id)
    }
}
