// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Generated daily routine items.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Area of health a routine item addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum RoutineCategory {
    Exercise,
    Diet,
    Sleep,
    Mental,
    Work,
}

impl RoutineCategory {
    pub const ALL: [&'static str; 5] = ["exercise", "diet", "sleep", "mental", "work"];
}

impl FromStr for RoutineCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exercise" => Ok(Self::Exercise),
            "diet" => Ok(Self::Diet),
            "sleep" => Ok(Self::Sleep),
            "mental" => Ok(Self::Mental),
            "work" => Ok(Self::Work),
            other => Err(format!("unknown routine category: {other}")),
        }
    }
}

/// When during the day a routine item is meant to happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Anytime,
}

impl TimeOfDay {
    pub const ALL: [&'static str; 4] = ["morning", "afternoon", "evening", "anytime"];
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            "anytime" => Ok(Self::Anytime),
            other => Err(format!("unknown time of day: {other}")),
        }
    }
}

/// One schedulable self-care task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RoutineItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: RoutineCategory,
    pub time_of_day: TimeOfDay,
    pub duration_minutes: u32,
}

/// Cached routine set for a user.
///
/// Stored at: `routines/{uid}` (remote) or `routines_{uid}` (local).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineSet {
    #[serde(default)]
    pub items: Vec<RoutineItem>,
}
