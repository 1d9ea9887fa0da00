// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod identity;
pub mod journal;
pub mod profile;
pub mod routine;
pub mod tip;

pub use identity::Identity;
pub use journal::JournalEntry;
pub use profile::{ActivityLevel, DietType, Gender, HealthDetails, ProfileDraft, UserProfile};
pub use routine::{RoutineCategory, RoutineItem, RoutineSet, TimeOfDay};
pub use tip::HealthTip;
