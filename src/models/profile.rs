// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User health profile and the onboarding draft it is built from.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

use crate::models::Identity;

/// Gender as answered during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "Non-Binary")]
    NonBinary,
    #[serde(rename = "Prefer not to say")]
    PreferNotToSay,
}

/// Dietary pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum DietType {
    #[default]
    #[serde(rename = "None/Omnivore")]
    Omnivore,
    Vegetarian,
    Vegan,
    Keto,
    Paleo,
    #[serde(rename = "Gluten Free")]
    GlutenFree,
    Mediterranean,
}

impl DietType {
    pub fn label(&self) -> &'static str {
        match self {
            DietType::Omnivore => "None/Omnivore",
            DietType::Vegetarian => "Vegetarian",
            DietType::Vegan => "Vegan",
            DietType::Keto => "Keto",
            DietType::Paleo => "Paleo",
            DietType::GlutenFree => "Gluten Free",
            DietType::Mediterranean => "Mediterranean",
        }
    }
}

/// How much exercise the user gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    #[serde(rename = "Lightly Active")]
    LightlyActive,
    #[serde(rename = "Moderately Active")]
    ModeratelyActive,
    #[serde(rename = "Very Active")]
    VeryActive,
    #[serde(rename = "Extra Active")]
    ExtraActive,
}

impl ActivityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly Active",
            ActivityLevel::ModeratelyActive => "Moderately Active",
            ActivityLevel::VeryActive => "Very Active",
            ActivityLevel::ExtraActive => "Extra Active",
        }
    }
}

/// Answers collected by the onboarding questionnaire.
///
/// Every field is optional. Absent fields are omitted from the serialized
/// form so that a profile write only touches the fields it carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct HealthDetails {
    // ─── Basic Vitals ────────────────────────────────────────────
    /// Birth date ("YYYY-MM-DD")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Height in centimeters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 300.0))]
    pub height: Option<f64>,
    /// Weight in kilograms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 700.0))]
    pub weight: Option<f64>,
    /// Derived during onboarding only; see `services::onboarding::compute_bmi`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,

    // ─── Lifestyle ───────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoker: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drinker: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<DietType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_frequency: Option<ActivityLevel>,

    // ─── Health & Schedule ───────────────────────────────────────
    /// Usual bedtime ("HH:MM")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_clock_time"))]
    pub sleep_time: Option<String>,
    /// Usual wake time ("HH:MM")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_clock_time"))]
    pub wake_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub health_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub mental_conditions: Option<String>,
    /// Free text, e.g. "9-5" or "Shift work"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub work_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub additional_info: Option<String>,
}

fn validate_clock_time(value: &str) -> Result<(), ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| ValidationError::new("clock_time"))
}

/// User profile stored per user id.
///
/// Stored at: `users/{uid}` (remote) or `profile_{uid}` (local).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(
        default,
        rename = "photoURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_profile_complete: bool,
    #[serde(flatten)]
    pub details: HealthDetails,
}

impl UserProfile {
    /// Empty, incomplete profile for a freshly authenticated identity.
    pub fn empty(identity: &Identity) -> Self {
        Self {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            photo_url: identity.photo_url.clone(),
            is_profile_complete: false,
            details: HealthDetails::default(),
        }
    }
}

/// The mutable record the onboarding steps edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_profile_complete: bool,
    #[serde(flatten)]
    #[validate(nested)]
    pub details: HealthDetails,
}

impl ProfileDraft {
    /// Seed a draft from an existing profile (or nothing).
    ///
    /// Habit questions the user never answered start at their defaults;
    /// answered ones are kept as they are.
    pub fn seeded_from(profile: Option<&UserProfile>) -> Self {
        let mut draft = match profile {
            Some(p) => Self {
                display_name: p.display_name.clone(),
                is_profile_complete: p.is_profile_complete,
                details: p.details.clone(),
            },
            None => Self::default(),
        };

        let details = &mut draft.details;
        details.smoker.get_or_insert(false);
        details.drinker.get_or_insert(false);
        details.diet.get_or_insert(DietType::default());
        details
            .exercise_frequency
            .get_or_insert(ActivityLevel::default());

        draft
    }

    /// Build the full profile, carrying identity fields over from the
    /// authenticated user. The display name falls back to the draft's own.
    pub fn into_profile(self, identity: &Identity) -> UserProfile {
        UserProfile {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone().or(self.display_name),
            photo_url: identity.photo_url.clone(),
            is_profile_complete: self.is_profile_complete,
            details: self.details,
        }
    }
}
