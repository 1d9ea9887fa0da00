// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Three-step onboarding questionnaire.
//!
//! Basic Vitals → Lifestyle → Health & Schedule, all editing one draft.
//! Moving forward from the last step completes the draft.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{ProfileDraft, UserProfile};

/// Body-mass index from height (cm) and weight (kg), one decimal place.
///
/// Returns 0 when either input is absent or not positive.
pub fn compute_bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> f64 {
    match (height_cm, weight_kg) {
        (Some(h), Some(w)) if h > 0.0 && w > 0.0 => {
            let meters = h / 100.0;
            (w / (meters * meters) * 10.0).round() / 10.0
        }
        _ => 0.0,
    }
}

/// Finalize a draft: derive BMI and mark it complete.
pub fn complete(mut draft: ProfileDraft) -> ProfileDraft {
    draft.details.bmi = Some(compute_bmi(draft.details.height, draft.details.weight));
    draft.is_profile_complete = true;
    draft
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub enum OnboardingStep {
    BasicVitals,
    Lifestyle,
    HealthAndSchedule,
}

impl OnboardingStep {
    /// 1-based position shown to the user.
    pub fn number(&self) -> u8 {
        match self {
            OnboardingStep::BasicVitals => 1,
            OnboardingStep::Lifestyle => 2,
            OnboardingStep::HealthAndSchedule => 3,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            OnboardingStep::BasicVitals => Some(OnboardingStep::Lifestyle),
            OnboardingStep::Lifestyle => Some(OnboardingStep::HealthAndSchedule),
            OnboardingStep::HealthAndSchedule => None,
        }
    }

    fn prev(self) -> Option<Self> {
        match self {
            OnboardingStep::BasicVitals => None,
            OnboardingStep::Lifestyle => Some(OnboardingStep::BasicVitals),
            OnboardingStep::HealthAndSchedule => Some(OnboardingStep::Lifestyle),
        }
    }
}

/// Result of moving forward.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Advanced(OnboardingStep),
    /// The finished draft, BMI included.
    Completed(ProfileDraft),
}

/// Onboarding state: current step and the draft being edited.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingFlow {
    step: OnboardingStep,
    draft: ProfileDraft,
}

impl OnboardingFlow {
    /// Start at step 1 with a draft seeded from `existing`.
    pub fn new(existing: Option<&UserProfile>) -> Self {
        Self {
            step: OnboardingStep::BasicVitals,
            draft: ProfileDraft::seeded_from(existing),
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ProfileDraft {
        &mut self.draft
    }

    /// Move forward. From the last step this completes the flow; the flow
    /// itself stays on that step.
    pub fn next(&mut self) -> Step {
        match self.step.next() {
            Some(step) => {
                self.step = step;
                Step::Advanced(step)
            }
            None => Step::Completed(complete(self.draft.clone())),
        }
    }

    /// Move back one step. No-op on the first step; the draft is untouched.
    pub fn back(&mut self) -> OnboardingStep {
        if let Some(step) = self.step.prev() {
            self.step = step;
        }
        self.step
    }
}
