// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod controller;
pub mod dashboard;
pub mod gemini;
pub mod google_identity;
pub mod onboarding;
pub mod prompts;

pub use auth::{AuthProvider, AuthSubscription, LoginMethod};
pub use controller::{finish_onboarding, resolve_view, Controller, Route, Screen, ViewKind};
pub use dashboard::{load_or_generate_routines, Dashboard, DashboardView};
pub use gemini::{ContentGenerator, GeminiClient};
pub use google_identity::{GoogleIdentityVerifier, IdTokenError};
pub use onboarding::{compute_bmi, OnboardingFlow, OnboardingStep, Step};
