// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{HealthTip, Identity, JournalEntry, ProfileDraft, RoutineItem, UserProfile};
use crate::services::{dashboard, finish_onboarding, onboarding, Dashboard, DashboardView, OnboardingFlow};
use crate::time_utils::{local_today, parse_date};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Longest accepted routine id in a toggle path.
const MAX_ROUTINE_ID_LEN: usize = 128;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/profile", get(get_profile))
        .route("/api/onboarding", get(get_onboarding))
        .route("/api/onboarding/complete", post(complete_onboarding))
        .route("/api/dashboard", post(activate_dashboard))
        .route("/api/routines", get(get_routines))
        .route("/api/tips", get(get_tips))
        .route("/api/journal/{date}", get(get_journal).put(save_journal))
        .route(
            "/api/journal/{date}/routines/{routine_id}/toggle",
            post(toggle_routine),
        )
}

fn path_date(raw: &str) -> Result<NaiveDate> {
    parse_date(raw).ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", raw)))
}

async fn require_profile(state: &AppState, user: &AuthUser) -> Result<UserProfile> {
    state
        .store
        .get_profile(user.uid())
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found; complete onboarding first".to_string()))
}

// ─── Identity & Profile ──────────────────────────────────────

async fn get_me(Extension(user): Extension<AuthUser>) -> Json<Identity> {
    Json(user.identity)
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    Ok(Json(require_profile(&state, &user).await?))
}

// ─── Onboarding ──────────────────────────────────────────────

/// Onboarding start state: step 1 with a draft seeded from any existing
/// profile.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingResponse {
    pub step: u8,
    pub draft: ProfileDraft,
}

async fn get_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<OnboardingResponse>> {
    let existing = state.store.get_profile(user.uid()).await?;
    let flow = OnboardingFlow::new(existing.as_ref());

    Ok(Json(OnboardingResponse {
        step: flow.step().number(),
        draft: flow.draft().clone(),
    }))
}

/// Complete onboarding with the draft the client collected.
async fn complete_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(draft): Json<ProfileDraft>,
) -> Result<Json<UserProfile>> {
    draft.validate()?;

    let profile = finish_onboarding(&state.store, &user.identity, onboarding::complete(draft)).await?;
    Ok(Json(profile))
}

// ─── Dashboard ───────────────────────────────────────────────

#[derive(Deserialize)]
struct DateQuery {
    #[serde(default)]
    date: Option<String>,
}

impl DateQuery {
    fn resolve(&self) -> Result<NaiveDate> {
        self.date
            .as_deref()
            .map(path_date)
            .unwrap_or_else(|| Ok(local_today()))
    }
}

/// Activate the dashboard for a day: routines, journal entry, tips.
async fn activate_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DashboardView>> {
    let date = query.resolve()?;
    let profile = require_profile(&state, &user).await?;

    let mut dashboard = Dashboard::new(state.store.clone(), state.generator.clone(), profile, date);
    dashboard.activate(date).await?;

    Ok(Json(dashboard.view()))
}

async fn get_routines(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<RoutineItem>>> {
    let profile = require_profile(&state, &user).await?;
    let items =
        dashboard::load_or_generate_routines(&state.store, state.generator.as_ref(), &profile)
            .await?;
    Ok(Json(items))
}

async fn get_tips(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<HealthTip>>> {
    let profile = require_profile(&state, &user).await?;
    Ok(Json(state.generator.generate_daily_tips(&profile).await?))
}

// ─── Journal ─────────────────────────────────────────────────

/// Stored entry for the date, or a blank draft.
async fn get_journal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<Json<JournalEntry>> {
    let date = path_date(&date)?;
    let entry = dashboard::load_journal_entry(&state.store, user.uid(), date).await?;
    Ok(Json(entry))
}

/// Replace the entry for the date.
async fn save_journal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
    Json(entry): Json<JournalEntry>,
) -> Result<Json<JournalEntry>> {
    let date = path_date(&date)?;
    if entry.date != date {
        return Err(AppError::BadRequest(format!(
            "Entry date {} does not match {}",
            entry.date, date
        )));
    }
    entry.validate()?;

    state.store.save_journal_entry(user.uid(), &entry).await?;
    tracing::info!(uid = %user.uid(), date = %date, "Journal entry saved");

    Ok(Json(entry))
}

async fn toggle_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((date, routine_id)): Path<(String, String)>,
) -> Result<Json<JournalEntry>> {
    let date = path_date(&date)?;
    if routine_id.trim().is_empty() || routine_id.len() > MAX_ROUTINE_ID_LEN {
        return Err(AppError::BadRequest("Invalid routine id".to_string()));
    }

    let entry =
        dashboard::toggle_routine_completion(&state.store, user.uid(), date, &routine_id).await?;
    Ok(Json(entry))
}
