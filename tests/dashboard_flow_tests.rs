// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Onboarding, dashboard and journal flows over the HTTP API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wellness_tracker::db::{FirestoreDb, LocalStore, Store};
use wellness_tracker::error::AppError;
use wellness_tracker::models::{Identity, JournalEntry, RoutineCategory};
use wellness_tracker::services::{load_or_generate_routines, Dashboard, GeminiClient};

mod common;
use common::{create_test_app, create_test_jwt};

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let token = create_test_jwt(&Identity::demo());
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request(method, uri, body))
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn onboard(app: &Router) -> Value {
    let (status, profile) = call(
        app,
        "POST",
        "/api/onboarding/complete",
        Some(json!({
            "displayName": "Someone Else",
            "birthDate": "1990-04-12",
            "gender": "Female",
            "height": 170.0,
            "weight": 70.0,
            "smoker": false,
            "drinker": true,
            "diet": "Vegetarian",
            "exerciseFrequency": "Lightly Active",
            "sleepTime": "23:00",
            "wakeTime": "07:00",
            "workSchedule": "9-5",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "onboarding failed: {}", profile);
    profile
}

#[tokio::test]
async fn test_onboarding_completion_builds_profile() {
    let (app, _, _) = create_test_app().await;

    let (status, start) = call(&app, "GET", "/api/onboarding", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(start["step"], 1);
    assert_eq!(start["draft"]["diet"], "None/Omnivore");
    assert_eq!(start["draft"]["exerciseFrequency"], "Sedentary");

    let profile = onboard(&app).await;

    assert_eq!(profile["uid"], "mock-123");
    // Identity name wins over the draft's
    assert_eq!(profile["displayName"], "Demo User");
    assert_eq!(profile["email"], "demo@example.com");
    assert_eq!(profile["bmi"], 24.2);
    assert_eq!(profile["isProfileComplete"], true);
    assert_eq!(profile["diet"], "Vegetarian");

    let (status, stored) = call(&app, "GET", "/api/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored, profile);
}

#[tokio::test]
async fn test_onboarding_rejects_invalid_answers() {
    let (app, _, _) = create_test_app().await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/onboarding/complete",
        Some(json!({ "height": 170.0, "sleepTime": "late" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "GET", "/api/profile", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_requires_profile() {
    let (app, _, generator) = create_test_app().await;

    let (status, _) = call(&app, "POST", "/api/dashboard?date=2024-05-01", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(generator.routine_calls(), 0);
}

#[tokio::test]
async fn test_routines_generated_once_then_cached() {
    let (app, state, generator) = create_test_app().await;
    onboard(&app).await;

    let (status, first) = call(&app, "POST", "/api/dashboard?date=2024-05-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generator.routine_calls(), 1);
    assert_eq!(generator.tip_calls(), 1);
    assert_eq!(first["routines"].as_array().unwrap().len(), 4);
    assert_eq!(first["entry"]["date"], "2024-05-01");
    assert_eq!(first["entry"]["mood"], 3);
    assert_eq!(first["entry"]["sleepHours"], 7.0);
    assert_eq!(first["tips"][0]["sourceName"], "WHO");

    let cached = state.store.get_routines("mock-123").await.unwrap().unwrap();
    assert_eq!(cached, common::sample_routines());

    let (status, second) = call(&app, "POST", "/api/dashboard?date=2024-05-02", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["routines"], first["routines"]);
    // Routines come from the cache; tips are fetched every time
    assert_eq!(generator.routine_calls(), 1);
    assert_eq!(generator.tip_calls(), 2);
}

#[tokio::test]
async fn test_empty_generation_is_not_cached() {
    let generator = common::ScriptedGenerator::new(vec![], vec![]);
    let store = common::test_store();
    let mut profile = wellness_tracker::models::UserProfile::empty(&Identity::demo());
    profile.is_profile_complete = true;

    let items = load_or_generate_routines(&store, generator.as_ref(), &profile)
        .await
        .unwrap();
    assert!(items.is_empty());
    assert_eq!(store.get_routines("mock-123").await.unwrap(), None);

    load_or_generate_routines(&store, generator.as_ref(), &profile)
        .await
        .unwrap();
    assert_eq!(generator.routine_calls(), 2);
}

#[tokio::test]
async fn test_profile_edit_regenerates_routines() {
    let (app, state, generator) = create_test_app().await;
    onboard(&app).await;
    call(&app, "POST", "/api/dashboard", None).await;
    assert_eq!(generator.routine_calls(), 1);

    let (_, start) = call(&app, "GET", "/api/onboarding", None).await;
    assert_eq!(start["draft"]["diet"], "Vegetarian");
    assert_eq!(start["draft"]["drinker"], true);

    let mut draft = start["draft"].clone();
    draft["weight"] = json!(65.0);
    let (status, profile) = call(&app, "POST", "/api/onboarding/complete", Some(draft)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["bmi"], 22.5);
    assert_eq!(profile["workSchedule"], "9-5");

    assert_eq!(
        state.store.get_routines("mock-123").await.unwrap(),
        Some(vec![])
    );

    let (_, routines) = call(&app, "GET", "/api/routines", None).await;
    assert_eq!(routines.as_array().unwrap().len(), 4);
    assert_eq!(generator.routine_calls(), 2);
}

#[tokio::test]
async fn test_journal_saves_overwrite_same_day() {
    let (app, _, _) = create_test_app().await;
    let uri = "/api/journal/2024-05-01";

    let (status, blank) = call(&app, "GET", uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(blank["waterIntakeCups"], 0);
    assert_eq!(blank["completedRoutineIds"], json!([]));

    let mut entry = blank.clone();
    entry["mood"] = json!(4);
    entry["waterIntakeCups"] = json!(3);
    entry["notes"] = json!("First save");
    let (status, _) = call(&app, "PUT", uri, Some(entry.clone())).await;
    assert_eq!(status, StatusCode::OK);

    entry["mood"] = json!(2);
    entry["sleepHours"] = json!(6.5);
    entry["notes"] = json!("Second save");
    let (status, _) = call(&app, "PUT", uri, Some(entry.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, stored) = call(&app, "GET", uri, None).await;
    assert_eq!(stored, entry);

    // Other days are untouched
    let (_, other) = call(&app, "GET", "/api/journal/2024-05-02", None).await;
    assert_eq!(other["mood"], 3);
}

#[tokio::test]
async fn test_journal_save_validation() {
    let (app, _, _) = create_test_app().await;
    let uri = "/api/journal/2024-05-01";
    let (_, blank) = call(&app, "GET", uri, None).await;

    let mut entry = blank.clone();
    entry["mood"] = json!(6);
    assert_eq!(call(&app, "PUT", uri, Some(entry)).await.0, StatusCode::BAD_REQUEST);

    let mut entry = blank.clone();
    entry["sleepHours"] = json!(7.25);
    assert_eq!(call(&app, "PUT", uri, Some(entry)).await.0, StatusCode::BAD_REQUEST);

    let mut entry = blank.clone();
    entry["date"] = json!("2024-05-02");
    assert_eq!(call(&app, "PUT", uri, Some(entry)).await.0, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "GET", "/api/journal/yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_persists_and_double_toggle_restores() {
    let (app, state, _) = create_test_app().await;
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let uri = "/api/journal/2024-05-01/routines/walk/toggle";

    let (status, entry) = call(&app, "POST", uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["completedRoutineIds"], json!(["walk"]));

    let stored = state
        .store
        .get_journal_entry("mock-123", date)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_completed("walk"));

    let (_, entry) = call(&app, "POST", uri, None).await;
    assert_eq!(entry["completedRoutineIds"], json!([]));

    let stored = state
        .store
        .get_journal_entry("mock-123", date)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, wellness_tracker::models::JournalEntry::blank(date));
}

#[tokio::test]
async fn test_dashboard_progress_and_edits() {
    let generator = common::ScriptedGenerator::new(common::sample_routines(), vec![]);
    let store = common::test_store();
    let profile = wellness_tracker::models::UserProfile::empty(&Identity::demo());
    let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let mut dashboard = Dashboard::new(store.clone(), generator.clone(), profile, today);
    dashboard.activate(today).await.unwrap();
    assert!(!dashboard.is_loading());
    assert_eq!(dashboard.progress(), 0.0);

    assert!(dashboard.toggle_routine("walk").await.unwrap());
    assert!(dashboard.toggle_routine("breathe").await.unwrap());
    assert_eq!(dashboard.progress(), 0.5);

    dashboard.adjust_water(-1);
    assert_eq!(dashboard.entry().water_intake_cups, 0);
    dashboard.adjust_water(1);
    dashboard.adjust_water(1);

    assert!(dashboard.set_mood(0).is_err());
    assert!(dashboard.set_mood(6).is_err());
    dashboard.set_mood(5).unwrap();
    dashboard.set_sleep_hours(8.5);
    dashboard.set_notes("Felt good");
    dashboard.save_entry().await.unwrap();

    let stored = store
        .get_journal_entry("mock-123", today)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.mood, 5);
    assert_eq!(stored.water_intake_cups, 2);
    assert_eq!(stored.sleep_hours, 8.5);
    assert_eq!(stored.notes, "Felt good");
    assert_eq!(stored.completed_routine_ids.len(), 2);

    // Reopening the same day picks the stored entry back up
    let mut reopened = Dashboard::new(
        store,
        generator.clone(),
        dashboard.profile().clone(),
        today,
    );
    reopened.activate(today).await.unwrap();
    assert_eq!(reopened.entry(), &stored);
    assert_eq!(generator.routine_calls(), 1);
    assert_eq!(
        reopened.routines()[0].category,
        RoutineCategory::Exercise
    );
}

#[tokio::test]
async fn test_activation_failure_keeps_loaded_pieces() {
    let generator = common::ScriptedGenerator::failing_tips(common::sample_routines());
    let store = common::test_store();
    let profile = wellness_tracker::models::UserProfile::empty(&Identity::demo());
    let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

    let mut saved = JournalEntry::blank(today);
    saved.mood = 5;
    saved.toggle_routine("walk");
    store.save_journal_entry("mock-123", &saved).await.unwrap();

    let mut dashboard = Dashboard::new(store, generator.clone(), profile, today);
    let result = dashboard.activate(today).await;

    assert!(matches!(result, Err(AppError::Configuration(_))));
    assert!(!dashboard.is_loading());
    assert_eq!(dashboard.routines().len(), 4);
    assert_eq!(dashboard.entry(), &saved);
    assert!(dashboard.tips().is_empty());
    assert_eq!(dashboard.progress(), 0.25);
    assert_eq!(generator.tip_calls(), 1);
}

#[tokio::test]
async fn test_toggle_reverted_when_write_fails() {
    let generator = common::ScriptedGenerator::new(common::sample_routines(), vec![]);
    let profile = wellness_tracker::models::UserProfile::empty(&Identity::demo());
    let today = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();

    // Offline Firestore client fails every call
    let offline = Store::Firestore(FirestoreDb::new_mock());
    let mut dashboard = Dashboard::new(offline, generator.clone(), profile.clone(), today);
    assert!(dashboard.toggle_routine("walk").await.is_err());
    assert!(dashboard.entry().completed_routine_ids.is_empty());

    // File-backed local store whose directory has become a regular file
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("store");
    let local = Store::Local(LocalStore::open(store_dir.join("local.json")).await.unwrap());
    std::fs::write(&store_dir, "").unwrap();

    let mut dashboard = Dashboard::new(local.clone(), generator, profile, today);
    assert!(matches!(
        dashboard.toggle_routine("walk").await,
        Err(AppError::Database(_))
    ));
    assert!(dashboard.entry().completed_routine_ids.is_empty());
    assert_eq!(local.get_journal_entry("mock-123", today).await.unwrap(), None);
}

#[tokio::test]
async fn test_generation_unavailable_without_key() {
    let (app, _) = common::create_test_app_with(Arc::new(GeminiClient::new(None).unwrap())).await;
    onboard(&app).await;

    let (status, body) = call(&app, "GET", "/api/tips", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "generation_unavailable");

    let (status, _) = call(&app, "POST", "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
