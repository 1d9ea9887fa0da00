// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Controller routing driven by the auth feed.

use chrono::NaiveDate;
use wellness_tracker::db::{FirestoreDb, Store};
use wellness_tracker::models::Identity;
use wellness_tracker::services::{AuthProvider, Controller, LoginMethod, Screen, ViewKind};

mod common;
use common::{sample_routines, sample_tips, test_store, ScriptedGenerator};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[tokio::test]
async fn test_login_onboarding_dashboard_cycle() {
    let store = test_store();
    let generator = ScriptedGenerator::new(sample_routines(), sample_tips());
    let auth = AuthProvider::new(LoginMethod::Demo, store.clone())
        .await
        .unwrap();
    let mut controller = Controller::new(store.clone(), generator.clone(), auth.subscribe());

    assert_eq!(controller.view(), ViewKind::Loading);
    assert_eq!(controller.poll(today()).await, Some(ViewKind::Login));

    auth.login(None).await.unwrap();
    assert_eq!(controller.poll(today()).await, Some(ViewKind::Onboarding));
    assert_eq!(controller.identity(), Some(&Identity::demo()));

    if let Screen::Onboarding(flow) = controller.screen_mut() {
        flow.draft_mut().details.height = Some(170.0);
        flow.draft_mut().details.weight = Some(70.0);
    }

    assert_eq!(
        controller.advance_onboarding(today()).await.unwrap(),
        ViewKind::Onboarding
    );
    assert_eq!(
        controller.advance_onboarding(today()).await.unwrap(),
        ViewKind::Onboarding
    );
    assert_eq!(
        controller.advance_onboarding(today()).await.unwrap(),
        ViewKind::Dashboard
    );

    let Screen::Dashboard(dashboard) = controller.screen() else {
        panic!("expected dashboard");
    };
    assert_eq!(dashboard.profile().details.bmi, Some(24.2));
    assert_eq!(dashboard.routines().len(), 4);
    assert_eq!(dashboard.tips().len(), 1);
    assert_eq!(generator.routine_calls(), 1);

    let saved = store.get_profile("mock-123").await.unwrap().unwrap();
    assert!(saved.is_profile_complete);

    auth.logout().await.unwrap();
    assert_eq!(controller.poll(today()).await, Some(ViewKind::Login));
    assert_eq!(controller.identity(), None);

    controller.shutdown();
}

#[tokio::test]
async fn test_existing_profile_goes_straight_to_dashboard() {
    let store = test_store();
    let generator = ScriptedGenerator::new(sample_routines(), sample_tips());
    let identity = Identity::demo();

    // Incomplete profile still counts as present
    store
        .save_profile(&wellness_tracker::models::UserProfile::empty(&identity))
        .await
        .unwrap();
    store.set_identity_marker(Some(&identity)).await.unwrap();

    let auth = AuthProvider::new(LoginMethod::Demo, store.clone())
        .await
        .unwrap();
    let mut controller = Controller::new(store, generator, auth.subscribe());

    assert_eq!(controller.poll(today()).await, Some(ViewKind::Dashboard));
}

#[tokio::test]
async fn test_edit_profile_keeps_answers_and_refreshes_routines() {
    let store = test_store();
    let generator = ScriptedGenerator::new(sample_routines(), sample_tips());
    let auth = AuthProvider::new(LoginMethod::Demo, store.clone())
        .await
        .unwrap();
    auth.login(None).await.unwrap();

    let mut controller = Controller::new(store.clone(), generator.clone(), auth.subscribe());
    controller.poll(today()).await;
    if let Screen::Onboarding(flow) = controller.screen_mut() {
        flow.draft_mut().details.smoker = Some(true);
        flow.draft_mut().details.work_schedule = Some("Night shifts".to_string());
    }
    for _ in 0..3 {
        controller.advance_onboarding(today()).await.unwrap();
    }
    assert_eq!(generator.routine_calls(), 1);

    controller.edit_profile().unwrap();
    let Screen::Onboarding(flow) = controller.screen() else {
        panic!("expected onboarding");
    };
    assert_eq!(flow.step().number(), 1);
    assert_eq!(flow.draft().details.smoker, Some(true));
    assert_eq!(
        flow.draft().details.work_schedule.as_deref(),
        Some("Night shifts")
    );

    for _ in 0..3 {
        controller.advance_onboarding(today()).await.unwrap();
    }
    assert_eq!(controller.view(), ViewKind::Dashboard);
    assert_eq!(generator.routine_calls(), 2);

    // Edit is only offered from the dashboard
    controller.edit_profile().unwrap();
    assert!(controller.edit_profile().is_err());
}

#[tokio::test]
async fn test_poll_ends_when_provider_dropped() {
    let store = test_store();
    let generator = ScriptedGenerator::new(vec![], vec![]);
    let auth = AuthProvider::new(LoginMethod::Demo, store.clone())
        .await
        .unwrap();
    let mut controller = Controller::new(store, generator, auth.subscribe());

    controller.poll(today()).await;
    drop(auth);

    assert_eq!(controller.poll(today()).await, None);
}

#[tokio::test]
async fn test_profile_load_failure_keeps_current_view() {
    // Offline Firestore: identity marker reads as absent, profile reads fail
    let store = Store::Firestore(FirestoreDb::new_mock());
    let generator = ScriptedGenerator::new(sample_routines(), sample_tips());
    let auth = AuthProvider::new(LoginMethod::Demo, store.clone())
        .await
        .unwrap();
    let mut controller = Controller::new(store, generator.clone(), auth.subscribe());

    assert_eq!(controller.poll(today()).await, Some(ViewKind::Login));

    auth.login(None).await.unwrap();
    assert_eq!(controller.poll(today()).await, Some(ViewKind::Login));
    assert!(matches!(controller.screen(), Screen::Login));
    assert_eq!(generator.routine_calls(), 0);
}

#[tokio::test]
async fn test_dashboard_opens_after_partial_load() {
    let store = test_store();
    let generator = ScriptedGenerator::failing_tips(sample_routines());
    let identity = Identity::demo();
    store
        .save_profile(&wellness_tracker::models::UserProfile::empty(&identity))
        .await
        .unwrap();
    store.set_identity_marker(Some(&identity)).await.unwrap();

    let auth = AuthProvider::new(LoginMethod::Demo, store.clone())
        .await
        .unwrap();
    let mut controller = Controller::new(store, generator, auth.subscribe());

    assert_eq!(controller.poll(today()).await, Some(ViewKind::Dashboard));
    let Screen::Dashboard(dashboard) = controller.screen() else {
        panic!("expected dashboard");
    };
    assert_eq!(dashboard.routines().len(), 4);
    assert!(dashboard.tips().is_empty());
    assert!(!dashboard.is_loading());
}
