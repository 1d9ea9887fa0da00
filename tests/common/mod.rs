// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wellness_tracker::config::Config;
use wellness_tracker::db::{FirestoreDb, LocalStore, Store};
use wellness_tracker::error::AppError;
use wellness_tracker::middleware::auth::create_jwt;
use wellness_tracker::models::{
    HealthTip, Identity, RoutineCategory, RoutineItem, TimeOfDay, UserProfile,
};
use wellness_tracker::routes::create_router;
use wellness_tracker::services::{AuthProvider, ContentGenerator, LoginMethod};
use wellness_tracker::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Generator returning canned content and counting calls.
#[allow(dead_code)]
pub struct ScriptedGenerator {
    routines: Vec<RoutineItem>,
    tips: Vec<HealthTip>,
    fail_tips: bool,
    routine_calls: AtomicUsize,
    tip_calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedGenerator {
    pub fn new(routines: Vec<RoutineItem>, tips: Vec<HealthTip>) -> Arc<Self> {
        Arc::new(Self {
            routines,
            tips,
            fail_tips: false,
            routine_calls: AtomicUsize::new(0),
            tip_calls: AtomicUsize::new(0),
        })
    }

    /// Generator whose tip requests fail after routines succeed.
    pub fn failing_tips(routines: Vec<RoutineItem>) -> Arc<Self> {
        Arc::new(Self {
            routines,
            tips: Vec::new(),
            fail_tips: true,
            routine_calls: AtomicUsize::new(0),
            tip_calls: AtomicUsize::new(0),
        })
    }

    pub fn routine_calls(&self) -> usize {
        self.routine_calls.load(Ordering::SeqCst)
    }

    pub fn tip_calls(&self) -> usize {
        self.tip_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate_routines(&self, _profile: &UserProfile) -> Result<Vec<RoutineItem>, AppError> {
        self.routine_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.routines.clone())
    }

    async fn generate_daily_tips(&self, _profile: &UserProfile) -> Result<Vec<HealthTip>, AppError> {
        self.tip_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_tips {
            return Err(AppError::Configuration("tips disabled".to_string()));
        }
        Ok(self.tips.clone())
    }
}

#[allow(dead_code)]
pub fn routine(id: &str, category: RoutineCategory) -> RoutineItem {
    RoutineItem {
        id: id.to_string(),
        title: format!("Routine {}", id),
        description: "Do the thing".to_string(),
        category,
        time_of_day: TimeOfDay::Morning,
        duration_minutes: 15,
    }
}

#[allow(dead_code)]
pub fn sample_routines() -> Vec<RoutineItem> {
    vec![
        routine("walk", RoutineCategory::Exercise),
        routine("water", RoutineCategory::Diet),
        routine("wind-down", RoutineCategory::Sleep),
        routine("breathe", RoutineCategory::Mental),
    ]
}

#[allow(dead_code)]
pub fn sample_tips() -> Vec<HealthTip> {
    vec![HealthTip {
        id: "tip-1".to_string(),
        title: "Move more".to_string(),
        content: "Aim for 150 minutes a week.".to_string(),
        source_name: "WHO".to_string(),
        source_url: "https://www.who.int/news-room/fact-sheets/detail/physical-activity"
            .to_string(),
        category: "Exercise".to_string(),
    }]
}

#[allow(dead_code)]
pub fn test_store() -> Store {
    Store::Local(LocalStore::in_memory())
}

/// Build an app around the given generator, in-memory store and demo login.
#[allow(dead_code)]
pub async fn create_test_app_with(
    generator: Arc<dyn ContentGenerator>,
) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_method(generator, LoginMethod::Demo).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_method(
    generator: Arc<dyn ContentGenerator>,
    method: LoginMethod,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let store = test_store();
    let auth = AuthProvider::new(method, store.clone())
        .await
        .expect("Auth provider should start");

    let state = Arc::new(AppState {
        config,
        store,
        auth,
        generator,
    });

    (create_router(state.clone()), state)
}

/// Create a test app with a scripted generator.
/// Returns the router, the shared state and the generator.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<ScriptedGenerator>) {
    let generator = ScriptedGenerator::new(sample_routines(), sample_tips());
    let (app, state) = create_test_app_with(generator.clone()).await;
    (app, state, generator)
}

/// Session token for an identity, signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(identity: &Identity) -> String {
    create_jwt(identity, &Config::test_default().jwt_signing_key).expect("JWT should encode")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Body should read");
    serde_json::from_slice(&bytes).expect("Body should be JSON")
}
