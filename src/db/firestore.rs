// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (`users/{uid}`, merged on write)
//! - Routine sets (`routines/{uid}`, replaced on write)
//! - Journal entries (`users/{uid}/journal/{date}`, replaced on write)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{JournalEntry, RoutineSet, UserProfile};
use chrono::NaiveDate;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile by user id.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Merge a profile into `users/{uid}`.
    ///
    /// Only the fields present in `profile` are written (update mask), so
    /// answers stored earlier and missing from this update are kept.
    pub async fn merge_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let fields = present_fields(profile)?;

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Routine Operations ──────────────────────────────────────

    pub async fn get_routine_set(&self, uid: &str) -> Result<Option<RoutineSet>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ROUTINES)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the routine set document.
    pub async fn set_routine_set(&self, uid: &str, set: &RoutineSet) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ROUTINES)
            .document_id(uid)
            .object(set)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Journal Operations ──────────────────────────────────────

    /// Get the journal entry for one calendar date.
    pub async fn get_journal_entry(
        &self,
        uid: &str,
        date: NaiveDate,
    ) -> Result<Option<JournalEntry>, AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::USERS, uid)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .by_id_in(collections::JOURNAL)
            .parent(&parent_path)
            .obj()
            .one(&journal_doc_id(date))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the journal entry document for `entry.date`.
    pub async fn set_journal_entry(&self, uid: &str, entry: &JournalEntry) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::USERS, uid)
            .map_err(|e| AppError::Database(e.to_string()))?;

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::JOURNAL)
            .document_id(journal_doc_id(entry.date))
            .parent(&parent_path)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

fn journal_doc_id(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Top-level field names present in the serialized profile.
fn present_fields(profile: &UserProfile) -> Result<Vec<String>, AppError> {
    match serde_json::to_value(profile) {
        Ok(serde_json::Value::Object(map)) => Ok(map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, _)| k)
            .collect()),
        Ok(_) => Err(AppError::Internal(anyhow::anyhow!(
            "Profile did not serialize to an object"
        ))),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "Profile serialization failed: {}",
            e
        ))),
    }
}
