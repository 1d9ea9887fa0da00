// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer.
//!
//! [`Store`] is the single entry point. It wraps one of two backends that
//! behave identically to callers:
//! - [`LocalStore`]: mock mode, a key/value map keyed by [`EntityKey::local_key`]
//! - [`FirestoreDb`]: Firestore documents
//!
//! The backend is picked once from [`BackendConfig`] and never changes.

pub mod firestore;
pub mod local;

pub use firestore::FirestoreDb;
pub use local::LocalStore;

use chrono::NaiveDate;

use crate::config::BackendConfig;
use crate::error::AppError;
use crate::models::{Identity, JournalEntry, RoutineItem, RoutineSet, UserProfile};

/// Collection names as constants.
pub mod collections {
    /// User profiles (keyed by uid)
    pub const USERS: &str = "users";
    /// Routine sets (keyed by uid)
    pub const ROUTINES: &str = "routines";
    /// Journal entries: `users/{uid}/journal/{date}`
    pub const JOURNAL: &str = "journal";
}

/// Address of one persisted entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKey<'a> {
    Profile(&'a str),
    Routines(&'a str),
    Journal { uid: &'a str, date: NaiveDate },
    /// Authenticated-identity marker (local mode only)
    Identity,
}

impl EntityKey<'_> {
    /// Key used by the local backend.
    pub fn local_key(&self) -> String {
        match self {
            EntityKey::Profile(uid) => format!("profile_{}", uid),
            EntityKey::Routines(uid) => format!("routines_{}", uid),
            EntityKey::Journal { uid, date } => {
                format!("journal_{}_{}", uid, date.format("%Y-%m-%d"))
            }
            EntityKey::Identity => "mock_user".to_string(),
        }
    }
}

/// Persistence adapter over the configured backend.
#[derive(Clone)]
pub enum Store {
    Firestore(FirestoreDb),
    Local(LocalStore),
}

impl Store {
    /// Open the backend described by the configuration.
    pub async fn connect(backend: &BackendConfig) -> Result<Self, AppError> {
        match backend {
            BackendConfig::Local { path } => {
                let store = match path {
                    Some(path) => LocalStore::open(path).await?,
                    None => LocalStore::in_memory(),
                };
                tracing::warn!("Firebase config missing, using local store (mock mode)");
                Ok(Store::Local(store))
            }
            BackendConfig::Firestore { project_id, .. } => {
                Ok(Store::Firestore(FirestoreDb::new(project_id).await?))
            }
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Store::Local(_))
    }

    // ─── Profiles ────────────────────────────────────────────────

    pub async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        match self {
            Store::Firestore(db) => db.get_profile(uid).await,
            Store::Local(local) => local.get(&EntityKey::Profile(uid)).await,
        }
    }

    /// Merge a profile into storage: fields absent from `profile` are kept.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        match self {
            Store::Firestore(db) => db.merge_profile(profile).await,
            Store::Local(local) => local.merge(&EntityKey::Profile(&profile.uid), profile).await,
        }
    }

    // ─── Routines ────────────────────────────────────────────────

    pub async fn get_routines(&self, uid: &str) -> Result<Option<Vec<RoutineItem>>, AppError> {
        let set: Option<RoutineSet> = match self {
            Store::Firestore(db) => db.get_routine_set(uid).await?,
            Store::Local(local) => local.get(&EntityKey::Routines(uid)).await?,
        };
        Ok(set.map(|s| s.items))
    }

    /// Replace the user's routine set.
    pub async fn save_routines(&self, uid: &str, items: &[RoutineItem]) -> Result<(), AppError> {
        let set = RoutineSet {
            items: items.to_vec(),
        };
        match self {
            Store::Firestore(db) => db.set_routine_set(uid, &set).await,
            Store::Local(local) => local.put(&EntityKey::Routines(uid), &set).await,
        }
    }

    // ─── Journal ─────────────────────────────────────────────────

    pub async fn get_journal_entry(
        &self,
        uid: &str,
        date: NaiveDate,
    ) -> Result<Option<JournalEntry>, AppError> {
        match self {
            Store::Firestore(db) => db.get_journal_entry(uid, date).await,
            Store::Local(local) => local.get(&EntityKey::Journal { uid, date }).await,
        }
    }

    /// Replace the entry for `entry.date`.
    pub async fn save_journal_entry(&self, uid: &str, entry: &JournalEntry) -> Result<(), AppError> {
        match self {
            Store::Firestore(db) => db.set_journal_entry(uid, entry).await,
            Store::Local(local) => {
                let key = EntityKey::Journal {
                    uid,
                    date: entry.date,
                };
                local.put(&key, entry).await
            }
        }
    }

    // ─── Identity Marker ─────────────────────────────────────────

    /// Identity remembered by the demo login. Always absent for Firestore.
    pub async fn get_identity_marker(&self) -> Result<Option<Identity>, AppError> {
        match self {
            Store::Firestore(_) => Ok(None),
            Store::Local(local) => local.get(&EntityKey::Identity).await,
        }
    }

    pub async fn set_identity_marker(&self, identity: Option<&Identity>) -> Result<(), AppError> {
        match (self, identity) {
            (Store::Firestore(_), _) => Ok(()),
            (Store::Local(local), Some(identity)) => local.put(&EntityKey::Identity, identity).await,
            (Store::Local(local), None) => local.remove(&EntityKey::Identity).await,
        }
    }
}
