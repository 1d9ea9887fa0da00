// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard: routines, tips and the day's journal entry.
//!
//! Activation loads, in order:
//! 1. the routine set (generated and cached on first use)
//! 2. the journal entry for the given date (or a blank draft)
//! 3. fresh tips (never cached)

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use crate::db::Store;
use crate::error::AppError;
use crate::models::journal::{MAX_MOOD, MIN_MOOD};
use crate::models::{HealthTip, JournalEntry, RoutineItem, UserProfile};
use crate::services::gemini::ContentGenerator;

/// Return the cached routine set, generating and caching one on a miss.
///
/// An absent or empty set is a miss. An empty generation result is not
/// cached so the next activation tries again.
pub async fn load_or_generate_routines(
    store: &Store,
    generator: &dyn ContentGenerator,
    profile: &UserProfile,
) -> Result<Vec<RoutineItem>, AppError> {
    if let Some(items) = store
        .get_routines(&profile.uid)
        .await?
        .filter(|items| !items.is_empty())
    {
        tracing::debug!(uid = %profile.uid, count = items.len(), "Routine cache hit");
        return Ok(items);
    }

    let items = generator.generate_routines(profile).await?;

    if items.is_empty() {
        tracing::warn!(uid = %profile.uid, "No routines generated; not caching");
    } else {
        store.save_routines(&profile.uid, &items).await?;
        tracing::info!(uid = %profile.uid, count = items.len(), "Cached generated routines");
    }

    Ok(items)
}

/// Stored entry for `date`, or a blank draft.
pub async fn load_journal_entry(
    store: &Store,
    uid: &str,
    date: NaiveDate,
) -> Result<JournalEntry, AppError> {
    Ok(store
        .get_journal_entry(uid, date)
        .await?
        .unwrap_or_else(|| JournalEntry::blank(date)))
}

/// Toggle one routine's completion for `date` and persist the whole entry.
pub async fn toggle_routine_completion(
    store: &Store,
    uid: &str,
    date: NaiveDate,
    routine_id: &str,
) -> Result<JournalEntry, AppError> {
    let mut entry = load_journal_entry(store, uid, date).await?;
    let completed = entry.toggle_routine(routine_id);
    store.save_journal_entry(uid, &entry).await?;

    tracing::debug!(uid, date = %date, routine_id, completed, "Toggled routine");
    Ok(entry)
}

/// Share of current routines completed in `entry`, from 0.0 to 1.0.
pub fn progress(routines: &[RoutineItem], entry: &JournalEntry) -> f64 {
    if routines.is_empty() {
        return 0.0;
    }
    let done = routines.iter().filter(|r| entry.is_completed(&r.id)).count();
    done as f64 / routines.len() as f64
}

/// Snapshot of dashboard state for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub routines: Vec<RoutineItem>,
    pub tips: Vec<HealthTip>,
    pub entry: JournalEntry,
    pub progress: f64,
}

/// Dashboard state for one signed-in user.
pub struct Dashboard {
    store: Store,
    generator: Arc<dyn ContentGenerator>,
    profile: UserProfile,
    routines: Vec<RoutineItem>,
    tips: Vec<HealthTip>,
    entry: JournalEntry,
    loading: bool,
}

impl Dashboard {
    pub fn new(
        store: Store,
        generator: Arc<dyn ContentGenerator>,
        profile: UserProfile,
        today: NaiveDate,
    ) -> Self {
        Self {
            store,
            generator,
            profile,
            routines: Vec::new(),
            tips: Vec::new(),
            entry: JournalEntry::blank(today),
            loading: false,
        }
    }

    /// Load routines, the entry for `today` and tips, in that order.
    ///
    /// Each piece is kept as soon as it loads. On failure the error is logged
    /// and returned; pieces not yet reached keep their previous values.
    pub async fn activate(&mut self, today: NaiveDate) -> Result<(), AppError> {
        self.loading = true;
        let result = self.load(today).await;
        self.loading = false;

        if let Err(e) = &result {
            tracing::error!(uid = %self.profile.uid, error = %e, "Dashboard load failed");
        }
        result
    }

    async fn load(&mut self, today: NaiveDate) -> Result<(), AppError> {
        self.routines =
            load_or_generate_routines(&self.store, self.generator.as_ref(), &self.profile).await?;
        self.entry = load_journal_entry(&self.store, &self.profile.uid, today).await?;
        self.tips = self.generator.generate_daily_tips(&self.profile).await?;
        Ok(())
    }

    /// Flip completion of a routine and persist the entry immediately.
    ///
    /// The change is undone if the write fails.
    pub async fn toggle_routine(&mut self, routine_id: &str) -> Result<bool, AppError> {
        let completed = self.entry.toggle_routine(routine_id);

        if let Err(e) = self.store.save_journal_entry(&self.profile.uid, &self.entry).await {
            self.entry.toggle_routine(routine_id);
            return Err(e);
        }
        Ok(completed)
    }

    pub fn adjust_water(&mut self, delta: i32) {
        self.entry.adjust_water(delta);
    }

    pub fn set_mood(&mut self, mood: u8) -> Result<(), AppError> {
        if !(MIN_MOOD..=MAX_MOOD).contains(&mood) {
            return Err(AppError::BadRequest(format!(
                "Mood must be between {} and {}",
                MIN_MOOD, MAX_MOOD
            )));
        }
        self.entry.mood = mood;
        Ok(())
    }

    pub fn set_sleep_hours(&mut self, hours: f64) {
        self.entry.sleep_hours = hours;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.entry.notes = notes.into();
    }

    /// Persist the current entry as-is.
    pub async fn save_entry(&self) -> Result<(), AppError> {
        self.store
            .save_journal_entry(&self.profile.uid, &self.entry)
            .await?;
        tracing::info!(uid = %self.profile.uid, date = %self.entry.date, "Journal entry saved");
        Ok(())
    }

    pub fn progress(&self) -> f64 {
        progress(&self.routines, &self.entry)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn routines(&self) -> &[RoutineItem] {
        &self.routines
    }

    pub fn tips(&self) -> &[HealthTip] {
        &self.tips
    }

    pub fn entry(&self) -> &JournalEntry {
        &self.entry
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            routines: self.routines.clone(),
            tips: self.tips.clone(),
            entry: self.entry.clone(),
            progress: self.progress(),
        }
    }
}
