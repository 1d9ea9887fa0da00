// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wellness Tracker: personal health profile, AI routines and daily journal
//!
//! This crate provides the backend API: sign-in, the onboarding
//! questionnaire, Gemini-generated routines and cited tips, and per-day
//! journal entries stored in Firestore or a local store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{AuthProvider, ContentGenerator};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub auth: AuthProvider,
    pub generator: Arc<dyn ContentGenerator>,
}
