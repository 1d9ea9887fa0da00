// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wellness Tracker API Server
//!
//! Serves the onboarding, dashboard and journal API over Firestore, or over
//! a local store in mock mode when no Firebase project is configured.

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wellness_tracker::{
    config::{BackendConfig, Config},
    db::Store,
    services::{AuthProvider, GeminiClient, GoogleIdentityVerifier, LoginMethod},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        local = config.backend.is_local(),
        "Starting Wellness Tracker API"
    );

    let store = Store::connect(&config.backend)
        .await
        .context("Failed to open store")?;

    let login_method = match &config.backend {
        BackendConfig::Local { .. } => LoginMethod::Demo,
        BackendConfig::Firestore {
            google_client_id, ..
        } => LoginMethod::Google(Arc::new(
            GoogleIdentityVerifier::new(google_client_id.clone())
                .context("Failed to initialize Google ID token verifier")?,
        )),
    };
    let auth = AuthProvider::new(login_method, store.clone())
        .await
        .context("Failed to initialize auth")?;

    if config.gemini.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; routine and tip generation disabled");
    }
    let generator = Arc::new(
        GeminiClient::new(config.gemini.clone()).context("Failed to initialize Gemini client")?,
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        auth,
        generator,
    });

    // Build router
    let app = wellness_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wellness_tracker=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
