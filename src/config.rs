// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Configuration is resolved once at startup. The persistence backend and the
//! generative model credential are decided here and handed to the services
//! that need them; nothing reads the environment afterwards.

use std::env;
use std::path::PathBuf;

const DEFAULT_LOCAL_STORE_PATH: &str = "data/local_store.json";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Where profiles, routines and journal entries live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Mock mode: process-local key/value store, optionally mirrored to a file.
    Local { path: Option<PathBuf> },
    /// Google Cloud Firestore, with Google Sign-In for identity.
    Firestore {
        project_id: String,
        /// OAuth client id that Google ID tokens must be issued for
        google_client_id: String,
    },
}

impl BackendConfig {
    pub fn is_local(&self) -> bool {
        matches!(self, BackendConfig::Local { .. })
    }
}

/// Gemini API settings. Present only when an API key is configured.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_url: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    pub backend: BackendConfig,
    /// `None` disables routine and tip generation
    pub gemini: Option<GeminiConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Presence of `FIREBASE_PROJECT_ID` selects the Firestore backend;
    /// otherwise the local store is used.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend = match non_empty_var("FIREBASE_PROJECT_ID") {
            Some(project_id) => BackendConfig::Firestore {
                project_id,
                google_client_id: non_empty_var("GOOGLE_CLIENT_ID")
                    .ok_or(ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            },
            None => BackendConfig::Local {
                path: Some(PathBuf::from(
                    non_empty_var("LOCAL_STORE_PATH")
                        .unwrap_or_else(|| DEFAULT_LOCAL_STORE_PATH.to_string()),
                )),
            },
        };

        let gemini = non_empty_var("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key: api_key.trim().to_string(),
            model: non_empty_var("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_url: non_empty_var("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
        });

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            backend,
            gemini,
        })
    }

    /// Config for tests: in-memory local store, no Gemini key.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            backend: BackendConfig::Local { path: None },
            gemini: None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
