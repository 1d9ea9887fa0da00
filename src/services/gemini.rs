// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini API client for routine and tip generation.
//!
//! Handles:
//! - Prompt + response schema requests to `generateContent`
//! - Search grounding for tips
//! - Per-record validation of the model output
//! - Degrading to an empty routine list / fallback tip on failure

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::AppError;
use crate::models::{HealthTip, RoutineItem, UserProfile};
use crate::services::prompts;
use crate::time_utils::local_today;

const ROUTINE_TEMPERATURE: f32 = 0.7;
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_DURATION_MINUTES: f64 = 240.0;

/// Source of generated routines and tips.
///
/// Both operations fail only when generation is not configured. Any other
/// failure is absorbed: routines degrade to an empty list, tips to
/// [`HealthTip::fallback`].
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_routines(&self, profile: &UserProfile) -> Result<Vec<RoutineItem>, AppError>;

    async fn generate_daily_tips(&self, profile: &UserProfile) -> Result<Vec<HealthTip>, AppError>;
}

/// Gemini REST client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: Option<GeminiConfig>,
}

impl GeminiClient {
    /// `None` leaves the client unconfigured: every call fails with
    /// [`AppError::Configuration`].
    pub fn new(config: Option<GeminiConfig>) -> anyhow::Result<Self> {
        Self::with_timeout(config, DEFAULT_HTTP_TIMEOUT)
    }

    /// Like [`GeminiClient::new`], with a per-request timeout. A timed-out
    /// request degrades like any other transport failure.
    pub fn with_timeout(config: Option<GeminiConfig>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building Gemini HTTP client")?;

        Ok(Self { http, config })
    }

    fn require_config(&self) -> Result<&GeminiConfig, AppError> {
        self.config
            .as_ref()
            .ok_or_else(|| AppError::Configuration("GEMINI_API_KEY is not set".to_string()))
    }

    /// Send one request and return the records of the JSON array it produced.
    async fn generate(
        &self,
        config: &GeminiConfig,
        request: &GenerateContentRequest,
    ) -> Result<Vec<Value>, AppError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            config.api_url.trim_end_matches('/'),
            config.model
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!("HTTP {}: {}", status, body)));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("JSON parse error: {}", e)))?;

        let text = body.text();
        if text.trim().is_empty() {
            return Err(AppError::Generation("Empty response".to_string()));
        }

        serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| AppError::Generation(format!("Response is not a JSON array: {}", e)))
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_routines(&self, profile: &UserProfile) -> Result<Vec<RoutineItem>, AppError> {
        let config = self.require_config()?;

        let request = GenerateContentRequest::new(
            prompts::routine_prompt(profile, local_today()),
            prompts::array_schema(prompts::ROUTINE_FIELDS),
            Some(ROUTINE_TEMPERATURE),
            false,
        );

        match self.generate(config, &request).await {
            Ok(records) => {
                let items = validate_routines(records);
                tracing::info!(uid = %profile.uid, count = items.len(), "Generated routines");
                Ok(items)
            }
            Err(e) => {
                tracing::error!(uid = %profile.uid, error = %e, "Routine generation failed");
                Ok(Vec::new())
            }
        }
    }

    async fn generate_daily_tips(&self, profile: &UserProfile) -> Result<Vec<HealthTip>, AppError> {
        let config = self.require_config()?;

        let request = GenerateContentRequest::new(
            prompts::tips_prompt(profile, local_today()),
            prompts::array_schema(prompts::TIP_FIELDS),
            None,
            true,
        );

        let tips = match self.generate(config, &request).await {
            Ok(records) => validate_tips(records),
            Err(e) => {
                tracing::error!(uid = %profile.uid, error = %e, "Tip generation failed");
                Vec::new()
            }
        };

        if tips.is_empty() {
            return Ok(vec![HealthTip::fallback()]);
        }

        tracing::info!(uid = %profile.uid, count = tips.len(), "Generated tips");
        Ok(tips)
    }
}

// ─── Validation ──────────────────────────────────────────────────

/// Routine record as emitted by the model, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoutineItem {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    category: String,
    time_of_day: String,
    duration_minutes: f64,
}

/// Tip record as emitted by the model, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHealthTip {
    id: String,
    title: String,
    content: String,
    source_name: String,
    source_url: String,
    category: String,
}

fn check_routine(raw: RawRoutineItem) -> Result<RoutineItem, String> {
    if raw.id.trim().is_empty() {
        return Err("empty id".to_string());
    }
    if raw.title.trim().is_empty() {
        return Err("empty title".to_string());
    }

    let minutes = raw.duration_minutes;
    if !minutes.is_finite() || minutes.fract() != 0.0 {
        return Err(format!("non-integral duration {}", minutes));
    }
    if !(1.0..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(format!("duration {} out of range", minutes));
    }

    Ok(RoutineItem {
        id: raw.id,
        title: raw.title,
        description: raw.description,
        category: raw.category.parse()?,
        time_of_day: raw.time_of_day.parse()?,
        duration_minutes: minutes as u32,
    })
}

fn check_tip(raw: RawHealthTip) -> Result<HealthTip, String> {
    for (name, value) in [
        ("id", &raw.id),
        ("title", &raw.title),
        ("content", &raw.content),
        ("sourceName", &raw.source_name),
    ] {
        if value.trim().is_empty() {
            return Err(format!("empty {}", name));
        }
    }
    if !(raw.source_url.starts_with("https://") || raw.source_url.starts_with("http://")) {
        return Err(format!("source url {:?} is not http(s)", raw.source_url));
    }

    Ok(HealthTip {
        id: raw.id,
        title: raw.title,
        content: raw.content,
        source_name: raw.source_name,
        source_url: raw.source_url,
        category: raw.category,
    })
}

/// Keep well-formed routine records in order. Duplicate ids after the first
/// are rejected since completion is tracked by id.
fn validate_routines(records: Vec<Value>) -> Vec<RoutineItem> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let checked = serde_json::from_value::<RawRoutineItem>(record)
                .map_err(|e| e.to_string())
                .and_then(check_routine)
                .and_then(|item| {
                    if seen.insert(item.id.clone()) {
                        Ok(item)
                    } else {
                        Err(format!("duplicate id {}", item.id))
                    }
                });
            match checked {
                Ok(item) => Some(item),
                Err(reason) => {
                    tracing::warn!(index, reason = %reason, "Rejected generated routine");
                    None
                }
            }
        })
        .collect()
}

fn validate_tips(records: Vec<Value>) -> Vec<HealthTip> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            match serde_json::from_value::<RawHealthTip>(record)
                .map_err(|e| e.to_string())
                .and_then(check_tip)
            {
                Ok(tip) => Some(tip),
                Err(reason) => {
                    tracing::warn!(index, reason = %reason, "Rejected generated tip");
                    None
                }
            }
        })
        .collect()
}

/// The model occasionally wraps JSON in a markdown fence when search is on.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

// ─── Wire Types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

impl GenerateContentRequest {
    fn new(prompt: String, schema: Value, temperature: Option<f32>, search: bool) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema,
                temperature,
            },
            tools: if search {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}
