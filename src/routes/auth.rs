// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, logout and session routing.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, identity_from_request, SESSION_COOKIE};
use crate::models::{Identity, UserProfile};
use crate::services::{resolve_view, ViewKind};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/session", get(session))
}

#[derive(Debug, Default, Deserialize)]
struct LoginRequest {
    /// Google Sign-In ID token; unused in demo mode
    #[serde(default)]
    credential: Option<String>,
}

/// Where the caller should go, and who they are.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub view: ViewKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    /// Session token, for clients that use the Authorization header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.frontend_url.starts_with("https://"))
        .build()
}

/// Route an identity and issue a session for it.
async fn start_session(
    state: &AppState,
    jar: CookieJar,
    identity: Identity,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let token = create_jwt(&identity, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
    let route = resolve_view(&state.store, Some(&identity)).await?;

    let jar = jar.add(session_cookie(state, token.clone()));
    Ok((
        jar,
        Json(SessionResponse {
            view: route.view,
            identity: Some(identity),
            profile: route.profile,
            token: Some(token),
        }),
    ))
}

/// Sign in and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let request: LoginRequest = if body.is_empty() {
        LoginRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid login body: {}", e)))?
    };

    let identity = state.auth.login(request.credential.as_deref()).await?;
    start_session(&state, jar, identity).await
}

/// End the session.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    state.auth.logout().await?;

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((
        jar,
        Json(SessionResponse {
            view: ViewKind::Login,
            identity: None,
            profile: None,
            token: None,
        }),
    ))
}

/// Current routing decision for the caller.
///
/// In demo mode a remembered identity resumes its session without a token.
async fn session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    if let Some(identity) = identity_from_request(&jar, &headers, &state.config.jwt_signing_key) {
        let route = resolve_view(&state.store, Some(&identity)).await?;
        return Ok((
            jar,
            Json(SessionResponse {
                view: route.view,
                identity: Some(identity),
                profile: route.profile,
                token: None,
            }),
        ));
    }

    match state.auth.current().filter(|_| state.auth.is_demo()) {
        Some(identity) => start_session(&state, jar, identity).await,
        None => Ok((
            jar,
            Json(SessionResponse {
                view: ViewKind::Login,
                identity: None,
                profile: None,
                token: None,
            }),
        )),
    }
}
