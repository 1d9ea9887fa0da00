// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Sign-In ID token verification.

use anyhow::Context;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

use crate::error::AppError;
use crate::models::Identity;

const DISCOVERY_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";
const DEFAULT_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// ID token verification failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdTokenError {
    /// Malformed, expired, or issued for someone else.
    #[error("ID token rejected: {0}")]
    Rejected(String),
    /// Google's key endpoints could not be reached.
    #[error("ID token keys unavailable: {0}")]
    Transient(String),
}

impl From<IdTokenError> for AppError {
    fn from(err: IdTokenError) -> Self {
        match err {
            IdTokenError::Rejected(reason) => {
                tracing::warn!(reason = %reason, "Rejected Google ID token");
                AppError::InvalidToken
            }
            IdTokenError::Transient(reason) => {
                AppError::Internal(anyhow::anyhow!("Google key fetch failed: {}", reason))
            }
        }
    }
}

enum KeySource {
    Google,
    Static {
        kid: String,
        decoding_key: Arc<DecodingKey>,
    },
}

struct DiscoveryCacheEntry {
    jwks_uri: String,
    expires_at: Instant,
}

struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifies Google Sign-In ID tokens issued for this app's OAuth client.
pub struct GoogleIdentityVerifier {
    http_client: reqwest::Client,
    client_id: String,
    keys: KeySource,
    discovery_cache: RwLock<Option<DiscoveryCacheEntry>>,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl GoogleIdentityVerifier {
    /// Production verifier that discovers and caches Google's signing keys.
    pub fn new(client_id: impl Into<String>) -> anyhow::Result<Self> {
        let client_id = client_id.into();
        tracing::info!(client_id = %client_id, "Initialized Google ID token verifier");
        Self::build(client_id, KeySource::Google)
    }

    /// Verifier that trusts a single RSA key instead of Google's JWKS.
    ///
    /// Used by integration tests to sign their own ID tokens.
    pub fn new_with_static_key(
        client_id: impl Into<String>,
        kid: impl Into<String>,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static key id must not be empty");
        }

        Self::build(
            client_id.into(),
            KeySource::Static {
                kid,
                decoding_key: Arc::new(decoding_key),
            },
        )
    }

    fn build(client_id: String, keys: KeySource) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building ID token HTTP client")?;

        Ok(Self {
            http_client,
            client_id,
            keys,
            discovery_cache: RwLock::new(None),
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Verify an ID token and map its claims to an [`Identity`].
    pub async fn verify(&self, id_token: &str) -> Result<Identity, IdTokenError> {
        let id_token = id_token.trim();
        if id_token.is_empty() {
            return Err(IdTokenError::Rejected("empty credential".to_string()));
        }

        let header = decode_header(id_token)
            .map_err(|e| IdTokenError::Rejected(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(IdTokenError::Rejected(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| IdTokenError::Rejected("missing JWT kid".to_string()))?;
        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&["https://accounts.google.com", "accounts.google.com"]);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let claims = decode::<IdTokenClaims>(id_token, decoding_key.as_ref(), &validation)
            .map_err(|e| IdTokenError::Rejected(format!("JWT validation failed: {e}")))?
            .claims;

        check_iat(claims.iat)?;

        // An unverified address is dropped rather than trusted.
        let email = match claims.email_verified {
            Some(false) => None,
            _ => claims.email,
        };

        tracing::info!(uid = %claims.sub, "Verified Google ID token");

        Ok(Identity {
            uid: claims.sub,
            display_name: claims.name,
            email,
            photo_url: claims.picture,
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, IdTokenError> {
        if let KeySource::Static {
            kid: static_kid,
            decoding_key,
        } = &self.keys
        {
            return if kid == static_kid {
                Ok(decoding_key.clone())
            } else {
                Err(IdTokenError::Rejected(format!("unknown JWT kid: {kid}")))
            };
        }

        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }

        // Google rotates keys; retry once with a forced refresh.
        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(IdTokenError::Rejected(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), IdTokenError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh
            && self
                .jwks_cache
                .read()
                .await
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
        {
            return Ok(());
        }

        let jwks_uri = self.resolve_jwks_uri(force_refresh).await?;
        tracing::debug!(jwks_uri = %jwks_uri, "Refreshing Google JWKS cache");

        let response = self
            .http_client
            .get(&jwks_uri)
            .send()
            .await
            .map_err(|e| IdTokenError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(IdTokenError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);
        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| IdTokenError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let keys_by_kid = usable_keys(jwks);
        if keys_by_kid.is_empty() {
            return Err(IdTokenError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Google JWKS cache refreshed");
        Ok(())
    }

    async fn resolve_jwks_uri(&self, force_refresh: bool) -> Result<String, IdTokenError> {
        let cached = {
            let cache = self.discovery_cache.read().await;
            cache.as_ref().map(|e| (e.jwks_uri.clone(), e.expires_at))
        };

        if let Some((uri, expires_at)) = &cached {
            if !force_refresh && *expires_at > Instant::now() {
                return Ok(uri.clone());
            }
        }
        let fallback = cached
            .map(|(uri, _)| uri)
            .unwrap_or_else(|| DEFAULT_JWKS_URL.to_string());

        match self.http_client.get(DISCOVERY_URL).send().await {
            Ok(resp) if resp.status().is_success() => {
                let ttl = cache_ttl_from_headers(resp.headers(), DEFAULT_CACHE_TTL);
                let discovery: OpenIdConfig = resp
                    .json()
                    .await
                    .map_err(|e| IdTokenError::Transient(format!("invalid discovery JSON: {e}")))?;

                *self.discovery_cache.write().await = Some(DiscoveryCacheEntry {
                    jwks_uri: discovery.jwks_uri.clone(),
                    expires_at: Instant::now() + ttl,
                });

                Ok(discovery.jwks_uri)
            }
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "OIDC discovery failed; using fallback JWKS URI");
                Ok(fallback)
            }
            Err(e) => {
                tracing::warn!(error = %e, "OIDC discovery request failed; using fallback JWKS URI");
                Ok(fallback)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenIdConfig {
    jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

/// Claims of a Google Sign-In ID token.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    iat: Option<usize>,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

/// RS256 signing keys from a JWKS document, by key id.
fn usable_keys(jwks: Jwks) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys_by_kid = HashMap::new();

    for jwk in jwks.keys {
        let is_rs256 = jwk.alg.as_deref().map_or(true, |alg| alg == "RS256");
        let is_sig = jwk.use_.as_deref().map_or(true, |u| u == "sig");
        if jwk.kty != "RSA" || jwk.kid.trim().is_empty() || !is_rs256 || !is_sig {
            continue;
        }

        match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => {
                keys_by_kid.insert(jwk.kid, Arc::new(key));
            }
            Err(e) => {
                tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
            }
        }
    }

    keys_by_kid
}

fn check_iat(iat: Option<usize>) -> Result<(), IdTokenError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    match iat {
        None => Err(IdTokenError::Rejected("missing iat claim".to_string())),
        Some(iat) if iat as u64 > now + CLOCK_SKEW_SECS => Err(IdTokenError::Rejected(
            "iat claim is in the future".to_string(),
        )),
        Some(_) => Ok(()),
    }
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|raw| raw.trim_matches('"').parse::<u64>().ok())
}
