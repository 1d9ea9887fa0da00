// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication provider.
//!
//! Holds the currently signed-in identity and publishes every change on a
//! `watch` channel. Subscribers get the current value first, then each
//! login or logout.

use std::sync::Arc;
use tokio::sync::watch;

use crate::db::Store;
use crate::error::AppError;
use crate::models::Identity;
use crate::services::google_identity::GoogleIdentityVerifier;

/// How `login` establishes an identity.
#[derive(Clone)]
pub enum LoginMethod {
    /// Mock mode: a fixed demo identity, remembered in the local store.
    Demo,
    /// Google Sign-In: the caller presents an ID token.
    Google(Arc<GoogleIdentityVerifier>),
}

struct Inner {
    method: LoginMethod,
    store: Store,
    current: watch::Sender<Option<Identity>>,
}

/// Source of the authenticated identity.
#[derive(Clone)]
pub struct AuthProvider {
    inner: Arc<Inner>,
}

impl AuthProvider {
    /// Create a provider. In demo mode the identity remembered from a previous
    /// run (if any) is restored.
    pub async fn new(method: LoginMethod, store: Store) -> Result<Self, AppError> {
        let initial = match method {
            LoginMethod::Demo => store.get_identity_marker().await?,
            LoginMethod::Google(_) => None,
        };

        if let Some(identity) = &initial {
            tracing::info!(uid = %identity.uid, "Restored remembered identity");
        }

        let (current, _) = watch::channel(initial);

        Ok(Self {
            inner: Arc::new(Inner {
                method,
                store,
                current,
            }),
        })
    }

    pub fn is_demo(&self) -> bool {
        matches!(self.inner.method, LoginMethod::Demo)
    }

    /// Identity signed in right now.
    pub fn current(&self) -> Option<Identity> {
        self.inner.current.borrow().clone()
    }

    /// Subscribe to identity changes.
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.inner.current.subscribe(),
            delivered_initial: false,
        }
    }

    /// Sign in. `credential` is the Google ID token; demo mode ignores it.
    pub async fn login(&self, credential: Option<&str>) -> Result<Identity, AppError> {
        let identity = match &self.inner.method {
            LoginMethod::Demo => {
                let identity = Identity::demo();
                self.inner.store.set_identity_marker(Some(&identity)).await?;
                identity
            }
            LoginMethod::Google(verifier) => {
                let credential = credential
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| AppError::BadRequest("Missing credential".to_string()))?;
                verifier.verify(credential).await?
            }
        };

        tracing::info!(uid = %identity.uid, "User logged in");
        self.inner.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    /// Sign out and forget any remembered identity.
    pub async fn logout(&self) -> Result<(), AppError> {
        if self.is_demo() {
            self.inner.store.set_identity_marker(None).await?;
        }

        if let Some(previous) = self.inner.current.send_replace(None) {
            tracing::info!(uid = %previous.uid, "User logged out");
        }
        Ok(())
    }
}

/// Live subscription to an [`AuthProvider`]'s identity feed.
pub struct AuthSubscription {
    receiver: watch::Receiver<Option<Identity>>,
    delivered_initial: bool,
}

impl AuthSubscription {
    /// Wait for the next identity state.
    ///
    /// The first call returns the current state immediately. Returns `None`
    /// once the provider has been dropped.
    pub async fn next(&mut self) -> Option<Option<Identity>> {
        if self.delivered_initial {
            self.receiver.changed().await.ok()?;
        }
        self.delivered_initial = true;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Stop receiving updates.
    pub fn unsubscribe(self) {}
}
