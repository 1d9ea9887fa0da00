// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Top-level view routing.
//!
//! ```text
//! loading ──► login        (no identity)
//!         ──► onboarding   (identity, no profile)
//!         ──► dashboard    (identity, profile of any completeness)
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::Store;
use crate::error::AppError;
use crate::models::{Identity, ProfileDraft, UserProfile};
use crate::services::auth::AuthSubscription;
use crate::services::dashboard::Dashboard;
use crate::services::gemini::ContentGenerator;
use crate::services::onboarding::{OnboardingFlow, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Loading,
    Login,
    Onboarding,
    Dashboard,
}

/// Where an identity state routes, with the profile that decided it.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub view: ViewKind,
    pub profile: Option<UserProfile>,
}

/// Decide the view for an identity state.
pub async fn resolve_view(store: &Store, identity: Option<&Identity>) -> Result<Route, AppError> {
    let Some(identity) = identity else {
        return Ok(Route {
            view: ViewKind::Login,
            profile: None,
        });
    };

    let profile = store.get_profile(&identity.uid).await?;
    let view = if profile.is_some() {
        ViewKind::Dashboard
    } else {
        ViewKind::Onboarding
    };

    Ok(Route { view, profile })
}

/// Persist a completed onboarding draft as the user's profile.
///
/// Identity fields override the draft. Re-completing onboarding for a user
/// who already had a profile clears their cached routines so the next
/// dashboard load regenerates them for the updated answers.
pub async fn finish_onboarding(
    store: &Store,
    identity: &Identity,
    draft: ProfileDraft,
) -> Result<UserProfile, AppError> {
    let existed = store.get_profile(&identity.uid).await?.is_some();
    let profile = draft.into_profile(identity);

    store.save_profile(&profile).await?;
    tracing::info!(uid = %profile.uid, edit = existed, "Profile saved");

    if existed {
        store.save_routines(&profile.uid, &[]).await?;
        tracing::info!(uid = %profile.uid, "Invalidated cached routines after profile edit");
    }

    Ok(profile)
}

/// What the controller is presenting.
pub enum Screen {
    Loading,
    Login,
    Onboarding(OnboardingFlow),
    Dashboard(Box<Dashboard>),
}

impl Screen {
    pub fn kind(&self) -> ViewKind {
        match self {
            Screen::Loading => ViewKind::Loading,
            Screen::Login => ViewKind::Login,
            Screen::Onboarding(_) => ViewKind::Onboarding,
            Screen::Dashboard(_) => ViewKind::Dashboard,
        }
    }
}

/// Drives the screen from the auth feed.
///
/// Owns exactly one [`AuthSubscription`] for its lifetime.
pub struct Controller {
    store: Store,
    generator: Arc<dyn ContentGenerator>,
    subscription: AuthSubscription,
    identity: Option<Identity>,
    screen: Screen,
}

impl Controller {
    pub fn new(
        store: Store,
        generator: Arc<dyn ContentGenerator>,
        subscription: AuthSubscription,
    ) -> Self {
        Self {
            store,
            generator,
            subscription,
            identity: None,
            screen: Screen::Loading,
        }
    }

    pub fn view(&self) -> ViewKind {
        self.screen.kind()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Wait for the next identity state and route it.
    ///
    /// Returns `None` once the auth provider is gone.
    pub async fn poll(&mut self, today: NaiveDate) -> Option<ViewKind> {
        let identity = self.subscription.next().await?;
        self.handle_identity(identity, today).await;
        Some(self.view())
    }

    async fn handle_identity(&mut self, identity: Option<Identity>, today: NaiveDate) {
        self.identity = identity;

        let route = match resolve_view(&self.store, self.identity.as_ref()).await {
            Ok(route) => route,
            Err(e) => {
                tracing::error!(error = %e, "Failed to route identity; keeping current view");
                return;
            }
        };

        let screen = match (route.view, route.profile) {
            (ViewKind::Dashboard, Some(profile)) => self.open_dashboard(profile, today).await,
            (ViewKind::Onboarding, _) => Screen::Onboarding(OnboardingFlow::new(None)),
            _ => Screen::Login,
        };
        self.screen = screen;
    }

    async fn open_dashboard(&self, profile: UserProfile, today: NaiveDate) -> Screen {
        let mut dashboard = Dashboard::new(
            self.store.clone(),
            self.generator.clone(),
            profile,
            today,
        );
        // The dashboard logs the failure and keeps what it loaded; it still opens.
        if let Err(e) = dashboard.activate(today).await {
            tracing::debug!(error = %e, "Opening dashboard after partial load");
        }
        Screen::Dashboard(Box::new(dashboard))
    }

    /// Leave the dashboard to re-run onboarding seeded with the current profile.
    pub fn edit_profile(&mut self) -> Result<(), AppError> {
        let Screen::Dashboard(dashboard) = &self.screen else {
            return Err(AppError::BadRequest(
                "Profile can only be edited from the dashboard".to_string(),
            ));
        };

        let flow = OnboardingFlow::new(Some(dashboard.profile()));
        self.screen = Screen::Onboarding(flow);
        Ok(())
    }

    /// Move the onboarding flow forward. Completing the last step saves the
    /// profile and opens the dashboard.
    pub async fn advance_onboarding(&mut self, today: NaiveDate) -> Result<ViewKind, AppError> {
        let Screen::Onboarding(flow) = &mut self.screen else {
            return Err(AppError::BadRequest("Not onboarding".to_string()));
        };
        let identity = self.identity.clone().ok_or(AppError::Unauthorized)?;

        match flow.next() {
            Step::Advanced(_) => Ok(ViewKind::Onboarding),
            Step::Completed(draft) => {
                let profile = finish_onboarding(&self.store, &identity, draft).await?;
                let screen = self.open_dashboard(profile, today).await;
                self.screen = screen;
                Ok(ViewKind::Dashboard)
            }
        }
    }

    /// Stop observing the auth feed.
    pub fn shutdown(self) {
        self.subscription.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalStore;

    #[tokio::test]
    async fn test_resolve_view_routes() {
        let store = Store::Local(LocalStore::in_memory());
        let identity = Identity::demo();

        let route = resolve_view(&store, None).await.unwrap();
        assert_eq!(route.view, ViewKind::Login);

        let route = resolve_view(&store, Some(&identity)).await.unwrap();
        assert_eq!(route.view, ViewKind::Onboarding);
        assert!(route.profile.is_none());

        // Incomplete profile still routes to the dashboard
        store
            .save_profile(&UserProfile::empty(&identity))
            .await
            .unwrap();
        let route = resolve_view(&store, Some(&identity)).await.unwrap();
        assert_eq!(route.view, ViewKind::Dashboard);
        assert!(!route.profile.unwrap().is_profile_complete);
    }

    #[test]
    fn test_view_kind_wire_names() {
        assert_eq!(
            serde_json::to_value(ViewKind::Onboarding).unwrap(),
            "onboarding"
        );
    }
}
