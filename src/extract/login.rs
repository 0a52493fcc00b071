//! Credential-gated variant: login state machine
//!
//! Some sites put their listing behind a login form. The flow is a small
//! state machine: fields must become interactable before text entry, submit
//! fires only once both fields hold non-empty text, and the terminal state is
//! reached by observing a URL change away from the login page or a timeout.
//! Success is classified by finding a post-login marker element afterwards.

use crate::cdp::CdpClient;
use crate::dom::resolver::{resolve_one, Scope};
use crate::dom::selector::{SelectorChain, SelectorQuery};
use crate::dom::wait::{ReadyCondition, Waiter};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Login inputs
#[derive(Debug, Clone)]
pub struct Credentials {
    /// URL of the login page
    pub login_url: String,
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

/// Login outputs on success
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Whether the post-login marker was found
    pub success: bool,
    /// Markup of the page in the terminal state
    pub page_markup: String,
}

/// Authentication flow states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    AnonymousOnLoginPage,
    CredentialsEntered,
    Submitted,
    AuthenticatedOrRejected,
}

/// Login form driver
#[derive(Debug, Clone)]
pub struct AuthFlow {
    /// Matches the username field
    pub username_chain: SelectorChain,
    /// Matches the password field
    pub password_chain: SelectorChain,
    /// Matches the submit control
    pub submit_chain: SelectorChain,
    /// Matches an element only present after successful login
    pub marker_chain: SelectorChain,
    /// Waiter for interactability and the terminal URL change
    pub waiter: Waiter,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self {
            username_chain: SelectorChain::new(vec![
                SelectorQuery::css("input[type='email']"),
                SelectorQuery::attr_contains("name", "user"),
                SelectorQuery::css("input[type='text']"),
            ]),
            password_chain: SelectorChain::single(SelectorQuery::css("input[type='password']")),
            submit_chain: SelectorChain::new(vec![
                SelectorQuery::css("button[type='submit']"),
                SelectorQuery::css("input[type='submit']"),
            ]),
            marker_chain: SelectorChain::new(vec![
                SelectorQuery::attr_contains("href", "logout"),
                SelectorQuery::attr_contains("class", "user-menu"),
            ]),
            waiter: Waiter::new(Duration::from_millis(250), Duration::from_secs(15)),
        }
    }
}

impl AuthFlow {
    /// Drive the login form to its terminal state
    ///
    /// Returns the page markup on success; rejection and timeout are
    /// `Error::AuthenticationFailed`.
    pub async fn login(&self, client: &Arc<dyn CdpClient>, creds: &Credentials) -> Result<LoginOutcome> {
        client.navigate(&creds.login_url).await?;

        let mut state = AuthState::AnonymousOnLoginPage;
        debug!("Auth state: {:?}", state);

        let username_field = resolve_one(client, Scope::Document, &self.username_chain)
            .await?
            .ok_or_else(|| Error::authentication_failed("username field not found"))?;
        self.waiter
            .wait_until(client, ReadyCondition::Clickable(&username_field))
            .await
            .map_err(|_| Error::authentication_failed("username field never became interactable"))?;

        let password_field = resolve_one(client, Scope::Document, &self.password_chain)
            .await?
            .ok_or_else(|| Error::authentication_failed("password field not found"))?;
        self.waiter
            .wait_until(client, ReadyCondition::Clickable(&password_field))
            .await
            .map_err(|_| Error::authentication_failed("password field never became interactable"))?;

        username_field.set_value(&creds.username).await?;
        password_field.set_value(&creds.password).await?;

        state = AuthState::CredentialsEntered;
        debug!("Auth state: {:?}", state);

        // Guard: submit only fires with both fields actually holding text
        if username_field.value().await?.is_empty() || password_field.value().await?.is_empty() {
            return Err(Error::authentication_failed(
                "credential fields did not accept input",
            ));
        }

        let submit = resolve_one(client, Scope::Document, &self.submit_chain)
            .await?
            .ok_or_else(|| Error::authentication_failed("submit control not found"))?;
        submit.click().await?;

        state = AuthState::Submitted;
        debug!("Auth state: {:?}", state);

        let navigated_away = self
            .waiter
            .wait_until(client, ReadyCondition::UrlDiffersFrom(&creds.login_url))
            .await
            .is_ok();

        state = AuthState::AuthenticatedOrRejected;
        debug!("Auth state: {:?} (navigated_away={})", state, navigated_away);

        let marker = resolve_one(client, Scope::Document, &self.marker_chain).await?;

        match marker {
            Some(_) => {
                info!("Login succeeded for {}", creds.login_url);
                Ok(LoginOutcome {
                    success: true,
                    page_markup: client.get_content().await?,
                })
            }
            None if navigated_away => Err(Error::authentication_failed(
                "post-login marker not found after navigation",
            )),
            None => Err(Error::authentication_failed(
                "login page never navigated away",
            )),
        }
    }
}
