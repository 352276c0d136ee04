//! Sign-in flow against the external identity provider.
//!
//! The provider sends the user back with `#session_id=...` in the URL. That id
//! is exchanged once for a backend session; afterwards every protected command
//! passes through [`AuthGate::resolve`].

use anyhow::{Context, Result};
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::models::User;

pub const LOGIN_ROUTE: &str = "/login";

/// "Who am I" on the backend.
pub trait Identity {
    fn me(&self) -> Result<User, ApiError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: Option<String>,
}

/// Trades a provider session id for a backend session.
pub trait SessionExchange {
    fn exchange(&self, session_id: &str) -> Result<Session, ApiError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Authenticated(User),
    Redirect(&'static str),
}

pub struct AuthGate;

impl AuthGate {
    /// A user handed over from the sign-in step is trusted as is. Otherwise a
    /// single identity check decides; there is no retry.
    pub fn resolve(nav_state: Option<User>, identity: &dyn Identity) -> AuthState {
        if let Some(user) = nav_state {
            debug!(user_id = %user.user_id, "using carried session");
            return AuthState::Authenticated(user);
        }
        match identity.me() {
            Ok(user) => AuthState::Authenticated(user),
            Err(e) => {
                debug!(error = %e, "identity check failed");
                AuthState::Redirect(LOGIN_ROUTE)
            }
        }
    }
}

/// Provider URL that returns to `redirect` after sign-in.
pub fn login_url(auth_base: &str, redirect: &str) -> Result<String> {
    let mut url = Url::parse(auth_base).with_context(|| format!("Invalid auth URL: {}", auth_base))?;
    url.query_pairs_mut().append_pair("redirect", redirect);
    Ok(url.to_string())
}

/// Pulls `session_id` out of the fragment of a callback URL, decoded as form data.
pub fn session_id_from_fragment(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let fragment = url.fragment()?;
    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == "session_id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    SignedIn(Session),
    AlreadyProcessed,
    Redirect(&'static str),
}

/// Exchanges each provider session id at most once.
///
/// `resuming` seeds the guard with the id handled by an earlier run, so the
/// same callback URL is not exchanged twice across processes either.
#[derive(Debug, Default)]
pub struct CallbackGuard {
    processed: Option<String>,
}

impl CallbackGuard {
    pub fn resuming(processed: Option<String>) -> Self {
        Self { processed }
    }

    /// The session id that has been handed to the exchange, if any.
    pub fn processed_id(&self) -> Option<&str> {
        self.processed.as_deref()
    }

    pub fn process(&mut self, url: &str, exchange: &dyn SessionExchange) -> CallbackOutcome {
        let Some(session_id) = session_id_from_fragment(url) else {
            warn!("callback URL carries no session_id");
            return CallbackOutcome::Redirect(LOGIN_ROUTE);
        };
        if self.processed.as_deref() == Some(session_id.as_str()) {
            debug!("callback already processed");
            return CallbackOutcome::AlreadyProcessed;
        }
        self.processed = Some(session_id.clone());

        match exchange.exchange(&session_id) {
            Ok(session) => {
                info!(user_id = %session.user.user_id, "signed in");
                CallbackOutcome::SignedIn(session)
            }
            Err(e) => {
                warn!(error = %e, "session exchange failed");
                CallbackOutcome::Redirect(LOGIN_ROUTE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn user() -> User {
        User {
            user_id: "user_1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            picture: None,
        }
    }

    struct FakeIdentity {
        ok: bool,
        calls: Cell<usize>,
    }

    impl Identity for FakeIdentity {
        fn me(&self) -> Result<User, ApiError> {
            self.calls.set(self.calls.get() + 1);
            if self.ok { Ok(user()) } else { Err(ApiError::Unauthorized) }
        }
    }

    struct FakeExchange {
        ok: bool,
        calls: Cell<usize>,
    }

    impl SessionExchange for FakeExchange {
        fn exchange(&self, session_id: &str) -> Result<Session, ApiError> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(session_id, "abc123");
            if self.ok {
                Ok(Session {
                    user: user(),
                    token: Some("tok".to_string()),
                })
            } else {
                Err(ApiError::Status {
                    status: 400,
                    message: "Failed to validate session".to_string(),
                })
            }
        }
    }

    #[test]
    fn test_carried_user_skips_network() {
        let identity = FakeIdentity { ok: false, calls: Cell::new(0) };
        let state = AuthGate::resolve(Some(user()), &identity);
        assert_eq!(state, AuthState::Authenticated(user()));
        assert_eq!(identity.calls.get(), 0);
    }

    #[test]
    fn test_failed_identity_check_redirects_to_login() {
        let identity = FakeIdentity { ok: false, calls: Cell::new(0) };
        assert_eq!(AuthGate::resolve(None, &identity), AuthState::Redirect("/login"));
        assert_eq!(identity.calls.get(), 1);
    }

    #[test]
    fn test_successful_identity_check() {
        let identity = FakeIdentity { ok: true, calls: Cell::new(0) };
        assert_eq!(AuthGate::resolve(None, &identity), AuthState::Authenticated(user()));
    }

    #[test]
    fn test_login_url_encodes_redirect() {
        let url = login_url("https://auth.emergentagent.com", "http://localhost:3000/dashboard").unwrap();
        assert_eq!(
            url,
            "https://auth.emergentagent.com/?redirect=http%3A%2F%2Flocalhost%3A3000%2Fdashboard"
        );
        assert!(login_url("not a url", "x").is_err());
    }

    #[test]
    fn test_session_id_from_fragment() {
        assert_eq!(
            session_id_from_fragment("http://localhost:3000/dashboard#session_id=abc123").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            session_id_from_fragment("http://x/#foo=1&session_id=abc123&bar=2").as_deref(),
            Some("abc123")
        );
        assert_eq!(session_id_from_fragment("http://x/?session_id=abc123"), None);
        assert_eq!(session_id_from_fragment("http://x/#other_session_id=abc"), None);
        assert_eq!(session_id_from_fragment("http://x/#session_id="), None);
        assert_eq!(session_id_from_fragment("not a url#session_id=abc123"), None);
    }

    #[test]
    fn test_session_id_is_percent_decoded() {
        assert_eq!(
            session_id_from_fragment("http://x/dashboard#session_id=abc%2Bdef%3D").as_deref(),
            Some("abc+def=")
        );
        assert_eq!(
            session_id_from_fragment("http://x/dashboard#session_id=a+b&x=1").as_deref(),
            Some("a b")
        );
    }

    #[test]
    fn test_callback_processed_once() {
        let exchange = FakeExchange { ok: true, calls: Cell::new(0) };
        let mut guard = CallbackGuard::default();
        let url = "http://localhost:3000/dashboard#session_id=abc123";

        assert!(matches!(guard.process(url, &exchange), CallbackOutcome::SignedIn(_)));
        assert_eq!(guard.process(url, &exchange), CallbackOutcome::AlreadyProcessed);
        assert_eq!(exchange.calls.get(), 1);
    }

    #[test]
    fn test_callback_resumed_from_earlier_run() {
        let exchange = FakeExchange { ok: true, calls: Cell::new(0) };
        let url = "http://localhost:3000/dashboard#session_id=abc123";

        let mut guard = CallbackGuard::resuming(Some("abc123".to_string()));
        assert_eq!(guard.process(url, &exchange), CallbackOutcome::AlreadyProcessed);
        assert_eq!(exchange.calls.get(), 0);

        let mut guard = CallbackGuard::resuming(Some("older".to_string()));
        assert!(matches!(guard.process(url, &exchange), CallbackOutcome::SignedIn(_)));
        assert_eq!(guard.processed_id(), Some("abc123"));
        assert_eq!(exchange.calls.get(), 1);
    }

    #[test]
    fn test_callback_failures_redirect() {
        let exchange = FakeExchange { ok: false, calls: Cell::new(0) };
        assert_eq!(
            CallbackGuard::default().process("http://x/dashboard", &exchange),
            CallbackOutcome::Redirect("/login")
        );
        assert_eq!(exchange.calls.get(), 0);
        assert_eq!(
            CallbackGuard::default().process("http://x/#session_id=abc123", &exchange),
            CallbackOutcome::Redirect("/login")
        );
    }
}
