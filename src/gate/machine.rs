//! The gate decision: redirect to the target or show the login form.
//!
//! Rules are evaluated in [`TRANSITIONS`] order and the first rule that
//! produces an [`Action`] wins. The order is part of the contract: protection
//! being disabled beats everything, a correct password beats an existing
//! session (so the session id is rotated), and the form is the fallback.

use std::sync::Arc;
use tracing::debug;

use super::{
    credential::CredentialVerifier,
    fragment,
    locale::LoginNotice,
    redirect::PathValidator,
    session::{SessionId, SessionState, SessionStore},
};

/// How a request was classified on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unprotected,
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ProtectionDisabled,
    PasswordAccepted,
    SessionAuthenticated,
    ShowLogin,
}

pub const TRANSITIONS: [Rule; 4] = [
    Rule::ProtectionDisabled,
    Rule::PasswordAccepted,
    Rule::SessionAuthenticated,
    Rule::ShowLogin,
];

/// Per-request input. Empty strings count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateRequest<'a> {
    /// Raw, still encoded `next` query value.
    pub next: Option<&'a str>,
    pub password: Option<&'a str>,
    pub url_hash: Option<&'a str>,
    pub session: Option<&'a SessionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPage {
    /// Original `next` value, echoed back into the form action.
    pub next: Option<String>,
    pub notice: LoginNotice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Redirect {
        location: String,
        /// Set when a session cookie has to be issued or rotated.
        session: Option<SessionId>,
    },
    RenderLogin(LoginPage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub state: GateState,
    pub rule: Rule,
    pub action: Action,
}

pub struct AuthGate {
    protection_enabled: bool,
    validator: PathValidator,
    sessions: Arc<dyn SessionStore>,
    credentials: Arc<dyn CredentialVerifier>,
}

impl AuthGate {
    #[must_use]
    pub fn new(
        protection_enabled: bool,
        validator: PathValidator,
        sessions: Arc<dyn SessionStore>,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            protection_enabled,
            validator,
            sessions,
            credentials,
        }
    }

    #[must_use]
    pub fn protection_enabled(&self) -> bool {
        self.protection_enabled
    }

    #[must_use]
    pub fn classify(&self, authenticated: bool) -> GateState {
        if !self.protection_enabled {
            GateState::Unprotected
        } else if authenticated {
            GateState::Authenticated
        } else {
            GateState::Unauthenticated
        }
    }

    /// Validated `next` with the deep-link fragment applied.
    #[must_use]
    pub fn final_target(&self, request: &GateRequest<'_>) -> String {
        let safe = self.validator.validate(request.next);
        fragment::resolve(&safe, request.url_hash)
    }

    #[must_use]
    pub fn decide(&self, request: GateRequest<'_>) -> Decision {
        let authenticated = request
            .session
            .is_some_and(|id| self.sessions.get(id).authenticated);
        let state = self.classify(authenticated);
        let target = self.final_target(&request);

        // ShowLogin closes the table and matches whatever the guards let through.
        let (rule, action) = TRANSITIONS
            .iter()
            .find_map(|rule| {
                self.guard(*rule, &request, authenticated, &target)
                    .map(|action| (*rule, action))
            })
            .unwrap_or_else(|| (Rule::ShowLogin, Action::RenderLogin(self.login_page(&request))));

        debug!(?state, ?rule, "gate decision");

        Decision {
            state,
            rule,
            action,
        }
    }

    /// Action for a guarded rule, `None` when its guard does not hold.
    fn guard(
        &self,
        rule: Rule,
        request: &GateRequest<'_>,
        authenticated: bool,
        target: &str,
    ) -> Option<Action> {
        match rule {
            Rule::ProtectionDisabled => (!self.protection_enabled).then(|| Action::Redirect {
                location: target.to_string(),
                session: (!authenticated).then(|| self.login(request.session)),
            }),
            Rule::PasswordAccepted => {
                let password = request.password.filter(|value| !value.is_empty())?;
                if !self.credentials.verify(password) {
                    debug!("password rejected");
                    return None;
                }
                Some(Action::Redirect {
                    location: target.to_string(),
                    session: Some(self.login(request.session)),
                })
            }
            Rule::SessionAuthenticated => authenticated.then(|| Action::Redirect {
                location: target.to_string(),
                session: None,
            }),
            Rule::ShowLogin => None,
        }
    }

    /// Mark the session authenticated under a fresh id.
    fn login(&self, current: Option<&SessionId>) -> SessionId {
        if let Some(id) = current {
            self.sessions.set(id, SessionState::AUTHENTICATED);
            self.sessions.regenerate_id(id)
        } else {
            let id = SessionId::generate();
            self.sessions.set(&id, SessionState::AUTHENTICATED);
            id
        }
    }

    pub fn logout(&self, session: Option<&SessionId>) {
        if let Some(id) = session {
            self.sessions.destroy(id);
        }
    }

    #[must_use]
    pub fn login_page(&self, request: &GateRequest<'_>) -> LoginPage {
        let notice = if self.credentials.uses_default_password() {
            LoginNotice::DefaultPasswordWarning
        } else {
            LoginNotice::Info
        };
        LoginPage {
            next: request
                .next
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            notice,
        }
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("protection_enabled", &self.protection_enabled)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}
