//! Gate configuration and the shared state handed to handlers.

use std::{sync::Arc, time::Duration};

use crate::gate::{
    AuthGate, CredentialVerifier, EnglishLocalizer, Localizer, MemorySessionStore, PathValidator,
    SafePath,
};

const DEFAULT_SESSION_TTL_SECONDS: u64 = 12 * 60 * 60;
const DEFAULT_SESSION_SWEEP_SECONDS: u64 = 5 * 60;

#[derive(Clone, Debug)]
pub struct GateConfig {
    protection_enabled: bool,
    default_redirect: SafePath,
    session_ttl_seconds: u64,
    session_sweep_seconds: u64,
    secure_cookie: bool,
}

impl GateConfig {
    #[must_use]
    pub fn new(default_redirect: SafePath) -> Self {
        Self {
            protection_enabled: true,
            default_redirect,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_sweep_seconds: DEFAULT_SESSION_SWEEP_SECONDS,
            secure_cookie: false,
        }
    }

    #[must_use]
    pub fn with_protection_enabled(mut self, enabled: bool) -> Self {
        self.protection_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_sweep_seconds(mut self, seconds: u64) -> Self {
        self.session_sweep_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    #[must_use]
    pub fn protection_enabled(&self) -> bool {
        self.protection_enabled
    }

    #[must_use]
    pub fn default_redirect(&self) -> &SafePath {
        &self.default_redirect
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_sweep_interval(&self) -> Duration {
        // A zero interval would make tokio's interval panic.
        Duration::from_secs(self.session_sweep_seconds.max(1))
    }

    pub(super) fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }
}

pub struct AppState {
    config: GateConfig,
    gate: AuthGate,
    sessions: Arc<MemorySessionStore>,
    localizer: Arc<dyn Localizer>,
}

impl AppState {
    #[must_use]
    pub fn new(config: GateConfig, credentials: Arc<dyn CredentialVerifier>) -> Self {
        let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(
            config.session_ttl_seconds(),
        )));
        let gate = AuthGate::new(
            config.protection_enabled(),
            PathValidator::new(config.default_redirect().clone()),
            sessions.clone(),
            credentials,
        );
        Self {
            config,
            gate,
            sessions,
            localizer: Arc::new(EnglishLocalizer),
        }
    }

    #[must_use]
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<MemorySessionStore> {
        &self.sessions
    }

    #[must_use]
    pub fn localizer(&self) -> &dyn Localizer {
        self.localizer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{redirect::PathViolation, Sha256Verifier};

    #[test]
    fn config_defaults_and_builders() -> Result<(), PathViolation> {
        let config = GateConfig::new(SafePath::parse("/devices.php")?);
        assert!(config.protection_enabled());
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert!(!config.secure_cookie());

        let config = config
            .with_protection_enabled(false)
            .with_session_ttl_seconds(60)
            .with_session_sweep_seconds(0)
            .with_secure_cookie(true);
        assert!(!config.protection_enabled());
        assert_eq!(config.session_ttl_seconds(), 60);
        assert_eq!(config.session_sweep_interval(), Duration::from_secs(1));
        assert!(config.secure_cookie());
        Ok(())
    }

    #[test]
    fn app_state_wires_gate_from_config() -> Result<(), PathViolation> {
        let config = GateConfig::new(SafePath::parse("/index2.php")?).with_protection_enabled(false);
        let state = AppState::new(config, Arc::new(Sha256Verifier::from_password("pw")));
        assert!(!state.gate().protection_enabled());
        assert!(state.sessions().is_empty());
        assert_eq!(state.config().default_redirect().as_str(), "/index2.php");
        Ok(())
    }
}
