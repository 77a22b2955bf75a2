use crate::{
    api::{self, AppState, GateConfig},
    gate::{CredentialVerifier, SafePath, Sha256Verifier},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub web_protection: bool,
    pub password_digest: SecretString,
    pub default_redirect: SafePath,
    pub session_ttl_seconds: u64,
    pub session_sweep_seconds: u64,
    pub secure_cookie: bool,
}

/// Build the gate state from the parsed arguments.
/// # Errors
/// Returns an error if the password digest is not 64 hex characters.
pub fn state(args: Args) -> Result<AppState> {
    let verifier = Sha256Verifier::new(&args.password_digest)
        .context("invalid GATEKEEP_PASSWORD_DIGEST")?;

    if verifier.uses_default_password() {
        warn!("the login password is still the factory default");
    }
    if !args.web_protection {
        warn!("web protection is disabled, every visitor is logged in");
    }

    let config = GateConfig::new(args.default_redirect)
        .with_protection_enabled(args.web_protection)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_sweep_seconds(args.session_sweep_seconds)
        .with_secure_cookie(args.secure_cookie);

    Ok(AppState::new(config, Arc::new(verifier)))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let port = args.port;
    let state = state(args)?;

    info!(
        "protection: {}, default redirect: {}",
        state.config().protection_enabled(),
        state.config().default_redirect()
    );

    api::new(port, state).await
}
