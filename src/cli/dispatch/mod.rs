//! Map parsed CLI arguments to the action the binary executes.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{gate, session, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if an argument value is unusable.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let gate_opts = gate::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        web_protection: gate_opts.web_protection,
        password_digest: gate_opts.password_digest,
        default_redirect: gate_opts.default_redirect,
        session_ttl_seconds: session_opts.ttl_seconds,
        session_sweep_seconds: session_opts.sweep_seconds,
        secure_cookie: session_opts.secure_cookie,
    }))
}
