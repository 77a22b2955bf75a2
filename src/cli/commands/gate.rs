use anyhow::{anyhow, Result};
use clap::{builder::BoolishValueParser, Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

use crate::gate::{SafePath, DEFAULT_PASSWORD_DIGEST, DEFAULT_REDIRECT};

pub const ARG_WEB_PROTECTION: &str = "web-protection";
pub const ARG_PASSWORD_DIGEST: &str = "password-digest";
pub const ARG_DEFAULT_REDIRECT: &str = "default-redirect";

#[derive(Debug, Clone)]
pub struct Options {
    pub web_protection: bool,
    pub password_digest: SecretString,
    pub default_redirect: SafePath,
}

impl Options {
    /// Parse gate arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the default redirect is not a safe local path.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let web_protection = matches
            .get_one::<bool>(ARG_WEB_PROTECTION)
            .copied()
            .unwrap_or(true);

        let password_digest = matches
            .get_one::<String>(ARG_PASSWORD_DIGEST)
            .cloned()
            .map(SecretString::from)
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_PASSWORD_DIGEST}"))?;

        let default_redirect = matches
            .get_one::<String>(ARG_DEFAULT_REDIRECT)
            .map_or(DEFAULT_REDIRECT, String::as_str);
        let default_redirect = SafePath::parse(default_redirect)
            .map_err(|err| anyhow!("invalid --{ARG_DEFAULT_REDIRECT}: {err}"))?;

        Ok(Self {
            web_protection,
            password_digest,
            default_redirect,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_WEB_PROTECTION)
                .long(ARG_WEB_PROTECTION)
                .help("Require the password before redirecting (false logs everyone in)")
                .env("GATEKEEP_WEB_PROTECTION")
                .default_value("true")
                .action(ArgAction::Set)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_PASSWORD_DIGEST)
                .long(ARG_PASSWORD_DIGEST)
                .help("SHA-256 hex digest of the login password")
                .env("GATEKEEP_PASSWORD_DIGEST")
                .hide_env_values(true)
                .default_value(DEFAULT_PASSWORD_DIGEST),
        )
        .arg(
            Arg::new(ARG_DEFAULT_REDIRECT)
                .long(ARG_DEFAULT_REDIRECT)
                .help("Local path to redirect to when next is missing or rejected")
                .env("GATEKEEP_DEFAULT_REDIRECT")
                .default_value(DEFAULT_REDIRECT),
        )
}
