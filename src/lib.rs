//! # Gatekeep (login checkpoint)
//!
//! `gatekeep` sits in front of a web application and decides, per request,
//! whether the caller may continue to the page it asked for or has to enter
//! the application password first.
//!
//! ## Redirect targets
//!
//! The page to continue to arrives as a base64 encoded `next` query
//! parameter. It is attacker controlled, so it is decoded strictly and checked
//! against a same-origin allow-list before it is ever written to a `Location`
//! header. Anything that fails falls back to the default landing page.
//!
//! ## Deep links
//!
//! Fragments (`#device-123`) are never sent to the server. They are preserved
//! either by encoding them into `next`, or by the login page copying
//! `location.hash` into the `url_hash` form field. The encoded value wins.
//!
//! ## Sessions
//!
//! A session carries a single `authenticated` flag. Successful logins rotate
//! the session id.

pub mod api;
pub mod cli;
pub mod gate;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
