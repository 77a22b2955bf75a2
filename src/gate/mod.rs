//! Login checkpoint core.
//!
//! Leaf first: [`redirect`] turns the encoded `next` parameter into a
//! [`SafePath`], [`fragment`] re-attaches deep-link fragments, and
//! [`machine`] decides between redirecting and rendering the login form.
//! Sessions, credentials and UI strings are injected collaborators.

pub mod credential;
pub mod fragment;
pub mod locale;
pub mod machine;
pub mod page;
pub mod redirect;
pub mod session;

pub use credential::{CredentialVerifier, Sha256Verifier, DEFAULT_PASSWORD_DIGEST};
pub use locale::{EnglishLocalizer, Localizer, LoginNotice};
pub use machine::{Action, AuthGate, Decision, GateRequest, GateState, LoginPage, Rule};
pub use redirect::{PathValidator, SafePath, DEFAULT_REDIRECT};
pub use session::{MemorySessionStore, SessionId, SessionState, SessionStore};
