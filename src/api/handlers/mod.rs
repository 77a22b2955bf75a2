//! HTTP handlers for the gate, logout and health endpoints.

pub mod gate;
pub mod health;
pub mod logout;
pub(crate) mod session;
pub mod state;

pub use state::{AppState, GateConfig};
