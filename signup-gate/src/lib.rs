//! signup-gate: Cognito pre-sign-up trigger for Google-federated sign-ups.
//!
//! A sign-up that carries a Google ID token for the same email is confirmed
//! and email-verified on the spot. Everything else falls through to the user
//! pool's normal confirmation flow, except a verified email that already
//! belongs to a confirmed account, which rejects the sign-up.

pub mod config;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod services;

pub use gate::{GateSettings, SignupGate};
