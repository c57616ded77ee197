//! Services layer for signup-gate.
//!
//! The identity verifier and the user directory sit behind traits so the
//! gate can be driven by the mocks below in tests.

mod directory;
pub mod error;
mod verifier;

pub use directory::{email_filter, CognitoDirectory, MockDirectory, UserDirectory};
pub use error::{DirectoryError, GateError, VerifyError};
pub use verifier::{GoogleIdTokenVerifier, IdentityVerifier, MockVerifier};
