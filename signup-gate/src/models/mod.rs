mod claims;
mod directory;
mod event;
mod signup;

pub use claims::{Audience, IdentityClaims};
pub use directory::{DirectoryUser, UserStatus};
pub use event::{PreSignupEvent, PreSignupRequest, PreSignupResponse};
pub use signup::{normalize_email, Decision, SignupEvent};
