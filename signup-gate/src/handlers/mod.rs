pub mod pre_signup;

pub use pre_signup::handle_pre_signup;
