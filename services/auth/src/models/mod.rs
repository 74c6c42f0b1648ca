//! Authentication service payloads

pub mod user;

pub use user::{AdminSignupRequest, LoginRequest, SignupRequest, TokenRequest, TokenResponse};
