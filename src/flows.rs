//! OAuth 2.0 flows driven by the client.

pub mod authorization_code;

pub use authorization_code::*;
