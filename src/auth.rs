//! Credential wrappers that keep secrets out of logs.

pub mod secret;

pub use secret::*;
