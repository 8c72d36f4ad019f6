//! Credentials, secrets, and token models for the three Nadeo token families.

pub mod credentials;
pub mod secret;
pub mod token;

pub use credentials::*;
pub use secret::*;
pub use token::{claims::*, family::*, record::*};
