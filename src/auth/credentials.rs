//! Long-lived credentials supplied once at broker construction.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::Secret};

/// Ubisoft account credentials used to mint the two Nadeo token families.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NadeoCredentials {
	/// Account login (usually an e-mail address).
	pub login: String,
	/// Account password.
	pub password: Secret,
}
impl NadeoCredentials {
	/// Creates a credential pair.
	pub fn new(login: impl Into<String>, password: impl Into<Secret>) -> Self {
		Self { login: login.into(), password: password.into() }
	}

	/// `Authorization` header value for the Ubisoft session endpoint.
	pub(crate) fn basic_authorization(&self) -> String {
		let raw = format!("{}:{}", self.login, self.password.expose());

		format!("Basic {}", STANDARD.encode(raw))
	}
}

/// OAuth client registered for the public Trackmania API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredentials {
	/// OAuth client identifier.
	pub identifier: String,
	/// OAuth client secret.
	pub secret: Secret,
}
impl OAuthCredentials {
	/// Creates a credential pair.
	pub fn new(identifier: impl Into<String>, secret: impl Into<Secret>) -> Self {
		Self { identifier: identifier.into(), secret: secret.into() }
	}
}
