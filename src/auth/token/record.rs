//! Cached token records, lifecycle helpers, and builders.

// self
use crate::{
	_prelude::*,
	auth::{Secret, token::family::TokenFamily},
};

/// Current lifecycle status for a token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token may be reused without contacting the issuer.
	Active,
	/// Token reached its expiry instant and must be refreshed.
	Expired,
}

/// Errors produced by [`TokenRecordBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenRecordBuilderError {
	/// Issued when no (or an empty) access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// Token issued for one family, as held in the broker's cache.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenRecord {
	/// Family that owns the token.
	pub family: TokenFamily,
	/// Access token secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Refresh token, if the issuer returned one.
	pub refresh_token: Option<Secret>,
	/// Instant the broker received the token.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry instant.
	pub expires_at: OffsetDateTime,
	/// Instant from which the issuer allows a refresh (`rat` claim), when provided.
	pub refresh_at: Option<OffsetDateTime>,
}
impl TokenRecord {
	/// Returns a builder for the provided family.
	pub fn builder(family: TokenFamily) -> TokenRecordBuilder {
		TokenRecordBuilder::new(family)
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant < self.expires_at { TokenStatus::Active } else { TokenStatus::Expired }
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the record can be reused at the provided instant.
	pub fn is_active_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Active)
	}

	/// Returns `true` if the record has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}

	/// Returns `true` if the record is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		matches!(self.status(), TokenStatus::Expired)
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("family", &self.family)
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("refresh_at", &self.refresh_at)
			.finish()
	}
}

/// Builder for [`TokenRecord`].
#[derive(Clone, Debug)]
pub struct TokenRecordBuilder {
	family: TokenFamily,
	access_token: Option<Secret>,
	refresh_token: Option<Secret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	refresh_at: Option<OffsetDateTime>,
}
impl TokenRecordBuilder {
	fn new(family: TokenFamily) -> Self {
		Self {
			family,
			access_token: None,
			refresh_token: None,
			issued_at: None,
			expires_at: None,
			expires_in: None,
			refresh_at: None,
		}
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant. Takes precedence over [`Self::expires_in`].
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Sets the instant from which a refresh is allowed.
	pub fn refresh_at(mut self, instant: Option<OffsetDateTime>) -> Self {
		self.refresh_at = instant;

		self
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<Secret>) -> Self {
		self.access_token = Some(token.into());

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<Secret>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Consumes the builder and produces a [`TokenRecord`].
	pub fn build(self) -> Result<TokenRecord, TokenRecordBuilderError> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or(TokenRecordBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(TokenRecordBuilderError::MissingExpiry),
		};

		Ok(TokenRecord {
			family: self.family,
			access_token,
			refresh_token: self.refresh_token.filter(|token| !token.is_empty()),
			issued_at,
			expires_at,
			refresh_at: self.refresh_at,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn status_flips_exactly_at_expiry() {
		let record = TokenRecord::builder(TokenFamily::NadeoServices)
			.access_token("access")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_at(macros::datetime!(2025-01-01 01:00 UTC))
			.build()
			.expect("Token record builder should succeed for status checks.");

		assert_eq!(record.status_at(macros::datetime!(2025-01-01 00:59 UTC)), TokenStatus::Active);
		assert_eq!(record.status_at(macros::datetime!(2025-01-01 01:00 UTC)), TokenStatus::Expired);
		assert!(record.is_expired_at(macros::datetime!(2025-01-02 00:00 UTC)));
	}

	#[test]
	fn builder_handles_relative_expiry() {
		let record = TokenRecord::builder(TokenFamily::OAuth)
			.access_token("secret")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::hours(1))
			.build()
			.expect("Token record builder should support relative expiry calculations.");

		assert_eq!(record.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert!(record.refresh_at.is_none());
	}

	#[test]
	fn builder_rejects_empty_tokens_and_missing_expiry() {
		let err = TokenRecord::builder(TokenFamily::NadeoLiveServices)
			.access_token("")
			.expires_in(Duration::minutes(5))
			.build()
			.expect_err("Empty access tokens should be rejected.");

		assert_eq!(err, TokenRecordBuilderError::MissingAccessToken);

		let err = TokenRecord::builder(TokenFamily::NadeoLiveServices)
			.access_token("token")
			.build()
			.expect_err("Records without an expiry should be rejected.");

		assert_eq!(err, TokenRecordBuilderError::MissingExpiry);
	}

	#[test]
	fn debug_output_redacts_tokens() {
		let record = TokenRecord::builder(TokenFamily::NadeoLiveServices)
			.access_token("access-value")
			.refresh_token("refresh-value")
			.expires_in(Duration::minutes(5))
			.build()
			.expect("Token record builder should succeed.");
		let rendered = format!("{record:?}");

		assert!(!rendered.contains("access-value"));
		assert!(!rendered.contains("refresh-value"));
	}
}
