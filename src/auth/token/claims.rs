//! Claims carried inside Nadeo access tokens.
//!
//! Nadeo tokens are three dot-separated segments; the middle one is a base64-encoded JSON
//! object whose `exp` (expiry) and `rat` (refresh allowed at) fields are Unix seconds.

// crates.io
use base64::{
	Engine,
	engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
};
// self
use crate::_prelude::*;

/// Failures raised while decoding a token's claims segment.
#[derive(Debug, ThisError)]
pub enum ClaimsError {
	/// Token has no second dot-separated segment.
	#[error("Token has no claims segment.")]
	MissingSegment,
	/// Claims segment is not valid base64.
	#[error("Claims segment is not valid base64.")]
	Base64(#[from] base64::DecodeError),
	/// Claims segment is not the expected JSON object.
	#[error("Claims segment is not a valid claims object.")]
	Json(#[from] serde_json::Error),
	/// A claim the family depends on is absent.
	#[error("Token is missing the `{claim}` claim.")]
	MissingClaim {
		/// Claim name.
		claim: &'static str,
	},
	/// A timestamp claim cannot be represented.
	#[error("The `{claim}` claim ({value}) is out of range.")]
	TimestampOutOfRange {
		/// Claim name.
		claim: &'static str,
		/// Raw Unix seconds.
		value: i64,
	},
}

/// Decoded claims of a Nadeo access token.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
	/// Expiry, Unix seconds.
	pub exp: i64,
	/// Refresh allowed at, Unix seconds.
	#[serde(default)]
	pub rat: Option<i64>,
}
impl TokenClaims {
	/// Decodes the claims segment of `token`.
	pub fn decode(token: &str) -> Result<Self, ClaimsError> {
		let segment = token.split('.').nth(1).ok_or(ClaimsError::MissingSegment)?;
		let segment = segment.trim_end_matches('=');
		let raw = URL_SAFE_NO_PAD.decode(segment).or_else(|_| STANDARD_NO_PAD.decode(segment))?;

		Ok(serde_json::from_slice(&raw)?)
	}

	/// Absolute expiry instant.
	pub fn expires_at(&self) -> Result<OffsetDateTime, ClaimsError> {
		timestamp("exp", self.exp)
	}

	/// Absolute refresh-eligibility instant, when the token carries one.
	pub fn refresh_at(&self) -> Result<Option<OffsetDateTime>, ClaimsError> {
		self.rat.map(|value| timestamp("rat", value)).transpose()
	}

	/// Same as [`Self::refresh_at`] but fails when the claim is absent.
	pub fn required_refresh_at(&self) -> Result<OffsetDateTime, ClaimsError> {
		self.refresh_at()?.ok_or(ClaimsError::MissingClaim { claim: "rat" })
	}
}

fn timestamp(claim: &'static str, value: i64) -> Result<OffsetDateTime, ClaimsError> {
	OffsetDateTime::from_unix_timestamp(value)
		.map_err(|_| ClaimsError::TimestampOutOfRange { claim, value })
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::engine::general_purpose::STANDARD;
	use time::macros;
	// self
	use super::*;

	fn token_with(payload: &str, engine: &impl Engine) -> String {
		format!("header.{}.signature", engine.encode(payload))
	}

	#[test]
	fn decodes_url_safe_payload() {
		let token = token_with(
			r#"{"exp":1735693200,"rat":1735691400,"aud":"NadeoServices"}"#,
			&URL_SAFE_NO_PAD,
		);
		let claims = TokenClaims::decode(&token).expect("URL-safe claims should decode.");

		assert_eq!(
			claims.expires_at().expect("exp should convert."),
			macros::datetime!(2025-01-01 01:00 UTC)
		);
		assert_eq!(
			claims.refresh_at().expect("rat should convert."),
			Some(macros::datetime!(2025-01-01 00:30 UTC))
		);
	}

	#[test]
	fn decodes_padded_standard_payload() {
		let token = token_with(r#"{"exp": 1735693200}"#, &STANDARD);
		let claims = TokenClaims::decode(&token).expect("Padded claims should decode.");

		assert_eq!(claims.exp, 1_735_693_200);
		assert!(matches!(
			claims.required_refresh_at(),
			Err(ClaimsError::MissingClaim { claim: "rat" })
		));
	}

	#[test]
	fn rejects_tokens_without_claims() {
		assert!(matches!(TokenClaims::decode("opaque"), Err(ClaimsError::MissingSegment)));
		assert!(matches!(TokenClaims::decode("a.!!!.c"), Err(ClaimsError::Base64(_))));

		let token = token_with(r#"{"sub":"nobody"}"#, &URL_SAFE_NO_PAD);

		assert!(matches!(TokenClaims::decode(&token), Err(ClaimsError::Json(_))));
	}
}
