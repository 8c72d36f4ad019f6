//! Broker-level error types shared by the queue, token flows, and domain requests.

// self
use crate::{
	_prelude::*,
	auth::{ClaimsError, TokenFamily, TokenRecordBuilderError},
	service::EndpointsError,
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
///
/// The set of kinds is closed: every failure is either a local configuration problem, an
/// upstream call that did not succeed, or a response body that could not be decoded.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (missing credentials, bad endpoint, bad header value).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Upstream call failed at the transport level or returned a non-success status.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Upstream call succeeded but its body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}
impl Error {
	/// Names the call that failed, when the failure came from an upstream call.
	pub fn context(&self) -> Option<&str> {
		match self {
			Self::Config(_) => None,
			Self::Transport(e) => Some(e.context()),
			Self::Decode(e) => Some(e.context()),
		}
	}

	/// HTTP status reported by the upstream service, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Transport(e) => e.status(),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised before any request is dispatched.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The requested token family has no credentials configured.
	#[error("No credentials are configured for the {family} token family.")]
	MissingCredentials {
		/// Family whose token was requested.
		family: TokenFamily,
	},
	/// A Ubisoft ticket was requested but no account credentials are configured.
	#[error("No Ubisoft account credentials are configured.")]
	MissingAccountCredentials,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Endpoint set failed validation.
	#[error(transparent)]
	Endpoints(#[from] EndpointsError),
	/// A request URL could not be assembled from a service base and a path.
	#[error("Request URL `{url}` is invalid.")]
	InvalidRequestUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A request body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	InvalidBody {
		/// Serializer failure.
		#[source]
		source: serde_json::Error,
	},
	/// A configured value cannot be sent as an HTTP header.
	#[error("The {name} header value is invalid.")]
	InvalidHeader {
		/// Header name.
		name: &'static str,
		/// Underlying header failure.
		#[source]
		source: oauth2::http::header::InvalidHeaderValue,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Upstream call failures. Every variant names the call that failed.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The service answered with a non-success HTTP status.
	#[error("{context} failed with HTTP {status}: {description}.")]
	Status {
		/// Call that failed.
		context: String,
		/// HTTP status code.
		status: u16,
		/// Reason phrase and body preview.
		description: String,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("{context} failed with a network error.")]
	Network {
		/// Call that failed.
		context: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("{context} failed with an I/O error.")]
	Io {
		/// Call that failed.
		context: String,
		/// IO failure.
		#[source]
		source: std::io::Error,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		context: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { context: context.into(), source: Box::new(src) }
	}

	/// Call that failed.
	pub fn context(&self) -> &str {
		match self {
			Self::Status { context, .. }
			| Self::Network { context, .. }
			| Self::Io { context, .. } => context,
		}
	}

	/// HTTP status code, for [`TransportError::Status`].
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Response decoding failures. Every variant names the call whose body was rejected.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not valid JSON or does not match the expected shape.
	#[error("{context} returned a body that could not be decoded: {source}.")]
	Json {
		/// Call that failed.
		context: String,
		/// Parser failure, including the JSON path and line/column.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Access token claims segment is malformed.
	#[error("{context} returned a token with malformed claims.")]
	Claims {
		/// Call that failed.
		context: String,
		/// Claims decoding failure.
		#[source]
		source: ClaimsError,
	},
	/// Body omitted a required field.
	#[error("{context} response is missing `{field}`.")]
	MissingField {
		/// Call that failed.
		context: String,
		/// Missing field name.
		field: &'static str,
	},
	/// Decoded values could not form a token record.
	#[error("{context} response could not form a token record.")]
	Record {
		/// Call that failed.
		context: String,
		/// Builder failure.
		#[source]
		source: TokenRecordBuilderError,
	},
	/// Body was rejected for another reason (e.g., unexpected content type).
	#[error("{context} returned an unexpected response: {message}.")]
	Unexpected {
		/// Call that failed.
		context: String,
		/// Description of the problem.
		message: String,
	},
}
impl DecodeError {
	/// Call that failed.
	pub fn context(&self) -> &str {
		match self {
			Self::Json { context, .. }
			| Self::Claims { context, .. }
			| Self::MissingField { context, .. }
			| Self::Record { context, .. }
			| Self::Unexpected { context, .. } => context,
		}
	}

	/// Line and column reported by the JSON parser, for [`DecodeError::Json`].
	pub fn position(&self) -> Option<(usize, usize)> {
		match self {
			Self::Json { source, .. } => Some((source.inner().line(), source.inner().column())),
			_ => None,
		}
	}
}
