//! Transport primitives shared by the request queue and the token flows.
//!
//! The module exposes [`HttpTransport`], the broker's only dependency on an HTTP stack,
//! alongside [`ResponseMetadata`] and [`ResponseMetadataSlot`] which let the OAuth facade
//! recover the status of a response after the `oauth2` crate has consumed it.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
pub use oauth2::{HttpRequest, HttpResponse};
use oauth2::http::StatusCode;
// self
use crate::_prelude::*;

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing broker requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can sit behind the
/// shared [`RequestQueue`](crate::queue::RequestQueue). The returned future must own whatever
/// state it needs and stay `Send` for the lifetime of the in-flight request. Responses are
/// returned verbatim: non-success statuses are not errors at this layer.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Dispatches `request` and resolves with the full response.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the endpoint, if available.
	pub status: Option<u16>,
	/// Reason phrase plus body preview, captured for non-success statuses.
	pub description: Option<String>,
}
impl ResponseMetadata {
	/// Captures the status (and, on failure, a description) of `response`.
	pub fn from_response(response: &HttpResponse) -> Self {
		let status = response.status();
		let description =
			(!status.is_success()).then(|| describe_status(status, response.body().as_slice()));

		Self { status: Some(status.as_u16()), description }
	}

	/// Returns `true` when a non-success status was captured.
	pub fn is_failure(&self) -> bool {
		self.status.is_some_and(|status| !(200..300).contains(&status))
	}
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok::<_, ReqwestError>(response_new)
		})
	}
}

const BODY_PREVIEW_LEN: usize = 256;

/// Human-readable description of a non-success response: reason phrase plus a body preview.
pub(crate) fn describe_status(status: StatusCode, body: &[u8]) -> String {
	let reason = status.canonical_reason().unwrap_or("Unknown status");
	let preview = String::from_utf8_lossy(body);
	let preview = preview.trim();

	if preview.is_empty() {
		return reason.to_owned();
	}

	let mut end = preview.len().min(BODY_PREVIEW_LEN);

	while !preview.is_char_boundary(end) {
		end -= 1;
	}

	format!("{reason} ({})", &preview[..end])
}
