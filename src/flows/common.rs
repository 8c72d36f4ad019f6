//! Shared helpers for the token flows and domain requests (request assembly, status checks,
//! JSON decoding, single-flight refresh).

// crates.io
use oauth2::http::{
	HeaderValue, Method, Request,
	header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
};
// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenFamily, TokenRecord},
	error::{ConfigError, DecodeError, TransportError},
	flows::Broker,
	http::{self, HttpRequest, HttpResponse, HttpTransport},
	obs::{self, FlowOutcome, FlowSpan},
};

/// Builds a JSON request for `url` carrying the broker's `User-Agent`.
///
/// The method is left at `GET`; [`dispatch`] picks the final one.
pub(crate) fn json_request<C>(broker: &Broker<C>, url: &Url) -> Result<HttpRequest>
where
	C: ?Sized + HttpTransport,
{
	let request = Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
		.header(USER_AGENT, broker.user_agent.clone())
		.body(Vec::new())
		.map_err(ConfigError::from)?;

	Ok(request)
}

/// Adds an `Authorization` header to `request`.
pub(crate) fn authorize(request: &mut HttpRequest, value: &str) -> Result<()> {
	let value = HeaderValue::from_str(value)
		.map_err(|source| ConfigError::InvalidHeader { name: "Authorization", source })?;

	request.headers_mut().insert(AUTHORIZATION, value);

	Ok(())
}

/// Sends `request` through the broker's queue (`POST` when `body` is set, `GET` otherwise)
/// and returns the body of a successful response.
pub(crate) async fn dispatch<C>(
	broker: &Broker<C>,
	context: &str,
	request: HttpRequest,
	body: Option<Vec<u8>>,
) -> Result<Vec<u8>>
where
	C: ?Sized + HttpTransport,
{
	let response = match body {
		Some(body) => broker.queue.submit_post(request, body).await,
		None => broker.queue.submit_get(request).await,
	}
	.map_err(|e| TransportError::network(context, e))?;

	ensure_success(context, response)
}

/// Fails with [`TransportError::Status`] unless `response` carries a 2xx status.
pub(crate) fn ensure_success(context: &str, response: HttpResponse) -> Result<Vec<u8>> {
	let status = response.status();
	let body = response.into_body();

	if status.is_success() {
		Ok(body)
	} else {
		Err(TransportError::Status {
			context: context.into(),
			status: status.as_u16(),
			description: http::describe_status(status, &body),
		}
		.into())
	}
}

/// Decodes a whole JSON document, keeping the failing path and parser position on error.
pub(crate) fn decode_json<T>(context: &str, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);
	let value = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| DecodeError::Json { context: context.into(), source })?;

	de.end()
		.map_err(|e| DecodeError::Unexpected { context: context.into(), message: e.to_string() })?;

	Ok(value)
}

/// Returns the cached token for `family` or runs `refresh` under the family's single-flight
/// guard and caches the result.
///
/// The cache is re-checked once the guard is held, so callers that queued behind an in-flight
/// refresh reuse its token. A failed refresh leaves the cache untouched.
pub(crate) async fn cached_or_refresh<C, F, Fut>(
	broker: &Broker<C>,
	family: TokenFamily,
	refresh: F,
) -> Result<Secret>
where
	C: ?Sized + HttpTransport,
	F: FnOnce() -> Fut,
	Fut: Future<Output = Result<TokenRecord>>,
{
	if let Some(record) = broker.cache.fetch_active(family, OffsetDateTime::now_utc()) {
		return Ok(record.access_token);
	}

	let span = FlowSpan::new(family, "refresh");

	span.instrument(async move {
		let _singleflight = flow_guard(broker, family).lock().await;

		if let Some(record) = broker.cache.fetch_active(family, OffsetDateTime::now_utc()) {
			return Ok(record.access_token);
		}

		obs::record_refresh_outcome(family, FlowOutcome::Attempt);

		match refresh().await {
			Ok(record) => {
				let token = record.access_token.clone();

				broker.cache.save(record);
				obs::record_refresh_outcome(family, FlowOutcome::Success);

				Ok(token)
			},
			Err(e) => {
				obs::record_refresh_outcome(family, FlowOutcome::Failure);

				Err(e)
			},
		}
	})
	.await
}

/// Single-flight guard owned by `family`.
pub(crate) fn flow_guard<C>(broker: &Broker<C>, family: TokenFamily) -> &AsyncMutex<()>
where
	C: ?Sized + HttpTransport,
{
	&broker.flow_guards[family.index()]
}
