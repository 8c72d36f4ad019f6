//! OAuth client-credentials facade over the `oauth2` crate.
//!
//! The `oauth2` crate builds the token request (form body, client authentication, `Accept`
//! header) and parses the response; [`QueuedHttpClient`] routes the request itself through the
//! broker's [`RequestQueue`] so OAuth refreshes share the same spacing as every other call.

pub use oauth2;

// std
use std::io;
// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
	http::{HeaderValue, header::USER_AGENT},
};
// self
use crate::{
	_prelude::*,
	auth::{OAuthCredentials, TokenFamily, TokenRecord},
	error::{ConfigError, DecodeError, TransportError},
	http::{HttpRequest, HttpResponse, HttpTransport, ResponseMetadata, ResponseMetadataSlot},
	queue::RequestQueue,
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type QueuedFuture<'c, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError<E>>> + 'c + Send>>;

/// [`AsyncHttpClient`] handle that dispatches `oauth2` requests through a [`RequestQueue`].
///
/// Each handle records the status of the last response in its [`ResponseMetadataSlot`] so error
/// mapping can tell an HTTP failure apart from a malformed success.
pub struct QueuedHttpClient<C>
where
	C: ?Sized + HttpTransport,
{
	queue: Arc<RequestQueue<C>>,
	user_agent: HeaderValue,
	slot: ResponseMetadataSlot,
}
impl<C> QueuedHttpClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a handle that stamps `user_agent` on every request and reports into `slot`.
	pub fn new(
		queue: Arc<RequestQueue<C>>,
		user_agent: HeaderValue,
		slot: ResponseMetadataSlot,
	) -> Self {
		Self { queue, user_agent, slot }
	}
}
impl<'c, C> AsyncHttpClient<'c> for QueuedHttpClient<C>
where
	C: ?Sized + HttpTransport,
{
	type Error = HttpClientError<C::TransportError>;
	type Future = QueuedFuture<'c, C::TransportError>;

	fn call(&'c self, mut request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();
			request.headers_mut().insert(USER_AGENT, self.user_agent.clone());

			let body = std::mem::take(request.body_mut());
			let response = self.queue.submit_post(request, body).await.map_err(Box::new)?;

			self.slot.store(ResponseMetadata::from_response(&response));

			Ok(response)
		})
	}
}

/// Client-credentials exchange configured for one OAuth client and token endpoint.
pub(crate) struct ClientCredentialsFacade {
	oauth_client: ConfiguredBasicClient,
}
impl ClientCredentialsFacade {
	pub(crate) fn new(credentials: &OAuthCredentials, token_url: &Url) -> Self {
		let oauth_client = BasicClient::new(ClientId::new(credentials.identifier.clone()))
			.set_client_secret(ClientSecret::new(credentials.secret.expose().to_owned()))
			.set_token_uri(TokenUrl::from_url(token_url.clone()))
			.set_auth_type(AuthType::RequestBody);

		Self { oauth_client }
	}

	/// Runs the grant through `queue` and maps the response into an OAuth [`TokenRecord`].
	pub(crate) async fn exchange<C>(
		&self,
		queue: Arc<RequestQueue<C>>,
		user_agent: HeaderValue,
	) -> Result<TokenRecord>
	where
		C: ?Sized + HttpTransport,
	{
		let context = TokenFamily::OAuth.refresh_context();
		let slot = ResponseMetadataSlot::default();
		let http_client = QueuedHttpClient::new(queue, user_agent, slot.clone());
		let response = self
			.oauth_client
			.exchange_client_credentials()
			.request_async(&http_client)
			.await
			.map_err(|e| map_request_error(context, slot.take(), e))?;

		token_record(context, &response, OffsetDateTime::now_utc())
	}
}

fn token_record(
	context: &str,
	response: &BasicTokenResponse,
	issued_at: OffsetDateTime,
) -> Result<TokenRecord> {
	let expires_in = response
		.expires_in()
		.ok_or_else(|| DecodeError::MissingField { context: context.into(), field: "expires_in" })?;
	let expires_in = Duration::try_from(expires_in).map_err(|e| DecodeError::Unexpected {
		context: context.into(),
		message: format!("`expires_in` is out of range ({e})"),
	})?;
	let mut builder = TokenRecord::builder(TokenFamily::OAuth)
		.access_token(response.access_token().secret().to_owned())
		.issued_at(issued_at)
		.expires_in(expires_in);

	if let Some(refresh_token) = response.refresh_token() {
		builder = builder.refresh_token(refresh_token.secret().to_owned());
	}

	let record = builder
		.build()
		.map_err(|source| DecodeError::Record { context: context.into(), source })?;

	Ok(record)
}

fn map_request_error<E>(
	context: &str,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	if let Some(meta) = meta.filter(ResponseMetadata::is_failure) {
		return TransportError::Status {
			context: context.into(),
			status: meta.status.unwrap_or_default(),
			description: meta.description.unwrap_or_default(),
		}
		.into();
	}

	match err {
		RequestTokenError::ServerResponse(response) => DecodeError::Unexpected {
			context: context.into(),
			message: format!("OAuth error `{}`", response.error().as_ref()),
		}
		.into(),
		RequestTokenError::Request(error) => map_transport_error(context, error),
		RequestTokenError::Parse(source, _body) =>
			DecodeError::Json { context: context.into(), source }.into(),
		RequestTokenError::Other(message) =>
			DecodeError::Unexpected { context: context.into(), message }.into(),
	}
}

fn map_transport_error<E>(context: &str, err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(context, *inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(source) =>
			TransportError::Io { context: context.into(), source }.into(),
		HttpClientError::Other(message) => TransportError::Io {
			context: context.into(),
			source: io::Error::other(message),
		}
		.into(),
		_ => TransportError::Io {
			context: context.into(),
			source: io::Error::other("HTTP client failed without details"),
		}
		.into(),
	}
}
