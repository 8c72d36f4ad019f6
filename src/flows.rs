//! Token broker: credentials, the token cache, and the refresh flows for every family.

pub(crate) mod common;

mod client_credentials;
mod nadeo;

pub use nadeo::UbiTicket;

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::http::HeaderValue;
// self
use crate::{
	_prelude::*,
	auth::{NadeoCredentials, OAuthCredentials, Secret, TokenFamily, TokenRecord},
	error::ConfigError,
	http::HttpTransport,
	queue::RequestQueue,
	service::ServiceEndpoints,
	store::TokenCache,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, queue::DEFAULT_RATE_LIMIT};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport.
pub type ReqwestBroker = Broker<ReqwestHttpClient>;

/// Hands out bearer tokens for the three token families and refreshes them on demand.
///
/// Every upstream call the broker makes, refreshes included, goes through one shared
/// [`RequestQueue`]. Clones share the queue, the cache, and the single-flight guards, so a
/// refresh started through one clone is observed by all of them.
pub struct Broker<C>
where
	C: ?Sized + HttpTransport,
{
	queue: Arc<RequestQueue<C>>,
	endpoints: ServiceEndpoints,
	user_agent: HeaderValue,
	nadeo_credentials: Option<NadeoCredentials>,
	oauth_credentials: Option<OAuthCredentials>,
	cache: Arc<TokenCache>,
	flow_guards: Arc<[AsyncMutex<()>; 3]>,
}
impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a broker over an existing (possibly shared) request queue.
	///
	/// Endpoints default to production; no credentials are configured.
	pub fn with_request_queue(queue: Arc<RequestQueue<C>>, user_agent: &str) -> Result<Self> {
		let user_agent = HeaderValue::from_str(user_agent)
			.map_err(|source| ConfigError::InvalidHeader { name: "User-Agent", source })?;

		Ok(Self {
			queue,
			endpoints: ServiceEndpoints::production().map_err(ConfigError::from)?,
			user_agent,
			nadeo_credentials: None,
			oauth_credentials: None,
			cache: Default::default(),
			flow_guards: Default::default(),
		})
	}

	/// Creates a broker with its own queue around `http_client`, spacing dispatches by `limit`.
	pub fn with_http_client(
		http_client: impl Into<Arc<C>>,
		limit: StdDuration,
		user_agent: &str,
	) -> Result<Self> {
		Self::with_request_queue(Arc::new(RequestQueue::new(http_client, limit)), user_agent)
	}

	/// Sets the Ubisoft account used by both Nadeo token families.
	pub fn with_nadeo_credentials(mut self, credentials: NadeoCredentials) -> Self {
		self.nadeo_credentials = Some(credentials);

		self
	}

	/// Sets the OAuth client used by the OAuth token family.
	pub fn with_oauth_credentials(mut self, credentials: OAuthCredentials) -> Self {
		self.oauth_credentials = Some(credentials);

		self
	}

	/// Replaces the endpoint set.
	pub fn with_endpoints(mut self, endpoints: ServiceEndpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Shared request queue.
	pub fn queue(&self) -> &Arc<RequestQueue<C>> {
		&self.queue
	}

	/// Active endpoint set.
	pub fn endpoints(&self) -> &ServiceEndpoints {
		&self.endpoints
	}

	/// `User-Agent` sent with every request.
	pub fn user_agent(&self) -> &HeaderValue {
		&self.user_agent
	}

	/// Returns a token for `family`, refreshing it first when the cached one has expired.
	pub async fn token(&self, family: TokenFamily) -> Result<Secret> {
		match family {
			TokenFamily::NadeoServices => self.nadeo_services_token().await,
			TokenFamily::NadeoLiveServices => self.nadeo_live_services_token().await,
			TokenFamily::OAuth => self.oauth_token().await,
		}
	}

	/// Cached record for `family`, whether or not it is still active.
	pub fn cached_token(&self, family: TokenFamily) -> Option<TokenRecord> {
		self.cache.fetch(family)
	}

	/// Places `record` in its family's slot, replacing whatever was cached.
	pub fn seed_token(&self, record: TokenRecord) {
		self.cache.save(record);
	}

	/// Drops the cached record for `family` so the next call refreshes it.
	pub fn invalidate_token(&self, family: TokenFamily) -> Option<TokenRecord> {
		self.cache.clear(family)
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient> {
	/// Creates a broker with the default reqwest transport, production endpoints, and
	/// [`DEFAULT_RATE_LIMIT`] spacing.
	///
	/// Attach credentials with [`Broker::with_nadeo_credentials`] and
	/// [`Broker::with_oauth_credentials`].
	pub fn new(user_agent: &str) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Self::with_http_client(
			ReqwestHttpClient::with_client(client),
			DEFAULT_RATE_LIMIT,
			user_agent,
		)
	}
}
impl<C> Clone for Broker<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			queue: self.queue.clone(),
			endpoints: self.endpoints.clone(),
			user_agent: self.user_agent.clone(),
			nadeo_credentials: self.nadeo_credentials.clone(),
			oauth_credentials: self.oauth_credentials.clone(),
			cache: self.cache.clone(),
			flow_guards: self.flow_guards.clone(),
		}
	}
}
impl<C> Debug for Broker<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("queue", &self.queue)
			.field("endpoints", &self.endpoints)
			.field("user_agent", &self.user_agent)
			.field("nadeo_credentials_set", &self.nadeo_credentials.is_some())
			.field("oauth_credentials_set", &self.oauth_credentials.is_some())
			.finish()
	}
}
