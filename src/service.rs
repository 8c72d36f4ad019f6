//! Service catalogue: which host serves which API, and which token each one expects.

/// Builder API for assembling endpoint sets.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::TokenFamily, error::ConfigError};

/// Production Ubisoft session endpoint.
pub const UBI_SESSION_URL: &str = "https://public-ubiservices.ubi.com/v3/profiles/sessions";
/// Production Nadeo token endpoint.
pub const NADEO_TOKEN_URL: &str =
	"https://prod.trackmania.core.nadeo.online/v2/authentication/token/ubiservices";
/// Production OAuth token endpoint.
pub const OAUTH_TOKEN_URL: &str = "https://api.trackmania.com/api/access_token";
/// Production Core services base URL.
pub const CORE_BASE_URL: &str = "https://prod.trackmania.core.nadeo.online";
/// Production Live services base URL.
pub const LIVE_BASE_URL: &str = "https://live-services.trackmania.nadeo.live";
/// Production public API base URL.
pub const OAUTH_BASE_URL: &str = "https://api.trackmania.com";
/// Application id sent to the Ubisoft session endpoint.
pub const UBI_APP_ID: &str = "86263886-327a-4328-ac69-527f0d20a237";

/// API surfaces reachable through the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
	/// Core services (accounts, records), authorized by the `NadeoServices` token.
	Core,
	/// Live services (leaderboards, clubs, maps), authorized by the `NadeoLiveServices` token.
	Live,
	/// Public OAuth API (display names), authorized by the OAuth token.
	OAuth,
}
impl Service {
	/// Token family the service expects.
	pub const fn token_family(self) -> TokenFamily {
		match self {
			Self::Core => TokenFamily::NadeoServices,
			Self::Live => TokenFamily::NadeoLiveServices,
			Self::OAuth => TokenFamily::OAuth,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Core => "core",
			Self::Live => "live",
			Self::OAuth => "oauth",
		}
	}

	/// `Authorization` header value carrying `token`.
	pub fn authorization(self, token: &str) -> String {
		match self {
			Self::Core | Self::Live => format!("nadeo_v1 t={token}"),
			Self::OAuth => format!("Bearer {token}"),
		}
	}
}
impl Display for Service {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Validated endpoint set consumed by the broker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
	/// Ubisoft session endpoint that issues tickets.
	pub ubi_session: Url,
	/// Nadeo endpoint that exchanges a ticket for an audience-scoped token.
	pub nadeo_token: Url,
	/// OAuth client-credentials token endpoint.
	pub oauth_token: Url,
	/// Core services base URL.
	pub core: Url,
	/// Live services base URL.
	pub live: Url,
	/// Public API base URL.
	pub oauth: Url,
	/// Value of the `Ubi-AppId` header.
	pub ubi_app_id: String,
}
impl ServiceEndpoints {
	/// Creates a new builder; unset fields fall back to the production endpoints.
	pub fn builder() -> ServiceEndpointsBuilder {
		ServiceEndpointsBuilder::default()
	}

	/// Production endpoint set.
	pub fn production() -> Result<Self, EndpointsError> {
		Self::builder().build()
	}

	/// Base URL of `service`.
	pub fn base(&self, service: Service) -> &Url {
		match service {
			Service::Core => &self.core,
			Service::Live => &self.live,
			Service::OAuth => &self.oauth,
		}
	}

	/// Joins `path_and_query` (e.g. `/accounts/zones/?accountIdList=…`) onto the service base.
	pub fn url(&self, service: Service, path_and_query: &str) -> Result<Url> {
		let base = self.base(service).as_str().trim_end_matches('/');
		let raw = if path_and_query.starts_with('/') {
			format!("{base}{path_and_query}")
		} else {
			format!("{base}/{path_and_query}")
		};

		match Url::parse(&raw) {
			Ok(url) => Ok(url),
			Err(source) => Err(ConfigError::InvalidRequestUrl { url: raw, source }.into()),
		}
	}

	/// Appends `segments` to the service base, percent-encoding each one, then sets `query`
	/// verbatim.
	pub fn segments_url(
		&self,
		service: Service,
		segments: &[&str],
		query: Option<&str>,
	) -> Result<Url> {
		let mut url = self.base(service).clone();

		match url.path_segments_mut() {
			Ok(mut path) => {
				path.pop_if_empty().extend(segments);
			},
			Err(()) =>
				return Err(ConfigError::InvalidRequestUrl {
					url: self.base(service).to_string(),
					source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
				}
				.into()),
		}

		url.set_query(query);

		Ok(url)
	}
}
