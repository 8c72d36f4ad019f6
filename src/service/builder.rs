// self
use crate::{
	_prelude::*,
	service::{
		CORE_BASE_URL, LIVE_BASE_URL, NADEO_TOKEN_URL, OAUTH_BASE_URL, OAUTH_TOKEN_URL,
		ServiceEndpoints, UBI_APP_ID, UBI_SESSION_URL,
	},
};

/// Errors raised while constructing or validating endpoint sets.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum EndpointsError {
	/// A default endpoint string failed to parse.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidUrl {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS unless they point at the local machine.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Base URLs cannot carry a query or fragment.
	#[error("The {endpoint} base URL must not carry a query or fragment: {url}.")]
	DecoratedBase {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The Ubisoft application id is empty.
	#[error("The Ubi-AppId value must not be empty.")]
	EmptyAppId,
}

/// Builder for [`ServiceEndpoints`] values.
#[derive(Debug, Default)]
pub struct ServiceEndpointsBuilder {
	/// Ubisoft session endpoint override.
	pub ubi_session: Option<Url>,
	/// Nadeo token endpoint override.
	pub nadeo_token: Option<Url>,
	/// OAuth token endpoint override.
	pub oauth_token: Option<Url>,
	/// Core base URL override.
	pub core: Option<Url>,
	/// Live base URL override.
	pub live: Option<Url>,
	/// Public API base URL override.
	pub oauth: Option<Url>,
	/// `Ubi-AppId` override.
	pub ubi_app_id: Option<String>,
}
impl ServiceEndpointsBuilder {
	/// Sets the Ubisoft session endpoint.
	pub fn ubi_session(mut self, url: Url) -> Self {
		self.ubi_session = Some(url);

		self
	}

	/// Sets the Nadeo token endpoint.
	pub fn nadeo_token(mut self, url: Url) -> Self {
		self.nadeo_token = Some(url);

		self
	}

	/// Sets the OAuth token endpoint.
	pub fn oauth_token(mut self, url: Url) -> Self {
		self.oauth_token = Some(url);

		self
	}

	/// Sets the Core services base URL.
	pub fn core(mut self, url: Url) -> Self {
		self.core = Some(url);

		self
	}

	/// Sets the Live services base URL.
	pub fn live(mut self, url: Url) -> Self {
		self.live = Some(url);

		self
	}

	/// Sets the public API base URL.
	pub fn oauth(mut self, url: Url) -> Self {
		self.oauth = Some(url);

		self
	}

	/// Sets the `Ubi-AppId` header value.
	pub fn ubi_app_id(mut self, app_id: impl Into<String>) -> Self {
		self.ubi_app_id = Some(app_id.into());

		self
	}

	/// Routes every endpoint to `base`. Token endpoints append their production paths to the
	/// path of `base`, so a prefixed proxy base stays prefixed everywhere.
	///
	/// Handy for pointing the broker at a single mock server or proxy.
	pub fn all_at(self, base: &Url) -> Result<Self, EndpointsError> {
		let rebase = |endpoint: &'static str, production: &str| -> Result<Url, EndpointsError> {
			let production = parse(endpoint, production)?;
			let mut url = base.clone();

			match url.path_segments_mut() {
				Ok(mut segments) => {
					segments
						.pop_if_empty()
						.extend(production.path_segments().into_iter().flatten());
				},
				Err(()) =>
					return Err(EndpointsError::InvalidUrl {
						endpoint,
						source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
					}),
			}

			Ok(url)
		};

		Ok(Self {
			ubi_session: Some(rebase("ubi_session", UBI_SESSION_URL)?),
			nadeo_token: Some(rebase("nadeo_token", NADEO_TOKEN_URL)?),
			oauth_token: Some(rebase("oauth_token", OAUTH_TOKEN_URL)?),
			core: Some(base.clone()),
			live: Some(base.clone()),
			oauth: Some(base.clone()),
			ubi_app_id: self.ubi_app_id,
		})
	}

	/// Consumes the builder and validates the resulting endpoint set.
	pub fn build(self) -> Result<ServiceEndpoints, EndpointsError> {
		let endpoints = ServiceEndpoints {
			ubi_session: or_default(self.ubi_session, "ubi_session", UBI_SESSION_URL)?,
			nadeo_token: or_default(self.nadeo_token, "nadeo_token", NADEO_TOKEN_URL)?,
			oauth_token: or_default(self.oauth_token, "oauth_token", OAUTH_TOKEN_URL)?,
			core: or_default(self.core, "core", CORE_BASE_URL)?,
			live: or_default(self.live, "live", LIVE_BASE_URL)?,
			oauth: or_default(self.oauth, "oauth", OAUTH_BASE_URL)?,
			ubi_app_id: self.ubi_app_id.unwrap_or_else(|| UBI_APP_ID.to_owned()),
		};

		endpoints.validate()?;

		Ok(endpoints)
	}
}

impl ServiceEndpoints {
	/// Validates invariants for the endpoint set.
	fn validate(&self) -> Result<(), EndpointsError> {
		validate_endpoint("ubi_session", &self.ubi_session)?;
		validate_endpoint("nadeo_token", &self.nadeo_token)?;
		validate_endpoint("oauth_token", &self.oauth_token)?;

		let bases = [("core", &self.core), ("live", &self.live), ("oauth", &self.oauth)];

		for (endpoint, url) in bases {
			validate_endpoint(endpoint, url)?;

			if url.query().is_some() || url.fragment().is_some() {
				return Err(EndpointsError::DecoratedBase { endpoint, url: url.to_string() });
			}
		}

		if self.ubi_app_id.trim().is_empty() {
			return Err(EndpointsError::EmptyAppId);
		}

		Ok(())
	}
}

fn parse(endpoint: &'static str, raw: &str) -> Result<Url, EndpointsError> {
	Url::parse(raw).map_err(|source| EndpointsError::InvalidUrl { endpoint, source })
}

fn or_default(
	value: Option<Url>,
	endpoint: &'static str,
	production: &str,
) -> Result<Url, EndpointsError> {
	match value {
		Some(url) => Ok(url),
		None => parse(endpoint, production),
	}
}

fn validate_endpoint(endpoint: &'static str, url: &Url) -> Result<(), EndpointsError> {
	let loopback = match url.host() {
		Some(url::Host::Domain(domain)) => domain == "localhost",
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	};

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(EndpointsError::InsecureEndpoint { endpoint, url: url.to_string() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse.")
	}

	#[test]
	fn unset_fields_fall_back_to_production() {
		let endpoints = ServiceEndpoints::builder()
			.live(url("https://live.example.com"))
			.build()
			.expect("Endpoint set should build.");

		assert_eq!(endpoints.live.as_str(), "https://live.example.com/");
		assert_eq!(endpoints.core.as_str(), "https://prod.trackmania.core.nadeo.online/");
		assert_eq!(endpoints.ubi_app_id, UBI_APP_ID);
	}

	#[test]
	fn plain_http_is_only_allowed_on_loopback() {
		let err = ServiceEndpoints::builder()
			.core(url("http://example.com"))
			.build()
			.expect_err("Plain HTTP on a public host should be rejected.");

		assert!(matches!(err, EndpointsError::InsecureEndpoint { endpoint: "core", .. }));

		ServiceEndpoints::builder()
			.core(url("http://127.0.0.1:8080"))
			.live(url("http://localhost:8080"))
			.build()
			.expect("Loopback endpoints should be accepted.");
	}

	#[test]
	fn base_urls_reject_queries_and_blank_app_ids() {
		let err = ServiceEndpoints::builder()
			.oauth(url("https://api.example.com/?debug=1"))
			.build()
			.expect_err("Base URLs with queries should be rejected.");

		assert!(matches!(err, EndpointsError::DecoratedBase { endpoint: "oauth", .. }));

		let err = ServiceEndpoints::builder()
			.ubi_app_id(" ")
			.build()
			.expect_err("Blank app ids should be rejected.");

		assert_eq!(err, EndpointsError::EmptyAppId);
	}

	#[test]
	fn all_at_keeps_token_paths() {
		let endpoints = ServiceEndpoints::builder()
			.all_at(&url("http://127.0.0.1:9000"))
			.expect("Rebasing should succeed.")
			.build()
			.expect("Rebased endpoints should build.");

		assert_eq!(endpoints.ubi_session.as_str(), "http://127.0.0.1:9000/v3/profiles/sessions");
		assert_eq!(
			endpoints.nadeo_token.as_str(),
			"http://127.0.0.1:9000/v2/authentication/token/ubiservices"
		);
		assert_eq!(endpoints.oauth_token.as_str(), "http://127.0.0.1:9000/api/access_token");
		assert_eq!(endpoints.live.as_str(), "http://127.0.0.1:9000/");
	}

	#[test]
	fn all_at_keeps_base_path_prefix() {
		let endpoints = ServiceEndpoints::builder()
			.all_at(&url("http://127.0.0.1:9000/proxy/"))
			.expect("Rebasing should succeed.")
			.build()
			.expect("Rebased endpoints should build.");

		assert_eq!(
			endpoints.ubi_session.as_str(),
			"http://127.0.0.1:9000/proxy/v3/profiles/sessions"
		);
		assert_eq!(
			endpoints.oauth_token.as_str(),
			"http://127.0.0.1:9000/proxy/api/access_token"
		);
		assert_eq!(endpoints.core.as_str(), "http://127.0.0.1:9000/proxy/");

		let zones = endpoints
			.url(crate::service::Service::Core, "/accounts/zones/")
			.expect("Request URL should build.");

		assert_eq!(zones.as_str(), "http://127.0.0.1:9000/proxy/accounts/zones/");
	}
}
