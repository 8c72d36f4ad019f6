//! Async client core for the Ubisoft/Nadeo Trackmania web services: three self-refreshing token
//! families and typed domain requests behind one FIFO, rate-limited request queue.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod queue;
pub mod service;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::time::Duration as StdDuration;
	// self
	use crate::{
		auth::{NadeoCredentials, OAuthCredentials},
		flows::Broker,
		http::ReqwestHttpClient,
		service::ServiceEndpoints,
	};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = Broker<ReqwestHttpClient>;

	/// Login used by [`build_reqwest_test_broker`].
	pub const TEST_LOGIN: &str = "player@example.com";
	/// Password used by [`build_reqwest_test_broker`].
	pub const TEST_PASSWORD: &str = "hunter2";
	/// OAuth client identifier used by [`build_reqwest_test_broker`].
	pub const TEST_CLIENT_ID: &str = "client-id";
	/// OAuth client secret used by [`build_reqwest_test_broker`].
	pub const TEST_CLIENT_SECRET: &str = "client-secret";
	/// Queue spacing used by [`build_reqwest_test_broker`].
	pub const TEST_RATE_LIMIT: StdDuration = StdDuration::from_millis(10);

	/// Builds a reqwest HTTP client suited to the plain-HTTP `httpmock` servers used in tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.no_proxy()
			.build()
			.expect("Failed to build Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Endpoint set routing every service and token endpoint to `base_url`.
	pub fn test_endpoints(base_url: &str) -> ServiceEndpoints {
		let base = Url::parse(base_url).expect("Mock server URL should parse.");

		ServiceEndpoints::builder()
			.all_at(&base)
			.expect("Mock server URL should rebase the endpoints.")
			.build()
			.expect("Mock endpoints should validate.")
	}

	/// Constructs a [`Broker`] with both credential sets, a short queue spacing, and every
	/// endpoint pointed at `base_url`.
	pub fn build_reqwest_test_broker(base_url: &str) -> ReqwestTestBroker {
		Broker::with_http_client(test_reqwest_http_client(), TEST_RATE_LIMIT, "nadeo-broker-tests")
			.expect("Test user agent should be a valid header value.")
			.with_endpoints(test_endpoints(base_url))
			.with_nadeo_credentials(NadeoCredentials::new(TEST_LOGIN, TEST_PASSWORD))
			.with_oauth_credentials(OAuthCredentials::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET))
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
