//! OAuth client-credentials flow for the public API token.
//!
//! The form body, client authentication, and response parsing come from the `oauth2` crate;
//! the request itself is dispatched through the broker's queue like every other call.

// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenFamily},
	error::ConfigError,
	flows::{Broker, common},
	http::HttpTransport,
	oauth::ClientCredentialsFacade,
};

impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Returns the OAuth token used by the public API, running the `client_credentials` grant
	/// when the cached one has expired.
	pub async fn oauth_token(&self) -> Result<Secret> {
		const FAMILY: TokenFamily = TokenFamily::OAuth;

		common::cached_or_refresh(self, FAMILY, || async move {
			let credentials = self
				.oauth_credentials
				.as_ref()
				.ok_or(ConfigError::MissingCredentials { family: FAMILY })?;
			let facade = ClientCredentialsFacade::new(credentials, &self.endpoints.oauth_token);

			facade.exchange(self.queue.clone(), self.user_agent.clone()).await
		})
		.await
	}
}
