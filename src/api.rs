//! Authenticated JSON requests against the Core, Live, and public OAuth APIs.
//!
//! [`Broker::get`] and [`Broker::post`] fetch the token the target [`Service`] expects, attach
//! it with the service's authorization scheme, send the request through the shared queue, and
//! decode the JSON body. The submodules wrap individual endpoints on top of them.

pub mod core;
pub mod live;
pub mod oauth;

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::{Broker, common},
	http::HttpTransport,
	service::Service,
};

impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Sends an authenticated `GET` for `path_and_query` (e.g. `/mapRecords/<id>`) and decodes
	/// the JSON response into `T`.
	///
	/// Use [`serde_json::Value`] for `T` to keep the response untyped.
	pub async fn get<T>(&self, service: Service, path_and_query: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let url = self.endpoints().url(service, path_and_query)?;

		self.send(service, url, None).await
	}

	/// Sends an authenticated `POST` carrying `body` as JSON and decodes the JSON response.
	pub async fn post<T, B>(&self, service: Service, path_and_query: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		let body =
			serde_json::to_vec(body).map_err(|source| ConfigError::InvalidBody { source })?;
		let url = self.endpoints().url(service, path_and_query)?;

		self.send(service, url, Some(body)).await
	}

	pub(crate) async fn send<T>(
		&self,
		service: Service,
		url: Url,
		body: Option<Vec<u8>>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let method = if body.is_some() { "POST" } else { "GET" };
		let context = format!("{method} {url}");
		let token = self.token(service.token_family()).await?;
		let mut request = common::json_request(self, &url)?;

		common::authorize(&mut request, &service.authorization(token.expose()))?;

		let response = common::dispatch(self, &context, request, body).await?;

		common::decode_json(&context, &response)
	}
}

/// Joins identifiers into the comma-separated lists the services expect.
pub(crate) fn join_ids<S>(ids: &[S]) -> String
where
	S: AsRef<str>,
{
	ids.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
}
