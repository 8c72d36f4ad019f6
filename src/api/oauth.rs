//! Public API endpoints, authorized by the OAuth token.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, flows::Broker, http::HttpTransport, service::Service};

impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Display names of the given accounts, keyed by account id.
	pub async fn display_names<S>(&self, account_ids: &[S]) -> Result<Value>
	where
		S: AsRef<str>,
	{
		let query = account_ids
			.iter()
			.map(|id| format!("accountId[]={}", id.as_ref()))
			.collect::<Vec<_>>()
			.join("&");

		self.get(Service::OAuth, &format!("/api/display-names?{query}")).await
	}
}
