//! Core services endpoints (accounts and map records), authorized by the `NadeoServices` token.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, api, flows::Broker, http::HttpTransport, service::Service};

impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Club tags of the given accounts.
	pub async fn club_tags<S>(&self, account_ids: &[S]) -> Result<Value>
	where
		S: AsRef<str>,
	{
		let path = format!("/accounts/clubTags/?accountIdList={}", api::join_ids(account_ids));

		self.get(Service::Core, &path).await
	}

	/// Zones of the given accounts.
	pub async fn zones<S>(&self, account_ids: &[S]) -> Result<Value>
	where
		S: AsRef<str>,
	{
		let path = format!("/accounts/zones/?accountIdList={}", api::join_ids(account_ids));

		self.get(Service::Core, &path).await
	}

	/// Records of the given accounts on the given maps.
	pub async fn map_records<A, M>(&self, account_ids: &[A], map_ids: &[M]) -> Result<Value>
	where
		A: AsRef<str>,
		M: AsRef<str>,
	{
		let path = format!(
			"/mapRecords/?accountIdList={}&mapIdList={}",
			api::join_ids(account_ids),
			api::join_ids(map_ids)
		);

		self.get(Service::Core, &path).await
	}

	/// A single map record.
	pub async fn map_record(&self, map_record_id: &str) -> Result<Value> {
		let url =
			self.endpoints().segments_url(Service::Core, &["mapRecords", map_record_id], None)?;

		self.send(Service::Core, url, None).await
	}
}
