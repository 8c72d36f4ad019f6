//! Live services endpoints (leaderboards, maps, clubs), authorized by the `NadeoLiveServices`
//! token, plus cursors over the paginated ones.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, api, flows::Broker, http::HttpTransport, service::Service};

/// Entries requested per leaderboard page.
pub const LEADERBOARD_PAGE_LENGTH: u32 = 100;
/// Activities requested per club activity page.
pub const CLUB_ACTIVITY_PAGE_LENGTH: u32 = 5;

impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// One page of the world personal-best leaderboard of `map_uid`.
	pub async fn leaderboard_top_page(
		&self,
		map_uid: &str,
		offset: u32,
		length: u32,
	) -> Result<Value> {
		let segments =
			["api", "token", "leaderboard", "group", "Personal_Best", "map", map_uid, "top"];
		let query = format!("length={length}&onlyWorld=true&offset={offset}");
		let url = self.endpoints().segments_url(Service::Live, &segments, Some(&query))?;

		self.send(Service::Live, url, None).await
	}

	/// Cursor over the whole world leaderboard of `map_uid`, [`LEADERBOARD_PAGE_LENGTH`]
	/// entries at a time.
	pub fn leaderboard_top(&self, map_uid: impl Into<String>) -> LeaderboardTop<'_, C> {
		LeaderboardTop { broker: self, map_uid: map_uid.into(), offset: 0, done: false }
	}

	/// Details of the given maps.
	pub async fn maps_info<S>(&self, map_uids: &[S]) -> Result<Value>
	where
		S: AsRef<str>,
	{
		let path = format!("/api/token/map/get-multiple?mapUidList={}", api::join_ids(map_uids));

		self.get(Service::Live, &path).await
	}

	/// Details of one club campaign.
	pub async fn club_campaign(&self, club_id: u64, campaign_id: u64) -> Result<Value> {
		self.get(Service::Live, &format!("/api/token/club/{club_id}/campaign/{campaign_id}")).await
	}

	/// One page of a club's active activities.
	pub async fn club_activities_page(
		&self,
		club_id: u64,
		offset: u32,
		length: u32,
	) -> Result<Value> {
		let path = format!(
			"/api/token/club/{club_id}/activity?length={length}&offset={offset}&active=true"
		);

		self.get(Service::Live, &path).await
	}

	/// Cursor over every active activity of a club, [`CLUB_ACTIVITY_PAGE_LENGTH`] at a time.
	pub fn club_activities(&self, club_id: u64) -> ClubActivities<'_, C> {
		ClubActivities { broker: self, club_id, offset: 0, done: false }
	}
}

/// Pages through a map's world leaderboard.
///
/// Iteration stops after the first page holding fewer than [`LEADERBOARD_PAGE_LENGTH`] entries.
pub struct LeaderboardTop<'a, C>
where
	C: ?Sized + HttpTransport,
{
	broker: &'a Broker<C>,
	map_uid: String,
	offset: u32,
	done: bool,
}
impl<C> LeaderboardTop<'_, C>
where
	C: ?Sized + HttpTransport,
{
	/// Fetches the next page, or `None` once the leaderboard is exhausted.
	///
	/// A failed fetch leaves the cursor in place, so calling again retries the same page.
	pub async fn next_page(&mut self) -> Result<Option<Value>> {
		if self.done {
			return Ok(None);
		}

		let page = self
			.broker
			.leaderboard_top_page(&self.map_uid, self.offset, LEADERBOARD_PAGE_LENGTH)
			.await?;
		let count = page["tops"][0]["top"].as_array().map_or(0, Vec::len);

		self.offset += LEADERBOARD_PAGE_LENGTH;
		self.done = count < LEADERBOARD_PAGE_LENGTH as usize;

		Ok(Some(page))
	}

	/// Offset of the next page.
	pub fn offset(&self) -> u32 {
		self.offset
	}
}
impl<C> Debug for LeaderboardTop<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LeaderboardTop")
			.field("map_uid", &self.map_uid)
			.field("offset", &self.offset)
			.field("done", &self.done)
			.finish()
	}
}

/// Pages through a club's active activities.
///
/// Iteration stops once the offset reaches the `itemCount` reported by the last page.
pub struct ClubActivities<'a, C>
where
	C: ?Sized + HttpTransport,
{
	broker: &'a Broker<C>,
	club_id: u64,
	offset: u32,
	done: bool,
}
impl<C> ClubActivities<'_, C>
where
	C: ?Sized + HttpTransport,
{
	/// Fetches the next page, or `None` once every activity was returned.
	///
	/// A failed fetch leaves the cursor in place, so calling again retries the same page.
	pub async fn next_page(&mut self) -> Result<Option<Value>> {
		if self.done {
			return Ok(None);
		}

		let page = self
			.broker
			.club_activities_page(self.club_id, self.offset, CLUB_ACTIVITY_PAGE_LENGTH)
			.await?;
		let item_count = page["itemCount"].as_u64().unwrap_or_default();

		self.offset += CLUB_ACTIVITY_PAGE_LENGTH;
		self.done = u64::from(self.offset) >= item_count;

		Ok(Some(page))
	}

	/// Offset of the next page.
	pub fn offset(&self) -> u32 {
		self.offset
	}
}
impl<C> Debug for ClubActivities<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClubActivities")
			.field("club_id", &self.club_id)
			.field("offset", &self.offset)
			.field("done", &self.done)
			.finish()
	}
}
