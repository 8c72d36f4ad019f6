//! In-process token cache holding one slot per token family.
//!
//! Slots are replaced wholesale by [`TokenCache::save`]; a refresh that fails never reaches the
//! cache, so readers observe either the previous record or the new one. The lock is a short
//! synchronous [`RwLock`] and is never held across an `.await`.

// self
use crate::{
	_prelude::*,
	auth::{TokenFamily, TokenRecord},
};

/// Named token slots, one per family.
#[derive(Clone, Debug, Default)]
pub struct TokenSlots {
	/// `NadeoServices` slot.
	pub nadeo_services: Option<TokenRecord>,
	/// `NadeoLiveServices` slot.
	pub nadeo_live_services: Option<TokenRecord>,
	/// OAuth slot.
	pub oauth: Option<TokenRecord>,
}
impl TokenSlots {
	/// Borrows the slot owned by `family`.
	pub fn slot(&self, family: TokenFamily) -> &Option<TokenRecord> {
		match family {
			TokenFamily::NadeoServices => &self.nadeo_services,
			TokenFamily::NadeoLiveServices => &self.nadeo_live_services,
			TokenFamily::OAuth => &self.oauth,
		}
	}

	fn slot_mut(&mut self, family: TokenFamily) -> &mut Option<TokenRecord> {
		match family {
			TokenFamily::NadeoServices => &mut self.nadeo_services,
			TokenFamily::NadeoLiveServices => &mut self.nadeo_live_services,
			TokenFamily::OAuth => &mut self.oauth,
		}
	}
}

/// Thread-safe cache shared by every clone of a broker.
#[derive(Debug, Default)]
pub struct TokenCache(RwLock<TokenSlots>);
impl TokenCache {
	/// Returns a copy of the record cached for `family`, active or not.
	pub fn fetch(&self, family: TokenFamily) -> Option<TokenRecord> {
		self.0.read().slot(family).clone()
	}

	/// Returns the record cached for `family` if it is still active at `now`.
	pub fn fetch_active(&self, family: TokenFamily, now: OffsetDateTime) -> Option<TokenRecord> {
		self.0.read().slot(family).as_ref().filter(|record| record.is_active_at(now)).cloned()
	}

	/// Replaces the slot named by `record.family`.
	pub fn save(&self, record: TokenRecord) {
		let family = record.family;

		*self.0.write().slot_mut(family) = Some(record);
	}

	/// Empties the slot owned by `family`, returning the evicted record.
	pub fn clear(&self, family: TokenFamily) -> Option<TokenRecord> {
		self.0.write().slot_mut(family).take()
	}

	/// Copies every slot at once.
	pub fn snapshot(&self) -> TokenSlots {
		self.0.read().clone()
	}
}
