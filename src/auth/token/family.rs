//! Token family classification.

// self
use crate::_prelude::*;

/// One of the three independent bearer-credential lifecycles managed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFamily {
	/// Core services token (`NadeoServices` audience).
	NadeoServices,
	/// Live services token (`NadeoLiveServices` audience).
	NadeoLiveServices,
	/// Public API token minted through the OAuth client-credentials grant.
	OAuth,
}
impl TokenFamily {
	/// Every family, in slot order.
	pub const ALL: [Self; 3] = [Self::NadeoServices, Self::NadeoLiveServices, Self::OAuth];

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::NadeoServices => "nadeo_services",
			Self::NadeoLiveServices => "nadeo_live_services",
			Self::OAuth => "oauth",
		}
	}

	/// Audience sent to the Nadeo token endpoint; `None` for OAuth.
	pub const fn audience(self) -> Option<&'static str> {
		match self {
			Self::NadeoServices => Some("NadeoServices"),
			Self::NadeoLiveServices => Some("NadeoLiveServices"),
			Self::OAuth => None,
		}
	}

	/// Name of the upstream call that mints this family's token.
	pub const fn refresh_context(self) -> &'static str {
		match self {
			Self::NadeoServices => "nadeo_services_token",
			Self::NadeoLiveServices => "nadeo_live_services_token",
			Self::OAuth => "oauth_token",
		}
	}

	pub(crate) const fn index(self) -> usize {
		match self {
			Self::NadeoServices => 0,
			Self::NadeoLiveServices => 1,
			Self::OAuth => 2,
		}
	}
}
impl Display for TokenFamily {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
