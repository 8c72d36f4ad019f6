//! Optional observability helpers for token refreshes and queued dispatches.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `nadeo_broker.flow` (fields `family` and
//!   `stage`) around token refreshes and `nadeo_broker.queue` (field `method`) around dispatches.
//! - Enable `metrics` to increment the `nadeo_broker_refresh_total` counter for every
//!   attempt/success/failure, labeled by `family` + `outcome`, and to record queue waits in the
//!   `nadeo_broker_queue_wait_seconds` histogram.
//!
//! Without either feature the helpers compile to no-ops and the crate emits nothing.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Outcome labels recorded for each refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// A refresh sequence started.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
