// std
use std::time::Duration as StdDuration;
// self
use crate::{auth::TokenFamily, obs::FlowOutcome};

/// Records a refresh outcome via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(family: TokenFamily, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"nadeo_broker_refresh_total",
			"family" => family.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (family, outcome);
	}
}

/// Records how long a caller waited for its turn in the request queue.
pub fn record_queue_wait(waited: StdDuration) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!("nadeo_broker_queue_wait_seconds").record(waited.as_secs_f64());
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = waited;
	}
}
