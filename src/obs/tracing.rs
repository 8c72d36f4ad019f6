// self
use crate::{_prelude::*, auth::TokenFamily};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by token flows and the request queue.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a refresh span tagged with the token family + stage.
	pub fn new(family: TokenFamily, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("nadeo_broker.flow", family = family.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (family, stage);

			Self {}
		}
	}

	/// Creates a dispatch span for the request queue.
	pub fn queue(method: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!("nadeo_broker.queue", method);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = method;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}
