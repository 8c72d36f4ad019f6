//! FIFO request queue enforcing a minimum spacing between outbound dispatches.
//!
//! Every request the broker sends (ticket acquisition, token refreshes, domain calls) goes
//! through one [`RequestQueue`]. The queue keeps a single gate: the earliest instant at which
//! the next request may be dispatched. Callers take the gate in arrival order (tokio's mutex is
//! FIFO-fair), sleep until the gate opens if it is armed, re-arm it for `limit`, and release
//! it before the transport call starts so the call overlaps with later callers' waits.

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::http::Method;
use tokio::{
	sync::Mutex as GateMutex,
	time::{self as tokio_time, Instant},
};
// self
use crate::{
	_prelude::*,
	http::{HttpRequest, HttpResponse, HttpTransport},
	obs::{self, FlowSpan},
};

/// Spacing used by [`Broker::new`](crate::flows::Broker::new); the services publish no limit.
pub const DEFAULT_RATE_LIMIT: StdDuration = StdDuration::from_millis(500);

/// Single-slot, FIFO-fair gate in front of an [`HttpTransport`].
///
/// Requires a tokio runtime with the time driver enabled.
pub struct RequestQueue<C>
where
	C: ?Sized + HttpTransport,
{
	http_client: Arc<C>,
	limit: StdDuration,
	next_dispatch: GateMutex<Option<Instant>>,
}
impl<C> RequestQueue<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a queue that spaces dispatches at least `limit` apart.
	pub fn new(http_client: impl Into<Arc<C>>, limit: StdDuration) -> Self {
		Self { http_client: http_client.into(), limit, next_dispatch: GateMutex::new(None) }
	}

	/// Minimum spacing between two dispatches.
	pub fn limit(&self) -> StdDuration {
		self.limit
	}

	/// Transport behind the queue.
	pub fn http_client(&self) -> &Arc<C> {
		&self.http_client
	}

	/// Waits for this caller's turn, then dispatches `request` as a `GET` without a body.
	pub async fn submit_get(
		&self,
		mut request: HttpRequest,
	) -> Result<HttpResponse, C::TransportError> {
		*request.method_mut() = Method::GET;
		request.body_mut().clear();

		self.submit(request).await
	}

	/// Waits for this caller's turn, then dispatches `request` as a `POST` carrying `body`.
	pub async fn submit_post(
		&self,
		mut request: HttpRequest,
		body: Vec<u8>,
	) -> Result<HttpResponse, C::TransportError> {
		*request.method_mut() = Method::POST;
		*request.body_mut() = body;

		self.submit(request).await
	}

	/// Waits for this caller's turn, then dispatches `request` unchanged.
	///
	/// The response is returned verbatim; status inspection is the caller's job.
	pub async fn submit(&self, request: HttpRequest) -> Result<HttpResponse, C::TransportError> {
		let span = FlowSpan::queue(request.method().as_str());

		span.instrument(async move {
			self.wait_turn().await;

			self.http_client.execute(request).await
		})
		.await
	}

	async fn wait_turn(&self) {
		let queued_at = Instant::now();
		let mut next_dispatch = self.next_dispatch.lock().await;

		match *next_dispatch {
			Some(at) if at > Instant::now() => tokio_time::sleep_until(at).await,
			_ => (),
		}

		let dispatched_at = Instant::now();

		*next_dispatch = Some(dispatched_at + self.limit);

		obs::record_queue_wait(dispatched_at - queued_at);
	}
}
impl<C> Debug for RequestQueue<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestQueue").field("limit", &self.limit).finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::convert::Infallible;
	// crates.io
	use oauth2::http::StatusCode;
	// self
	use super::*;

	#[derive(Default)]
	struct RecordingTransport {
		dispatched: Mutex<Vec<(String, Instant)>>,
	}
	impl HttpTransport for RecordingTransport {
		type TransportError = Infallible;

		fn execute(
			&self,
			request: HttpRequest,
		) -> crate::http::TransportFuture<'_, Self::TransportError> {
			self.dispatched.lock().push((request.uri().to_string(), Instant::now()));

			Box::pin(async move {
				let mut response = HttpResponse::new(request.into_body());

				*response.status_mut() = StatusCode::OK;

				Ok::<_, Infallible>(response)
			})
		}
	}

	fn request(path: &str) -> HttpRequest {
		oauth2::http::Request::builder()
			.uri(format!("https://example.com{path}"))
			.body(Vec::new())
			.expect("Fixture request should build.")
	}

	#[tokio::test(start_paused = true)]
	async fn idle_gate_dispatches_immediately() {
		let queue = RequestQueue::new(RecordingTransport::default(), StdDuration::from_secs(5));
		let started = Instant::now();

		queue.submit_get(request("/first")).await.expect("Dispatch should succeed.");

		let dispatched = queue.http_client().dispatched.lock().clone();

		assert_eq!(dispatched.len(), 1);
		assert_eq!(dispatched[0].1, started);
	}

	#[tokio::test(start_paused = true)]
	async fn post_carries_body() {
		let queue = RequestQueue::new(RecordingTransport::default(), DEFAULT_RATE_LIMIT);
		let response = queue
			.submit_post(request("/echo"), b"{\"audience\":\"NadeoServices\"}".to_vec())
			.await
			.expect("Dispatch should succeed.");

		assert_eq!(response.body().as_slice(), b"{\"audience\":\"NadeoServices\"}");
	}

	#[tokio::test(start_paused = true)]
	async fn idle_again_after_limit_elapses() {
		let limit = StdDuration::from_millis(200);
		let queue = RequestQueue::new(RecordingTransport::default(), limit);

		queue.submit_get(request("/a")).await.expect("Dispatch should succeed.");
		tokio_time::advance(StdDuration::from_secs(1)).await;

		let before = Instant::now();

		queue.submit_get(request("/b")).await.expect("Dispatch should succeed.");

		let dispatched = queue.http_client().dispatched.lock().clone();

		assert_eq!(dispatched[1].1, before);
	}
}
