// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::Arc,
	time::Duration,
};
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::Mutex;
use time::OffsetDateTime;
use tokio::time::{self as tokio_time, Instant};
// self
use nadeo_broker::{
	auth::NadeoCredentials,
	flows::Broker,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	oauth::oauth2::http::{Request, StatusCode},
	queue::{DEFAULT_RATE_LIMIT, RequestQueue},
};

#[derive(Debug, PartialEq, Eq)]
enum FakeTransportError {
	ConnectionReset,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::ConnectionReset => write!(f, "Connection reset."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Default)]
struct FakeTransport {
	dispatched: Mutex<Vec<(String, Instant)>>,
	latency: Duration,
	fail: bool,
	routes: Vec<(&'static str, String)>,
}
impl FakeTransport {
	fn with_latency(latency: Duration) -> Self {
		Self { latency, ..Default::default() }
	}

	fn failing() -> Self {
		Self { fail: true, ..Default::default() }
	}

	fn nadeo() -> Self {
		let exp = OffsetDateTime::now_utc().unix_timestamp() + 3_600;
		let claims = URL_SAFE_NO_PAD.encode(format!("{{\"exp\":{exp}}}"));
		let token = format!("{{\"accessToken\":\"header.{claims}.signature\"}}");

		Self {
			routes: vec![
				("/v3/profiles/sessions", "{\"ticket\":\"ticket-1\"}".into()),
				("/v2/authentication/token/ubiservices", token),
			],
			..Default::default()
		}
	}

	fn dispatched(&self) -> Vec<(String, Instant)> {
		self.dispatched.lock().clone()
	}
}
impl HttpTransport for FakeTransport {
	type TransportError = FakeTransportError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let path = request.uri().path().to_owned();
		let body = self
			.routes
			.iter()
			.find(|(route, _)| *route == path)
			.map(|(_, body)| body.clone())
			.unwrap_or_else(|| "{}".into());
		let latency = self.latency;
		let fail = self.fail;

		self.dispatched.lock().push((path, Instant::now()));

		Box::pin(async move {
			if !latency.is_zero() {
				tokio_time::sleep(latency).await;
			}
			if fail {
				return Err(FakeTransportError::ConnectionReset);
			}

			let mut response = HttpResponse::new(body.into_bytes());

			*response.status_mut() = StatusCode::OK;

			Ok(response)
		})
	}
}

fn request(path: &str) -> HttpRequest {
	Request::builder()
		.uri(format!("https://example.com{path}"))
		.body(Vec::new())
		.expect("Fixture request should build.")
}

fn assert_spaced(dispatched: &[(String, Instant)], limit: Duration) {
	for pair in dispatched.windows(2) {
		assert!(
			pair[1].1 - pair[0].1 >= limit,
			"{} was dispatched less than {limit:?} after {}.",
			pair[1].0,
			pair[0].0
		);
	}
}

#[tokio::test(start_paused = true)]
async fn dispatches_are_spaced_in_arrival_order() {
	let queue = Arc::new(RequestQueue::new(FakeTransport::default(), DEFAULT_RATE_LIMIT));
	let started = Instant::now();
	let handles = (0..5)
		.map(|idx| {
			let queue = queue.clone();

			tokio::spawn(async move { queue.submit_get(request(&format!("/r{idx}"))).await })
		})
		.collect::<Vec<_>>();

	for handle in handles {
		handle.await.expect("Dispatch task should not panic.").expect("Dispatch should succeed.");
	}

	let dispatched = queue.http_client().dispatched();
	let paths = dispatched.iter().map(|(path, _)| path.as_str()).collect::<Vec<_>>();

	assert_eq!(paths, ["/r0", "/r1", "/r2", "/r3", "/r4"]);
	assert_eq!(dispatched[0].1, started);
	assert_spaced(&dispatched, DEFAULT_RATE_LIMIT);
	assert!(dispatched[4].1 - started < DEFAULT_RATE_LIMIT * 4 + Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn idle_queue_dispatches_without_delay() {
	let queue = RequestQueue::new(FakeTransport::default(), DEFAULT_RATE_LIMIT);

	queue.submit_get(request("/first")).await.expect("Dispatch should succeed.");
	tokio_time::sleep(Duration::from_secs(2)).await;

	let idle_since = Instant::now();

	queue
		.submit_post(request("/second"), b"{}".to_vec())
		.await
		.expect("Dispatch should succeed.");

	let dispatched = queue.http_client().dispatched();

	assert_eq!(dispatched[1].1, idle_since);
}

#[tokio::test(start_paused = true)]
async fn transport_latency_does_not_hold_the_gate() {
	let latency = Duration::from_secs(2);
	let transport = FakeTransport::with_latency(latency);
	let queue = Arc::new(RequestQueue::new(transport, DEFAULT_RATE_LIMIT));
	let started = Instant::now();
	let first = tokio::spawn({
		let queue = queue.clone();

		async move { queue.submit_get(request("/slow-1")).await }
	});
	let second = tokio::spawn({
		let queue = queue.clone();

		async move { queue.submit_get(request("/slow-2")).await }
	});

	first.await.expect("Dispatch task should not panic.").expect("Dispatch should succeed.");
	second.await.expect("Dispatch task should not panic.").expect("Dispatch should succeed.");

	let dispatched = queue.http_client().dispatched();

	assert_spaced(&dispatched, DEFAULT_RATE_LIMIT);
	assert!(dispatched[1].1 - started < latency);
}

#[tokio::test(start_paused = true)]
async fn transport_errors_pass_through_unchanged() {
	let queue = RequestQueue::new(FakeTransport::failing(), DEFAULT_RATE_LIMIT);
	let err = queue.submit_get(request("/broken")).await.expect_err("Dispatch should fail.");

	assert_eq!(err, FakeTransportError::ConnectionReset);

	let before_retry = Instant::now();

	queue.submit_get(request("/broken")).await.expect_err("Dispatch should fail again.");

	let dispatched = queue.http_client().dispatched();

	assert!(dispatched[1].1 - before_retry >= DEFAULT_RATE_LIMIT);
}

#[tokio::test(start_paused = true)]
async fn token_refresh_goes_through_the_queue() {
	let broker = Broker::with_http_client(FakeTransport::nadeo(), DEFAULT_RATE_LIMIT, "tests")
		.expect("User agent should be valid.")
		.with_nadeo_credentials(NadeoCredentials::new("player@example.com", "hunter2"));

	broker.nadeo_services_token().await.expect("Refresh should succeed.");
	broker.nadeo_services_token().await.expect("Cached token should be served.");

	let dispatched = broker.queue().http_client().dispatched();
	let paths = dispatched.iter().map(|(path, _)| path.as_str()).collect::<Vec<_>>();

	assert_eq!(paths, ["/v3/profiles/sessions", "/v2/authentication/token/ubiservices"]);
	assert_spaced(&dispatched, DEFAULT_RATE_LIMIT);
}

#[tokio::test(start_paused = true)]
async fn brokers_sharing_a_queue_share_its_spacing() {
	let queue = Arc::new(RequestQueue::new(FakeTransport::nadeo(), DEFAULT_RATE_LIMIT));
	let credentials = NadeoCredentials::new("player@example.com", "hunter2");
	let core = Broker::with_request_queue(queue.clone(), "tests")
		.expect("User agent should be valid.")
		.with_nadeo_credentials(credentials.clone());
	let other = Broker::with_request_queue(queue.clone(), "tests")
		.expect("User agent should be valid.")
		.with_nadeo_credentials(credentials);
	let (first, second) = tokio::join!(core.nadeo_services_token(), other.nadeo_services_token());

	first.expect("First broker should refresh.");
	second.expect("Second broker should refresh.");

	let dispatched = queue.http_client().dispatched();

	assert_eq!(dispatched.len(), 4);
	assert_spaced(&dispatched, DEFAULT_RATE_LIMIT);
}
