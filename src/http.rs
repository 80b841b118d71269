//! Transport primitives for upstream API calls.
//!
//! [`ApiHttpClient`] is the crate's only dependency on an HTTP stack. The default
//! [`ReqwestHttpClient`] applies the configured timeout and `User-Agent`, and every response is
//! returned with its [`ResponseMetadata`] (status code, `Retry-After` hint) so callers can map
//! failures without touching reqwest types.

// crates.io
use reqwest::header::{HeaderMap, RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	config::Config,
	error::{ConfigError, TransportError, UpstreamError},
};

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// HTTP methods used against upstream APIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
}
impl HttpMethod {
	/// Returns the method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound request handed to an [`ApiHttpClient`].
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Fully resolved URL, including any query string.
	pub url: Url,
	/// Request headers.
	pub headers: Vec<(&'static str, String)>,
}
impl ApiRequest {
	/// Creates a `GET` request.
	pub fn get(url: Url) -> Self {
		Self { method: HttpMethod::Get, url, headers: Vec::new() }
	}

	/// Creates a `POST` request without a body.
	pub fn post(url: Url) -> Self {
		Self { method: HttpMethod::Post, url, headers: Vec::new() }
	}

	/// Appends a header.
	pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}

	/// Appends several headers.
	pub fn headers<I>(mut self, headers: I) -> Self
	where
		I: IntoIterator<Item = (&'static str, String)>,
	{
		self.headers.extend(headers);

		self
	}

	/// Returns the URL without its query string or fragment, safe to attach to errors and logs.
	pub fn endpoint(&self) -> String {
		let mut url = self.url.clone();

		url.set_query(None);
		url.set_fragment(None);

		url.into()
	}
}

/// Metadata captured from an upstream response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl ResponseMetadata {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Response returned by an [`ApiHttpClient`].
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Status and hints captured from the response.
	pub metadata: ResponseMetadata,
	/// Raw response body.
	pub body: Vec<u8>,
}

/// Abstraction over HTTP transports capable of executing upstream API calls.
///
/// Implementations must be `Send + Sync + 'static` so one client can be shared between the
/// issuer and every summarizer.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes a single request. Non-success statuses are returned as responses, not errors.
	fn execute(&self, request: ApiRequest) -> HttpFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the configured timeout and `User-Agent`.
	pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(config.request_timeout)
			.user_agent(config.user_agent.clone())
			.build()?;

		Ok(Self(client))
	}
}
impl ApiHttpClient for ReqwestHttpClient {
	fn execute(&self, request: ApiRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let endpoint = request.endpoint();
			let mut builder = match request.method {
				HttpMethod::Get => self.0.get(request.url),
				HttpMethod::Post => self.0.post(request.url),
			};

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}

			let response =
				builder.send().await.map_err(|e| TransportError::network(endpoint.clone(), e))?;
			let metadata = ResponseMetadata {
				status: response.status().as_u16(),
				retry_after: parse_retry_after(response.headers()),
			};
			let body = response
				.bytes()
				.await
				.map_err(|e| TransportError::network(endpoint, e))?
				.to_vec();

			Ok(ApiResponse { metadata, body })
		})
	}
}

/// Executes `request` and decodes a successful JSON body into `T`.
///
/// Non-success statuses become [`UpstreamError::Status`] and schema mismatches become
/// [`UpstreamError::Decode`] carrying the JSON path of the offending field.
pub async fn fetch_json<T>(client: &dyn ApiHttpClient, request: ApiRequest) -> Result<T>
where
	T: DeserializeOwned,
{
	let endpoint = request.endpoint();

	#[cfg(feature = "tracing")]
	tracing::debug!(method = %request.method, endpoint = %endpoint, "Calling upstream API.");

	let response = client.execute(request).await?;

	if !response.metadata.is_success() {
		return Err(UpstreamError::Status {
			endpoint,
			status: response.metadata.status,
			retry_after: response.metadata.retry_after,
			message: truncate_preview(&String::from_utf8_lossy(&response.body)),
		}
		.into());
	}

	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| UpstreamError::Decode { endpoint, source }.into())
}

/// Appends path segments to an API base URL, percent-encoding each one.
pub fn api_url<'a, I>(base: &Url, segments: I) -> Result<Url, ConfigError>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut url = base.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::InvalidValue { name: "api_base", value: base.to_string() })?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

/// Truncates upstream text so error messages and logs stay bounded.
pub(crate) fn truncate_preview(value: &str) -> String {
	const PREVIEW_LIMIT: usize = 256;

	let trimmed = value.trim();

	match trimmed.char_indices().nth(PREVIEW_LIMIT) {
		Some((cut, _)) => format!("{}…", &trimmed[..cut]),
		None => trimmed.to_owned(),
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
