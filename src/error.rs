//! Crate-level error types shared by the issuer, the summarizers, and the stores.

// self
use crate::{_prelude::*, provider::ProviderKind};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Each variant is a distinct outcome callers are expected to match on; nothing in the crate
/// retries on their behalf.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem (missing secret, invalid option).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The URL could not be summarized or the upstream item does not exist.
	#[error(transparent)]
	Summary(#[from] SummaryError),
	/// Remaining upstream quota fell below the configured threshold.
	#[error(transparent)]
	RateLimited(#[from] crate::rate_limit::RateLimitError),
	/// Upstream answered with an error status or an undecodable payload.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Transport failure (DNS, TCP, TLS, timeout, local I/O).
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl Error {
	/// Returns the HTTP status attached to the failure, when an upstream response was received.
	pub fn http_status(&self) -> Option<u16> {
		match self {
			Self::Upstream(UpstreamError::Status { status, .. }) => Some(*status),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A secret required by the requested operation is not configured.
	#[error("Required secret `{name}` is not configured.")]
	MissingSecret {
		/// Configuration option name.
		name: &'static str,
	},
	/// An option holds a value that cannot be parsed.
	#[error("Option `{name}` has an invalid value: {value}.")]
	InvalidValue {
		/// Configuration option name.
		name: &'static str,
		/// Offending raw value.
		value: String,
	},
	/// An option holds an unparsable URL.
	#[error("Option `{name}` is not a valid URL.")]
	InvalidUrl {
		/// Configuration option name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The GitHub App private key could not be used to sign a JWT.
	#[error("GitHub App key could not sign the installation JWT.")]
	AppKey {
		/// Underlying signing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures tied to the content URL or to items the provider could not find.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SummaryError {
	/// Input is not an absolute URL with a host.
	#[error("`{url}` is not an absolute URL with a host.")]
	InvalidUrl {
		/// Raw input.
		url: String,
	},
	/// No provider serves the URL's host.
	#[error("No provider handles host `{host}`.")]
	UnsupportedHost {
		/// Host extracted from the URL.
		host: String,
	},
	/// The URL path does not have the shape the provider expects.
	#[error("URL does not match form of link to {expected}: {url}.")]
	UrlMismatch {
		/// Offending URL.
		url: String,
		/// Human-readable description of the expected shape.
		expected: &'static str,
	},
	/// The provider returned no item where one was expected.
	#[error("The {provider} {resource} {id} was not found.")]
	NotFound {
		/// Provider that was queried.
		provider: ProviderKind,
		/// Resource kind (issue, question, answer).
		resource: &'static str,
		/// Requested identifier.
		id: u64,
	},
}

/// Non-success responses and undecodable payloads returned by an upstream API.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Upstream answered with a non-success HTTP status.
	#[error("{endpoint} returned HTTP {status}: {message}.")]
	Status {
		/// Endpoint URL without its query string.
		endpoint: String,
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Truncated response body.
		message: String,
	},
	/// Upstream responded with JSON that does not fit the expected schema.
	#[error("{endpoint} returned malformed JSON.")]
	Decode {
		/// Endpoint URL without its query string.
		endpoint: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Upstream responded successfully but left out a field the flow depends on.
	#[error("{endpoint} response is missing the `{field}` field.")]
	MissingField {
		/// Endpoint URL without its query string.
		endpoint: String,
		/// Missing field name.
		field: &'static str,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {endpoint}.")]
	Network {
		/// Endpoint URL without its query string.
		endpoint: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure.
	#[error("I/O error occurred.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint: endpoint.into(), source: Box::new(src) }
	}
}
