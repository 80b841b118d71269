//! Content providers and the URL dispatcher that routes to them.
//!
//! `github` summarizes issues by ranking their comments; `stack_overflow` summarizes
//! questions together with their accepted answer. [`ProviderDispatcher`] picks one of them from
//! the URL's host and returns a [`ProviderSummary`].

pub mod github;
pub mod stack_overflow;

pub use github::*;
pub use stack_overflow::*;

// self
use crate::{
	_prelude::*,
	config::Config,
	error::{ConfigError, SummaryError},
	http::{ApiHttpClient, ReqwestHttpClient},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	store::{CredentialStore, FileStore},
};

/// Upstream content providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
	/// GitHub issues.
	GitHub,
	/// Stack Overflow questions.
	StackOverflow,
}
impl ProviderKind {
	/// Every supported provider.
	pub const ALL: [ProviderKind; 2] = [ProviderKind::GitHub, ProviderKind::StackOverflow];

	/// Returns a stable label suitable for logs and errors.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::GitHub => "github",
			ProviderKind::StackOverflow => "stackoverflow",
		}
	}

	/// Registrable domain served by the provider.
	pub const fn domain(self) -> &'static str {
		match self {
			ProviderKind::GitHub => "github.com",
			ProviderKind::StackOverflow => "stackoverflow.com",
		}
	}

	/// Finds the provider serving `host`.
	///
	/// A host matches when it equals the provider's domain or ends with `.` + domain; substring
	/// matches such as `github.com.evil.tld` or `notgithub.com` are rejected.
	pub fn from_host(host: &str) -> Option<Self> {
		let host = host.trim_end_matches('.').to_ascii_lowercase();

		Self::ALL.into_iter().find(|kind| {
			let domain = kind.domain();

			host == domain || host.strip_suffix(domain).is_some_and(|rest| rest.ends_with('.'))
		})
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result of summarizing a content URL.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProviderSummary {
	/// Issue plus ranked comments.
	GitHubIssue(GitHubIssueSummary),
	/// Question plus its accepted answer, if any.
	StackOverflowQuestion(StackOverflowSummary),
}
impl ProviderSummary {
	/// Provider that produced the summary.
	pub fn provider(&self) -> ProviderKind {
		match self {
			ProviderSummary::GitHubIssue(_) => ProviderKind::GitHub,
			ProviderSummary::StackOverflowQuestion(_) => ProviderKind::StackOverflow,
		}
	}
}

/// Routes content URLs to the matching summarizer.
#[derive(Clone)]
pub struct ProviderDispatcher {
	github: GitHubIssueSummarizer,
	stack_overflow: StackOverflowQuestionSummarizer,
}
impl ProviderDispatcher {
	/// Builds both summarizers with a reqwest client and the configured credential file.
	pub fn new(config: &Config) -> Result<Self, ConfigError> {
		let http_client: Arc<dyn ApiHttpClient> = Arc::new(ReqwestHttpClient::from_config(config)?);
		let store: Arc<dyn CredentialStore> = Arc::new(FileStore::new(&config.credential_path));

		Ok(Self::with_parts(config, http_client, store))
	}

	/// Builds both summarizers around a caller-supplied transport and credential store.
	pub fn with_parts(
		config: &Config,
		http_client: Arc<dyn ApiHttpClient>,
		store: Arc<dyn CredentialStore>,
	) -> Self {
		Self {
			github: GitHubIssueSummarizer::with_parts(config, http_client.clone(), store),
			stack_overflow: StackOverflowQuestionSummarizer::with_parts(config, http_client),
		}
	}

	/// Resolves the provider serving `url` without calling it.
	pub fn route(url: &str) -> Result<ProviderKind, SummaryError> {
		provider_of(&parse_content_url(url)?)
	}

	/// Summarizes `url` with the rate-limit gate enabled.
	pub async fn summarize(&self, url: &str) -> Result<ProviderSummary> {
		self.summarize_with(url, true).await
	}

	/// Summarizes `url`, optionally skipping the rate-limit gate.
	pub async fn summarize_with(
		&self,
		url: &str,
		check_rate_limit: bool,
	) -> Result<ProviderSummary> {
		const KIND: OperationKind = OperationKind::Dispatch;

		let span = OperationSpan::new(KIND, "summarize");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let provider = Self::route(url)?;

				#[cfg(feature = "tracing")]
				tracing::debug!(%provider, check_rate_limit, "Routing content URL.");

				match provider {
					ProviderKind::GitHub => self
						.github
						.summarize(url, check_rate_limit)
						.await
						.map(ProviderSummary::GitHubIssue),
					ProviderKind::StackOverflow => self
						.stack_overflow
						.summarize(url, check_rate_limit)
						.await
						.map(ProviderSummary::StackOverflowQuestion),
				}
			})
			.await;

		obs::record_operation_outcome(KIND, OperationOutcome::of(&result));

		result
	}
}
impl Debug for ProviderDispatcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderDispatcher").finish_non_exhaustive()
	}
}

/// Parses an absolute content URL that carries a host.
pub(crate) fn parse_content_url(raw: &str) -> Result<Url, SummaryError> {
	let invalid = || SummaryError::InvalidUrl { url: raw.to_owned() };
	let url = Url::parse(raw.trim()).map_err(|_| invalid())?;

	match url.host_str() {
		Some(host) if !host.is_empty() => Ok(url),
		_ => Err(invalid()),
	}
}

fn provider_of(url: &Url) -> Result<ProviderKind, SummaryError> {
	let host = url.host_str().unwrap_or_default();

	ProviderKind::from_host(host)
		.ok_or_else(|| SummaryError::UnsupportedHost { host: host.to_owned() })
}

/// Fails with [`SummaryError::UnsupportedHost`] unless `url` is served by `expected`.
pub(crate) fn ensure_provider(url: &Url, expected: ProviderKind) -> Result<(), SummaryError> {
	if provider_of(url)? == expected {
		Ok(())
	} else {
		Err(SummaryError::UnsupportedHost { host: url.host_str().unwrap_or_default().to_owned() })
	}
}
