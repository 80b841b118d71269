//! GitHub issue summaries: the issue plus its comments ranked by reactions.

// self
use crate::{
	_prelude::*,
	auth::usable_token,
	config::{Config, GitHubConfig},
	error::{ConfigError, SummaryError, UpstreamError},
	http::{self, ApiHttpClient, ApiRequest, ReqwestHttpClient},
	item::{Comment, Issue},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	provider::{ProviderKind, ensure_provider, parse_content_url},
	rate_limit::RateLimitGuard,
	reaction::RankedComments,
	store::{CredentialStore, FileStore},
};

/// `Accept` header sent on every GitHub request; the preview media type exposes reaction
/// rollups.
pub const GITHUB_ACCEPT: &str =
	"application/vnd.github.v3+json, application/vnd.github.squirrel-girl-preview";

const EXPECTED_URL: &str = "GitHub Issue";

/// Issue coordinates extracted from a `https://github.com/<owner>/<repo>/issues/<number>` URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IssueRef {
	/// Repository owner.
	pub owner: String,
	/// Repository name.
	pub repo: String,
	/// Issue number.
	pub number: u64,
}
impl IssueRef {
	/// Extracts the issue coordinates from a parsed GitHub URL.
	pub fn parse(url: &Url) -> Result<Self, SummaryError> {
		ensure_provider(url, ProviderKind::GitHub)?;

		let mismatch = || SummaryError::UrlMismatch { url: url.to_string(), expected: EXPECTED_URL };
		let mut segments = url.path_segments().ok_or_else(mismatch)?.filter(|s| !s.is_empty());
		let (Some(owner), Some(repo), Some("issues"), Some(number), None) = (
			segments.next(),
			segments.next(),
			segments.next(),
			segments.next(),
			segments.next(),
		) else {
			return Err(mismatch());
		};

		if !number.bytes().all(|b| b.is_ascii_digit()) {
			return Err(mismatch());
		}

		let number = number.parse().map_err(|_| mismatch())?;

		Ok(Self { owner: owner.to_owned(), repo: repo.to_owned(), number })
	}
}
impl FromStr for IssueRef {
	type Err = SummaryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(&parse_content_url(s)?)
	}
}
impl Display for IssueRef {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
	}
}

/// Issue plus its comments, highest score first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GitHubIssueSummary {
	/// The issue exactly as GitHub returned it.
	pub issue: Issue,
	/// Ranked comments.
	pub comments: RankedComments,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RateLimitBody {
	resources: RateLimitResources,
}
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RateLimitResources {
	core: RateLimitResource,
}
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RateLimitResource {
	remaining: u64,
}

/// Fetches a GitHub issue with its comments and ranks the comments by reactions.
#[derive(Clone)]
pub struct GitHubIssueSummarizer {
	config: GitHubConfig,
	user_agent: String,
	http_client: Arc<dyn ApiHttpClient>,
	store: Arc<dyn CredentialStore>,
}
impl GitHubIssueSummarizer {
	/// Creates a summarizer backed by reqwest and the configured credential file.
	pub fn new(config: &Config) -> Result<Self, ConfigError> {
		let http_client: Arc<dyn ApiHttpClient> = Arc::new(ReqwestHttpClient::from_config(config)?);
		let store: Arc<dyn CredentialStore> = Arc::new(FileStore::new(&config.credential_path));

		Ok(Self::with_parts(config, http_client, store))
	}

	/// Creates a summarizer reading its credential from `store` on every call.
	pub fn with_parts(
		config: &Config,
		http_client: Arc<dyn ApiHttpClient>,
		store: Arc<dyn CredentialStore>,
	) -> Self {
		Self {
			config: config.github.clone(),
			user_agent: config.user_agent.clone(),
			http_client,
			store,
		}
	}

	/// Summarizes the issue at `issue_url`.
	///
	/// The URL is validated before any network call. When `check_rate_limit` is set, a failing
	/// quota check stops the flow before the issue is fetched.
	pub async fn summarize(
		&self,
		issue_url: &str,
		check_rate_limit: bool,
	) -> Result<GitHubIssueSummary> {
		const KIND: OperationKind = OperationKind::SummarizeGitHubIssue;

		let span = OperationSpan::new(KIND, "summarize");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let issue_ref: IssueRef = issue_url.parse()?;
				let headers = self.headers().await?;

				if check_rate_limit {
					self.check_rate_limit(&headers).await?;
				}

				let issue = self.fetch_issue(&issue_ref, &headers).await?;
				let mut comments = self.fetch_comments(&issue_ref, &headers).await?;

				if self.config.skip_unreacted_comments {
					comments.retain(|comment| comment.reactions().total_count > 0);
				}

				#[cfg(feature = "tracing")]
				tracing::debug!(issue = %issue_ref, comments = comments.len(), "Ranking comments.");

				Ok(GitHubIssueSummary { issue, comments: RankedComments::rank(comments) })
			})
			.await;

		obs::record_operation_outcome(KIND, OperationOutcome::of(&result));

		result
	}

	async fn headers(&self) -> Result<Vec<(&'static str, String)>> {
		let stored = self.store.load().await?;
		let mut headers =
			vec![("Accept", GITHUB_ACCEPT.to_owned()), ("User-Agent", self.user_agent.clone())];

		match usable_token(stored.as_ref()) {
			Some(token) => headers.push(("Authorization", format!("token {token}"))),
			None => {
				#[cfg(feature = "tracing")]
				tracing::debug!("No usable GitHub credential; calling anonymously.");
			},
		}

		Ok(headers)
	}

	// A non-success quota lookup (403, 401) counts as zero remaining calls.
	async fn check_rate_limit(&self, headers: &[(&'static str, String)]) -> Result<()> {
		let url = http::api_url(&self.config.api_base, ["rate_limit"])?;
		let request = ApiRequest::get(url).headers(headers.iter().cloned());
		let remaining = match http::fetch_json::<RateLimitBody>(self.http_client.as_ref(), request)
			.await
		{
			Ok(body) => body.resources.core.remaining,
			Err(Error::Upstream(UpstreamError::Status { status, .. })) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(status, "GitHub refused the quota lookup.");
				#[cfg(not(feature = "tracing"))]
				let _ = status;

				0
			},
			Err(e) => return Err(e),
		};

		RateLimitGuard::new(ProviderKind::GitHub, self.config.rate_limit_threshold)
			.check(remaining)?;

		Ok(())
	}

	async fn fetch_issue(
		&self,
		issue_ref: &IssueRef,
		headers: &[(&'static str, String)],
	) -> Result<Issue> {
		let number = issue_ref.number.to_string();
		let url = http::api_url(
			&self.config.api_base,
			["repos", &issue_ref.owner, &issue_ref.repo, "issues", &number],
		)?;
		let request = ApiRequest::get(url).headers(headers.iter().cloned());

		http::fetch_json(self.http_client.as_ref(), request).await.map_err(|e| {
			match e.http_status() {
				Some(404) => SummaryError::NotFound {
					provider: ProviderKind::GitHub,
					resource: "issue",
					id: issue_ref.number,
				}
				.into(),
				_ => e,
			}
		})
	}

	async fn fetch_comments(
		&self,
		issue_ref: &IssueRef,
		headers: &[(&'static str, String)],
	) -> Result<Vec<Comment>> {
		let number = issue_ref.number.to_string();
		let url = http::api_url(
			&self.config.api_base,
			["repos", &issue_ref.owner, &issue_ref.repo, "issues", &number, "comments"],
		)?;
		let request = ApiRequest::get(url).headers(headers.iter().cloned());

		http::fetch_json(self.http_client.as_ref(), request).await
	}
}
impl Debug for GitHubIssueSummarizer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GitHubIssueSummarizer")
			.field("api_base", &self.config.api_base.as_str())
			.field("rate_limit_threshold", &self.config.rate_limit_threshold)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn issue_urls_yield_owner_repo_and_number() {
		let issue_ref: IssueRef =
			"https://github.com/o/r/issues/42".parse().expect("Issue URL should parse.");

		assert_eq!(issue_ref, IssueRef { owner: "o".into(), repo: "r".into(), number: 42 });
		assert_eq!(issue_ref.to_string(), "o/r#42");

		let with_fragment: IssueRef = "https://github.com/o/r/issues/42/#issuecomment-1"
			.parse()
			.expect("Trailing slash and fragment should be tolerated.");

		assert_eq!(with_fragment.number, 42);
	}

	#[test]
	fn other_github_paths_are_mismatches() {
		for url in [
			"https://github.com/o/r/pull/42",
			"https://github.com/o/r/issues",
			"https://github.com/o/r/issues/4x2",
			"https://github.com/o/r/issues/+42",
			"https://github.com/o/r/issues/42/events",
			"https://github.com/o",
		] {
			let err = url.parse::<IssueRef>().expect_err("Non-issue URLs should be rejected.");

			assert!(
				matches!(err, SummaryError::UrlMismatch { expected: EXPECTED_URL, .. }),
				"{url} produced {err:?}"
			);
		}
	}

	#[test]
	fn issue_paths_on_foreign_hosts_are_rejected() {
		for (url, host) in [
			("https://example.com/o/r/issues/1", "example.com"),
			("https://stackoverflow.com/o/r/issues/1", "stackoverflow.com"),
		] {
			assert_eq!(
				url.parse::<IssueRef>(),
				Err(SummaryError::UnsupportedHost { host: host.into() })
			);
		}

		assert!("https://www.github.com/o/r/issues/1".parse::<IssueRef>().is_ok());
	}

	#[test]
	fn mismatch_message_names_the_expected_form() {
		let err = "https://github.com/o/r/pull/1"
			.parse::<IssueRef>()
			.expect_err("Pull request URLs should be rejected.");

		assert_eq!(
			err.to_string(),
			"URL does not match form of link to GitHub Issue: https://github.com/o/r/pull/1."
		);
	}

	#[test]
	fn missing_rate_limit_fields_default_to_zero() {
		let body: RateLimitBody =
			serde_json::from_str("{\"resources\":{}}").expect("Partial body should decode.");

		assert_eq!(body.resources.core.remaining, 0);
	}
}
