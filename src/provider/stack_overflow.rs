//! Stack Overflow question summaries: the question plus its accepted answer.
//!
//! The accepted answer costs a second request, so it is fetched only when the question names
//! one and, unless the caller opts out, when the quota reported by the question response is
//! still above the configured threshold.

// self
use crate::{
	_prelude::*,
	auth::CredentialSecret,
	config::{Config, StackExchangeConfig, env},
	error::{ConfigError, SummaryError},
	http::{self, ApiHttpClient, ApiRequest, ReqwestHttpClient},
	item::{Answer, Question},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	provider::{ProviderKind, ensure_provider, parse_content_url},
	rate_limit::RateLimitGuard,
};

/// Stack Exchange site queried for every request.
pub const STACK_EXCHANGE_SITE: &str = "stackoverflow";
/// Response filter that includes post bodies.
pub const STACK_EXCHANGE_FILTER: &str = "withBody";

const EXPECTED_URL: &str = "Stack Overflow question";

/// Extracts the question id from a `https://stackoverflow.com/questions/<id>[/...]` URL.
pub fn question_id(url: &Url) -> Result<u64, SummaryError> {
	ensure_provider(url, ProviderKind::StackOverflow)?;

	let mismatch = || SummaryError::UrlMismatch { url: url.to_string(), expected: EXPECTED_URL };
	let mut segments = url.path_segments().ok_or_else(mismatch)?;
	let (Some("questions"), Some(id)) = (segments.next(), segments.next()) else {
		return Err(mismatch());
	};

	if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
		return Err(mismatch());
	}

	id.parse().map_err(|_| mismatch())
}

/// Question plus its accepted answer; `accepted_answer` is `None` only when the question has
/// no accepted answer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StackOverflowSummary {
	/// The question exactly as Stack Exchange returned it.
	pub question: Question,
	/// The accepted answer, when one exists.
	pub accepted_answer: Option<Answer>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
	#[serde(default = "Vec::new")]
	items: Vec<T>,
	#[serde(default)]
	quota_remaining: Option<u64>,
}

/// Fetches a Stack Overflow question and, when present, its accepted answer.
#[derive(Clone)]
pub struct StackOverflowQuestionSummarizer {
	config: StackExchangeConfig,
	user_agent: String,
	http_client: Arc<dyn ApiHttpClient>,
}
impl StackOverflowQuestionSummarizer {
	/// Creates a summarizer backed by reqwest.
	pub fn new(config: &Config) -> Result<Self, ConfigError> {
		let http_client: Arc<dyn ApiHttpClient> = Arc::new(ReqwestHttpClient::from_config(config)?);

		Ok(Self::with_parts(config, http_client))
	}

	/// Creates a summarizer around a caller-supplied transport.
	pub fn with_parts(config: &Config, http_client: Arc<dyn ApiHttpClient>) -> Self {
		Self {
			config: config.stack_exchange.clone(),
			user_agent: config.user_agent.clone(),
			http_client,
		}
	}

	/// Summarizes the question at `question_url`.
	///
	/// Missing Stack Exchange secrets and malformed URLs fail before any network call. Once the
	/// question names an accepted answer, failing to fetch that answer is an error.
	pub async fn summarize(
		&self,
		question_url: &str,
		check_rate_limit: bool,
	) -> Result<StackOverflowSummary> {
		const KIND: OperationKind = OperationKind::SummarizeStackOverflowQuestion;

		let span = OperationSpan::new(KIND, "summarize");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let (request_key, access_token) = self.secrets()?;
				let id = question_id(&parse_content_url(question_url)?)?;
				let envelope: Envelope<Question> =
					self.fetch("questions", id, request_key, access_token).await?;
				let question = envelope
					.items
					.into_iter()
					.find(|question| question.fields().question_id == Some(id))
					.ok_or(SummaryError::NotFound {
						provider: ProviderKind::StackOverflow,
						resource: "question",
						id,
					})?;
				let Some(answer_id) = question.fields().accepted_answer_id else {
					#[cfg(feature = "tracing")]
					tracing::debug!(question_id = id, "Question has no accepted answer.");

					return Ok(StackOverflowSummary { question, accepted_answer: None });
				};

				if check_rate_limit {
					RateLimitGuard::new(ProviderKind::StackOverflow, self.config.rate_limit_threshold)
						.check(envelope.quota_remaining.unwrap_or(0))?;
				}

				let envelope: Envelope<Answer> =
					self.fetch("answers", answer_id, request_key, access_token).await?;
				let answer = envelope
					.items
					.into_iter()
					.find(|answer| answer.fields().answer_id == Some(answer_id))
					.ok_or(SummaryError::NotFound {
						provider: ProviderKind::StackOverflow,
						resource: "answer",
						id: answer_id,
					})?;

				Ok(StackOverflowSummary { question, accepted_answer: Some(answer) })
			})
			.await;

		obs::record_operation_outcome(KIND, OperationOutcome::of(&result));

		result
	}

	fn secrets(&self) -> Result<(&CredentialSecret, &CredentialSecret), ConfigError> {
		let request_key = self
			.config
			.request_key
			.as_ref()
			.ok_or(ConfigError::MissingSecret { name: env::STACK_EXCHANGE_REQUEST_KEY })?;
		let access_token = self
			.config
			.access_token
			.as_ref()
			.ok_or(ConfigError::MissingSecret { name: env::STACK_EXCHANGE_ACCESS_TOKEN })?;

		Ok((request_key, access_token))
	}

	async fn fetch<T>(
		&self,
		resource: &str,
		id: u64,
		request_key: &CredentialSecret,
		access_token: &CredentialSecret,
	) -> Result<Envelope<T>>
	where
		T: DeserializeOwned,
	{
		let id = id.to_string();
		let mut url = http::api_url(&self.config.api_base, [resource, id.as_str()])?;

		url.query_pairs_mut()
			.append_pair("site", STACK_EXCHANGE_SITE)
			.append_pair("filter", STACK_EXCHANGE_FILTER)
			.append_pair("key", request_key.expose())
			.append_pair("access_token", access_token.expose());

		let request = ApiRequest::get(url).header("User-Agent", self.user_agent.clone());

		http::fetch_json(self.http_client.as_ref(), request).await
	}
}
impl Debug for StackOverflowQuestionSummarizer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StackOverflowQuestionSummarizer")
			.field("api_base", &self.config.api_base.as_str())
			.field("rate_limit_threshold", &self.config.rate_limit_threshold)
			.finish_non_exhaustive()
	}
}
