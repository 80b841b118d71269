mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use thumbsup::{
	config::{Config, env},
	error::{ConfigError, Error, SummaryError},
	provider::{ProviderKind, StackOverflowQuestionSummarizer},
	rate_limit::RateLimitError,
};

const QUESTION_URL: &str = "https://stackoverflow.com/questions/1/how-do-i-sort";

fn question(accepted_answer_id: Option<u64>) -> Value {
	let mut question = json!({
		"question_id": 1,
		"title": "How do I sort?",
		"body": "<p>Please help.</p>",
		"score": 12
	});

	if let Some(id) = accepted_answer_id {
		question["accepted_answer_id"] = json!(id);
	}

	question
}

fn answer() -> Value {
	json!({ "answer_id": 2, "question_id": 1, "body": "<p>Use sort.</p>", "is_accepted": true })
}

fn summarizer(config: &Config) -> StackOverflowQuestionSummarizer {
	StackOverflowQuestionSummarizer::with_parts(config, common::http_client(config))
}

async fn mock_question<'a>(
	server: &'a MockServer,
	body: Value,
	quota_remaining: u64,
) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/2.2/questions/1")
				.query_param("site", "stackoverflow")
				.query_param("filter", "withBody")
				.query_param("key", common::REQUEST_KEY)
				.query_param("access_token", common::ACCESS_TOKEN)
				.header("user-agent", "thumbsup-tests");
			then.status(200)
				.json_body(json!({ "items": [body], "quota_remaining": quota_remaining }));
		})
		.await
}

async fn mock_answer(server: &MockServer, items: Value) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/2.2/answers/2")
				.query_param("site", "stackoverflow")
				.query_param("filter", "withBody")
				.query_param("key", common::REQUEST_KEY)
				.query_param("access_token", common::ACCESS_TOKEN);
			then.status(200).json_body(json!({ "items": items, "quota_remaining": 9_000 }));
		})
		.await
}

#[tokio::test]
async fn question_without_accepted_answer_needs_one_fetch() {
	let server = MockServer::start_async().await;
	let config = common::mock_config_with_stack_exchange(&server)
		.build()
		.expect("Mock config should build.");
	let question_mock = mock_question(&server, question(None), 9_000).await;
	let answer_mock = mock_answer(&server, json!([answer()])).await;
	let summary = summarizer(&config)
		.summarize(QUESTION_URL, true)
		.await
		.expect("Question summary should succeed.");

	assert_eq!(summary.question.raw(), &question(None));
	assert_eq!(summary.accepted_answer, None);

	question_mock.assert_calls_async(1).await;
	answer_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn accepted_answer_is_fetched_and_passed_through() {
	let server = MockServer::start_async().await;
	let config = common::mock_config_with_stack_exchange(&server)
		.build()
		.expect("Mock config should build.");
	let question_mock = mock_question(&server, question(Some(2)), 9_000).await;
	let answer_mock = mock_answer(&server, json!([answer()])).await;
	let summary = summarizer(&config)
		.summarize(QUESTION_URL, true)
		.await
		.expect("Question summary should succeed.");
	let value = serde_json::to_value(&summary).expect("Summary should serialize.");

	assert_eq!(value, json!({ "question": question(Some(2)), "accepted_answer": answer() }));

	question_mock.assert_calls_async(1).await;
	answer_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn missing_secrets_fail_before_any_call() {
	let server = MockServer::start_async().await;
	let any = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200).json_body(json!({ "items": [] }));
		})
		.await;
	let only_key = common::mock_config(&server)
		.stack_exchange_request_key(common::REQUEST_KEY)
		.build()
		.expect("Mock config should build.");
	let err = summarizer(&only_key)
		.summarize(QUESTION_URL, true)
		.await
		.expect_err("A missing access token should fail.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::MissingSecret { name: env::STACK_EXCHANGE_ACCESS_TOKEN })
	));

	let neither = common::mock_config(&server).build().expect("Mock config should build.");
	let err = summarizer(&neither)
		.summarize(QUESTION_URL, true)
		.await
		.expect_err("Missing secrets should fail.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::MissingSecret { name: env::STACK_EXCHANGE_REQUEST_KEY })
	));

	any.assert_calls_async(0).await;
}

#[tokio::test]
async fn non_question_urls_fail_before_any_call() {
	let server = MockServer::start_async().await;
	let any = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200).json_body(json!({ "items": [] }));
		})
		.await;
	let config = common::mock_config_with_stack_exchange(&server)
		.build()
		.expect("Mock config should build.");
	let err = summarizer(&config)
		.summarize("https://stackoverflow.com/users/1/someone", true)
		.await
		.expect_err("User profile URLs should be rejected.");

	assert!(matches!(err, Error::Summary(SummaryError::UrlMismatch { .. })));

	any.assert_calls_async(0).await;
}

#[tokio::test]
async fn unknown_question_is_not_found() {
	let server = MockServer::start_async().await;
	let config = common::mock_config_with_stack_exchange(&server)
		.build()
		.expect("Mock config should build.");
	let _question = server
		.mock_async(|when, then| {
			when.method(GET).path("/2.2/questions/1");
			then.status(200).json_body(json!({ "items": [], "quota_remaining": 9_000 }));
		})
		.await;
	let err = summarizer(&config)
		.summarize(QUESTION_URL, true)
		.await
		.expect_err("An empty item list should not summarize.");

	assert!(matches!(
		err,
		Error::Summary(SummaryError::NotFound {
			provider: ProviderKind::StackOverflow,
			resource: "question",
			id: 1
		})
	));
}

#[tokio::test]
async fn missing_accepted_answer_is_a_hard_error() {
	let server = MockServer::start_async().await;
	let config = common::mock_config_with_stack_exchange(&server)
		.build()
		.expect("Mock config should build.");
	let _question = mock_question(&server, question(Some(2)), 9_000).await;
	let answer_mock = mock_answer(&server, json!([])).await;
	let err = summarizer(&config)
		.summarize(QUESTION_URL, true)
		.await
		.expect_err("A vanished accepted answer should fail.");

	assert!(matches!(
		err,
		Error::Summary(SummaryError::NotFound { resource: "answer", id: 2, .. })
	));

	answer_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn low_quota_skips_the_answer_unless_the_check_is_disabled() {
	let server = MockServer::start_async().await;
	let config = common::mock_config_with_stack_exchange(&server)
		.build()
		.expect("Mock config should build.");
	let question_mock = mock_question(&server, question(Some(2)), 99).await;
	let answer_mock = mock_answer(&server, json!([answer()])).await;
	let summarizer = summarizer(&config);
	let err = summarizer
		.summarize(QUESTION_URL, true)
		.await
		.expect_err("A quota of 99 should trip the default threshold.");

	assert!(matches!(
		err,
		Error::RateLimited(RateLimitError {
			provider: ProviderKind::StackOverflow,
			remaining: 99,
			threshold: 100
		})
	));

	answer_mock.assert_calls_async(0).await;

	let summary = summarizer
		.summarize(QUESTION_URL, false)
		.await
		.expect("Disabling the check should fetch the answer.");

	assert!(summary.accepted_answer.is_some());

	question_mock.assert_calls_async(2).await;
	answer_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn absent_quota_counts_as_exhausted() {
	let server = MockServer::start_async().await;
	let config = common::mock_config_with_stack_exchange(&server)
		.build()
		.expect("Mock config should build.");
	let question_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/2.2/questions/1");
			then.status(200)
				.json_body(json!({ "items": [question(Some(2))], "has_more": false }));
		})
		.await;
	let answer_mock = mock_answer(&server, json!([answer()])).await;
	let err = summarizer(&config)
		.summarize(QUESTION_URL, true)
		.await
		.expect_err("A response without quota should fail closed.");

	assert!(matches!(
		err,
		Error::RateLimited(RateLimitError {
			provider: ProviderKind::StackOverflow,
			remaining: 0,
			threshold: 100
		})
	));

	question_mock.assert_calls_async(1).await;
	answer_mock.assert_calls_async(0).await;
}
