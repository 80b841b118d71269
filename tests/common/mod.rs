//! Shared helpers for the integration tests.

#![allow(dead_code)]

// std
use std::{
	env, fs,
	path::{Path, PathBuf},
	process,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use httpmock::MockServer;
// self
use thumbsup::{
	config::{Config, ConfigBuilder},
	http::{ApiHttpClient, ReqwestHttpClient},
	url::Url,
};

pub const REQUEST_KEY: &str = "se-request-key";
pub const ACCESS_TOKEN: &str = "se-access-token";

/// Fresh directory under the system temp dir, unique per test.
pub fn temp_dir(label: &str) -> PathBuf {
	static NEXT: AtomicUsize = AtomicUsize::new(0);

	let dir = env::temp_dir().join(format!(
		"thumbsup_{label}_{}_{}",
		process::id(),
		NEXT.fetch_add(1, Ordering::Relaxed)
	));

	fs::create_dir_all(&dir).expect("Failed to create temporary test directory.");

	dir
}

pub fn cleanup(dir: &Path) {
	fs::remove_dir_all(dir).unwrap_or_else(|e| {
		panic!("Failed to remove temporary test directory {}: {e}", dir.display())
	});
}

/// Builder pointing both API bases at `server`.
pub fn mock_config(server: &MockServer) -> ConfigBuilder {
	Config::builder()
		.user_agent("thumbsup-tests")
		.github_api_base(Url::parse(&server.base_url()).expect("Mock GitHub base should parse."))
		.stack_exchange_api_base(
			Url::parse(&server.url("/2.2")).expect("Mock Stack Exchange base should parse."),
		)
}

/// Same as [`mock_config`] with both Stack Exchange secrets configured.
pub fn mock_config_with_stack_exchange(server: &MockServer) -> ConfigBuilder {
	mock_config(server)
		.stack_exchange_request_key(REQUEST_KEY)
		.stack_exchange_access_token(ACCESS_TOKEN)
}

pub fn http_client(config: &Config) -> Arc<dyn ApiHttpClient> {
	Arc::new(ReqwestHttpClient::from_config(config).expect("Failed to build the reqwest client."))
}

pub fn fixture_key_path() -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join("app-key.pem")
}
