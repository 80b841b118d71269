//! Rank GitHub issue comments and Stack Overflow answers by community reactions, and keep the
//! short-lived API credentials that power those lookups fresh without blowing through upstream
//! rate limits.
//!
//! The crate is split into two halves:
//!
//! - [`issuer`] turns a static personal token or a signed GitHub App key into a credential and
//!   persists it atomically through a [`store::CredentialStore`].
//! - [`provider`] dispatches content URLs to the matching summarizer, gates each lookup with
//!   [`rate_limit::RateLimitGuard`], and ranks comments with the scoring rules in [`reaction`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod issuer;
pub mod item;
pub mod obs;
pub mod provider;
pub mod rate_limit;
pub mod reaction;
pub mod store;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(feature = "cli")] use {clap as _, color_eyre as _, tokio as _, tracing_subscriber as _};
#[cfg(test)] use httpmock as _;
