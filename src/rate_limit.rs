//! Quota gate consulted before upstream calls.
//!
//! The guard never waits or retries: when the remaining quota is below the configured threshold
//! the call fails closed with [`RateLimitError`] and the caller decides what to do next.

// self
use crate::{_prelude::*, provider::ProviderKind};

/// Remaining quota observed for a provider, paired with the threshold it is compared against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitStatus {
	/// Provider whose quota was observed.
	pub provider: ProviderKind,
	/// Calls remaining in the current window.
	pub remaining: u64,
	/// Minimum quota required to proceed.
	pub threshold: u64,
}
impl RateLimitStatus {
	/// Returns `true` when the remaining quota is strictly below the threshold.
	pub fn is_exhausted(&self) -> bool {
		self.remaining < self.threshold
	}
}

/// Raised when the remaining quota is below the configured threshold.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Remaining {provider} rate limit too low: {remaining} (threshold {threshold}).")]
pub struct RateLimitError {
	/// Provider whose quota was observed.
	pub provider: ProviderKind,
	/// Calls remaining in the current window.
	pub remaining: u64,
	/// Minimum quota required to proceed.
	pub threshold: u64,
}
impl From<RateLimitStatus> for RateLimitError {
	fn from(status: RateLimitStatus) -> Self {
		Self { provider: status.provider, remaining: status.remaining, threshold: status.threshold }
	}
}

/// Fail-closed quota gate for a single provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitGuard {
	provider: ProviderKind,
	threshold: u64,
}
impl RateLimitGuard {
	/// Creates a guard for `provider` that requires at least `threshold` remaining calls.
	pub const fn new(provider: ProviderKind, threshold: u64) -> Self {
		Self { provider, threshold }
	}

	/// Minimum quota required to proceed.
	pub const fn threshold(&self) -> u64 {
		self.threshold
	}

	/// Passes when `remaining >= threshold`, fails otherwise.
	pub fn check(&self, remaining: u64) -> Result<RateLimitStatus, RateLimitError> {
		let status =
			RateLimitStatus { provider: self.provider, remaining, threshold: self.threshold };

		#[cfg(feature = "tracing")]
		tracing::debug!(
			provider = %status.provider,
			remaining,
			threshold = status.threshold,
			"Checked upstream quota."
		);

		if status.is_exhausted() { Err(status.into()) } else { Ok(status) }
	}
}
