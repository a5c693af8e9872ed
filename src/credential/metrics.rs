// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing how a credential's refreshes went.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	exchanges: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	reuses: AtomicU64,
}
impl RefreshMetrics {
	/// Token endpoint exchanges started.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Exchanges that produced a new token state.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Exchanges that failed.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Refresh requests answered by the still-valid cached state.
	pub fn reuses(&self) -> u64 {
		self.reuses.load(Ordering::Relaxed)
	}

	/// Point-in-time copy of every counter.
	pub fn snapshot(&self) -> RefreshCounts {
		RefreshCounts {
			exchanges: self.exchanges(),
			successes: self.successes(),
			failures: self.failures(),
			reuses: self.reuses(),
		}
	}

	pub(crate) fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_reuse(&self) {
		self.reuses.fetch_add(1, Ordering::Relaxed);
	}
}

/// Counter values captured by [`RefreshMetrics::snapshot`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshCounts {
	/// Token endpoint exchanges started.
	pub exchanges: u64,
	/// Exchanges that produced a new token state.
	pub successes: u64,
	/// Exchanges that failed.
	pub failures: u64,
	/// Refresh requests answered from the cached state.
	pub reuses: u64,
}
