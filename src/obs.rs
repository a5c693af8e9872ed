//! Optional observability helpers for credential refreshes, discovery, and dispatch.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `discovery_broker.call` with the `kind`
//!   and `stage` (call site) fields, plus warn events for per-unit failures that resolver
//!   patterns absorb.
//! - Enable `metrics` to increment the `discovery_broker_call_total` counter for every
//!   attempt/success/failure, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Call categories observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Token endpoint exchange.
	Refresh,
	/// Discovery directory or document fetch.
	Discovery,
	/// Built request sent to the target API.
	Dispatch,
	/// Identifier resolution (bulk or concurrent).
	Resolve,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Refresh => "refresh",
			CallKind::Discovery => "discovery",
			CallKind::Dispatch => "dispatch",
			CallKind::Resolve => "resolve",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a [`CallSpan`] and records attempt + outcome counters around it.
pub(crate) async fn observe<T, Fut>(kind: CallKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = CallSpan::new(kind, stage);

	record_call_outcome(kind, CallOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_call_outcome(kind, CallOutcome::Success),
		Err(_) => record_call_outcome(kind, CallOutcome::Failure),
	}

	result
}
