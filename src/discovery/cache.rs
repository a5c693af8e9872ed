//! In-memory cache of fetched discovery documents.

// self
use crate::{_prelude::*, discovery::ServiceDocument};

/// Documents keyed by `"service:version"`, plus the latest version seen per service.
///
/// Entries never expire. Inserting an existing key overwrites it, so concurrent fetches of the
/// same document converge on one entry.
#[derive(Debug, Default)]
pub struct DocumentCache {
	documents: RwLock<HashMap<String, Arc<ServiceDocument>>>,
	latest: RwLock<HashMap<String, String>>,
}
impl DocumentCache {
	/// Cache key for a `(service, version)` pair.
	pub fn key(service: &str, version: &str) -> String {
		format!("{service}:{version}")
	}

	/// Cached document, if present.
	pub fn get(&self, service: &str, version: &str) -> Option<Arc<ServiceDocument>> {
		self.documents.read().get(&Self::key(service, version)).cloned()
	}

	/// Stores `document` and returns the shared handle.
	pub fn insert(
		&self,
		service: &str,
		version: &str,
		document: ServiceDocument,
	) -> Arc<ServiceDocument> {
		let document = Arc::new(document);

		self.documents.write().insert(Self::key(service, version), document.clone());

		document
	}

	/// Latest version recorded for `service` (case-insensitive).
	pub fn latest_version(&self, service: &str) -> Option<String> {
		self.latest.read().get(&service.to_ascii_lowercase()).cloned()
	}

	/// Records the latest version of `service`.
	pub fn set_latest_version(&self, service: &str, version: impl Into<String>) {
		self.latest.write().insert(service.to_ascii_lowercase(), version.into());
	}

	/// Number of cached documents.
	pub fn len(&self) -> usize {
		self.documents.read().len()
	}

	/// Returns `true` when no document is cached.
	pub fn is_empty(&self) -> bool {
		self.documents.read().is_empty()
	}
}
