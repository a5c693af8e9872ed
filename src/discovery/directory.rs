//! Discovery directory listing (`GET {endpoint}`).

// self
use crate::_prelude::*;

/// Directory payload.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DirectoryList {
	/// Listed service versions.
	#[serde(default)]
	pub items: Vec<DirectoryItem>,
}
impl DirectoryList {
	/// Latest version of `service`: the lexicographic maximum among case-insensitive name matches.
	pub fn latest_version(&self, service: &str) -> Option<&str> {
		self.items
			.iter()
			.filter(|item| item.name.eq_ignore_ascii_case(service))
			.map(|item| item.version.as_str())
			.max()
	}
}

/// One service version listed in the directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryItem {
	/// `name:version`.
	#[serde(default)]
	pub id: String,
	/// Service name.
	pub name: String,
	/// Version string.
	pub version: String,
	/// Human-readable title.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// Service description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Document URL advertised by the directory.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub discovery_rest_url: Option<String>,
	/// Whether this is the version Google recommends.
	#[serde(default)]
	pub preferred: bool,
}
