//! Hierarchical method names: `service:version.resource….verb`.

// self
use crate::{_prelude::*, error::ParameterError};

/// Parsed method name.
///
/// The version is optional; without it the service's latest version is looked up in the
/// discovery directory before the document is fetched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodName {
	service: String,
	version: Option<String>,
	resources: Vec<String>,
	verb: String,
}
impl MethodName {
	/// Parses `service:version.resource….verb` or `service.resource….verb`.
	pub fn parse(raw: &str) -> Result<Self, ParameterError> {
		let invalid = |reason| ParameterError::InvalidMethodName { method: raw.to_owned(), reason };
		let (service, version, path) = match raw.split_once(':') {
			Some((service, rest)) => {
				let (version, path) = rest.split_once('.').ok_or_else(|| invalid("no method path"))?;

				if version.is_empty() {
					return Err(invalid("empty version"));
				}

				(service, Some(version), path)
			},
			None => raw.split_once('.').map(|(service, path)| (service, None, path)).ok_or_else(
				|| invalid("no method path"),
			)?,
		};

		if service.is_empty() {
			return Err(invalid("empty service"));
		}

		let mut segments = path.split('.').map(str::to_owned).collect::<Vec<_>>();

		if segments.iter().any(String::is_empty) {
			return Err(invalid("empty segment"));
		}

		let verb = segments.pop().ok_or_else(|| invalid("no verb"))?;

		Ok(Self {
			service: service.to_owned(),
			version: version.map(str::to_owned),
			resources: segments,
			verb,
		})
	}

	/// Service name.
	pub fn service(&self) -> &str {
		&self.service
	}

	/// Explicit version, if the name carried one.
	pub fn version(&self) -> Option<&str> {
		self.version.as_deref()
	}

	/// Resource segments, outermost first.
	pub fn resources(&self) -> &[String] {
		&self.resources
	}

	/// Final segment.
	pub fn verb(&self) -> &str {
		&self.verb
	}

	/// Copy of this name pinned to `version`.
	pub fn with_version(&self, version: impl Into<String>) -> Self {
		Self { version: Some(version.into()), ..self.clone() }
	}
}
impl Display for MethodName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.service)?;

		if let Some(version) = &self.version {
			write!(f, ":{version}")?;
		}
		for segment in &self.resources {
			write!(f, ".{segment}")?;
		}

		write!(f, ".{}", self.verb)
	}
}
impl FromStr for MethodName {
	type Err = ParameterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_versioned_names() {
		let name = MethodName::parse("sheets:v4.spreadsheets.values.get")
			.expect("Versioned name should parse.");

		assert_eq!(name.service(), "sheets");
		assert_eq!(name.version(), Some("v4"));
		assert_eq!(name.resources(), ["spreadsheets", "values"]);
		assert_eq!(name.verb(), "get");
		assert_eq!(name.to_string(), "sheets:v4.spreadsheets.values.get");
	}

	#[test]
	fn unversioned_names_defer_the_version() {
		let name = MethodName::parse("youtube.videos.list").expect("Unversioned name should parse.");

		assert_eq!(name.service(), "youtube");
		assert_eq!(name.version(), None);
		assert_eq!(name.resources(), ["videos"]);
		assert_eq!(name.with_version("v3").to_string(), "youtube:v3.videos.list");
	}

	#[test]
	fn service_level_verbs_have_no_resources() {
		let name = MethodName::parse("urlshortener:v1.get").expect("Bare verb should parse.");

		assert!(name.resources().is_empty());
		assert_eq!(name.verb(), "get");
	}

	#[test]
	fn rejects_malformed_names() {
		for raw in ["sheets", "sheets:v4", ":v4.a.get", "sheets:.a.get", "sheets:v4.a..get", "sheets:v4."]
		{
			assert!(
				matches!(MethodName::parse(raw), Err(ParameterError::InvalidMethodName { .. })),
				"{raw} should be rejected"
			);
		}
	}
}
