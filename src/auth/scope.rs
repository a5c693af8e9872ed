//! Google OAuth scopes requested by assertions or granted by the token endpoint.

// std
use std::collections::BTreeSet;
// self
use crate::_prelude::*;

/// Rejected scope entries.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// An entry is the empty string.
	#[error("A scope entry is empty.")]
	Empty,
	/// An entry would split into several scopes once joined.
	#[error("Scope `{scope}` contains whitespace.")]
	ContainsWhitespace {
		/// Offending entry.
		scope: String,
	},
}

/// Ordered, duplicate-free scope list shared cheaply between token states.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ScopeSet(Arc<BTreeSet<String>>);
impl ScopeSet {
	/// Collects `scopes`, rejecting empty or whitespace-bearing entries.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		scopes
			.into_iter()
			.map(|scope| {
				let scope = scope.into();

				match scope.as_str() {
					"" => Err(ScopeValidationError::Empty),
					s if s.contains(char::is_whitespace) =>
						Err(ScopeValidationError::ContainsWhitespace { scope }),
					_ => Ok(scope),
				}
			})
			.collect::<Result<BTreeSet<_>, _>>()
			.map(|set| Self(Arc::new(set)))
	}

	/// Number of scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` for the empty set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Membership test.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.contains(scope)
	}

	/// Scopes in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Space-joined form carried by the assertion `scope` claim.
	pub fn joined(&self) -> String {
		self.iter().collect::<Vec<_>>().join(" ")
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_set().entries(self.iter()).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.joined())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	/// Parses the space-delimited `scope` field of a token response. `""` is the empty set.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"" => Ok(Self::default()),
			s if s.trim().is_empty() => Err(ScopeValidationError::Empty),
			s => Self::new(s.split_whitespace()),
		}
	}
}
impl TryFrom<Vec<String>> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(scopes: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(scopes)
	}
}
impl From<ScopeSet> for Vec<String> {
	fn from(scopes: ScopeSet) -> Self {
		scopes.0.iter().cloned().collect()
	}
}
