//! Flat call arguments and the requests built from them.
//!
//! [`build_request`] is a pure function of a discovery document, a method name, and the
//! arguments: it never touches the network. Each argument is routed by what the method
//! declares. Path placeholders consume it, declared query parameters pick it up, and the
//! request schema's properties copy it into the body. An argument may land in more than one of
//! these; one that matches none of them is dropped.

pub mod multipart;

pub use multipart::Attachment;

// self
use crate::{
	_prelude::*,
	discovery::{MethodDescriptor, MethodName, ParameterDescriptor, ParameterLocation, ServiceDocument},
	error::ParameterError,
};

/// Ordered argument name to value mapping passed to a call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallArgs(Map<String, Value>);
impl CallArgs {
	/// Empty argument set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(name, value);

		self
	}

	/// Inserts or replaces an argument, keeping the first insertion position.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(name.into(), value.into())
	}

	/// Argument value, including explicit nulls.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	/// Argument value unless absent or null.
	pub fn present(&self, name: &str) -> Option<&Value> {
		self.0.get(name).filter(|value| !value.is_null())
	}

	/// Arguments in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.0.iter()
	}

	/// Number of arguments.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no argument is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Underlying map.
	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}
}
impl From<Map<String, Value>> for CallArgs {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}
impl<K, V> FromIterator<(K, V)> for CallArgs
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// A fully resolved request: nothing left to look up before sending it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltRequest {
	/// Method name the request was built for.
	pub method: String,
	/// HTTP verb as declared by the document.
	pub http_method: String,
	/// Endpoint URL without the query string.
	pub url: Url,
	/// Query pairs in argument order; repeated names carry array elements.
	pub query: Vec<(String, String)>,
	/// JSON body, present when the method declares a request schema.
	pub body: Option<Value>,
}
impl BuiltRequest {
	/// Appends a query pair the document does not declare (e.g. `fields`).
	pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// URL including the query string.
	pub fn full_url(&self) -> Url {
		let mut url = self.url.clone();

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(&self.query);
		}

		url
	}
}

/// Builds the request for `name` from `document` and `args`.
pub fn build_request(
	document: &ServiceDocument,
	name: &MethodName,
	args: &CallArgs,
) -> Result<BuiltRequest> {
	let method = document.method(name)?;
	let path = expand_path(name, &method.path, args)?;

	assemble(document, name, method, format!("{}{path}", document.base_url), args)
}

/// Builds the media upload variant of `name`: the simple upload path under the root URL with
/// `uploadType=multipart`.
pub fn build_upload_request(
	document: &ServiceDocument,
	name: &MethodName,
	args: &CallArgs,
) -> Result<BuiltRequest> {
	let method = document.method(name)?;
	let upload = method
		.simple_upload_path()
		.ok_or_else(|| ParameterError::UploadUnsupported { method: name.to_string() })?;
	let path = expand_path(name, upload, args)?;
	let raw = format!("{}/{}", document.root_url.trim_end_matches('/'), path.trim_start_matches('/'));

	Ok(assemble(document, name, method, raw, args)?.with_query("uploadType", "multipart"))
}

fn assemble(
	document: &ServiceDocument,
	name: &MethodName,
	method: &MethodDescriptor,
	raw_url: String,
	args: &CallArgs,
) -> Result<BuiltRequest> {
	let url = Url::parse(&raw_url)
		.map_err(|_| ParameterError::InvalidUrl { method: name.to_string(), url: raw_url.clone() })?;
	let body = match &method.request {
		Some(schema) => Some(request_body(&document.schema(&schema.reference)?.properties, args)),
		None => None,
	};

	Ok(BuiltRequest {
		method: name.to_string(),
		http_method: method.http_method.clone(),
		url,
		query: query_pairs(&method.parameters, args),
		body,
	})
}

/// Substitutes `{name}` (percent-encoded) and `{+name}` (verbatim) placeholders.
fn expand_path(name: &MethodName, template: &str, args: &CallArgs) -> Result<String, ParameterError> {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(open) = rest.find('{') {
		let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
			break;
		};
		let placeholder = &rest[open + 1..close];
		let (reserved, key) = match placeholder.strip_prefix('+') {
			Some(key) => (true, key),
			None => (false, placeholder),
		};
		let key = key.trim_end_matches('*');
		let value = args.present(key).ok_or_else(|| ParameterError::MissingPathParameter {
			method: name.to_string(),
			name: key.to_owned(),
		})?;
		let rendered = render(value);

		out.push_str(&rest[..open]);

		if reserved {
			out.push_str(&rendered);
		} else if matches!(rendered.as_str(), "." | "..") {
			// URL parsing resolves `.`/`..` and `%2E`/`%2E%2E` alike, so no encoding survives.
			return Err(ParameterError::DotPathParameter {
				method: name.to_string(),
				name: key.to_owned(),
				value: rendered,
			});
		} else {
			out.push_str(&urlencoding::encode(&rendered));
		}

		rest = &rest[close + 1..];
	}

	out.push_str(rest);

	Ok(out)
}

fn query_pairs(
	parameters: &BTreeMap<String, ParameterDescriptor>,
	args: &CallArgs,
) -> Vec<(String, String)> {
	let mut pairs = Vec::new();

	for (name, value) in args.iter() {
		let declared = parameters.get(name).is_some_and(|p| p.location == ParameterLocation::Query);

		if !declared {
			continue;
		}

		match value {
			Value::Null => {},
			Value::Array(values) => pairs.extend(
				values.iter().filter(|v| !v.is_null()).map(|v| (name.clone(), render(v))),
			),
			scalar => pairs.push((name.clone(), render(scalar))),
		}
	}

	pairs
}

fn request_body(properties: &Map<String, Value>, args: &CallArgs) -> Value {
	Value::Object(
		args.iter()
			.filter(|(name, _)| properties.contains_key(name.as_str()))
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect(),
	)
}

/// Strings go out raw; arrays join with commas; everything else uses its JSON text.
fn render(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Array(values) => values.iter().map(render).collect::<Vec<_>>().join(","),
		other => other.to_string(),
	}
}
