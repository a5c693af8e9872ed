//! Typed view over the parts of a discovery document the builder reads.

// self
use crate::{
	_prelude::*,
	discovery::MethodName,
	error::{DiscoveryError, ParameterError},
};

/// One service's discovery document (`…/{service}/{version}/rest`).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDocument {
	/// Service name.
	#[serde(default)]
	pub name: String,
	/// Service version.
	#[serde(default)]
	pub version: String,
	/// Host root, used for media upload paths.
	#[serde(default)]
	pub root_url: String,
	/// Path under the root shared by every method.
	#[serde(default)]
	pub service_path: String,
	/// `rootUrl + servicePath`; method paths are appended to it.
	#[serde(default)]
	pub base_url: String,
	/// Parameters every method accepts (`fields`, `alt`, `key`, …).
	#[serde(default)]
	pub parameters: BTreeMap<String, ParameterDescriptor>,
	/// Request and response schemas keyed by id.
	#[serde(default)]
	pub schemas: BTreeMap<String, Schema>,
	/// Top-level resources.
	#[serde(default)]
	pub resources: BTreeMap<String, Resource>,
	/// Methods declared directly on the service.
	#[serde(default)]
	pub methods: BTreeMap<String, MethodDescriptor>,
	/// OAuth scopes the service defines.
	#[serde(default)]
	pub auth: Option<AuthInfo>,
}
impl ServiceDocument {
	/// Resolves `name` by walking resources outermost first, then the verb.
	pub fn method(&self, name: &MethodName) -> Result<&MethodDescriptor, ParameterError> {
		let unknown = |segment: &str| ParameterError::UnknownMethod {
			method: name.to_string(),
			segment: segment.to_owned(),
		};
		let mut resources = &self.resources;
		let mut methods = &self.methods;

		for segment in name.resources() {
			let resource = resources.get(segment).ok_or_else(|| unknown(segment.as_str()))?;

			resources = &resource.resources;
			methods = &resource.methods;
		}

		methods.get(name.verb()).ok_or_else(|| unknown(name.verb()))
	}

	/// Looks up a schema by id.
	pub fn schema(&self, id: &str) -> Result<&Schema, DiscoveryError> {
		self.schemas.get(id).ok_or_else(|| DiscoveryError::UnknownSchema { schema: id.to_owned() })
	}

	/// Every OAuth scope the service declares.
	pub fn scopes(&self) -> Vec<String> {
		self.auth
			.as_ref()
			.and_then(|auth| auth.oauth2.as_ref())
			.map(|oauth2| oauth2.scopes.keys().cloned().collect())
			.unwrap_or_default()
	}

	/// All method ids in the document, depth first.
	pub fn method_ids(&self) -> Vec<String> {
		fn collect(
			methods: &BTreeMap<String, MethodDescriptor>,
			resources: &BTreeMap<String, Resource>,
			out: &mut Vec<String>,
		) {
			out.extend(methods.values().map(|method| method.id.clone()));

			for resource in resources.values() {
				collect(&resource.methods, &resource.resources, out);
			}
		}

		let mut out = Vec::new();

		collect(&self.methods, &self.resources, &mut out);

		out
	}
}

/// Nested resource holding methods and sub-resources.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Resource {
	/// Methods on this resource.
	#[serde(default)]
	pub methods: BTreeMap<String, MethodDescriptor>,
	/// Child resources.
	#[serde(default)]
	pub resources: BTreeMap<String, Resource>,
}

/// Endpoint shape of one API method.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
	/// Dotted method id, e.g. `sheets.spreadsheets.values.get`.
	#[serde(default)]
	pub id: String,
	/// HTTP verb.
	pub http_method: String,
	/// Path template relative to the base URL.
	pub path: String,
	/// Parameters keyed by name.
	#[serde(default)]
	pub parameters: BTreeMap<String, ParameterDescriptor>,
	/// Required parameters in canonical order.
	#[serde(default)]
	pub parameter_order: Vec<String>,
	/// Request body schema.
	#[serde(default)]
	pub request: Option<SchemaRef>,
	/// Response body schema.
	#[serde(default)]
	pub response: Option<SchemaRef>,
	/// Scopes any one of which authorizes the call.
	#[serde(default)]
	pub scopes: Vec<String>,
	/// Whether the method also accepts media uploads.
	#[serde(default)]
	pub supports_media_upload: bool,
	/// Media upload descriptor.
	#[serde(default)]
	pub media_upload: Option<MediaUpload>,
}
impl MethodDescriptor {
	/// Path of the simple media upload protocol, when declared.
	pub fn simple_upload_path(&self) -> Option<&str> {
		self.media_upload.as_ref()?.protocols.simple.as_ref().map(|simple| simple.path.as_str())
	}
}

/// `{"$ref": "…"}` pointer to a schema id.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SchemaRef {
	/// Referenced schema id.
	#[serde(rename = "$ref")]
	pub reference: String,
}

/// Where a parameter travels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
	/// Substituted into the path template.
	Path,
	/// Appended to the query string.
	Query,
	/// Any other location; never sent.
	#[default]
	#[serde(other)]
	Other,
}

/// Declaration of one method or global parameter.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ParameterDescriptor {
	/// Location the value is sent in.
	#[serde(default)]
	pub location: ParameterLocation,
	/// JSON type name.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	/// Whether the method requires it.
	#[serde(default)]
	pub required: bool,
	/// Whether repeated values are allowed.
	#[serde(default)]
	pub repeated: bool,
}

/// Schema entry; only property names matter to the builder.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Schema {
	/// Schema id.
	#[serde(default)]
	pub id: String,
	/// JSON type name.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	/// Property definitions keyed by property name.
	#[serde(default)]
	pub properties: Map<String, Value>,
}

/// Media upload declaration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpload {
	/// Accepted MIME patterns.
	#[serde(default)]
	pub accept: Vec<String>,
	/// Maximum upload size as written in the document.
	#[serde(default)]
	pub max_size: Option<String>,
	/// Upload protocols.
	#[serde(default)]
	pub protocols: MediaProtocols,
}

/// Upload protocols a method supports.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MediaProtocols {
	/// Single-request upload.
	#[serde(default)]
	pub simple: Option<MediaProtocol>,
	/// Resumable session upload.
	#[serde(default)]
	pub resumable: Option<MediaProtocol>,
}

/// One upload protocol.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MediaProtocol {
	/// Whether multipart bodies are accepted.
	#[serde(default)]
	pub multipart: bool,
	/// Path relative to the root URL.
	pub path: String,
}

/// `auth` block of a document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AuthInfo {
	/// OAuth 2.0 section.
	#[serde(default)]
	pub oauth2: Option<OAuth2Info>,
}

/// OAuth 2.0 scopes keyed by scope URL.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OAuth2Info {
	/// Scope URL to description object.
	#[serde(default)]
	pub scopes: BTreeMap<String, Value>,
}
