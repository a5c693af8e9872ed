//! Batched list-by-id lookups re-projected onto the caller's input order.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	config::{ClientConfig, MAX_BATCH_SIZE},
	http::HttpTransport,
	json_path,
	obs::{self, CallKind},
	request::CallArgs,
};

/// Describes how a list method takes identifiers and where its response puts the items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkLookup {
	/// Argument carrying the comma-joined identifiers.
	pub id_param: String,
	/// Dotted path of the item list inside each response.
	pub items_path: String,
	/// Dotted path of the identifier inside each item.
	pub id_path: String,
	/// Identifiers per request; `None` uses [`ClientConfig::batch_size`].
	pub batch_size: Option<usize>,
}
impl BulkLookup {
	/// Overrides the identifier argument name.
	pub fn id_param(mut self, name: impl Into<String>) -> Self {
		self.id_param = name.into();

		self
	}

	/// Overrides the item list path.
	pub fn items_path(mut self, path: impl Into<String>) -> Self {
		self.items_path = path.into();

		self
	}

	/// Overrides the item identifier path.
	pub fn id_path(mut self, path: impl Into<String>) -> Self {
		self.id_path = path.into();

		self
	}

	/// Overrides the batch size. Values are clamped to `1..=50` when used.
	pub fn batch_size(mut self, size: usize) -> Self {
		self.batch_size = Some(size);

		self
	}

	fn effective_batch_size(&self, config: &ClientConfig) -> usize {
		self.batch_size.unwrap_or(config.batch_size).clamp(1, MAX_BATCH_SIZE)
	}
}
impl Default for BulkLookup {
	fn default() -> Self {
		Self { id_param: "id".into(), items_path: "items".into(), id_path: "id".into(), batch_size: None }
	}
}

/// Distinct non-empty identifiers in first-seen order.
pub fn unique_ids<S>(ids: &[S]) -> Vec<&str>
where
	S: AsRef<str>,
{
	let mut seen = HashSet::new();

	ids.iter().map(AsRef::as_ref).filter(|id| !id.is_empty() && seen.insert(*id)).collect()
}

/// Splits `ids` into consecutive batches of at most `size` entries.
pub fn batches<'a>(ids: &[&'a str], size: usize) -> Vec<Vec<&'a str>> {
	ids.chunks(size.max(1)).map(<[_]>::to_vec).collect()
}

/// Maps each input to the first returned item carrying its identifier.
///
/// Duplicated inputs repeat the item; inputs nothing matched get `None`.
pub fn reproject<S, F>(inputs: &[S], items: Vec<Value>, id_of: F) -> Vec<Option<Value>>
where
	S: AsRef<str>,
	F: Fn(&Value) -> Option<String>,
{
	let mut by_id = HashMap::with_capacity(items.len());

	for item in items {
		if let Some(id) = id_of(&item) {
			by_id.entry(id).or_insert(item);
		}
	}

	inputs.iter().map(|input| by_id.get(input.as_ref()).cloned()).collect()
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Looks up `ids` through the list method `method`, one request per batch.
	///
	/// `args` is sent with every batch alongside the joined identifiers. Batches run one after
	/// another. A batch the API rejects is logged and its identifiers map to `None`; failures to
	/// build the request (unknown method, discovery errors) are returned.
	pub async fn list_by_ids<S>(
		&self,
		method: &str,
		args: &CallArgs,
		ids: &[S],
		lookup: &BulkLookup,
	) -> Result<Vec<Option<Value>>>
	where
		S: AsRef<str>,
	{
		obs::observe(CallKind::Resolve, "list_by_ids", async {
			let unique = unique_ids(ids);
			let mut items = Vec::new();

			for batch in batches(&unique, lookup.effective_batch_size(self.config())) {
				let batch_args = args.clone().with(lookup.id_param.clone(), batch.join(","));
				let request = self.build(method, &batch_args).await?;

				match self.dispatch(&request, None).await {
					Ok(Some(payload)) => items.extend(items_at(&payload, &lookup.items_path)),
					Ok(None) => {},
					Err(e) => obs::warn_absorbed(CallKind::Resolve, request.full_url().as_str(), &e),
				}
			}

			Ok(reproject(ids, items, |item| {
				json_path::query_str(item, &lookup.id_path).map(str::to_owned)
			}))
		})
		.await
	}
}

fn items_at(payload: &Value, path: &str) -> Vec<Value> {
	match json_path::query(payload, path, &Value::Null) {
		Value::Array(items) => items,
		_ => Vec::new(),
	}
}
