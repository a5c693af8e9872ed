//! Dotted-path extraction over JSON trees.
//!
//! Objects are indexed by key, arrays map the remaining path over every element, and scalars
//! stop the walk. A key missing from an object yields the caller's default, so
//! `items.snippet.title` over a list of items returns one title (or default) per item.

// self
use crate::_prelude::*;

/// Walks `path` (dot separated) through `tree`.
///
/// Object: key lookup, `default` when absent. Array: element-wise recursion with the same
/// remaining path. Anything else: `null`. An empty path returns the tree itself.
pub fn query(tree: &Value, path: &str, default: &Value) -> Value {
	if path.is_empty() {
		return tree.clone();
	}

	let segments = path.split('.').collect::<Vec<_>>();

	walk(tree, &segments, default)
}

/// Single-valued convenience: the string at `path`, if the walk ends on one.
pub fn query_str<'a>(tree: &'a Value, path: &str) -> Option<&'a str> {
	path.split('.').try_fold(tree, |node, segment| node.as_object()?.get(segment))?.as_str()
}

fn walk(node: &Value, segments: &[&str], default: &Value) -> Value {
	let Some((head, rest)) = segments.split_first() else {
		return node.clone();
	};

	match node {
		Value::Object(fields) => match fields.get(*head) {
			Some(child) => walk(child, rest, default),
			// The default stands in for the missing subtree and is walked like one.
			None => walk(default, rest, default),
		},
		Value::Array(items) =>
			Value::Array(items.iter().map(|item| walk(item, segments, default)).collect()),
		_ => Value::Null,
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn tree() -> Value {
		json!({
			"a": "A",
			"b": { "b1": "B1" },
			"c": [
				{ "c1": "C1", "c2": "C2" },
				{ "c1": "CC1", "c2": "CC2" },
				{ "anything": "anything" }
			]
		})
	}

	#[test]
	fn scalars_objects_and_lists() {
		let tree = tree();

		assert_eq!(query(&tree, "a", &Value::Null), json!("A"));
		assert_eq!(query(&tree, "b.b1", &Value::Null), json!("B1"));
		assert_eq!(query(&tree, "c.c2", &Value::Null), json!(["C2", "CC2", null]));
		assert_eq!(query(&tree, "c.c2", &json!("?")), json!(["C2", "CC2", "?"]));
	}

	#[test]
	fn missing_keys_and_scalar_descent() {
		let tree = tree();

		assert_eq!(query(&tree, "zzz", &json!(0)), json!(0));
		assert_eq!(query(&tree, "a.deeper", &json!(0)), Value::Null);
		assert_eq!(query(&tree, "", &Value::Null), tree);
	}

	#[test]
	fn query_str_reads_single_strings() {
		let tree = tree();

		assert_eq!(query_str(&tree, "b.b1"), Some("B1"));
		assert_eq!(query_str(&tree, "b"), None);
		assert_eq!(query_str(&tree, "c.c1"), None);
	}
}
