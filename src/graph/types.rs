//! Graph data: the wire payload as the backend sends it, and the normalized
//! nodes and edges held by the store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::id::NodeId;

/// A point in graph (world) space, or an offset when used as a vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downward.
	pub y: f64,
}

impl Point {
	/// A point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}

	/// Halfway between `self` and `other`.
	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}

	/// `self` shifted by `(dx, dy)`.
	pub fn offset(self, dx: f64, dy: f64) -> Point {
		Point::new(self.x + dx, self.y + dy)
	}
}

/// Entries of a record list. A `null` or non-array list reads as empty, and
/// an entry that is not a record reads as `T::default()`, which the merge
/// then rejects by index.
fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned + Default,
{
	let Value::Array(entries) = Value::deserialize(deserializer)? else {
		return Ok(Vec::new());
	};
	Ok(entries
		.into_iter()
		.map(|entry| serde_json::from_value(entry).unwrap_or_default())
		.collect())
}

/// A text field. Numbers are taken as their decimal text; any other type
/// reads as absent.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	Ok(match Value::deserialize(deserializer)? {
		Value::String(s) => Some(s),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	})
}

/// A node record as received. Every field is optional and mistyped fields
/// read as absent, so one bad record can be skipped without failing the
/// whole payload.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RawNode {
	/// Id as sent: a number, a string, or missing.
	#[serde(default)]
	pub id: Option<Value>,
	/// Display name. Also accepted as `label`.
	#[serde(default, alias = "label", deserialize_with = "lenient_text")]
	pub name: Option<String>,
	/// Longer text shown in the details panel.
	#[serde(default, deserialize_with = "lenient_text")]
	pub description: Option<String>,
}

/// A link record as received.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RawLink {
	/// Id of the source node, or the source node object itself.
	#[serde(default)]
	pub source: Option<Value>,
	/// Id of the target node, or the target node object itself.
	#[serde(default)]
	pub target: Option<Value>,
	/// Relationship text drawn along the edge.
	#[serde(default, deserialize_with = "lenient_text")]
	pub label: Option<String>,
}

/// `{ nodes, links }` as returned by every graph endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct GraphPayload {
	/// Node records, in payload order.
	#[serde(default, deserialize_with = "lenient_records")]
	pub nodes: Vec<RawNode>,
	/// Link records, in payload order.
	#[serde(default, deserialize_with = "lenient_records")]
	pub links: Vec<RawLink>,
}

/// A topic in the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Canonical identity.
	pub id: NodeId,
	/// Label drawn inside the circle.
	pub name: String,
	/// Summary text, once the backend has sent one.
	pub description: Option<String>,
	/// Last position reported by the layout. `None` until the node is placed.
	pub position: Option<Point>,
	/// Held coordinate while the user drags the node.
	pub pinned: Option<Point>,
}

impl Node {
	/// An unplaced node with no description.
	pub fn new(id: NodeId, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
			description: None,
			position: None,
			pinned: None,
		}
	}
}

/// A labeled relationship. Identity is the directed `(source, target)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
	/// Node the edge starts at.
	pub source: NodeId,
	/// Node the edge points to.
	pub target: NodeId,
	/// Relationship text. Empty when the backend sent none.
	pub label: String,
}

impl Edge {
	/// The directed `(source, target)` pair that identifies this edge.
	pub fn key(&self) -> (NodeId, NodeId) {
		(self.source.clone(), self.target.clone())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn payload_defaults_missing_lists() {
		let payload: GraphPayload = serde_json::from_value(json!({ "nodes": [] })).unwrap();
		assert!(payload.nodes.is_empty());
		assert!(payload.links.is_empty());
	}

	#[test]
	fn raw_node_accepts_label_alias() {
		let node: RawNode = serde_json::from_value(json!({ "id": 1, "label": "A" })).unwrap();
		assert_eq!(node.name.as_deref(), Some("A"));
		assert_eq!(node.description, None);
	}

	#[test]
	fn mistyped_fields_read_as_absent() {
		let payload: GraphPayload = serde_json::from_value(json!({
			"nodes": [{ "id": 1, "name": 42, "description": ["not", "text"] }, null, "junk"],
			"links": [{ "source": 1, "target": 2, "label": 7 }, { "source": 1, "label": true }]
		}))
		.unwrap();
		assert_eq!(payload.nodes.len(), 3);
		assert_eq!(payload.nodes[0].name.as_deref(), Some("42"));
		assert_eq!(payload.nodes[0].description, None);
		assert!(payload.nodes[1].id.is_none());
		assert!(payload.nodes[2].id.is_none());
		assert_eq!(payload.links[0].label.as_deref(), Some("7"));
		assert_eq!(payload.links[1].label, None);
	}

	#[test]
	fn null_lists_read_as_empty() {
		let payload: GraphPayload =
			serde_json::from_value(json!({ "nodes": [{ "id": 1 }], "links": null })).unwrap();
		assert_eq!(payload.nodes.len(), 1);
		assert!(payload.links.is_empty());

		let payload: GraphPayload = serde_json::from_value(json!({ "nodes": null })).unwrap();
		assert!(payload.nodes.is_empty());
	}

	#[test]
	fn point_geometry() {
		let (a, b) = (Point::new(0.0, 0.0), Point::new(6.0, 8.0));
		assert_eq!(a.distance(b), 10.0);
		assert_eq!(a.midpoint(b), Point::new(3.0, 4.0));
		assert_eq!(b.offset(-1.0, 2.0), Point::new(5.0, 10.0));
	}
}
