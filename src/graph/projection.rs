//! Per-tick projection of the store into drawable primitives.

use super::id::NodeId;
use super::store::GraphStore;
use super::types::Point;

/// One edge ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSprite {
	/// Source node id.
	pub source: NodeId,
	/// Target node id.
	pub target: NodeId,
	/// Source position.
	pub from: Point,
	/// Target position.
	pub to: Point,
	/// Relationship text.
	pub label: String,
	/// Where the label is centered.
	pub label_at: Point,
	/// Rotation of the label in radians, following the edge direction.
	pub label_angle: f64,
}

impl EdgeSprite {
	/// SVG path data for the edge segment.
	pub fn path(&self) -> String {
		format!("M{},{}L{},{}", self.from.x, self.from.y, self.to.x, self.to.y)
	}

	/// Label rotation in degrees.
	pub fn label_angle_degrees(&self) -> f64 {
		self.label_angle.to_degrees()
	}
}

/// One node ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSprite {
	/// Node id.
	pub id: NodeId,
	/// Center of the circle.
	pub at: Point,
	/// Text drawn in the circle.
	pub name: String,
	/// Drawn in the selection color.
	pub selected: bool,
	/// Under the pointer.
	pub hovered: bool,
}

/// Everything needed to draw one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
	/// Edges, drawn first.
	pub edges: Vec<EdgeSprite>,
	/// Nodes, drawn over the edges in this order.
	pub nodes: Vec<NodeSprite>,
}

/// Project the current positions. Nodes the layout has not placed yet, and
/// edges touching them, are left out.
pub fn project(store: &GraphStore, selected: Option<&NodeId>, hovered: Option<&NodeId>) -> Frame {
	let edges = store
		.edges()
		.iter()
		.filter_map(|edge| {
			let from = store.node(&edge.source)?.position?;
			let to = store.node(&edge.target)?.position?;
			Some(EdgeSprite {
				source: edge.source.clone(),
				target: edge.target.clone(),
				from,
				to,
				label: edge.label.clone(),
				label_at: from.midpoint(to),
				label_angle: (to.y - from.y).atan2(to.x - from.x),
			})
		})
		.collect();

	let nodes = store
		.nodes()
		.iter()
		.filter_map(|node| {
			Some(NodeSprite {
				id: node.id.clone(),
				at: node.position?,
				name: node.name.clone(),
				selected: selected == Some(&node.id),
				hovered: hovered == Some(&node.id),
			})
		})
		.collect();

	Frame { edges, nodes }
}

#[cfg(test)]
mod tests {
	use std::f64::consts::FRAC_PI_2;

	use serde_json::json;

	use super::*;
	use crate::graph::types::GraphPayload;

	fn store() -> GraphStore {
		let payload: GraphPayload = serde_json::from_value(json!({
			"nodes": [{ "id": 1, "name": "A" }, { "id": 2, "name": "B" }, { "id": 3, "name": "C" }],
			"links": [
				{ "source": 1, "target": 2, "label": "relates to" },
				{ "source": 2, "target": 3, "label": "part of" }
			]
		}))
		.unwrap();
		let (mut store, _) = GraphStore::from_payload(&payload);
		store.set_position(&NodeId::from(1), Point::new(0.0, 0.0));
		store.set_position(&NodeId::from(2), Point::new(0.0, 100.0));
		store
	}

	#[test]
	fn edges_run_between_node_positions() {
		let frame = project(&store(), None, None);
		assert_eq!(frame.edges.len(), 1);
		let edge = &frame.edges[0];
		assert_eq!(edge.path(), "M0,0L0,100");
		assert_eq!(edge.label_at, Point::new(0.0, 50.0));
		assert!((edge.label_angle - FRAC_PI_2).abs() < 1e-12);
		assert!((edge.label_angle_degrees() - 90.0).abs() < 1e-9);
	}

	#[test]
	fn unplaced_nodes_are_skipped() {
		let frame = project(&store(), None, None);
		let ids: Vec<_> = frame.nodes.iter().map(|n| n.id.clone()).collect();
		assert_eq!(ids, vec![NodeId::from(1), NodeId::from(2)]);
	}

	#[test]
	fn flags_follow_selection_and_hover() {
		let one = NodeId::from(1);
		let two = NodeId::from(2);
		let frame = project(&store(), Some(&one), Some(&two));
		assert!(frame.nodes[0].selected && !frame.nodes[0].hovered);
		assert!(!frame.nodes[1].selected && frame.nodes[1].hovered);
	}

	#[test]
	fn projection_is_idempotent() {
		let store = store();
		let one = NodeId::from(1);
		assert_eq!(project(&store, Some(&one), None), project(&store, Some(&one), None));
	}
}
