use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::id::NodeId;
use super::types::{Edge, GraphPayload, Node, Point};
use crate::error::RecordError;

/// What a merge changed, plus the records it had to skip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeReport {
	/// Ids that were new, in payload order.
	pub added_nodes: Vec<NodeId>,
	/// Known nodes whose name or description changed.
	pub updated_nodes: usize,
	/// Edges that were new.
	pub added_edges: usize,
	/// Edges already present, skipped.
	pub duplicate_edges: usize,
	/// Records that could not be used.
	pub rejected: Vec<RecordError>,
}

impl MergeReport {
	/// Whether every record was usable.
	pub fn is_clean(&self) -> bool {
		self.rejected.is_empty()
	}

	/// Whether the store is different after the merge.
	pub fn changed(&self) -> bool {
		!self.added_nodes.is_empty() || self.updated_nodes > 0 || self.added_edges > 0
	}
}

/// The session's node and edge set. It only ever grows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphStore {
	nodes: Vec<Node>,
	index: HashMap<NodeId, usize>,
	edges: Vec<Edge>,
	edge_keys: HashSet<(NodeId, NodeId)>,
}

impl GraphStore {
	/// An empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// A store holding `payload`.
	pub fn from_payload(payload: &GraphPayload) -> (Self, MergeReport) {
		let mut store = Self::new();
		let report = store.merge(payload);
		(store, report)
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in insertion order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the store has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Whether `id` is stored.
	pub fn contains(&self, id: &NodeId) -> bool {
		self.index.contains_key(id)
	}

	/// The node with this id.
	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
		self.index.get(id).map(|&i| &mut self.nodes[i])
	}

	/// Ids linked to `id` in either direction.
	pub fn neighbors<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
		self.edges.iter().filter_map(move |edge| {
			if &edge.source == id {
				Some(&edge.target)
			} else if &edge.target == id {
				Some(&edge.source)
			} else {
				None
			}
		})
	}

	/// Record where the layout put `id`.
	pub fn set_position(&mut self, id: &NodeId, at: Point) {
		if let Some(node) = self.node_mut(id) {
			node.position = Some(at);
		}
	}

	/// Hold `id` at `at`, or release it with `None`.
	pub fn set_pinned(&mut self, id: &NodeId, at: Option<Point>) {
		if let Some(node) = self.node_mut(id) {
			node.pinned = at;
		}
	}

	/// Replace a node's description. Returns `false` for unknown ids.
	pub fn set_description(&mut self, id: &NodeId, description: impl Into<String>) -> bool {
		match self.node_mut(id) {
			Some(node) => {
				node.description = Some(description.into());
				true
			}
			None => false,
		}
	}

	/// Non-destructive merge: returns the union and leaves `self` untouched.
	pub fn merged(&self, incoming: &GraphPayload) -> (GraphStore, MergeReport) {
		let mut next = self.clone();
		let report = next.merge(incoming);
		(next, report)
	}

	/// Union `incoming` into the store.
	///
	/// Known nodes keep their position and pin; their name and description
	/// take the incoming value when one is present. Edges are unique per
	/// directed `(source, target)` pair. Records that cannot be used are
	/// skipped and listed in the report.
	pub fn merge(&mut self, incoming: &GraphPayload) -> MergeReport {
		let mut report = MergeReport::default();
		let mut seen = HashSet::new();

		for (index, raw) in incoming.nodes.iter().enumerate() {
			let Some(id) = raw.id.as_ref().and_then(NodeId::from_value) else {
				report.rejected.push(RecordError::MissingNodeId { index });
				continue;
			};
			if !seen.insert(id.clone()) {
				report.rejected.push(RecordError::DuplicateNodeId(id));
				continue;
			}

			if let Some(node) = self.node_mut(&id) {
				let mut changed = false;
				if let Some(name) = &raw.name {
					if &node.name != name {
						node.name = name.clone();
						changed = true;
					}
				}
				if raw.description.is_some() && node.description != raw.description {
					node.description = raw.description.clone();
					changed = true;
				}
				if changed {
					report.updated_nodes += 1;
				}
				continue;
			}

			let name = raw.name.clone().unwrap_or_else(|| id.to_string());
			let mut node = Node::new(id.clone(), name);
			node.description = raw.description.clone();
			self.index.insert(id.clone(), self.nodes.len());
			self.nodes.push(node);
			report.added_nodes.push(id);
		}

		for (index, raw) in incoming.links.iter().enumerate() {
			let source = raw.source.as_ref().and_then(NodeId::from_value);
			let target = raw.target.as_ref().and_then(NodeId::from_value);
			let (Some(source), Some(target)) = (source, target) else {
				report.rejected.push(RecordError::MissingEndpoint { index });
				continue;
			};
			if source == target {
				report.rejected.push(RecordError::SelfLoop(source));
				continue;
			}
			if !self.contains(&source) || !self.contains(&target) {
				report.rejected.push(RecordError::DanglingEdge {
					from: source,
					to: target,
				});
				continue;
			}
			let edge = Edge {
				source,
				target,
				label: raw.label.clone().unwrap_or_default(),
			};
			if !self.edge_keys.insert(edge.key()) {
				report.duplicate_edges += 1;
				continue;
			}
			self.edges.push(edge);
			report.added_edges += 1;
		}

		for rejected in &report.rejected {
			warn!("skipping graph record: {}", rejected);
		}
		debug!(
			"merged graph: +{} nodes, {} updated, +{} edges ({} duplicate)",
			report.added_nodes.len(),
			report.updated_nodes,
			report.added_edges,
			report.duplicate_edges
		);
		report
	}
}
