use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::{debug, warn};

use super::id::NodeId;
use super::types::{Edge, Node, Point};
use crate::config::LayoutConfig;

/// Spacing of the spiral used for nodes with no placed neighbor.
const INITIAL_RADIUS: f64 = 10.0;

/// The physics backend behind [`super::GraphView`].
///
/// The host animation loop drives the simulation by calling [`Self::step`]
/// once per frame and redrawing afterwards.
pub trait LayoutProvider {
	/// Bind every node and edge not yet known. Known ones keep their state.
	fn seed(&mut self, nodes: &[Node], edges: &[Edge]);
	/// Advance one tick. Returns `false` when the simulation is at rest.
	fn step(&mut self, dt: f32) -> bool;
	/// Where `id` is now.
	fn position(&self, id: &NodeId) -> Option<Point>;
	/// Where every bound node is now.
	fn positions(&self) -> Vec<(NodeId, Point)>;
	/// Hold `id` at `at` until released.
	fn set_pinned(&mut self, id: &NodeId, at: Point);
	/// Let `id` move again.
	fn clear_pinned(&mut self, id: &NodeId);
	/// Energy the simulation relaxes toward. Non-zero keeps it running.
	fn set_energy_target(&mut self, target: f64);
	/// Point the centering force pulls toward.
	fn set_center(&mut self, center: Point);
	/// Whether the simulation is at rest.
	fn is_settled(&self) -> bool;
}

/// Force-directed layout over [`ForceGraph`], with d3-style link distance,
/// centering and energy decay layered on top of the library's charge and
/// spring forces.
pub struct LayoutEngine {
	// Node user data is the slot index into `ids`.
	graph: ForceGraph<usize, ()>,
	config: LayoutConfig,
	ids: Vec<NodeId>,
	slots: HashMap<NodeId, (usize, DefaultNodeIdx)>,
	degree: Vec<usize>,
	links: Vec<(usize, usize)>,
	bound: HashSet<(NodeId, NodeId)>,
	pins: HashMap<usize, Point>,
	center: Point,
	alpha: f64,
	alpha_target: f64,
}

impl LayoutEngine {
	/// An empty layout centered on `center`.
	pub fn new(config: LayoutConfig, center: Point) -> Self {
		Self {
			graph: ForceGraph::new(config.simulation_parameters()),
			config,
			ids: Vec::new(),
			slots: HashMap::new(),
			degree: Vec::new(),
			links: Vec::new(),
			bound: HashSet::new(),
			pins: HashMap::new(),
			center,
			alpha: 1.0,
			alpha_target: 0.0,
		}
	}

	/// Current simulation energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Number of bound nodes.
	pub fn node_count(&self) -> usize {
		self.ids.len()
	}

	/// Where `id` is held, if it is.
	pub fn pinned(&self, id: &NodeId) -> Option<Point> {
		let (slot, _) = self.slots.get(id)?;
		self.pins.get(slot).copied()
	}

	/// Current position of every slot, indexed by slot.
	fn snapshot(&self) -> Vec<Option<Point>> {
		let mut positions = vec![None; self.ids.len()];
		self.graph.visit_nodes(|node| {
			if let Some(p) = positions.get_mut(node.data.user_data) {
				*p = Some(Point::new(node.x() as f64, node.y() as f64));
			}
		});
		positions
	}

	/// Where a node with no stored position enters the layout: next to a placed
	/// neighbor if it has one, otherwise on a spiral around the center.
	fn initial_position(&self, id: &NodeId, edges: &[Edge], placed: &HashMap<NodeId, Point>) -> Point {
		let n = self.ids.len() as f64;
		let angle = n * PI * (3.0 - 5f64.sqrt());
		let neighbor = edges.iter().find_map(|edge| {
			if &edge.source == id {
				placed.get(&edge.target)
			} else if &edge.target == id {
				placed.get(&edge.source)
			} else {
				None
			}
		});
		match neighbor {
			Some(&at) => {
				let r = self.config.link_distance / 2.0;
				at.offset(r * angle.cos(), r * angle.sin())
			}
			None => {
				let r = INITIAL_RADIUS * (0.5 + n).sqrt();
				self.center.offset(r * angle.cos(), r * angle.sin())
			}
		}
	}

	fn apply_link_distance(&mut self) {
		let positions = self.snapshot();
		let mut shifts = vec![(0.0_f64, 0.0_f64); self.ids.len()];

		for &(s, t) in &self.links {
			let (Some(a), Some(b)) = (positions[s], positions[t]) else {
				continue;
			};
			let (dx, dy) = (b.x - a.x, b.y - a.y);
			let len = dx.hypot(dy);
			if len < 1e-6 {
				continue;
			}
			let (ds, dt) = (self.degree[s] as f64, self.degree[t] as f64);
			let strength = 1.0 / ds.min(dt).max(1.0);
			let k = (len - self.config.link_distance) / len * self.alpha * strength;
			let (fx, fy) = (dx * k, dy * k);
			let bias = ds / (ds + dt);
			shifts[t].0 -= fx * bias;
			shifts[t].1 -= fy * bias;
			shifts[s].0 += fx * (1.0 - bias);
			shifts[s].1 += fy * (1.0 - bias);
		}

		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			if let Some(&(sx, sy)) = shifts.get(node.data.user_data) {
				node.data.x += sx as f32;
				node.data.y += sy as f32;
			}
		});
	}

	fn apply_centering(&mut self) {
		let (mut sum_x, mut sum_y, mut n) = (0.0_f64, 0.0_f64, 0usize);
		self.graph.visit_nodes(|node| {
			sum_x += node.x() as f64;
			sum_y += node.y() as f64;
			n += 1;
		});
		if n == 0 {
			return;
		}
		let strength = self.config.center_strength;
		let dx = (self.center.x - sum_x / n as f64) * strength;
		let dy = (self.center.y - sum_y / n as f64) * strength;
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x += dx as f32;
				node.data.y += dy as f32;
			}
		});
	}

	fn hold_pins(&mut self) {
		let pins = &self.pins;
		self.graph.visit_nodes_mut(|node| {
			if let Some(p) = pins.get(&node.data.user_data) {
				node.data.x = p.x as f32;
				node.data.y = p.y as f32;
				node.data.is_anchor = true;
			}
		});
	}
}

impl LayoutProvider for LayoutEngine {
	fn seed(&mut self, nodes: &[Node], edges: &[Edge]) {
		let mut placed: HashMap<NodeId, Point> = self.positions().into_iter().collect();
		let (mut new_nodes, mut new_links) = (0usize, 0usize);

		for node in nodes {
			if self.slots.contains_key(&node.id) {
				continue;
			}
			let at = node
				.pinned
				.or(node.position)
				.unwrap_or_else(|| self.initial_position(&node.id, edges, &placed));
			let slot = self.ids.len();
			let idx = self.graph.add_node(NodeData {
				x: at.x as f32,
				y: at.y as f32,
				mass: self.config.node_mass,
				is_anchor: node.pinned.is_some(),
				user_data: slot,
			});
			if let Some(pin) = node.pinned {
				self.pins.insert(slot, pin);
			}
			self.ids.push(node.id.clone());
			self.slots.insert(node.id.clone(), (slot, idx));
			self.degree.push(0);
			placed.insert(node.id.clone(), at);
			new_nodes += 1;
		}

		for edge in edges {
			let key = edge.key();
			if self.bound.contains(&key) {
				continue;
			}
			let (Some(&(s, s_idx)), Some(&(t, t_idx))) =
				(self.slots.get(&edge.source), self.slots.get(&edge.target))
			else {
				warn!("layout: edge {} -> {} has an unbound endpoint", edge.source, edge.target);
				continue;
			};
			if s == t {
				continue;
			}
			let reverse_bound = self.bound.contains(&(edge.target.clone(), edge.source.clone()));
			self.bound.insert(key);
			// The library graph is undirected; one spring per pair.
			if reverse_bound {
				continue;
			}
			self.graph.add_edge(s_idx, t_idx, EdgeData::default());
			self.links.push((s, t));
			self.degree[s] += 1;
			self.degree[t] += 1;
			new_links += 1;
		}

		if new_nodes > 0 || new_links > 0 {
			self.alpha = 1.0;
			debug!(
				"layout: bound {} nodes and {} links, restarting ({} nodes total)",
				new_nodes,
				new_links,
				self.ids.len()
			);
		}
	}

	fn step(&mut self, dt: f32) -> bool {
		if self.ids.is_empty() || self.is_settled() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		self.graph.update(dt * self.alpha as f32);
		self.apply_link_distance();
		self.apply_centering();
		self.hold_pins();
		true
	}

	fn position(&self, id: &NodeId) -> Option<Point> {
		let &(slot, _) = self.slots.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.data.user_data == slot {
				found = Some(Point::new(node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	fn positions(&self) -> Vec<(NodeId, Point)> {
		self.snapshot()
			.into_iter()
			.zip(&self.ids)
			.filter_map(|(p, id)| p.map(|p| (id.clone(), p)))
			.collect()
	}

	fn set_pinned(&mut self, id: &NodeId, at: Point) {
		let Some(&(slot, _)) = self.slots.get(id) else {
			return;
		};
		self.pins.insert(slot, at);
		self.hold_pins();
	}

	fn clear_pinned(&mut self, id: &NodeId) {
		let Some(&(slot, _)) = self.slots.get(id) else {
			return;
		};
		if self.pins.remove(&slot).is_none() {
			return;
		}
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data == slot {
				node.data.is_anchor = false;
			}
		});
	}

	fn set_energy_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	fn set_center(&mut self, center: Point) {
		self.center = center;
	}

	fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const DT: f32 = 0.016;
	const CENTER: Point = Point::new(500.0, 400.0);

	fn node(id: i64) -> Node {
		Node::new(NodeId::from(id), format!("N{id}"))
	}

	fn edge(source: i64, target: i64) -> Edge {
		Edge {
			source: NodeId::from(source),
			target: NodeId::from(target),
			label: "relates to".into(),
		}
	}

	fn engine() -> LayoutEngine {
		LayoutEngine::new(LayoutConfig::default(), CENTER)
	}

	fn run(engine: &mut LayoutEngine, ticks: usize) {
		for _ in 0..ticks {
			engine.step(DT);
		}
	}

	#[test]
	fn seeded_nodes_get_distinct_positions() {
		let mut engine = engine();
		let nodes: Vec<_> = (1..=6).map(node).collect();
		engine.seed(&nodes, &[edge(1, 2), edge(1, 3)]);

		let positions = engine.positions();
		assert_eq!(positions.len(), 6);
		for (i, (_, a)) in positions.iter().enumerate() {
			for (_, b) in &positions[i + 1..] {
				assert!(a.distance(*b) > 1.0);
			}
		}
	}

	#[test]
	fn stored_positions_are_used_when_present() {
		let mut engine = engine();
		let mut a = node(1);
		a.position = Some(Point::new(12.0, 34.0));
		engine.seed(&[a], &[]);
		assert_eq!(engine.position(&NodeId::from(1)), Some(Point::new(12.0, 34.0)));
	}

	#[test]
	fn reseeding_keeps_existing_positions() {
		let mut engine = engine();
		engine.seed(&[node(1), node(2)], &[edge(1, 2)]);
		run(&mut engine, 50);
		let before = engine.positions();

		engine.seed(&[node(1), node(2), node(3)], &[edge(1, 2), edge(3, 1)]);
		for (id, at) in &before {
			assert_eq!(engine.position(id), Some(*at));
		}
		let one = engine.position(&NodeId::from(1)).unwrap();
		let three = engine.position(&NodeId::from(3)).unwrap();
		assert!((one.distance(three) - 75.0).abs() < 1e-3);
		assert_eq!(engine.alpha(), 1.0);
	}

	#[test]
	fn settles_within_bounded_ticks() {
		let mut engine = engine();
		engine.seed(&[node(1), node(2), node(3)], &[edge(1, 2), edge(2, 3)]);
		run(&mut engine, 400);
		assert!(engine.is_settled());

		let at_rest = engine.positions();
		assert!(!engine.step(DT));
		assert_eq!(engine.positions(), at_rest);
	}

	#[test]
	fn reseeding_unchanged_graph_does_not_restart() {
		let mut engine = engine();
		let nodes = [node(1), node(2)];
		let edges = [edge(1, 2)];
		engine.seed(&nodes, &edges);
		run(&mut engine, 400);
		engine.seed(&nodes, &edges);
		assert!(engine.is_settled());
	}

	#[test]
	fn energy_target_keeps_the_simulation_warm() {
		let mut engine = engine();
		engine.seed(&[node(1), node(2)], &[edge(1, 2)]);
		engine.set_energy_target(0.3);
		run(&mut engine, 1000);
		assert!(!engine.is_settled());
		assert!((engine.alpha() - 0.3).abs() < 0.01);

		engine.set_energy_target(0.0);
		run(&mut engine, 400);
		assert!(engine.is_settled());
	}

	#[test]
	fn pinned_node_is_held_then_released() {
		let mut engine = engine();
		engine.seed(&[node(1), node(2)], &[edge(1, 2)]);
		let two = NodeId::from(2);
		let target = Point::new(100.0, 200.0);

		engine.set_pinned(&two, target);
		for _ in 0..10 {
			engine.step(DT);
			assert_eq!(engine.position(&two), Some(target));
		}
		assert_eq!(engine.pinned(&two), Some(target));

		engine.clear_pinned(&two);
		assert_eq!(engine.pinned(&two), None);
		assert!(engine.step(DT));
		assert_ne!(engine.position(&two), Some(target));
	}

	#[test]
	fn links_are_pulled_toward_their_distance() {
		let mut engine = engine();
		let (mut a, mut b) = (node(1), node(2));
		a.position = Some(Point::new(0.0, 400.0));
		b.position = Some(Point::new(1000.0, 400.0));
		engine.seed(&[a, b], &[edge(1, 2)]);
		run(&mut engine, 400);

		let one = engine.position(&NodeId::from(1)).unwrap();
		let two = engine.position(&NodeId::from(2)).unwrap();
		assert!(one.distance(two) < 500.0);
	}

	#[test]
	fn free_nodes_are_centered() {
		let mut engine = engine();
		let (mut a, mut b) = (node(1), node(2));
		a.position = Some(Point::new(0.0, 0.0));
		b.position = Some(Point::new(60.0, 0.0));
		engine.seed(&[a, b], &[]);
		engine.step(DT);

		let mean = engine
			.positions()
			.iter()
			.fold(Point::default(), |acc, (_, p)| acc.offset(p.x / 2.0, p.y / 2.0));
		assert!(mean.distance(CENTER) < 0.01);
	}

	#[test]
	fn reverse_edges_share_one_spring() {
		let mut engine = engine();
		engine.seed(&[node(1), node(2)], &[edge(1, 2), edge(2, 1)]);
		assert_eq!(engine.links.len(), 1);
		assert_eq!(engine.degree, vec![1, 1]);
	}

	#[test]
	fn empty_engine_never_steps() {
		let mut engine = engine();
		assert!(!engine.step(DT));
		assert_eq!(engine.node_count(), 0);
	}
}
