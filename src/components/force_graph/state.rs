use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};

use crate::config::ExplorerConfig;
use crate::graph::{
	Frame, GraphPayload, GraphStore, InteractionController, InteractionEvent, LayoutEngine,
	LayoutProvider, MergeReport, Node, NodeId, Point, project,
};

pub const NODE_RADIUS: f64 = 30.0;
pub const HIT_RADIUS: f64 = NODE_RADIUS;

/// Shared handle the page, the canvas and the animation loop hold.
pub type GraphHandle = Rc<RefCell<Option<GraphView>>>;

/// Name and description of the selected topic, for the details panel.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedTopic {
	pub id: NodeId,
	pub name: String,
	pub description: Option<String>,
}

impl From<&Node> for SelectedTopic {
	fn from(node: &Node) -> Self {
		Self {
			id: node.id.clone(),
			name: node.name.clone(),
			description: node.description.clone(),
		}
	}
}

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// The explorer's view model: graph data, layout, interaction state and the
/// pan/zoom transform, owned in one place.
pub struct GraphView<L: LayoutProvider = LayoutEngine> {
	store: GraphStore,
	layout: L,
	interaction: InteractionController,
	pub transform: ViewTransform,
	pan: PanState,
	// World position of the dragged node when the press started.
	drag_start: Option<Point>,
	drag_alpha_target: f64,
	pub width: f64,
	pub height: f64,
}

impl GraphView<LayoutEngine> {
	pub fn new(
		payload: &GraphPayload,
		width: f64,
		height: f64,
		config: &ExplorerConfig,
	) -> (Self, MergeReport) {
		let layout = LayoutEngine::new(config.layout.clone(), Point::new(width / 2.0, height / 2.0));
		Self::with_layout(layout, payload, width, height, config)
	}
}

impl<L: LayoutProvider> GraphView<L> {
	pub fn with_layout(
		layout: L,
		payload: &GraphPayload,
		width: f64,
		height: f64,
		config: &ExplorerConfig,
	) -> (Self, MergeReport) {
		let mut view = Self {
			store: GraphStore::new(),
			layout,
			interaction: InteractionController::new(config.click_threshold),
			transform: ViewTransform::default(),
			pan: PanState::default(),
			drag_start: None,
			drag_alpha_target: config.layout.drag_alpha_target,
			width,
			height,
		};
		let report = view.merge(payload);
		info!(
			"graph view ready: {} nodes, {} edges",
			view.store.len(),
			view.store.edges().len()
		);
		(view, report)
	}

	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	/// Merge fetched data and bind whatever is new into the running layout.
	pub fn merge(&mut self, payload: &GraphPayload) -> MergeReport {
		let report = self.store.merge(payload);
		self.layout.seed(self.store.nodes(), self.store.edges());
		self.sync_positions();
		report
	}

	pub fn tick(&mut self, dt: f32) -> bool {
		let moved = self.layout.step(dt);
		if moved {
			self.sync_positions();
		}
		moved
	}

	fn sync_positions(&mut self) {
		for (id, at) in self.layout.positions() {
			self.store.set_position(&id, at);
		}
	}

	pub fn frame(&self) -> Frame {
		project(
			&self.store,
			self.interaction.selected(),
			self.interaction.hovered(),
		)
	}

	pub fn selected_node(&self) -> Option<&Node> {
		self.store.node(self.interaction.selected()?)
	}

	pub fn selected_topic(&self) -> Option<SelectedTopic> {
		self.selected_node().map(SelectedTopic::from)
	}

	pub fn is_hovering(&self) -> bool {
		self.interaction.hovered().is_some()
	}

	/// Store the summary returned for an expanded node as its description.
	pub fn attach_summary(&mut self, id: &NodeId, summary: &str) -> bool {
		self.store.set_description(id, summary)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let at = {
			let (gx, gy) = self.screen_to_graph(sx, sy);
			Point::new(gx, gy)
		};
		// Last drawn is on top.
		self.store
			.nodes()
			.iter()
			.rev()
			.find(|node| node.position.is_some_and(|p| p.distance(at) < HIT_RADIUS))
			.map(|node| node.id.clone())
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		let hit = self.node_at_position(sx, sy);
		match &hit {
			Some(id) => {
				self.drag_start = self.store.node(id).and_then(|node| node.position);
			}
			None => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
		self.interaction.pointer_down(hit, Point::new(sx, sy));
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.interaction.dragging().is_none() {
			let hovered = self.node_at_position(sx, sy);
			self.interaction.set_hovered(hovered);
		}
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
		let events = self.interaction.pointer_move(Point::new(sx, sy));
		self.apply(events);
	}

	/// Finish a press. Returns the node to expand when the press was a click
	/// that selected a node.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Option<NodeId> {
		self.pan.active = false;
		let events = self.interaction.pointer_up(Point::new(sx, sy));
		self.drag_start = None;
		self.apply(events)
	}

	pub fn pointer_leave(&mut self) {
		self.pan.active = false;
		let events = self.interaction.pointer_leave();
		self.drag_start = None;
		self.apply(events);
	}

	/// Zoom around the pointer so the point under it stays put.
	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout.set_center(Point::new(width / 2.0, height / 2.0));
	}

	fn apply(&mut self, events: Vec<InteractionEvent>) -> Option<NodeId> {
		let mut expand = None;
		for event in events {
			match event {
				InteractionEvent::Warm => self.layout.set_energy_target(self.drag_alpha_target),
				InteractionEvent::Pin { node, offset } => {
					if let Some(start) = self.drag_start {
						let k = self.transform.k;
						let at = start.offset(offset.x / k, offset.y / k);
						self.layout.set_pinned(&node, at);
						self.store.set_pinned(&node, Some(at));
						self.store.set_position(&node, at);
					}
				}
				InteractionEvent::Release(node) => {
					self.layout.clear_pinned(&node);
					self.store.set_pinned(&node, None);
				}
				InteractionEvent::Cool => self.layout.set_energy_target(0.0),
				InteractionEvent::Expand(node) => {
					debug!("node {} selected", node);
					expand = Some(node);
				}
				InteractionEvent::Deselect => debug!("selection cleared"),
			}
		}
		expand
	}
}
