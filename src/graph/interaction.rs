//! Selection and drag state machine.
//!
//! Pointer positions are screen coordinates. The controller never touches
//! the layout itself; it returns [`InteractionEvent`]s for the caller to
//! apply.

use super::id::NodeId;
use super::types::Point;

/// Pointer travel, in screen pixels, below which a press is a click.
pub const DEFAULT_CLICK_THRESHOLD: f64 = 5.0;

/// A press on a node that may become a drag.
#[derive(Clone, Debug, PartialEq)]
pub struct DragGesture {
	/// The pressed node.
	pub node: NodeId,
	/// Pointer position at the press.
	pub origin: Point,
	/// Furthest the pointer has been from `origin`.
	pub travelled: f64,
	/// Set once `travelled` crosses the click threshold.
	pub moved: bool,
	/// Selection in place when the press started.
	pub previous: Option<NodeId>,
}

/// Where the pointer interaction stands.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
	/// Nothing selected or pressed.
	#[default]
	Idle,
	/// A node is pressed and may be moving.
	Dragging(DragGesture),
	/// A node is selected.
	Selected(NodeId),
}

/// Side effects requested by a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
	/// Raise the simulation energy while a drag is in progress.
	Warm,
	/// Hold `node` at its press position plus `offset` (screen units).
	Pin {
		/// The dragged node.
		node: NodeId,
		/// Pointer travel since the press.
		offset: Point,
	},
	/// Drop the hold on `node`.
	Release(NodeId),
	/// Let the simulation come to rest again.
	Cool,
	/// `node` was clicked and should be expanded.
	Expand(NodeId),
	/// The selection was cleared.
	Deselect,
}

/// Turns pointer input into selection changes and layout requests.
#[derive(Clone, Debug)]
pub struct InteractionController {
	state: InteractionState,
	click_threshold: f64,
	hovered: Option<NodeId>,
	// Background press origin and the furthest travel since.
	background: Option<(Point, f64)>,
}

impl Default for InteractionController {
	fn default() -> Self {
		Self::new(DEFAULT_CLICK_THRESHOLD)
	}
}

impl InteractionController {
	/// An idle controller with the given click threshold in pixels.
	pub fn new(click_threshold: f64) -> Self {
		Self {
			state: InteractionState::Idle,
			click_threshold,
			hovered: None,
			background: None,
		}
	}

	/// The current state.
	pub fn state(&self) -> &InteractionState {
		&self.state
	}

	/// The selected node. A drag in progress keeps the selection it started
	/// with.
	pub fn selected(&self) -> Option<&NodeId> {
		match &self.state {
			InteractionState::Idle => None,
			InteractionState::Selected(id) => Some(id),
			InteractionState::Dragging(drag) => drag.previous.as_ref(),
		}
	}

	/// The node under a press, if one is pressed.
	pub fn dragging(&self) -> Option<&NodeId> {
		match &self.state {
			InteractionState::Dragging(drag) => Some(&drag.node),
			_ => None,
		}
	}

	/// Whether `id` is the selection.
	pub fn is_selected(&self, id: &NodeId) -> bool {
		self.selected() == Some(id)
	}

	/// The node under the pointer.
	pub fn hovered(&self) -> Option<&NodeId> {
		self.hovered.as_ref()
	}

	/// Returns `true` when the hovered node changed.
	pub fn set_hovered(&mut self, node: Option<NodeId>) -> bool {
		if self.hovered == node {
			return false;
		}
		self.hovered = node;
		true
	}

	/// A press at `at`, on `hit` or on the background.
	pub fn pointer_down(&mut self, hit: Option<NodeId>, at: Point) {
		if self.dragging().is_some() {
			return;
		}
		match hit {
			Some(node) => {
				self.background = None;
				let previous = self.selected().cloned();
				self.state = InteractionState::Dragging(DragGesture {
					node,
					origin: at,
					travelled: 0.0,
					moved: false,
					previous,
				});
			}
			None => self.background = Some((at, 0.0)),
		}
	}

	/// The pointer moved to `at`.
	pub fn pointer_move(&mut self, at: Point) -> Vec<InteractionEvent> {
		if let Some((origin, travelled)) = &mut self.background {
			*travelled = travelled.max(origin.distance(at));
		}
		let threshold = self.click_threshold;
		let InteractionState::Dragging(drag) = &mut self.state else {
			return Vec::new();
		};

		let mut events = Vec::new();
		drag.travelled = drag.travelled.max(drag.origin.distance(at));
		if !drag.moved && drag.travelled >= threshold {
			drag.moved = true;
			events.push(InteractionEvent::Warm);
		}
		if drag.moved {
			events.push(InteractionEvent::Pin {
				node: drag.node.clone(),
				offset: Point::new(at.x - drag.origin.x, at.y - drag.origin.y),
			});
		}
		events
	}

	/// The press ended at `at`.
	pub fn pointer_up(&mut self, at: Point) -> Vec<InteractionEvent> {
		if let Some((origin, travelled)) = self.background.take() {
			if travelled.max(origin.distance(at)) < self.click_threshold {
				return self.clear_selection();
			}
			return Vec::new();
		}

		match std::mem::take(&mut self.state) {
			InteractionState::Dragging(drag) => {
				let travelled = drag.travelled.max(drag.origin.distance(at));
				if drag.moved || travelled >= self.click_threshold {
					self.state = Self::resume(drag.previous);
					let mut events = Vec::new();
					if drag.moved {
						events.push(InteractionEvent::Release(drag.node));
						events.push(InteractionEvent::Cool);
					}
					events
				} else if drag.previous.as_ref() == Some(&drag.node) {
					self.state = InteractionState::Idle;
					vec![InteractionEvent::Deselect]
				} else {
					self.state = InteractionState::Selected(drag.node.clone());
					vec![InteractionEvent::Expand(drag.node)]
				}
			}
			other => {
				self.state = other;
				Vec::new()
			}
		}
	}

	/// The pointer left the surface: finish any drag, forget any background
	/// press and the hover.
	pub fn pointer_leave(&mut self) -> Vec<InteractionEvent> {
		self.background = None;
		self.hovered = None;
		match std::mem::take(&mut self.state) {
			InteractionState::Dragging(drag) => {
				self.state = Self::resume(drag.previous);
				if drag.moved {
					vec![InteractionEvent::Release(drag.node), InteractionEvent::Cool]
				} else {
					Vec::new()
				}
			}
			other => {
				self.state = other;
				Vec::new()
			}
		}
	}

	fn clear_selection(&mut self) -> Vec<InteractionEvent> {
		let was_selected = self.selected().is_some();
		self.state = InteractionState::Idle;
		if was_selected {
			vec![InteractionEvent::Deselect]
		} else {
			Vec::new()
		}
	}

	fn resume(previous: Option<NodeId>) -> InteractionState {
		previous.map_or(InteractionState::Idle, InteractionState::Selected)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn id(n: i64) -> NodeId {
		NodeId::from(n)
	}

	fn click(ctl: &mut InteractionController, node: Option<NodeId>) -> Vec<InteractionEvent> {
		let at = Point::new(50.0, 50.0);
		ctl.pointer_down(node, at);
		ctl.pointer_up(at.offset(1.0, 1.0))
	}

	#[test]
	fn click_selects_and_requests_expansion() {
		let mut ctl = InteractionController::default();
		let events = click(&mut ctl, Some(id(1)));
		assert_eq!(events, vec![InteractionEvent::Expand(id(1))]);
		assert_eq!(ctl.state(), &InteractionState::Selected(id(1)));
	}

	#[test]
	fn clicking_the_selected_node_deselects() {
		let mut ctl = InteractionController::default();
		click(&mut ctl, Some(id(1)));
		let events = click(&mut ctl, Some(id(1)));
		assert_eq!(events, vec![InteractionEvent::Deselect]);
		assert_eq!(ctl.state(), &InteractionState::Idle);
	}

	#[test]
	fn clicking_another_node_moves_the_selection() {
		let mut ctl = InteractionController::default();
		click(&mut ctl, Some(id(1)));
		assert_eq!(click(&mut ctl, Some(id(2))), vec![InteractionEvent::Expand(id(2))]);
		assert!(ctl.is_selected(&id(2)));
		assert!(!ctl.is_selected(&id(1)));
	}

	#[test]
	fn background_click_deselects() {
		let mut ctl = InteractionController::default();
		click(&mut ctl, Some(id(3)));
		assert_eq!(click(&mut ctl, None), vec![InteractionEvent::Deselect]);
		assert_eq!(ctl.selected(), None);
		assert!(click(&mut ctl, None).is_empty());
	}

	#[test]
	fn background_pan_keeps_selection() {
		let mut ctl = InteractionController::default();
		click(&mut ctl, Some(id(3)));
		ctl.pointer_down(None, Point::new(0.0, 0.0));
		ctl.pointer_move(Point::new(40.0, 0.0));
		assert!(ctl.pointer_up(Point::new(2.0, 0.0)).is_empty());
		assert!(ctl.is_selected(&id(3)));
	}

	#[test]
	fn drag_warms_pins_and_releases() {
		let mut ctl = InteractionController::default();
		ctl.pointer_down(Some(id(2)), Point::new(10.0, 10.0));
		assert!(ctl.pointer_move(Point::new(12.0, 10.0)).is_empty());

		let events = ctl.pointer_move(Point::new(20.0, 30.0));
		assert_eq!(
			events,
			vec![
				InteractionEvent::Warm,
				InteractionEvent::Pin {
					node: id(2),
					offset: Point::new(10.0, 20.0)
				}
			]
		);
		assert_eq!(ctl.dragging(), Some(&id(2)));

		// Coming back near the origin is still a drag.
		let events = ctl.pointer_move(Point::new(11.0, 10.0));
		assert_eq!(
			events,
			vec![InteractionEvent::Pin {
				node: id(2),
				offset: Point::new(1.0, 0.0)
			}]
		);
		let events = ctl.pointer_up(Point::new(11.0, 10.0));
		assert_eq!(events, vec![InteractionEvent::Release(id(2)), InteractionEvent::Cool]);
		assert_eq!(ctl.state(), &InteractionState::Idle);
	}

	#[test]
	fn dragging_another_node_keeps_the_selection() {
		let mut ctl = InteractionController::default();
		click(&mut ctl, Some(id(1)));
		ctl.pointer_down(Some(id(2)), Point::new(0.0, 0.0));
		assert!(ctl.is_selected(&id(1)));
		ctl.pointer_move(Point::new(30.0, 0.0));
		ctl.pointer_up(Point::new(30.0, 0.0));
		assert_eq!(ctl.state(), &InteractionState::Selected(id(1)));
	}

	#[test]
	fn leaving_mid_drag_releases_the_node() {
		let mut ctl = InteractionController::default();
		ctl.pointer_down(Some(id(4)), Point::new(0.0, 0.0));
		ctl.pointer_move(Point::new(0.0, 25.0));
		ctl.set_hovered(Some(id(4)));
		assert_eq!(
			ctl.pointer_leave(),
			vec![InteractionEvent::Release(id(4)), InteractionEvent::Cool]
		);
		assert_eq!(ctl.state(), &InteractionState::Idle);
		assert_eq!(ctl.hovered(), None);
	}

	#[test]
	fn hover_reports_changes_only() {
		let mut ctl = InteractionController::default();
		assert!(ctl.set_hovered(Some(id(1))));
		assert!(!ctl.set_hovered(Some(id(1))));
		assert!(ctl.set_hovered(None));
	}
}
