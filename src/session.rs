//! Page status: initial load, requests in flight, user-facing notices.

use log::{error, info, warn};

use crate::api::ExpandNodeResponse;
use crate::error::GraphError;
use crate::graph::{GraphPayload, NodeId};

/// Progress of the initial graph fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState {
	/// Waiting for the first response.
	#[default]
	Loading,
	/// The graph is loaded.
	Ready,
	/// The fetch failed with this message.
	Failed(String),
}

/// Request bookkeeping for the explorer page.
#[derive(Clone, Debug, Default)]
pub struct Session {
	load: LoadState,
	adding: bool,
	expanding: Option<NodeId>,
	notice: Option<String>,
}

impl Session {
	/// A session waiting for its initial load.
	pub fn new() -> Self {
		Self::default()
	}

	/// Where the initial load stands.
	pub fn load_state(&self) -> &LoadState {
		&self.load
	}

	/// Whether the initial load succeeded.
	pub fn is_ready(&self) -> bool {
		self.load == LoadState::Ready
	}

	/// Whether an add-topic request is in flight.
	pub fn is_adding(&self) -> bool {
		self.adding
	}

	/// The node whose expansion is in flight.
	pub fn expanding(&self) -> Option<&NodeId> {
		self.expanding.as_ref()
	}

	/// Whether any request is in flight.
	pub fn is_processing(&self) -> bool {
		self.adding || self.expanding.is_some()
	}

	/// Message to show the user, if any.
	pub fn notice(&self) -> Option<&str> {
		self.notice.as_deref()
	}

	/// Hide the current notice.
	pub fn dismiss_notice(&mut self) {
		self.notice = None;
	}

	/// Record the initial fetch. Only a successful load hands back a payload
	/// to build the view from.
	pub fn initial_loaded(&mut self, result: Result<GraphPayload, GraphError>) -> Option<GraphPayload> {
		match result {
			Ok(payload) => {
				info!(
					"received graph data: {} nodes, {} links",
					payload.nodes.len(),
					payload.links.len()
				);
				self.load = LoadState::Ready;
				Some(payload)
			}
			Err(err) => {
				error!("error fetching graph data: {}", err);
				self.load = LoadState::Failed(err.to_string());
				None
			}
		}
	}

	/// Start an add-topic request. Returns the trimmed topic, or `None` when
	/// the topic is blank, the graph is not loaded, or an add is already in
	/// flight.
	pub fn begin_add(&mut self, topic: &str) -> Option<String> {
		let topic = topic.trim();
		if topic.is_empty() || self.adding || !self.is_ready() {
			return None;
		}
		self.adding = true;
		Some(topic.to_owned())
	}

	/// Finish the in-flight add. A failure becomes the notice.
	pub fn add_finished(&mut self, result: Result<GraphPayload, GraphError>) -> Option<GraphPayload> {
		self.adding = false;
		match result {
			Ok(graph) => {
				self.notice = None;
				Some(graph)
			}
			Err(err) => {
				error!("error adding node: {}", err);
				self.notice = Some(format!("Failed to add topic: {err}"));
				None
			}
		}
	}

	/// Start an expansion of `id`. Refused while another one is in flight.
	pub fn begin_expand(&mut self, id: &NodeId) -> bool {
		if let Some(current) = &self.expanding {
			info!("expansion of {} still in flight, not expanding {}", current, id);
			return false;
		}
		self.expanding = Some(id.clone());
		true
	}

	/// Finish the in-flight expansion. Failures are logged and otherwise
	/// ignored so the rendered graph stays as it is.
	pub fn expand_finished(
		&mut self,
		result: Result<ExpandNodeResponse, GraphError>,
	) -> Option<ExpandNodeResponse> {
		let id = self.expanding.take();
		match result {
			Ok(response) => Some(response),
			Err(err) => {
				match id {
					Some(id) => warn!("error expanding node {}: {}", id, err),
					None => warn!("error expanding node: {}", err),
				}
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ready() -> Session {
		let mut session = Session::new();
		session.initial_loaded(Ok(GraphPayload::default()));
		session
	}

	#[test]
	fn starts_loading() {
		assert_eq!(Session::new().load_state(), &LoadState::Loading);
		assert!(!Session::new().is_processing());
	}

	#[test]
	fn initial_failure_blocks_the_view() {
		let mut session = Session::new();
		let payload = session.initial_loaded(Err(GraphError::Status(500)));
		assert!(payload.is_none());
		assert_eq!(
			session.load_state(),
			&LoadState::Failed("network response was not ok: 500".into())
		);
		assert_eq!(session.begin_add("anything"), None);
	}

	#[test]
	fn initial_success_hands_back_the_payload() {
		let mut session = Session::new();
		assert!(session.initial_loaded(Ok(GraphPayload::default())).is_some());
		assert!(session.is_ready());
	}

	#[test]
	fn blank_topics_are_ignored() {
		let mut session = ready();
		assert_eq!(session.begin_add("   "), None);
		assert!(!session.is_adding());
	}

	#[test]
	fn one_add_at_a_time() {
		let mut session = ready();
		assert_eq!(session.begin_add("  Rust "), Some("Rust".to_string()));
		assert!(session.is_processing());
		assert_eq!(session.begin_add("Go"), None);

		assert!(session.add_finished(Ok(GraphPayload::default())).is_some());
		assert!(!session.is_adding());
		assert_eq!(session.begin_add("Go"), Some("Go".to_string()));
	}

	#[test]
	fn failed_add_leaves_a_notice() {
		let mut session = ready();
		session.begin_add("Rust");
		let result = session.add_finished(Err(GraphError::Network("offline".into())));
		assert!(result.is_none());
		assert_eq!(session.notice(), Some("Failed to add topic: network error: offline"));
		assert!(session.is_ready());

		session.dismiss_notice();
		assert_eq!(session.notice(), None);
	}

	#[test]
	fn one_expansion_at_a_time() {
		let mut session = ready();
		let (one, two) = (NodeId::from(1), NodeId::from(2));
		assert!(session.begin_expand(&one));
		assert!(!session.begin_expand(&two));
		assert_eq!(session.expanding(), Some(&one));

		assert!(session.expand_finished(Err(GraphError::Status(502))).is_none());
		assert_eq!(session.expanding(), None);
		assert_eq!(session.notice(), None);
		assert!(session.begin_expand(&two));
	}
}
