//! Error types for fetching and merging graph data.

use thiserror::Error;

use crate::graph::NodeId;

/// A failed backend request.
#[derive(Debug, Error)]
pub enum GraphError {
	/// The backend answered with a non-2xx status.
	#[error("network response was not ok: {0}")]
	Status(u16),
	/// The request never got a response.
	#[error("network error: {0}")]
	Network(String),
	/// The body was not the expected JSON.
	#[error("malformed graph payload: {0}")]
	Malformed(String),
}

impl GraphError {
	/// Non-2xx statuses and transport failures. Both surface as a failed fetch.
	pub fn is_fetch_failure(&self) -> bool {
		matches!(self, Self::Status(_) | Self::Network(_))
	}
}

impl From<serde_json::Error> for GraphError {
	fn from(err: serde_json::Error) -> Self {
		Self::Malformed(err.to_string())
	}
}

/// A record the store skipped while merging.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RecordError {
	/// A node record without a usable id, by position in the payload.
	#[error("node #{index} has no usable id")]
	MissingNodeId {
		/// Position in the payload's node list.
		index: usize,
	},
	/// A second record for an id already seen in the same payload.
	#[error("node {0} appears more than once in the payload")]
	DuplicateNodeId(NodeId),
	/// A link record without a usable source or target, by position.
	#[error("link #{index} is missing its source or target")]
	MissingEndpoint {
		/// Position in the payload's link list.
		index: usize,
	},
	/// A link to a node that is neither stored nor in the payload.
	#[error("link {from} -> {to} references an unknown node")]
	DanglingEdge {
		/// Source id as sent.
		from: NodeId,
		/// Target id as sent.
		to: NodeId,
	},
	/// A link from a node to itself.
	#[error("link {0} -> {0} points at itself")]
	SelfLoop(NodeId),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_message_carries_the_code() {
		let err = GraphError::Status(503);
		assert_eq!(err.to_string(), "network response was not ok: 503");
		assert!(err.is_fetch_failure());
	}

	#[test]
	fn decode_errors_are_malformed() {
		let err: GraphError = serde_json::from_str::<u32>("{").unwrap_err().into();
		assert!(matches!(err, GraphError::Malformed(_)));
		assert!(!err.is_fetch_failure());
	}
}
