//! Incremental force-directed graph model.
//!
//! - [`GraphStore`] holds nodes and edges and merges fetched deltas into them
//! - [`LayoutEngine`] runs the physics over the store's node set
//! - [`InteractionController`] tracks selection and drags
//! - [`project`] turns positions into drawable primitives each tick
//!
//! None of this touches the DOM. The canvas component in
//! `components::force_graph` wires it to pointer events and a 2D context.

mod id;
mod interaction;
mod layout;
mod projection;
mod store;
mod types;

pub use id::NodeId;
pub use interaction::{
	DEFAULT_CLICK_THRESHOLD, DragGesture, InteractionController, InteractionEvent, InteractionState,
};
pub use layout::{LayoutEngine, LayoutProvider};
pub use projection::{EdgeSprite, Frame, NodeSprite, project};
pub use store::{GraphStore, MergeReport};
pub use types::{Edge, GraphPayload, Node, Point, RawLink, RawNode};
