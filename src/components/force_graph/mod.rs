mod component;
mod render;
mod state;

pub use component::ForceGraphCanvas;
pub use state::{GraphHandle, GraphView, SelectedTopic};
