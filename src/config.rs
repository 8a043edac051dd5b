//! Runtime configuration for the explorer.

use force_graph::SimulationParameters;

/// Backend used when `KNOWLEDGE_GRAPH_API` is not set at build time.
pub const DEFAULT_API_BASE: &str = "http://localhost:5001";

/// Physics tuning for [`crate::graph::LayoutEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Charge between every node pair.
	pub charge: f32,
	/// Spring stiffness of the library's edge springs.
	pub spring: f32,
	/// Cap on the force applied to a node in one tick.
	pub force_max: f32,
	/// Scale from accumulated force to velocity.
	pub node_speed: f32,
	/// Velocity kept from one tick to the next.
	pub damping: f32,
	/// Mass given to every node.
	pub node_mass: f32,
	/// Separation the link correction pulls connected nodes toward.
	pub link_distance: f64,
	/// Fraction of the offset to the viewport center removed per tick.
	pub center_strength: f64,
	/// Energy below which the simulation idles.
	pub alpha_min: f64,
	/// Fraction of the gap to the energy target closed per tick.
	pub alpha_decay: f64,
	/// Energy target held while a node is dragged.
	pub drag_alpha_target: f64,
}

impl LayoutConfig {
	/// Ticks from full energy until the simulation idles.
	pub const SETTLE_TICKS: f64 = 300.0;

	/// The library parameters for these constants.
	pub fn simulation_parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.charge,
			force_spring: self.spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping,
		}
	}
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge: 300.0,
			spring: 0.02,
			force_max: 100.0,
			node_speed: 3000.0,
			damping: 0.6,
			node_mass: 10.0,
			link_distance: 150.0,
			center_strength: 1.0,
			alpha_min,
			alpha_decay: 1.0 - f64::powf(alpha_min, 1.0 / Self::SETTLE_TICKS),
			drag_alpha_target: 0.3,
		}
	}
}

/// Top-level explorer settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplorerConfig {
	/// Backend origin, without a trailing slash.
	pub api_base: String,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// Pointer travel, in screen pixels, below which a press counts as a click.
	pub click_threshold: f64,
	/// Physics tuning.
	pub layout: LayoutConfig,
}

impl ExplorerConfig {
	/// Defaults, with the API base taken from `KNOWLEDGE_GRAPH_API` when it
	/// was set at compile time.
	pub fn from_env() -> Self {
		let mut config = Self::default();
		if let Some(base) = option_env!("KNOWLEDGE_GRAPH_API") {
			config.api_base = base.trim_end_matches('/').to_owned();
		}
		config
	}
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			api_base: DEFAULT_API_BASE.to_owned(),
			width: 1000.0,
			height: 800.0,
			click_threshold: crate::graph::DEFAULT_CLICK_THRESHOLD,
			layout: LayoutConfig::default(),
		}
	}
}
