//! Coordinate assignment: geometric layouts and the force simulation, plus
//! the generation-stamped scheduler that runs them off the interaction path.

mod config;
mod deterministic;
mod force;
mod rings;
mod task;

pub use config::{
	CategoryKey, LayoutConfig, LayoutError, LayoutKind, Point, Positions, SimulationParameters,
};
pub use deterministic::{category_of, concentric, grid, hierarchical};
pub use force::ForceSimulation;
pub use rings::{MIN_ARC_LENGTH, MIN_RING_RADIUS, RING_SPACING, RingRegistry, ring_radius};
pub use task::{
	CancelToken, DispatchMode, LayoutScheduler, LayoutSnapshot, LayoutTask, compute_layout,
};
