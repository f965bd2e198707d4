//! Transient view state: selection, drag, pan/zoom, and viewport culling.

mod controller;
mod culler;
mod frame;
mod transform;

pub use controller::{InteractionConfig, InteractionController, NodeState};
pub use culler::{Viewport, ViewportCuller, visible_nodes};
pub use frame::{DragSink, RenderEdge, RenderFrame, RenderNode};
pub use transform::ViewTransform;
