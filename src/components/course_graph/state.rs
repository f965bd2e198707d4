use std::sync::Arc;

use log::{info, warn};

use crate::graph::{CourseDataset, GraphCache};
use crate::interaction::{InteractionConfig, InteractionController, RenderFrame, Viewport};
use crate::layout::{DispatchMode, LayoutConfig, LayoutKind, LayoutScheduler, Point, Positions};

pub const NODE_RADIUS: f64 = 5.0;

/// Animation frames without a further resize before the layout is redone.
const RESIZE_SETTLE_FRAMES: u32 = 12;

#[cfg(target_arch = "wasm32")]
const DISPATCH: DispatchMode = DispatchMode::Cooperative;
#[cfg(not(target_arch = "wasm32"))]
const DISPATCH: DispatchMode = DispatchMode::Thread;

/// Everything the canvas owns between animation frames.
pub struct CourseGraphState {
	pub controller: InteractionController,
	pub frame: RenderFrame,
	pub width: f64,
	pub height: f64,
	scheduler: LayoutScheduler,
	layout: LayoutConfig,
	cache: GraphCache,
	resize_countdown: Option<u32>,
}

impl CourseGraphState {
	pub fn new(dataset: &CourseDataset, kind: LayoutKind, width: f64, height: f64) -> Self {
		Self::with_dispatch(dataset, kind, width, height, DISPATCH)
	}

	pub fn with_dispatch(
		dataset: &CourseDataset,
		kind: LayoutKind,
		width: f64,
		height: f64,
		mode: DispatchMode,
	) -> Self {
		let mut cache = GraphCache::new();
		let (graph, _) = cache.get_or_build(&dataset.courses, &dataset.resolved_relations());
		let layout = LayoutConfig {
			width,
			height,
			..LayoutConfig::with_kind(kind)
		};
		let controller = InteractionController::new(
			graph,
			Viewport::new(width, height),
			InteractionConfig::default(),
		);
		let mut state = Self {
			controller,
			frame: RenderFrame::default(),
			width,
			height,
			scheduler: LayoutScheduler::new(mode),
			layout,
			cache,
			resize_countdown: None,
		};
		state.relayout();
		state
	}

	/// Rebuild from new data. A no-op when the inputs are unchanged.
	pub fn load(&mut self, dataset: &CourseDataset) {
		let (graph, _) = self
			.cache
			.get_or_build(&dataset.courses, &dataset.resolved_relations());
		if Arc::ptr_eq(&graph, self.controller.graph()) {
			return;
		}
		self.controller.set_graph(graph);
		self.relayout();
	}

	pub fn set_layout(&mut self, kind: LayoutKind) {
		if self.layout.kind != kind {
			self.layout.kind = kind;
			self.relayout();
		}
	}

	/// Request a layout warm-started from the last computed positions.
	///
	/// Manual overrides are neither seeds nor anchors: they stay on top of
	/// whatever the engine computes, so a reset lands on engine output.
	pub fn relayout(&mut self) {
		self.resize_countdown = None;
		let graph = self.controller.graph().clone();
		let seed = self.controller.layout_positions().clone();
		if let Err(e) = self
			.scheduler
			.request(&graph, &self.layout, &seed, &Positions::new())
		{
			warn!("Layout request failed: {}", e);
		}
	}

	pub fn is_layout_running(&self) -> bool {
		self.scheduler.is_running()
	}

	/// One animation frame: advance the layout, apply any fresh snapshot and
	/// rebuild the render frame if something changed.
	pub fn tick(&mut self) {
		if let Some(frames) = self.resize_countdown {
			if frames == 0 {
				self.relayout();
			} else {
				self.resize_countdown = Some(frames - 1);
			}
		}
		self.scheduler.pump();
		if let Some(snapshot) = self.scheduler.poll() {
			if self.controller.apply_layout(&snapshot) && snapshot.complete {
				info!("Layout settled at generation {}", snapshot.generation);
			}
		}
		if self.controller.take_dirty() {
			self.frame = self.controller.frame();
		}
	}

	pub fn pointer_move(&mut self, screen: Point) {
		self.controller.pointer_move(screen, &mut self.frame);
	}

	/// Resize the viewport at once; the layout follows the new centre once
	/// resizing has paused for a few frames.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.controller.resize(Viewport::new(width, height));
		if self.layout.width != width || self.layout.height != height {
			self.layout.width = width;
			self.layout.height = height;
			self.resize_countdown = Some(RESIZE_SETTLE_FRAMES);
		}
	}
}
