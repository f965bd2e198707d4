use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;

use crate::graph::{AdjacencyIndex, CourseGraph, CourseId, RelationEdge};
use crate::layout::{LayoutSnapshot, Point, Positions};

use super::culler::{Viewport, ViewportCuller};
use super::frame::{DragSink, RenderEdge, RenderFrame, RenderNode};
use super::transform::ViewTransform;

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Screen pixels the pointer may travel before a press becomes a drag.
	pub drag_threshold: f64,
	/// Graph-space pick radius; scales with zoom like the nodes.
	pub hit_radius: f64,
	/// Screen pixels added around the viewport before culling.
	pub cull_buffer: f64,
	/// Zoom factor of one wheel notch.
	pub wheel_step: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 5.0,
			drag_threshold: 4.0,
			hit_radius: 12.0,
			cull_buffer: 100.0,
			wheel_step: 1.1,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
	Unselected,
	Selected,
	Dragging,
}

#[derive(Clone, Debug)]
enum Pointer {
	Idle,
	/// Down, not yet past the drag threshold.
	Pressed {
		start: Point,
		node: Option<CourseId>,
		additive: bool,
	},
	Dragging {
		node: CourseId,
		/// Pointer minus node centre, in graph space.
		offset: Point,
		/// Start position of every node moving with the drag.
		origins: HashMap<CourseId, Point>,
	},
	Panning {
		start: Point,
		transform_start: ViewTransform,
	},
}

/// Owns transient view state and merges it with layout output.
///
/// Position precedence per node: live drag, then manual override, then the
/// latest applied layout snapshot.
pub struct InteractionController {
	config: InteractionConfig,
	graph: Arc<CourseGraph>,
	adjacency: AdjacencyIndex,
	computed: Positions,
	overrides: Positions,
	transient: Positions,
	transform: ViewTransform,
	viewport: Viewport,
	selection: HashSet<CourseId>,
	hover: Option<CourseId>,
	highlight: Option<HashSet<CourseId>>,
	pointer: Pointer,
	applied_generation: u64,
	positions_version: u64,
	culler: ViewportCuller,
	dirty: bool,
}

impl InteractionController {
	pub fn new(graph: Arc<CourseGraph>, viewport: Viewport, config: InteractionConfig) -> Self {
		let adjacency = AdjacencyIndex::new(&graph);
		let culler = ViewportCuller::new(config.cull_buffer);
		Self {
			config,
			graph,
			adjacency,
			computed: Positions::new(),
			overrides: Positions::new(),
			transient: Positions::new(),
			transform: ViewTransform::default(),
			viewport,
			selection: HashSet::new(),
			hover: None,
			highlight: None,
			pointer: Pointer::Idle,
			applied_generation: 0,
			positions_version: 0,
			culler,
			dirty: true,
		}
	}

	/// Swap in a rebuilt graph, keeping state for nodes that still exist.
	pub fn set_graph(&mut self, graph: Arc<CourseGraph>) {
		self.adjacency = AdjacencyIndex::new(&graph);
		self.computed.retain(|id, _| graph.contains(id));
		self.overrides.retain(|id, _| graph.contains(id));
		self.selection.retain(|id| graph.contains(id));
		self.transient.clear();
		self.hover = None;
		self.pointer = Pointer::Idle;
		self.graph = graph;
		self.refresh_highlight();
		self.touch_positions();
	}

	pub fn graph(&self) -> &Arc<CourseGraph> {
		&self.graph
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	pub fn config(&self) -> &InteractionConfig {
		&self.config
	}

	pub fn resize(&mut self, viewport: Viewport) {
		self.viewport = viewport;
		self.dirty = true;
	}

	/// Apply a layout snapshot. Snapshots older than the last applied one are
	/// ignored. Dragged nodes take the new computed value too, but stay on
	/// screen at their drag position until released.
	pub fn apply_layout(&mut self, snapshot: &LayoutSnapshot) -> bool {
		if snapshot.generation < self.applied_generation {
			debug!(
				"Ignoring layout generation {} (have {})",
				snapshot.generation, self.applied_generation
			);
			return false;
		}
		self.applied_generation = snapshot.generation;
		self.computed = snapshot.positions.clone();
		self.touch_positions();
		true
	}

	pub fn applied_generation(&self) -> u64 {
		self.applied_generation
	}

	pub fn position(&self, id: &CourseId) -> Option<Point> {
		self.transient
			.get(id)
			.or_else(|| self.overrides.get(id))
			.or_else(|| self.computed.get(id))
			.copied()
	}

	pub fn layout_position(&self, id: &CourseId) -> Option<Point> {
		self.computed.get(id).copied()
	}

	/// Positions from the latest applied layout, without overrides.
	pub fn layout_positions(&self) -> &Positions {
		&self.computed
	}

	pub fn overrides(&self) -> &Positions {
		&self.overrides
	}

	/// Current on-screen positions of every placed node, for warm-starting
	/// the next layout.
	pub fn effective_positions(&self) -> Positions {
		let mut out = self.computed.clone();
		out.extend(self.overrides.iter().map(|(id, p)| (id.clone(), *p)));
		out.extend(self.transient.iter().map(|(id, p)| (id.clone(), *p)));
		out
	}

	pub fn node_state(&self, id: &CourseId) -> NodeState {
		if self.transient.contains_key(id) {
			NodeState::Dragging
		} else if self.selection.contains(id) {
			NodeState::Selected
		} else {
			NodeState::Unselected
		}
	}

	pub fn selection(&self) -> &HashSet<CourseId> {
		&self.selection
	}

	pub fn is_panning(&self) -> bool {
		matches!(self.pointer, Pointer::Panning { .. })
	}

	pub fn is_dragging(&self) -> bool {
		matches!(self.pointer, Pointer::Dragging { .. })
	}

	/// Neighbourhood currently in focus, if any.
	pub fn highlight(&self) -> Option<&HashSet<CourseId>> {
		self.highlight.as_ref()
	}

	pub fn is_dimmed(&self, id: &CourseId) -> bool {
		self.highlight.as_ref().is_some_and(|h| !h.contains(id))
	}

	pub fn is_edge_dimmed(&self, edge: &RelationEdge) -> bool {
		if self.highlight.is_none() {
			return false;
		}
		let focus = |id: &CourseId| {
			if self.selection.is_empty() {
				self.hover.as_ref() == Some(id)
			} else {
				self.selection.contains(id)
			}
		};
		!(focus(&edge.source) || focus(&edge.target))
	}

	pub fn select(&mut self, id: &CourseId, additive: bool) {
		if !self.graph.contains(id) {
			return;
		}
		if additive {
			if !self.selection.remove(id) {
				self.selection.insert(id.clone());
			}
		} else {
			self.selection.clear();
			self.selection.insert(id.clone());
		}
		self.refresh_highlight();
	}

	pub fn clear_selection(&mut self) {
		self.selection.clear();
		self.refresh_highlight();
	}

	/// Update the hover target from an idle pointer position.
	pub fn hover(&mut self, screen: Point) {
		let hovered = self.node_at(screen);
		if hovered != self.hover {
			self.hover = hovered;
			self.refresh_highlight();
		}
	}

	fn refresh_highlight(&mut self) {
		let focus: Vec<&CourseId> = if self.selection.is_empty() {
			self.hover.iter().collect()
		} else {
			self.selection.iter().collect()
		};
		self.highlight = if focus.is_empty() {
			None
		} else {
			let mut set = HashSet::new();
			for id in focus {
				set.extend(self.adjacency.neighborhood(id));
			}
			Some(set)
		};
		self.dirty = true;
	}

	/// Nearest visible node within the pick radius of `screen`.
	pub fn node_at(&mut self, screen: Point) -> Option<CourseId> {
		let target = self.transform.screen_to_graph(screen);
		let positions = self.effective_positions();
		let visible = self.culler.cull(
			self.viewport,
			&self.transform,
			&positions,
			self.positions_version,
			&self.transient.keys().cloned().collect(),
		);
		visible
			.into_iter()
			.filter_map(|id| {
				let d = positions.get(&id)?.distance(target);
				(d < self.config.hit_radius).then_some((id, d))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
			.map(|(id, _)| id)
	}

	pub fn pointer_down(&mut self, screen: Point, additive: bool) {
		let node = self.node_at(screen);
		self.pointer = Pointer::Pressed {
			start: screen,
			node,
			additive,
		};
	}

	/// Track the pointer. While dragging, moved coordinates go straight to
	/// `sink` instead of through a rebuilt frame.
	pub fn pointer_move(&mut self, screen: Point, sink: &mut dyn DragSink) {
		if let Pointer::Pressed { start, node, .. } = &self.pointer {
			if start.distance(screen) < self.config.drag_threshold {
				return;
			}
			let (start, node) = (*start, node.clone());
			self.pointer = match node {
				Some(node) => self.begin_drag(node, start),
				None => Pointer::Panning {
					start,
					transform_start: self.transform,
				},
			};
		}

		if matches!(self.pointer, Pointer::Idle) {
			self.hover(screen);
			return;
		}
		match &self.pointer {
			Pointer::Idle | Pointer::Pressed { .. } => {}
			Pointer::Panning {
				start,
				transform_start,
			} => {
				self.transform = ViewTransform {
					x: transform_start.x + (screen.x - start.x),
					y: transform_start.y + (screen.y - start.y),
					k: transform_start.k,
				};
				self.dirty = true;
			}
			Pointer::Dragging {
				node,
				offset,
				origins,
			} => {
				let pointer = self.transform.screen_to_graph(screen);
				let Some(anchor) = origins.get(node) else {
					return;
				};
				let (dx, dy) = (
					pointer.x - offset.x - anchor.x,
					pointer.y - offset.y - anchor.y,
				);
				for (id, origin) in origins {
					let moved = Point::new(origin.x + dx, origin.y + dy);
					self.transient.insert(id.clone(), moved);
					sink.move_node(id, moved, self.adjacency.incident_edges(id));
				}
			}
		}
	}

	fn begin_drag(&mut self, node: CourseId, start: Point) -> Pointer {
		let moving: Vec<CourseId> = if self.selection.contains(&node) && self.selection.len() > 1 {
			self.selection.iter().cloned().collect()
		} else {
			vec![node.clone()]
		};
		let origins: HashMap<CourseId, Point> = moving
			.into_iter()
			.filter_map(|id| self.position(&id).map(|p| (id, p)))
			.collect();
		let pointer = self.transform.screen_to_graph(start);
		let center = origins.get(&node).copied().unwrap_or(pointer);
		self.transient
			.extend(origins.iter().map(|(id, p)| (id.clone(), *p)));
		debug!("Dragging {} ({} nodes)", node, origins.len());
		Pointer::Dragging {
			node,
			offset: Point::new(pointer.x - center.x, pointer.y - center.y),
			origins,
		}
	}

	pub fn pointer_up(&mut self) {
		match std::mem::replace(&mut self.pointer, Pointer::Idle) {
			Pointer::Pressed { node, additive, .. } => match node {
				Some(id) => self.select(&id, additive),
				None => self.clear_selection(),
			},
			Pointer::Dragging { .. } => self.commit_drag(),
			Pointer::Panning { .. } | Pointer::Idle => {}
		}
	}

	/// Pointer left the canvas: finish any drag, drop any pan or press.
	pub fn pointer_leave(&mut self) {
		if self.is_dragging() {
			self.commit_drag();
		}
		self.pointer = Pointer::Idle;
		if self.hover.take().is_some() {
			self.refresh_highlight();
		}
	}

	fn commit_drag(&mut self) {
		self.overrides.extend(self.transient.drain());
		self.touch_positions();
	}

	/// One wheel notch; positive `delta_y` zooms out.
	pub fn wheel(&mut self, screen: Point, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			1.0 / self.config.wheel_step
		} else {
			self.config.wheel_step
		};
		self.zoom_at(screen, factor);
	}

	pub fn zoom_at(&mut self, screen: Point, factor: f64) {
		self.transform
			.zoom_at(screen, factor, self.config.min_zoom, self.config.max_zoom);
		self.dirty = true;
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.transform.pan_by(dx, dy);
		self.dirty = true;
	}

	/// Identity transform, no manual overrides.
	pub fn reset(&mut self) {
		self.transform = ViewTransform::default();
		self.overrides.clear();
		self.transient.clear();
		self.pointer = Pointer::Idle;
		self.touch_positions();
	}

	/// Whether the frame needs rebuilding; clears the flag.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}

	fn touch_positions(&mut self) {
		self.positions_version += 1;
		self.dirty = true;
	}

	/// Build the renderable subset for the current viewport.
	pub fn frame(&mut self) -> RenderFrame {
		let positions = self.effective_positions();
		let dragging: HashSet<CourseId> = self.transient.keys().cloned().collect();
		let visible = self.culler.cull(
			self.viewport,
			&self.transform,
			&positions,
			self.positions_version,
			&dragging,
		);

		let nodes = self
			.graph
			.nodes()
			.iter()
			.filter(|n| visible.contains(&n.id))
			.filter_map(|n| {
				Some(RenderNode {
					id: n.id.clone(),
					label: n.label.clone(),
					position: *positions.get(&n.id)?,
					selected: self.selection.contains(&n.id),
					dimmed: self.is_dimmed(&n.id),
					dragging: dragging.contains(&n.id),
				})
			})
			.collect();
		let edges = self
			.graph
			.edges()
			.iter()
			.filter(|e| visible.contains(&e.source) || visible.contains(&e.target))
			.filter_map(|e| {
				Some(RenderEdge {
					id: e.id.clone(),
					source: e.source.clone(),
					target: e.target.clone(),
					kind: e.kind,
					from: *positions.get(&e.source)?,
					to: *positions.get(&e.target)?,
					dimmed: self.is_edge_dimmed(e),
				})
			})
			.collect();
		RenderFrame::new(self.transform, nodes, edges)
	}
}
