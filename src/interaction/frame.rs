use std::collections::HashMap;

use crate::graph::{CourseId, EdgeId, RelationKind};
use crate::layout::Point;

use super::transform::ViewTransform;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderNode {
	pub id: CourseId,
	pub label: String,
	/// Graph space; the renderer applies the frame transform.
	pub position: Point,
	pub selected: bool,
	pub dimmed: bool,
	pub dragging: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderEdge {
	pub id: EdgeId,
	pub source: CourseId,
	pub target: CourseId,
	pub kind: RelationKind,
	pub from: Point,
	pub to: Point,
	pub dimmed: bool,
}

/// The culled, renderable subset of the graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderFrame {
	pub transform: ViewTransform,
	pub nodes: Vec<RenderNode>,
	pub edges: Vec<RenderEdge>,
	node_index: HashMap<CourseId, usize>,
	edge_index: HashMap<EdgeId, usize>,
}

impl RenderFrame {
	pub fn new(transform: ViewTransform, nodes: Vec<RenderNode>, edges: Vec<RenderEdge>) -> Self {
		let node_index = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		let edge_index = edges
			.iter()
			.enumerate()
			.map(|(i, e)| (e.id.clone(), i))
			.collect();
		Self {
			transform,
			nodes,
			edges,
			node_index,
			edge_index,
		}
	}

	pub fn node(&self, id: &CourseId) -> Option<&RenderNode> {
		self.node_index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn edge(&self, id: &EdgeId) -> Option<&RenderEdge> {
		self.edge_index.get(id).map(|&i| &self.edges[i])
	}
}

/// Receiver of raw coordinate updates while a node is dragged.
///
/// Only the drag-move handler writes through this; every other change goes
/// through a rebuilt [`RenderFrame`].
pub trait DragSink {
	fn move_node(&mut self, id: &CourseId, position: Point, incident: &[EdgeId]);
}

impl DragSink for RenderFrame {
	fn move_node(&mut self, id: &CourseId, position: Point, incident: &[EdgeId]) {
		if let Some(&i) = self.node_index.get(id) {
			self.nodes[i].position = position;
			self.nodes[i].dragging = true;
		}
		for edge_id in incident {
			let Some(&i) = self.edge_index.get(edge_id) else {
				continue;
			};
			let edge = &mut self.edges[i];
			if &edge.source == id {
				edge.from = position;
			}
			if &edge.target == id {
				edge.to = position;
			}
		}
	}
}

impl DragSink for Vec<(CourseId, Point)> {
	fn move_node(&mut self, id: &CourseId, position: Point, _incident: &[EdgeId]) {
		self.push((id.clone(), position));
	}
}

impl DragSink for () {
	fn move_node(&mut self, _id: &CourseId, _position: Point, _incident: &[EdgeId]) {}
}
