use std::collections::{HashMap, HashSet};

use super::builder::CourseGraph;
use super::types::{CourseId, EdgeId};

/// Undirected neighbourhood lookup, built once per graph.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyIndex {
	neighbors: HashMap<CourseId, HashSet<CourseId>>,
	incident: HashMap<CourseId, Vec<EdgeId>>,
}

impl AdjacencyIndex {
	pub fn new(graph: &CourseGraph) -> Self {
		let mut neighbors: HashMap<CourseId, HashSet<CourseId>> = HashMap::new();
		let mut incident: HashMap<CourseId, Vec<EdgeId>> = HashMap::new();
		for edge in graph.edges() {
			neighbors
				.entry(edge.source.clone())
				.or_default()
				.insert(edge.target.clone());
			neighbors
				.entry(edge.target.clone())
				.or_default()
				.insert(edge.source.clone());
			incident
				.entry(edge.source.clone())
				.or_default()
				.push(edge.id.clone());
			incident
				.entry(edge.target.clone())
				.or_default()
				.push(edge.id.clone());
		}
		Self {
			neighbors,
			incident,
		}
	}

	/// Directly connected nodes, in either direction.
	pub fn neighbors(&self, id: &CourseId) -> Option<&HashSet<CourseId>> {
		self.neighbors.get(id)
	}

	pub fn incident_edges(&self, id: &CourseId) -> &[EdgeId] {
		self.incident.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// The node itself plus its 1-hop neighbours.
	pub fn neighborhood(&self, id: &CourseId) -> HashSet<CourseId> {
		let mut out = self.neighbors.get(id).cloned().unwrap_or_default();
		out.insert(id.clone());
		out
	}
}
