use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use log::{debug, info, warn};

use super::types::{CourseId, CourseNode, CourseRecord, EdgeId, RelationEdge, RelationRecord};

/// Immutable node/edge snapshot of the course dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CourseGraph {
	nodes: Vec<CourseNode>,
	edges: Vec<RelationEdge>,
	index: HashMap<CourseId, usize>,
}

/// What the builder threw away while building.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
	/// Relations whose source or target is not a known course.
	pub dropped_relations: usize,
	pub dropped_self_loops: usize,
	/// Relations that repeated an existing (source, target, kind) triple.
	pub collapsed_duplicates: usize,
	pub duplicate_courses: usize,
}

impl CourseGraph {
	pub fn nodes(&self) -> &[CourseNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[RelationEdge] {
		&self.edges
	}

	pub fn node(&self, id: &CourseId) -> Option<&CourseNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn index_of(&self, id: &CourseId) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn contains(&self, id: &CourseId) -> bool {
		self.index.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Build a graph from course and relation rows.
///
/// Rows referencing unknown courses are dropped and counted in the report.
/// Repeated (source, target, kind) triples collapse onto the first one seen.
pub fn build(courses: &[CourseRecord], relations: &[RelationRecord]) -> (CourseGraph, BuildReport) {
	let mut report = BuildReport::default();
	let mut nodes = Vec::with_capacity(courses.len());
	let mut index = HashMap::with_capacity(courses.len());

	for course in courses {
		if index.contains_key(&course.id) {
			report.duplicate_courses += 1;
			continue;
		}
		index.insert(course.id.clone(), nodes.len());
		nodes.push(to_node(course));
	}

	let mut seen = HashSet::new();
	let mut edges = Vec::with_capacity(relations.len());
	for relation in relations {
		if !index.contains_key(&relation.source_id) || !index.contains_key(&relation.target_id) {
			report.dropped_relations += 1;
			continue;
		}
		if relation.source_id == relation.target_id {
			report.dropped_self_loops += 1;
			continue;
		}
		let triple = (&relation.source_id, &relation.target_id, relation.kind);
		if !seen.insert(triple) {
			report.collapsed_duplicates += 1;
			continue;
		}
		let id = EdgeId::derive(&relation.source_id, &relation.target_id, relation.kind);
		edges.push(RelationEdge {
			id,
			source: relation.source_id.clone(),
			target: relation.target_id.clone(),
			kind: relation.kind,
			note: relation.note.clone(),
		});
	}

	if report.dropped_relations > 0 {
		warn!(
			"Dropped {} relations referencing unknown courses",
			report.dropped_relations
		);
	}
	debug!(
		"Built course graph: {} nodes, {} edges ({:?})",
		nodes.len(),
		edges.len(),
		report
	);

	(
		CourseGraph {
			nodes,
			edges,
			index,
		},
		report,
	)
}

fn to_node(course: &CourseRecord) -> CourseNode {
	let subject = course.subject.trim().to_uppercase();
	let catalog_number = course.catalog_number.trim().to_uppercase();
	CourseNode {
		id: course.id.clone(),
		label: format!("{} {}", subject, catalog_number),
		level: course
			.level
			.unwrap_or_else(|| level_from_catalog(&catalog_number)),
		subject,
		catalog_number,
		title: course.title.clone(),
		units: course.units,
		faculty: course.faculty.clone(),
		terms: course.terms.clone(),
	}
}

/// "246" -> 200, "1A" -> 100, "ABC" -> 0.
pub fn level_from_catalog(catalog_number: &str) -> u32 {
	catalog_number
		.chars()
		.next()
		.and_then(|c| c.to_digit(10))
		.map(|d| d * 100)
		.unwrap_or(0)
}

/// Hash of the builder inputs, used as the memoisation key.
pub fn fingerprint(courses: &[CourseRecord], relations: &[RelationRecord]) -> u64 {
	let mut hasher = DefaultHasher::new();
	courses.len().hash(&mut hasher);
	for course in courses {
		course.id.hash(&mut hasher);
		course.subject.hash(&mut hasher);
		course.catalog_number.hash(&mut hasher);
		course.title.hash(&mut hasher);
		course.units.map(f64::to_bits).hash(&mut hasher);
		course.level.hash(&mut hasher);
		course.faculty.hash(&mut hasher);
		course.terms.hash(&mut hasher);
	}
	relations.hash(&mut hasher);
	hasher.finish()
}

/// Memoises the last build keyed by the input fingerprint.
#[derive(Debug, Default)]
pub struct GraphCache {
	last: Option<(u64, Arc<CourseGraph>, BuildReport)>,
}

impl GraphCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get_or_build(
		&mut self,
		courses: &[CourseRecord],
		relations: &[RelationRecord],
	) -> (Arc<CourseGraph>, BuildReport) {
		let key = fingerprint(courses, relations);
		if let Some((cached_key, graph, report)) = &self.last {
			if *cached_key == key {
				return (graph.clone(), *report);
			}
		}
		let (graph, report) = build(courses, relations);
		info!("Rebuilt course graph with {} nodes", graph.len());
		let graph = Arc::new(graph);
		self.last = Some((key, graph.clone(), report));
		(graph, report)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::RelationKind;

	fn courses() -> Vec<CourseRecord> {
		vec![
			CourseRecord::new("cs136", "CS", "136"),
			CourseRecord::new("cs246", "cs", "246"),
			CourseRecord::new("math135", "MATH", "135"),
		]
	}

	#[test]
	fn labels_are_canonical() {
		let (graph, _) = build(&courses(), &[]);
		let node = graph.node(&"cs246".into()).unwrap();
		assert_eq!(node.label, "CS 246");
		assert_eq!(node.level, 200);
	}

	#[test]
	fn ids_containing_separators_keep_distinct_edges() {
		let courses = vec![
			CourseRecord::new("a->b", "CS", "100"),
			CourseRecord::new("c", "CS", "200"),
			CourseRecord::new("a", "CS", "300"),
			CourseRecord::new("b->c", "CS", "400"),
		];
		let relations = vec![
			RelationRecord::new("a->b", "c", RelationKind::Prerequisite),
			RelationRecord::new("a", "b->c", RelationKind::Prerequisite),
		];
		let (graph, report) = build(&courses, &relations);
		assert_eq!(graph.edges().len(), 2);
		assert_eq!(report.collapsed_duplicates, 0);
		assert_ne!(graph.edges()[0].id, graph.edges()[1].id);
	}

	#[test]
	fn unknown_endpoints_are_counted_not_thrown() {
		let relations = vec![
			RelationRecord::new("cs136", "cs246", RelationKind::Prerequisite),
			RelationRecord::new("cs999", "cs246", RelationKind::Prerequisite),
			RelationRecord::new("cs136", "nope", RelationKind::Antirequisite),
		];
		let (graph, report) = build(&courses(), &relations);
		assert_eq!(graph.edges().len(), 1);
		assert_eq!(report.dropped_relations, 2);
	}

	#[test]
	fn parallel_edges_of_different_kinds_survive() {
		let relations = vec![
			RelationRecord::new("cs136", "cs246", RelationKind::Prerequisite),
			RelationRecord::new("cs136", "cs246", RelationKind::Corequisite),
			RelationRecord::new("cs136", "cs246", RelationKind::Prerequisite),
		];
		let (graph, report) = build(&courses(), &relations);
		assert_eq!(graph.edges().len(), 2);
		assert_eq!(report.collapsed_duplicates, 1);
	}

	#[test]
	fn self_loops_are_dropped() {
		let relations = vec![RelationRecord::new("cs136", "cs136", RelationKind::Equivalent)];
		let (graph, report) = build(&courses(), &relations);
		assert!(graph.edges().is_empty());
		assert_eq!(report.dropped_self_loops, 1);
	}

	#[test]
	fn cache_reuses_graph_for_identical_inputs() {
		let mut cache = GraphCache::new();
		let (first, _) = cache.get_or_build(&courses(), &[]);
		let (second, _) = cache.get_or_build(&courses(), &[]);
		assert!(Arc::ptr_eq(&first, &second));

		let mut more = courses();
		more.push(CourseRecord::new("stat230", "STAT", "230"));
		let (third, _) = cache.get_or_build(&more, &[]);
		assert!(!Arc::ptr_eq(&first, &third));
		assert_eq!(third.len(), 4);
	}

	#[test]
	fn level_falls_back_to_catalog_hundreds() {
		assert_eq!(level_from_catalog("135"), 100);
		assert_eq!(level_from_catalog("499R"), 400);
		assert_eq!(level_from_catalog("X"), 0);
	}
}
