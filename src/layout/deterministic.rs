//! Geometric layouts. Each is a pure function of the graph order and node
//! attributes, so re-running on the same graph gives the same coordinates.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::graph::{CourseGraph, CourseNode};

use super::config::{CategoryKey, LayoutConfig, Point, Positions};
use super::rings::{RingRegistry, ring_radius};

pub fn grid(graph: &CourseGraph, config: &LayoutConfig) -> Positions {
	let n = graph.len();
	if n == 0 {
		return Positions::new();
	}
	let cols = (n as f64).sqrt().ceil() as usize;
	let rows = n.div_ceil(cols);
	let center = config.center();
	let spacing = config.distance;
	graph
		.nodes()
		.iter()
		.enumerate()
		.map(|(i, node)| {
			let (col, row) = (i % cols, i / cols);
			let x = center.x + (col as f64 - (cols - 1) as f64 / 2.0) * spacing;
			let y = center.y + (row as f64 - (rows - 1) as f64 / 2.0) * spacing;
			(node.id.clone(), Point::new(x, y))
		})
		.collect()
}

/// One row per academic level, lowest level on top.
pub fn hierarchical(graph: &CourseGraph, config: &LayoutConfig) -> Positions {
	let mut levels: BTreeMap<u32, Vec<&CourseNode>> = BTreeMap::new();
	for node in graph.nodes() {
		levels.entry(node.level).or_default().push(node);
	}
	let center = config.center();
	let (column_gap, row_gap) = (config.distance, config.distance * 1.5);
	let rows = levels.len();
	let mut out = Positions::with_capacity(graph.len());
	for (row, members) in levels.values().enumerate() {
		let y = center.y + (row as f64 - (rows.saturating_sub(1)) as f64 / 2.0) * row_gap;
		let count = members.len();
		for (i, node) in members.iter().enumerate() {
			let x = center.x + (i as f64 - (count - 1) as f64 / 2.0) * column_gap;
			out.insert(node.id.clone(), Point::new(x, y));
		}
	}
	out
}

pub fn category_of(node: &CourseNode, key: CategoryKey) -> String {
	match key {
		CategoryKey::Faculty => node
			.faculty
			.as_deref()
			.map(|f| f.trim().to_uppercase())
			.filter(|f| !f.is_empty())
			.unwrap_or_else(|| "Other".to_string()),
		CategoryKey::Subject => node.subject.clone(),
		CategoryKey::Level => node.level.to_string(),
	}
}

/// Nodes grouped onto concentric rings by `key`.
///
/// A ring's radius depends only on its own member count and its registry
/// index, so adding categories never moves an existing ring.
pub fn concentric(
	graph: &CourseGraph,
	config: &LayoutConfig,
	key: CategoryKey,
	rings: &mut RingRegistry,
) -> Positions {
	let mut groups: Vec<(String, Vec<&CourseNode>)> = Vec::new();
	let mut slot: HashMap<String, usize> = HashMap::new();
	for node in graph.nodes() {
		let group = category_of(node, key);
		match slot.get(&group) {
			Some(&i) => groups[i].1.push(node),
			None => {
				slot.insert(group.clone(), groups.len());
				groups.push((group, vec![node]));
			}
		}
	}

	let center = config.center();
	let mut out = Positions::with_capacity(graph.len());
	for (group, members) in &groups {
		let ring = rings.ring_index(key, group);
		let radius = ring_radius(ring, members.len());
		// Stagger ring start angles so neighbouring rings don't line up.
		let phase = ring as f64 * 0.5;
		for (i, node) in members.iter().enumerate() {
			let angle = TAU * i as f64 / members.len() as f64 - FRAC_PI_2 + phase;
			out.insert(
				node.id.clone(),
				Point::new(
					center.x + radius * angle.cos(),
					center.y + radius * angle.sin(),
				),
			);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{CourseId, CourseRecord, build};

	fn course(id: &str, subject: &str, number: &str, faculty: &str) -> CourseRecord {
		CourseRecord {
			faculty: Some(faculty.to_string()),
			..CourseRecord::new(id, subject, number)
		}
	}

	#[test]
	fn grid_is_centered() {
		let courses: Vec<_> = (0..4)
			.map(|i| CourseRecord::new(format!("c{i}"), "CS", "100"))
			.collect();
		let (graph, _) = build(&courses, &[]);
		let config = LayoutConfig::default();
		let positions = grid(&graph, &config);
		let (sx, sy) = positions
			.values()
			.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
		assert!((sx / 4.0 - 400.0).abs() < 1e-9);
		assert!((sy / 4.0 - 300.0).abs() < 1e-9);
	}

	#[test]
	fn hierarchical_rows_follow_level() {
		let (graph, _) = build(
			&[
				CourseRecord::new("a", "CS", "446"),
				CourseRecord::new("b", "CS", "135"),
				CourseRecord::new("c", "CS", "246"),
			],
			&[],
		);
		let positions = hierarchical(&graph, &LayoutConfig::default());
		let y = |id: &str| positions[&CourseId::from(id)].y;
		assert!(y("b") < y("c") && y("c") < y("a"));
	}

	#[test]
	fn concentric_rings_are_stable_across_selections() {
		let mut rings = RingRegistry::new();
		let config = LayoutConfig::default();
		let (small, _) = build(
			&[
				course("a", "CS", "135", "Math"),
				course("b", "ECON", "101", "Arts"),
			],
			&[],
		);
		let before = concentric(&small, &config, CategoryKey::Faculty, &mut rings);

		let (large, _) = build(
			&[
				course("z", "PHYS", "121", "Science"),
				course("a", "CS", "135", "Math"),
				course("b", "ECON", "101", "Arts"),
			],
			&[],
		);
		let after = concentric(&large, &config, CategoryKey::Faculty, &mut rings);
		let center = config.center();
		for id in ["a", "b"] {
			let r0 = before[&CourseId::from(id)].distance(center);
			let r1 = after[&CourseId::from(id)].distance(center);
			assert!((r0 - r1).abs() < 1e-9, "ring for {id} moved");
		}
	}
}
