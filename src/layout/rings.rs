use std::collections::HashMap;
use std::f64::consts::TAU;

use super::config::CategoryKey;

pub const MIN_RING_RADIUS: f64 = 80.0;
/// Arc length reserved per node on a ring.
pub const MIN_ARC_LENGTH: f64 = 30.0;
pub const RING_SPACING: f64 = 120.0;

const FACULTY_PRIORITY: &[&str] = &["MATH", "ENG", "SCI", "ARTS", "HEALTH", "ENV"];
const SUBJECT_PRIORITY: &[&str] = &["CS", "MATH", "STAT", "CO", "PMATH", "AMATH"];
const LEVEL_PRIORITY: &[&str] = &["100", "200", "300", "400"];

/// Group -> ring index assignments.
///
/// Priority groups own the innermost indices; every other group is numbered
/// in first-seen order after them. An assigned index is never changed, so a
/// registry constructed once at startup keeps rings fixed as the visible
/// category selection changes.
#[derive(Clone, Debug)]
pub struct RingRegistry {
	priorities: HashMap<CategoryKey, Vec<String>>,
	assigned: HashMap<(CategoryKey, String), usize>,
	next_free: HashMap<CategoryKey, usize>,
}

impl Default for RingRegistry {
	fn default() -> Self {
		let list = |groups: &[&str]| groups.iter().map(|g| g.to_string()).collect::<Vec<_>>();
		Self::with_priorities(HashMap::from([
			(CategoryKey::Faculty, list(FACULTY_PRIORITY)),
			(CategoryKey::Subject, list(SUBJECT_PRIORITY)),
			(CategoryKey::Level, list(LEVEL_PRIORITY)),
		]))
	}
}

impl RingRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_priorities(priorities: HashMap<CategoryKey, Vec<String>>) -> Self {
		Self {
			priorities,
			assigned: HashMap::new(),
			next_free: HashMap::new(),
		}
	}

	pub fn ring_index(&mut self, key: CategoryKey, group: &str) -> usize {
		if let Some(&index) = self.assigned.get(&(key, group.to_string())) {
			return index;
		}
		let priority = self.priorities.get(&key);
		let index = match priority.and_then(|list| list.iter().position(|g| g == group)) {
			Some(position) => position,
			None => {
				let offset = priority.map(Vec::len).unwrap_or(0);
				let next = self.next_free.entry(key).or_insert(0);
				let index = offset + *next;
				*next += 1;
				index
			}
		};
		self.assigned.insert((key, group.to_string()), index);
		index
	}

	/// Already assigned index, without assigning one.
	pub fn peek(&self, key: CategoryKey, group: &str) -> Option<usize> {
		self.assigned.get(&(key, group.to_string())).copied()
	}
}

/// Radius of a ring holding `members` nodes at `ring_index`.
pub fn ring_radius(ring_index: usize, members: usize) -> f64 {
	let packed = members as f64 * MIN_ARC_LENGTH / TAU;
	packed.max(MIN_RING_RADIUS) + ring_index as f64 * RING_SPACING
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn priority_groups_take_fixed_slots() {
		let mut rings = RingRegistry::new();
		assert_eq!(rings.ring_index(CategoryKey::Subject, "PHYS"), 6);
		assert_eq!(rings.ring_index(CategoryKey::Subject, "STAT"), 2);
		assert_eq!(rings.ring_index(CategoryKey::Subject, "ECON"), 7);
		assert_eq!(rings.ring_index(CategoryKey::Subject, "PHYS"), 6);
	}

	#[test]
	fn keys_are_numbered_independently() {
		let mut rings = RingRegistry::new();
		assert_eq!(rings.ring_index(CategoryKey::Faculty, "Other"), 6);
		assert_eq!(rings.ring_index(CategoryKey::Level, "Other"), 4);
		assert_eq!(rings.peek(CategoryKey::Subject, "Other"), None);
	}

	#[test]
	fn dense_rings_grow_to_keep_arc_length() {
		assert_eq!(ring_radius(0, 3), MIN_RING_RADIUS);
		let dense = ring_radius(0, 100);
		assert!((dense - 100.0 * MIN_ARC_LENGTH / TAU).abs() < 1e-9);
		assert_eq!(ring_radius(2, 3), MIN_RING_RADIUS + 2.0 * RING_SPACING);
	}
}
