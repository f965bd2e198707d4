//! Best-effort extraction of typed relations from requirement prose.
//!
//! Codes that do not resolve against the known course set are dropped, never
//! reported as errors.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::builder::CourseGraph;
use super::types::{CourseId, CourseRecord, RelationKind, RelationRecord};

static COURSE_CODE_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\b([A-Z]{2,10})\s?(\d{3}[A-Z]?)\b").unwrap());

static KEYWORD_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)(prereq|coreq|antireq)").unwrap());

/// (subject, catalog number) -> course id.
#[derive(Clone, Debug, Default)]
pub struct CourseLookup {
	codes: HashMap<(String, String), CourseId>,
}

impl CourseLookup {
	pub fn from_records(courses: &[CourseRecord]) -> Self {
		let mut lookup = Self::default();
		for course in courses {
			lookup.insert(&course.subject, &course.catalog_number, course.id.clone());
		}
		lookup
	}

	pub fn from_graph(graph: &CourseGraph) -> Self {
		let mut lookup = Self::default();
		for node in graph.nodes() {
			lookup.insert(&node.subject, &node.catalog_number, node.id.clone());
		}
		lookup
	}

	pub fn insert(&mut self, subject: &str, catalog_number: &str, id: CourseId) {
		self.codes.insert(normalize(subject, catalog_number), id);
	}

	pub fn resolve(&self, subject: &str, catalog_number: &str) -> Option<&CourseId> {
		self.codes.get(&normalize(subject, catalog_number))
	}

	pub fn len(&self) -> usize {
		self.codes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.codes.is_empty()
	}
}

fn normalize(subject: &str, catalog_number: &str) -> (String, String) {
	(
		subject.trim().to_uppercase(),
		catalog_number.trim().to_uppercase(),
	)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExtractedRelation {
	pub source: CourseId,
	pub target: CourseId,
	pub kind: RelationKind,
}

impl From<ExtractedRelation> for RelationRecord {
	fn from(relation: ExtractedRelation) -> Self {
		RelationRecord {
			source_id: relation.source,
			target_id: relation.target,
			kind: relation.kind,
			note: None,
		}
	}
}

fn keyword_kind(keyword: &str) -> RelationKind {
	match keyword.to_ascii_lowercase().as_str() {
		"coreq" => RelationKind::Corequisite,
		"antireq" => RelationKind::Antirequisite,
		_ => RelationKind::Prerequisite,
	}
}

/// Extract (source, target, kind) triples from `text` for `target`.
///
/// A block mentioning one keyword category classifies every code with it.
/// When several categories appear, each code takes the category of the
/// closest keyword before it; codes ahead of the first keyword take the
/// first keyword's category. Blocks with no keyword yield nothing.
pub fn extract_relations(
	text: &str,
	target: &CourseId,
	lookup: &CourseLookup,
) -> Vec<ExtractedRelation> {
	let markers: Vec<(usize, RelationKind)> = KEYWORD_RE
		.find_iter(text)
		.map(|m| (m.start(), keyword_kind(m.as_str())))
		.collect();
	let Some(&(_, first_kind)) = markers.first() else {
		return Vec::new();
	};
	let single_kind = markers.iter().all(|&(_, kind)| kind == first_kind);

	let mut seen = HashSet::new();
	let mut out = Vec::new();
	for caps in COURSE_CODE_RE.captures_iter(text) {
		let (Some(whole), Some(subject), Some(number)) = (caps.get(0), caps.get(1), caps.get(2))
		else {
			continue;
		};
		let Some(source) = lookup.resolve(subject.as_str(), number.as_str()) else {
			debug!("Dropping unresolved course code {:?}", whole.as_str());
			continue;
		};
		if source == target {
			continue;
		}
		let kind = if single_kind {
			first_kind
		} else {
			markers
				.iter()
				.take_while(|&&(start, _)| start <= whole.start())
				.last()
				.map(|&(_, kind)| kind)
				.unwrap_or(first_kind)
		};
		let relation = ExtractedRelation {
			source: source.clone(),
			target: target.clone(),
			kind,
		};
		if seen.insert(relation.clone()) {
			out.push(relation);
		}
	}
	out
}
