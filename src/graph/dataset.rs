use serde::{Deserialize, Serialize};

use super::extract::{CourseLookup, extract_relations};
use super::types::{CourseId, CourseRecord, RelationRecord};

/// Free-form requirement prose attached to a course.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementText {
	pub course_id: CourseId,
	pub text: String,
}

/// Everything the data store hands over for one graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseDataset {
	pub courses: Vec<CourseRecord>,
	#[serde(default)]
	pub relations: Vec<RelationRecord>,
	#[serde(default)]
	pub requirements: Vec<RequirementText>,
}

impl CourseDataset {
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Explicit relation rows followed by relations extracted from the
	/// requirement texts.
	pub fn resolved_relations(&self) -> Vec<RelationRecord> {
		let lookup = CourseLookup::from_records(&self.courses);
		let mut out = self.relations.clone();
		for requirement in &self.requirements {
			out.extend(
				extract_relations(&requirement.text, &requirement.course_id, &lookup)
					.into_iter()
					.map(RelationRecord::from),
			);
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{RelationKind, build};

	const JSON: &str = r#"{
		"courses": [
			{ "id": "cs136", "subject": "CS", "catalogNumber": "136", "units": 0.5, "terms": ["FALL", "WINTER"] },
			{ "id": "cs246", "subject": "CS", "catalogNumber": "246", "faculty": "MATH" }
		],
		"relations": [
			{ "sourceId": "cs136", "targetId": "cs246", "kind": "PREREQUISITE", "note": "min grade 60" }
		],
		"requirements": [
			{ "courseId": "cs246", "text": "Prereq: CS 136" }
		]
	}"#;

	#[test]
	fn parses_store_json_and_merges_extracted_relations() {
		let dataset = CourseDataset::from_json(JSON).unwrap();
		assert_eq!(dataset.courses[0].units, Some(0.5));
		let relations = dataset.resolved_relations();
		assert_eq!(relations.len(), 2);
		assert_eq!(relations[1].kind, RelationKind::Prerequisite);

		let (graph, report) = build(&dataset.courses, &relations);
		assert_eq!(graph.edges().len(), 1);
		assert_eq!(graph.edges()[0].note.as_deref(), Some("min grade 60"));
		assert_eq!(report.collapsed_duplicates, 1);
	}
}
