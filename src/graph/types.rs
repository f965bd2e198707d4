use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable course identifier supplied by the data store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub String);

impl CourseId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CourseId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for CourseId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
	Prerequisite,
	Corequisite,
	Antirequisite,
	Equivalent,
}

impl RelationKind {
	pub const ALL: [RelationKind; 4] = [
		RelationKind::Prerequisite,
		RelationKind::Corequisite,
		RelationKind::Antirequisite,
		RelationKind::Equivalent,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			RelationKind::Prerequisite => "PREREQUISITE",
			RelationKind::Corequisite => "COREQUISITE",
			RelationKind::Antirequisite => "ANTIREQUISITE",
			RelationKind::Equivalent => "EQUIVALENT",
		}
	}
}

impl fmt::Display for RelationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Term {
	Fall,
	Winter,
	Spring,
}

/// A course row as handed over by the data store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
	pub id: CourseId,
	pub subject: String,
	pub catalog_number: String,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub units: Option<f64>,
	#[serde(default)]
	pub level: Option<u32>,
	#[serde(default)]
	pub faculty: Option<String>,
	#[serde(default)]
	pub terms: Vec<Term>,
}

impl CourseRecord {
	pub fn new(id: impl Into<String>, subject: &str, catalog_number: &str) -> Self {
		Self {
			id: CourseId::new(id),
			subject: subject.to_string(),
			catalog_number: catalog_number.to_string(),
			title: None,
			units: None,
			level: None,
			faculty: None,
			terms: Vec::new(),
		}
	}
}

/// A typed relation row as handed over by the data store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRecord {
	pub source_id: CourseId,
	pub target_id: CourseId,
	pub kind: RelationKind,
	#[serde(default)]
	pub note: Option<String>,
}

impl RelationRecord {
	pub fn new(source: impl Into<String>, target: impl Into<String>, kind: RelationKind) -> Self {
		Self {
			source_id: CourseId::new(source),
			target_id: CourseId::new(target),
			kind,
			note: None,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct CourseNode {
	pub id: CourseId,
	pub subject: String,
	pub catalog_number: String,
	/// Canonical "SUBJECT NUMBER".
	pub label: String,
	pub title: Option<String>,
	pub units: Option<f64>,
	pub level: u32,
	pub faculty: Option<String>,
	pub terms: Vec<Term>,
}

/// Derived from (source, target, kind) so rebuilds produce identical ids.
///
/// Both course ids are length-prefixed, so ids containing the separators
/// still encode distinct triples to distinct strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub String);

impl EdgeId {
	pub fn derive(source: &CourseId, target: &CourseId, kind: RelationKind) -> Self {
		Self(format!(
			"{}:{}->{}:{}:{}",
			source.as_str().len(),
			source,
			target.as_str().len(),
			target,
			kind
		))
	}
}

impl fmt::Display for EdgeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelationEdge {
	pub id: EdgeId,
	pub source: CourseId,
	pub target: CourseId,
	pub kind: RelationKind,
	pub note: Option<String>,
}
