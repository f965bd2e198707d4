//! Course records, relation extraction and the node/edge graph built from them.

mod adjacency;
mod builder;
mod dataset;
mod extract;
mod types;

pub use adjacency::AdjacencyIndex;
pub use builder::{BuildReport, CourseGraph, GraphCache, build, fingerprint, level_from_catalog};
pub use dataset::{CourseDataset, RequirementText};
pub use extract::{CourseLookup, ExtractedRelation, extract_relations};
pub use types::{
	CourseId, CourseNode, CourseRecord, EdgeId, RelationEdge, RelationKind, RelationRecord, Term,
};
