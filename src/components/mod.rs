pub mod course_graph;
