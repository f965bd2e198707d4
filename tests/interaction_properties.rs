use std::collections::HashSet;
use std::sync::Arc;

use course_graph_canvas::graph::{CourseId, CourseRecord, RelationKind, RelationRecord, build};
use course_graph_canvas::interaction::{
	InteractionConfig, InteractionController, RenderFrame, ViewTransform, Viewport,
	ViewportCuller, visible_nodes,
};
use course_graph_canvas::layout::{LayoutSnapshot, Point, Positions};
use proptest::prelude::*;

fn abc() -> (InteractionController, Positions) {
	let courses = vec![
		CourseRecord::new("A", "CS", "135"),
		CourseRecord::new("B", "CS", "136"),
		CourseRecord::new("C", "CS", "246"),
	];
	let relations = vec![RelationRecord::new("A", "B", RelationKind::Prerequisite)];
	let (graph, _) = build(&courses, &relations);
	let positions = Positions::from([
		(CourseId::from("A"), Point::new(100.0, 100.0)),
		(CourseId::from("B"), Point::new(5000.0, 5000.0)),
		(CourseId::from("C"), Point::new(700.0, 500.0)),
	]);
	let mut controller = InteractionController::new(
		Arc::new(graph),
		Viewport::new(800.0, 600.0),
		InteractionConfig::default(),
	);
	controller.apply_layout(&LayoutSnapshot {
		generation: 1,
		positions: positions.clone(),
		percent: 100.0,
		complete: true,
	});
	(controller, positions)
}

fn ids(names: &[&str]) -> HashSet<CourseId> {
	names.iter().map(|n| CourseId::from(*n)).collect()
}

proptest! {
	#[test]
	fn zoom_keeps_the_point_under_the_cursor(
		x in -500.0f64..500.0,
		y in -500.0f64..500.0,
		k in 0.2f64..4.0,
		cx in 0.0f64..800.0,
		cy in 0.0f64..600.0,
		factor in 0.5f64..2.0,
	) {
		let mut transform = ViewTransform { x, y, k };
		let cursor = Point::new(cx, cy);
		let before = transform.screen_to_graph(cursor);
		transform.zoom_at(cursor, factor, 0.1, 5.0);
		let after = transform.graph_to_screen(before);
		prop_assert!((after.x - cx).abs() < 1e-6);
		prop_assert!((after.y - cy).abs() < 1e-6);
	}

	#[test]
	fn wheel_zoom_respects_bounds(notches in prop::collection::vec(-1.0f64..1.0, 1..80)) {
		let (mut controller, _) = abc();
		for delta in notches {
			controller.wheel(Point::new(400.0, 300.0), delta);
			let k = controller.transform().k;
			prop_assert!((0.1..=5.0).contains(&k));
		}
	}

	#[test]
	fn drag_release_commits_the_last_tracked_position(
		dx in 10.0f64..300.0,
		dy in -80.0f64..80.0,
	) {
		let (mut controller, positions) = abc();
		let a = CourseId::from("A");
		let start = positions[&a];
		controller.pointer_down(start, false);
		let mut moves: Vec<(CourseId, Point)> = Vec::new();
		controller.pointer_move(Point::new(start.x + dx, start.y + dy), &mut moves);
		controller.pointer_up();

		let (moved_id, last) = moves.last().cloned().unwrap();
		prop_assert_eq!(&moved_id, &a);
		prop_assert_eq!(controller.overrides()[&a], last);

		controller.reset();
		prop_assert!(controller.overrides().is_empty());
		prop_assert_eq!(controller.position(&a), Some(start));
	}
}

#[test]
fn culling_keeps_only_on_screen_nodes() {
	let (_, positions) = abc();
	let visible = visible_nodes(
		Viewport::new(800.0, 600.0),
		&ViewTransform::default(),
		&positions,
		100.0,
	);
	assert_eq!(visible, ids(&["A", "C"]));

	let mut culler = ViewportCuller::new(100.0);
	let culled = culler.cull(
		Viewport::new(800.0, 600.0),
		&ViewTransform::default(),
		&positions,
		1,
		&HashSet::new(),
	);
	assert_eq!(culled, ids(&["A", "C"]));
}

#[test]
fn frame_contains_visible_nodes_and_their_edges() {
	let (mut controller, _) = abc();
	let frame: RenderFrame = controller.frame();
	let nodes: HashSet<CourseId> = frame.nodes.iter().map(|n| n.id.clone()).collect();
	assert_eq!(nodes, ids(&["A", "C"]));
	// A->B stays drawable because A is on screen.
	assert_eq!(frame.edges.len(), 1);
}

#[test]
fn dragged_node_stays_visible_off_screen() {
	let (mut controller, positions) = abc();
	let start = positions[&CourseId::from("A")];
	controller.pointer_down(start, false);
	controller.pointer_move(Point::new(-900.0, -900.0), &mut ());
	let frame = controller.frame();
	assert!(frame.node(&CourseId::from("A")).is_some_and(|n| n.dragging));
}
