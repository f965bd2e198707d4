use std::collections::HashSet;

use crate::graph::CourseId;
use crate::layout::{Point, Positions};

use super::transform::ViewTransform;

/// Screen-space canvas size; the visible rectangle is (0, 0)..(width, height).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Whether `screen` lies inside the viewport grown by `buffer` on every side.
	pub fn contains(&self, screen: Point, buffer: f64) -> bool {
		screen.x >= -buffer
			&& screen.x <= self.width + buffer
			&& screen.y >= -buffer
			&& screen.y <= self.height + buffer
	}
}

/// Nodes whose transformed position falls in the buffered viewport.
pub fn visible_nodes<'a>(
	viewport: Viewport,
	transform: &ViewTransform,
	positions: impl IntoIterator<Item = (&'a CourseId, &'a Point)>,
	buffer: f64,
) -> HashSet<CourseId> {
	positions
		.into_iter()
		.filter(|(_, p)| viewport.contains(transform.graph_to_screen(**p), buffer))
		.map(|(id, _)| id.clone())
		.collect()
}

#[derive(Clone, Debug, PartialEq)]
struct CullKey {
	viewport: Viewport,
	transform: ViewTransform,
	positions_version: u64,
}

/// Caches the visible set until the viewport, transform or positions change.
#[derive(Clone, Debug)]
pub struct ViewportCuller {
	buffer: f64,
	key: Option<CullKey>,
	visible: HashSet<CourseId>,
}

impl ViewportCuller {
	pub fn new(buffer: f64) -> Self {
		Self {
			buffer,
			key: None,
			visible: HashSet::new(),
		}
	}

	pub fn invalidate(&mut self) {
		self.key = None;
	}

	/// Visible node ids. Nodes in `dragging` are always included.
	pub fn cull(
		&mut self,
		viewport: Viewport,
		transform: &ViewTransform,
		positions: &Positions,
		positions_version: u64,
		dragging: &HashSet<CourseId>,
	) -> HashSet<CourseId> {
		let key = CullKey {
			viewport,
			transform: *transform,
			positions_version,
		};
		if self.key.as_ref() != Some(&key) {
			self.visible = visible_nodes(viewport, transform, positions, self.buffer);
			self.key = Some(key);
		}
		let mut out = self.visible.clone();
		out.extend(dragging.iter().cloned());
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn positions() -> Positions {
		Positions::from([
			("a".into(), Point::new(10.0, 10.0)),
			("b".into(), Point::new(5000.0, 10.0)),
			("c".into(), Point::new(790.0, 590.0)),
		])
	}

	#[test]
	fn keeps_only_nodes_in_view() {
		let visible = visible_nodes(
			Viewport::new(800.0, 600.0),
			&ViewTransform::default(),
			&positions(),
			50.0,
		);
		assert_eq!(visible, HashSet::from(["a".into(), "c".into()]));
	}

	#[test]
	fn buffer_admits_nodes_just_outside() {
		let near = Positions::from([("n".into(), Point::new(-40.0, 300.0))]);
		let t = ViewTransform::default();
		assert!(visible_nodes(Viewport::new(800.0, 600.0), &t, &near, 50.0).len() == 1);
		assert!(visible_nodes(Viewport::new(800.0, 600.0), &t, &near, 10.0).is_empty());
	}

	#[test]
	fn dragged_nodes_are_always_visible() {
		let mut culler = ViewportCuller::new(0.0);
		let dragging = HashSet::from(["b".into()]);
		let visible = culler.cull(
			Viewport::new(800.0, 600.0),
			&ViewTransform::default(),
			&positions(),
			0,
			&dragging,
		);
		assert!(visible.contains(&"b".into()));
	}

	#[test]
	fn recomputes_when_transform_changes() {
		let mut culler = ViewportCuller::new(0.0);
		let viewport = Viewport::new(800.0, 600.0);
		let none = HashSet::new();
		let mut t = ViewTransform::default();
		assert_eq!(culler.cull(viewport, &t, &positions(), 0, &none).len(), 2);
		t.pan_by(-4500.0, 0.0);
		let visible = culler.cull(viewport, &t, &positions(), 0, &none);
		assert_eq!(visible, HashSet::from(["b".into()]));
	}
}
