use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::graph::RelationKind;
use crate::interaction::{RenderEdge, RenderFrame, RenderNode};

use super::state::{CourseGraphState, NODE_RADIUS};

fn edge_rgb(kind: RelationKind) -> &'static str {
	match kind {
		RelationKind::Prerequisite => "100, 180, 255",
		RelationKind::Corequisite => "120, 220, 140",
		RelationKind::Antirequisite => "255, 110, 110",
		RelationKind::Equivalent => "220, 200, 90",
	}
}

pub fn render(state: &CourseGraphState, ctx: &CanvasRenderingContext2d) {
	let frame = &state.frame;
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(frame.transform.x, frame.transform.y);
	let _ = ctx.scale(frame.transform.k, frame.transform.k);
	draw_edges(frame, ctx);
	draw_nodes(frame, ctx);
	ctx.restore();
}

fn draw_edges(frame: &RenderFrame, ctx: &CanvasRenderingContext2d) {
	let k = frame.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 6.0 / k, 4.0 / k, 8.0 / k);
	// Bright edges go last so dimmed ones never paint over them.
	for dimmed in [true, false] {
		for edge in frame.edges.iter().filter(|e| e.dimmed == dimmed) {
			draw_edge(edge, ctx, line_width, arrow_size, (dash, gap));
		}
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_edge(
	edge: &RenderEdge,
	ctx: &CanvasRenderingContext2d,
	line_width: f64,
	arrow_size: f64,
	(dash, gap): (f64, f64),
) {
	let (x1, y1, x2, y2) = (edge.from.x, edge.from.y, edge.to.x, edge.to.y);
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let rgb = edge_rgb(edge.kind);
	let (edge_alpha, arrow_alpha) = if edge.dimmed { (0.15, 0.2) } else { (0.6, 0.8) };

	ctx.set_stroke_style_str(&format!("rgba({}, {})", rgb, edge_alpha));
	ctx.set_line_width(line_width);
	if edge.kind == RelationKind::Antirequisite {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	let (ux, uy) = (dx / dist, dy / dist);
	ctx.begin_path();
	ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
	ctx.line_to(
		x2 - ux * (NODE_RADIUS + arrow_size),
		y2 - uy * (NODE_RADIUS + arrow_size),
	);
	ctx.stroke();

	// Equivalence is symmetric.
	if edge.kind == RelationKind::Equivalent {
		return;
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_fill_style_str(&format!("rgba({}, {})", rgb, arrow_alpha));
	let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
	let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
	let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_nodes(frame: &RenderFrame, ctx: &CanvasRenderingContext2d) {
	let k = frame.transform.k;
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
	for dimmed in [true, false] {
		for node in frame.nodes.iter().filter(|n| n.dimmed == dimmed) {
			draw_node(node, ctx, k);
		}
	}
}

fn draw_node(node: &RenderNode, ctx: &CanvasRenderingContext2d, k: f64) {
	let (x, y) = (node.position.x, node.position.y);
	let alpha = if node.dimmed { 0.3 } else { 1.0 };
	let radius = if node.selected || node.dragging {
		NODE_RADIUS * 1.35
	} else {
		NODE_RADIUS
	};

	ctx.set_global_alpha(alpha);
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(if node.selected { "#ff7f0e" } else { "#1f77b4" });
	ctx.fill();

	if node.selected {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
		ctx.set_line_width(1.5 / k);
		ctx.stroke();
	}

	ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
	let _ = ctx.fill_text(&node.label, x + radius + 3.0, y + 3.0);
	ctx.set_global_alpha(1.0);
}
