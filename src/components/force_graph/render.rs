use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{GraphView, NODE_RADIUS};
use crate::graph::{EdgeSprite, Frame, NodeSprite};

const BACKGROUND: &str = "#ffffff";
const EDGE_COLOR: &str = "#999";
const EDGE_LABEL_COLOR: &str = "#555";
const NODE_COLOR: &str = "#69b3a2";
const SELECTED_COLOR: &str = "#ff9999";
const NODE_STROKE: &str = "#333";

pub fn render(view: &GraphView, ctx: &CanvasRenderingContext2d) {
	let frame = view.frame();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, view.width, view.height);
	ctx.save();
	let _ = ctx.translate(view.transform.x, view.transform.y);
	let _ = ctx.scale(view.transform.k, view.transform.k);
	draw_edges(&frame, ctx);
	draw_nodes(&frame, ctx);
	ctx.restore();
}

fn draw_edges(frame: &Frame, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width(2.0);
	for edge in &frame.edges {
		ctx.begin_path();
		ctx.move_to(edge.from.x, edge.from.y);
		ctx.line_to(edge.to.x, edge.to.y);
		ctx.stroke();
	}
	for edge in &frame.edges {
		draw_edge_label(edge, ctx);
	}
}

fn draw_edge_label(edge: &EdgeSprite, ctx: &CanvasRenderingContext2d) {
	if edge.label.is_empty() {
		return;
	}
	ctx.save();
	let _ = ctx.translate(edge.label_at.x, edge.label_at.y);
	let _ = ctx.rotate(edge.label_angle);
	ctx.set_fill_style_str(EDGE_LABEL_COLOR);
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");
	// Sits just above the line.
	let _ = ctx.fill_text(&edge.label, 0.0, -5.0);
	ctx.restore();
}

fn draw_nodes(frame: &Frame, ctx: &CanvasRenderingContext2d) {
	for node in &frame.nodes {
		draw_node(node, ctx);
	}
}

fn draw_node(node: &NodeSprite, ctx: &CanvasRenderingContext2d) {
	let (x, y) = (node.at.x, node.at.y);

	ctx.begin_path();
	let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(if node.selected { SELECTED_COLOR } else { NODE_COLOR });
	ctx.fill();
	ctx.set_stroke_style_str(NODE_STROKE);
	ctx.set_line_width(if node.hovered { 3.0 } else { 1.5 });
	ctx.stroke();

	ctx.set_fill_style_str("white");
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&node.name, x, y);
}
