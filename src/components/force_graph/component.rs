use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent, Window,
};

use super::render;
use super::state::{GraphHandle, SelectedTopic};
use crate::graph::NodeId;

const FRAME_DT: f32 = 0.016;

fn window_size(window: &Window) -> (f64, f64) {
	(
		window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(1000.0),
		window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(800.0),
	)
}

fn local_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn set_cursor(canvas: &HtmlCanvasElement, hovering: bool) {
	// The leptos prelude shadows `style()` on elements.
	let _ = HtmlElement::style(canvas).set_property("cursor", cursor_for(hovering));
}

fn cursor_for(hovering: bool) -> &'static str {
	if hovering { "pointer" } else { "grab" }
}

/// Canvas that animates and draws the shared [`GraphHandle`].
///
/// Clicking a node writes its details to `selection` and its id to
/// `expand_request`; clearing the selection writes `None` to `selection`.
#[component]
pub fn ForceGraphCanvas(
	graph: GraphHandle,
	selection: RwSignal<Option<SelectedTopic>>,
	expand_request: RwSignal<Option<NodeId>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (graph_init, animate_init, resize_cb_init) =
		(graph.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(1000.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(800.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				log::error!("canvas 2d context unavailable");
				return;
			}
		};
		if let Some(ref mut view) = *graph_init.borrow_mut() {
			view.resize(w, h);
		}

		if fullscreen {
			let (graph_resize, canvas_resize) = (graph_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut view) = *graph_resize.borrow_mut() {
					view.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		// The view may arrive after the loop starts; frames draw once it does.
		let (graph_anim, animate_inner) = (graph_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut view) = *graph_anim.borrow_mut() {
				view.tick(FRAME_DT);
				render::render(view, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let graph_md = graph.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut view) = *graph_md.borrow_mut() {
			view.pointer_down(x, y);
		}
	};

	let graph_mm = graph.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut view) = *graph_mm.borrow_mut() {
			view.pointer_move(x, y);
			set_cursor(&canvas, view.is_hovering());
		}
	};

	let graph_mu = graph.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		let outcome = graph_mu
			.borrow_mut()
			.as_mut()
			.map(|view| (view.pointer_up(x, y), view.selected_topic()));
		if let Some((expand, selected)) = outcome {
			if selection.get_untracked() != selected {
				selection.set(selected);
			}
			if expand.is_some() {
				expand_request.set(expand);
			}
		}
	};

	let graph_ml = graph.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut view) = *graph_ml.borrow_mut() {
			view.pointer_leave();
		}
	};

	let graph_wh = graph;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut view) = *graph_wh.borrow_mut() {
			view.zoom(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cursor_follows_hover() {
		assert_eq!(cursor_for(true), "pointer");
		assert_eq!(cursor_for(false), "grab");
	}
}
