use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::ingest::WorkingSet;
use super::interaction::{ClickAction, NavigateCallback};
use super::render;
use super::state::EgoGraphState;
use crate::config::LayoutConfig;
use crate::error::js_message;
use crate::theme::ThemePalette;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Canvas view of the ranked working set.
///
/// Nothing is painted until `palette` has resolved once. Clicking an event
/// hands its id to `on_navigate`, or changes `location.href` when no
/// callback was given.
#[component]
pub fn EgoGraphCanvas(
	#[prop(into)] working_set: Signal<WorkingSet>,
	#[prop(into)] palette: Signal<Option<ThemePalette>>,
	#[prop(optional)] on_navigate: Option<NavigateCallback>,
	#[prop(optional)] config: Option<LayoutConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<EgoGraphState>>> = Rc::new(RefCell::new(None));
	let current_palette: Rc<RefCell<Option<ThemePalette>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let alive = Arc::new(AtomicBool::new(true));
	let pointer_over_node = RwSignal::new(false);
	let config = config.unwrap_or_default();

	{
		let alive = alive.clone();
		on_cleanup(move || alive.store(false, Ordering::Relaxed));
	}

	let (state_init, palette_init, animate_init, resize_init, alive_init) = (
		state.clone(),
		current_palette.clone(),
		animate.clone(),
		resize_cb.clone(),
		alive.clone(),
	);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window; graph canvas not started");
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}

		let (w, h) = if fullscreen {
			viewport_size(&window)
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0)),
				height
					.unwrap_or_else(|| parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0)),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("2d context has an unexpected type");
					return;
				}
			},
			Ok(None) => {
				error!("canvas has no 2d context");
				return;
			}
			Err(e) => {
				error!("could not get 2d context: {}", js_message(&e));
				return;
			}
		};

		let mut initial = EgoGraphState::new(config.clone(), w, h);
		initial.apply_working_set(&working_set.get_untracked(), Utc::now());
		*state_init.borrow_mut() = Some(initial);

		if fullscreen {
			let (state_resize, canvas_resize, alive_resize) =
				(state_init.clone(), canvas.clone(), alive_init.clone());
			*resize_init.borrow_mut() = Some(Closure::new(move || {
				if !alive_resize.load(Ordering::Relaxed) {
					return;
				}
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = viewport_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, palette_anim, animate_inner, alive_anim) = (
			state_init.clone(),
			palette_init.clone(),
			animate_init.clone(),
			alive_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				debug!("graph canvas unmounted; stopping frame loop");
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				if let Some(ref palette) = *palette_anim.borrow() {
					render::render(s, palette, &ctx);
				}
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), &*animate_inner.borrow()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_ws = state.clone();
	Effect::new(move |_| {
		let set = working_set.get();
		if let Some(ref mut s) = *state_ws.borrow_mut() {
			s.apply_working_set(&set, Utc::now());
		}
	});

	let palette_fx = current_palette.clone();
	Effect::new(move |_| {
		*palette_fx.borrow_mut() = palette.get();
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pan.active = true;
			s.pan.moved = false;
			s.pan.start_x = x;
			s.pan.start_y = y;
			s.pan.transform_start_x = s.transform.x;
			s.pan.transform_start_y = s.transform.y;
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.pan.active {
				let (dx, dy) = (x - s.pan.start_x, y - s.pan.start_y);
				if dx.abs() + dy.abs() > 3.0 {
					s.pan.moved = true;
				}
				if s.pan.moved {
					s.transform.x = s.pan.transform_start_x + dx;
					s.transform.y = s.pan.transform_start_y + dy;
				}
			} else {
				let hovered = s.node_at_position(x, y).map(|node| node.id.clone());
				pointer_over_node.set(hovered.is_some());
				s.set_hover(hovered, (x, y));
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let point = local_point(canvas_ref, &ev);
		let action = {
			let mut guard = state_mu.borrow_mut();
			let Some(ref mut s) = *guard else {
				return;
			};
			let was_click = s.pan.active && !s.pan.moved;
			s.pan.active = false;
			s.pan.moved = false;
			match point {
				Some((x, y)) if was_click => s.click(x, y, on_navigate.is_some()),
				_ => ClickAction::Ignore,
			}
		};
		// The state borrow is released before calling out, the callback may
		// unmount this component.
		match action {
			ClickAction::Navigate(event_id) => {
				if let Some(ref navigate) = on_navigate {
					navigate(&event_id);
				}
			}
			ClickAction::Relocate(path) => {
				let result = web_sys::window().map(|w| w.location().set_href(&path));
				if let Some(Err(e)) = result {
					error!("could not navigate to {path}: {}", js_message(&e));
				}
			}
			ClickAction::Ignore => {}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pan.active = false;
			s.pan.moved = false;
			let pointer = s.hover.pointer;
			s.set_hover(None, pointer);
		}
		pointer_over_node.set(false);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="ego-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style=move || {
				let cursor = if pointer_over_node.get() { "pointer" } else { "grab" };
				format!("display: block; cursor: {cursor};")
			}
		/>
	}
}

fn viewport_size(window: &Window) -> (f64, f64) {
	let dim = |value: Result<JsValue, JsValue>, fallback: f64| {
		value.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

/// Pointer position relative to the canvas' top-left corner.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}
