//! Per-frame canvas painting. Everything here reads state; nothing moves
//! nodes.

use std::f64::consts::{PI, TAU};

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::interaction::tooltip_lines;
use super::layout::NodeLayout;
use super::state::EgoGraphState;
use super::temporal::TimeBand;
use crate::theme::{ThemeKey, ThemePalette};

const LABEL_FONT_PX: f64 = 11.0;
/// Labels stop growing once zoomed out past this scale.
const MIN_LABEL_SCALE: f64 = 0.35;
const MAX_LABEL_CHARS: usize = 28;
const TOOLTIP_FONT_PX: f64 = 12.0;
const TOOLTIP_LINE_PX: f64 = 16.0;
const TOOLTIP_PAD_PX: f64 = 8.0;
const TOOLTIP_OFFSET_PX: f64 = 14.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &EgoGraphState, palette: &ThemePalette, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(palette.get(ThemeKey::Background));
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_guides(state, palette, ctx);
	draw_nodes(state, palette, ctx);
	ctx.restore();
	draw_tooltip(state, palette, ctx);
}

fn draw_guides(state: &EgoGraphState, palette: &ThemePalette, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let bands = &state.config.bands;
	let (dash, gap) = (6.0 / k, 6.0 / k);
	ctx.set_stroke_style_str(palette.get(ThemeKey::Guide));
	ctx.set_line_width(1.0 / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(dash),
		&JsValue::from_f64(gap),
	));
	for band in TimeBand::ALL {
		ctx.begin_path();
		let _ = ctx.arc(0.0, 0.0, bands.midpoint(band), 0.0, TAU);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	ctx.set_fill_style_str(palette.get(ThemeKey::GuideLabel));
	ctx.set_font(&format!("{}px sans-serif", label_font_px(k)));
	ctx.set_text_align("center");
	ctx.set_text_baseline("bottom");
	for band in TimeBand::ALL {
		let _ = ctx.fill_text(band.label(), 0.0, -bands.midpoint(band) - 3.0 / k);
	}
}

fn draw_nodes(state: &EgoGraphState, palette: &ThemePalette, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let t = ease_out_cubic(state.hover.highlight_t);
	let hovered = state.hover.node.as_deref();
	let font_px = label_font_px(k);

	let nodes: Vec<(&NodeLayout, (f64, f64))> = state
		.positioned_nodes()
		.into_iter()
		.filter(|(node, _)| node.is_event())
		.collect();

	for &(node, (x, y)) in &nodes {
		let is_hovered = hovered == Some(node.id.as_str());
		let radius = if is_hovered {
			node.style.size * (1.0 + 0.15 * t)
		} else {
			node.style.size
		};

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.style.fill.to_string());
		ctx.fill();
		ctx.set_stroke_style_str(palette.get(node.style.outline.key));
		ctx.set_line_width(node.style.outline.width);
		ctx.stroke();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_global_alpha(0.7 * t);
			ctx.set_stroke_style_str(palette.get(ThemeKey::Label));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
			ctx.set_global_alpha(1.0);
		}
	}

	ctx.set_fill_style_str(palette.get(ThemeKey::Label));
	ctx.set_font(&format!("{font_px}px sans-serif"));
	ctx.set_text_align("center");
	ctx.set_text_baseline("top");
	for &(node, (x, y)) in &nodes {
		let _ = ctx.fill_text(&short_label(&node.label), x, y + node.style.size + 2.0 / k);
	}
}

fn draw_tooltip(state: &EgoGraphState, palette: &ThemePalette, ctx: &CanvasRenderingContext2d) {
	let Some((node, _)) = state.hovered() else {
		return;
	};
	let lines = tooltip_lines(node, state.working_set.reasons(&node.id));
	let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
	let width = widest * TOOLTIP_FONT_PX * 0.58 + TOOLTIP_PAD_PX * 2.0;
	let height = lines.len() as f64 * TOOLTIP_LINE_PX + TOOLTIP_PAD_PX * 2.0;

	let (px, py) = state.hover.pointer;
	let x = (px + TOOLTIP_OFFSET_PX).min(state.width - width).max(0.0);
	let y = (py + TOOLTIP_OFFSET_PX).min(state.height - height).max(0.0);

	ctx.set_global_alpha(0.94);
	ctx.set_fill_style_str(palette.get(ThemeKey::TooltipBackground));
	ctx.fill_rect(x, y, width, height);
	ctx.set_global_alpha(1.0);

	ctx.set_fill_style_str(palette.get(ThemeKey::TooltipText));
	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	for (i, line) in lines.iter().enumerate() {
		let weight = if i == 0 { "bold " } else { "" };
		ctx.set_font(&format!("{weight}{TOOLTIP_FONT_PX}px sans-serif"));
		let _ = ctx.fill_text(line, x + TOOLTIP_PAD_PX, y + TOOLTIP_PAD_PX + i as f64 * TOOLTIP_LINE_PX);
	}
}

/// Label size in graph units, so it stays readable when zoomed out.
fn label_font_px(k: f64) -> f64 {
	LABEL_FONT_PX / k.max(MIN_LABEL_SCALE)
}

fn short_label(label: &str) -> String {
	if label.chars().count() <= MAX_LABEL_CHARS {
		return label.to_string();
	}
	let cut: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
	format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn label_font_scales_inversely_with_zoom() {
		assert_eq!(label_font_px(1.0), LABEL_FONT_PX);
		assert_eq!(label_font_px(2.0), LABEL_FONT_PX / 2.0);
		assert!(label_font_px(0.5) > label_font_px(1.0));
		assert_eq!(label_font_px(0.01), label_font_px(MIN_LABEL_SCALE));
	}

	#[test]
	fn long_labels_are_shortened() {
		assert_eq!(short_label("Jazz night"), "Jazz night");
		let long = "A very long event title that keeps on going";
		let short = short_label(long);
		assert!(short.ends_with('…'));
		assert!(short.chars().count() <= MAX_LABEL_CHARS);
	}

	#[test]
	fn easing_hits_endpoints() {
		assert_eq!(ease_out_cubic(0.0), 0.0);
		assert_eq!(ease_out_cubic(1.0), 1.0);
		assert!(ease_out_cubic(0.5) > 0.5);
	}
}
