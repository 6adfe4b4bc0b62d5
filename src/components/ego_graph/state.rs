use chrono::{DateTime, Utc};
use log::info;

use super::ingest::WorkingSet;
use super::interaction::{ClickAction, click_action, hit_test};
use super::layout::{LayoutPlan, NodeLayout};
use super::simulation::{CpuSimulation, SimulationEngine, SimulationParams};
use crate::config::LayoutConfig;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Fraction of the shorter canvas side the outer band should fill.
const FIT_FRACTION: f64 = 0.46;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<String>,
	/// Last pointer position in screen space, anchors the tooltip.
	pub pointer: (f64, f64),
	/// Eased 0..1 emphasis of the hovered node.
	pub highlight_t: f64,
}

pub struct EgoGraphState {
	pub engine: Box<dyn SimulationEngine>,
	pub plan: Option<LayoutPlan>,
	pub working_set: WorkingSet,
	pub config: LayoutConfig,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
}

impl EgoGraphState {
	pub fn new(config: LayoutConfig, width: f64, height: f64) -> Self {
		let engine = CpuSimulation::new(SimulationParams {
			alpha_min: config.alpha_min,
			velocity_decay: config.velocity_decay,
			cooldown_ticks: config.cooldown_ticks,
		});
		Self::with_engine(Box::new(engine), config, width, height)
	}

	pub fn with_engine(
		engine: Box<dyn SimulationEngine>,
		config: LayoutConfig,
		width: f64,
		height: f64,
	) -> Self {
		let mut state = Self {
			engine,
			plan: None,
			working_set: WorkingSet::default(),
			config,
			transform: ViewTransform::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
		};
		state.fit_view();
		state
	}

	/// Center the origin and zoom so the outer band fits the canvas.
	pub fn fit_view(&mut self) {
		let outer = self.config.bands.outer() + self.config.base_scale * 1.4;
		let k = (self.width.min(self.height) * FIT_FRACTION / outer).clamp(MIN_ZOOM, MAX_ZOOM);
		self.transform = ViewTransform {
			x: self.width / 2.0,
			y: self.height / 2.0,
			k,
		};
	}

	/// Rebuild the plan for `set`. Styles, labels and explanations always
	/// follow the new set; forces are only re-registered (and the engine
	/// reheated) when the layout key changed. Returns whether that happened.
	pub fn apply_working_set(&mut self, set: &WorkingSet, now: DateTime<Utc>) -> bool {
		let plan = LayoutPlan::compute(set, now, &self.config);
		let reregister = self.plan.as_ref().is_none_or(|old| old.key() != plan.key());
		if reregister {
			plan.register(&mut *self.engine, &self.config);
			info!("working set rebuilt with {} events", plan.nodes.len());
		}
		if self
			.hover
			.node
			.as_deref()
			.is_some_and(|id| plan.get(id).is_none())
		{
			self.hover.node = None;
		}
		self.plan = Some(plan);
		self.working_set = set.clone();
		reregister
	}

	/// One animation step: advance physics while warm and ease the hover.
	pub fn tick(&mut self, dt: f64) -> bool {
		let moved = self.engine.is_active() && self.engine.tick();
		let target = if self.hover.node.is_some() { 1.0 } else { 0.0 };
		self.hover.highlight_t += (target - self.hover.highlight_t) * (dt * 8.0).min(1.0);
		if self.hover.highlight_t < 0.01 && target == 0.0 {
			self.hover.highlight_t = 0.0;
		}
		moved
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Every planned node with its current simulated position.
	pub fn positioned_nodes(&self) -> Vec<(&NodeLayout, (f64, f64))> {
		let Some(plan) = &self.plan else {
			return Vec::new();
		};
		plan.nodes
			.iter()
			.filter_map(|node| self.engine.position(&node.id).map(|pos| (node, pos)))
			.collect()
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<&NodeLayout> {
		hit_test(self.positioned_nodes(), self.screen_to_graph(sx, sy))
	}

	pub fn set_hover(&mut self, node: Option<String>, pointer: (f64, f64)) {
		self.hover.pointer = pointer;
		self.hover.node = node;
	}

	pub fn hovered(&self) -> Option<(&NodeLayout, (f64, f64))> {
		let id = self.hover.node.as_deref()?;
		self.positioned_nodes()
			.into_iter()
			.find(|(node, _)| node.id == id)
	}

	pub fn click(&self, sx: f64, sy: f64, has_navigator: bool) -> ClickAction {
		click_action(self.node_at_position(sx, sy), has_navigator)
	}

	/// Zoom by one wheel notch around the pointer.
	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}
