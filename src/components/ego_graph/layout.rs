//! Turns the working set into per-node targets and registers the forces
//! that pull nodes toward them.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use log::debug;

use super::angle::angle;
use super::encoding::{NodeStyle, SizeScale, style_for};
use super::ingest::WorkingSet;
use super::simulation::{ForceSpec, NodeSeed, SimulationEngine};
use super::temporal::{horizon_for, radius};
use super::types::NodeType;
use crate::config::LayoutConfig;

pub const FORCE_RADIAL: &str = "radial";
pub const FORCE_X: &str = "x";
pub const FORCE_Y: &str = "y";
pub const FORCE_COLLIDE: &str = "collide";
pub const FORCE_CHARGE: &str = "charge";

const CENTER: (f64, f64) = (0.0, 0.0);

#[derive(Clone, Debug, PartialEq)]
pub struct NodeLayout {
	pub id: String,
	pub label: String,
	pub node_type: NodeType,
	pub event_id: Option<String>,
	pub target_radius: f64,
	pub angle: f64,
	pub target: (f64, f64),
	pub style: NodeStyle,
}

impl NodeLayout {
	pub fn is_event(&self) -> bool {
		self.node_type == NodeType::Event
	}
}

/// Identity of the inputs that shaped a plan. Forces are only re-registered
/// when this changes.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutKey {
	nodes: Vec<(String, Option<String>, u64)>,
	horizon_minutes: i64,
	scale: (u64, u64, u64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPlan {
	pub nodes: Vec<NodeLayout>,
	pub horizon: f64,
	pub scale: SizeScale,
	key: LayoutKey,
}

impl LayoutPlan {
	pub fn compute(set: &WorkingSet, now: DateTime<Utc>, config: &LayoutConfig) -> Self {
		let events = || set.nodes.iter().filter(|node| node.is_event());
		let horizon = horizon_for(events().map(|node| node.starts_at.as_deref()), now);
		let scale = SizeScale::from_scores(events().map(|node| node.score()), config.base_scale);

		let nodes = set
			.nodes
			.iter()
			.map(|node| {
				let target_radius = radius(node.starts_at.as_deref(), now, horizon, &config.bands);
				let theta = angle(&node.id);
				NodeLayout {
					id: node.id.clone(),
					label: node.label.clone(),
					node_type: node.node_type,
					event_id: node.event_id.clone(),
					target_radius,
					angle: theta,
					target: (
						CENTER.0 + target_radius * theta.cos(),
						CENTER.1 + target_radius * theta.sin(),
					),
					style: style_for(node, &scale),
				}
			})
			.collect();

		let key = LayoutKey {
			nodes: set
				.nodes
				.iter()
				.map(|node| (node.id.clone(), node.starts_at.clone(), node.score().to_bits()))
				.collect(),
			horizon_minutes: (horizon / 60.0).round() as i64,
			scale: (scale.min.to_bits(), scale.max.to_bits(), scale.base.to_bits()),
		};

		Self {
			nodes,
			horizon,
			scale,
			key,
		}
	}

	pub fn key(&self) -> &LayoutKey {
		&self.key
	}

	pub fn get(&self, id: &str) -> Option<&NodeLayout> {
		self.nodes.iter().find(|node| node.id == id)
	}

	pub fn seeds(&self) -> Vec<NodeSeed> {
		self.nodes
			.iter()
			.map(|node| NodeSeed {
				id: node.id.clone(),
				x: node.target.0,
				y: node.target.1,
			})
			.collect()
	}

	/// The named forces for this plan. Only event nodes appear in any table.
	pub fn forces(&self, config: &LayoutConfig) -> Vec<(&'static str, ForceSpec)> {
		let events = || self.nodes.iter().filter(|node| node.is_event());
		let per_event = |value: fn(&NodeLayout) -> f64| -> HashMap<String, f64> {
			events().map(|node| (node.id.clone(), value(node))).collect()
		};
		let padding = config.collide_padding;
		vec![
			(
				FORCE_RADIAL,
				ForceSpec::Radial {
					center: CENTER,
					radii: per_event(|node| node.target_radius),
					strength: config.radial_strength,
				},
			),
			(
				FORCE_X,
				ForceSpec::X {
					targets: per_event(|node| node.target.0),
					strength: config.target_strength,
				},
			),
			(
				FORCE_Y,
				ForceSpec::Y {
					targets: per_event(|node| node.target.1),
					strength: config.target_strength,
				},
			),
			(
				FORCE_COLLIDE,
				ForceSpec::Collide {
					radii: events()
						.map(|node| (node.id.clone(), node.style.size + padding))
						.collect(),
					strength: config.collide_strength,
					iterations: config.collide_iterations,
				},
			),
			(
				FORCE_CHARGE,
				ForceSpec::Charge {
					members: events().map(|node| node.id.clone()).collect::<HashSet<_>>(),
					strength: config.charge_strength,
				},
			),
		]
	}

	/// Sync the engine's node set, overwrite every force by name and reheat.
	pub fn register(&self, engine: &mut dyn SimulationEngine, config: &LayoutConfig) {
		engine.set_nodes(&self.seeds());
		for (name, force) in self.forces(config) {
			engine.register_force(name, force);
		}
		engine.reheat();
		debug!(
			"registered forces for {} nodes (horizon {:.1}h)",
			self.nodes.len(),
			self.horizon / 3600.0
		);
	}
}
