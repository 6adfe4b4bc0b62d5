use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use super::SimNode;

const JIGGLE: f64 = 1e-6;
const CHARGE_DISTANCE_MIN_SQ: f64 = 1.0;

/// A force registered under a name. Per-node tables are keyed by node id;
/// nodes missing from a table are left untouched by that force.
#[derive(Clone, Debug, PartialEq)]
pub enum ForceSpec {
	/// Pull toward a per-node distance from `center`.
	Radial {
		center: (f64, f64),
		radii: HashMap<String, f64>,
		strength: f64,
	},
	/// Pull toward a per-node x coordinate.
	X {
		targets: HashMap<String, f64>,
		strength: f64,
	},
	/// Pull toward a per-node y coordinate.
	Y {
		targets: HashMap<String, f64>,
		strength: f64,
	},
	/// Push overlapping circles apart. Not scaled by alpha.
	Collide {
		radii: HashMap<String, f64>,
		strength: f64,
		iterations: usize,
	},
	/// Pairwise many-body force; negative strength repels.
	Charge {
		members: HashSet<String>,
		strength: f64,
	},
}

impl ForceSpec {
	pub(super) fn apply(&self, nodes: &mut [SimNode], alpha: f64) {
		match self {
			ForceSpec::Radial {
				center,
				radii,
				strength,
			} => apply_radial(nodes, *center, radii, *strength, alpha),
			ForceSpec::X { targets, strength } => {
				for node in nodes.iter_mut() {
					if let Some(&tx) = targets.get(&node.id) {
						node.vx += (tx - node.x) * strength * alpha;
					}
				}
			}
			ForceSpec::Y { targets, strength } => {
				for node in nodes.iter_mut() {
					if let Some(&ty) = targets.get(&node.id) {
						node.vy += (ty - node.y) * strength * alpha;
					}
				}
			}
			ForceSpec::Collide {
				radii,
				strength,
				iterations,
			} => {
				let lookup: Vec<Option<f64>> =
					nodes.iter().map(|node| radii.get(&node.id).copied()).collect();
				for _ in 0..*iterations {
					apply_collide(nodes, &lookup, *strength);
				}
			}
			ForceSpec::Charge { members, strength } => {
				apply_charge(nodes, members, *strength, alpha)
			}
		}
	}
}

fn apply_radial(
	nodes: &mut [SimNode],
	center: (f64, f64),
	radii: &HashMap<String, f64>,
	strength: f64,
	alpha: f64,
) {
	for node in nodes.iter_mut() {
		let Some(&radius) = radii.get(&node.id) else {
			continue;
		};
		let dx = nonzero(node.x - center.0);
		let dy = nonzero(node.y - center.1);
		let distance = (dx * dx + dy * dy).sqrt();
		let k = (radius - distance) * strength * alpha / distance;
		node.vx += dx * k;
		node.vy += dy * k;
	}
}

fn apply_collide(nodes: &mut [SimNode], radii: &[Option<f64>], strength: f64) {
	for i in 0..nodes.len() {
		let Some(ri) = radii[i] else {
			continue;
		};
		// Predicted position of `i` is fixed for the whole inner loop.
		let (xi, yi) = (nodes[i].x + nodes[i].vx, nodes[i].y + nodes[i].vy);
		let ri_sq = ri * ri;
		for j in (i + 1)..nodes.len() {
			let Some(rj) = radii[j] else {
				continue;
			};
			let reach = ri + rj;
			let mut dx = xi - nodes[j].x - nodes[j].vx;
			let mut dy = yi - nodes[j].y - nodes[j].vy;
			let mut distance_sq = dx * dx + dy * dy;
			if distance_sq >= reach * reach {
				continue;
			}
			if distance_sq == 0.0 {
				(dx, dy) = jiggle(i, j);
				distance_sq = dx * dx + dy * dy;
			}
			let distance = distance_sq.sqrt();
			let push = (reach - distance) / distance * strength;
			let rj_sq = rj * rj;
			let share = rj_sq / (ri_sq + rj_sq);
			let (px, py) = (dx * push, dy * push);
			nodes[i].vx += px * share;
			nodes[i].vy += py * share;
			nodes[j].vx -= px * (1.0 - share);
			nodes[j].vy -= py * (1.0 - share);
		}
	}
}

fn apply_charge(nodes: &mut [SimNode], members: &HashSet<String>, strength: f64, alpha: f64) {
	let active: Vec<usize> = (0..nodes.len())
		.filter(|&i| members.contains(&nodes[i].id))
		.collect();
	let mut deltas = vec![(0.0, 0.0); nodes.len()];
	for &i in &active {
		for &j in &active {
			if i == j {
				continue;
			}
			let (mut dx, mut dy) = (nodes[j].x - nodes[i].x, nodes[j].y - nodes[i].y);
			let mut distance_sq = dx * dx + dy * dy;
			if distance_sq == 0.0 {
				(dx, dy) = jiggle(i.min(j), i.max(j));
				if i > j {
					(dx, dy) = (-dx, -dy);
				}
				distance_sq = dx * dx + dy * dy;
			}
			if distance_sq < CHARGE_DISTANCE_MIN_SQ {
				distance_sq = (CHARGE_DISTANCE_MIN_SQ * distance_sq).sqrt();
			}
			let w = strength * alpha / distance_sq;
			deltas[i].0 += dx * w;
			deltas[i].1 += dy * w;
		}
	}
	for (node, (dvx, dvy)) in nodes.iter_mut().zip(deltas) {
		node.vx += dvx;
		node.vy += dvy;
	}
}

fn nonzero(v: f64) -> f64 {
	if v == 0.0 { JIGGLE } else { v }
}

/// Deterministic tiny offset for coincident points, distinct per pair.
fn jiggle(i: usize, j: usize) -> (f64, f64) {
	let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214 + 0.1) * TAU;
	(angle.cos() * JIGGLE, angle.sin() * JIGGLE)
}
