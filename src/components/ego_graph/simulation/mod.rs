//! Named-force simulation engine.
//!
//! The layout talks to the engine only through [`SimulationEngine`] so a
//! different backend can be dropped in. [`CpuSimulation`] is a velocity
//! Verlet integrator with alpha cooling in the style of d3-force: forces
//! write velocities, the engine decays and integrates them, and ticking
//! stops after a bounded cooldown until the next reheat.

mod forces;

use std::collections::HashMap;

pub use forces::ForceSpec;

#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
}

/// Initial placement for a node the engine has not seen before.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSeed {
	pub id: String,
	pub x: f64,
	pub y: f64,
}

pub trait SimulationEngine {
	/// Replace the node set. Nodes whose id was already present keep their
	/// position and velocity; new nodes start at their seed.
	fn set_nodes(&mut self, seeds: &[NodeSeed]);

	/// Install `force` under `name`, replacing any force with that name.
	fn register_force(&mut self, name: &str, force: ForceSpec);

	fn remove_force(&mut self, name: &str) -> bool;

	fn force_names(&self) -> Vec<String>;

	/// Restart cooling so the layout relaxes toward new targets.
	fn reheat(&mut self);

	/// Advance one step. Returns `false` once the engine has cooled down.
	fn tick(&mut self) -> bool;

	fn is_active(&self) -> bool;

	fn position(&self, id: &str) -> Option<(f64, f64)>;

	fn positions_of(&self, ids: &[String]) -> Vec<Option<(f64, f64)>> {
		ids.iter().map(|id| self.position(id)).collect()
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
	pub alpha_min: f64,
	pub velocity_decay: f64,
	pub cooldown_ticks: u32,
}

impl Default for SimulationParams {
	fn default() -> Self {
		Self {
			alpha_min: 0.001,
			velocity_decay: 0.4,
			cooldown_ticks: 300,
		}
	}
}

impl SimulationParams {
	/// Decay that brings alpha from 1 to `alpha_min` in `cooldown_ticks`.
	pub fn alpha_decay(&self) -> f64 {
		1.0 - self.alpha_min.powf(1.0 / f64::from(self.cooldown_ticks.max(1)))
	}
}

pub struct CpuSimulation {
	nodes: Vec<SimNode>,
	index: HashMap<String, usize>,
	forces: Vec<(String, ForceSpec)>,
	params: SimulationParams,
	alpha: f64,
	ticks: u32,
}

impl CpuSimulation {
	pub fn new(params: SimulationParams) -> Self {
		Self {
			nodes: Vec::new(),
			index: HashMap::new(),
			forces: Vec::new(),
			params,
			alpha: 1.0,
			ticks: 0,
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}
}

impl SimulationEngine for CpuSimulation {
	fn set_nodes(&mut self, seeds: &[NodeSeed]) {
		let nodes: Vec<SimNode> = seeds
			.iter()
			.map(|seed| match self.index.get(&seed.id) {
				Some(&i) => self.nodes[i].clone(),
				None => SimNode {
					id: seed.id.clone(),
					x: seed.x,
					y: seed.y,
					vx: 0.0,
					vy: 0.0,
				},
			})
			.collect();
		self.index = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		self.nodes = nodes;
	}

	fn register_force(&mut self, name: &str, force: ForceSpec) {
		match self.forces.iter_mut().find(|(n, _)| n == name) {
			Some(slot) => slot.1 = force,
			None => self.forces.push((name.to_string(), force)),
		}
	}

	fn remove_force(&mut self, name: &str) -> bool {
		let before = self.forces.len();
		self.forces.retain(|(n, _)| n != name);
		self.forces.len() != before
	}

	fn force_names(&self) -> Vec<String> {
		self.forces.iter().map(|(name, _)| name.clone()).collect()
	}

	fn reheat(&mut self) {
		self.alpha = 1.0;
		self.ticks = 0;
	}

	fn tick(&mut self) -> bool {
		if !self.is_active() {
			return false;
		}
		self.alpha -= self.alpha * self.params.alpha_decay();
		for (_, force) in &self.forces {
			force.apply(&mut self.nodes, self.alpha);
		}
		let retain = 1.0 - self.params.velocity_decay;
		for node in &mut self.nodes {
			node.vx *= retain;
			node.vy *= retain;
			node.x += node.vx;
			node.y += node.vy;
		}
		self.ticks += 1;
		true
	}

	fn is_active(&self) -> bool {
		self.ticks < self.params.cooldown_ticks && self.alpha >= self.params.alpha_min
	}

	fn position(&self, id: &str) -> Option<(f64, f64)> {
		self.index.get(id).map(|&i| (self.nodes[i].x, self.nodes[i].y))
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	fn seed(id: &str, x: f64, y: f64) -> NodeSeed {
		NodeSeed {
			id: id.into(),
			x,
			y,
		}
	}

	fn table(ids: &[&str], value: f64) -> HashMap<String, f64> {
		ids.iter().map(|id| (id.to_string(), value)).collect()
	}

	fn run(sim: &mut CpuSimulation) -> u32 {
		let mut ticks = 0;
		while sim.tick() {
			ticks += 1;
			assert!(ticks <= 10_000, "simulation never cooled down");
		}
		ticks
	}

	fn distance(sim: &CpuSimulation, a: &str, b: &str) -> f64 {
		let (ax, ay) = sim.position(a).unwrap();
		let (bx, by) = sim.position(b).unwrap();
		((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
	}

	#[test]
	fn collision_separates_coincident_targets() {
		let ids = ["a", "b", "c", "d", "e"];
		let size = 10.0;
		let padding = 4.0;
		let mut sim = CpuSimulation::new(SimulationParams::default());
		let seeds: Vec<_> = ids.iter().map(|id| seed(id, 100.0, 0.0)).collect();
		sim.set_nodes(&seeds);
		sim.register_force("x", ForceSpec::X { targets: table(&ids, 100.0), strength: 0.08 });
		sim.register_force("y", ForceSpec::Y { targets: table(&ids, 0.0), strength: 0.08 });
		sim.register_force(
			"collide",
			ForceSpec::Collide {
				radii: table(&ids, size + padding),
				strength: 0.9,
				iterations: 3,
			},
		);

		let ticks = run(&mut sim);
		assert!(ticks <= 300);
		for (i, a) in ids.iter().enumerate() {
			for b in &ids[i + 1..] {
				let d = distance(&sim, a, b);
				assert!(d >= 2.0 * size, "{a}-{b} overlap: {d}");
			}
		}
	}

	#[test]
	fn radial_force_pulls_toward_ring() {
		let mut sim = CpuSimulation::new(SimulationParams::default());
		sim.set_nodes(&[seed("a", 40.0, 0.0)]);
		sim.register_force(
			"radial",
			ForceSpec::Radial {
				center: (0.0, 0.0),
				radii: table(&["a"], 200.0),
				strength: 0.2,
			},
		);
		run(&mut sim);
		let (x, y) = sim.position("a").unwrap();
		let r = (x * x + y * y).sqrt();
		assert!((r - 200.0).abs() < 10.0, "ended at radius {r}");
	}

	#[test]
	fn charge_repels_members_only() {
		let mut sim = CpuSimulation::new(SimulationParams::default());
		sim.set_nodes(&[seed("a", -5.0, 0.0), seed("b", 5.0, 0.0), seed("ghost", 0.0, 3.0)]);
		let members: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
		sim.register_force("charge", ForceSpec::Charge { members, strength: -30.0 });
		for _ in 0..20 {
			sim.tick();
		}
		assert!(distance(&sim, "a", "b") > 10.0);
		assert_eq!(sim.position("ghost"), Some((0.0, 3.0)));
	}

	#[test]
	fn nodes_outside_force_tables_do_not_move() {
		let mut sim = CpuSimulation::new(SimulationParams::default());
		sim.set_nodes(&[seed("event", 0.0, 0.0), seed("person", 7.0, 7.0)]);
		sim.register_force("x", ForceSpec::X { targets: table(&["event"], 50.0), strength: 0.1 });
		run(&mut sim);
		assert_eq!(sim.position("person"), Some((7.0, 7.0)));
		assert!(sim.position("event").unwrap().0 > 0.0);
	}

	#[test]
	fn registering_same_name_replaces_force() {
		let mut sim = CpuSimulation::new(SimulationParams::default());
		sim.register_force("x", ForceSpec::X { targets: HashMap::new(), strength: 0.1 });
		sim.register_force("y", ForceSpec::Y { targets: HashMap::new(), strength: 0.1 });
		sim.register_force("x", ForceSpec::X { targets: HashMap::new(), strength: 0.5 });
		assert_eq!(sim.force_names(), ["x", "y"]);
		assert!(sim.remove_force("y"));
		assert!(!sim.remove_force("y"));
		assert_eq!(sim.force_names(), ["x"]);
	}

	#[test]
	fn set_nodes_repositions_instead_of_recreating() {
		let mut sim = CpuSimulation::new(SimulationParams::default());
		sim.set_nodes(&[seed("a", 0.0, 0.0), seed("b", 10.0, 0.0)]);
		sim.register_force("x", ForceSpec::X { targets: table(&["a", "b"], 30.0), strength: 0.2 });
		for _ in 0..10 {
			sim.tick();
		}
		let moved = sim.position("a").unwrap();
		assert_ne!(moved, (0.0, 0.0));

		sim.set_nodes(&[seed("c", -1.0, -1.0), seed("a", 0.0, 0.0)]);
		assert_eq!(sim.position("a"), Some(moved));
		assert_eq!(sim.position("c"), Some((-1.0, -1.0)));
		assert_eq!(sim.position("b"), None);
		let ids = vec!["a".to_string(), "zzz".to_string()];
		assert_eq!(sim.positions_of(&ids), vec![Some(moved), None]);
	}

	#[test]
	fn cooldown_stops_ticking_until_reheat() {
		let params = SimulationParams {
			cooldown_ticks: 25,
			..SimulationParams::default()
		};
		let mut sim = CpuSimulation::new(params);
		sim.set_nodes(&[seed("a", 0.0, 0.0)]);
		assert_eq!(run(&mut sim), 25);
		assert!(!sim.is_active());
		assert!(!sim.tick());
		sim.reheat();
		assert!(sim.is_active());
		assert!(sim.tick());
		assert!(sim.alpha() < 1.0);
	}
}
