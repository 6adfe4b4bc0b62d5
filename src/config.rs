//! Tunables for the layout and the few runtime settings the app reads.

use crate::components::ego_graph::temporal::BandRadii;

/// Build-time override for the recommendation API origin.
const API_BASE: Option<&str> = option_env!("EGO_GRAPH_API_BASE");

/// User shown when the URL does not name one.
pub const DEFAULT_USER_ID: &str = "1";

/// Layout and physics tuning.
///
/// Only the orderings matter (Today < Next 7 days < Later, higher score is
/// larger, more social proof is more saturated); the numbers are defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Radius interval of each time band.
	pub bands: BandRadii,
	/// Multiplier applied to `0.4 + normalized score`.
	pub base_scale: f64,
	/// Strength of the pull toward the band radius.
	pub radial_strength: f64,
	/// Strength of the pull toward the polar target point.
	pub target_strength: f64,
	/// Many-body strength, negative for repulsion.
	pub charge_strength: f64,
	/// Extra spacing added to each node's collision radius.
	pub collide_padding: f64,
	/// Collision passes per tick.
	pub collide_iterations: usize,
	/// Collision stiffness in `[0, 1]`.
	pub collide_strength: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Alpha below which the simulation counts as settled.
	pub alpha_min: f64,
	/// Hard cap on ticks after a (re)heat.
	pub cooldown_ticks: u32,
	/// Number of event nodes kept in the working set.
	pub top_n: usize,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			bands: BandRadii::default(),
			base_scale: 14.0,
			radial_strength: 0.2,
			target_strength: 0.08,
			charge_strength: -9.0,
			collide_padding: 4.0,
			collide_iterations: 3,
			collide_strength: 0.9,
			velocity_decay: 0.4,
			alpha_min: 0.001,
			cooldown_ticks: 300,
			top_n: 10,
		}
	}
}

/// Where to fetch the graph from and for whom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
	/// Origin prefix for API calls; empty means same origin.
	pub api_base: String,
	/// User whose ego graph is requested.
	pub user_id: String,
	/// Passed through to the backend untouched.
	pub debug: bool,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base: API_BASE.unwrap_or_default().trim_end_matches('/').to_string(),
			user_id: DEFAULT_USER_ID.to_string(),
			debug: false,
		}
	}
}

impl AppConfig {
	/// Apply the `user_id` and `debug` query parameters on top of the defaults.
	pub fn from_query(user_id: Option<String>, debug: Option<String>) -> Self {
		let mut config = Self::default();
		if let Some(user_id) = user_id.filter(|u| !u.trim().is_empty()) {
			config.user_id = user_id.trim().to_string();
		}
		config.debug = debug.is_some_and(|d| matches!(d.as_str(), "1" | "true" | "yes"));
		config
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn query_overrides_user_and_debug() {
		let config = AppConfig::from_query(Some(" 42 ".into()), Some("true".into()));
		assert_eq!(config.user_id, "42");
		assert!(config.debug);
	}

	#[test]
	fn blank_user_falls_back_to_default() {
		let config = AppConfig::from_query(Some("   ".into()), Some("0".into()));
		assert_eq!(config.user_id, DEFAULT_USER_ID);
		assert!(!config.debug);
	}

	#[test]
	fn default_bands_are_ordered() {
		let bands = LayoutConfig::default().bands;
		assert!(bands.today.1 < bands.next_week.0);
		assert!(bands.next_week.1 < bands.later.0);
	}
}
