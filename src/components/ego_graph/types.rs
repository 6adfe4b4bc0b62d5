use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Namespace the recommendation service puts in front of event ids.
pub const EVENT_ID_PREFIX: &str = "event:";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
	Event,
	Person,
	Topic,
	Venue,
	Cohort,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	#[serde(rename = "type")]
	pub node_type: NodeType,
	#[serde(default, deserialize_with = "null_as_default")]
	pub label: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub ring: i32,
	#[serde(default)]
	pub topic: Option<String>,
	#[serde(default)]
	pub starts_at: Option<String>,
	/// `None` only while decoding; filled from the payload's `scores` map or 0.
	#[serde(default)]
	pub score: Option<f64>,
	#[serde(default)]
	pub social_count: Option<u32>,
	#[serde(default)]
	pub poster_url: Option<String>,
	/// Derived during enrichment, never trusted from the wire.
	#[serde(default, skip_deserializing)]
	pub event_id: Option<String>,
}

impl GraphNode {
	pub fn is_event(&self) -> bool {
		self.node_type == NodeType::Event
	}

	pub fn score(&self) -> f64 {
		self.score.unwrap_or(0.0)
	}

	pub fn has_poster(&self) -> bool {
		self.poster_url
			.as_deref()
			.is_some_and(|url| !url.trim().is_empty())
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	#[serde(rename = "type", default)]
	pub edge_type: String,
	#[serde(default)]
	pub weight: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
	#[serde(default)]
	pub reasons: Vec<String>,
}

/// Full recommendation payload after per-node validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
	pub scores: HashMap<String, f64>,
	pub explanations: HashMap<String, Explanation>,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn null_label_and_ring_fall_back_to_defaults() {
		let node: GraphNode = serde_json::from_value(json!({
			"id": "event:1",
			"type": "event",
			"label": null,
			"ring": null,
			"topic": null,
			"score": null
		}))
		.unwrap();
		assert_eq!(node.label, "");
		assert_eq!(node.ring, 0);
		assert_eq!(node.topic, None);
	}

	#[test]
	fn missing_optional_fields_are_accepted() {
		let node: GraphNode =
			serde_json::from_value(json!({ "id": "user:3", "type": "person", "ring": -1 })).unwrap();
		assert_eq!(node.node_type, NodeType::Person);
		assert_eq!(node.ring, -1);
		assert_eq!(node.score, None);
	}
}
