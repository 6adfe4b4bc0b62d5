//! Payload decoding, enrichment and ranking into the working set.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use super::types::{EVENT_ID_PREFIX, Explanation, GraphEdge, GraphNode, GraphResponse};
use crate::error::GraphError;

/// Nodes and edges are kept as raw values so one bad entry cannot sink the
/// whole payload.
#[derive(Deserialize)]
struct RawGraphResponse {
	#[serde(default)]
	nodes: Vec<Value>,
	#[serde(default)]
	edges: Vec<Value>,
	#[serde(default)]
	scores: HashMap<String, f64>,
	#[serde(default)]
	explanations: HashMap<String, Explanation>,
}

/// Decode a recommendation payload.
///
/// Malformed nodes (missing `id` or `type`, unknown `type`, wrong field
/// types) and duplicate ids are dropped with a warning. Event ids are
/// derived and a missing `score` is filled from the `scores` map.
pub fn parse_graph_response(body: &str) -> Result<GraphResponse, GraphError> {
	let raw: RawGraphResponse = serde_json::from_str(body)?;

	let mut seen = HashSet::new();
	let mut nodes = Vec::with_capacity(raw.nodes.len());
	for (index, value) in raw.nodes.into_iter().enumerate() {
		let mut node = match serde_json::from_value::<GraphNode>(value) {
			Ok(node) => node,
			Err(e) => {
				warn!("skipping malformed node #{index}: {e}");
				continue;
			}
		};
		if node.id.is_empty() {
			warn!("skipping node #{index} with empty id");
			continue;
		}
		if !seen.insert(node.id.clone()) {
			warn!("skipping duplicate node id {}", node.id);
			continue;
		}
		if node.score.is_none() {
			node.score = Some(raw.scores.get(&node.id).copied().unwrap_or(0.0));
		}
		nodes.push(node);
	}

	let edges = raw
		.edges
		.into_iter()
		.filter_map(|value| serde_json::from_value::<GraphEdge>(value).ok())
		.collect();

	Ok(GraphResponse {
		nodes: enrich_nodes(nodes),
		edges,
		scores: raw.scores,
		explanations: raw.explanations,
	})
}

/// `event:123` → `123`; ids without the prefix are used as-is.
pub fn derive_event_id(id: &str) -> Option<String> {
	let stripped = id.strip_prefix(EVENT_ID_PREFIX).unwrap_or(id).trim();
	(!stripped.is_empty()).then(|| stripped.to_string())
}

/// Attach derived event ids and normalize blank poster urls to `None`.
pub fn enrich_nodes(nodes: Vec<GraphNode>) -> Vec<GraphNode> {
	nodes
		.into_iter()
		.map(|mut node| {
			node.event_id = if node.is_event() {
				derive_event_id(&node.id)
			} else {
				None
			};
			node.poster_url = node.poster_url.filter(|url| !url.trim().is_empty());
			node
		})
		.collect()
}

/// Top `n` event nodes by descending score; ties keep payload order.
pub fn rank_events(nodes: &[GraphNode], n: usize) -> Vec<GraphNode> {
	let mut events: Vec<&GraphNode> = nodes.iter().filter(|node| node.is_event()).collect();
	// `sort_by` is stable, so equal scores keep their payload order.
	events.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
	events.into_iter().take(n).cloned().collect()
}

/// The ranked event nodes the layout works on, plus their explanations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkingSet {
	pub nodes: Vec<GraphNode>,
	pub explanations: HashMap<String, Explanation>,
}

impl WorkingSet {
	pub fn from_response(response: &GraphResponse, top_n: usize) -> Self {
		let nodes = rank_events(&response.nodes, top_n);
		let explanations = nodes
			.iter()
			.filter_map(|node| {
				response
					.explanations
					.get(&node.id)
					.map(|explanation| (node.id.clone(), explanation.clone()))
			})
			.collect();
		Self {
			nodes,
			explanations,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Distinct non-empty topics in ranking order.
	pub fn topics(&self) -> Vec<String> {
		let mut seen = HashSet::new();
		self.nodes
			.iter()
			.filter_map(|node| node.topic.as_deref().map(str::trim))
			.filter(|topic| !topic.is_empty())
			.filter(|topic| seen.insert(topic.to_string()))
			.map(str::to_string)
			.collect()
	}

	pub fn reasons(&self, id: &str) -> &[String] {
		self.explanations
			.get(id)
			.map(|explanation| explanation.reasons.as_slice())
			.unwrap_or_default()
	}
}
