//! Recommendation graph fetch and the staleness guard around it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use log::{debug, error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::components::ego_graph::{GraphResponse, parse_graph_response};
use crate::config::AppConfig;
use crate::error::GraphError;

const RECOMMENDATIONS_PATH: &str = "/api/graph/recommendations";

/// Endpoint for `config`'s user; `debug` is forwarded only when set.
pub fn recommendations_url(config: &AppConfig) -> String {
	let mut url = format!(
		"{}{RECOMMENDATIONS_PATH}?user_id={}",
		config.api_base,
		urlencoding::encode(&config.user_id)
	);
	if config.debug {
		url.push_str("&debug=true");
	}
	url
}

/// GET the ego graph for the configured user.
pub async fn fetch_graph(config: &AppConfig) -> Result<GraphResponse, GraphError> {
	let url = recommendations_url(config);
	info!("fetching graph from {url}");

	let opts = RequestInit::new();
	opts.set_method("GET");
	opts.set_mode(RequestMode::Cors);
	let request = Request::new_with_str_and_init(&url, &opts).map_err(GraphError::network)?;
	request
		.headers()
		.set("Accept", "application/json")
		.map_err(GraphError::network)?;

	let window = web_sys::window().ok_or(GraphError::NoWindow)?;
	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(GraphError::network)?
		.dyn_into()
		.map_err(GraphError::network)?;
	if !response.ok() {
		return Err(GraphError::Status {
			status: response.status(),
			status_text: response.status_text(),
		});
	}

	let text = JsFuture::from(response.text().map_err(GraphError::body)?)
		.await
		.map_err(GraphError::body)?
		.as_string()
		.ok_or_else(|| GraphError::Body("response body is not text".into()))?;
	let graph = parse_graph_response(&text)?;
	info!("fetched {} nodes, {} edges", graph.nodes.len(), graph.edges.len());
	Ok(graph)
}

/// Fold a finished fetch into the displayed graph.
///
/// Success replaces the graph; failure leaves it untouched and returns the
/// message for the banner.
pub fn apply_fetch_result(
	current: &mut Option<GraphResponse>,
	result: Result<GraphResponse, GraphError>,
) -> Option<String> {
	match result {
		Ok(graph) => {
			*current = Some(graph);
			None
		}
		Err(e) => {
			error!("loading recommendations failed: {e}");
			Some(e.to_string())
		}
	}
}

/// Decides whether a finished fetch may still be applied.
///
/// A result is dropped once the owner has unmounted or a newer request has
/// started.
#[derive(Clone, Debug)]
pub struct FetchGuard {
	mounted: Arc<AtomicBool>,
	generation: Arc<AtomicU64>,
}

/// Handle for one request issued through a [`FetchGuard`].
#[derive(Clone, Debug)]
pub struct FetchTicket {
	guard: FetchGuard,
	generation: u64,
}

impl FetchGuard {
	pub fn new() -> Self {
		Self {
			mounted: Arc::new(AtomicBool::new(true)),
			generation: Arc::new(AtomicU64::new(0)),
		}
	}

	/// Start a request, superseding every earlier ticket.
	pub fn begin(&self) -> FetchTicket {
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
		FetchTicket {
			guard: self.clone(),
			generation,
		}
	}

	pub fn unmount(&self) {
		self.mounted.store(false, Ordering::SeqCst);
	}

	pub fn is_mounted(&self) -> bool {
		self.mounted.load(Ordering::SeqCst)
	}
}

impl Default for FetchGuard {
	fn default() -> Self {
		Self::new()
	}
}

impl FetchTicket {
	pub fn is_current(&self) -> bool {
		let current = self.guard.is_mounted()
			&& self.guard.generation.load(Ordering::SeqCst) == self.generation;
		if !current {
			debug!("discarding stale fetch #{}", self.generation);
		}
		current
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(user_id: &str, debug: bool) -> AppConfig {
		AppConfig {
			api_base: "https://api.example.org".into(),
			user_id: user_id.into(),
			debug,
		}
	}

	#[test]
	fn url_carries_user_and_debug() {
		assert_eq!(
			recommendations_url(&config("7", false)),
			"https://api.example.org/api/graph/recommendations?user_id=7"
		);
		assert_eq!(
			recommendations_url(&config("7", true)),
			"https://api.example.org/api/graph/recommendations?user_id=7&debug=true"
		);
	}

	#[test]
	fn url_escapes_user_id() {
		let url = recommendations_url(&config("a b&c", false));
		assert!(url.ends_with("user_id=a%20b%26c"));
	}

	#[test]
	fn same_origin_url_is_relative() {
		let mut cfg = config("1", false);
		cfg.api_base = String::new();
		assert_eq!(recommendations_url(&cfg), "/api/graph/recommendations?user_id=1");
	}

	fn graph_with(id: &str) -> GraphResponse {
		parse_graph_response(&format!(r#"{{"nodes": [{{"id": "{id}", "type": "event"}}]}}"#))
			.unwrap()
	}

	#[test]
	fn failed_fetch_keeps_previous_graph() {
		let mut current = None;
		assert_eq!(apply_fetch_result(&mut current, Ok(graph_with("event:1"))), None);

		let failure = GraphError::Status {
			status: 503,
			status_text: "Service Unavailable".into(),
		};
		let message = apply_fetch_result(&mut current, Err(failure));
		assert_eq!(message.as_deref(), Some("server returned 503 Service Unavailable"));
		assert_eq!(current, Some(graph_with("event:1")));

		assert_eq!(apply_fetch_result(&mut current, Ok(graph_with("event:2"))), None);
		assert_eq!(current, Some(graph_with("event:2")));
	}

	#[test]
	fn failure_before_any_graph_leaves_nothing_shown() {
		let mut current = None;
		let message = apply_fetch_result(&mut current, Err(GraphError::NoWindow));
		assert!(message.is_some());
		assert_eq!(current, None);
	}

	#[test]
	fn newer_request_supersedes_older() {
		let guard = FetchGuard::new();
		let first = guard.begin();
		assert!(first.is_current());
		let second = guard.begin();
		assert!(!first.is_current());
		assert!(second.is_current());
	}

	#[test]
	fn unmount_discards_in_flight_results() {
		let guard = FetchGuard::new();
		let ticket = guard.begin();
		guard.unmount();
		assert!(!ticket.is_current());
		assert!(!guard.begin().is_current());
	}
}
