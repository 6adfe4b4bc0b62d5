//! Error type shared by the fetch path and the theme lookup.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong while loading or theming the graph.
///
/// None of these are fatal: callers log them and keep showing the last
/// successful state.
#[derive(Debug, Error)]
pub enum GraphError {
	/// No `window` object (not running in a browser).
	#[error("browser window is not available")]
	NoWindow,
	/// The request could not be built or sent.
	#[error("network request failed: {0}")]
	Network(String),
	/// The server answered with a non-success status.
	#[error("server returned {status} {status_text}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// HTTP reason phrase.
		status_text: String,
	},
	/// The response body could not be read as text.
	#[error("could not read response body: {0}")]
	Body(String),
	/// The body was not a valid graph payload.
	#[error("invalid graph payload: {0}")]
	Parse(#[from] serde_json::Error),
	/// Theme colors could not be resolved.
	#[error("theme lookup failed: {0}")]
	Theme(String),
}

impl GraphError {
	/// Wrap a rejected JS promise or thrown value as a network failure.
	pub fn network(value: JsValue) -> Self {
		Self::Network(js_message(&value))
	}

	/// Wrap a JS failure that happened while reading the body.
	pub fn body(value: JsValue) -> Self {
		Self::Body(js_message(&value))
	}
}

/// Best-effort readable text for a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_error_mentions_code() {
		let err = GraphError::Status {
			status: 404,
			status_text: "Not Found".into(),
		};
		assert_eq!(err.to_string(), "server returned 404 Not Found");
	}

	#[test]
	fn parse_error_converts_from_serde() {
		let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
		let err: GraphError = serde_err.into();
		assert!(matches!(err, GraphError::Parse(_)));
		assert!(err.to_string().starts_with("invalid graph payload"));
	}
}
