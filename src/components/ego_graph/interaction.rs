//! Hit-testing, click resolution and tooltip text.

use std::rc::Rc;

use super::layout::NodeLayout;

pub const CALL_TO_ACTION: &str = "Click to view event details";

/// Smallest clickable radius in graph units, so tiny nodes stay clickable.
pub const MIN_HIT_RADIUS: f64 = 8.0;

/// Navigation hook handed in by the page; receives the backend event id.
pub type NavigateCallback = Rc<dyn Fn(&str)>;

/// Conventional detail route for an event. The id is percent-encoded so it
/// stays a single path segment.
pub fn event_path(event_id: &str) -> String {
	format!("/events/{}", urlencoding::encode(event_id))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickAction {
	/// Hand the event id to the navigation callback.
	Navigate(String),
	/// No callback available: change `location.href` to this path.
	Relocate(String),
	/// Nothing to do.
	Ignore,
}

pub fn click_action(node: Option<&NodeLayout>, has_navigator: bool) -> ClickAction {
	let Some(event_id) = node
		.filter(|node| node.is_event())
		.and_then(|node| node.event_id.as_deref())
	else {
		return ClickAction::Ignore;
	};
	if has_navigator {
		ClickAction::Navigate(event_id.to_string())
	} else {
		ClickAction::Relocate(event_path(event_id))
	}
}

/// Closest event node whose disk contains `point`.
pub fn hit_test<'a, I>(nodes: I, point: (f64, f64)) -> Option<&'a NodeLayout>
where
	I: IntoIterator<Item = (&'a NodeLayout, (f64, f64))>,
{
	nodes
		.into_iter()
		.filter(|(node, _)| node.is_event())
		.filter_map(|(node, (x, y))| {
			let distance = ((x - point.0).powi(2) + (y - point.1).powi(2)).sqrt();
			(distance <= node.style.size.max(MIN_HIT_RADIUS)).then_some((node, distance))
		})
		.min_by(|a, b| a.1.total_cmp(&b.1))
		.map(|(node, _)| node)
}

/// Tooltip lines: label, then the call to action and reasons for events.
pub fn tooltip_lines(node: &NodeLayout, reasons: &[String]) -> Vec<String> {
	let label = if node.label.trim().is_empty() {
		node.id.clone()
	} else {
		node.label.clone()
	};
	if !node.is_event() {
		return vec![label];
	}
	let mut lines = vec![label, CALL_TO_ACTION.to_string()];
	lines.extend(reasons.iter().map(|reason| format!("• {reason}")));
	lines
}
