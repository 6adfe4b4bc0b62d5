use leptos::prelude::*;

use super::encoding::topic_color;
use super::ingest::WorkingSet;

/// Topics listed before the overflow counter takes over.
pub const LEGEND_TOPIC_LIMIT: usize = 5;

/// What each visual channel means.
pub const ENCODINGS: [(&str, &str); 4] = [
	("Distance", "sooner events sit closer to the center"),
	("Size", "larger means more relevant to you"),
	("Color", "topic; deeper color means more friends are interested"),
	("Thick outline", "event has a poster"),
];

/// First `limit` distinct topics of the working set and how many were left out.
pub fn legend_topics(set: &WorkingSet, limit: usize) -> (Vec<String>, usize) {
	let mut topics = set.topics();
	let overflow = topics.len().saturating_sub(limit);
	topics.truncate(limit);
	(topics, overflow)
}

fn overflow_text(overflow: usize) -> Option<String> {
	(overflow > 0).then(|| format!("+{overflow} more"))
}

/// HTML panel explaining the encodings, drawn over the canvas.
#[component]
pub fn Legend(#[prop(into)] working_set: Signal<WorkingSet>) -> impl IntoView {
	let topics = Memo::new(move |_| legend_topics(&working_set.get(), LEGEND_TOPIC_LIMIT));

	view! {
		<aside class="ego-graph-legend">
			<h2>"How to read this"</h2>
			<dl>
				{ENCODINGS
					.iter()
					.map(|(channel, meaning)| {
						view! {
							<dt>{*channel}</dt>
							<dd>{*meaning}</dd>
						}
					})
					.collect_view()}
			</dl>
			<Show when=move || !topics.get().0.is_empty()>
				<h3>"Topics"</h3>
				<ul class="legend-topics">
					{move || {
						topics
							.get()
							.0
							.into_iter()
							.map(|topic| {
								let swatch = format!(
									"background-color: {};",
									topic_color(Some(topic.as_str())),
								);
								view! {
									<li>
										<span class="legend-swatch" style=swatch></span>
										{topic}
									</li>
								}
							})
							.collect_view()
					}}
					{move || {
						overflow_text(topics.get().1)
							.map(|text| view! { <li class="legend-more">{text}</li> })
					}}
				</ul>
			</Show>
		</aside>
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;
	use crate::components::ego_graph::types::{GraphNode, NodeType};

	fn with_topics(topics: &[Option<&str>]) -> WorkingSet {
		let nodes = topics
			.iter()
			.enumerate()
			.map(|(i, topic)| GraphNode {
				id: format!("event:{i}"),
				node_type: NodeType::Event,
				label: format!("Event {i}"),
				ring: 0,
				topic: topic.map(str::to_string),
				starts_at: None,
				score: Some(1.0),
				social_count: None,
				poster_url: None,
				event_id: Some(i.to_string()),
			})
			.collect();
		WorkingSet {
			nodes,
			explanations: HashMap::new(),
		}
	}

	#[test]
	fn lists_at_most_five_topics_with_overflow() {
		let set = with_topics(&[
			Some("Music"),
			Some("Art"),
			Some("Music"),
			Some("Food"),
			None,
			Some("Tech"),
			Some("Sports"),
			Some("Film"),
			Some("Books"),
		]);
		let (topics, overflow) = legend_topics(&set, LEGEND_TOPIC_LIMIT);
		assert_eq!(topics, ["Music", "Art", "Food", "Tech", "Sports"]);
		assert_eq!(overflow, 2);
		assert_eq!(overflow_text(overflow).as_deref(), Some("+2 more"));
	}

	#[test]
	fn no_overflow_counter_when_everything_fits() {
		let set = with_topics(&[Some("Music"), Some(" "), Some("Art")]);
		let (topics, overflow) = legend_topics(&set, LEGEND_TOPIC_LIMIT);
		assert_eq!(topics, ["Music", "Art"]);
		assert_eq!(overflow, 0);
		assert_eq!(overflow_text(overflow), None);
	}
}
