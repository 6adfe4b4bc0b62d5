use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_query_map};
use log::error;
use wasm_bindgen_futures::spawn_local;

use crate::api::{FetchGuard, apply_fetch_result, fetch_graph};
use crate::components::ego_graph::{
	EgoGraphCanvas, GraphResponse, Legend, NavigateCallback, WorkingSet, event_path,
};
use crate::config::{AppConfig, LayoutConfig};
use crate::theme::{
	CssThemeLookup, ThemeLookup, ThemeMode, ThemePalette, apply_to_document, use_theme_store,
};

/// Ego graph of the user's recommended events
#[component]
pub fn Home() -> impl IntoView {
	let query = use_query_map();
	let app_config = Memo::new(move |_| {
		let query = query.read();
		AppConfig::from_query(query.get("user_id"), query.get("debug"))
	});

	let graph: RwSignal<Option<GraphResponse>> = RwSignal::new(None);
	let fetch_error: RwSignal<Option<String>> = RwSignal::new(None);
	let guard = FetchGuard::new();
	{
		let guard = guard.clone();
		on_cleanup(move || guard.unmount());
	}

	// A failed fetch keeps whatever graph is already on screen.
	let load = move |config: AppConfig| {
		let ticket = guard.begin();
		spawn_local(async move {
			let result = fetch_graph(&config).await;
			if !ticket.is_current() {
				return;
			}
			let message = graph.try_update(|current| apply_fetch_result(current, result));
			fetch_error.set(message.flatten());
		});
	};
	let retry = load.clone();
	Effect::new(move |_| load(app_config.get()));

	let top_n = LayoutConfig::default().top_n;
	let working_set = Memo::new(move |_| {
		graph.with(|graph| {
			graph
				.as_ref()
				.map(|graph| WorkingSet::from_response(graph, top_n))
				.unwrap_or_default()
		})
	});

	let theme = use_theme_store();
	let palette: RwSignal<Option<ThemePalette>> = RwSignal::new(None);
	Effect::new(move |_| {
		apply_to_document(theme.subscribe());
		match CssThemeLookup.resolve() {
			Ok(resolved) => palette.set(Some(resolved)),
			Err(e) => error!("{e}"),
		}
	});

	let navigate = use_navigate();
	let on_navigate: NavigateCallback =
		Rc::new(move |event_id: &str| navigate(&event_path(event_id), Default::default()));

	view! {
		<div class="fullscreen-graph">
			<EgoGraphCanvas
				working_set=working_set
				palette=palette
				on_navigate=on_navigate
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Your events"</h1>
				<p class="subtitle">
					"Click an event for details. Scroll to zoom. Drag the background to pan."
				</p>
				<button class="theme-toggle" on:click=move |_| theme.toggle()>
					{move || match theme.subscribe() {
						ThemeMode::Light => "Dark mode",
						ThemeMode::Dark => "Light mode",
					}}
				</button>
			</div>
			<Show when=move || fetch_error.get().is_some()>
				<div class="error-banner" role="alert">
					<span>
						"Could not load recommendations: "
						{move || fetch_error.get().unwrap_or_default()}
					</span>
					<button on:click={
						let retry = retry.clone();
						move |_| retry(app_config.get_untracked())
					}>"Retry"</button>
				</div>
			</Show>
			<Show when=move || {
				graph.with(|graph| graph.is_some()) && working_set.with(WorkingSet::is_empty)
			}>
				<p class="empty-state">"No upcoming events to recommend yet."</p>
			</Show>
			<Legend working_set=working_set />
		</div>
	}
}
