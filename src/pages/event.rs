use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

/// Landing page for a clicked event. Event details are served by the
/// backend; this page only confirms which event was selected.
#[component]
pub fn EventDetail() -> impl IntoView {
	let params = use_params_map();
	let event_id = move || params.read().get("id").unwrap_or_default();

	view! {
		<main class="page">
			<h1>"Event " {event_id}</h1>
			<p>"Details for this event open in the events app."</p>
			<A href="/">"Back to your events"</A>
		</main>
	}
}
