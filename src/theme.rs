//! Theme mode store and the key → color lookup the canvas paints with.
//!
//! Concrete colors live in CSS custom properties (`--eg-*`) under
//! `[data-theme=light]` / `[data-theme=dark]`; this module only knows the
//! key names. The mode itself is a process-wide value exposed through a
//! [`ThemeStore`] in Leptos context so components receive it by injection.

use std::collections::HashMap;

use leptos::prelude::*;
use log::{debug, warn};

use crate::error::{GraphError, js_message};

const STORAGE_KEY: &str = "theme";
const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// Named colors the graph needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemeKey {
	/// Canvas background.
	Background,
	/// Band guide rings.
	Guide,
	/// Band guide labels.
	GuideLabel,
	/// Node labels.
	Label,
	/// Outline of nodes without a poster.
	NodeOutline,
	/// Outline of nodes with a poster.
	PosterOutline,
	/// Tooltip box fill.
	TooltipBackground,
	/// Tooltip text.
	TooltipText,
}

impl ThemeKey {
	/// Every key, in resolution order.
	pub const ALL: [ThemeKey; 8] = [
		ThemeKey::Background,
		ThemeKey::Guide,
		ThemeKey::GuideLabel,
		ThemeKey::Label,
		ThemeKey::NodeOutline,
		ThemeKey::PosterOutline,
		ThemeKey::TooltipBackground,
		ThemeKey::TooltipText,
	];

	/// Stable key name.
	pub fn name(self) -> &'static str {
		match self {
			ThemeKey::Background => "graph-background",
			ThemeKey::Guide => "graph-guide",
			ThemeKey::GuideLabel => "graph-guide-label",
			ThemeKey::Label => "graph-label",
			ThemeKey::NodeOutline => "node-outline",
			ThemeKey::PosterOutline => "node-outline-poster",
			ThemeKey::TooltipBackground => "tooltip-background",
			ThemeKey::TooltipText => "tooltip-text",
		}
	}

	/// CSS custom property holding the color.
	pub fn css_var(self) -> String {
		format!("--eg-{}", self.name())
	}
}

/// A fully resolved set of colors, one per [`ThemeKey`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemePalette {
	colors: HashMap<ThemeKey, String>,
}

impl ThemePalette {
	/// Build a palette, failing if any of `ThemeKey::ALL` is missing or blank.
	pub fn from_pairs<I, S>(pairs: I) -> Result<Self, GraphError>
	where
		I: IntoIterator<Item = (ThemeKey, S)>,
		S: Into<String>,
	{
		let colors: HashMap<ThemeKey, String> = pairs
			.into_iter()
			.map(|(key, color)| (key, color.into().trim().to_string()))
			.filter(|(_, color)| !color.is_empty())
			.collect();
		if let Some(missing) = ThemeKey::ALL.iter().find(|key| !colors.contains_key(*key)) {
			return Err(GraphError::Theme(format!("no color for {}", missing.css_var())));
		}
		Ok(Self { colors })
	}

	/// Color for `key`.
	pub fn get(&self, key: ThemeKey) -> &str {
		self.colors.get(&key).map(String::as_str).unwrap_or("currentColor")
	}
}

/// Resolves theme keys to color strings.
pub trait ThemeLookup {
	/// Resolve every key or fail; partial palettes are never returned.
	fn resolve(&self) -> Result<ThemePalette, GraphError>;
}

/// Reads `--eg-*` custom properties from the document element.
#[derive(Clone, Copy, Debug, Default)]
pub struct CssThemeLookup;

impl ThemeLookup for CssThemeLookup {
	fn resolve(&self) -> Result<ThemePalette, GraphError> {
		let window = web_sys::window().ok_or(GraphError::NoWindow)?;
		let root = window
			.document()
			.and_then(|d| d.document_element())
			.ok_or(GraphError::NoWindow)?;
		let style = window
			.get_computed_style(&root)
			.map_err(|e| GraphError::Theme(js_message(&e)))?
			.ok_or_else(|| GraphError::Theme("no computed style".into()))?;
		let pairs = ThemeKey::ALL
			.iter()
			.map(|&key| {
				style
					.get_property_value(&key.css_var())
					.map(|value| (key, value))
					.map_err(|e| GraphError::Theme(js_message(&e)))
			})
			.collect::<Result<Vec<_>, _>>()?;
		ThemePalette::from_pairs(pairs)
	}
}

/// Light or dark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ThemeMode {
	/// Light background.
	#[default]
	Light,
	/// Dark background.
	Dark,
}

impl ThemeMode {
	/// Value stored in `data-theme` and local storage.
	pub fn as_str(self) -> &'static str {
		match self {
			ThemeMode::Light => "light",
			ThemeMode::Dark => "dark",
		}
	}

	/// Parse a stored value.
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"light" => Some(ThemeMode::Light),
			"dark" => Some(ThemeMode::Dark),
			_ => None,
		}
	}

	/// The other mode.
	pub fn toggled(self) -> Self {
		match self {
			ThemeMode::Light => ThemeMode::Dark,
			ThemeMode::Dark => ThemeMode::Light,
		}
	}
}

/// Shared theme mode with explicit read / subscribe / write.
#[derive(Clone, Copy, Debug)]
pub struct ThemeStore {
	mode: RwSignal<ThemeMode>,
}

impl ThemeStore {
	/// Start from the persisted preference, then the OS preference.
	pub fn new() -> Self {
		let initial = stored_mode().or_else(system_mode).unwrap_or_default();
		debug!("initial theme mode: {}", initial.as_str());
		Self {
			mode: RwSignal::new(initial),
		}
	}

	/// Current mode without subscribing.
	pub fn read(&self) -> ThemeMode {
		self.mode.get_untracked()
	}

	/// Current mode, re-running the calling effect when it changes.
	pub fn subscribe(&self) -> ThemeMode {
		self.mode.get()
	}

	/// Change and persist the mode.
	pub fn set(&self, mode: ThemeMode) {
		persist_mode(mode);
		self.mode.set(mode);
	}

	/// Flip between light and dark.
	pub fn toggle(&self) {
		self.set(self.read().toggled());
	}
}

impl Default for ThemeStore {
	fn default() -> Self {
		Self::new()
	}
}

/// Put a [`ThemeStore`] into context for the current subtree.
pub fn provide_theme_store() -> ThemeStore {
	let store = ThemeStore::new();
	provide_context(store);
	store
}

/// The [`ThemeStore`] provided by an ancestor.
pub fn use_theme_store() -> ThemeStore {
	expect_context::<ThemeStore>()
}

/// Set `data-theme` on `<html>` so the CSS variables switch.
pub fn apply_to_document(mode: ThemeMode) {
	let root = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.document_element());
	if let Some(root) = root {
		if let Err(e) = root.set_attribute("data-theme", mode.as_str()) {
			warn!("could not set data-theme: {}", js_message(&e));
		}
	}
}

fn stored_mode() -> Option<ThemeMode> {
	let storage = web_sys::window()?.local_storage().ok()??;
	let value = storage.get_item(STORAGE_KEY).ok()??;
	ThemeMode::parse(&value)
}

fn system_mode() -> Option<ThemeMode> {
	let query = web_sys::window()?.match_media(DARK_QUERY).ok()??;
	Some(if query.matches() {
		ThemeMode::Dark
	} else {
		ThemeMode::Light
	})
}

fn persist_mode(mode: ThemeMode) {
	let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
	if let Some(storage) = storage {
		if let Err(e) = storage.set_item(STORAGE_KEY, mode.as_str()) {
			warn!("could not persist theme: {}", js_message(&e));
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn css_vars_are_unique_and_prefixed() {
		let vars: HashSet<String> = ThemeKey::ALL.iter().map(|k| k.css_var()).collect();
		assert_eq!(vars.len(), ThemeKey::ALL.len());
		assert!(vars.iter().all(|v| v.starts_with("--eg-")));
	}

	#[test]
	fn palette_requires_every_key() {
		let partial = ThemePalette::from_pairs([(ThemeKey::Background, "#fff")]);
		assert!(matches!(partial, Err(GraphError::Theme(_))));

		let blank = ThemeKey::ALL.iter().map(|&key| {
			let color = if key == ThemeKey::Label { "  " } else { "#000" };
			(key, color)
		});
		assert!(ThemePalette::from_pairs(blank).is_err());
	}

	#[test]
	fn palette_trims_resolved_values() {
		let palette =
			ThemePalette::from_pairs(ThemeKey::ALL.iter().map(|&key| (key, " #123456 "))).unwrap();
		assert_eq!(palette.get(ThemeKey::Guide), "#123456");
	}

	#[test]
	fn theme_mode_parses_and_toggles() {
		assert_eq!(ThemeMode::parse(" Dark "), Some(ThemeMode::Dark));
		assert_eq!(ThemeMode::parse("light"), Some(ThemeMode::Light));
		assert_eq!(ThemeMode::parse("sepia"), None);
		assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
		assert_eq!(ThemeMode::Dark.toggled().as_str(), "light");
	}
}
