//! Visual encodings: score → size, topic → hue, social proof → saturation,
//! poster → outline.

use std::fmt;

use super::angle::fnv1a;
use super::types::GraphNode;
use crate::theme::ThemeKey;

/// Connections needed for a fully saturated node.
pub const SOCIAL_SATURATION_DENOMINATOR: f64 = 5.0;
pub const MIN_SATURATION: f64 = 0.4;
pub const MAX_SATURATION: f64 = 1.0;

pub const POSTER_OUTLINE_WIDTH: f64 = 3.0;
pub const DEFAULT_OUTLINE_WIDTH: f64 = 1.0;

const SIZE_FLOOR: f64 = 0.4;
const DEGENERATE_RATIO: f64 = 0.5;

/// Okabe-Ito hues plus Tol's wine; all distinguishable under common
/// color-vision deficiencies.
pub const PALETTE: [Rgb; 8] = [
	Rgb::new(0xe6, 0x9f, 0x00),
	Rgb::new(0x56, 0xb4, 0xe9),
	Rgb::new(0x00, 0x9e, 0x73),
	Rgb::new(0xf0, 0xe4, 0x42),
	Rgb::new(0x00, 0x72, 0xb2),
	Rgb::new(0xd5, 0x5e, 0x00),
	Rgb::new(0xcc, 0x79, 0xa7),
	Rgb::new(0x88, 0x22, 0x55),
];

/// Reserved for uncategorized events; never produced by the palette hash.
pub const FALLBACK_COLOR: Rgb = Rgb::new(0xc9, 0xc5, 0xe8);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	pub fn to_hsl(self) -> Hsl {
		let (r, g, b) = (
			f64::from(self.r) / 255.0,
			f64::from(self.g) / 255.0,
			f64::from(self.b) / 255.0,
		);
		let max = r.max(g).max(b);
		let min = r.min(g).min(b);
		let l = (max + min) / 2.0;
		let delta = max - min;
		if delta == 0.0 {
			return Hsl { h: 0.0, s: 0.0, l };
		}
		let s = delta / (1.0 - (2.0 * l - 1.0).abs());
		let h = if max == r {
			60.0 * (((g - b) / delta).rem_euclid(6.0))
		} else if max == g {
			60.0 * ((b - r) / delta + 2.0)
		} else {
			60.0 * ((r - g) / delta + 4.0)
		};
		Hsl { h, s, l }
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

/// Hue in degrees, saturation and lightness in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
	pub h: f64,
	pub s: f64,
	pub l: f64,
}

impl Hsl {
	pub fn to_rgb(self) -> Rgb {
		let s = self.s.clamp(0.0, 1.0);
		let l = self.l.clamp(0.0, 1.0);
		let h = self.h.rem_euclid(360.0);
		let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
		let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
		let m = l - c / 2.0;
		let (r, g, b) = match h {
			h if h < 60.0 => (c, x, 0.0),
			h if h < 120.0 => (x, c, 0.0),
			h if h < 180.0 => (0.0, c, x),
			h if h < 240.0 => (0.0, x, c),
			h if h < 300.0 => (x, 0.0, c),
			_ => (c, 0.0, x),
		};
		let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
		Rgb::new(to_byte(r), to_byte(g), to_byte(b))
	}
}

/// Min-max score scale over the working set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeScale {
	pub min: f64,
	pub max: f64,
	pub base: f64,
}

impl SizeScale {
	pub fn from_scores<I: IntoIterator<Item = f64>>(scores: I, base: f64) -> Self {
		let (min, max) = scores
			.into_iter()
			.filter(|s| s.is_finite())
			.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
				(lo.min(s), hi.max(s))
			});
		if min > max {
			return Self { min: 0.0, max: 0.0, base };
		}
		Self { min, max, base }
	}

	pub fn is_degenerate(&self) -> bool {
		!(self.max - self.min > f64::EPSILON)
	}

	pub fn normalized(&self, score: f64) -> f64 {
		if self.is_degenerate() || !score.is_finite() {
			return DEGENERATE_RATIO;
		}
		((score - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
	}

	pub fn size(&self, score: f64) -> f64 {
		self.base * (SIZE_FLOOR + self.normalized(score))
	}
}

/// `true` for topics that belong in the uncategorized bucket.
pub fn is_uncategorized(topic: Option<&str>) -> bool {
	match topic.map(str::trim) {
		None | Some("") => true,
		Some(t) => t.eq_ignore_ascii_case("other"),
	}
}

/// Base hue for a topic, before saturation is applied.
pub fn topic_color(topic: Option<&str>) -> Rgb {
	if is_uncategorized(topic) {
		return FALLBACK_COLOR;
	}
	let topic = topic.map(str::trim).unwrap_or_default();
	PALETTE[fnv1a(topic) as usize % PALETTE.len()]
}

pub fn social_saturation(social_count: Option<u32>) -> f64 {
	let count = f64::from(social_count.unwrap_or(0));
	(count / SOCIAL_SATURATION_DENOMINATOR).clamp(MIN_SATURATION, MAX_SATURATION)
}

/// Replace the saturation of `base`, keeping hue and lightness.
pub fn with_saturation(base: Rgb, saturation: f64) -> Rgb {
	let hsl = base.to_hsl();
	Hsl { s: saturation, ..hsl }.to_rgb()
}

pub fn node_fill(topic: Option<&str>, social_count: Option<u32>) -> Rgb {
	with_saturation(topic_color(topic), social_saturation(social_count))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outline {
	pub key: ThemeKey,
	pub width: f64,
}

pub fn outline_for(node: &GraphNode) -> Outline {
	if node.has_poster() {
		Outline {
			key: ThemeKey::PosterOutline,
			width: POSTER_OUTLINE_WIDTH,
		}
	} else {
		Outline {
			key: ThemeKey::NodeOutline,
			width: DEFAULT_OUTLINE_WIDTH,
		}
	}
}

/// Everything the renderer needs to paint one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	pub size: f64,
	pub fill: Rgb,
	pub outline: Outline,
}

pub fn style_for(node: &GraphNode, scale: &SizeScale) -> NodeStyle {
	NodeStyle {
		size: scale.size(node.score()),
		fill: node_fill(node.topic.as_deref(), node.social_count),
		outline: outline_for(node),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::ego_graph::types::NodeType;

	fn event(id: &str, score: f64) -> GraphNode {
		GraphNode {
			id: id.into(),
			node_type: NodeType::Event,
			label: id.into(),
			ring: 0,
			topic: None,
			starts_at: None,
			score: Some(score),
			social_count: None,
			poster_url: None,
			event_id: None,
		}
	}

	#[test]
	fn equal_scores_give_equal_sizes() {
		let scale = SizeScale::from_scores([5.0, 5.0, 5.0], 14.0);
		assert!(scale.is_degenerate());
		let sizes: Vec<f64> = [5.0, 5.0, 5.0].iter().map(|&s| scale.size(s)).collect();
		assert!(sizes.iter().all(|&s| s == sizes[0]));
		assert!((sizes[0] - 14.0 * 0.9).abs() < 1e-12);
	}

	#[test]
	fn single_or_empty_set_is_degenerate() {
		assert!(SizeScale::from_scores([0.3], 10.0).is_degenerate());
		let empty = SizeScale::from_scores(std::iter::empty(), 10.0);
		assert!(empty.is_degenerate());
		assert!(empty.size(1.0).is_finite());
	}

	#[test]
	fn higher_score_is_larger() {
		let scale = SizeScale::from_scores([0.1, 0.5, 0.9], 10.0);
		assert!(scale.size(0.9) > scale.size(0.5));
		assert!(scale.size(0.5) > scale.size(0.1));
		assert!((scale.size(0.1) - 4.0).abs() < 1e-12);
		assert!((scale.size(0.9) - 14.0).abs() < 1e-12);
	}

	#[test]
	fn topic_color_is_stable_across_payloads() {
		let first = topic_color(Some("Music"));
		let second = topic_color(Some(String::from("Music").as_str()));
		assert_eq!(first, second);
		assert_eq!(topic_color(Some("  Music ")), first);
		assert!(PALETTE.contains(&first));
	}

	#[test]
	fn uncategorized_topics_use_fallback() {
		for topic in [None, Some(""), Some("   "), Some("other"), Some("OTHER"), Some(" Other ")] {
			assert_eq!(topic_color(topic), FALLBACK_COLOR, "{topic:?}");
		}
		assert!(!PALETTE.contains(&FALLBACK_COLOR));
	}

	#[test]
	fn topics_are_case_sensitive() {
		assert!(!is_uncategorized(Some("music")));
		assert!(PALETTE.contains(&topic_color(Some("music"))));
	}

	#[test]
	fn saturation_grows_with_social_count() {
		assert_eq!(social_saturation(None), MIN_SATURATION);
		assert_eq!(social_saturation(Some(0)), MIN_SATURATION);
		assert_eq!(social_saturation(Some(3)), 0.6);
		assert_eq!(social_saturation(Some(5)), MAX_SATURATION);
		assert_eq!(social_saturation(Some(50)), MAX_SATURATION);
	}

	#[test]
	fn saturation_swap_preserves_lightness() {
		for base in PALETTE {
			let before = base.to_hsl();
			let after = with_saturation(base, 0.4).to_hsl();
			assert!((before.l - after.l).abs() < 0.01, "{base}");
			assert!((after.s - 0.4).abs() < 0.02, "{base}");
		}
	}

	#[test]
	fn more_friends_means_more_saturated() {
		let quiet = node_fill(Some("Music"), Some(0)).to_hsl();
		let busy = node_fill(Some("Music"), Some(5)).to_hsl();
		assert!(busy.s > quiet.s);
	}

	#[test]
	fn fill_formats_as_css_hex() {
		assert_eq!(Rgb::new(0x12, 0xab, 0x05).to_string(), "#12ab05");
		assert_eq!(FALLBACK_COLOR.to_string(), "#c9c5e8");
	}

	#[test]
	fn poster_gets_thicker_outline() {
		let mut node = event("event:1", 1.0);
		assert_eq!(outline_for(&node).key, ThemeKey::NodeOutline);
		node.poster_url = Some("   ".into());
		assert_eq!(outline_for(&node).width, DEFAULT_OUTLINE_WIDTH);
		node.poster_url = Some("/uploads/p.png".into());
		let outline = outline_for(&node);
		assert_eq!(outline.key, ThemeKey::PosterOutline);
		assert!(outline.width > DEFAULT_OUTLINE_WIDTH);
	}
}
