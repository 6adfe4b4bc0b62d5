//! Time-to-event → radial distance.
//!
//! Three bands measured from "now": Today `[0, 24h]`, Next 7 days
//! `(24h, 7d]` and Later `(7d, horizon]`. Each band owns a fixed radius
//! interval and positions inside a band are interpolated linearly. Every
//! function here is pure in `(starts_at, now, horizon)`.

use chrono::{DateTime, NaiveDateTime, Utc};

pub const DAY_SECS: f64 = 86_400.0;
pub const WEEK_SECS: f64 = 7.0 * DAY_SECS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeBand {
	Today,
	NextWeek,
	Later,
}

impl TimeBand {
	pub const ALL: [TimeBand; 3] = [TimeBand::Today, TimeBand::NextWeek, TimeBand::Later];

	/// Band of a non-negative delta in seconds. Upper edges are inclusive.
	pub fn classify(dt_secs: f64) -> Self {
		if dt_secs <= DAY_SECS {
			TimeBand::Today
		} else if dt_secs <= WEEK_SECS {
			TimeBand::NextWeek
		} else {
			TimeBand::Later
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			TimeBand::Today => "Today",
			TimeBand::NextWeek => "Next 7 days",
			TimeBand::Later => "Later",
		}
	}
}

/// Radius interval `(inner, outer)` per band, in layout units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandRadii {
	pub today: (f64, f64),
	pub next_week: (f64, f64),
	pub later: (f64, f64),
}

impl Default for BandRadii {
	fn default() -> Self {
		Self {
			today: (130.0, 190.0),
			next_week: (210.0, 290.0),
			later: (310.0, 390.0),
		}
	}
}

impl BandRadii {
	pub fn interval(&self, band: TimeBand) -> (f64, f64) {
		match band {
			TimeBand::Today => self.today,
			TimeBand::NextWeek => self.next_week,
			TimeBand::Later => self.later,
		}
	}

	/// Where the guide ring for `band` is drawn.
	pub fn midpoint(&self, band: TimeBand) -> f64 {
		let (inner, outer) = self.interval(band);
		(inner + outer) / 2.0
	}

	/// Outer edge of the Later band, used for undated events.
	pub fn outer(&self) -> f64 {
		self.later.1
	}
}

/// Parse an ISO-8601 timestamp. Offsets are honored; naive values are UTC.
pub fn parse_starts_at(raw: &str) -> Option<DateTime<Utc>> {
	let raw = raw.trim();
	if raw.is_empty() {
		return None;
	}
	if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
		return Some(dt.with_timezone(&Utc));
	}
	["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
		.iter()
		.find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
		.map(|naive| naive.and_utc())
}

/// Seconds from `now` until the event starts, clamped at 0 for past events.
/// `None` when the timestamp is missing or unparsable.
pub fn seconds_until(starts_at: Option<&str>, now: DateTime<Utc>) -> Option<f64> {
	let start = parse_starts_at(starts_at?)?;
	let millis = (start - now).num_milliseconds();
	Some((millis as f64 / 1000.0).max(0.0))
}

/// `max(24h, farthest future delta)` over a set of start times.
pub fn horizon_for<'a, I>(starts: I, now: DateTime<Utc>) -> f64
where
	I: IntoIterator<Item = Option<&'a str>>,
{
	starts
		.into_iter()
		.filter_map(|s| seconds_until(s, now))
		.fold(DAY_SECS, f64::max)
}

/// Radius for a start time relative to `now`.
pub fn radius(starts_at: Option<&str>, now: DateTime<Utc>, horizon: f64, bands: &BandRadii) -> f64 {
	radius_for_delta(seconds_until(starts_at, now), horizon, bands)
}

/// Radius for an already computed delta; `None` lands on the outer edge.
pub fn radius_for_delta(dt_secs: Option<f64>, horizon: f64, bands: &BandRadii) -> f64 {
	let Some(dt) = dt_secs.filter(|dt| dt.is_finite()) else {
		return bands.outer();
	};
	let dt = dt.max(0.0);
	let band = TimeBand::classify(dt);
	let fraction = match band {
		TimeBand::Today => dt / DAY_SECS,
		TimeBand::NextWeek => (dt - DAY_SECS) / (WEEK_SECS - DAY_SECS),
		TimeBand::Later => {
			let span = horizon - WEEK_SECS;
			if span <= 0.0 { 1.0 } else { (dt - WEEK_SECS) / span }
		}
	};
	let (inner, outer) = bands.interval(band);
	inner + fraction.clamp(0.0, 1.0) * (outer - inner)
}
