use std::f64::consts::TAU;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;
const GOLDEN_RATIO_FRACTION: f64 = 0.618_033_988_7;

/// 32-bit FNV-1a over the UTF-8 bytes of `s`.
pub fn fnv1a(s: &str) -> u32 {
	s.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
		(hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
	})
}

/// Stable angle in `[0, 2π)` for a node id, spread by the golden ratio.
pub fn angle(id: &str) -> f64 {
	let turn = (f64::from(fnv1a(id)) * GOLDEN_RATIO_FRACTION).fract();
	let theta = turn * TAU;
	if theta >= TAU { 0.0 } else { theta }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fnv1a_matches_reference_vectors() {
		assert_eq!(fnv1a(""), 0x811c_9dc5);
		assert_eq!(fnv1a("a"), 0xe40c_292c);
		assert_eq!(fnv1a("foobar"), 0xbf9c_f968);
	}

	#[test]
	fn angle_is_bit_identical_across_calls() {
		for id in ["event:1", "event:42", "user:7", ""] {
			assert_eq!(angle(id).to_bits(), angle(id).to_bits());
		}
	}

	#[test]
	fn angle_stays_in_range() {
		for i in 0..500 {
			let theta = angle(&format!("event:{i}"));
			assert!((0.0..TAU).contains(&theta), "{theta} out of range");
		}
	}

	#[test]
	fn angles_spread_around_the_circle() {
		let mut quadrants = [0usize; 4];
		for i in 0..200 {
			let theta = angle(&format!("event:{i}"));
			quadrants[(theta / (TAU / 4.0)) as usize % 4] += 1;
		}
		assert!(quadrants.iter().all(|&count| count >= 25), "{quadrants:?}");
	}
}
