// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Sample-level gain with a soft knee ahead of the hard clamp.
//!
//! Clamping alone crackles on transients, so anything past the knee is
//! compressed 4:1 first. Only the overshoot that survives compression is
//! clipped.

/// Magnitude above which the excess is compressed.
pub const SOFT_LIMIT_THRESHOLD: i32 = 28_000;

/// The excess over the threshold is divided by this ratio.
const SOFT_LIMIT_RATIO: i32 = 4;

/// Applies `gain` to a single sample, soft limiting then hard clamping the result.
pub fn shape(sample: i16, gain: f32) -> i16 {
    // f32 holds every i16 exactly, and the cast saturates rather than wrapping.
    let scaled = (f32::from(sample) * gain) as i32;

    let limited = if scaled > SOFT_LIMIT_THRESHOLD {
        SOFT_LIMIT_THRESHOLD + (scaled - SOFT_LIMIT_THRESHOLD) / SOFT_LIMIT_RATIO
    } else if scaled < -SOFT_LIMIT_THRESHOLD {
        -SOFT_LIMIT_THRESHOLD + (scaled + SOFT_LIMIT_THRESHOLD) / SOFT_LIMIT_RATIO
    } else {
        scaled
    };

    limited.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unity_gain_is_transparent_in_linear_region() {
        for sample in -28_000..=28_000i16 {
            assert_eq!(sample, shape(sample, 1.0));
        }
    }

    #[test]
    fn test_output_always_in_range() {
        for gain in [0.0, 0.25, 0.5, 0.99, 1.0] {
            for sample in i16::MIN..=i16::MAX {
                let shaped = i32::from(shape(sample, gain));
                assert!((i32::from(i16::MIN)..=i32::from(i16::MAX)).contains(&shaped));
            }
        }
    }

    #[test]
    fn test_soft_knee_compresses_excess() {
        // 4000 over the knee becomes 1000 over the knee.
        assert_eq!(29_000, shape(32_000, 1.0));
        assert_eq!(-29_000, shape(-32_000, 1.0));
        assert_eq!(-29_192, shape(i16::MIN, 1.0));
        assert_eq!(29_191, shape(i16::MAX, 1.0));
    }

    #[test]
    fn test_gain_scales_before_limiting() {
        assert_eq!(5_000, shape(10_000, 0.5));
        assert_eq!(-5_000, shape(-10_000, 0.5));
        assert_eq!(0, shape(i16::MAX, 0.0));

        // 40000 is 12000 past the knee, which compresses to 3000.
        assert_eq!(31_000, shape(20_000, 2.0));
        assert_eq!(-31_000, shape(-20_000, 2.0));
    }

    #[test]
    fn test_hard_clamp_after_soft_knee() {
        assert_eq!(i16::MAX, shape(30_000, 4.0));
        assert_eq!(i16::MIN, shape(-30_000, 4.0));
        assert_eq!(i16::MAX, shape(i16::MAX, f32::MAX));
    }
}
