// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph atlas cache key.

#[cfg(feature = "libm")]
#[allow(unused_imports, reason = "unused when std provides the inherent float methods")]
use core_maths::CoreFloat;

/// Number of subpixel quantization buckets (1-255).
/// More buckets = better quality but more cache entries.
pub const SUBPIXEL_BUCKETS: u8 = 4;

/// Identifies one glyph image within a single atlas.
///
/// The font and the cache format are properties of the atlas itself, so only the glyph and its
/// horizontal sub-pixel bucket distinguish entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphKey {
    /// Glyph index within the font.
    pub glyph_id: u32,
    /// Horizontal subpixel position (0 to `SUBPIXEL_BUCKETS - 1`).
    pub subpixel: u8,
}

impl GlyphKey {
    /// Creates a key for a glyph rendered at the given sub-pixel bucket.
    #[inline]
    pub const fn new(glyph_id: u32, subpixel: u8) -> Self {
        Self { glyph_id, subpixel }
    }
}

/// Quantize a fractional position to [`SUBPIXEL_BUCKETS`] buckets.
///
/// Only the fractional part of `x` is considered; negative positions wrap.
#[expect(
    clippy::cast_possible_truncation,
    reason = "result is clamped to SUBPIXEL_BUCKETS-1 which fits in u8"
)]
#[inline]
pub fn quantize_subpixel(x: f32) -> u8 {
    let normalized = x.fract();
    let normalized = if normalized < 0.0 {
        normalized + 1.0
    } else {
        normalized
    };
    ((normalized * SUBPIXEL_BUCKETS as f32).round() as u8).min(SUBPIXEL_BUCKETS - 1)
}

/// Returns the subpixel offset value for a quantized bucket.
#[inline]
pub fn subpixel_offset(bucket: u8) -> f32 {
    f32::from(bucket) / f32::from(SUBPIXEL_BUCKETS)
}
