// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions shared across tests.

use glyph_mask::gpu::{GpuCommand, RecordingContext};
use glyph_mask::kurbo::Point;
use glyph_mask::{CacheFormat, FixedMetricsEngine, Font, FontId, Glyph, GlyphRun};

/// Ascent of the test fonts.
pub(crate) const ASCENT: f32 = 10.0;
/// Glyph image width of the test fonts.
pub(crate) const GLYPH_WIDTH: u16 = 8;
/// Glyph image height of the test fonts.
pub(crate) const GLYPH_HEIGHT: u16 = 12;

/// A font with fixed 8x12 glyphs and the given native format.
pub(crate) fn test_font(id: u64, native: Option<CacheFormat>) -> Font {
    Font::new(
        FontId::new(id),
        FixedMetricsEngine::new(ASCENT, GLYPH_WIDTH, GLYPH_HEIGHT).with_native_format(native),
    )
}

/// `count` glyphs with ids starting at 1, advancing 9 pixels each.
pub(crate) fn glyph_run(count: u32) -> GlyphRun {
    GlyphRun::new((0..count).map(|i| Glyph {
        id: i + 1,
        x: i as f32 * 9.0,
        y: 0.0,
    }))
}

/// The baseline origin that puts the top of the test glyphs at y = 0.
pub(crate) fn origin() -> Point {
    Point::new(0.0, f64::from(ASCENT))
}

/// Vertex and index counts of every draw, in order.
pub(crate) fn draws(commands: &[GpuCommand]) -> Vec<(usize, usize)> {
    commands
        .iter()
        .filter_map(|command| match command {
            GpuCommand::DrawIndexed { vertices, indices } => Some((*vertices, *indices)),
            _ => None,
        })
        .collect()
}

/// Number of recorded commands matching `predicate`.
pub(crate) fn count(commands: &[GpuCommand], predicate: impl Fn(&GpuCommand) -> bool) -> usize {
    commands.iter().filter(|c| predicate(c)).count()
}

/// Every matrix uploaded, in order.
pub(crate) fn matrix_uploads(ctx: &RecordingContext) -> Vec<[f32; 16]> {
    ctx.uploads_to("matrix")
        .into_iter()
        .filter_map(|command| match command {
            GpuCommand::UniformMat4(_, m) => Some(*m),
            _ => None,
        })
        .collect()
}
