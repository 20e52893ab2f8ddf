// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas coordinates, raster metrics and texture handles.

use core::sync::atomic::{AtomicU64, Ordering};

/// Location and baseline offsets of a cached glyph within an atlas texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AtlasCoord {
    /// X position in atlas (pixels).
    pub x: u16,

    /// Y position in atlas (pixels).
    pub y: u16,

    /// Width of the glyph image (pixels), including the engine's glyph margin.
    pub w: u16,

    /// Height of the glyph image (pixels), including the engine's glyph margin.
    pub h: u16,

    /// Horizontal offset from the pen position to the left edge of the glyph image.
    pub baseline_x: i16,

    /// Vertical offset from the top edge of the glyph image up to the baseline.
    pub baseline_y: i16,
}

impl AtlasCoord {
    /// Whether the coordinate covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Size and bearings of a glyph image, as reported by a font engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterMetrics {
    /// Width of the rasterized glyph in pixels.
    pub width: u16,
    /// Height of the rasterized glyph in pixels.
    pub height: u16,
    /// Horizontal bearing (offset from glyph origin to left edge).
    pub bearing_x: i16,
    /// Vertical bearing (offset from glyph origin to top edge).
    pub bearing_y: i16,
}

/// Identity of one GPU texture.
///
/// Ids are unique within the process. Every time an atlas grows or is cleared it moves to a
/// new texture, and so to a new id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TextureId(u64);

impl TextureId {
    /// Creates a new unique identifier.
    #[allow(clippy::new_without_default, reason = "every call yields a different id")]
    pub fn new() -> Self {
        static ID_COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying integer value.
    pub fn to_u64(self) -> u64 {
        self.0
    }
}

/// A non-owning reference to an atlas texture.
///
/// Holding one does not keep the texture alive; compare [`id`](Self::id)s to detect that
/// the atlas has moved on to a new texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureRef {
    /// The texture identity.
    pub id: TextureId,
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
}
