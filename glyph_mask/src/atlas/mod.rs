// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph atlas caches.
//!
//! An atlas maps glyph keys to rectangles in one GPU texture:
//! - Space is reserved by [`GlyphCache::populate`] and becomes usable after
//!   [`GlyphCache::fill_pending_glyphs`]
//! - The texture grows on demand up to [`AtlasConfig::max_size`]; every growth yields a new
//!   [`TextureId`]
//! - Atlases are shared per font and [`CacheFormat`] through an [`AtlasRegistry`]

mod cache;
mod key;
mod region;
mod registry;

pub use cache::{AtlasConfig, GlyphAtlas, GlyphCache, GlyphCacheStats, Lookup};
pub use key::{GlyphKey, SUBPIXEL_BUCKETS, quantize_subpixel, subpixel_offset};
pub use region::{AtlasCoord, RasterMetrics, TextureId, TextureRef};
pub use registry::{AtlasHandle, AtlasId, AtlasRegistry};

/// Pixel format of an atlas texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CacheFormat {
    /// One coverage byte per pixel.
    Alpha8,
    /// Per-channel coverage for sub-pixel (LCD) anti-aliasing.
    Rgb24,
}
