// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A font engine backed by skrifa metrics.

#[cfg(feature = "libm")]
#[allow(unused_imports, reason = "unused when std provides the inherent float methods")]
use core_maths::CoreFloat;

use peniko::FontData;
use skrifa::instance::{LocationRef, Size};
use skrifa::{FontRef, GlyphId, MetadataProvider};

use crate::Error;
use crate::atlas::{CacheFormat, RasterMetrics, subpixel_offset};
use crate::font::{Font, FontEngine, FontId};

/// Glyph metrics for a font at one pixel size, read with skrifa.
///
/// Only metrics come from here; pixels are produced by whatever fills the atlas texture.
#[derive(Clone, Debug)]
pub struct SkrifaFontEngine {
    font: FontData,
    size: f32,
    ascent: f32,
}

impl SkrifaFontEngine {
    /// Creates an engine for `font` at `size` pixels per em.
    ///
    /// `id` identifies the font in errors and must be unique per face and size.
    pub fn new(id: FontId, font: FontData, size: f32) -> Result<Self, Error> {
        let font_ref = FontRef::from_index(font.data.as_ref(), font.index)
            .map_err(|_| Error::invalid_font(id))?;
        let ascent = font_ref
            .metrics(Size::new(size), LocationRef::default())
            .ascent;
        Ok(Self { font, size, ascent })
    }

    /// Wraps the engine in a [`Font`] with the given id.
    pub fn into_font(self, id: FontId) -> Font {
        Font::new(id, self)
    }

    /// The pixel size.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// The font data.
    pub fn font_data(&self) -> &FontData {
        &self.font
    }

    fn glyph_bounds(&self, glyph_id: u32) -> Option<[f32; 4]> {
        // Validated in `new`.
        let font_ref = FontRef::from_index(self.font.data.as_ref(), self.font.index).ok()?;
        let bounds = font_ref
            .glyph_metrics(Size::new(self.size), LocationRef::default())
            .bounds(GlyphId::new(glyph_id))?;
        Some([bounds.x_min, bounds.y_min, bounds.x_max, bounds.y_max])
    }
}

impl FontEngine for SkrifaFontEngine {
    fn ascent(&self) -> f32 {
        self.ascent
    }

    fn supports_subpixel_positioning(&self) -> bool {
        true
    }

    fn glyph_margin(&self, format: CacheFormat) -> i32 {
        match format {
            CacheFormat::Alpha8 => 1,
            CacheFormat::Rgb24 => 2,
        }
    }

    fn native_format(&self) -> Option<CacheFormat> {
        Some(CacheFormat::Alpha8)
    }

    fn glyph_metrics(&self, glyph_id: u32, subpixel: u8, format: CacheFormat) -> RasterMetrics {
        self.glyph_bounds(glyph_id)
            .map(|bounds| {
                raster_metrics(bounds, subpixel_offset(subpixel), self.glyph_margin(format))
            })
            .unwrap_or_default()
    }
}

/// Pixel box covering `[x_min, y_min, x_max, y_max]` shifted right by `offset`, padded by
/// `margin` on every side. Bearings are measured to the unpadded box, y up.
fn raster_metrics([x_min, y_min, x_max, y_max]: [f32; 4], offset: f32, margin: i32) -> RasterMetrics {
    if x_max <= x_min || y_max <= y_min {
        return RasterMetrics::default();
    }
    let left = to_i32((x_min + offset).floor());
    let right = to_i32((x_max + offset).ceil());
    let bottom = to_i32(y_min.floor());
    let top = to_i32(y_max.ceil());
    RasterMetrics {
        width: saturate_u16(right - left + 2 * margin),
        height: saturate_u16(top - bottom + 2 * margin),
        bearing_x: saturate_i16(left),
        bearing_y: saturate_i16(top),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "glyph bounds are far inside the i32 range; `as` saturates otherwise"
)]
fn to_i32(v: f32) -> i32 {
    v as i32
}

fn saturate_u16(v: i32) -> u16 {
    u16::try_from(v.max(0)).unwrap_or(u16::MAX)
}

fn saturate_i16(v: i32) -> i16 {
    i16::try_from(v).unwrap_or(if v < 0 { i16::MIN } else { i16::MAX })
}
