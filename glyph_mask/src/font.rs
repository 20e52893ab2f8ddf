// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fonts, font engines and glyph runs.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

use hashbrown::HashMap;

use crate::Error;
use crate::atlas::{CacheFormat, RasterMetrics, quantize_subpixel};
use crate::kurbo::Point;

/// Stable identifier of a font face.
///
/// Glyph atlases are shared per `(FontId, CacheFormat)` pair, so two [`Font`]s with the same id
/// must rasterize identically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontId(u64);

impl FontId {
    /// Creates a font id from a raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    pub const fn to_u64(self) -> u64 {
        self.0
    }
}

/// The glyph rasterizer behind a font.
///
/// Hinting, outline extraction and the rasterization itself stay inside the engine; the
/// material only needs metrics to place glyphs and reserve atlas space.
pub trait FontEngine: Debug {
    /// Distance from the top of the line box to the baseline, in pixels.
    fn ascent(&self) -> f32;

    /// Whether the engine renders separate glyph images per horizontal sub-pixel position.
    fn supports_subpixel_positioning(&self) -> bool;

    /// Quantize a horizontal glyph position into a sub-pixel bucket.
    fn subpixel_bucket(&self, x: f32) -> u8 {
        quantize_subpixel(x)
    }

    /// Extra pixels rendered around every glyph image in caches of the given format.
    fn glyph_margin(&self, format: CacheFormat) -> i32;

    /// The format the engine rasterizes to natively, if it has a preference.
    fn native_format(&self) -> Option<CacheFormat>;

    /// Raster size and bearings of a glyph image as it will be stored in the atlas.
    fn glyph_metrics(&self, glyph_id: u32, subpixel: u8, format: CacheFormat) -> RasterMetrics;
}

/// A font face together with its rendering engine.
///
/// Cloning is cheap; the engine is reference counted.
#[derive(Clone)]
pub struct Font {
    id: FontId,
    engine: Option<Rc<dyn FontEngine>>,
}

impl Font {
    /// Creates a font rendered by `engine`.
    pub fn new(id: FontId, engine: impl FontEngine + 'static) -> Self {
        Self {
            id,
            engine: Some(Rc::new(engine)),
        }
    }

    /// Creates a font that shares an existing engine.
    pub fn with_shared_engine(id: FontId, engine: Rc<dyn FontEngine>) -> Self {
        Self {
            id,
            engine: Some(engine),
        }
    }

    /// Creates a font that has no rendering engine.
    ///
    /// Materials cannot be built for such a font; this mirrors a face that failed to load.
    pub fn without_engine(id: FontId) -> Self {
        Self { id, engine: None }
    }

    /// The font identity.
    pub fn id(&self) -> FontId {
        self.id
    }

    /// The rendering engine, if the font has one.
    pub fn engine(&self) -> Option<&Rc<dyn FontEngine>> {
        self.engine.as_ref()
    }

    /// Distance from the top of the line box to the baseline, or zero without an engine.
    pub fn ascent(&self) -> f32 {
        self.engine.as_ref().map_or(0.0, |e| e.ascent())
    }
}

impl Debug for Font {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Font")
            .field("id", &self.id)
            .field("has_engine", &self.engine.is_some())
            .finish()
    }
}

/// Positioned glyph.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct Glyph {
    /// The font-specific identifier for this glyph.
    ///
    /// This ID is specific to the font being used and corresponds to the
    /// glyph index within that font. It is *not* a Unicode code point.
    pub id: u32,
    /// X-offset in run, relative to the run origin.
    pub x: f32,
    /// Y-offset in run, relative to the run origin.
    pub y: f32,
}

/// An ordered sequence of glyphs sharing one font and one origin.
///
/// Runs are immutable once built; a changed run is a new run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphRun {
    ids: Vec<u32>,
    positions: Vec<Point>,
}

impl GlyphRun {
    /// Builds a run from positioned glyphs.
    pub fn new(glyphs: impl IntoIterator<Item = Glyph>) -> Self {
        let (ids, positions) = glyphs
            .into_iter()
            .map(|g| (g.id, Point::new(f64::from(g.x), f64::from(g.y))))
            .unzip();
        Self { ids, positions }
    }

    /// Builds a run from parallel id and position lists.
    pub fn from_parts(ids: Vec<u32>, positions: Vec<Point>) -> Result<Self, Error> {
        if ids.len() != positions.len() {
            return Err(Error::mismatched_run(ids.len(), positions.len()));
        }
        Ok(Self { ids, positions })
    }

    /// Glyph ids in run order.
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Glyph positions relative to the run origin, in run order.
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Number of glyphs in the run.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the run has no glyphs.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A font engine with fixed, configurable metrics.
///
/// Every glyph has the same raster size unless overridden with
/// [`with_glyph`](Self::with_glyph). Useful for headless rendering and tests, where real font
/// data would make geometry depend on the font file.
#[derive(Clone, Debug)]
pub struct FixedMetricsEngine {
    ascent: f32,
    metrics: RasterMetrics,
    overrides: HashMap<u32, RasterMetrics>,
    subpixel: bool,
    native_format: Option<CacheFormat>,
    alpha_margin: i32,
    rgb_margin: i32,
}

impl FixedMetricsEngine {
    /// Creates an engine whose glyphs are `width` x `height` pixels with their top-left corner
    /// `ascent` pixels above the baseline.
    pub fn new(ascent: f32, width: u16, height: u16) -> Self {
        Self {
            ascent,
            metrics: RasterMetrics {
                width,
                height,
                bearing_x: 0,
                bearing_y: 0,
            },
            overrides: HashMap::new(),
            subpixel: false,
            native_format: None,
            alpha_margin: 0,
            rgb_margin: 0,
        }
    }

    /// Sets the bearings used for every glyph without an override.
    pub fn with_bearings(mut self, bearing_x: i16, bearing_y: i16) -> Self {
        self.metrics.bearing_x = bearing_x;
        self.metrics.bearing_y = bearing_y;
        self
    }

    /// Overrides the metrics of one glyph.
    pub fn with_glyph(mut self, glyph_id: u32, metrics: RasterMetrics) -> Self {
        self.overrides.insert(glyph_id, metrics);
        self
    }

    /// Enables or disables sub-pixel positioning.
    pub fn with_subpixel_positioning(mut self, enabled: bool) -> Self {
        self.subpixel = enabled;
        self
    }

    /// Sets the native glyph format.
    pub fn with_native_format(mut self, format: Option<CacheFormat>) -> Self {
        self.native_format = format;
        self
    }

    /// Sets the glyph margin for 8-bit alpha and 24-bit RGB caches.
    pub fn with_margins(mut self, alpha: i32, rgb: i32) -> Self {
        self.alpha_margin = alpha;
        self.rgb_margin = rgb;
        self
    }
}

impl FontEngine for FixedMetricsEngine {
    fn ascent(&self) -> f32 {
        self.ascent
    }

    fn supports_subpixel_positioning(&self) -> bool {
        self.subpixel
    }

    fn glyph_margin(&self, format: CacheFormat) -> i32 {
        match format {
            CacheFormat::Alpha8 => self.alpha_margin,
            CacheFormat::Rgb24 => self.rgb_margin,
        }
    }

    fn native_format(&self) -> Option<CacheFormat> {
        self.native_format
    }

    fn glyph_metrics(&self, glyph_id: u32, _subpixel: u8, _format: CacheFormat) -> RasterMetrics {
        self.overrides
            .get(&glyph_id)
            .copied()
            .unwrap_or(self.metrics)
    }
}
