// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text mask materials.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp::Ordering;

use crate::atlas::{
    AtlasHandle, AtlasId, AtlasRegistry, CacheFormat, GlyphKey, Lookup, TextureRef,
};
use crate::color::{AlphaColor, Srgb, palette};
use crate::font::{Font, FontEngine, GlyphRun};
use crate::geometry::{MAX_GLYPHS_PER_RUN, Margins, PopulatedRun, build_glyph_quads, pen_for};
use crate::kurbo::{Point, Vec2};
use crate::Error;

/// The kind of a material, which determines the shader that draws it.
///
/// Materials of different kinds never share a batch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaterialKind {
    /// Plain text from an 8-bit alpha atlas.
    Alpha8,
    /// Plain sub-pixel anti-aliased text from an RGB atlas.
    Rgb24,
    /// Text with a shifted copy drawn in the style color.
    Styled,
    /// Text with a one pixel outline drawn in the style color.
    Outlined,
}

/// Draws glyph runs by sampling glyph coverage from a shared atlas and tinting it with a color.
#[derive(Debug)]
pub struct TextMaskMaterial {
    font: Font,
    engine: Rc<dyn FontEngine>,
    atlas: AtlasHandle,
    format: CacheFormat,
    color: AlphaColor<Srgb>,
    texture: Cell<Option<TextureRef>>,
}

impl TextMaskMaterial {
    /// Creates a material for `font`, sharing the atlas for its cache format through
    /// `registry`.
    ///
    /// Without a requested format, the font engine's native format is used, falling back to
    /// [`CacheFormat::Alpha8`]. Fails with [`InvalidFont`](crate::ErrorKind::InvalidFont) if the
    /// font has no rendering engine.
    pub fn new(
        font: &Font,
        format: Option<CacheFormat>,
        registry: &mut AtlasRegistry,
    ) -> Result<Self, Error> {
        let engine = font
            .engine()
            .cloned()
            .ok_or_else(|| Error::invalid_font(font.id()))?;
        let format = format
            .or_else(|| engine.native_format())
            .unwrap_or(CacheFormat::Alpha8);
        let atlas = registry.acquire(font.id(), format);
        Ok(Self {
            font: font.clone(),
            engine,
            atlas,
            format,
            color: palette::css::BLACK,
            texture: Cell::new(None),
        })
    }

    /// The font this material draws.
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// The atlas texture format.
    pub fn cache_format(&self) -> CacheFormat {
        self.format
    }

    /// The shared atlas.
    pub fn atlas(&self) -> &AtlasHandle {
        &self.atlas
    }

    /// The identity of the shared atlas.
    pub fn atlas_id(&self) -> AtlasId {
        self.atlas.id()
    }

    /// The text color.
    pub fn color(&self) -> AlphaColor<Srgb> {
        self.color
    }

    /// Sets the text color.
    pub fn set_color(&mut self, color: AlphaColor<Srgb>) {
        self.color = color;
    }

    /// The plain kind for this material's cache format.
    pub fn kind(&self) -> MaterialKind {
        match self.format {
            CacheFormat::Alpha8 => MaterialKind::Alpha8,
            CacheFormat::Rgb24 => MaterialKind::Rgb24,
        }
    }

    /// Reserves atlas space for a glyph run and builds its geometry.
    ///
    /// `origin` is the baseline origin of the run and `positions` are relative to it.
    /// `margins` grow every quad without affecting the returned bounding rectangle.
    pub fn populate(
        &self,
        origin: Point,
        glyph_ids: &[u32],
        positions: &[Point],
        margins: Margins,
    ) -> Result<PopulatedRun, Error> {
        if glyph_ids.len() != positions.len() {
            return Err(Error::mismatched_run(glyph_ids.len(), positions.len()));
        }
        if glyph_ids.len() > MAX_GLYPHS_PER_RUN {
            return Err(Error::geometry_overflow(glyph_ids.len()));
        }
        let engine = &*self.engine;
        let subpixel = engine.supports_subpixel_positioning();
        let keys: Vec<GlyphKey> = glyph_ids
            .iter()
            .zip(positions)
            .map(|(&id, position)| {
                let bucket = if subpixel {
                    engine.subpixel_bucket(narrow(position.x))
                } else {
                    0
                };
                GlyphKey::new(id, bucket)
            })
            .collect();

        {
            let mut cache = self.atlas.borrow_mut();
            cache.populate(engine, &keys)?;
            cache.fill_pending_glyphs();
        }

        let cache = self.atlas.borrow();
        // Glyphs are visited in run order, so keys are consumed in lockstep.
        let mut keys = keys.iter();
        build_glyph_quads(
            pen_for(origin, engine.ascent()),
            glyph_ids,
            positions,
            |_, _| match cache.lookup(*keys.next()?) {
                Lookup::Ready(coord) => Some(coord),
                Lookup::Pending(_) | Lookup::Absent => None,
            },
            engine.glyph_margin(self.format),
            margins,
        )
    }

    /// [`populate`](Self::populate) for a [`GlyphRun`].
    pub fn populate_run(
        &self,
        origin: Point,
        run: &GlyphRun,
        margins: Margins,
    ) -> Result<PopulatedRun, Error> {
        self.populate(origin, run.ids(), run.positions(), margins)
    }

    /// Refreshes the texture snapshot from the atlas.
    ///
    /// Returns `true` if the atlas moved to a different texture (grown or cleared) since the
    /// previous call, meaning the texture must be rebound.
    pub fn ensure_up_to_date(&self) -> bool {
        let current = self.atlas.borrow().texture();
        if self.texture.get() == Some(current) {
            return false;
        }
        self.texture.set(Some(current));
        true
    }

    /// The texture seen by the last [`ensure_up_to_date`](Self::ensure_up_to_date).
    pub fn texture(&self) -> Option<TextureRef> {
        self.texture.get()
    }

    /// Orders materials for batching: by atlas, then by color.
    ///
    /// Equal materials can be drawn without any state change in between. This is a sort key
    /// and not a statement about semantic equality.
    pub fn compare_for_batching(&self, other: &Self) -> Ordering {
        self.atlas_id()
            .cmp(&other.atlas_id())
            .then_with(|| compare_colors(self.color, other.color))
    }
}

/// Which effect a [`StyledTextMaterial`] draws.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StyleEffect {
    /// A copy of the glyphs offset by the shift vector (raised and sunken text).
    Styled,
    /// A one pixel outline around the glyphs.
    Outlined,
}

/// A text mask material that also draws a style color around or behind the glyphs.
///
/// Always uses an 8-bit alpha atlas.
#[derive(Debug)]
pub struct StyledTextMaterial {
    mask: TextMaskMaterial,
    style_color: AlphaColor<Srgb>,
    shift: Vec2,
    effect: StyleEffect,
}

impl StyledTextMaterial {
    /// Creates a styled material for `font`.
    pub fn new(
        font: &Font,
        effect: StyleEffect,
        registry: &mut AtlasRegistry,
    ) -> Result<Self, Error> {
        Ok(Self {
            mask: TextMaskMaterial::new(font, Some(CacheFormat::Alpha8), registry)?,
            style_color: palette::css::BLACK,
            shift: Vec2::ZERO,
            effect,
        })
    }

    /// The underlying text mask material.
    pub fn mask(&self) -> &TextMaskMaterial {
        &self.mask
    }

    /// The effect drawn.
    pub fn effect(&self) -> StyleEffect {
        self.effect
    }

    /// The text color.
    pub fn color(&self) -> AlphaColor<Srgb> {
        self.mask.color()
    }

    /// Sets the text color.
    pub fn set_color(&mut self, color: AlphaColor<Srgb>) {
        self.mask.set_color(color);
    }

    /// The color of the effect.
    pub fn style_color(&self) -> AlphaColor<Srgb> {
        self.style_color
    }

    /// Sets the color of the effect.
    pub fn set_style_color(&mut self, color: AlphaColor<Srgb>) {
        self.style_color = color;
    }

    /// Offset of the styled copy, in texels.
    pub fn shift(&self) -> Vec2 {
        self.shift
    }

    /// Sets the offset of the styled copy, in texels.
    pub fn set_shift(&mut self, shift: Vec2) {
        self.shift = shift;
    }

    /// The material kind for the effect.
    pub fn kind(&self) -> MaterialKind {
        match self.effect {
            StyleEffect::Styled => MaterialKind::Styled,
            StyleEffect::Outlined => MaterialKind::Outlined,
        }
    }

    /// See [`TextMaskMaterial::populate`].
    pub fn populate(
        &self,
        origin: Point,
        glyph_ids: &[u32],
        positions: &[Point],
        margins: Margins,
    ) -> Result<PopulatedRun, Error> {
        self.mask.populate(origin, glyph_ids, positions, margins)
    }

    /// Orders materials for batching: by vertical shift, then style color, then as
    /// [`TextMaskMaterial::compare_for_batching`].
    pub fn compare_for_batching(&self, other: &Self) -> Ordering {
        self.shift
            .y
            .total_cmp(&other.shift.y)
            .then_with(|| compare_colors(self.style_color, other.style_color))
            .then_with(|| self.mask.compare_for_batching(&other.mask))
    }
}

/// Any glyph material.
#[derive(Debug)]
pub enum GlyphMaterial {
    /// Plain text.
    Mask(TextMaskMaterial),
    /// Styled or outlined text.
    Styled(StyledTextMaterial),
}

impl GlyphMaterial {
    /// The material kind.
    pub fn kind(&self) -> MaterialKind {
        match self {
            Self::Mask(m) => m.kind(),
            Self::Styled(m) => m.kind(),
        }
    }

    /// The underlying text mask material.
    pub fn mask(&self) -> &TextMaskMaterial {
        match self {
            Self::Mask(m) => m,
            Self::Styled(m) => m.mask(),
        }
    }

    /// The styled material, if this is one.
    pub fn styled(&self) -> Option<&StyledTextMaterial> {
        match self {
            Self::Mask(_) => None,
            Self::Styled(m) => Some(m),
        }
    }

    /// The styled material, if this is one.
    pub fn styled_mut(&mut self) -> Option<&mut StyledTextMaterial> {
        match self {
            Self::Mask(_) => None,
            Self::Styled(m) => Some(m),
        }
    }

    /// Sets the text color.
    pub fn set_color(&mut self, color: AlphaColor<Srgb>) {
        match self {
            Self::Mask(m) => m.set_color(color),
            Self::Styled(m) => m.set_color(color),
        }
    }

    /// See [`TextMaskMaterial::populate`].
    pub fn populate(
        &self,
        origin: Point,
        glyph_ids: &[u32],
        positions: &[Point],
        margins: Margins,
    ) -> Result<PopulatedRun, Error> {
        self.mask().populate(origin, glyph_ids, positions, margins)
    }

    /// Orders materials by kind first, then by the kind's own batching order.
    pub fn compare_for_batching(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Mask(a), Self::Mask(b)) => a
                .kind()
                .cmp(&b.kind())
                .then_with(|| a.compare_for_batching(b)),
            (Self::Styled(a), Self::Styled(b)) => a
                .kind()
                .cmp(&b.kind())
                .then_with(|| a.compare_for_batching(b)),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl From<TextMaskMaterial> for GlyphMaterial {
    fn from(material: TextMaskMaterial) -> Self {
        Self::Mask(material)
    }
}

impl From<StyledTextMaterial> for GlyphMaterial {
    fn from(material: StyledTextMaterial) -> Self {
        Self::Styled(material)
    }
}

fn compare_colors(a: AlphaColor<Srgb>, b: AlphaColor<Srgb>) -> Ordering {
    a.components
        .iter()
        .zip(&b.components)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "sub-pixel buckets only depend on the fractional part"
)]
fn narrow(x: f64) -> f32 {
    x as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::atlas::AtlasConfig;
    use crate::font::{FixedMetricsEngine, FontId};
    use crate::kurbo::Rect;
    use alloc::vec;

    fn font(id: u64) -> Font {
        Font::new(FontId::new(id), FixedMetricsEngine::new(10.0, 8, 12))
    }

    fn positions(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64 * 9.0, 0.0)).collect()
    }

    #[test]
    fn invalid_font_is_rejected() {
        let mut registry = AtlasRegistry::new();
        let err = TextMaskMaterial::new(&Font::without_engine(FontId::new(3)), None, &mut registry)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFont);
        assert_eq!(err.font_id(), Some(FontId::new(3)));
    }

    #[test]
    fn format_resolution() {
        let mut registry = AtlasRegistry::new();
        let plain = TextMaskMaterial::new(&font(1), None, &mut registry).unwrap();
        assert_eq!(plain.cache_format(), CacheFormat::Alpha8);

        let rgb_font = Font::new(
            FontId::new(2),
            FixedMetricsEngine::new(10.0, 8, 12).with_native_format(Some(CacheFormat::Rgb24)),
        );
        let native = TextMaskMaterial::new(&rgb_font, None, &mut registry).unwrap();
        assert_eq!(native.kind(), MaterialKind::Rgb24);

        let styled = StyledTextMaterial::new(&rgb_font, StyleEffect::Styled, &mut registry).unwrap();
        assert_eq!(styled.mask().cache_format(), CacheFormat::Alpha8);
    }

    #[test]
    fn materials_share_atlas_per_font_and_format() {
        let mut registry = AtlasRegistry::new();
        let f = font(1);
        let a = TextMaskMaterial::new(&f, None, &mut registry).unwrap();
        let b = StyledTextMaterial::new(&f, StyleEffect::Outlined, &mut registry).unwrap();
        assert!(a.atlas().ptr_eq(b.mask().atlas()));
    }

    #[test]
    fn populate_three_glyphs() {
        let mut registry = AtlasRegistry::new();
        let material = TextMaskMaterial::new(&font(1), None, &mut registry).unwrap();
        let run = material
            .populate(Point::new(0.0, 10.0), &[1, 2, 3], &positions(3), Margins::ZERO)
            .unwrap();
        assert_eq!(run.geometry.vertices().len(), 12);
        assert_eq!(run.geometry.indices().len(), 18);
        assert_eq!(run.baseline, Point::ZERO);
        assert_eq!(run.bounding_rect, Rect::new(0.0, 0.0, 26.0, 12.0));
        let stats = material.atlas().borrow().stats();
        assert_eq!((stats.entries, stats.pending), (3, 0));
    }

    #[test]
    fn populate_rejects_mismatched_run_before_touching_atlas() {
        let mut registry = AtlasRegistry::new();
        let material = TextMaskMaterial::new(&font(1), None, &mut registry).unwrap();
        let err = material
            .populate(Point::ZERO, &[1, 2], &positions(1), Margins::ZERO)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MismatchedRun);
        assert_eq!(material.atlas().borrow().stats().entries, 0);
    }

    #[test]
    fn populate_rejects_oversized_run_before_touching_atlas() {
        let mut registry = AtlasRegistry::new();
        let empty = Font::new(FontId::new(1), FixedMetricsEngine::new(10.0, 0, 0));
        let material = TextMaskMaterial::new(&empty, None, &mut registry).unwrap();
        let ids = vec![1; MAX_GLYPHS_PER_RUN + 1];
        let err = material
            .populate(Point::ZERO, &ids, &positions(ids.len()), Margins::ZERO)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GeometryOverflow);
        assert_eq!(material.atlas().borrow().stats().entries, 0);
    }

    #[test]
    fn subpixel_buckets_are_separate_entries() {
        let mut registry = AtlasRegistry::new();
        let f = Font::new(
            FontId::new(1),
            FixedMetricsEngine::new(10.0, 8, 12).with_subpixel_positioning(true),
        );
        let material = TextMaskMaterial::new(&f, None, &mut registry).unwrap();
        let positions = [Point::new(0.0, 0.0), Point::new(10.5, 0.0), Point::new(20.0, 0.0)];
        material
            .populate(Point::ZERO, &[7, 7, 7], &positions, Margins::ZERO)
            .unwrap();
        assert_eq!(material.atlas().borrow().stats().entries, 2);
    }

    #[test]
    fn overflow_is_reported() {
        let mut registry = AtlasRegistry::with_config(AtlasConfig {
            initial_size: (16, 16),
            max_size: (16, 16),
            padding: 0,
        });
        let material = TextMaskMaterial::new(&font(1), None, &mut registry).unwrap();
        let ids: Vec<u32> = (0..10).collect();
        let err = material
            .populate(Point::ZERO, &ids, &positions(10), Margins::ZERO)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AtlasOverflow);
        // Caller recovery: evict and retry with fewer glyphs.
        material.atlas().borrow_mut().clear();
        assert!(material
            .populate(Point::ZERO, &ids[..2], &positions(2), Margins::ZERO)
            .is_ok());
    }

    #[test]
    fn ensure_up_to_date_once_per_change() {
        let mut registry = AtlasRegistry::with_config(AtlasConfig {
            initial_size: (16, 16),
            max_size: (256, 256),
            padding: 0,
        });
        let material = TextMaskMaterial::new(&font(1), None, &mut registry).unwrap();
        assert!(material.ensure_up_to_date());
        assert!(!material.ensure_up_to_date());

        let ids: Vec<u32> = (0..4).collect();
        material
            .populate(Point::ZERO, &ids, &positions(4), Margins::ZERO)
            .unwrap();
        assert!(material.ensure_up_to_date());
        assert!(!material.ensure_up_to_date());
        let texture = material.texture().unwrap();
        assert_eq!(
            (texture.width, texture.height),
            (material.atlas().borrow().width(), material.atlas().borrow().height())
        );
    }

    #[test]
    fn batching_order() {
        let mut registry = AtlasRegistry::new();
        let mut a = TextMaskMaterial::new(&font(1), None, &mut registry).unwrap();
        let mut b = TextMaskMaterial::new(&font(1), None, &mut registry).unwrap();
        let c = TextMaskMaterial::new(&font(2), None, &mut registry).unwrap();
        assert_eq!(a.compare_for_batching(&b), Ordering::Equal);
        a.set_color(palette::css::RED);
        b.set_color(palette::css::BLUE);
        assert_eq!(a.compare_for_batching(&b), Ordering::Greater);
        assert_eq!(b.compare_for_batching(&a), Ordering::Less);
        // Atlas identity dominates color.
        assert_eq!(a.compare_for_batching(&c), Ordering::Less);
        assert_eq!(b.compare_for_batching(&c), Ordering::Less);
    }

    #[test]
    fn styled_batching_order() {
        let mut registry = AtlasRegistry::new();
        let f = font(1);
        let mut raised = StyledTextMaterial::new(&f, StyleEffect::Styled, &mut registry).unwrap();
        let mut sunken = StyledTextMaterial::new(&f, StyleEffect::Styled, &mut registry).unwrap();
        raised.set_shift(Vec2::new(0.0, 1.0));
        sunken.set_shift(Vec2::new(0.0, -1.0));
        raised.set_style_color(palette::css::BLACK);
        sunken.set_style_color(palette::css::WHITE);
        assert_eq!(sunken.compare_for_batching(&raised), Ordering::Less);

        sunken.set_shift(Vec2::new(0.0, 1.0));
        assert_eq!(raised.compare_for_batching(&sunken), Ordering::Less);
    }

    #[test]
    fn kinds_never_interleave() {
        let mut registry = AtlasRegistry::new();
        let f = font(1);
        let plain = GlyphMaterial::from(TextMaskMaterial::new(&f, None, &mut registry).unwrap());
        let outlined = GlyphMaterial::from(
            StyledTextMaterial::new(&f, StyleEffect::Outlined, &mut registry).unwrap(),
        );
        let styled = GlyphMaterial::from(
            StyledTextMaterial::new(&f, StyleEffect::Styled, &mut registry).unwrap(),
        );
        let mut materials = vec![&outlined, &styled, &plain];
        materials.sort_by(|a, b| a.compare_for_batching(b));
        let kinds: Vec<_> = materials.iter().map(|m| m.kind()).collect();
        assert_eq!(
            kinds,
            [MaterialKind::Alpha8, MaterialKind::Styled, MaterialKind::Outlined]
        );
    }
}
