// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A drawable glyph run with a text style.

use crate::atlas::{AtlasRegistry, CacheFormat};
use crate::color::{AlphaColor, Srgb, palette};
use crate::font::{Font, GlyphRun};
use crate::geometry::{Geometry, Margins};
use crate::kurbo::{Point, Rect, Vec2};
use crate::material::{GlyphMaterial, StyleEffect, StyledTextMaterial, TextMaskMaterial};
use crate::Error;

/// How a glyph run is decorated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TextStyle {
    /// Plain glyphs.
    #[default]
    Normal,
    /// Glyphs surrounded by a one pixel outline in the style color.
    Outline,
    /// Glyphs with a copy in the style color one pixel below.
    Raised,
    /// Glyphs with a copy in the style color one pixel above.
    Sunken,
}

impl TextStyle {
    /// Extra pixels around each glyph quad, so the effect is not clipped.
    pub fn margins(self) -> Margins {
        match self {
            Self::Normal => Margins::ZERO,
            Self::Outline => Margins::uniform(1),
            Self::Raised | Self::Sunken => Margins::new(0, 2, 0, 2),
        }
    }

    /// Offset of the styled copy, in texels, for shifted styles.
    pub fn shift(self) -> Option<Vec2> {
        match self {
            Self::Raised => Some(Vec2::new(0.0, 1.0)),
            Self::Sunken => Some(Vec2::new(0.0, -1.0)),
            Self::Normal | Self::Outline => None,
        }
    }
}

/// A glyph run together with the material and geometry that draw it.
#[derive(Debug)]
pub struct GlyphNode {
    font: Font,
    preferred_format: Option<CacheFormat>,
    style: TextStyle,
    color: AlphaColor<Srgb>,
    style_color: AlphaColor<Srgb>,
    material: GlyphMaterial,
    origin: Point,
    run: GlyphRun,
    geometry: Geometry,
    bounding_rect: Rect,
    baseline: Point,
}

impl GlyphNode {
    /// Creates an empty node drawing with `font`.
    ///
    /// `preferred_format` applies to [`TextStyle::Normal`] only; the other styles always use
    /// an 8-bit alpha atlas.
    pub fn new(
        font: &Font,
        preferred_format: Option<CacheFormat>,
        registry: &mut AtlasRegistry,
    ) -> Result<Self, Error> {
        let material = TextMaskMaterial::new(font, preferred_format, registry)?.into();
        Ok(Self {
            font: font.clone(),
            preferred_format,
            style: TextStyle::Normal,
            color: palette::css::BLACK,
            style_color: palette::css::BLACK,
            material,
            origin: Point::ZERO,
            run: GlyphRun::default(),
            geometry: Geometry::new(),
            bounding_rect: Rect::ZERO,
            baseline: Point::ZERO,
        })
    }

    /// Replaces the glyphs and rebuilds the geometry.
    pub fn set_glyphs(&mut self, origin: Point, run: GlyphRun) -> Result<(), Error> {
        self.origin = origin;
        self.run = run;
        self.repopulate()
    }

    /// Sets the text color.
    pub fn set_color(&mut self, color: AlphaColor<Srgb>) {
        self.color = color;
        self.material.set_color(color);
    }

    /// Sets the color of outlines and raised or sunken copies.
    pub fn set_style_color(&mut self, color: AlphaColor<Srgb>) {
        self.style_color = color;
        if let Some(styled) = self.material.styled_mut() {
            styled.set_style_color(color);
        }
    }

    /// Changes the style, rebuilding the material and the geometry.
    pub fn set_style(&mut self, style: TextStyle, registry: &mut AtlasRegistry) -> Result<(), Error> {
        if style == self.style {
            return Ok(());
        }
        let mut material: GlyphMaterial = match style {
            TextStyle::Normal => {
                TextMaskMaterial::new(&self.font, self.preferred_format, registry)?.into()
            }
            TextStyle::Outline => {
                let mut m = StyledTextMaterial::new(&self.font, StyleEffect::Outlined, registry)?;
                m.set_style_color(self.style_color);
                m.into()
            }
            TextStyle::Raised | TextStyle::Sunken => {
                let mut m = StyledTextMaterial::new(&self.font, StyleEffect::Styled, registry)?;
                m.set_style_color(self.style_color);
                m.set_shift(style.shift().unwrap_or_default());
                m.into()
            }
        };
        material.set_color(self.color);
        self.material = material;
        self.style = style;
        self.repopulate()
    }

    fn repopulate(&mut self) -> Result<(), Error> {
        let populated = self.material.populate(
            self.origin,
            self.run.ids(),
            self.run.positions(),
            self.style.margins(),
        )?;
        self.geometry = populated.geometry;
        self.bounding_rect = populated.bounding_rect;
        self.baseline = populated.baseline;
        Ok(())
    }

    /// The current style.
    pub fn style(&self) -> TextStyle {
        self.style
    }

    /// The text color.
    pub fn color(&self) -> AlphaColor<Srgb> {
        self.color
    }

    /// The style color.
    pub fn style_color(&self) -> AlphaColor<Srgb> {
        self.style_color
    }

    /// The material drawing this node.
    pub fn material(&self) -> &GlyphMaterial {
        &self.material
    }

    /// The glyph quads.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Union of the glyph rectangles, without style margins.
    pub fn bounding_rect(&self) -> Rect {
        self.bounding_rect
    }

    /// Pen position of the first glyph.
    pub fn baseline(&self) -> Point {
        self.baseline
    }
}
