// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Textured quad geometry for glyph runs.

use alloc::vec::Vec;

#[cfg(feature = "libm")]
#[allow(unused_imports, reason = "unused when std provides the inherent float methods")]
use core_maths::CoreFloat;

use crate::Error;
use crate::atlas::AtlasCoord;
use crate::kurbo::{Point, Rect, Vec2};

/// Maximum number of glyphs in a single run, so that every vertex is addressable by a `u16`
/// index.
pub const MAX_GLYPHS_PER_RUN: usize = (u16::MAX as usize + 1) / 4;

/// A vertex with a position and a texture coordinate, both in pixels.
///
/// The layout matches a pair of `vec2` attributes and can be uploaded with
/// [`bytemuck::cast_slice`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C)]
pub struct TexturedPoint2D {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
    /// Horizontal texture coordinate, in texels.
    pub tx: f32,
    /// Vertical texture coordinate, in texels.
    pub ty: f32,
}

/// Extra pixels added around each glyph quad, for effects that draw outside the glyph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Margins {
    /// Pixels added to the left edge.
    pub left: i32,
    /// Pixels added to the top edge.
    pub top: i32,
    /// Pixels added to the right edge.
    pub right: i32,
    /// Pixels added to the bottom edge.
    pub bottom: i32,
}

impl Margins {
    /// No extra pixels.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates margins from the four edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same margin on every edge.
    pub const fn uniform(margin: i32) -> Self {
        Self::new(margin, margin, margin, margin)
    }
}

/// Vertex and index buffers of a set of quads.
///
/// Each quad has 4 vertices (top-left, top-right, bottom-left, bottom-right) and 6 indices
/// forming two triangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    vertices: Vec<TexturedPoint2D>,
    indices: Vec<u16>,
}

impl Geometry {
    /// Creates empty geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates empty geometry with room for `quads` quads.
    pub fn with_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
        }
    }

    /// The vertex buffer.
    pub fn vertices(&self) -> &[TexturedPoint2D] {
        &self.vertices
    }

    /// The index buffer.
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Number of quads.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Whether the geometry has no quads.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Removes every quad, keeping the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Makes room for `quads` more quads.
    ///
    /// Fails with [`GeometryOverflow`](crate::ErrorKind::GeometryOverflow), before allocating,
    /// if the result could not be addressed with 16-bit indices.
    pub fn reserve_quads(&mut self, quads: usize) -> Result<(), Error> {
        let total = self.quad_count().saturating_add(quads);
        if total > MAX_GLYPHS_PER_RUN {
            return Err(Error::geometry_overflow(total));
        }
        self.vertices.reserve(quads * 4);
        self.indices.reserve(quads * 6);
        Ok(())
    }

    /// Appends a quad covering `rect`, sampling the texture at `texels`.
    ///
    /// Fails with [`GeometryOverflow`](crate::ErrorKind::GeometryOverflow) once the quad could
    /// no longer be addressed with 16-bit indices.
    pub fn push_quad(&mut self, rect: Rect, texels: Rect) -> Result<(), Error> {
        let base = self.vertices.len();
        let Ok(o) = u16::try_from(base + 3).map(|last| last - 3) else {
            return Err(Error::geometry_overflow(self.quad_count() + 1));
        };
        let corner = |x: f64, y: f64, tx: f64, ty: f64| TexturedPoint2D {
            x: to_f32(x),
            y: to_f32(y),
            tx: to_f32(tx),
            ty: to_f32(ty),
        };
        self.vertices.extend([
            corner(rect.x0, rect.y0, texels.x0, texels.y0),
            corner(rect.x1, rect.y0, texels.x1, texels.y0),
            corner(rect.x0, rect.y1, texels.x0, texels.y1),
            corner(rect.x1, rect.y1, texels.x1, texels.y1),
        ]);
        self.indices.extend([o, o + 2, o + 3, o + 3, o + 1, o]);
        Ok(())
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "vertex data is single precision; pixel coordinates are well within f32 range"
)]
#[inline]
fn to_f32(value: f64) -> f32 {
    value as f32
}

/// Glyph geometry plus the layout facts derived while building it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PopulatedRun {
    /// One quad per glyph.
    pub geometry: Geometry,
    /// Union of the glyph image rectangles, excluding caller margins. Zero for an empty run.
    pub bounding_rect: Rect,
    /// Pen position of the first glyph, or the pen itself for an empty run.
    pub baseline: Point,
}

/// Builds one textured quad per glyph.
///
/// `pen` is the run origin already moved up by the font ascent. For each glyph, `lookup`
/// receives the glyph id and its absolute pen position and returns the glyph's atlas
/// location; glyphs without one produce a zero-size quad. `glyph_margin` is the padding the
/// font engine rendered around each glyph image, and `margins` extend every quad outward for
/// effects such as outlines.
pub fn build_glyph_quads(
    pen: Point,
    glyph_ids: &[u32],
    positions: &[Point],
    mut lookup: impl FnMut(u32, Point) -> Option<AtlasCoord>,
    glyph_margin: i32,
    margins: Margins,
) -> Result<PopulatedRun, Error> {
    if glyph_ids.len() != positions.len() {
        return Err(Error::mismatched_run(glyph_ids.len(), positions.len()));
    }
    if glyph_ids.len() > MAX_GLYPHS_PER_RUN {
        return Err(Error::geometry_overflow(glyph_ids.len()));
    }

    let mut geometry = Geometry::with_capacity(glyph_ids.len());
    let mut bounds: Option<Rect> = None;
    let margin = f64::from(glyph_margin);
    let (left, top, right, bottom) = (
        f64::from(margins.left),
        f64::from(margins.top),
        f64::from(margins.right),
        f64::from(margins.bottom),
    );

    for (&glyph_id, &position) in glyph_ids.iter().zip(positions) {
        let gp = position + pen.to_vec2();
        let Some(c) = lookup(glyph_id, gp) else {
            log::debug!("glyph {glyph_id} has no atlas coordinate; emitting an empty quad");
            let at = Rect::from_origin_size(Point::new(gp.x.floor(), gp.y.floor()), (0.0, 0.0));
            geometry.push_quad(at, Rect::ZERO)?;
            continue;
        };

        let x = gp.x.floor() + f64::from(c.baseline_x) - margin;
        let y = gp.y.floor() - f64::from(c.baseline_y) - margin;
        let (w, h) = (f64::from(c.w), f64::from(c.h));

        let glyph_rect = Rect::from_origin_size((x + margin, y + margin), (w, h));
        bounds = Some(bounds.map_or(glyph_rect, |b| b.union(glyph_rect)));

        let quad = Rect::new(x - left, y - top, x + w + right, y + h + bottom);
        let (tx, ty) = (f64::from(c.x), f64::from(c.y));
        let texels = Rect::new(tx - left, ty - top, tx + w + right, ty + h + bottom);
        geometry.push_quad(quad, texels)?;
    }

    let baseline = positions
        .first()
        .map_or(pen, |&first| first + pen.to_vec2());
    Ok(PopulatedRun {
        geometry,
        bounding_rect: bounds.unwrap_or(Rect::ZERO),
        baseline,
    })
}

/// The pen position for a run drawn at `origin` by a font with the given ascent.
pub(crate) fn pen_for(origin: Point, ascent: f32) -> Point {
    origin - Vec2::new(0.0, f64::from(ascent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use alloc::vec;

    fn coord(x: u16, y: u16) -> AtlasCoord {
        AtlasCoord {
            x,
            y,
            w: 8,
            h: 12,
            baseline_x: 1,
            baseline_y: 10,
        }
    }

    fn three_glyphs() -> (Vec<u32>, Vec<Point>) {
        (
            vec![1, 2, 3],
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.5, 0.0),
                Point::new(20.25, 0.0),
            ],
        )
    }

    #[test]
    fn one_quad_per_glyph() {
        let (ids, positions) = three_glyphs();
        let run = build_glyph_quads(
            Point::new(0.0, 20.0),
            &ids,
            &positions,
            |_, _| Some(coord(0, 0)),
            0,
            Margins::ZERO,
        )
        .unwrap();
        let geometry = &run.geometry;
        assert_eq!(geometry.vertices().len(), 12);
        assert_eq!(geometry.indices().len(), 18);
        assert_eq!(&geometry.indices()[6..12], &[4, 6, 7, 7, 5, 4]);
        assert!(geometry.indices().iter().all(|&i| usize::from(i) < 12));
    }

    #[test]
    fn quad_placement_follows_baseline_offsets() {
        let run = build_glyph_quads(
            Point::new(0.0, 20.0),
            &[7],
            &[Point::new(3.75, 0.0)],
            |_, _| Some(coord(16, 32)),
            1,
            Margins::ZERO,
        )
        .unwrap();
        // x = floor(3.75) + 1 - 1, y = floor(20) - 10 - 1
        let v = run.geometry.vertices();
        assert_eq!((v[0].x, v[0].y), (3.0, 9.0));
        assert_eq!((v[3].x, v[3].y), (11.0, 21.0));
        assert_eq!((v[0].tx, v[0].ty), (16.0, 32.0));
        assert_eq!((v[3].tx, v[3].ty), (24.0, 44.0));
        assert_eq!(run.bounding_rect, Rect::new(4.0, 10.0, 12.0, 22.0));
        assert_eq!(run.baseline, Point::new(3.75, 20.0));
    }

    #[test]
    fn margins_grow_quads_but_not_bounds() {
        let (ids, positions) = three_glyphs();
        let lookup = |_: u32, _: Point| Some(coord(0, 0));
        let plain =
            build_glyph_quads(Point::ZERO, &ids, &positions, lookup, 0, Margins::ZERO).unwrap();
        let padded = build_glyph_quads(
            Point::ZERO,
            &ids,
            &positions,
            lookup,
            0,
            Margins::new(0, 2, 0, 2),
        )
        .unwrap();
        assert_eq!(plain.bounding_rect, padded.bounding_rect);
        let (a, b) = (plain.geometry.vertices(), padded.geometry.vertices());
        assert_eq!(b[0].y, a[0].y - 2.0);
        assert_eq!(b[0].ty, a[0].ty - 2.0);
        assert_eq!(b[3].y, a[3].y + 2.0);
    }

    #[test]
    fn missing_coordinate_is_an_empty_quad() {
        let run = build_glyph_quads(
            Point::ZERO,
            &[1, 2],
            &[Point::ZERO, Point::new(10.0, 0.0)],
            |id, _| (id == 1).then(|| coord(0, 0)),
            0,
            Margins::ZERO,
        )
        .unwrap();
        let v = &run.geometry.vertices()[4..];
        assert!(v.iter().all(|p| p.x == 10.0 && p.y == 0.0), "{v:?}");
        assert_eq!(run.bounding_rect, Rect::new(1.0, -10.0, 9.0, 2.0));
    }

    #[test]
    fn empty_run() {
        let pen = Point::new(5.0, 6.0);
        let run = build_glyph_quads(pen, &[], &[], |_, _| None, 0, Margins::ZERO).unwrap();
        assert!(run.geometry.is_empty());
        assert_eq!(run.bounding_rect, Rect::ZERO);
        assert_eq!(run.baseline, pen);
    }

    #[test]
    fn mismatched_lengths() {
        let err = build_glyph_quads(Point::ZERO, &[1, 2], &[Point::ZERO], |_, _| None, 0, Margins::ZERO)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MismatchedRun);
    }

    #[test]
    fn too_many_glyphs() {
        let ids = vec![0; MAX_GLYPHS_PER_RUN + 1];
        let positions = vec![Point::ZERO; MAX_GLYPHS_PER_RUN + 1];
        let err = build_glyph_quads(Point::ZERO, &ids, &positions, |_, _| None, 0, Margins::ZERO)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GeometryOverflow);

        let ids = vec![0; MAX_GLYPHS_PER_RUN];
        let positions = vec![Point::ZERO; MAX_GLYPHS_PER_RUN];
        let run =
            build_glyph_quads(Point::ZERO, &ids, &positions, |_, _| None, 0, Margins::ZERO).unwrap();
        assert_eq!(run.geometry.indices().last(), Some(&0xfffc));
    }

    #[test]
    fn reserve_quads_stops_at_index_range() {
        let mut geometry = Geometry::new();
        geometry.push_quad(Rect::ZERO, Rect::ZERO).unwrap();
        let err = geometry.reserve_quads(MAX_GLYPHS_PER_RUN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GeometryOverflow);
        geometry.reserve_quads(MAX_GLYPHS_PER_RUN - 1).unwrap();
        assert_eq!(geometry.quad_count(), 1);
    }

    #[test]
    fn pen_moves_up_by_ascent() {
        assert_eq!(pen_for(Point::new(2.0, 30.0), 12.0), Point::new(2.0, 18.0));
    }
}
