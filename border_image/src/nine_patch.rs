// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quad geometry for border images.

#[cfg(feature = "libm")]
#[allow(unused_imports, reason = "unused when std provides the inherent float methods")]
use core_maths::CoreFloat;

use alloc::vec::Vec;

use glyph_mask::kurbo::{Rect, Size};
use glyph_mask::{Error, Geometry};

use crate::{ScaleGrid, TileMode};

/// Texture sampling used when the image is scaled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Filtering {
    /// Nearest texel.
    #[default]
    Nearest,
    /// Bilinear.
    Linear,
}

impl Filtering {
    /// [`Linear`](Self::Linear) for smooth scaling, [`Nearest`](Self::Nearest) otherwise.
    pub fn from_smooth(smooth: bool) -> Self {
        if smooth { Self::Linear } else { Self::Nearest }
    }
}

/// Parameters of a border image drawn into a target rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NinePatch {
    rect: Rect,
    inner_rect: Option<Rect>,
    filtering: Filtering,
    horizontal_tile_mode: TileMode,
    vertical_tile_mode: TileMode,
    mirror: bool,
}

impl NinePatch {
    /// Creates a patch filling `rect` with the whole image stretched.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            inner_rect: None,
            filtering: Filtering::Nearest,
            horizontal_tile_mode: TileMode::Stretch,
            vertical_tile_mode: TileMode::Stretch,
            mirror: false,
        }
    }

    /// The scalable middle of an image of `image_size`, in image pixels.
    ///
    /// Without a grid the whole image is the middle. The middle is never narrower or shorter
    /// than one pixel.
    pub fn inner_rect(image_size: Size, grid: Option<ScaleGrid>) -> Rect {
        let Some(grid) = grid else {
            return Rect::from_origin_size((0.0, 0.0), image_size);
        };
        let (left, top) = (f64::from(grid.left), f64::from(grid.top));
        let (right, bottom) = (f64::from(grid.right), f64::from(grid.bottom));
        Rect::from_origin_size(
            (left, top),
            (
                (image_size.width - right - left).max(1.0),
                (image_size.height - bottom - top).max(1.0),
            ),
        )
    }

    /// Sets the scalable middle of the image, see [`inner_rect`](Self::inner_rect).
    pub fn with_inner_rect(mut self, inner_rect: Rect) -> Self {
        self.inner_rect = Some(inner_rect);
        self
    }

    /// Sets the texture filtering.
    pub fn with_filtering(mut self, filtering: Filtering) -> Self {
        self.filtering = filtering;
        self
    }

    /// Sets how the middle parts fill their space horizontally and vertically.
    pub fn with_tile_modes(mut self, horizontal: TileMode, vertical: TileMode) -> Self {
        self.horizontal_tile_mode = horizontal;
        self.vertical_tile_mode = vertical;
        self
    }

    /// Flips the image horizontally.
    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    /// The target rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The texture filtering.
    pub fn filtering(&self) -> Filtering {
        self.filtering
    }

    /// Horizontal and vertical tile modes.
    pub fn tile_modes(&self) -> (TileMode, TileMode) {
        (self.horizontal_tile_mode, self.vertical_tile_mode)
    }

    /// Whether the image is flipped horizontally.
    pub fn mirror(&self) -> bool {
        self.mirror
    }

    /// Builds the quads drawing an image of `texture_size` pixels.
    ///
    /// Texture coordinates are normalized to `0..=1`. An empty target or texture yields empty
    /// geometry.
    pub fn geometry(&self, texture_size: Size) -> Result<Geometry, Error> {
        let mut geometry = Geometry::new();
        if self.rect.width() <= 0.0
            || self.rect.height() <= 0.0
            || texture_size.width <= 0.0
            || texture_size.height <= 0.0
        {
            return Ok(geometry);
        }
        let inner = self
            .inner_rect
            .unwrap_or_else(|| Rect::from_origin_size((0.0, 0.0), texture_size));
        let columns = Axis {
            target: (self.rect.x0, self.rect.x1),
            image: texture_size.width,
            inner: (inner.x0, inner.width()),
        }
        .layout(self.horizontal_tile_mode);
        let rows = Axis {
            target: (self.rect.y0, self.rect.y1),
            image: texture_size.height,
            inner: (inner.y0, inner.height()),
        }
        .layout(self.vertical_tile_mode);
        geometry.reserve_quads(
            to_count(columns.segment_count()).saturating_mul(to_count(rows.segment_count())),
        )?;
        let (columns, rows) = (columns.segments(), rows.segments());
        let tx = |t: f64| {
            let t = t / texture_size.width;
            if self.mirror { 1.0 - t } else { t }
        };
        for row in &rows {
            for column in &columns {
                geometry.push_quad(
                    Rect::new(column.p0, row.p0, column.p1, row.p1),
                    Rect::new(
                        tx(column.t0),
                        row.t0 / texture_size.height,
                        tx(column.t1),
                        row.t1 / texture_size.height,
                    ),
                )?;
            }
        }
        Ok(geometry)
    }
}

/// One direction of the layout: target span, image length and the image's middle part.
#[derive(Copy, Clone, Debug)]
struct Axis {
    target: (f64, f64),
    image: f64,
    inner: (f64, f64),
}

/// A target span and the image span drawn into it.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Segment {
    p0: f64,
    p1: f64,
    t0: f64,
    t1: f64,
}

/// Middle parts shorter than this, in image pixels, are stretched instead of tiled.
const MIN_TILE_LEN: f64 = 1e-3;

impl Axis {
    fn layout(self, mode: TileMode) -> Layout {
        let (start, end) = self.target;
        let (inner_start, inner_len) = self.inner;
        let head = inner_start.clamp(0.0, self.image);
        let tail = (self.image - inner_start - inner_len).max(0.0);
        let length = end - start;
        let scale = if head + tail > length {
            length / (head + tail)
        } else {
            1.0
        };
        let (head_len, tail_len) = (head * scale, tail * scale);
        let middle_len = length - head_len - tail_len;
        let mode = if inner_len < MIN_TILE_LEN {
            TileMode::Stretch
        } else {
            mode
        };
        let tiles = if middle_len <= 0.0 || inner_len <= 0.0 {
            0.0
        } else {
            match mode {
                TileMode::Stretch => 1.0,
                TileMode::Repeat => (middle_len / inner_len).ceil(),
                TileMode::Round => (middle_len / inner_len).round().max(1.0),
            }
        };
        Layout {
            axis: self,
            mode,
            head,
            tail,
            head_len,
            tail_len,
            tiles,
        }
    }
}

/// Border sizes and middle tiling of one axis, decided before any segment is emitted.
#[derive(Copy, Clone, Debug)]
struct Layout {
    axis: Axis,
    mode: TileMode,
    head: f64,
    tail: f64,
    head_len: f64,
    tail_len: f64,
    tiles: f64,
}

impl Layout {
    fn segment_count(&self) -> f64 {
        let border = |len: f64| if len > 0.0 { 1.0 } else { 0.0 };
        border(self.head_len) + self.tiles + border(self.tail_len)
    }

    fn segments(&self) -> Vec<Segment> {
        let (start, end) = self.axis.target;
        let (inner_start, inner_len) = self.axis.inner;
        let mut out = Vec::with_capacity(to_count(self.segment_count()));
        if self.head_len > 0.0 {
            out.push(Segment {
                p0: start,
                p1: start + self.head_len,
                t0: 0.0,
                t1: self.head,
            });
        }
        let (middle_start, middle_end) = (start + self.head_len, end - self.tail_len);
        let middle_len = middle_end - middle_start;
        let tiles = to_count(self.tiles);
        if tiles > 0 {
            let inner_end = inner_start + inner_len;
            match self.mode {
                TileMode::Stretch => out.push(Segment {
                    p0: middle_start,
                    p1: middle_end,
                    t0: inner_start,
                    t1: inner_end,
                }),
                TileMode::Repeat => {
                    for i in 0..tiles {
                        let p0 = middle_start + inner_len * i as f64;
                        let len = inner_len.min(middle_end - p0);
                        out.push(Segment {
                            p0,
                            p1: p0 + len,
                            t0: inner_start,
                            t1: inner_start + len,
                        });
                    }
                }
                TileMode::Round => {
                    let size = middle_len / tiles as f64;
                    for i in 0..tiles {
                        let p0 = middle_start + size * i as f64;
                        out.push(Segment {
                            p0,
                            p1: p0 + size,
                            t0: inner_start,
                            t1: inner_end,
                        });
                    }
                }
            }
        }
        if self.tail_len > 0.0 {
            out.push(Segment {
                p0: end - self.tail_len,
                p1: end,
                t0: self.axis.image - self.tail,
                t1: self.axis.image,
            });
        }
        out
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "segment counts are non-negative whole numbers; larger ones saturate and are rejected"
)]
fn to_count(n: f64) -> usize {
    n as usize
}
