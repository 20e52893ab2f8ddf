// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// How the edges and the center of a border image fill their space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileMode {
    /// Scale the source part to fit.
    #[default]
    Stretch,
    /// Tile the source part at its natural size, cropping the last tile.
    Repeat,
    /// Tile the source part, scaling the tiles so that a whole number of them fits.
    Round,
}

impl TileMode {
    /// Parses a tile rule name as written in `.sci` files, without quotes.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Stretch" => Some(Self::Stretch),
            "Repeat" => Some(Self::Repeat),
            "Round" => Some(Self::Round),
            _ => None,
        }
    }
}

/// Widths of the four borders of a border image, in source image pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScaleGrid {
    /// Width of the left border.
    pub left: u32,
    /// Height of the top border.
    pub top: u32,
    /// Width of the right border.
    pub right: u32,
    /// Height of the bottom border.
    pub bottom: u32,
}

impl ScaleGrid {
    /// Creates a grid from its four borders.
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same border on every edge.
    pub const fn uniform(border: u32) -> Self {
        Self::new(border, border, border, border)
    }

    /// Whether every border is zero.
    pub const fn is_null(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }
}
