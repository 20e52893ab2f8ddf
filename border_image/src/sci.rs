// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parsing of `.sci` border image descriptors.
//!
//! A descriptor is a list of `key: value` lines:
//!
//! ```text
//! # comment
//! border.left: 10
//! border.top: 10
//! border.right: 10
//! border.bottom: 10
//! source: picture.png
//! horizontalTileRule: "Round"
//! verticalTileRule: Repeat
//! ```

use alloc::string::{String, ToString};
use core::fmt;

use crate::{ScaleGrid, TileMode};

/// Kinds of errors that can occur when parsing `.sci` descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseSciErrorKind {
    /// A non-comment line has no `key: value` form.
    InvalidSyntax,
    /// A border is missing or negative, or the source is empty.
    Incomplete,
}

/// Error returned when parsing `.sci` descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseSciError {
    kind: ParseSciErrorKind,
    line: Option<usize>,
}

impl ParseSciError {
    const fn new(kind: ParseSciErrorKind, line: Option<usize>) -> Self {
        Self { kind, line }
    }

    /// Returns the error kind.
    pub const fn kind(self) -> ParseSciErrorKind {
        self.kind
    }

    /// Returns the 1-based line the error was detected on, if it belongs to one line.
    pub const fn line(self) -> Option<usize> {
        self.line
    }
}

impl fmt::Display for ParseSciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            ParseSciErrorKind::InvalidSyntax => "invalid .sci syntax",
            ParseSciErrorKind::Incomplete => "incomplete .sci descriptor",
        };
        match self.line {
            Some(line) => write!(f, "{msg} on line {line}"),
            None => f.write_str(msg),
        }
    }
}

impl core::error::Error for ParseSciError {}

/// A parsed `.sci` descriptor: a scale grid, tile rules and the image it applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridScaledImage {
    grid: ScaleGrid,
    source: String,
    horizontal_tile_rule: TileMode,
    vertical_tile_rule: TileMode,
}

impl GridScaledImage {
    /// Parses a descriptor.
    ///
    /// Blank lines and lines starting with `#` are skipped. Unknown keys are ignored and
    /// unknown tile rules fall back to [`TileMode::Stretch`].
    ///
    /// # Example
    /// ```
    /// use border_image::{GridScaledImage, ParseSciErrorKind};
    ///
    /// let err = GridScaledImage::parse("border.left 3").unwrap_err();
    /// assert_eq!(err.kind(), ParseSciErrorKind::InvalidSyntax);
    /// assert_eq!(err.line(), Some(1));
    /// ```
    pub fn parse(s: &str) -> Result<Self, ParseSciError> {
        let mut borders: [Option<i64>; 4] = [None; 4];
        let mut source = String::new();
        let mut horizontal_tile_rule = TileMode::Stretch;
        let mut vertical_tile_rule = TileMode::Stretch;

        for (index, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let invalid = || ParseSciError::new(ParseSciErrorKind::InvalidSyntax, Some(index + 1));
            let (key, value) = line.split_once(':').ok_or_else(invalid)?;
            let (key, value) = (key.trim(), value.trim());
            let border = match key {
                "border.left" => Some(0),
                "border.top" => Some(1),
                "border.right" => Some(2),
                "border.bottom" => Some(3),
                _ => None,
            };
            if let Some(border) = border {
                borders[border] = Some(value.parse().map_err(|_| invalid())?);
                continue;
            }
            match key {
                "source" => source = unquote(value).to_string(),
                "horizontalTileRule" => horizontal_tile_rule = tile_rule(value),
                "verticalTileRule" => vertical_tile_rule = tile_rule(value),
                _ => log::debug!("ignoring unknown .sci key {key:?}"),
            }
        }

        let incomplete = ParseSciError::new(ParseSciErrorKind::Incomplete, None);
        let [left, top, right, bottom] =
            borders.map(|border| border.and_then(|b| u32::try_from(b).ok()));
        let (Some(left), Some(top), Some(right), Some(bottom)) = (left, top, right, bottom) else {
            return Err(incomplete);
        };
        if source.is_empty() {
            return Err(incomplete);
        }
        Ok(Self {
            grid: ScaleGrid::new(left, top, right, bottom),
            source,
            horizontal_tile_rule,
            vertical_tile_rule,
        })
    }

    /// The border widths.
    pub fn grid(&self) -> ScaleGrid {
        self.grid
    }

    /// The image path, relative to the descriptor.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// How the top and bottom edges and the center tile horizontally.
    pub fn horizontal_tile_rule(&self) -> TileMode {
        self.horizontal_tile_rule
    }

    /// How the left and right edges and the center tile vertically.
    pub fn vertical_tile_rule(&self) -> TileMode {
        self.vertical_tile_rule
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn tile_rule(value: &str) -> TileMode {
    let rule = unquote(value);
    TileMode::parse(rule).unwrap_or_else(|| {
        log::warn!("unknown tile rule {rule:?} in .sci file, using Stretch");
        TileMode::Stretch
    })
}
