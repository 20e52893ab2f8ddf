// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use crate::atlas::CacheFormat;
use crate::font::FontId;

/// Error type for material construction, atlas population and geometry generation.
///
/// Carries a non-exhaustive [`ErrorKind`] plus whatever context was available at the point of
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    context: Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Font {
        font_id: FontId,
    },
    Atlas {
        glyph_id: u32,
        width: u16,
        height: u16,
        max_size: (u32, u32),
    },
    Blend {
        format: CacheFormat,
    },
    Run {
        glyphs: usize,
        positions: usize,
    },
    Geometry {
        glyphs: usize,
    },
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The font involved in the failure, if any.
    pub fn font_id(&self) -> Option<FontId> {
        match self.context {
            Context::Font { font_id } => Some(font_id),
            _ => None,
        }
    }

    /// The glyph that could not be placed in the atlas, if any.
    pub fn glyph_id(&self) -> Option<u32> {
        match self.context {
            Context::Atlas { glyph_id, .. } => Some(glyph_id),
            _ => None,
        }
    }

    pub(crate) fn invalid_font(font_id: FontId) -> Self {
        Self {
            kind: ErrorKind::InvalidFont,
            context: Context::Font { font_id },
        }
    }

    pub(crate) fn atlas_overflow(glyph_id: u32, width: u16, height: u16, max_size: (u32, u32)) -> Self {
        Self {
            kind: ErrorKind::AtlasOverflow,
            context: Context::Atlas {
                glyph_id,
                width,
                height,
                max_size,
            },
        }
    }

    pub(crate) fn unsupported_blend_feature(format: CacheFormat) -> Self {
        Self {
            kind: ErrorKind::UnsupportedBlendFeature,
            context: Context::Blend { format },
        }
    }

    pub(crate) fn mismatched_run(glyphs: usize, positions: usize) -> Self {
        Self {
            kind: ErrorKind::MismatchedRun,
            context: Context::Run { glyphs, positions },
        }
    }

    pub(crate) fn geometry_overflow(glyphs: usize) -> Self {
        Self {
            kind: ErrorKind::GeometryOverflow,
            context: Context::Geometry { glyphs },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.context {
            Context::Font { font_id } => {
                write!(f, "font {font_id:?} has no usable rendering engine")
            }
            Context::Atlas {
                glyph_id,
                width,
                height,
                max_size,
            } => write!(
                f,
                "glyph {glyph_id} ({width}x{height}) does not fit in an atlas of at most {}x{}",
                max_size.0, max_size.1
            ),
            Context::Blend { format } => write!(
                f,
                "{format:?} glyphs need constant blend color support, which is unavailable"
            ),
            Context::Run { glyphs, positions } => write!(
                f,
                "glyph run has {glyphs} glyph ids but {positions} positions"
            ),
            Context::Geometry { glyphs } => write!(
                f,
                "{glyphs} glyphs exceed the 16-bit index range of a single geometry"
            ),
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The font has no rendering engine that can produce glyph masks.
    InvalidFont,

    /// The glyph atlas could not accommodate the requested glyphs, even at its maximum size.
    ///
    /// Nothing is retried internally: the caller is expected to evict (or grow the limit)
    /// and populate again.
    AtlasOverflow,

    /// Sub-pixel (RGB) glyphs were requested but the constant blend color feature is missing.
    UnsupportedBlendFeature,

    /// Glyph ids and glyph positions had different lengths.
    MismatchedRun,

    /// The run has more glyphs than can be indexed with 16-bit indices.
    GeometryOverflow,
}
