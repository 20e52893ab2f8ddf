// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph Mask turns positioned glyph runs into textured quads sampled from a shared glyph atlas,
//! and picks the text shader variant that draws them.
//!
//! The pipeline is:
//!
//! 1. A [`TextMaskMaterial`] (or one of its styled variants) acquires a glyph atlas from an
//!    [`AtlasRegistry`], keyed by font and [`CacheFormat`].
//! 2. [`TextMaskMaterial::populate`] reserves atlas space for every glyph in a run and emits
//!    one quad per glyph into a [`Geometry`].
//! 3. A [`TextRenderer`] sorts glyph nodes into batches, binds the [`ShaderVariant`] for each
//!    material kind and uploads only the uniforms that changed since the previous draw.
//!
//! The GPU itself is reached through the [`GraphicsContext`] trait, so programs, textures and
//! blend state stay opaque to this crate.
//!
//! ## Features
//!
//! - `std` (enabled by default): Get floating point functions from the standard library
//!   (likely using your target's libc).
//! - `libm`: Use floating point implementations from [libm].
//! - `skrifa` (enabled by default): Provides [`SkrifaFontEngine`], a font engine that reads
//!   metrics from font data with skrifa.
//!
//! At least one of `std` and `libm` is required; `std` overrides `libm`.
//!
//! [libm]: https://crates.io/crates/libm

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("glyph_mask requires either the `std` or `libm` feature to be enabled");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use core_maths as _;

extern crate alloc;

pub use peniko;
pub use peniko::{color, kurbo};

pub mod atlas;
mod error;
mod font;
mod geometry;
mod impl_bytemuck;
pub mod gpu;
mod material;
mod node;
mod renderer;
pub mod shader;
#[cfg(feature = "skrifa")]
mod skrifa_engine;

pub use atlas::{AtlasConfig, AtlasHandle, AtlasId, AtlasRegistry, CacheFormat};
pub use error::{Error, ErrorKind};
pub use font::{FixedMetricsEngine, Font, FontEngine, FontId, Glyph, GlyphRun};
pub use geometry::{
    Geometry, MAX_GLYPHS_PER_RUN, Margins, PopulatedRun, TexturedPoint2D, build_glyph_quads,
};
pub use gpu::{Capabilities, GraphicsContext, RenderState};
pub use material::{GlyphMaterial, MaterialKind, StyleEffect, StyledTextMaterial, TextMaskMaterial};
pub use node::{GlyphNode, TextStyle};
pub use renderer::{RenderStats, TextRenderer};
pub use shader::{ShaderVariant, TextShader};
#[cfg(feature = "skrifa")]
pub use skrifa_engine::SkrifaFontEngine;
