// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Border images split a source image into a 3x3 grid: the corners keep their size, the edges
//! and the center are stretched or tiled to fill the target rectangle.
//!
//! - [`ScaleGrid`] holds the four border widths and [`TileMode`] how the middle parts fill
//!   their space.
//! - [`GridScaledImage`] parses `.sci` descriptor files.
//! - [`NinePatch`] turns all of that into textured quads, sharing the vertex layout of glyph
//!   geometry.
//!
//! ## Example
//!
//! ```
//! use border_image::{GridScaledImage, NinePatch, TileMode};
//! use glyph_mask::kurbo::{Rect, Size};
//!
//! let sci = GridScaledImage::parse(
//!     "border.left: 4\nborder.right: 4\nborder.top: 4\nborder.bottom: 4\nsource: frame.png\n",
//! )
//! .unwrap();
//! assert_eq!(sci.source(), "frame.png");
//! assert_eq!(sci.horizontal_tile_rule(), TileMode::Stretch);
//!
//! let image = Size::new(16.0, 16.0);
//! let patch = NinePatch::new(Rect::new(0.0, 0.0, 100.0, 40.0))
//!     .with_inner_rect(NinePatch::inner_rect(image, Some(sci.grid())));
//! let geometry = patch.geometry(image).unwrap();
//! assert_eq!(geometry.quad_count(), 9);
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): Get floating point functions from the standard library.
//! - `libm`: Use floating point implementations from [libm].
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
compile_error!("border_image requires either the `std` or `libm` feature to be enabled");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use core_maths as _;

extern crate alloc;

mod nine_patch;
mod scale_grid;
mod sci;

pub use nine_patch::{Filtering, NinePatch};
pub use scale_grid::{ScaleGrid, TileMode};
pub use sci::{GridScaledImage, ParseSciError, ParseSciErrorKind};
