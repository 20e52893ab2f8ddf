// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `glyph_mask` and `border_image`.
//!
//! - The `util` module contains fonts, glyph runs and command filters shared by the tests.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests, so that shared helpers live in one place.
//! - Put the "topic" of a test at the start of its name, e.g. `atlas_overflow_rolls_back`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod atlas;
mod util;
