// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `bytemuck` trait impls for vertex data.

#![allow(
    unsafe_code,
    reason = "The `bytemuck` marker traits are `unsafe` and require `unsafe impl`."
)]

use crate::TexturedPoint2D;
use bytemuck::{Pod, Zeroable};

// Safety: The struct is `repr(C)` with four `f32` fields and no padding; all zeroes is valid.
unsafe impl Zeroable for TexturedPoint2D {}

// Safety: The struct is `repr(C)`, `Copy`, has no padding, and every bit pattern of its
// `f32` fields is a valid value.
unsafe impl Pod for TexturedPoint2D {}
