// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas sharing, growth and overflow recovery as seen through materials.

use glyph_mask::{
    AtlasConfig, AtlasRegistry, CacheFormat, ErrorKind, Margins, TextMaskMaterial,
};

use crate::util::{glyph_run, origin, test_font};

fn small_registry(max: u32) -> AtlasRegistry {
    AtlasRegistry::with_config(AtlasConfig {
        initial_size: (16, 16),
        max_size: (max, max),
        padding: 0,
    })
}

#[test]
fn atlas_shared_per_font_and_format() {
    let mut registry = AtlasRegistry::new();
    let font = test_font(1, None);
    let a = TextMaskMaterial::new(&font, None, &mut registry).unwrap();
    let b = TextMaskMaterial::new(&font, Some(CacheFormat::Alpha8), &mut registry).unwrap();
    let c = TextMaskMaterial::new(&font, Some(CacheFormat::Rgb24), &mut registry).unwrap();
    let d = TextMaskMaterial::new(&test_font(2, None), None, &mut registry).unwrap();

    assert_eq!(a.atlas_id(), b.atlas_id());
    assert_ne!(a.atlas_id(), c.atlas_id());
    assert_ne!(a.atlas_id(), d.atlas_id());
    assert_eq!(registry.live_count(), 3);

    // Glyphs populated through one material are visible to the other.
    a.populate_run(origin(), &glyph_run(2), Margins::ZERO).unwrap();
    assert_eq!(b.atlas().borrow().stats().entries, 2);

    drop((c, d));
    registry.purge();
    assert_eq!(registry.live_count(), 1);
}

#[test]
fn atlas_growth_reported_once() {
    let mut registry = small_registry(256);
    let material = TextMaskMaterial::new(&test_font(1, None), None, &mut registry).unwrap();

    material.populate_run(origin(), &glyph_run(1), Margins::ZERO).unwrap();
    assert!(material.ensure_up_to_date(), "first sight of the texture");
    assert!(!material.ensure_up_to_date(), "nothing changed");

    material.populate_run(origin(), &glyph_run(1), Margins::ZERO).unwrap();
    assert!(!material.ensure_up_to_date(), "cached glyphs do not touch the texture");

    let before = material.texture().unwrap();
    material.populate_run(origin(), &glyph_run(8), Margins::ZERO).unwrap();
    let atlas = material.atlas().borrow();
    assert!(atlas.height() > 16, "eight 8x12 glyphs do not fit in 16x16");
    drop(atlas);

    assert!(material.ensure_up_to_date(), "the atlas grew");
    assert!(!material.ensure_up_to_date(), "growth is reported once");
    assert_ne!(material.texture().unwrap().id, before.id);
}

#[test]
fn atlas_overflow_rolls_back_and_recovers_after_clear() {
    let mut registry = small_registry(16);
    let material = TextMaskMaterial::new(&test_font(1, None), None, &mut registry).unwrap();

    // Only two 8x12 glyphs fit in a 16x16 atlas.
    let err = material
        .populate_run(origin(), &glyph_run(3), Margins::ZERO)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AtlasOverflow);
    assert_eq!(err.glyph_id(), Some(3));
    assert_eq!(material.atlas().borrow().stats().entries, 0);

    material.populate_run(origin(), &glyph_run(1), Margins::ZERO).unwrap();
    let ids = [2, 3];
    let positions = [origin(), origin()];
    let err = material
        .populate(origin(), &ids, &positions, Margins::ZERO)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AtlasOverflow);
    assert_eq!(material.atlas().borrow().stats().entries, 1);

    // The caller evicts and retries.
    material.atlas().borrow_mut().clear();
    let populated = material
        .populate(origin(), &ids, &positions, Margins::ZERO)
        .unwrap();
    assert_eq!(populated.geometry.quad_count(), 2);
    assert_eq!(material.atlas().borrow().stats().entries, 2);
}
