// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph atlas cache with shelf packing and incremental growth.

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::key::GlyphKey;
use super::region::{AtlasCoord, TextureId, TextureRef};
use super::{AtlasId, CacheFormat};
use crate::Error;
use crate::font::FontEngine;

/// Sizing policy for newly created atlases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Texture size (width, height) of a fresh atlas.
    pub initial_size: (u32, u32),
    /// The atlas never grows beyond this size.
    pub max_size: (u32, u32),
    /// Empty pixels kept between neighbouring glyph images.
    pub padding: u16,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            initial_size: (256, 256),
            max_size: (4096, 4096),
            padding: 1,
        }
    }
}

/// Result of looking up a glyph in an atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The glyph image is in the texture at this location.
    Ready(AtlasCoord),
    /// Space is reserved at this location but the glyph image has not been filled in yet.
    Pending(AtlasCoord),
    /// The glyph was never populated (or was evicted).
    Absent,
}

impl Lookup {
    /// The reserved location, whether or not it has been filled.
    pub fn coord(self) -> Option<AtlasCoord> {
        match self {
            Self::Ready(coord) | Self::Pending(coord) => Some(coord),
            Self::Absent => None,
        }
    }
}

/// Counters describing the contents and effectiveness of an atlas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphCacheStats {
    /// Number of glyphs with reserved space, filled or not.
    pub entries: usize,
    /// Number of glyphs waiting for [`GlyphCache::fill_pending_glyphs`].
    pub pending: usize,
    /// Populate requests for glyphs that were already present.
    pub hits: u64,
    /// Populate requests that had to reserve new space.
    pub misses: u64,
}

/// Common interface for glyph atlas caches.
///
/// Materials only see this trait, so a backend that rasterizes directly into GPU memory can
/// stand in for the in-memory [`GlyphAtlas`].
pub trait GlyphCache: Debug {
    /// The pixel format of the atlas texture.
    fn cache_format(&self) -> CacheFormat;

    /// Look up a glyph.
    fn lookup(&self, key: GlyphKey) -> Lookup;

    /// Reserve atlas space for every key that is not yet present.
    ///
    /// Either every key gets a location or, on [`AtlasOverflow`](crate::ErrorKind::AtlasOverflow),
    /// the atlas is left exactly as it was before the call.
    fn populate(&mut self, engine: &dyn FontEngine, keys: &[GlyphKey]) -> Result<(), Error>;

    /// Render the glyph images of all pending entries. Returns how many were filled.
    fn fill_pending_glyphs(&mut self) -> usize;

    /// Current texture width in pixels.
    fn width(&self) -> u32;

    /// Current texture height in pixels.
    fn height(&self) -> u32;

    /// A non-owning reference to the current texture.
    fn texture(&self) -> TextureRef;

    /// Evict every glyph.
    fn clear(&mut self);

    /// Cache statistics.
    fn stats(&self) -> GlyphCacheStats;
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    coord: AtlasCoord,
    filled: bool,
}

#[derive(Clone, Copy, Debug)]
struct Shelf {
    y: u32,
    height: u32,
    cursor_x: u32,
}

/// Row based rectangle packer.
///
/// Glyphs of similar height share a shelf; a new shelf opens below the last one when no
/// existing shelf fits.
#[derive(Clone, Debug)]
struct ShelfPacker {
    width: u32,
    height: u32,
    padding: u32,
    next_y: u32,
    shelves: SmallVec<[Shelf; 8]>,
}

impl ShelfPacker {
    fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            padding,
            next_y: padding,
            shelves: SmallVec::new(),
        }
    }

    fn allocate(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        let padded_width = width + self.padding;
        let mut best: Option<usize> = None;
        for (index, shelf) in self.shelves.iter().enumerate() {
            if shelf.height < height || shelf.cursor_x + padded_width > self.width {
                continue;
            }
            if best.is_none_or(|b| self.shelves[b].height > shelf.height) {
                best = Some(index);
            }
        }
        if let Some(index) = best {
            let shelf = &mut self.shelves[index];
            let position = (shelf.cursor_x, shelf.y);
            shelf.cursor_x += padded_width;
            return Some(position);
        }
        if self.padding + padded_width > self.width || self.next_y + height + self.padding > self.height
        {
            return None;
        }
        let shelf = Shelf {
            y: self.next_y,
            height,
            cursor_x: self.padding + padded_width,
        };
        self.next_y += height + self.padding;
        self.shelves.push(shelf);
        Some((self.padding, shelf.y))
    }
}

/// An in-memory glyph atlas.
///
/// Tracks where every glyph lives in a single texture and which glyphs still need their images
/// rendered. Pixel storage belongs to whatever backend consumes [`texture`](GlyphCache::texture).
#[derive(Debug)]
pub struct GlyphAtlas {
    id: AtlasId,
    format: CacheFormat,
    config: AtlasConfig,
    packer: ShelfPacker,
    texture: TextureId,
    entries: HashMap<GlyphKey, Entry>,
    pending: Vec<GlyphKey>,
    hits: u64,
    misses: u64,
}

impl GlyphAtlas {
    /// Creates an empty atlas at the configured initial size.
    pub fn new(id: AtlasId, format: CacheFormat, config: AtlasConfig) -> Self {
        let (width, height) = clamp_size(config.initial_size, config.max_size);
        Self {
            id,
            format,
            config,
            packer: ShelfPacker::new(width, height, u32::from(config.padding)),
            texture: TextureId::new(),
            entries: HashMap::new(),
            pending: Vec::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// The identity assigned to this atlas by its registry.
    pub fn id(&self) -> AtlasId {
        self.id
    }

    /// Doubles the texture height, or the width once the height is at its limit.
    ///
    /// A glyph wider than the texture only ever grows the width.
    fn grow(&mut self, glyph_width: u32) -> bool {
        let (max_width, max_height) = self.config.max_size;
        let packer = &mut self.packer;
        let too_narrow = packer
            .padding
            .saturating_mul(2)
            .saturating_add(glyph_width)
            > packer.width;
        if too_narrow || packer.height >= max_height {
            if packer.width >= max_width {
                return false;
            }
            packer.width = packer.width.saturating_mul(2).min(max_width);
        } else {
            packer.height = packer.height.saturating_mul(2).min(max_height);
        }
        self.texture = TextureId::new();
        log::debug!(
            "glyph atlas {:?} grew to {}x{}",
            self.id,
            packer.width,
            packer.height
        );
        true
    }

    fn reserve(&mut self, engine: &dyn FontEngine, key: GlyphKey) -> Result<AtlasCoord, Error> {
        let metrics = engine.glyph_metrics(key.glyph_id, key.subpixel, self.format);
        let mut coord = AtlasCoord {
            x: 0,
            y: 0,
            w: metrics.width,
            h: metrics.height,
            baseline_x: metrics.bearing_x,
            baseline_y: metrics.bearing_y,
        };
        if coord.is_empty() {
            return Ok(coord);
        }
        loop {
            if let Some((x, y)) = self
                .packer
                .allocate(u32::from(metrics.width), u32::from(metrics.height))
            {
                // Positions that do not fit in 16 bits are treated as overflow.
                if let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) {
                    coord.x = x;
                    coord.y = y;
                    return Ok(coord);
                }
                break;
            }
            if !self.grow(u32::from(metrics.width)) {
                break;
            }
        }
        Err(Error::atlas_overflow(
            key.glyph_id,
            metrics.width,
            metrics.height,
            self.config.max_size,
        ))
    }
}

impl GlyphCache for GlyphAtlas {
    fn cache_format(&self) -> CacheFormat {
        self.format
    }

    fn lookup(&self, key: GlyphKey) -> Lookup {
        match self.entries.get(&key) {
            Some(entry) if entry.filled => Lookup::Ready(entry.coord),
            Some(entry) => Lookup::Pending(entry.coord),
            None => Lookup::Absent,
        }
    }

    fn populate(&mut self, engine: &dyn FontEngine, keys: &[GlyphKey]) -> Result<(), Error> {
        let packer = self.packer.clone();
        let texture = self.texture;
        let pending_len = self.pending.len();
        let (hits, misses) = (self.hits, self.misses);

        for &key in keys {
            if self.entries.contains_key(&key) {
                self.hits += 1;
                continue;
            }
            self.misses += 1;
            match self.reserve(engine, key) {
                Ok(coord) => {
                    self.entries.insert(
                        key,
                        Entry {
                            coord,
                            filled: false,
                        },
                    );
                    self.pending.push(key);
                }
                Err(err) => {
                    for key in self.pending.drain(pending_len..) {
                        self.entries.remove(&key);
                    }
                    self.packer = packer;
                    self.texture = texture;
                    self.hits = hits;
                    self.misses = misses;
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn fill_pending_glyphs(&mut self) -> usize {
        let count = self.pending.len();
        for key in self.pending.drain(..) {
            if let Some(entry) = self.entries.get_mut(&key) {
                entry.filled = true;
            }
        }
        if count > 0 {
            log::debug!("glyph atlas {:?} filled {count} glyphs", self.id);
        }
        count
    }

    fn width(&self) -> u32 {
        self.packer.width
    }

    fn height(&self) -> u32 {
        self.packer.height
    }

    fn texture(&self) -> TextureRef {
        TextureRef {
            id: self.texture,
            width: self.packer.width,
            height: self.packer.height,
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.pending.clear();
        self.packer = ShelfPacker::new(
            self.packer.width,
            self.packer.height,
            u32::from(self.config.padding),
        );
        // The old texture contents are meaningless now.
        self.texture = TextureId::new();
    }

    fn stats(&self) -> GlyphCacheStats {
        GlyphCacheStats {
            entries: self.entries.len(),
            pending: self.pending.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

fn clamp_size(size: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    (size.0.clamp(1, max.0.max(1)), size.1.clamp(1, max.1.max(1)))
}
