// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sharing of glyph atlases between materials.

use alloc::rc::{Rc, Weak};
use core::cell::{Ref, RefCell, RefMut};

use hashbrown::HashMap;

use super::cache::{AtlasConfig, GlyphAtlas, GlyphCache};
use super::CacheFormat;
use crate::font::FontId;

/// Registry-assigned identity of an atlas.
///
/// Ids are handed out in creation order and never reused by the same registry, which makes
/// them a stable sort key for batching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AtlasId(u32);

impl AtlasId {
    /// Creates an atlas id from a raw value.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

/// Shared ownership of one glyph atlas.
#[derive(Clone, Debug)]
pub struct AtlasHandle {
    id: AtlasId,
    cache: Rc<RefCell<dyn GlyphCache>>,
}

impl AtlasHandle {
    /// The atlas identity.
    pub fn id(&self) -> AtlasId {
        self.id
    }

    /// Immutably borrows the atlas.
    ///
    /// # Panics
    ///
    /// Panics if the atlas is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, dyn GlyphCache> {
        self.cache.borrow()
    }

    /// Mutably borrows the atlas.
    ///
    /// # Panics
    ///
    /// Panics if the atlas is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn GlyphCache> {
        self.cache.borrow_mut()
    }

    /// Whether two handles refer to the same atlas.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cache, &other.cache)
    }
}

#[derive(Debug)]
struct Registered {
    id: AtlasId,
    cache: Weak<RefCell<dyn GlyphCache>>,
}

/// Glyph atlases keyed by font and cache format.
///
/// The registry holds weak references only: an atlas lives as long as the longest lived
/// [`AtlasHandle`] to it, and a later request for the same key creates a fresh atlas.
#[derive(Debug, Default)]
pub struct AtlasRegistry {
    config: AtlasConfig,
    next_id: u32,
    caches: HashMap<(FontId, CacheFormat), Registered>,
}

impl AtlasRegistry {
    /// Creates a registry whose atlases use the default [`AtlasConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry whose atlases use `config`.
    pub fn with_config(config: AtlasConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The sizing policy for new atlases.
    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Returns the live atlas for `font` and `format`, creating one if needed.
    ///
    /// A registered atlas with a different texture format is replaced.
    pub fn acquire(&mut self, font: FontId, format: CacheFormat) -> AtlasHandle {
        if let Some(registered) = self.caches.get(&(font, format)) {
            if let Some(cache) = registered.cache.upgrade() {
                if cache.borrow().cache_format() == format {
                    return AtlasHandle {
                        id: registered.id,
                        cache,
                    };
                }
                log::debug!(
                    "replacing atlas {:?} of font {font:?}: format mismatch",
                    registered.id
                );
            }
        }
        let id = self.allocate_id();
        let cache: Rc<RefCell<dyn GlyphCache>> =
            Rc::new(RefCell::new(GlyphAtlas::new(id, format, self.config)));
        self.insert(font, format, id, &cache);
        AtlasHandle { id, cache }
    }

    /// Registers an externally implemented atlas for `font` and `format`.
    ///
    /// The registry keeps only a weak reference; hold on to the returned handle.
    pub fn register(
        &mut self,
        font: FontId,
        format: CacheFormat,
        cache: Rc<RefCell<dyn GlyphCache>>,
    ) -> AtlasHandle {
        let id = self.allocate_id();
        self.insert(font, format, id, &cache);
        AtlasHandle { id, cache }
    }

    /// Number of atlases that are still alive.
    pub fn live_count(&self) -> usize {
        self.caches
            .values()
            .filter(|r| r.cache.strong_count() > 0)
            .count()
    }

    /// Forgets registrations whose atlas has been dropped.
    ///
    /// Also happens whenever a new atlas is registered.
    pub fn purge(&mut self) {
        self.caches.retain(|_, r| r.cache.strong_count() > 0);
    }

    fn allocate_id(&mut self) -> AtlasId {
        let id = AtlasId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(
        &mut self,
        font: FontId,
        format: CacheFormat,
        id: AtlasId,
        cache: &Rc<RefCell<dyn GlyphCache>>,
    ) {
        self.purge();
        self.caches.insert(
            (font, format),
            Registered {
                id,
                cache: Rc::downgrade(cache),
            },
        );
    }
}
