// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched drawing of glyph nodes.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::gpu::{Capabilities, GraphicsContext, RenderState};
use crate::material::{GlyphMaterial, MaterialKind};
use crate::node::GlyphNode;
use crate::shader::{ShaderVariant, TextShader};

/// Counters for one [`TextRenderer::render`] call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Indexed draws issued.
    pub draws: usize,
    /// Times a different program was activated.
    pub program_switches: usize,
}

/// Lazily created shaders, one per variant.
#[derive(Debug, Default)]
struct ShaderCache {
    shaders: HashMap<ShaderVariant, TextShader>,
    selections: HashMap<MaterialKind, ShaderVariant>,
}

/// Draws glyph nodes, sorted so that nodes sharing a program and atlas draw back to back.
#[derive(Debug)]
pub struct TextRenderer {
    capabilities: Capabilities,
    cache: ShaderCache,
}

impl TextRenderer {
    /// Creates a renderer for `ctx`, probing its capabilities once.
    pub fn new(ctx: &impl GraphicsContext) -> Self {
        Self {
            capabilities: ctx.capabilities(),
            cache: ShaderCache::default(),
        }
    }

    /// The capabilities probed at construction.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// The variant used for `kind` on this renderer's context.
    pub fn variant_for(&mut self, kind: MaterialKind) -> ShaderVariant {
        let capabilities = &self.capabilities;
        *self
            .cache
            .selections
            .entry(kind)
            .or_insert_with(|| ShaderVariant::select(kind, capabilities))
    }

    /// Number of programs created so far.
    pub fn program_count(&self) -> usize {
        self.cache.shaders.len()
    }

    /// Draws `nodes` with as few program switches and uniform uploads as possible.
    ///
    /// Nodes without geometry are skipped. The blend state is restored before returning.
    pub fn render(
        &mut self,
        ctx: &mut impl GraphicsContext,
        nodes: &[&GlyphNode],
        state: &RenderState,
    ) -> RenderStats {
        let mut order: Vec<&GlyphNode> = nodes
            .iter()
            .copied()
            .filter(|node| !node.geometry().is_empty())
            .collect();
        order.sort_by(|a, b| a.material().compare_for_batching(b.material()));

        let mut stats = RenderStats::default();
        let mut state = *state;
        let mut current: Option<TextShader> = None;
        let mut previous: Option<&GlyphMaterial> = None;

        for node in order {
            let material = node.material();
            let variant = self.variant_for(material.kind());
            if current.as_ref().map(TextShader::variant) != Some(variant) {
                if let Some(shader) = &current {
                    shader.deactivate(ctx);
                }
                let shader = self
                    .cache
                    .shaders
                    .entry(variant)
                    .or_insert_with(|| TextShader::new(ctx, variant))
                    .clone();
                shader.activate(ctx);
                current = Some(shader);
                previous = None;
                state.matrix_dirty = true;
                state.opacity_dirty = true;
                stats.program_switches += 1;
            }
            // A degraded variant can draw several kinds; state is only comparable within one.
            if previous.is_some_and(|p| p.kind() != material.kind()) {
                previous = None;
            }
            if let Some(shader) = &current {
                shader.update_state(ctx, &state, material, previous);
            }
            ctx.draw_indexed(node.geometry());
            stats.draws += 1;
            state.mark_clean();
            previous = Some(material);
        }

        if let Some(shader) = &current {
            shader.deactivate(ctx);
        }
        stats
    }
}
