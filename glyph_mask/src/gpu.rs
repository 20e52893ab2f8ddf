// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The graphics context seam and per-draw render state.
//!
//! Everything the text shaders need from the GPU goes through [`GraphicsContext`]. Programs,
//! uniform locations and textures are opaque handles; compiling and linking programs is the
//! context's business.
//!
//! [`RecordingContext`] implements the trait by recording commands instead of executing them,
//! which makes state tracking observable without a GPU.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

#[cfg(feature = "libm")]
#[allow(unused_imports, reason = "unused when std provides the inherent float methods")]
use core_maths::CoreFloat;
use hashbrown::HashMap;

use crate::Geometry;
use crate::atlas::TextureId;
use crate::kurbo::{Affine, Vec2};
use crate::shader::ShaderSource;

/// A linked GPU program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// The location of a uniform within a program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// Blend factors used by the text shaders.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlendFactor {
    /// `(1, 1, 1, 1)`.
    One,
    /// `1 - source alpha`.
    OneMinusSrcAlpha,
    /// `1 - source color`, per channel.
    OneMinusSrcColor,
    /// The constant blend color.
    ConstantColor,
}

/// Texture sampling filter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureFilter {
    /// Nearest texel.
    Nearest,
    /// Bilinear interpolation.
    Linear,
}

/// Platform features that influence text shading, probed once per context.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Capabilities {
    /// Blending against a constant color is available (needed for sub-pixel text).
    pub constant_blend_color: bool,
    /// The framebuffer can blend in linear space with sRGB encoding.
    pub srgb_framebuffer: bool,
    /// The gamma the platform uses for font smoothing.
    pub font_smoothing_gamma: f32,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            constant_blend_color: false,
            srgb_framebuffer: false,
            font_smoothing_gamma: 2.2,
        }
    }
}

/// Transform and opacity state of the current draw, with dirty flags.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderState {
    /// Transform from item space to scene space.
    pub model_view: Affine,
    /// Transform from scene space to clip space.
    pub projection: Affine,
    /// Accumulated opacity.
    pub opacity: f32,
    /// The transforms changed since the previous draw.
    pub matrix_dirty: bool,
    /// The opacity changed since the previous draw.
    pub opacity_dirty: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            model_view: Affine::IDENTITY,
            projection: Affine::IDENTITY,
            opacity: 1.0,
            matrix_dirty: true,
            opacity_dirty: true,
        }
    }
}

impl RenderState {
    /// Creates a state with both transforms and opacity marked dirty.
    pub fn new(projection: Affine, model_view: Affine, opacity: f32) -> Self {
        Self {
            model_view,
            projection,
            opacity,
            matrix_dirty: true,
            opacity_dirty: true,
        }
    }

    /// The full item-to-clip transform.
    pub fn combined(&self) -> Affine {
        self.projection * self.model_view
    }

    /// The item-to-clip transform with a pure translation snapped to whole pixels.
    ///
    /// When the model-view transform has any scale, rotation or skew, the combined transform
    /// is returned unchanged.
    pub fn pixel_aligned(&self) -> Affine {
        let [a, b, c, d, e, f] = self.model_view.as_coeffs();
        if (a, b, c, d) == (1.0, 0.0, 0.0, 1.0) {
            self.projection * Affine::translate(Vec2::new(e.round(), f.round()))
        } else {
            self.combined()
        }
    }

    /// Clears both dirty flags.
    pub fn mark_clean(&mut self) {
        self.matrix_dirty = false;
        self.opacity_dirty = false;
    }
}

/// Converts a 2D affine transform into a column-major 4x4 matrix.
#[expect(
    clippy::cast_possible_truncation,
    reason = "uniforms are single precision"
)]
pub fn affine_to_mat4(transform: Affine) -> [f32; 16] {
    let [a, b, c, d, e, f] = transform.as_coeffs().map(|v| v as f32);
    [
        a, b, 0.0, 0.0, //
        c, d, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        e, f, 0.0, 1.0,
    ]
}

/// Opaque access to the GPU for the text shaders.
///
/// All methods operate on the currently bound program where that makes sense.
pub trait GraphicsContext {
    /// Platform features, probed once.
    fn capabilities(&self) -> Capabilities;

    /// Compiles and links a program.
    fn create_program(&mut self, source: &ShaderSource) -> ProgramId;

    /// Makes `program` current.
    fn use_program(&mut self, program: ProgramId);

    /// Resolves a uniform by name, or `None` if the program has no such uniform.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Uploads a float uniform.
    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32);

    /// Uploads a `vec2` uniform.
    fn set_uniform_vec2(&mut self, location: UniformLocation, value: [f32; 2]);

    /// Uploads a `vec4` uniform.
    fn set_uniform_vec4(&mut self, location: UniformLocation, value: [f32; 4]);

    /// Uploads a column-major `mat4` uniform.
    fn set_uniform_mat4(&mut self, location: UniformLocation, value: [f32; 16]);

    /// Binds an atlas texture to the glyph sampler.
    fn bind_texture(&mut self, texture: TextureId);

    /// Sets minification and magnification filters of the bound texture.
    fn set_texture_filter(&mut self, filter: TextureFilter);

    /// Sets the blend function.
    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    /// Sets the constant blend color.
    fn set_blend_color(&mut self, color: [f32; 4]);

    /// Enables or disables sRGB encoding on framebuffer writes.
    fn set_framebuffer_srgb(&mut self, enabled: bool);

    /// Draws indexed triangles.
    fn draw_indexed(&mut self, geometry: &Geometry);
}

/// A command recorded by [`RecordingContext`].
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCommand {
    /// A program was created.
    CreateProgram(ProgramId),
    /// A program was made current.
    UseProgram(ProgramId),
    /// A float uniform upload.
    UniformF32(UniformLocation, f32),
    /// A `vec2` uniform upload.
    UniformVec2(UniformLocation, [f32; 2]),
    /// A `vec4` uniform upload.
    UniformVec4(UniformLocation, [f32; 4]),
    /// A `mat4` uniform upload.
    UniformMat4(UniformLocation, [f32; 16]),
    /// A texture bind.
    BindTexture(TextureId),
    /// A texture filter change.
    TextureFilter(TextureFilter),
    /// A blend function change.
    BlendFunc(BlendFactor, BlendFactor),
    /// A blend color change.
    BlendColor([f32; 4]),
    /// sRGB framebuffer toggle.
    FramebufferSrgb(bool),
    /// An indexed draw.
    DrawIndexed {
        /// Number of vertices in the draw.
        vertices: usize,
        /// Number of indices in the draw.
        indices: usize,
    },
}

/// A [`GraphicsContext`] that records every call.
///
/// Every uniform name resolves to a location, except names listed with
/// [`without_uniform`](Self::without_uniform).
#[derive(Debug, Default)]
pub struct RecordingContext {
    capabilities: Capabilities,
    commands: Vec<GpuCommand>,
    programs: Vec<ShaderSource>,
    locations: HashMap<(ProgramId, String), UniformLocation>,
    names: Vec<String>,
    missing: Vec<String>,
}

impl RecordingContext {
    /// Creates a context reporting the given capabilities.
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Makes every program report `name` as absent.
    pub fn without_uniform(mut self, name: &str) -> Self {
        self.missing.push(name.to_string());
        self
    }

    /// The commands recorded so far.
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the list empty.
    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        core::mem::take(&mut self.commands)
    }

    /// The sources of every program created, in creation order.
    pub fn programs(&self) -> &[ShaderSource] {
        &self.programs
    }

    /// The uniform name a location was resolved from.
    pub fn uniform_name(&self, location: UniformLocation) -> Option<&str> {
        let index = usize::try_from(location.0).ok()?;
        self.names.get(index).map(String::as_str)
    }

    /// Every value uploaded to uniforms called `name`, in upload order.
    pub fn uploads_to(&self, name: &str) -> Vec<&GpuCommand> {
        self.commands
            .iter()
            .filter(|command| {
                let location = match command {
                    GpuCommand::UniformF32(l, _)
                    | GpuCommand::UniformVec2(l, _)
                    | GpuCommand::UniformVec4(l, _)
                    | GpuCommand::UniformMat4(l, _) => *l,
                    _ => return false,
                };
                self.uniform_name(location) == Some(name)
            })
            .collect()
    }
}

impl GraphicsContext for RecordingContext {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn create_program(&mut self, source: &ShaderSource) -> ProgramId {
        let id = ProgramId(u32::try_from(self.programs.len()).unwrap_or(u32::MAX));
        self.programs.push(source.clone());
        self.commands.push(GpuCommand::CreateProgram(id));
        id
    }

    fn use_program(&mut self, program: ProgramId) {
        self.commands.push(GpuCommand::UseProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if self.missing.iter().any(|m| m == name) {
            return None;
        }
        let next = i32::try_from(self.names.len()).ok()?;
        let names = &mut self.names;
        let location = *self
            .locations
            .entry((program, name.to_string()))
            .or_insert_with(|| {
                names.push(name.to_string());
                UniformLocation(next)
            });
        Some(location)
    }

    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32) {
        self.commands.push(GpuCommand::UniformF32(location, value));
    }

    fn set_uniform_vec2(&mut self, location: UniformLocation, value: [f32; 2]) {
        self.commands.push(GpuCommand::UniformVec2(location, value));
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: [f32; 4]) {
        self.commands.push(GpuCommand::UniformVec4(location, value));
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: [f32; 16]) {
        self.commands.push(GpuCommand::UniformMat4(location, value));
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.commands.push(GpuCommand::BindTexture(texture));
    }

    fn set_texture_filter(&mut self, filter: TextureFilter) {
        self.commands.push(GpuCommand::TextureFilter(filter));
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.commands.push(GpuCommand::BlendFunc(src, dst));
    }

    fn set_blend_color(&mut self, color: [f32; 4]) {
        self.commands.push(GpuCommand::BlendColor(color));
    }

    fn set_framebuffer_srgb(&mut self, enabled: bool) {
        self.commands.push(GpuCommand::FramebufferSrgb(enabled));
    }

    fn draw_indexed(&mut self, geometry: &Geometry) {
        self.commands.push(GpuCommand::DrawIndexed {
            vertices: geometry.vertices().len(),
            indices: geometry.indices().len(),
        });
    }
}
