// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text shader variants and their uniform state tracking.
//!
//! One [`TextShader`] exists per [`ShaderVariant`] and is shared by every material of the
//! matching kind. Between two draws with the same shader, only uniforms whose material field
//! changed are uploaded again.

mod source;

pub use source::{ATLAS_SAMPLER, ATTRIBUTES, PrimaryStage, SecondaryStage, ShaderSource};

#[cfg(feature = "libm")]
#[allow(unused_imports, reason = "unused when std provides the inherent float methods")]
use core_maths::CoreFloat;

use crate::atlas::CacheFormat;
use crate::color::{AlphaColor, Srgb};
use crate::gpu::{
    BlendFactor, Capabilities, GraphicsContext, ProgramId, RenderState, TextureFilter,
    UniformLocation, affine_to_mat4,
};
use crate::kurbo::Vec2;
use crate::material::{GlyphMaterial, MaterialKind, TextMaskMaterial};
use crate::Error;

/// The programs that draw glyph materials.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShaderVariant {
    /// 8-bit alpha coverage tinted with a premultiplied color.
    PlainAlpha8,
    /// Sub-pixel coverage blended against a constant color.
    PlainRgb24,
    /// Alpha coverage plus a shifted copy in the style color.
    Styled,
    /// Alpha coverage plus a one texel outline in the style color.
    Outlined,
}

impl ShaderVariant {
    /// The variant that draws `kind` when every platform feature is available.
    pub fn for_kind(kind: MaterialKind) -> Self {
        match kind {
            MaterialKind::Alpha8 => Self::PlainAlpha8,
            MaterialKind::Rgb24 => Self::PlainRgb24,
            MaterialKind::Styled => Self::Styled,
            MaterialKind::Outlined => Self::Outlined,
        }
    }

    /// The variant that draws `kind` on a platform with `capabilities`.
    ///
    /// Fails with [`UnsupportedBlendFeature`](crate::ErrorKind::UnsupportedBlendFeature) for
    /// sub-pixel text when constant blend colors are unavailable.
    pub fn try_select(kind: MaterialKind, capabilities: &Capabilities) -> Result<Self, Error> {
        let variant = Self::for_kind(kind);
        if variant == Self::PlainRgb24 && !capabilities.constant_blend_color {
            return Err(Error::unsupported_blend_feature(CacheFormat::Rgb24));
        }
        Ok(variant)
    }

    /// Like [`try_select`](Self::try_select), but degrades sub-pixel text to
    /// [`PlainAlpha8`](Self::PlainAlpha8) instead of failing.
    pub fn select(kind: MaterialKind, capabilities: &Capabilities) -> Self {
        Self::try_select(kind, capabilities).unwrap_or_else(|err| {
            log::warn!("{err}; falling back to 8-bit alpha text");
            Self::PlainAlpha8
        })
    }

    /// The shader stages of this variant.
    pub fn stages(self) -> (PrimaryStage, Option<SecondaryStage>) {
        match self {
            Self::PlainAlpha8 => (PrimaryStage::AlphaMask, None),
            Self::PlainRgb24 => (PrimaryStage::SubpixelMask, None),
            Self::Styled => (PrimaryStage::AlphaMask, Some(SecondaryStage::Shifted)),
            Self::Outlined => (PrimaryStage::AlphaMask, Some(SecondaryStage::Outline)),
        }
    }

    /// The GLSL sources of this variant.
    pub fn source(self) -> ShaderSource {
        let (primary, secondary) = self.stages();
        ShaderSource::compose(primary, secondary)
    }

    /// Whether a pure translation is rounded to whole pixels before upload.
    ///
    /// Plain text is sampled with nearest filtering and only looks right on the pixel grid.
    pub fn snaps_to_pixels(self) -> bool {
        matches!(self, Self::PlainAlpha8 | Self::PlainRgb24)
    }
}

/// A compiled text program with its resolved uniform locations.
#[derive(Clone, Debug)]
pub struct TextShader {
    variant: ShaderVariant,
    program: ProgramId,
    matrix: Option<UniformLocation>,
    texture_scale: Option<UniformLocation>,
    color: Option<UniformLocation>,
    shift: Option<UniformLocation>,
    style_color: Option<UniformLocation>,
    use_srgb: bool,
}

impl TextShader {
    /// Creates the program for `variant` and resolves its uniforms.
    pub fn new(ctx: &mut impl GraphicsContext, variant: ShaderVariant) -> Self {
        let capabilities = ctx.capabilities();
        let program = ctx.create_program(&variant.source());
        let styled = variant.stages().1.is_some();
        let mut location = |name: &str| ctx.uniform_location(program, name);
        let shader = Self {
            variant,
            program,
            matrix: location("matrix"),
            texture_scale: location("textureScale"),
            color: location("color"),
            shift: if variant == ShaderVariant::Styled {
                location("shift")
            } else {
                None
            },
            style_color: if styled { location("styleColor") } else { None },
            use_srgb: variant == ShaderVariant::PlainRgb24
                && capabilities.srgb_framebuffer
                && (capabilities.font_smoothing_gamma - 2.2).abs() < 0.25,
        };
        log::debug!(
            "created {variant:?} text shader as {program:?} (sRGB blending: {})",
            shader.use_srgb
        );
        shader
    }

    /// The variant this shader draws.
    pub fn variant(&self) -> ShaderVariant {
        self.variant
    }

    /// The GPU program.
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Whether blending happens in linear space through an sRGB framebuffer.
    pub fn uses_srgb(&self) -> bool {
        self.use_srgb
    }

    /// Binds the program and sets the blend state it needs.
    pub fn activate(&self, ctx: &mut impl GraphicsContext) {
        ctx.use_program(self.program);
        if self.variant == ShaderVariant::PlainRgb24 {
            ctx.set_blend_func(BlendFactor::ConstantColor, BlendFactor::OneMinusSrcColor);
            if self.use_srgb {
                ctx.set_framebuffer_srgb(true);
            }
        }
    }

    /// Restores the default premultiplied blend state.
    pub fn deactivate(&self, ctx: &mut impl GraphicsContext) {
        if self.variant == ShaderVariant::PlainRgb24 {
            ctx.set_blend_func(BlendFactor::One, BlendFactor::OneMinusSrcAlpha);
            if self.use_srgb {
                ctx.set_framebuffer_srgb(false);
            }
        }
    }

    /// Uploads the state for drawing `new`, skipping whatever is unchanged since `old` was
    /// drawn with this shader.
    ///
    /// # Panics
    ///
    /// Panics if `old` is a material of a different kind than `new`.
    pub fn update_state(
        &self,
        ctx: &mut impl GraphicsContext,
        state: &RenderState,
        new: &GlyphMaterial,
        old: Option<&GlyphMaterial>,
    ) {
        assert!(
            old.is_none_or(|old| old.kind() == new.kind()),
            "the previous material of a shader must be of the same kind"
        );
        match self.variant {
            ShaderVariant::PlainAlpha8 | ShaderVariant::PlainRgb24 => {
                self.update_texture(ctx, new.mask(), old.map(GlyphMaterial::mask));
                if state.matrix_dirty {
                    self.upload_matrix(ctx, state);
                }
                self.update_color(ctx, state, new.mask(), old.map(GlyphMaterial::mask));
            }
            ShaderVariant::Styled | ShaderVariant::Outlined => {
                let (shift, style_color) = style_of(new);
                let old_style = old.map(style_of);
                if old_style.is_none_or(|(old_shift, _)| old_shift != shift) {
                    self.set_vec2(ctx, self.shift, [to_f32(shift.x), to_f32(shift.y)]);
                }
                let color_changed =
                    old.is_none_or(|old| old.mask().color() != new.mask().color());
                if color_changed || state.opacity_dirty {
                    let color = premultiply(new.mask().color().components, state.opacity);
                    self.set_vec4(ctx, self.color, color);
                }
                let style_changed = old_style.is_none_or(|(_, old_color)| old_color != style_color);
                if style_changed || state.opacity_dirty {
                    let color = premultiply(style_color.components, state.opacity);
                    self.set_vec4(ctx, self.style_color, color);
                }
                self.update_texture(ctx, new.mask(), old.map(GlyphMaterial::mask));
                if state.matrix_dirty {
                    self.upload_matrix(ctx, state);
                }
            }
        }
    }

    fn update_texture(
        &self,
        ctx: &mut impl GraphicsContext,
        material: &TextMaskMaterial,
        old: Option<&TextMaskMaterial>,
    ) {
        let updated = material.ensure_up_to_date();
        let Some(texture) = material.texture() else {
            return;
        };
        let texture_changed = old.is_none_or(|old| old.texture().map(|t| t.id) != Some(texture.id));
        if updated || texture_changed {
            self.set_vec2(
                ctx,
                self.texture_scale,
                [1.0 / texture.width as f32, 1.0 / texture.height as f32],
            );
            ctx.bind_texture(texture.id);
            if updated {
                ctx.set_texture_filter(TextureFilter::Nearest);
            }
        }
    }

    fn upload_matrix(&self, ctx: &mut impl GraphicsContext, state: &RenderState) {
        let Some(location) = self.matrix else {
            return;
        };
        let transform = if self.variant.snaps_to_pixels() {
            state.pixel_aligned()
        } else {
            state.combined()
        };
        ctx.set_uniform_mat4(location, affine_to_mat4(transform));
    }

    fn update_color(
        &self,
        ctx: &mut impl GraphicsContext,
        state: &RenderState,
        material: &TextMaskMaterial,
        old: Option<&TextMaskMaterial>,
    ) {
        let changed = old.is_none_or(|old| old.color() != material.color());
        if !changed && !state.opacity_dirty {
            return;
        }
        let components = material.color().components;
        if self.variant == ShaderVariant::PlainRgb24 {
            let blend = if self.use_srgb {
                srgb_to_linear(components)
            } else {
                components
            };
            ctx.set_blend_color(blend);
            let premultiplied = premultiply(blend, state.opacity);
            if let Some(location) = self.color {
                ctx.set_uniform_f32(location, premultiplied[3]);
            }
        } else {
            self.set_vec4(ctx, self.color, premultiply(components, state.opacity));
        }
    }

    fn set_vec2(
        &self,
        ctx: &mut impl GraphicsContext,
        location: Option<UniformLocation>,
        value: [f32; 2],
    ) {
        if let Some(location) = location {
            ctx.set_uniform_vec2(location, value);
        }
    }

    fn set_vec4(
        &self,
        ctx: &mut impl GraphicsContext,
        location: Option<UniformLocation>,
        value: [f32; 4],
    ) {
        if let Some(location) = location {
            ctx.set_uniform_vec4(location, value);
        }
    }
}

fn style_of(material: &GlyphMaterial) -> (Vec2, AlphaColor<Srgb>) {
    material.styled().map_or(
        (Vec2::ZERO, AlphaColor::TRANSPARENT),
        |styled| (styled.shift(), styled.style_color()),
    )
}

/// Premultiplies a straight-alpha color after scaling its alpha by `opacity`.
pub fn premultiply([r, g, b, a]: [f32; 4], opacity: f32) -> [f32; 4] {
    let o = a * opacity;
    [r * o, g * o, b * o, o]
}

/// Converts the color channels of an sRGB color to linear light, keeping alpha.
pub fn srgb_to_linear([r, g, b, a]: [f32; 4]) -> [f32; 4] {
    let channel = |f: f32| {
        if f > 0.04045 {
            ((f + 0.055) / 1.055).powf(2.4)
        } else {
            f / 12.92
        }
    };
    [channel(r), channel(g), channel(b), a]
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "uniforms are single precision"
)]
fn to_f32(value: f64) -> f32 {
    value as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::atlas::AtlasRegistry;
    use crate::color::palette;
    use crate::font::{FixedMetricsEngine, Font, FontId};
    use crate::gpu::{GpuCommand, RecordingContext};
    use crate::kurbo::{Affine, Point};
    use crate::material::{StyleEffect, StyledTextMaterial};
    use crate::Margins;

    fn font(native: Option<CacheFormat>) -> Font {
        Font::new(
            FontId::new(1),
            FixedMetricsEngine::new(10.0, 8, 12).with_native_format(native),
        )
    }

    fn clean(mut state: RenderState) -> RenderState {
        state.mark_clean();
        state
    }

    #[test]
    fn rgb24_requires_constant_blend_color() {
        let without = Capabilities::default();
        let err = ShaderVariant::try_select(MaterialKind::Rgb24, &without).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedBlendFeature);
        assert_eq!(
            ShaderVariant::select(MaterialKind::Rgb24, &without),
            ShaderVariant::PlainAlpha8
        );
        let with = Capabilities {
            constant_blend_color: true,
            ..Capabilities::default()
        };
        assert_eq!(
            ShaderVariant::select(MaterialKind::Rgb24, &with),
            ShaderVariant::PlainRgb24
        );
        assert_eq!(
            ShaderVariant::select(MaterialKind::Outlined, &without),
            ShaderVariant::Outlined
        );
    }

    #[test]
    fn first_draw_uploads_everything_then_nothing() {
        let mut registry = AtlasRegistry::new();
        let mut ctx = RecordingContext::new(Capabilities::default());
        let shader = TextShader::new(&mut ctx, ShaderVariant::PlainAlpha8);
        let material: GlyphMaterial = TextMaskMaterial::new(&font(None), None, &mut registry)
            .unwrap()
            .into();
        ctx.take_commands();

        let state = RenderState::default();
        shader.update_state(&mut ctx, &state, &material, None);
        let commands = ctx.take_commands();
        assert!(matches!(commands[0], GpuCommand::UniformVec2(_, [s, _]) if s == 1.0 / 256.0));
        assert!(matches!(commands[1], GpuCommand::BindTexture(_)));
        assert_eq!(commands[2], GpuCommand::TextureFilter(TextureFilter::Nearest));
        assert!(matches!(commands[3], GpuCommand::UniformMat4(..)));
        assert!(matches!(commands[4], GpuCommand::UniformVec4(_, [0.0, 0.0, 0.0, 1.0])));
        assert_eq!(commands.len(), 5);

        shader.update_state(&mut ctx, &clean(state), &material, Some(&material));
        assert!(ctx.commands().is_empty(), "{:?}", ctx.commands());
    }

    #[test]
    fn color_and_opacity_changes() {
        let mut registry = AtlasRegistry::new();
        let mut ctx = RecordingContext::new(Capabilities::default());
        let shader = TextShader::new(&mut ctx, ShaderVariant::PlainAlpha8);
        let f = font(None);
        let black: GlyphMaterial = TextMaskMaterial::new(&f, None, &mut registry).unwrap().into();
        let mut red: GlyphMaterial = TextMaskMaterial::new(&f, None, &mut registry).unwrap().into();
        red.set_color(palette::css::RED);
        shader.update_state(&mut ctx, &RenderState::default(), &black, None);
        ctx.take_commands();

        let mut faded = clean(RenderState::default());
        faded.opacity = 0.5;
        faded.opacity_dirty = true;
        shader.update_state(&mut ctx, &faded, &black, Some(&black));
        let commands = ctx.take_commands();
        assert_eq!(commands.len(), 1, "{commands:?}");
        assert!(matches!(commands[0], GpuCommand::UniformVec4(_, [0.0, 0.0, 0.0, 0.5])));

        // Same atlas texture, so only the color is uploaded.
        red.mask().ensure_up_to_date();
        shader.update_state(&mut ctx, &clean(RenderState::default()), &red, Some(&black));
        let commands = ctx.take_commands();
        assert_eq!(commands.len(), 1, "{commands:?}");
        assert!(matches!(commands[0], GpuCommand::UniformVec4(_, [1.0, 0.0, 0.0, 1.0])));
    }

    #[test]
    fn rgb24_blends_in_linear_space() {
        let capabilities = Capabilities {
            constant_blend_color: true,
            srgb_framebuffer: true,
            font_smoothing_gamma: 2.2,
        };
        let mut registry = AtlasRegistry::new();
        let mut ctx = RecordingContext::new(capabilities);
        let shader = TextShader::new(&mut ctx, ShaderVariant::PlainRgb24);
        assert!(shader.uses_srgb());
        let mut material: GlyphMaterial =
            TextMaskMaterial::new(&font(Some(CacheFormat::Rgb24)), None, &mut registry)
                .unwrap()
                .into();
        material.set_color(AlphaColor::new([0.5, 0.5, 0.5, 1.0]));
        ctx.take_commands();

        shader.activate(&mut ctx);
        assert_eq!(
            ctx.take_commands(),
            [
                GpuCommand::UseProgram(shader.program()),
                GpuCommand::BlendFunc(BlendFactor::ConstantColor, BlendFactor::OneMinusSrcColor),
                GpuCommand::FramebufferSrgb(true),
            ]
        );

        shader.update_state(&mut ctx, &RenderState::default(), &material, None);
        let blend = ctx.commands().iter().find_map(|c| match c {
            GpuCommand::BlendColor(color) => Some(*color),
            _ => None,
        });
        let [r, g, b, a] = blend.unwrap();
        assert!((r - 0.214).abs() < 0.001, "{r}");
        assert_eq!((r, a), (g, 1.0));
        assert_eq!(g, b);
        let color = ctx.uniform_location(shader.program(), "color").unwrap();
        assert_eq!(ctx.uploads_to("color"), [&GpuCommand::UniformF32(color, 1.0)]);

        ctx.take_commands();
        shader.deactivate(&mut ctx);
        assert_eq!(
            ctx.take_commands(),
            [
                GpuCommand::BlendFunc(BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
                GpuCommand::FramebufferSrgb(false),
            ]
        );
    }

    #[test]
    fn srgb_needs_a_standard_gamma() {
        let capabilities = Capabilities {
            constant_blend_color: true,
            srgb_framebuffer: true,
            font_smoothing_gamma: 1.8,
        };
        let mut ctx = RecordingContext::new(capabilities);
        assert!(!TextShader::new(&mut ctx, ShaderVariant::PlainRgb24).uses_srgb());
        let capabilities = Capabilities {
            font_smoothing_gamma: 2.2,
            ..capabilities
        };
        let mut ctx = RecordingContext::new(capabilities);
        assert!(!TextShader::new(&mut ctx, ShaderVariant::PlainAlpha8).uses_srgb());
    }

    #[test]
    fn styled_uploads_unsnapped_matrix_and_style() {
        let mut registry = AtlasRegistry::new();
        let mut ctx = RecordingContext::new(Capabilities::default());
        let shader = TextShader::new(&mut ctx, ShaderVariant::Styled);
        let f = font(None);
        let mut raised = StyledTextMaterial::new(&f, StyleEffect::Styled, &mut registry).unwrap();
        raised.set_shift(Vec2::new(0.0, 1.0));
        raised.set_style_color(palette::css::WHITE);
        let mut sunken = StyledTextMaterial::new(&f, StyleEffect::Styled, &mut registry).unwrap();
        sunken.set_shift(Vec2::new(0.0, -1.0));
        sunken.set_style_color(palette::css::WHITE);
        let (raised, sunken) = (GlyphMaterial::from(raised), GlyphMaterial::from(sunken));
        ctx.take_commands();

        let state = RenderState::new(Affine::IDENTITY, Affine::translate((3.7, -2.2)), 1.0);
        shader.update_state(&mut ctx, &state, &raised, None);
        let commands = ctx.take_commands();
        assert_eq!(commands.len(), 7, "{commands:?}");
        assert!(matches!(commands[0], GpuCommand::UniformVec2(_, [0.0, 1.0])));
        let GpuCommand::UniformMat4(_, matrix) = commands[6] else {
            panic!("matrix should be uploaded last, got {:?}", commands[6]);
        };
        assert_eq!((matrix[12], matrix[13]), (3.7, -2.2));

        sunken.mask().ensure_up_to_date();
        shader.update_state(&mut ctx, &clean(state), &sunken, Some(&raised));
        let commands = ctx.take_commands();
        assert!(
            matches!(commands[..], [GpuCommand::UniformVec2(_, [0.0, -1.0])]),
            "{commands:?}"
        );
    }

    #[test]
    fn outline_has_no_shift_uniform() {
        let mut ctx = RecordingContext::new(Capabilities::default());
        let shader = TextShader::new(&mut ctx, ShaderVariant::Outlined);
        let mut registry = AtlasRegistry::new();
        let outlined: GlyphMaterial =
            StyledTextMaterial::new(&font(None), StyleEffect::Outlined, &mut registry)
                .unwrap()
                .into();
        shader.update_state(&mut ctx, &RenderState::default(), &outlined, None);
        assert!(ctx.uploads_to("shift").is_empty());
        assert_eq!(ctx.uploads_to("styleColor").len(), 1);
    }

    #[test]
    #[should_panic(expected = "the previous material of a shader must be of the same kind")]
    fn mixing_kinds_panics() {
        let mut registry = AtlasRegistry::new();
        let mut ctx = RecordingContext::new(Capabilities::default());
        let shader = TextShader::new(&mut ctx, ShaderVariant::PlainAlpha8);
        let f = font(None);
        let plain: GlyphMaterial = TextMaskMaterial::new(&f, None, &mut registry).unwrap().into();
        let styled: GlyphMaterial = StyledTextMaterial::new(&f, StyleEffect::Styled, &mut registry)
            .unwrap()
            .into();
        shader.update_state(&mut ctx, &RenderState::default(), &plain, Some(&styled));
    }

    #[test]
    fn populate_then_draw_scenario() {
        let mut registry = AtlasRegistry::new();
        let mut ctx = RecordingContext::new(Capabilities::default());
        let material: GlyphMaterial = TextMaskMaterial::new(&font(None), None, &mut registry)
            .unwrap()
            .into();
        let run = material
            .populate(
                Point::new(0.0, 10.0),
                &[1, 2, 3],
                &[Point::ZERO, Point::new(9.0, 0.0), Point::new(18.0, 0.0)],
                Margins::ZERO,
            )
            .unwrap();
        let variant = ShaderVariant::select(material.kind(), &ctx.capabilities());
        assert_eq!(variant, ShaderVariant::PlainAlpha8);
        let shader = TextShader::new(&mut ctx, variant);
        shader.activate(&mut ctx);
        shader.update_state(&mut ctx, &RenderState::default(), &material, None);
        ctx.draw_indexed(&run.geometry);
        assert_eq!(
            ctx.commands().last(),
            Some(&GpuCommand::DrawIndexed {
                vertices: 12,
                indices: 18
            })
        );
    }
}
