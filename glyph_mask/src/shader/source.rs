// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GLSL source composition for the text shaders.
//!
//! Every program is built from one [`PrimaryStage`], which turns atlas coverage into a color,
//! and at most one [`SecondaryStage`], which adds a style color sampled around the glyph.

use alloc::string::String;

/// Vertex attribute names, in binding order.
pub const ATTRIBUTES: [&str; 2] = ["vCoord", "tCoord"];

/// Name of the atlas sampler uniform.
pub const ATLAS_SAMPLER: &str = "glyphAtlas";

/// GLSL sources of one program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSource {
    /// The vertex shader.
    pub vertex: String,
    /// The fragment shader.
    pub fragment: String,
}

/// How atlas coverage becomes a color.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrimaryStage {
    /// Single channel coverage multiplied with a premultiplied `vec4` color.
    AlphaMask,
    /// Per-channel coverage scaled by the color alpha; the color itself is applied by constant
    /// color blending.
    SubpixelMask,
}

/// An extra coverage sample drawn in the style color.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SecondaryStage {
    /// Coverage sampled at the glyph offset by `shift` texels, minus the glyph itself.
    Shifted,
    /// Coverage of the four neighbouring texels, minus the glyph itself.
    Outline,
}

const OUTLINE_NEIGHBOURS: [(&str, &str); 4] = [
    ("sCoordUp", "vec2(0.0, -1.0)"),
    ("sCoordDown", "vec2(0.0, 1.0)"),
    ("sCoordLeft", "vec2(-1.0, 0.0)"),
    ("sCoordRight", "vec2(1.0, 0.0)"),
];

impl ShaderSource {
    /// Composes a program from its stages.
    pub fn compose(primary: PrimaryStage, secondary: Option<SecondaryStage>) -> Self {
        Self {
            vertex: vertex_source(secondary),
            fragment: fragment_source(primary, secondary),
        }
    }
}

fn vertex_source(secondary: Option<SecondaryStage>) -> String {
    let mut src = String::new();
    src.push_str("uniform highp mat4 matrix;\n");
    src.push_str("uniform highp vec2 textureScale;\n");
    if secondary == Some(SecondaryStage::Shifted) {
        src.push_str("uniform highp vec2 shift;\n");
    }
    src.push_str("attribute highp vec4 vCoord;\n");
    src.push_str("attribute highp vec2 tCoord;\n");
    src.push_str("varying highp vec2 sampleCoord;\n");
    push_secondary_varyings(&mut src, secondary);
    src.push_str("void main() {\n");
    src.push_str("    sampleCoord = tCoord * textureScale;\n");
    match secondary {
        Some(SecondaryStage::Shifted) => {
            src.push_str("    shiftedSampleCoord = (tCoord - shift) * textureScale;\n");
        }
        Some(SecondaryStage::Outline) => {
            for (name, offset) in OUTLINE_NEIGHBOURS {
                src.push_str("    ");
                src.push_str(name);
                src.push_str(" = (tCoord - ");
                src.push_str(offset);
                src.push_str(") * textureScale;\n");
            }
        }
        None => {}
    }
    src.push_str("    gl_Position = matrix * vCoord;\n");
    src.push_str("}\n");
    src
}

fn fragment_source(primary: PrimaryStage, secondary: Option<SecondaryStage>) -> String {
    let mut src = String::new();
    src.push_str("varying highp vec2 sampleCoord;\n");
    push_secondary_varyings(&mut src, secondary);
    src.push_str("uniform sampler2D ");
    src.push_str(ATLAS_SAMPLER);
    src.push_str(";\n");
    match primary {
        PrimaryStage::AlphaMask => src.push_str("uniform lowp vec4 color;\n"),
        PrimaryStage::SubpixelMask => src.push_str("uniform lowp float color;\n"),
    }
    if secondary.is_some() {
        src.push_str("uniform lowp vec4 styleColor;\n");
    }
    src.push_str("void main() {\n");
    match primary {
        PrimaryStage::AlphaMask => {
            push_sample(&mut src, "    lowp float glyph = ", "sampleCoord", ".a;\n");
        }
        PrimaryStage::SubpixelMask => {
            push_sample(&mut src, "    lowp vec4 glyph = ", "sampleCoord", ";\n");
        }
    }
    match secondary {
        Some(SecondaryStage::Shifted) => {
            push_sample(
                &mut src,
                "    lowp float style = clamp(",
                "shiftedSampleCoord",
                ".a - glyph, 0.0, 1.0);\n",
            );
        }
        Some(SecondaryStage::Outline) => {
            src.push_str("    lowp float neighbours = 0.0;\n");
            for (name, _) in OUTLINE_NEIGHBOURS {
                push_sample(&mut src, "    neighbours += ", name, ".a;\n");
            }
            src.push_str("    lowp float style = clamp(clamp(neighbours, 0.0, 1.0) - glyph, 0.0, 1.0);\n");
        }
        None => {}
    }
    match (primary, secondary) {
        (PrimaryStage::AlphaMask, None) => src.push_str("    gl_FragColor = color * glyph;\n"),
        (PrimaryStage::AlphaMask, Some(_)) => {
            src.push_str("    gl_FragColor = style * styleColor + glyph * color;\n");
        }
        (PrimaryStage::SubpixelMask, _) => {
            src.push_str("    gl_FragColor = vec4(glyph.rgb * color, glyph.a);\n");
        }
    }
    src.push_str("}\n");
    src
}

fn push_secondary_varyings(src: &mut String, secondary: Option<SecondaryStage>) {
    match secondary {
        Some(SecondaryStage::Shifted) => src.push_str("varying highp vec2 shiftedSampleCoord;\n"),
        Some(SecondaryStage::Outline) => {
            for (name, _) in OUTLINE_NEIGHBOURS {
                src.push_str("varying highp vec2 ");
                src.push_str(name);
                src.push_str(";\n");
            }
        }
        None => {}
    }
}

fn push_sample(src: &mut String, prefix: &str, coord: &str, suffix: &str) {
    src.push_str(prefix);
    src.push_str("texture2D(");
    src.push_str(ATLAS_SAMPLER);
    src.push_str(", ");
    src.push_str(coord);
    src.push(')');
    src.push_str(suffix);
}
