//! Pipeline-state descriptors and cache keys.
//!
//! `GraphicsPsoDesc` is the shader-independent half of a graphics
//! pipeline: fixed-function state plus output formats. Its `hash` feeds
//! the pipeline cache, so the encoding is canonical little-endian and
//! never depends on host endianness or struct layout.

use blake3::Hasher;

use glint_format::DxgiFormat;

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FillMode {
    Wireframe = 2,
    Solid = 3,
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CullMode {
    None = 1,
    Front = 2,
    Back = 3,
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ComparisonFunc {
    Never = 1,
    Less = 2,
    Equal = 3,
    LessEqual = 4,
    Greater = 5,
    NotEqual = 6,
    GreaterEqual = 7,
    Always = 8,
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero = 1,
    One = 2,
    SrcColor = 3,
    InvSrcColor = 4,
    SrcAlpha = 5,
    InvSrcAlpha = 6,
    DestAlpha = 7,
    InvDestAlpha = 8,
    DestColor = 9,
    InvDestColor = 10,
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendOp {
    Add = 1,
    Subtract = 2,
    RevSubtract = 3,
    Min = 4,
    Max = 5,
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    Undefined = 0,
    Point = 1,
    Line = 2,
    Triangle = 3,
    Patch = 4,
}

/// Per-render-target blend state. Default is blending disabled with a
/// write-all color mask.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderTargetBlendDesc {
    pub blend_enable: bool,
    pub src_blend: BlendFactor,
    pub dest_blend: BlendFactor,
    pub blend_op: BlendOp,
    pub src_blend_alpha: BlendFactor,
    pub dest_blend_alpha: BlendFactor,
    pub blend_op_alpha: BlendOp,
    pub write_mask: u8,
}

impl Default for RenderTargetBlendDesc {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_blend: BlendFactor::One,
            dest_blend: BlendFactor::Zero,
            blend_op: BlendOp::Add,
            src_blend_alpha: BlendFactor::One,
            dest_blend_alpha: BlendFactor::Zero,
            blend_op_alpha: BlendOp::Add,
            write_mask: 0xf,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct BlendStateDesc {
    pub alpha_to_coverage: bool,
    pub independent_blend: bool,
    pub render_targets: [RenderTargetBlendDesc; 8],
}

/// Default rasterizer: solid fill, back-face culling, depth clip on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RasterizerDesc {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_counter_clockwise: bool,
    pub depth_bias: i32,
    pub depth_bias_clamp: f32,
    pub slope_scaled_depth_bias: f32,
    pub depth_clip: bool,
    pub antialiased_line: bool,
}

impl Default for RasterizerDesc {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_counter_clockwise: false,
            depth_bias: 0,
            depth_bias_clamp: 0.0,
            slope_scaled_depth_bias: 0.0,
            depth_clip: true,
            antialiased_line: false,
        }
    }
}

/// Default depth-stencil: depth test `Less` with writes enabled, stencil
/// off.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DepthStencilDesc {
    pub depth_enable: bool,
    pub depth_write: bool,
    pub depth_func: ComparisonFunc,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
}

impl Default for DepthStencilDesc {
    fn default() -> Self {
        Self {
            depth_enable: true,
            depth_write: true,
            depth_func: ComparisonFunc::Less,
            stencil_enable: false,
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
        }
    }
}

/// One vertex-input slot element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputElement {
    pub semantic: String,
    pub semantic_index: u32,
    pub format: DxgiFormat,
    pub input_slot: u32,
    pub aligned_byte_offset: u32,
    pub instance_step_rate: u32,
}

impl InputElement {
    pub fn per_vertex(semantic: &str, format: DxgiFormat, aligned_byte_offset: u32) -> Self {
        Self {
            semantic: semantic.to_owned(),
            semantic_index: 0,
            format,
            input_slot: 0,
            aligned_byte_offset,
            instance_step_rate: 0,
        }
    }
}

/// Shader-independent graphics pipeline description.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsPsoDesc {
    pub input_layout: Vec<InputElement>,
    pub rtv_formats: Vec<DxgiFormat>,
    pub dsv_format: DxgiFormat,
    pub topology: PrimitiveTopology,
    pub blend: BlendStateDesc,
    pub rasterizer: RasterizerDesc,
    pub depth_stencil: DepthStencilDesc,
    pub sample_count: u32,
    pub sample_mask: u32,
}

impl Default for GraphicsPsoDesc {
    fn default() -> Self {
        Self {
            input_layout: Vec::new(),
            rtv_formats: Vec::new(),
            dsv_format: DxgiFormat::Unknown,
            topology: PrimitiveTopology::Triangle,
            blend: BlendStateDesc::default(),
            rasterizer: RasterizerDesc::default(),
            depth_stencil: DepthStencilDesc::default(),
            sample_count: 1,
            sample_mask: !0,
        }
    }
}

/// Writes fields into the hasher as fixed-width little-endian values.
/// Variable-length sequences are length-prefixed so adjacent fields
/// cannot alias across different descriptors.
struct CanonicalEncoder {
    hasher: Hasher,
}

impl CanonicalEncoder {
    fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    fn put_u8(&mut self, v: u8) {
        self.hasher.update(&[v]);
    }

    fn put_u32(&mut self, v: u32) {
        self.hasher.update(&v.to_le_bytes());
    }

    fn put_f32(&mut self, v: f32) {
        self.hasher.update(&v.to_bits().to_le_bytes());
    }

    fn put_bool(&mut self, v: bool) {
        self.put_u8(v as u8);
    }

    fn put_str(&mut self, s: &str) {
        self.put_u32(s.len() as u32);
        self.hasher.update(s.as_bytes());
    }

    fn finish(&self) -> u64 {
        let digest = self.hasher.finalize();
        let mut first = [0u8; 8];
        first.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(first)
    }
}

impl GraphicsPsoDesc {
    /// Stable 64-bit cache key over the canonical field encoding.
    pub fn hash(&self) -> u64 {
        let mut enc = CanonicalEncoder::new();

        enc.put_u32(self.input_layout.len() as u32);
        for element in &self.input_layout {
            enc.put_str(&element.semantic);
            enc.put_u32(element.semantic_index);
            enc.put_u32(element.format as u32);
            enc.put_u32(element.input_slot);
            enc.put_u32(element.aligned_byte_offset);
            enc.put_u32(element.instance_step_rate);
        }

        enc.put_u32(self.rtv_formats.len() as u32);
        for format in &self.rtv_formats {
            enc.put_u32(*format as u32);
        }
        enc.put_u32(self.dsv_format as u32);
        enc.put_u32(self.topology as u32);

        enc.put_bool(self.blend.alpha_to_coverage);
        enc.put_bool(self.blend.independent_blend);
        for rt in &self.blend.render_targets {
            enc.put_bool(rt.blend_enable);
            enc.put_u32(rt.src_blend as u32);
            enc.put_u32(rt.dest_blend as u32);
            enc.put_u32(rt.blend_op as u32);
            enc.put_u32(rt.src_blend_alpha as u32);
            enc.put_u32(rt.dest_blend_alpha as u32);
            enc.put_u32(rt.blend_op_alpha as u32);
            enc.put_u8(rt.write_mask);
        }

        enc.put_u32(self.rasterizer.fill_mode as u32);
        enc.put_u32(self.rasterizer.cull_mode as u32);
        enc.put_bool(self.rasterizer.front_counter_clockwise);
        enc.put_u32(self.rasterizer.depth_bias as u32);
        enc.put_f32(self.rasterizer.depth_bias_clamp);
        enc.put_f32(self.rasterizer.slope_scaled_depth_bias);
        enc.put_bool(self.rasterizer.depth_clip);
        enc.put_bool(self.rasterizer.antialiased_line);

        enc.put_bool(self.depth_stencil.depth_enable);
        enc.put_bool(self.depth_stencil.depth_write);
        enc.put_u32(self.depth_stencil.depth_func as u32);
        enc.put_bool(self.depth_stencil.stencil_enable);
        enc.put_u8(self.depth_stencil.stencil_read_mask);
        enc.put_u8(self.depth_stencil.stencil_write_mask);

        enc.put_u32(self.sample_count);
        enc.put_u32(self.sample_mask);

        enc.finish()
    }
}
