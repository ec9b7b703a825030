//! Camera-facing quad mesh rebuilt from particle buffers every frame.
//!
//! Every particle maps to exactly one quad slot, in a stable order: buffers in
//! the order they are pushed, then buffer index. Slots are never reordered or
//! compacted, so a renderer can upload the whole vertex array each frame and
//! keep a fixed index buffer.
//!
//! # Quads
//!
//! - Dead or zero-size particles become degenerate quads: four vertices at the
//!   local origin with zero color. They rasterize to nothing.
//! - Live particles become billboards of side `size`, facing the camera.
//! - When the buffer carries [`TrailSettings`] and the particle is fast
//!   enough, the quad is stretched behind the particle along its on-screen
//!   velocity.
//!
//! # Example
//!
//! ```ignore
//! let mut mesh = ParticleMesh::new();
//! mesh.begin(particles.len());
//! mesh.push(&particles, trail.as_ref(), &camera.frame());
//! mesh.finish();
//!
//! queue.write_buffer(&vertex_buffer, 0, bytemuck::cast_slice(mesh.vertices()));
//! ```

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::camera::CameraFrame;
use crate::effect::TrailSettings;
use crate::particle::Particle;
use crate::phase::PhaseParticle;

/// Vertices per quad.
pub const VERTICES_PER_QUAD: usize = 4;
/// Indices per quad.
pub const INDICES_PER_QUAD: usize = 6;

/// Mesh vertex, laid out for [`BILLBOARD_WGSL`].
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position relative to the mesh origin.
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32x2];

    /// Vertex buffer layout matching the shader inputs.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    const DEGENERATE: Vertex = Vertex {
        position: [0.0; 3],
        color: [0.0; 4],
        uv: [0.0; 2],
    };
}

/// Anything the mesh builder can draw.
pub trait Renderable {
    /// Whether this particle produces a visible quad.
    fn visible(&self) -> bool;
    fn world_position(&self) -> Vec3;
    fn world_velocity(&self) -> Vec3;
    fn render_color(&self) -> Vec4;
    fn render_size(&self) -> f32;
}

impl Renderable for Particle {
    #[inline]
    fn visible(&self) -> bool {
        self.is_alive() && self.size > 0.0
    }

    #[inline]
    fn world_position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    fn world_velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    fn render_color(&self) -> Vec4 {
        self.color
    }

    #[inline]
    fn render_size(&self) -> f32 {
        self.size
    }
}

impl Renderable for PhaseParticle {
    #[inline]
    fn visible(&self) -> bool {
        self.is_alive() && self.size > 0.0
    }

    #[inline]
    fn world_position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    fn world_velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    fn render_color(&self) -> Vec4 {
        self.color
    }

    #[inline]
    fn render_size(&self) -> f32 {
        self.size
    }
}

/// Grow-only quad mesh.
#[derive(Debug, Default, Clone)]
pub struct ParticleMesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    origin: Vec3,
    cursor: usize,
    last_written: usize,
}

impl ParticleMesh {
    /// Empty mesh with origin at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty mesh whose vertex positions are relative to `origin`.
    pub fn with_origin(origin: Vec3) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    /// All vertices, including degenerate slots.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Quad indices covering every slot.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Largest number of quads seen so far.
    pub fn quad_capacity(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    /// Quads written since the last [`ParticleMesh::begin`].
    pub fn quad_count(&self) -> usize {
        self.cursor
    }

    /// Start a frame, reserving room for `quads` quads.
    pub fn begin(&mut self, quads: usize) {
        self.ensure_capacity(quads);
        self.cursor = 0;
    }

    /// Append one buffer's particles.
    pub fn push<P: Renderable>(
        &mut self,
        particles: &[P],
        trail: Option<&TrailSettings>,
        camera: &CameraFrame,
    ) {
        self.ensure_capacity(self.cursor + particles.len());
        for p in particles {
            let quad = self.quad(p, trail, camera);
            let start = self.cursor * VERTICES_PER_QUAD;
            self.vertices[start..start + VERTICES_PER_QUAD].copy_from_slice(&quad);
            self.cursor += 1;
        }
    }

    /// End a frame: slots left over from a larger previous frame become
    /// degenerate.
    pub fn finish(&mut self) {
        if self.last_written > self.cursor {
            let from = self.cursor * VERTICES_PER_QUAD;
            let to = self.last_written * VERTICES_PER_QUAD;
            self.vertices[from..to].fill(Vertex::DEGENERATE);
        }
        self.last_written = self.cursor;
    }

    /// Rebuild from a single buffer.
    pub fn build_from<P: Renderable>(
        &mut self,
        particles: &[P],
        trail: Option<&TrailSettings>,
        camera: &CameraFrame,
    ) {
        self.begin(particles.len());
        self.push(particles, trail, camera);
        self.finish();
    }

    fn ensure_capacity(&mut self, quads: usize) {
        let current = self.quad_capacity();
        if quads <= current {
            return;
        }
        self.vertices
            .resize(quads * VERTICES_PER_QUAD, Vertex::DEGENERATE);
        self.indices.reserve((quads - current) * INDICES_PER_QUAD);
        for q in current..quads {
            let base = (q * VERTICES_PER_QUAD) as u32;
            self.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    fn quad<P: Renderable>(
        &self,
        p: &P,
        trail: Option<&TrailSettings>,
        camera: &CameraFrame,
    ) -> [Vertex; VERTICES_PER_QUAD] {
        if !p.visible() {
            return [Vertex::DEGENERATE; VERTICES_PER_QUAD];
        }

        let center = p.world_position() - self.origin;
        let half = p.render_size() * 0.5;
        let color = p.render_color().to_array();

        let stretched = trail.and_then(|t| {
            let velocity = p.world_velocity();
            let length = t.stretch_for(velocity.length())?;
            let axis = camera.project_on_screen(velocity).try_normalize()?;
            Some((axis, length))
        });

        let corners = match stretched {
            Some((axis, length)) => {
                let side = camera.forward.cross(axis).normalize_or_zero() * half;
                let head = center + axis * half;
                let tail = center - axis * (half + length);
                [tail - side, head - side, head + side, tail + side]
            }
            None => {
                let right = camera.right * half;
                let up = camera.up * half;
                [
                    center - right - up,
                    center + right - up,
                    center + right + up,
                    center - right + up,
                ]
            }
        };

        const UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        let mut out = [Vertex::DEGENERATE; VERTICES_PER_QUAD];
        for ((v, corner), uv) in out.iter_mut().zip(corners).zip(UVS) {
            *v = Vertex {
                position: corner.to_array(),
                color,
                uv,
            };
        }
        out
    }
}

/// Shader for [`ParticleMesh`]: soft round sprites, premultiplied for
/// additive blending.
///
/// Bind group 0, binding 0 holds a [`MeshUniforms`].
pub const BILLBOARD_WGSL: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    origin: vec4<f32>,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(in.position + uniforms.origin.xyz, 1.0);
    out.color = in.color;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let d = length(in.uv * 2.0 - vec2<f32>(1.0, 1.0));
    let falloff = clamp(1.0 - d, 0.0, 1.0);
    let alpha = in.color.a * falloff * falloff;
    return vec4<f32>(in.color.rgb * alpha, alpha);
}
"#;

/// Uniform block for [`BILLBOARD_WGSL`].
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Mesh origin in xyz, w unused.
    pub origin: [f32; 4],
}

impl MeshUniforms {
    pub fn new(view_proj: glam::Mat4, origin: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            origin: origin.extend(0.0).to_array(),
        }
    }
}
