use std::path::PathBuf;

use spritegrid_geometry::VertexArrays;
use spritegrid_program::{
    ATTRIBUTE_NAMES, Program, ProgramCache, ShaderSource, UNIFORM_NAMES, UniformBlock,
};
use spritegrid_scene::{FixedCamera, LightOrbit, RenderMode, Transforms, aspect_ratio};

use crate::buffers::VertexBuffers;
use crate::error::RenderError;
use crate::frame::FrameUniforms;
use crate::gpu::Gpu;
use crate::pipeline::{BindingSource, SpritePipeline, TextureSlot, create_depth_view};
use crate::texture::{GpuTexture, LoadStatus, TextureLoad, create_sampler};

/// Lifecycle of a context. There is no terminal state; the host decides when to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Constructed; no frame drawn yet.
    Idle,
    /// At least one frame drawn.
    Drawing,
}

/// Everything a context is built from.
pub struct ContextOptions<'a> {
    pub id: &'a str,
    pub mode: RenderMode,
    pub arrays: &'a VertexArrays,
    pub vertex: &'a ShaderSource,
    pub fragment: &'a ShaderSource,
    pub diffuse: PathBuf,
    pub normal_map: PathBuf,
    pub camera: FixedCamera,
    pub light: LightOrbit,
}

struct UniformSlot {
    block: UniformBlock,
    buffer: wgpu::Buffer,
}

/// One canvas: its own GPU stack, program, cache, buffers and textures.
pub struct RenderContext {
    id: String,
    mode: RenderMode,
    state: ContextState,
    gpu: Gpu,
    cache: ProgramCache,
    pipeline: SpritePipeline,
    vertices: VertexBuffers,
    uniforms: Vec<UniformSlot>,
    diffuse: GpuTexture,
    normal_map: GpuTexture,
    sampler: wgpu::Sampler,
    bind_groups: Vec<wgpu::BindGroup>,
    loads: Vec<(TextureSlot, TextureLoad)>,
    depth: wgpu::TextureView,
    camera: FixedCamera,
    light: LightOrbit,
}

impl RenderContext {
    /// Build a context on `target`.
    ///
    /// Compiles and links the program, resolves the location cache, uploads the
    /// vertex arrays once and starts both texture loads behind placeholders.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        options: ContextOptions<'_>,
    ) -> Result<Self, RenderError> {
        let gpu = Gpu::new(target, width, height, options.id)?;
        let device = gpu.device();

        let program = Program::build(options.vertex, options.fragment)?;
        let cache = ProgramCache::resolve(&program, ATTRIBUTE_NAMES, UNIFORM_NAMES);
        let pipeline = SpritePipeline::create(device, &program, &cache, gpu.surface_format())?;

        let vertices = VertexBuffers::upload(device, options.arrays, &pipeline.attributes);

        let uniforms = cache
            .uniform_blocks()
            .iter()
            .map(|layout| UniformSlot {
                block: UniformBlock::new(*layout),
                buffer: device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("sprite_uniforms"),
                    size: layout.size as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }),
            })
            .collect();

        let queue = gpu.queue();
        let diffuse = GpuTexture::placeholder(device, queue, "diffuse", diffuse_format());
        let normal_map = GpuTexture::placeholder(device, queue, "normal_map", normal_map_format());
        let sampler = create_sampler(device);
        let loads = vec![
            (TextureSlot::Diffuse, TextureLoad::spawn(options.diffuse)),
            (TextureSlot::NormalMap, TextureLoad::spawn(options.normal_map)),
        ];

        let (w, h) = gpu.size();
        let depth = create_depth_view(device, w, h);

        let mut context = Self {
            id: options.id.to_string(),
            mode: options.mode,
            state: ContextState::Idle,
            gpu,
            cache,
            pipeline,
            vertices,
            uniforms,
            diffuse,
            normal_map,
            sampler,
            bind_groups: Vec::new(),
            loads,
            depth,
            camera: options.camera,
            light: options.light,
        };
        context.rebuild_bind_groups();

        tracing::info!(
            context = %context.id,
            mode = ?context.mode,
            vertices = context.vertices.vertex_count(),
            "context ready"
        );
        Ok(context)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        let (w, h) = self.gpu.size();
        self.depth = create_depth_view(self.gpu.device(), w, h);
    }

    /// Draw one frame at `elapsed_ms` since start.
    ///
    /// A skipped frame (surface lost, outdated or timed out) is not an error.
    pub fn render(&mut self, elapsed_ms: f64) -> Result<(), RenderError> {
        self.poll_textures();

        let (width, height) = self.gpu.size();
        let frame = FrameUniforms {
            transforms: Transforms::compute(&self.camera, aspect_ratio(width, height)),
            light_position: self.light.position_at(elapsed_ms),
            elapsed_ms,
        };
        for slot in &mut self.uniforms {
            frame.stage(&self.cache, self.mode, &mut slot.block);
            self.gpu
                .queue()
                .write_buffer(&slot.buffer, 0, slot.block.bytes());
        }

        let Some(output) = self.gpu.acquire()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sprite_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if self.vertices.vertex_count() > 0 {
                pass.set_pipeline(&self.pipeline.pipeline);
                for (index, group) in self.bind_groups.iter().enumerate() {
                    pass.set_bind_group(index as u32, group, &[]);
                }
                self.vertices.bind(&mut pass);
                pass.draw(0..self.vertices.vertex_count(), 0..1);
            }
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        output.present();

        self.state = ContextState::Drawing;
        Ok(())
    }

    /// Swap in any texture whose decode has finished.
    fn poll_textures(&mut self) {
        let mut changed = false;
        let loads = std::mem::take(&mut self.loads);
        for (slot, load) in loads {
            match load.poll() {
                LoadStatus::Pending => self.loads.push((slot, load)),
                LoadStatus::Loaded(image) => {
                    let (label, format) = match slot {
                        TextureSlot::Diffuse => ("diffuse", diffuse_format()),
                        TextureSlot::NormalMap => ("normal_map", normal_map_format()),
                    };
                    let uploaded = GpuTexture::try_upload(
                        self.gpu.device(),
                        self.gpu.queue(),
                        label,
                        &image,
                        format,
                    );
                    let Some(texture) = uploaded else {
                        tracing::warn!(
                            context = %self.id,
                            texture = slot.uniform_name(),
                            path = %load.path().display(),
                            "keeping placeholder"
                        );
                        continue;
                    };
                    match slot {
                        TextureSlot::Diffuse => self.diffuse = texture,
                        TextureSlot::NormalMap => self.normal_map = texture,
                    }
                    tracing::info!(
                        context = %self.id,
                        texture = slot.uniform_name(),
                        path = %load.path().display(),
                        "texture swapped in"
                    );
                    changed = true;
                }
                LoadStatus::Abandoned => {
                    tracing::debug!(
                        context = %self.id,
                        texture = slot.uniform_name(),
                        "keeping placeholder"
                    );
                }
            }
        }
        if changed {
            self.rebuild_bind_groups();
        }
    }

    fn rebuild_bind_groups(&mut self) {
        let device = self.gpu.device();
        self.bind_groups = self
            .pipeline
            .groups
            .iter()
            .map(|group| {
                let entries: Vec<wgpu::BindGroupEntry> = group
                    .entries
                    .iter()
                    .map(|(binding, source)| wgpu::BindGroupEntry {
                        binding: *binding,
                        resource: match source {
                            BindingSource::Block(index) => {
                                self.uniforms[*index].buffer.as_entire_binding()
                            }
                            BindingSource::Texture(TextureSlot::Diffuse) => {
                                wgpu::BindingResource::TextureView(&self.diffuse.view)
                            }
                            BindingSource::Texture(TextureSlot::NormalMap) => {
                                wgpu::BindingResource::TextureView(&self.normal_map.view)
                            }
                            BindingSource::Sampler => wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    })
                    .collect();
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("sprite_group_{}", group.index)),
                    layout: &group.layout,
                    entries: &entries,
                })
            })
            .collect();
    }
}

/// Colour data is authored in sRGB.
fn diffuse_format() -> wgpu::TextureFormat {
    wgpu::TextureFormat::Rgba8UnormSrgb
}

/// Normal maps store vectors, not colours.
fn normal_map_format() -> wgpu::TextureFormat {
    wgpu::TextureFormat::Rgba8Unorm
}
