use std::collections::BTreeMap;

use spritegrid_program::{
    ATTRIBUTE_NAMES, Program, ProgramCache, ProgramError, ResourceKind, UniformLocation,
};

/// A vertex attribute the program reads, with the buffer layout feeding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSlot {
    pub name: &'static str,
    pub location: u32,
    pub components: u32,
}

/// Floats per vertex for a named attribute.
pub fn attribute_components(name: &str) -> u32 {
    match name {
        "aTextureCoord" => 2,
        _ => 3,
    }
}

/// Resolved attributes in [`ATTRIBUTE_NAMES`] order; unresolved ones are left out.
pub fn attribute_slots(cache: &ProgramCache) -> Vec<AttributeSlot> {
    ATTRIBUTE_NAMES
        .iter()
        .copied()
        .filter_map(|name| {
            cache.attribute(name).map(|location| AttributeSlot {
                name,
                location,
                components: attribute_components(name),
            })
        })
        .collect()
}

/// Which texture a texture binding samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse,
    NormalMap,
}

impl TextureSlot {
    pub fn uniform_name(self) -> &'static str {
        match self {
            Self::Diffuse => "uSpriteSampler",
            Self::NormalMap => "uNormalSampler",
        }
    }

    fn from_uniform(name: &str) -> Option<Self> {
        match name {
            "uSpriteSampler" => Some(Self::Diffuse),
            "uNormalSampler" => Some(Self::NormalMap),
            _ => None,
        }
    }
}

/// What fills one binding of a bind group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// Index into [`ProgramCache::uniform_blocks`].
    Block(usize),
    Texture(TextureSlot),
    Sampler,
}

/// Bindings of one bind group, derived from the cache.
pub fn binding_plan(cache: &ProgramCache) -> BTreeMap<u32, BTreeMap<u32, BindingSource>> {
    let mut groups: BTreeMap<u32, BTreeMap<u32, BindingSource>> = BTreeMap::new();

    for (index, block) in cache.uniform_blocks().iter().enumerate() {
        groups
            .entry(block.group)
            .or_default()
            .insert(block.binding, BindingSource::Block(index));
    }

    for (name, location) in cache.uniforms() {
        let Some(UniformLocation::Resource { group, binding, kind }) = location else {
            continue;
        };
        let source = match kind {
            ResourceKind::Sampler => BindingSource::Sampler,
            ResourceKind::Texture => match TextureSlot::from_uniform(name) {
                Some(slot) => BindingSource::Texture(slot),
                None => continue,
            },
        };
        groups.entry(group).or_default().insert(binding, source);
    }

    groups
}

/// One bind group layout and the sources for its entries.
pub struct GroupLayout {
    pub index: u32,
    pub layout: wgpu::BindGroupLayout,
    pub entries: Vec<(u32, BindingSource)>,
}

/// The linked program turned into a render pipeline.
pub struct SpritePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub groups: Vec<GroupLayout>,
    pub attributes: Vec<AttributeSlot>,
}

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

impl SpritePipeline {
    /// Build the pipeline inside a validation error scope.
    ///
    /// Anything wgpu rejects (an interface the cache could not describe, a
    /// binding the layout misses) is reported as a link failure.
    pub fn create(
        device: &wgpu::Device,
        program: &Program,
        cache: &ProgramCache,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self, ProgramError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let plan = binding_plan(cache);
        let group_count = plan.keys().next_back().map_or(0, |last| last + 1);
        let blocks = cache.uniform_blocks();

        let groups: Vec<GroupLayout> = (0..group_count)
            .map(|index| {
                let entries: Vec<(u32, BindingSource)> = plan
                    .get(&index)
                    .map(|bindings| bindings.iter().map(|(b, s)| (*b, *s)).collect())
                    .unwrap_or_default();
                let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = entries
                    .iter()
                    .map(|(binding, source)| wgpu::BindGroupLayoutEntry {
                        binding: *binding,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: match source {
                            BindingSource::Block(block) => wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: wgpu::BufferSize::new(blocks[*block].size as u64),
                            },
                            BindingSource::Texture(_) => wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            BindingSource::Sampler => {
                                wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
                            }
                        },
                        count: None,
                    })
                    .collect();
                let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("sprite_group_{index}_layout")),
                    entries: &layout_entries,
                });
                GroupLayout {
                    index,
                    layout,
                    entries,
                }
            })
            .collect();

        let layout_refs: Vec<&wgpu::BindGroupLayout> = groups.iter().map(|g| &g.layout).collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &layout_refs,
            push_constant_ranges: &[],
        });

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.vertex.label.as_str()),
            source: wgpu::ShaderSource::Wgsl(program.vertex.code.as_str().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.fragment.label.as_str()),
            source: wgpu::ShaderSource::Wgsl(program.fragment.code.as_str().into()),
        });

        // One tightly packed buffer per attribute.
        let attributes = attribute_slots(cache);
        let vertex_attributes: Vec<[wgpu::VertexAttribute; 1]> = attributes
            .iter()
            .map(|slot| {
                [wgpu::VertexAttribute {
                    format: match slot.components {
                        2 => wgpu::VertexFormat::Float32x2,
                        _ => wgpu::VertexFormat::Float32x3,
                    },
                    offset: 0,
                    shader_location: slot.location,
                }]
            })
            .collect();
        let buffer_layouts: Vec<wgpu::VertexBufferLayout> = attributes
            .iter()
            .zip(&vertex_attributes)
            .map(|(slot, attrs)| wgpu::VertexBufferLayout {
                array_stride: (slot.components as usize * std::mem::size_of::<f32>()) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(program.vertex.entry_point.as_str()),
                compilation_options: Default::default(),
                buffers: &buffer_layouts,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(program.fragment.entry_point.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ProgramError::ProgramLink {
                log: format!("error: {err}"),
            });
        }

        tracing::debug!(
            groups = groups.len(),
            attributes = attributes.len(),
            "created sprite pipeline"
        );

        Ok(Self {
            pipeline,
            groups,
            attributes,
        })
    }
}

/// Depth attachment matching the surface size.
pub fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::{SPRITE_FRAGMENT_SHADER, shader_sources};
    use spritegrid_program::{BlockLayout, ShaderSource, UNIFORM_NAMES};
    use spritegrid_scene::ShaderConfig;

    fn builtin_cache() -> ProgramCache {
        let (vertex, fragment) = shader_sources(&ShaderConfig::default()).unwrap();
        let program = Program::build(&vertex, &fragment).unwrap();
        ProgramCache::resolve(&program, ATTRIBUTE_NAMES, UNIFORM_NAMES)
    }

    #[test]
    fn every_attribute_gets_a_packed_slot() {
        let slots = attribute_slots(&builtin_cache());
        let names: Vec<_> = slots.iter().map(|s| s.name).collect();
        assert_eq!(names, ATTRIBUTE_NAMES);
        assert_eq!(slots[4].components, 2);
        assert!(slots[..4].iter().all(|s| s.components == 3));
    }

    #[test]
    fn plan_puts_block_in_group_zero_and_textures_in_group_one() {
        let cache = builtin_cache();
        let plan = binding_plan(&cache);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[&0][&0], BindingSource::Block(0));
        assert_eq!(plan[&1][&0], BindingSource::Texture(TextureSlot::Diffuse));
        assert_eq!(plan[&1][&1], BindingSource::Texture(TextureSlot::NormalMap));
        assert_eq!(plan[&1][&2], BindingSource::Sampler);
        assert_eq!(
            cache.uniform_blocks()[0],
            BlockLayout {
                group: 0,
                binding: 0,
                size: 224
            }
        );
    }

    #[test]
    fn texture_slots_map_back_to_uniform_names() {
        for slot in [TextureSlot::Diffuse, TextureSlot::NormalMap] {
            assert_eq!(TextureSlot::from_uniform(slot.uniform_name()), Some(slot));
        }
        assert_eq!(TextureSlot::from_uniform("uNormals"), None);
    }

    const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

    #[test]
    fn builtin_program_creates_a_pipeline() {
        let Some((device, _queue)) = crate::headless::device() else {
            eprintln!("no adapter; skipping");
            return;
        };
        let (vertex, fragment) = shader_sources(&ShaderConfig::default()).unwrap();
        let program = Program::build(&vertex, &fragment).unwrap();
        let cache = ProgramCache::resolve(&program, ATTRIBUTE_NAMES, UNIFORM_NAMES);

        let pipeline = SpritePipeline::create(&device, &program, &cache, COLOR_FORMAT).unwrap();
        assert_eq!(pipeline.groups.len(), 2);
        assert_eq!(pipeline.attributes.len(), ATTRIBUTE_NAMES.len());
        assert_eq!(pipeline.groups[1].entries.len(), 3);
    }

    #[test]
    fn undescribed_resource_is_a_link_error() {
        let Some((device, _queue)) = crate::headless::device() else {
            eprintln!("no adapter; skipping");
            return;
        };
        // A detail texture no requested name resolves, so no layout entry covers it.
        let fragment = SPRITE_FRAGMENT_SHADER
            .replace(
                "const AMBIENT",
                "@group(1) @binding(3)\nvar uDetail: texture_2d<f32>;\n\nconst AMBIENT",
            )
            .replace(
                "let base = textureSample(uSpriteSampler, uTextureFilter, uv);",
                "let base = textureSample(uSpriteSampler, uTextureFilter, uv)\n        * textureSample(uDetail, uTextureFilter, uv);",
            );
        assert!(fragment.contains("uDetail, uTextureFilter"));

        let (vertex, _) = shader_sources(&ShaderConfig::default()).unwrap();
        let program = Program::build(&vertex, &ShaderSource::new("detail-fragment", fragment)).unwrap();
        let cache = ProgramCache::resolve(&program, ATTRIBUTE_NAMES, UNIFORM_NAMES);
        assert!(cache.uniform("uDetail").is_none());

        match SpritePipeline::create(&device, &program, &cache, COLOR_FORMAT) {
            Err(ProgramError::ProgramLink { log }) => assert!(!log.is_empty()),
            Err(other) => panic!("expected a link error, got {other}"),
            Ok(_) => panic!("pipeline accepted a binding missing from its layout"),
        }
    }
}
