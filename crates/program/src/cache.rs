use std::collections::BTreeMap;

use crate::link::{Program, collect_locations};

/// Kind of an opaque resource binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    Sampler,
}

/// Where a uniform lives once the program is linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformLocation {
    /// A member of (or the whole of) the uniform block bound at `(group, binding)`.
    Block {
        group: u32,
        binding: u32,
        offset: u32,
        size: u32,
    },
    /// A texture or sampler bound at `(group, binding)`.
    Resource {
        group: u32,
        binding: u32,
        kind: ResourceKind,
    },
}

impl UniformLocation {
    pub fn group(&self) -> u32 {
        match self {
            Self::Block { group, .. } | Self::Resource { group, .. } => *group,
        }
    }

    pub fn binding(&self) -> u32 {
        match self {
            Self::Block { binding, .. } | Self::Resource { binding, .. } => *binding,
        }
    }
}

/// A uniform block declared by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockLayout {
    pub group: u32,
    pub binding: u32,
    /// Size in bytes, including trailing padding.
    pub size: u32,
}

/// Resolved attribute slots and uniform locations for one program.
///
/// Built once after linking. Names the program does not declare map to `None`.
#[derive(Debug, Clone, Default)]
pub struct ProgramCache {
    attributes: BTreeMap<String, Option<u32>>,
    uniforms: BTreeMap<String, Option<UniformLocation>>,
    blocks: Vec<BlockLayout>,
}

impl ProgramCache {
    /// Resolve every requested name against a linked program.
    ///
    /// Unresolved names are kept as `None` and reported with a warning.
    pub fn resolve(program: &Program, attribute_names: &[&str], uniform_names: &[&str]) -> Self {
        let mut declared_inputs = BTreeMap::new();
        let vertex = &program.vertex;
        for (index, arg) in vertex.entry().function.arguments.iter().enumerate() {
            let name = arg.name.clone().unwrap_or_else(|| format!("arg{index}"));
            collect_locations(&vertex.module, &name, arg.ty, arg.binding.as_ref(), &mut declared_inputs);
        }
        let slots: BTreeMap<String, u32> = declared_inputs
            .into_iter()
            .map(|(location, (name, _))| (name, location))
            .collect();

        let mut declared_uniforms = BTreeMap::new();
        let mut blocks = Vec::new();
        for stage in program.stages() {
            collect_uniforms(&stage.module, &mut declared_uniforms, &mut blocks);
        }

        let mut cache = Self {
            blocks,
            ..Self::default()
        };

        for name in attribute_names {
            let slot = slots.get(*name).copied();
            if slot.is_none() {
                tracing::warn!(attribute = name, "attribute has no location; uploads to it are skipped");
            }
            cache.attributes.insert(name.to_string(), slot);
        }

        for name in uniform_names {
            let location = declared_uniforms.get(*name).copied();
            if location.is_none() {
                tracing::warn!(uniform = name, "uniform has no location; writes to it are skipped");
            }
            cache.uniforms.insert(name.to_string(), location);
        }

        cache
    }

    /// Slot of a vertex attribute, `None` if unbound or never requested.
    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied().flatten()
    }

    /// Location of a uniform, `None` if unbound or never requested.
    pub fn uniform(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied().flatten()
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, Option<UniformLocation>)> {
        self.uniforms.iter().map(|(name, loc)| (name.as_str(), *loc))
    }

    /// Requested names (attributes, then uniforms) that did not resolve.
    pub fn missing(&self) -> Vec<&str> {
        let attributes = self.attributes.iter().filter(|(_, slot)| slot.is_none());
        let uniforms = self.uniforms.iter().filter(|(_, loc)| loc.is_none());
        attributes
            .map(|(name, _)| name.as_str())
            .chain(uniforms.map(|(name, _)| name.as_str()))
            .collect()
    }

    /// Uniform blocks declared by either stage, ordered by `(group, binding)`.
    pub fn uniform_blocks(&self) -> &[BlockLayout] {
        &self.blocks
    }
}

fn collect_uniforms(
    module: &naga::Module,
    uniforms: &mut BTreeMap<String, UniformLocation>,
    blocks: &mut Vec<BlockLayout>,
) {
    let gctx = module.to_ctx();

    for (_, var) in module.global_variables.iter() {
        let Some(binding) = var.binding.as_ref() else {
            continue;
        };
        let (group, binding) = (binding.group, binding.binding);
        let inner = &module.types[var.ty].inner;

        match var.space {
            naga::AddressSpace::Uniform => {
                let size = inner.size(gctx);
                if !blocks.iter().any(|b| b.group == group && b.binding == binding) {
                    blocks.push(BlockLayout { group, binding, size });
                    blocks.sort_by_key(|b| (b.group, b.binding));
                }

                if let Some(name) = &var.name {
                    uniforms.entry(name.clone()).or_insert(UniformLocation::Block {
                        group,
                        binding,
                        offset: 0,
                        size,
                    });
                }

                if let naga::TypeInner::Struct { members, .. } = inner {
                    for member in members {
                        let Some(name) = &member.name else { continue };
                        uniforms.entry(name.clone()).or_insert(UniformLocation::Block {
                            group,
                            binding,
                            offset: member.offset,
                            size: module.types[member.ty].inner.size(gctx),
                        });
                    }
                }
            }
            naga::AddressSpace::Handle => {
                let kind = match inner {
                    naga::TypeInner::Image { .. } => ResourceKind::Texture,
                    naga::TypeInner::Sampler { .. } => ResourceKind::Sampler,
                    _ => continue,
                };
                if let Some(name) = &var.name {
                    uniforms
                        .entry(name.clone())
                        .or_insert(UniformLocation::Resource { group, binding, kind });
                }
            }
            _ => {}
        }
    }
}
