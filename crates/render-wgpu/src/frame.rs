use glam::Vec3;
use spritegrid_program::{ProgramCache, UniformBlock};
use spritegrid_scene::{RenderMode, Transforms};

/// Per-frame values written into the uniform block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub transforms: Transforms,
    pub light_position: Vec3,
    pub elapsed_ms: f64,
}

impl FrameUniforms {
    /// Write this frame's values at the cached locations.
    ///
    /// Locations that did not resolve, or that live in another block, are skipped.
    pub fn stage(&self, cache: &ProgramCache, mode: RenderMode, block: &mut UniformBlock) {
        let t = &self.transforms;
        block.set_mat4(cache.uniform("uProjectionMatrix"), &t.projection.to_cols_array());
        block.set_mat4(cache.uniform("uModelMatrix"), &t.model.to_cols_array());
        block.set_mat4(cache.uniform("uViewMatrix"), &t.view.to_cols_array());
        block.set_vec3(cache.uniform("uLightPos"), self.light_position.to_array());

        if let Some(on) = mode.normal_map_flag() {
            block.set_bool(cache.uniform("uNormalMapOn"), on);
        }
        if mode.uses_time() {
            block.set_f32(cache.uniform("uTime"), (self.elapsed_ms / 1000.0) as f32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::shader_sources;
    use glam::Mat4;
    use spritegrid_program::{ATTRIBUTE_NAMES, Program, UNIFORM_NAMES, UniformLocation};
    use spritegrid_scene::{FixedCamera, LightOrbit, ShaderConfig};

    fn cache() -> ProgramCache {
        let (vertex, fragment) = shader_sources(&ShaderConfig::default()).unwrap();
        let program = Program::build(&vertex, &fragment).unwrap();
        ProgramCache::resolve(&program, ATTRIBUTE_NAMES, UNIFORM_NAMES)
    }

    fn frame(elapsed_ms: f64) -> FrameUniforms {
        FrameUniforms {
            transforms: Transforms::compute(&FixedCamera::default(), 1.5),
            light_position: LightOrbit::default().position_at(elapsed_ms),
            elapsed_ms,
        }
    }

    fn read(block: &UniformBlock, cache: &ProgramCache, name: &str) -> Vec<u8> {
        match cache.uniform(name) {
            Some(UniformLocation::Block { offset, size, .. }) => {
                block.bytes()[offset as usize..(offset + size) as usize].to_vec()
            }
            other => panic!("{name}: {other:?}"),
        }
    }

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn staged(mode: RenderMode, elapsed_ms: f64) -> (ProgramCache, UniformBlock) {
        let cache = cache();
        let mut block = UniformBlock::new(cache.uniform_blocks()[0]);
        frame(elapsed_ms).stage(&cache, mode, &mut block);
        (cache, block)
    }

    #[test]
    fn matrices_and_light_land_at_their_offsets() {
        let (cache, block) = staged(RenderMode::NormalMapped, 0.0);
        let expected = frame(0.0);

        let model = floats(&read(&block, &cache, "uModelMatrix"));
        assert_eq!(model, Mat4::IDENTITY.to_cols_array());
        let view = floats(&read(&block, &cache, "uViewMatrix"));
        assert_eq!(view, expected.transforms.view.to_cols_array());
        let projection = floats(&read(&block, &cache, "uProjectionMatrix"));
        assert_eq!(projection, expected.transforms.projection.to_cols_array());
        assert_eq!(floats(&read(&block, &cache, "uLightPos")), vec![2.25, 1.5, 1.0]);
    }

    #[test]
    fn normal_mapped_and_flat_differ_only_in_the_flag() {
        let (cache, mapped) = staged(RenderMode::NormalMapped, 1234.0);
        let (_, flat) = staged(RenderMode::Flat, 1234.0);

        assert_eq!(read(&mapped, &cache, "uNormalMapOn"), 1u32.to_ne_bytes());
        assert_eq!(read(&flat, &cache, "uNormalMapOn"), 0u32.to_ne_bytes());
        assert_eq!(read(&mapped, &cache, "uTime"), [0; 4]);
        assert_eq!(read(&flat, &cache, "uTime"), [0; 4]);
    }

    #[test]
    fn animated_writes_elapsed_seconds() {
        let (cache, block) = staged(RenderMode::Animated, 2500.0);
        assert_eq!(read(&block, &cache, "uTime"), 2.5f32.to_ne_bytes());
        assert_eq!(read(&block, &cache, "uNormalMapOn"), [0; 4]);
    }
}
