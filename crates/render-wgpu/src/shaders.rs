use spritegrid_program::{ProgramError, ShaderSource};
use spritegrid_scene::ShaderConfig;

/// Vertex stage: passes the tangent frame and world position to the fragment stage.
pub const SPRITE_VERTEX_SHADER: &str = r#"
struct SpriteUniforms {
    uModelMatrix: mat4x4<f32>,
    uViewMatrix: mat4x4<f32>,
    uProjectionMatrix: mat4x4<f32>,
    uLightPos: vec3<f32>,
    uNormalMapOn: u32,
    uTime: f32,
};

@group(0) @binding(0)
var<uniform> sprite: SpriteUniforms;

struct VertexInput {
    @location(0) aVertexPosition: vec3<f32>,
    @location(1) aVertexNormal: vec3<f32>,
    @location(2) aVertexTangent: vec3<f32>,
    @location(3) aVertexBitangent: vec3<f32>,
    @location(4) aTextureCoord: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) world_position: vec3<f32>,
    @location(2) tangent: vec3<f32>,
    @location(3) bitangent: vec3<f32>,
    @location(4) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let model = sprite.uModelMatrix;
    let model3 = mat3x3<f32>(model[0].xyz, model[1].xyz, model[2].xyz);
    let world = model * vec4<f32>(in.aVertexPosition, 1.0);

    var out: VertexOutput;
    out.clip_position = sprite.uProjectionMatrix * sprite.uViewMatrix * world;
    out.uv = in.aTextureCoord;
    out.world_position = world.xyz;
    out.tangent = normalize(model3 * in.aVertexTangent);
    out.bitangent = normalize(model3 * in.aVertexBitangent);
    out.normal = normalize(model3 * in.aVertexNormal);
    return out;
}
"#;

/// Fragment stage: diffuse lighting from a point light, optionally through the normal map.
///
/// `uNormalMapOn` selects the mapped normal outright; a non-zero `uTime`
/// fades the mapped normal in and out instead.
pub const SPRITE_FRAGMENT_SHADER: &str = r#"
struct SpriteUniforms {
    uModelMatrix: mat4x4<f32>,
    uViewMatrix: mat4x4<f32>,
    uProjectionMatrix: mat4x4<f32>,
    uLightPos: vec3<f32>,
    uNormalMapOn: u32,
    uTime: f32,
};

@group(0) @binding(0)
var<uniform> sprite: SpriteUniforms;

@group(1) @binding(0)
var uSpriteSampler: texture_2d<f32>;
@group(1) @binding(1)
var uNormalSampler: texture_2d<f32>;
@group(1) @binding(2)
var uTextureFilter: sampler;

const AMBIENT: f32 = 0.15;

@fragment
fn fs_main(
    @location(0) uv: vec2<f32>,
    @location(1) world_position: vec3<f32>,
    @location(2) tangent: vec3<f32>,
    @location(3) bitangent: vec3<f32>,
    @location(4) normal: vec3<f32>,
) -> @location(0) vec4<f32> {
    let base = textureSample(uSpriteSampler, uTextureFilter, uv);
    let sampled = textureSample(uNormalSampler, uTextureFilter, uv).xyz * 2.0 - 1.0;

    let geometric = normalize(normal);
    let tbn = mat3x3<f32>(normalize(tangent), normalize(bitangent), geometric);
    let mapped = normalize(tbn * sampled);

    var strength = f32(sprite.uNormalMapOn);
    if (sprite.uTime > 0.0) {
        strength = max(strength, 0.5 + 0.5 * sin(sprite.uTime));
    }
    let n = normalize(mix(geometric, mapped, strength));

    let to_light = sprite.uLightPos - world_position;
    let attenuation = 1.0 / (1.0 + 0.5 * dot(to_light, to_light));
    let diffuse = max(dot(n, normalize(to_light)), 0.0) * attenuation;

    return vec4<f32>(base.rgb * (AMBIENT + diffuse), base.a);
}
"#;

/// The built-in stages, or files named by `config` in their place.
pub fn shader_sources(config: &ShaderConfig) -> Result<(ShaderSource, ShaderSource), ProgramError> {
    let vertex = match &config.vertex {
        Some(path) => ShaderSource::from_file(path)?,
        None => ShaderSource::new("sprite-vertex", SPRITE_VERTEX_SHADER),
    };
    let fragment = match &config.fragment {
        Some(path) => ShaderSource::from_file(path)?,
        None => ShaderSource::new("sprite-fragment", SPRITE_FRAGMENT_SHADER),
    };
    Ok((vertex, fragment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spritegrid_program::{ATTRIBUTE_NAMES, Program, ProgramCache, UNIFORM_NAMES};

    fn builtin() -> Program {
        let (vertex, fragment) = shader_sources(&ShaderConfig::default()).unwrap();
        Program::build(&vertex, &fragment).unwrap()
    }

    #[test]
    fn builtin_stages_link() {
        let program = builtin();
        assert_eq!(program.vertex.label, "sprite-vertex");
        assert_eq!(program.fragment.entry_point, "fs_main");
    }

    #[test]
    fn builtin_stages_declare_every_name_but_u_normals() {
        let cache = ProgramCache::resolve(&builtin(), ATTRIBUTE_NAMES, UNIFORM_NAMES);
        assert_eq!(cache.missing(), vec!["uNormals"]);
        assert_eq!(cache.attribute("aVertexPosition"), Some(0));
        assert_eq!(cache.attribute("aTextureCoord"), Some(4));
    }

    #[test]
    fn file_overrides_replace_one_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom-fragment.wgsl");
        std::fs::write(&path, SPRITE_FRAGMENT_SHADER).unwrap();

        let config = ShaderConfig {
            vertex: None,
            fragment: Some(path),
        };
        let (vertex, fragment) = shader_sources(&config).unwrap();
        assert_eq!(vertex.label, "sprite-vertex");
        assert_eq!(fragment.label, "custom-fragment.wgsl");
    }

    #[test]
    fn missing_override_is_a_read_error() {
        let config = ShaderConfig {
            vertex: Some("nowhere/vertex.wgsl".into()),
            fragment: None,
        };
        assert!(matches!(
            shader_sources(&config),
            Err(ProgramError::Read { .. })
        ));
    }
}
