//! Program Loader: compiles a vertex and a fragment WGSL stage, links them and
//! introspects attribute/uniform locations into a per-context cache.
//!
//! # Invariants
//! - Compile and link failures are fatal and carry the front end's diagnostic log.
//! - A name the program does not declare is never fatal: it resolves to `None`
//!   and every write aimed at it is a no-op.

mod cache;
mod error;
mod link;
mod stage;
mod uniforms;

pub use cache::{BlockLayout, ProgramCache, ResourceKind, UniformLocation};
pub use error::ProgramError;
pub use link::Program;
pub use stage::{CompiledStage, ShaderSource, ShaderStage};
pub use uniforms::UniformBlock;

/// Uniform names every sprite program is queried for.
///
/// `uNormals` is queried but never written by the renderer.
pub const UNIFORM_NAMES: &[&str] = &[
    "uModelMatrix",
    "uViewMatrix",
    "uProjectionMatrix",
    "uSpriteSampler",
    "uNormalSampler",
    "uNormals",
    "uLightPos",
    "uNormalMapOn",
    "uTime",
    "uTextureFilter",
];

/// Vertex attribute names every sprite program is queried for.
pub const ATTRIBUTE_NAMES: &[&str] = &[
    "aVertexPosition",
    "aVertexNormal",
    "aVertexTangent",
    "aVertexBitangent",
    "aTextureCoord",
];

pub fn crate_info() -> &'static str {
    "spritegrid-program v0.1.0"
}
