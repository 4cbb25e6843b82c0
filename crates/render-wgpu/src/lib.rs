//! wgpu frame renderer for the sprite grid.
//!
//! Each canvas owns a [`RenderContext`]: its own device, linked program,
//! location cache, vertex buffers and textures. The host calls
//! [`RenderContext::render`] once per tick with the elapsed time.
//!
//! # Invariants
//! - Vertex buffers are uploaded once at creation and only bound afterwards.
//! - Textures start as a 1×1 placeholder and are swapped when their background
//!   decode publishes; a failed decode, or an image the device cannot hold,
//!   keeps the placeholder.
//! - The render loop never blocks on texture loading.
//! - Contexts share nothing on the GPU side.

mod buffers;
mod context;
mod error;
mod frame;
mod gpu;
#[cfg(test)]
mod headless;
mod pipeline;
mod shaders;
mod texture;

pub use buffers::{VertexBuffers, attribute_data};
pub use context::{ContextOptions, ContextState, RenderContext};
pub use error::RenderError;
pub use frame::FrameUniforms;
pub use gpu::Gpu;
pub use pipeline::{
    AttributeSlot, BindingSource, DEPTH_FORMAT, SpritePipeline, TextureSlot, attribute_components,
    attribute_slots, binding_plan,
};
pub use shaders::{SPRITE_FRAGMENT_SHADER, SPRITE_VERTEX_SHADER, shader_sources};
pub use texture::{DecodedImage, LoadStatus, PLACEHOLDER_PIXEL, TextureLoad, decode_image};

pub fn crate_info() -> &'static str {
    "spritegrid-render-wgpu v0.1.0"
}
