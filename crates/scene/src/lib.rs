//! Scene state shared by every rendering context.
//!
//! Holds the configuration, the fixed camera and its per-frame transforms, the
//! orbiting point light and the canvas layouts.
//!
//! # Invariants
//! - Transforms and the light position are pure functions of configuration,
//!   surface size and elapsed time; nothing here touches the GPU.
//! - The light always lies on its orbit circle at a fixed height.

mod camera;
mod clock;
mod config;
mod light;
mod mode;

pub use camera::{FixedCamera, Transforms, aspect_ratio};
pub use clock::AnimationClock;
pub use config::{
    CameraConfig, ConfigError, GridConfig, LightConfig, SceneConfig, ShaderConfig, TextureConfig,
};
pub use light::LightOrbit;
pub use mode::{Canvas, Layout, RenderMode};

pub fn crate_info() -> &'static str {
    "spritegrid-scene v0.1.0"
}
