use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use spritegrid_geometry::VertexArrays;
use spritegrid_program::ShaderSource;
use spritegrid_render_wgpu::{ContextOptions, ContextState, RenderContext, shader_sources};
use spritegrid_scene::{AnimationClock, FixedCamera, Layout, LightOrbit, SceneConfig};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "spritegrid-desktop", about = "Normal-mapped sprite grid renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Canvas layout: side-by-side or single (overrides the config file)
    #[arg(short, long)]
    layout: Option<Layout>,
}

/// A window standing in for one canvas, and the context drawing into it.
struct Canvas {
    window: Arc<Window>,
    context: RenderContext,
}

struct SpriteApp {
    config: SceneConfig,
    arrays: VertexArrays,
    vertex: ShaderSource,
    fragment: ShaderSource,
    canvases: Vec<Canvas>,
    clock: AnimationClock,
    /// Elapsed time shared by every canvas drawn in the current tick.
    frame_ms: f64,
    fatal: Option<anyhow::Error>,
}

impl SpriteApp {
    fn new(config: SceneConfig) -> Result<Self> {
        let arrays = VertexArrays::for_grid(config.grid.size());
        let (vertex, fragment) = shader_sources(&config.shaders)?;
        tracing::info!(
            layout = %config.layout,
            vertices = arrays.vertex_count(),
            "scene prepared"
        );
        Ok(Self {
            config,
            arrays,
            vertex,
            fragment,
            canvases: Vec::new(),
            clock: AnimationClock::start(),
            frame_ms: 0.0,
            fatal: None,
        })
    }

    fn open_canvases(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let camera = FixedCamera::from_config(&self.config.camera);
        let light = LightOrbit::from_config(&self.config.light);

        for canvas in self.config.layout.canvases() {
            let attrs = Window::default_attributes()
                .with_title(canvas.id)
                .with_inner_size(PhysicalSize::new(640u32, 480));
            let window = Arc::new(
                event_loop
                    .create_window(attrs)
                    .with_context(|| format!("failed to open canvas `{}`", canvas.id))?,
            );
            let size = window.inner_size();

            let context = RenderContext::new(
                window.clone(),
                size.width,
                size.height,
                ContextOptions {
                    id: canvas.id,
                    mode: canvas.mode,
                    arrays: &self.arrays,
                    vertex: &self.vertex,
                    fragment: &self.fragment,
                    diffuse: self.config.textures.diffuse.clone(),
                    normal_map: self.config.textures.normal_map.clone(),
                    camera,
                    light,
                },
            )
            .with_context(|| format!("failed to set up canvas `{}`", canvas.id))?;

            self.canvases.push(Canvas { window, context });
        }
        Ok(())
    }

    fn canvas_mut(&mut self, id: WindowId) -> Option<&mut Canvas> {
        self.canvases.iter_mut().find(|c| c.window.id() == id)
    }
}

impl ApplicationHandler for SpriteApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.canvases.is_empty() {
            return;
        }
        if let Err(err) = self.open_canvases(event_loop) {
            tracing::error!("{err:#}");
            self.fatal = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(canvas) = self.canvas_mut(window_id) {
                    canvas.context.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let elapsed_ms = self.frame_ms;
                if let Some(canvas) = self.canvas_mut(window_id) {
                    let first = canvas.context.state() == ContextState::Idle;
                    match canvas.context.render(elapsed_ms) {
                        Ok(()) if first && canvas.context.state() == ContextState::Drawing => {
                            tracing::info!(context = canvas.context.id(), "first frame drawn");
                        }
                        Ok(()) => {}
                        // One canvas failing leaves the others drawing.
                        Err(err) => {
                            tracing::error!(context = canvas.context.id(), "frame failed: {err}");
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Per-tick callback: fix this tick's time and ask every canvas to redraw.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.frame_ms = self.clock.elapsed_ms();
        for canvas in &self.canvases {
            canvas.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("spritegrid-desktop starting");

    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if let Some(layout) = cli.layout {
        config.layout = layout;
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SpriteApp::new(config)?;
    event_loop.run_app(&mut app)?;

    match app.fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
