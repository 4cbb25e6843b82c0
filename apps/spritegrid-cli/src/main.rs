use std::path::PathBuf;

use clap::{Parser, Subcommand};
use spritegrid_geometry::{GridSize, QUAD_POSITIONS, QUAD_TEXTURE_COORDS, TangentBasis, VertexArrays};
use spritegrid_program::{ATTRIBUTE_NAMES, Program, ProgramCache, UNIFORM_NAMES, UniformLocation};
use spritegrid_scene::ShaderConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spritegrid-cli", about = "CLI tool for spritegrid: geometry, basis and shader checks")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build a grid and print its attribute array sizes
    Geometry {
        #[arg(short, long, default_value = "3", allow_negative_numbers = true)]
        rows: i32,
        #[arg(short, long, default_value = "3", allow_negative_numbers = true)]
        cols: i32,
        /// Dump the full arrays as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the tangent basis of the template quad
    Basis,
    /// Compile and link a shader pair, then list resolved locations
    CheckShaders {
        /// Vertex WGSL file (built-in stage if omitted)
        #[arg(long)]
        vertex: Option<PathBuf>,
        /// Fragment WGSL file (built-in stage if omitted)
        #[arg(long)]
        fragment: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("spritegrid-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("geometry: {}", spritegrid_geometry::crate_info());
            println!("program: {}", spritegrid_program::crate_info());
            println!("scene: {}", spritegrid_scene::crate_info());
            println!("render: {}", spritegrid_render_wgpu::crate_info());
        }
        Commands::Geometry { rows, cols, json } => {
            let arrays = VertexArrays::for_grid(GridSize::new(rows, cols));
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "rows": rows,
                        "cols": cols,
                        "positions": arrays.positions,
                        "normals": arrays.normals,
                        "tangents": arrays.tangents,
                        "bitangents": arrays.bitangents,
                        "textureCoords": arrays.texture_coords,
                    }))?
                );
            } else {
                println!("Grid {rows}x{cols}: {} vertices", arrays.vertex_count());
                println!("positions:      {} floats", arrays.positions.len());
                println!("normals:        {} floats", arrays.normals.len());
                println!("tangents:       {} floats", arrays.tangents.len());
                println!("bitangents:     {} floats", arrays.bitangents.len());
                println!("texture coords: {} floats", arrays.texture_coords.len());
            }
        }
        Commands::Basis => {
            let basis = TangentBasis::from_template(&QUAD_POSITIONS, &QUAD_TEXTURE_COORDS);
            println!("tangent:   {}", basis.tangent);
            println!("bitangent: {}", basis.bitangent);
            println!("normal:    {}", basis.normal);
            println!("finite:    {}", basis.is_finite());
        }
        Commands::CheckShaders { vertex, fragment } => {
            let (vertex, fragment) =
                spritegrid_render_wgpu::shader_sources(&ShaderConfig { vertex, fragment })?;
            let program = Program::build(&vertex, &fragment)?;
            let cache = ProgramCache::resolve(&program, ATTRIBUTE_NAMES, UNIFORM_NAMES);

            println!(
                "Linked `{}` ({}) + `{}` ({})",
                program.vertex.label,
                program.vertex.entry_point,
                program.fragment.label,
                program.fragment.entry_point
            );
            println!("Attributes:");
            for name in ATTRIBUTE_NAMES {
                match cache.attribute(name) {
                    Some(location) => println!("  {name:<18} @location({location})"),
                    None => println!("  {name:<18} (not found)"),
                }
            }
            println!("Uniforms:");
            for name in UNIFORM_NAMES {
                match cache.uniform(name) {
                    Some(UniformLocation::Block {
                        group,
                        binding,
                        offset,
                        size,
                    }) => println!(
                        "  {name:<18} @group({group}) @binding({binding}) offset {offset} size {size}"
                    ),
                    Some(UniformLocation::Resource {
                        group,
                        binding,
                        kind,
                    }) => println!("  {name:<18} @group({group}) @binding({binding}) {kind:?}"),
                    None => println!("  {name:<18} (not found)"),
                }
            }
            let missing = cache.missing();
            if !missing.is_empty() {
                println!("Unresolved: {}", missing.join(", "));
            }
        }
    }

    Ok(())
}
