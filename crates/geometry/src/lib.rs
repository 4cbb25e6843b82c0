//! Static geometry for the sprite grid.
//!
//! Builds an N×M grid of unit quads, computes one tangent-space basis from the
//! template quad and broadcasts it into flat per-vertex attribute arrays.
//!
//! # Invariants
//! - Every attribute array describes the same number of vertices.
//! - All tiles are coplanar (z = 0) and share one orientation, so a single
//!   tangent basis is valid for every vertex.

mod arrays;
mod grid;
mod tangent;

pub use arrays::VertexArrays;
pub use grid::{GridSize, QUAD_POSITIONS, QUAD_TEXTURE_COORDS, build_grid};
pub use tangent::TangentBasis;

pub fn crate_info() -> &'static str {
    "spritegrid-geometry v0.1.0"
}
