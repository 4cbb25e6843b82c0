use crate::grid::{GridSize, QUAD_POSITIONS, QUAD_TEXTURE_COORDS, build_grid};
use crate::tangent::TangentBasis;

/// Parallel, flat per-vertex attribute arrays.
///
/// Built once at startup and treated as immutable afterwards. Each render
/// context uploads its own GPU copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexArrays {
    /// 3 floats per vertex.
    pub positions: Vec<f32>,
    /// 3 floats per vertex.
    pub normals: Vec<f32>,
    /// 3 floats per vertex.
    pub tangents: Vec<f32>,
    /// 3 floats per vertex.
    pub bitangents: Vec<f32>,
    /// 2 floats per vertex.
    pub texture_coords: Vec<f32>,
}

impl VertexArrays {
    /// Grid built from the canonical quad template.
    pub fn for_grid(grid: GridSize) -> Self {
        Self::from_template(grid, &QUAD_POSITIONS, &QUAD_TEXTURE_COORDS)
    }

    /// Grid built from a custom template.
    ///
    /// The basis comes from the template's first triangle and is broadcast to
    /// every vertex.
    pub fn from_template(grid: GridSize, quad: &[[f32; 3]; 6], uvs: &[[f32; 2]; 6]) -> Self {
        let (positions, texture_coords) = build_grid(grid, quad, uvs);
        let basis = TangentBasis::from_template(quad, uvs);
        if !basis.is_finite() {
            tracing::warn!(?basis, "tangent basis is not finite; UV mapping is degenerate");
        }
        Self::with_basis(positions, texture_coords, basis)
    }

    /// Pair positions/UVs with one basis repeated for every vertex.
    pub fn with_basis(positions: Vec<f32>, texture_coords: Vec<f32>, basis: TangentBasis) -> Self {
        let count = positions.len() / 3;

        let normals = basis.normal.to_array().repeat(count);
        let tangents = basis.tangent.to_array().repeat(count);
        let bitangents = basis.bitangent.to_array().repeat(count);

        Self {
            positions,
            normals,
            tangents,
            bitangents,
            texture_coords,
        }
    }

    /// Number of vertices described by the arrays.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
