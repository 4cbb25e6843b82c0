/// Unit quad template: two triangles, six vertices.
#[rustfmt::skip]
pub const QUAD_POSITIONS: [[f32; 3]; 6] = [
    [-0.0,  1.0, 0.0],
    [-0.0, -0.0, 0.0],
    [ 1.0,  1.0, 0.0],
    [-0.0, -0.0, 0.0],
    [ 1.0, -0.0, 0.0],
    [ 1.0,  1.0, 0.0],
];

/// Texture coordinates matching [`QUAD_POSITIONS`].
///
/// Every tile samples the same top-left quarter of the texture.
#[rustfmt::skip]
pub const QUAD_TEXTURE_COORDS: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [0.0, 0.5],
    [0.5, 0.0],
    [0.0, 0.5],
    [0.5, 0.5],
    [0.5, 0.0],
];

/// Grid dimensions in tiles.
///
/// Signed on purpose: zero or negative sizes are accepted and produce an empty grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub rows: i32,
    pub cols: i32,
}

impl GridSize {
    pub fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols }
    }

    /// Number of tiles; 0 if either dimension is zero or negative.
    pub fn tile_count(&self) -> usize {
        if self.rows <= 0 || self.cols <= 0 {
            return 0;
        }
        self.rows as usize * self.cols as usize
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self { rows: 3, cols: 3 }
    }
}

/// Copy the quad template once per grid cell.
///
/// Cell `i` (row-major) is offset by `i % cols` in x and `i / cols` in y; z is
/// left untouched. UVs are repeated verbatim. Returns flat `(positions, uvs)`.
pub fn build_grid(
    grid: GridSize,
    quad: &[[f32; 3]; 6],
    uvs: &[[f32; 2]; 6],
) -> (Vec<f32>, Vec<f32>) {
    let tiles = grid.tile_count();
    let mut positions = Vec::with_capacity(tiles * quad.len() * 3);
    let mut texture_coords = Vec::with_capacity(tiles * uvs.len() * 2);

    for i in 0..tiles {
        // tile_count() is 0 unless cols > 0, so the modulo is safe here.
        let cols = grid.cols as usize;
        let dx = (i % cols) as f32;
        let dy = (i / cols) as f32;

        for [x, y, z] in quad {
            positions.extend_from_slice(&[x + dx, y + dy, *z]);
        }
        for uv in uvs {
            texture_coords.extend_from_slice(uv);
        }
    }

    tracing::debug!(
        rows = grid.rows,
        cols = grid.cols,
        vertices = positions.len() / 3,
        "built quad grid"
    );

    (positions, texture_coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(grid: GridSize) -> (Vec<f32>, Vec<f32>) {
        build_grid(grid, &QUAD_POSITIONS, &QUAD_TEXTURE_COORDS)
    }

    #[test]
    fn output_lengths_follow_grid_size() {
        for (rows, cols) in [(1, 1), (2, 5), (3, 3), (4, 1), (7, 2)] {
            let (positions, uvs) = canonical(GridSize::new(rows, cols));
            let tiles = (rows * cols) as usize;
            assert_eq!(positions.len(), tiles * 6 * 3);
            assert_eq!(uvs.len(), tiles * 6 * 2);
        }
    }

    #[test]
    fn tile_offsets_are_row_major() {
        let grid = GridSize::new(3, 4);
        let (positions, _) = canonical(grid);
        let base = QUAD_POSITIONS[0];

        for i in 0..grid.tile_count() {
            let first = i * 6 * 3;
            assert_eq!(positions[first], base[0] + (i % 4) as f32, "tile {i} x");
            assert_eq!(positions[first + 1], base[1] + (i / 4) as f32, "tile {i} y");
            assert_eq!(positions[first + 2], base[2], "tile {i} z");
        }
    }

    #[test]
    fn uvs_repeat_per_tile() {
        let (_, uvs) = canonical(GridSize::new(2, 2));
        let template: Vec<f32> = QUAD_TEXTURE_COORDS.iter().flatten().copied().collect();
        for tile in uvs.chunks(template.len()) {
            assert_eq!(tile, template.as_slice());
        }
    }

    #[test]
    fn three_by_three_grid() {
        let (positions, uvs) = canonical(GridSize::new(3, 3));
        assert_eq!(positions.len() / 3, 54);
        assert_eq!(positions.len(), 162);
        assert_eq!(uvs.len(), 108);
        // One row of three tiles.
        assert_eq!(positions[..3 * 6 * 3].len(), 54);
        assert_eq!(uvs[..3 * 6 * 2].len(), 36);
        assert!(positions.chunks(3).all(|v| v[2] == 0.0));
    }

    #[test]
    fn degenerate_sizes_are_empty() {
        for (rows, cols) in [(0, 0), (0, 3), (3, 0), (-1, 3), (3, -2), (-4, -4)] {
            let (positions, uvs) = canonical(GridSize::new(rows, cols));
            assert!(positions.is_empty(), "{rows}x{cols}");
            assert!(uvs.is_empty(), "{rows}x{cols}");
        }
    }
}
