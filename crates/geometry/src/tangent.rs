use glam::{Vec2, Vec3};

/// Tangent/bitangent/normal frame for one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentBasis {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl TangentBasis {
    /// Compute the basis of a triangle lying in the XY plane.
    ///
    /// Tangent and bitangent follow the UV gradients; the normal is fixed at +Z.
    /// A UV configuration with a zero determinant divides by zero and yields
    /// non-finite components. That case is not corrected here; see [`Self::is_finite`].
    pub fn from_triangle(positions: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        let [pos1, pos2, pos3] = positions;
        let [uv1, uv2, uv3] = uvs;

        let edge1 = pos2 - pos1;
        let edge2 = pos3 - pos1;
        let delta_uv1 = uv2 - uv1;
        let delta_uv2 = uv3 - uv1;

        let f = 1.0 / (delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y);

        let tangent = (f * (delta_uv2.y * edge1 - delta_uv1.y * edge2)).normalize();
        let bitangent = (f * (-delta_uv2.x * edge1 + delta_uv1.x * edge2)).normalize();

        Self {
            tangent,
            bitangent,
            normal: Vec3::Z,
        }
    }

    /// Basis of the first triangle of a six-vertex quad template.
    pub fn from_template(positions: &[[f32; 3]; 6], uvs: &[[f32; 2]; 6]) -> Self {
        let [p1, p2, p3, ..] = *positions;
        let [uv1, uv2, uv3, ..] = *uvs;
        Self::from_triangle(
            [Vec3::from_array(p1), Vec3::from_array(p2), Vec3::from_array(p3)],
            [Vec2::from_array(uv1), Vec2::from_array(uv2), Vec2::from_array(uv3)],
        )
    }

    /// False when a degenerate UV mapping produced infinities or NaNs.
    pub fn is_finite(&self) -> bool {
        self.tangent.is_finite() && self.bitangent.is_finite() && self.normal.is_finite()
    }
}
