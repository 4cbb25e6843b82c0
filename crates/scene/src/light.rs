use glam::{Vec2, Vec3};

use crate::config::LightConfig;

/// Point light circling the grid centre once every 2π seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightOrbit {
    pub center: Vec2,
    pub radius: f32,
    pub z: f32,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self::from_config(&LightConfig::default())
    }
}

impl LightOrbit {
    pub fn from_config(config: &LightConfig) -> Self {
        Self {
            center: config.center,
            radius: config.radius,
            z: config.z,
        }
    }

    /// Light position after `elapsed_ms` milliseconds.
    pub fn position_at(&self, elapsed_ms: f64) -> Vec3 {
        let t = elapsed_ms / 1000.0;
        let offset = Vec2::new(t.cos() as f32, t.sin() as f32) * self.radius;
        (self.center + offset).extend(self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_the_positive_x_side() {
        let light = LightOrbit::default();
        assert_eq!(light.position_at(0.0), Vec3::new(2.25, 1.5, 1.0));
    }

    #[test]
    fn quarter_turn_after_half_pi_seconds() {
        let light = LightOrbit::default();
        let p = light.position_at(std::f64::consts::FRAC_PI_2 * 1000.0);
        assert!((p - Vec3::new(1.5, 2.25, 1.0)).length() < 1e-5, "{p}");
    }

    #[test]
    fn stays_on_the_circle() {
        let light = LightOrbit::default();
        for tick in 0..600 {
            let elapsed = tick as f64 * 16.667;
            let p = light.position_at(elapsed);
            let t = elapsed / 1000.0;
            let expected = Vec3::new(
                1.5 + 0.75 * t.cos() as f32,
                1.5 + 0.75 * t.sin() as f32,
                1.0,
            );
            assert!((p - expected).length() < 1e-5, "tick {tick}: {p}");
            assert!(((p.truncate() - light.center).length() - light.radius).abs() < 1e-5);
            assert_eq!(p.z, 1.0);
        }
    }
}
