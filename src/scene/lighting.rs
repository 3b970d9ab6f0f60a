//! Blinn-Phong lighting parameters
//!
//! The light direction is a fixed scene constant; the four scalars are
//! user-adjustable through the UI and read by the renderer every frame.

use glam::Vec3;

/// Direction from the surface toward the light, in world space.
pub const LIGHT_DIRECTION: Vec3 = Vec3::new(0.5, 0.7, 0.5);

/// Adjustable shading scalars for the Blinn-Phong model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.2,
            diffuse: 0.8,
            specular: 0.5,
            shininess: 32.0,
        }
    }
}

impl Lighting {
    pub fn new() -> Self {
        Self::default()
    }

    /// The normalized light direction uploaded to the shader.
    pub fn light_direction(&self) -> Vec3 {
        LIGHT_DIRECTION.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_direction_is_normalized() {
        let lighting = Lighting::default();
        assert!((lighting.light_direction().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_defaults_are_plausible_shading_range() {
        let lighting = Lighting::default();
        assert!(lighting.ambient > 0.0 && lighting.ambient < 1.0);
        assert!(lighting.diffuse > 0.0 && lighting.diffuse <= 1.0);
        assert!(lighting.shininess >= 1.0);
    }
}
