use glam::Vec3;

/// Spherical coordinates with Y up. `phi` is the polar angle from +Y, `theta` the azimuth
/// around Y measured from +Z towards +X.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn new(radius: f32, theta: f32, phi: f32) -> Self {
        Self { radius, theta, phi }
    }

    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }

    /// Keep `phi` inside `[epsilon, PI - epsilon]` so the offset never crosses a pole
    pub fn clamp_phi(mut self, epsilon: f32) -> Self {
        self.phi = self.phi.clamp(epsilon, std::f32::consts::PI - epsilon);
        self
    }
}
