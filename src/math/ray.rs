use glam::{Mat4, Vec3};

use super::Aabb;

/// Half-line used for picking. `direction` is not required to be normalised, so a ray moved
/// into a node's local space keeps the same hit parameter `t` as in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn transformed(&self, transform: &Mat4) -> Ray {
        Ray {
            origin: transform.transform_point3(self.origin),
            direction: transform.transform_vector3(self.direction),
        }
    }

    /// Slab test. Returns the entry distance, or the exit distance when the origin is inside.
    pub fn intersect_aabb(&self, bounds: &Aabb) -> Option<f32> {
        const EPSILON: f32 = 1e-8;

        // Clamp near-zero components so the inverse stays finite
        let inv = |d: f32| {
            if d.abs() < EPSILON {
                1.0 / EPSILON.copysign(d)
            } else {
                1.0 / d
            }
        };
        let inv_dir = Vec3::new(inv(self.direction.x), inv(self.direction.y), inv(self.direction.z));

        let t_min = (bounds.min - self.origin) * inv_dir;
        let t_max = (bounds.max - self.origin) * inv_dir;

        let t1 = t_min.min(t_max);
        let t2 = t_min.max(t_max);

        let t_near = t1.max_element();
        let t_far = t2.min_element();

        if t_near > t_far || t_far < 0.0 {
            return None;
        }

        if t_near < 0.0 {
            (t_far > 1e-3).then_some(t_far)
        } else {
            Some(t_near)
        }
    }

    /// Nearest positive hit with a sphere
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.dot(self.direction);
        let half_b = oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        [(-half_b - sqrt_d) / a, (-half_b + sqrt_d) / a]
            .into_iter()
            .find(|&t| t > 1e-4)
    }
}
