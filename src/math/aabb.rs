use glam::Vec3;

/// Axis-aligned bounding box
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centred on the origin with the given full extents
    pub fn from_size(size: Vec3) -> Self {
        let half = size * 0.5;
        Self { min: -half, max: half }
    }

    /// Bounds of a point set, `None` when empty
    pub fn from_points(points: &[Vec3]) -> Option<Aabb> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Aabb::new(*first, *first), |acc, &p| {
            Aabb::new(acc.min.min(p), acc.max.max(p))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_size_is_centred() {
        let aabb = Aabb::from_size(Vec3::new(2.0, 1.0, 4.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, -0.5, -2.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 0.5, 2.0));
    }

    #[test]
    fn test_aabb_from_points() {
        let points = [
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let bounds = Aabb::from_points(&points).unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
        assert!(Aabb::from_points(&[]).is_none());
    }
}
