//! Category to display-shape mapping, as an ordered rule table with a fallback.

use glam::Vec3;

use crate::scene::Geometry;

/// Procedural stand-in shape for a product
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeSpec {
    Cylinder { radius: f32, height: f32 },
    Box { size: Vec3 },
    FlattenedSphere { radius: f32, y_scale: f32 },
    Sphere { radius: f32 },
    Cube { size: f32 },
}

impl ShapeSpec {
    /// Geometry plus the node scale that completes the shape
    pub fn geometry(&self) -> (Geometry, Vec3) {
        match *self {
            ShapeSpec::Cylinder { radius, height } => (
                Geometry::Cylinder { radius_top: radius, radius_bottom: radius, height, segments: 24 },
                Vec3::ONE,
            ),
            ShapeSpec::Box { size } => (Geometry::Box { size }, Vec3::ONE),
            ShapeSpec::FlattenedSphere { radius, y_scale } => (
                Geometry::Sphere { radius, segments: 24 },
                Vec3::new(1.0, y_scale, 1.0),
            ),
            ShapeSpec::Sphere { radius } => (Geometry::Sphere { radius, segments: 24 }, Vec3::ONE),
            ShapeSpec::Cube { size } => (Geometry::Box { size: Vec3::splat(size) }, Vec3::ONE),
        }
    }

    /// Rendered height after scaling
    pub fn height(&self) -> f32 {
        match *self {
            ShapeSpec::Cylinder { height, .. } => height,
            ShapeSpec::Box { size } => size.y,
            ShapeSpec::FlattenedSphere { radius, y_scale } => 2.0 * radius * y_scale,
            ShapeSpec::Sphere { radius } => 2.0 * radius,
            ShapeSpec::Cube { size } => size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMatcher {
    /// Case-insensitive substring match against any keyword
    AnyOf(&'static [&'static str]),
    Always,
}

impl CategoryMatcher {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryMatcher::AnyOf(keywords) => {
                let category = category.to_lowercase();
                keywords.iter().any(|k| category.contains(k))
            }
            CategoryMatcher::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRule {
    pub matcher: CategoryMatcher,
    /// Text shown on the display's label
    pub group: &'static str,
    pub shape: ShapeSpec,
    pub color: [f32; 3],
}

pub const SHAPE_RULES: &[ShapeRule] = &[
    ShapeRule {
        matcher: CategoryMatcher::AnyOf(&["meat", "poultry", "seafood", "fish"]),
        group: "Meat & Seafood",
        shape: ShapeSpec::Cylinder { radius: 0.35, height: 0.7 },
        color: [0.62, 0.16, 0.16],
    },
    ShapeRule {
        matcher: CategoryMatcher::AnyOf(&["dairy", "milk", "cheese", "egg"]),
        group: "Dairy & Eggs",
        shape: ShapeSpec::Box { size: Vec3::new(0.5, 0.8, 0.35) },
        color: [0.95, 0.93, 0.85],
    },
    ShapeRule {
        matcher: CategoryMatcher::AnyOf(&["bakery", "bread", "pastry"]),
        group: "Bakery",
        shape: ShapeSpec::FlattenedSphere { radius: 0.4, y_scale: 0.55 },
        color: [0.85, 0.62, 0.3],
    },
    ShapeRule {
        matcher: CategoryMatcher::AnyOf(&["produce", "fruit", "vegetable"]),
        group: "Fresh Produce",
        shape: ShapeSpec::Sphere { radius: 0.35 },
        color: [0.3, 0.65, 0.25],
    },
    ShapeRule {
        matcher: CategoryMatcher::AnyOf(&["beverage", "drink", "juice"]),
        group: "Beverages",
        shape: ShapeSpec::Cylinder { radius: 0.18, height: 0.9 },
        color: [0.2, 0.4, 0.8],
    },
];

pub const FALLBACK_RULE: ShapeRule = ShapeRule {
    matcher: CategoryMatcher::Always,
    group: "General",
    shape: ShapeSpec::Cube { size: 0.6 },
    color: [0.55, 0.55, 0.58],
};

/// First rule whose matcher accepts the category, else the fallback
pub fn classify(category: &str) -> &'static ShapeRule {
    SHAPE_RULES
        .iter()
        .find(|rule| rule.matcher.matches(category))
        .unwrap_or(&FALLBACK_RULE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_map_to_their_shapes() {
        assert!(matches!(classify("Meat").shape, ShapeSpec::Cylinder { .. }));
        assert!(matches!(classify("Dairy Products").shape, ShapeSpec::Box { .. }));
        assert!(matches!(classify("Fresh Bakery").shape, ShapeSpec::FlattenedSphere { .. }));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("SEAFOOD").group, "Meat & Seafood");
    }

    #[test]
    fn earlier_rules_win() {
        // Both "dairy" and "bakery" occur; dairy is listed first
        assert_eq!(classify("dairy-free bakery").group, "Dairy & Eggs");
    }

    #[test]
    fn unknown_category_falls_back_to_cube() {
        let rule = classify("Household Cleaning");
        assert_eq!(rule.group, "General");
        assert!(matches!(rule.shape, ShapeSpec::Cube { .. }));
        assert_eq!(classify("").group, "General");
    }

    #[test]
    fn flattened_sphere_is_scaled_in_y() {
        let spec = ShapeSpec::FlattenedSphere { radius: 0.4, y_scale: 0.5 };
        let (geometry, scale) = spec.geometry();
        assert!(matches!(geometry, Geometry::Sphere { .. }));
        assert_eq!(scale, Vec3::new(1.0, 0.5, 1.0));
        assert!((spec.height() - 0.4).abs() < 1e-6);
    }
}
