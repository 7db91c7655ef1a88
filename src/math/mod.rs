mod aabb;
mod easing;
mod ray;
mod spherical;

pub use aabb::Aabb;
pub use easing::ease_in_out_cubic;
pub use ray::Ray;
pub use spherical::Spherical;
