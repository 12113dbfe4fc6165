use nalgebra::Point3;

pub mod bounds;
pub mod ray;
pub mod sphere;

pub use bounds::Bounds;
pub use ray::Ray;
pub use sphere::{sphere_surface, sphere_volume};

// Flat xyz buffer, the layout renderers upload
pub fn flatten(points: &[Point3<f32>]) -> Vec<f32> {
    points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
}

pub fn unflatten(buffer: &[f32]) -> Vec<Point3<f32>> {
    buffer
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect()
}
