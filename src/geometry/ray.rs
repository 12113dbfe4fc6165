use nalgebra::{Point3, Vector3};

const PARALLEL_EPSILON: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Ray { origin, direction }
    }

    // One of the six axis aligned unit directions, picked by index (mod 6)
    pub fn axis_aligned(origin: Point3<f32>, index: usize) -> Self {
        let mut direction = Vector3::zeros();
        direction[index % 3] = if index % 6 < 3 { 1.0 } else { -1.0 };

        Ray { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    // Möller-Trumbore. Returns the ray parameter of the hit, both faces count.
    // A hit exactly at the origin (t == 0) counts, so flat meshes can still be sampled
    pub fn intersect_triangle(&self, [a, b, c]: &[Point3<f32>; 3]) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;

        let p = self.direction.cross(&edge2);
        let det = edge1.dot(&p);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;

        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = self.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(&q) * inv_det;
        (t >= 0.0).then_some(t)
    }

    // Nearest hit over a set of triangles
    pub fn nearest_hit<'a>(
        &self,
        triangles: impl IntoIterator<Item = &'a [Point3<f32>; 3]>,
    ) -> Option<Point3<f32>> {
        triangles
            .into_iter()
            .filter_map(|triangle| self.intersect_triangle(triangle))
            .min_by(|a, b| a.total_cmp(b))
            .map(|t| self.at(t))
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{point, vector};

    use super::Ray;

    fn floor() -> [nalgebra::Point3<f32>; 3] {
        [
            point![-1.0, 0.0, -1.0],
            point![1.0, 0.0, -1.0],
            point![0.0, 0.0, 2.0],
        ]
    }

    #[test]
    fn hits_triangle_below() {
        let ray = Ray::new(point![0.0, 2.0, 0.0], vector![0.0, -1.0, 0.0]);

        let t = ray.intersect_triangle(&floor()).unwrap();

        assert!((t - 2.0).abs() <= 1e-5);
    }

    #[test]
    fn misses_triangle_behind() {
        let ray = Ray::new(point![0.0, 2.0, 0.0], vector![0.0, 1.0, 0.0]);

        assert_eq!(ray.intersect_triangle(&floor()), None);
    }

    #[test]
    fn parallel_ray_misses() {
        let ray = Ray::new(point![0.0, 1.0, 0.0], vector![1.0, 0.0, 0.0]);

        assert_eq!(ray.intersect_triangle(&floor()), None);
    }

    #[test]
    fn nearest_hit_picks_the_closest_triangle() {
        let lower = floor();
        let upper = lower.map(|p| p + vector![0.0, 1.0, 0.0]);

        let ray = Ray::new(point![0.0, 3.0, 0.0], vector![0.0, -1.0, 0.0]);

        let hit = ray.nearest_hit(&[lower, upper]).unwrap();

        assert!((hit - point![0.0, 1.0, 0.0]).norm() <= 1e-5);
    }

    #[test]
    fn axis_aligned_covers_six_directions() {
        let dirs: Vec<_> = (0..6)
            .map(|i| Ray::axis_aligned(point![0.0, 0.0, 0.0], i).direction)
            .collect();

        assert_eq!(dirs[0], vector![1.0, 0.0, 0.0]);
        assert_eq!(dirs[4], vector![0.0, -1.0, 0.0]);
        for (i, a) in dirs.iter().enumerate() {
            assert_eq!(a.norm(), 1.0);
            assert!(dirs[i + 1..].iter().all(|b| a != b));
        }
    }
}
