use std::f32::consts::PI;

use nalgebra::{point, Point3, Vector3};
use rand::Rng;

// Rejection draws per point before giving up and projecting onto the boundary
const MAX_REJECTION_ATTEMPTS: usize = 64;

// Fibonacci lattice, deterministic for a given count
pub fn sphere_surface(count: usize, radius: f32) -> Vec<Point3<f32>> {
    // count - 1 is the lattice divisor, a lone point sits on the pole
    match count {
        0 => return vec![],
        1 => return vec![point![0.0, radius, 0.0]],
        _ => {}
    }

    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let last = (count - 1) as f32;

    (0..count)
        .map(|i| {
            let y = 1.0 - (i as f32 / last) * 2.0;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let theta = i as f32 * golden_angle;

            point![
                theta.cos() * r * radius,
                y * radius,
                theta.sin() * r * radius
            ]
        })
        .collect()
}

// Uniform points inside the ball, by rejection from the enclosing cube
pub fn sphere_volume<R: Rng + ?Sized>(count: usize, radius: f32, rng: &mut R) -> Vec<Point3<f32>> {
    (0..count)
        .map(|_| Point3::from(unit_ball_point(rng) * radius))
        .collect()
}

fn unit_ball_point<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f32> {
    let mut candidate: Vector3<f32> = Vector3::zeros();

    for _ in 0..MAX_REJECTION_ATTEMPTS {
        candidate = Vector3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );

        if candidate.norm_squared() <= 1.0 {
            return candidate;
        }
    }

    candidate.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y)
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn surface_points_lie_on_the_sphere() {
        for count in [2, 3, 17, 100, 1000] {
            let points = sphere_surface(count, 2.5);

            assert_eq!(points.len(), count);
            for p in points {
                assert!((p.coords.norm() - 2.5).abs() <= 1e-4, "{p:?}");
            }
        }
    }

    #[test]
    fn surface_runs_pole_to_pole() {
        let points = sphere_surface(10, 1.0);

        assert_eq!(points[0], point![0.0, 1.0, 0.0]);
        assert!((points[9].y + 1.0).abs() <= 1e-6);
    }

    #[test]
    fn single_surface_point_sits_on_the_pole() {
        assert_eq!(sphere_surface(1, 3.0), vec![point![0.0, 3.0, 0.0]]);
    }

    #[test]
    fn empty_surface_request_has_no_points() {
        assert!(sphere_surface(0, 3.0).is_empty());
        assert!(sphere_volume(0, 3.0, &mut StdRng::seed_from_u64(1)).is_empty());
    }

    #[test]
    fn surface_is_deterministic() {
        assert_eq!(sphere_surface(64, 1.0), sphere_surface(64, 1.0));
    }

    #[test]
    fn volume_points_lie_inside_the_sphere() {
        let mut rng = StdRng::seed_from_u64(7);
        let points = sphere_volume(5000, 3.0, &mut rng);

        assert_eq!(points.len(), 5000);
        assert!(points.iter().all(|p| p.coords.norm() <= 3.0 + 1e-4));
    }

    #[test]
    fn volume_is_reproducible_with_a_seed() {
        let a = sphere_volume(50, 1.0, &mut StdRng::seed_from_u64(3));
        let b = sphere_volume(50, 1.0, &mut StdRng::seed_from_u64(3));

        assert_eq!(a, b);
    }

    #[test]
    fn stuck_rng_falls_back_to_the_boundary() {
        // Always returns the top of the range, so every candidate is a cube corner
        let mut rng = StepRng::new(u64::MAX, 0);
        let points = sphere_volume(4, 2.0, &mut rng);

        assert_eq!(points.len(), 4);
        for p in points {
            assert!((p.coords.norm() - 2.0).abs() <= 1e-4);
        }
    }
}
