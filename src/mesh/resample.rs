use log::warn;
use nalgebra::{Point3, Vector3};
use rand::Rng;

// Per axis jitter added to duplicated points, in model units after scaling
pub const JITTER: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    pub positions: Vec<Point3<f32>>,
    pub requested: usize,
    // Below `requested` when the ceiling kicked in
    pub target: usize,
}

impl Resampled {
    pub fn clamped(&self) -> bool {
        self.target < self.requested
    }
}

// Nearest index when shrinking, cycled and jittered copies when growing
pub fn resample<R: Rng + ?Sized>(
    points: &[Point3<f32>],
    target: usize,
    rng: &mut R,
) -> Vec<Point3<f32>> {
    let source_len = points.len();

    if source_len == 0 || target == 0 {
        return vec![];
    }

    if target == source_len {
        return points.to_vec();
    }

    if target < source_len {
        let step = source_len as f64 / target as f64;

        return (0..target)
            .map(|i| points[((i as f64 * step).floor() as usize).min(source_len - 1)])
            .collect();
    }

    (0..target)
        .map(|i| {
            let p = points[i % source_len];
            if i < source_len {
                p
            } else {
                p + jitter(rng)
            }
        })
        .collect()
}

// Same as `resample`, but never produces more than `limit` points. A clamped
// target is logged and visible on the result
pub fn resample_capped<R: Rng + ?Sized>(
    points: &[Point3<f32>],
    requested: usize,
    limit: usize,
    rng: &mut R,
) -> Resampled {
    let target = requested.min(limit);
    if target < requested {
        warn!("requested {requested} particles, clamped to the ceiling of {limit}");
    }

    Resampled {
        positions: resample(points, target, rng),
        requested,
        target,
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f32> {
    Vector3::new(
        rng.gen_range(-JITTER..=JITTER),
        rng.gen_range(-JITTER..=JITTER),
        rng.gen_range(-JITTER..=JITTER),
    )
}
