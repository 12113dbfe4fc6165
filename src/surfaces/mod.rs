use log::{debug, warn};
use nalgebra::Point3;
use rand::Rng;

use crate::cancel::Cancellation;
use crate::error::{GenerationError, GenerationResult};
use crate::geometry::{Bounds, Ray};
use crate::mesh::MeshSource;

// Ray attempts per requested point before falling back to vertices
pub const ATTEMPTS_PER_POINT: usize = 10;

// Attempts between cancellation checks
const CANCEL_BATCH: usize = 256;

// World space triangle soup of a whole mesh set, what the rays are cast against
#[derive(Debug, Clone)]
pub struct Surface {
    triangles: Vec<[Point3<f32>; 3]>,
    bounds: Bounds,
}

impl Surface {
    pub fn from_source<S: MeshSource + ?Sized>(source: &S) -> GenerationResult<Self> {
        let mut triangles = vec![];
        let mut bounds = Bounds::new();

        source.for_each_part(&mut |part| {
            let mut part_bounds = Bounds::new();
            for i in 0..part.vertex_count() {
                if let Some(p) = part.world_position(i) {
                    part_bounds.grow(&p);
                }
            }

            bounds = bounds.union(&part_bounds);
            triangles.extend(part.world_faces());
        });

        if triangles.is_empty() || bounds.is_empty() {
            return Err(GenerationError::EmptyGeometry);
        }

        if bounds.is_degenerate() {
            return Err(GenerationError::DegenerateInput(
                "mesh bounding box has no extent".to_string(),
            ));
        }

        Ok(Surface { triangles, bounds })
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn cast(&self, ray: &Ray) -> Option<Point3<f32>> {
        ray.nearest_hit(&self.triangles)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSamples {
    pub positions: Vec<Point3<f32>>,
    // How many of `positions` came from vertices rather than ray hits
    pub fallback_filled: usize,
}

// Raycasts from random points in the bounds along the six axes, shortfall is
// filled from `fallback` so the result always has `count` entries
pub fn sample_surface<S, R, C>(
    source: &S,
    count: usize,
    scale: f32,
    fallback: &[Point3<f32>],
    rng: &mut R,
    cancel: &C,
) -> GenerationResult<SurfaceSamples>
where
    S: MeshSource + ?Sized,
    R: Rng + ?Sized,
    C: Cancellation + ?Sized,
{
    let surface = Surface::from_source(source)?;

    let mut positions = Vec::with_capacity(count);
    let max_attempts = count.saturating_mul(ATTEMPTS_PER_POINT);
    let mut attempts = 0;

    while positions.len() < count && attempts < max_attempts {
        if attempts % CANCEL_BATCH == 0 {
            cancel.check()?;
        }
        attempts += 1;

        let origin = surface.bounds().random_point(rng);
        let ray = Ray::axis_aligned(origin, rng.gen_range(0..6));

        if let Some(hit) = surface.cast(&ray) {
            positions.push(Point3::from(hit.coords * scale));
        }
    }

    let fallback_filled = count - positions.len();
    if fallback_filled > 0 {
        if fallback.is_empty() {
            return Err(GenerationError::EmptyGeometry);
        }

        warn!(
            "surface sampling placed {} of {count} points after {attempts} rays, filling {fallback_filled} from vertices",
            positions.len()
        );

        positions.extend((0..fallback_filled).map(|_| fallback[rng.gen_range(0..fallback.len())]));
    }

    debug!(
        "surface sampled {count} points over {} triangles in {attempts} rays",
        surface.triangle_count()
    );

    Ok(SurfaceSamples {
        positions,
        fallback_filled,
    })
}
