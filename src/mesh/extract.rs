use log::{debug, warn};
use nalgebra::Point3;

use crate::cancel::Cancellation;
use crate::error::{GenerationError, GenerationResult};
use crate::mesh::MeshSource;

// Vertices walked between cancellation checks
const CANCEL_BATCH: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub positions: Vec<Point3<f32>>,
    // Raw vertex count across every part, before the stride
    pub total_vertices: usize,
    pub stride: usize,
    // The hard ceiling cut the walk short
    pub truncated: bool,
}

// Every `stride`-th world space vertex, counted globally across parts
pub fn extract_vertices<S, C>(
    source: &S,
    scale: f32,
    max_vertices: usize,
    cancel: &C,
) -> GenerationResult<Extraction>
where
    S: MeshSource + ?Sized,
    C: Cancellation + ?Sized,
{
    if max_vertices == 0 {
        return Err(GenerationError::InvalidRequest(
            "vertex ceiling must be at least 1".to_string(),
        ));
    }

    cancel.check()?;

    let total_vertices = source.vertex_count();
    if total_vertices == 0 {
        return Err(GenerationError::EmptyGeometry);
    }

    let stride = total_vertices.div_ceil(max_vertices).max(1);

    let mut positions = Vec::with_capacity(total_vertices.div_ceil(stride).min(max_vertices));
    let mut walked = 0usize;
    let mut truncated = false;
    let mut cancelled = false;

    source.for_each_part(&mut |part| {
        if truncated || cancelled {
            return;
        }

        for i in 0..part.vertex_count() {
            if walked % CANCEL_BATCH == 0 && cancel.is_cancelled() {
                cancelled = true;
                return;
            }

            let take = walked % stride == 0;
            walked += 1;

            if !take {
                continue;
            }

            if positions.len() == max_vertices {
                truncated = true;
                return;
            }

            if let Some(p) = part.world_position(i) {
                positions.push(Point3::from(p.coords * scale));
            }
        }
    });

    if cancelled {
        return Err(GenerationError::Cancelled);
    }

    if positions.is_empty() {
        return Err(GenerationError::EmptyGeometry);
    }

    if truncated {
        warn!(
            "vertex extraction stopped at the ceiling of {max_vertices} ({total_vertices} raw vertices)"
        );
    }

    debug!(
        "extracted {} of {total_vertices} vertices with stride {stride}",
        positions.len()
    );

    Ok(Extraction {
        positions,
        total_vertices,
        stride,
        truncated,
    })
}
