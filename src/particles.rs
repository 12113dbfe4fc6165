use log::info;
use nalgebra::Point3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};
use crate::geometry::{flatten, unflatten};

// Sizes never go below this, whatever the variation rolls
pub const MIN_PARTICLE_SIZE: f32 = 1e-3;

// Per particle color and size, each a base value with a uniform random
// spread of `±variation` around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Appearance {
    pub color: [f32; 3],
    pub color_variation: f32,
    pub size: f32,
    pub size_variation: f32,
}

impl Default for Appearance {
    fn default() -> Self {
        Appearance {
            color: [0.8, 0.9, 1.0],
            color_variation: 0.1,
            size: 0.02,
            size_variation: 0.005,
        }
    }
}

impl Appearance {
    fn roll_color<R: Rng + ?Sized>(&self, rng: &mut R) -> [f32; 3] {
        self.color
            .map(|c| (c + spread(rng, self.color_variation)).clamp(0.0, 1.0))
    }

    fn roll_size<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        (self.size + spread(rng, self.size_variation)).max(MIN_PARTICLE_SIZE)
    }
}

fn spread<R: Rng + ?Sized>(rng: &mut R, variation: f32) -> f32 {
    let variation = variation.abs();
    if variation > 0.0 && variation.is_finite() {
        rng.gen_range(-variation..=variation)
    } else {
        0.0
    }
}

// Flat xyz buffers. `original` is fixed at creation, `working` belongs to the animation
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleCloud {
    original: Vec<f32>,
    working: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
}

impl ParticleCloud {
    pub fn new<R: Rng + ?Sized>(
        positions: &[Point3<f32>],
        appearance: &Appearance,
        rng: &mut R,
    ) -> Self {
        let original = flatten(positions);

        let colors = positions
            .iter()
            .flat_map(|_| appearance.roll_color(rng))
            .collect();

        let sizes = positions
            .iter()
            .map(|_| appearance.roll_size(rng))
            .collect();

        info!("created particle cloud of {} particles", positions.len());

        ParticleCloud {
            working: original.clone(),
            original,
            colors,
            sizes,
        }
    }

    // Takes buffers from elsewhere, checking they agree on the particle count
    pub fn from_buffers(
        original: Vec<f32>,
        colors: Vec<f32>,
        mut sizes: Vec<f32>,
    ) -> GenerationResult<Self> {
        if original.len() % 3 != 0 {
            return Err(GenerationError::InvalidRequest(format!(
                "position buffer length {} is not a multiple of 3",
                original.len()
            )));
        }

        let count = original.len() / 3;
        if colors.len() != count * 3 || sizes.len() != count {
            return Err(GenerationError::InvalidRequest(format!(
                "attribute buffers don't match {count} particles ({} colors, {} sizes)",
                colors.len(),
                sizes.len()
            )));
        }

        for size in &mut sizes {
            *size = size.max(MIN_PARTICLE_SIZE);
        }

        Ok(ParticleCloud {
            working: original.clone(),
            original,
            colors: colors.into_iter().map(|c| c.clamp(0.0, 1.0)).collect(),
            sizes,
        })
    }

    pub fn count(&self) -> usize {
        self.original.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    pub fn original_positions(&self) -> &[f32] {
        &self.original
    }

    pub fn original_points(&self) -> Vec<Point3<f32>> {
        unflatten(&self.original)
    }

    pub fn working_positions(&self) -> &[f32] {
        &self.working
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    // Copies the originals back over the working buffer
    pub fn reset(&mut self) {
        self.working.copy_from_slice(&self.original);
    }

    // Original (read) and working (write) buffers at the same time
    pub(crate) fn split_mut(&mut self) -> (&[f32], &mut [f32]) {
        (&self.original, &mut self.working)
    }
}
