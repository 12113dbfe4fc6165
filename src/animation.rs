use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::particles::ParticleCloud;

// Scales the pointer push so mouse_influence = 1 moves particles a tenth of a unit at most
pub const POINTER_FORCE_SCALE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationSettings {
    // Floating motion
    pub animated: bool,
    pub animation_speed: f32,
    pub animation_radius: f32,

    // Pointer push
    pub interactive: bool,
    pub mouse_influence: f32,
    pub mouse_radius: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        AnimationSettings {
            animated: true,
            animation_speed: 1.0,
            animation_radius: 0.1,
            interactive: false,
            mouse_influence: 1.0,
            mouse_radius: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    pub time: f32,
    // Already unprojected into the cloud's space by whoever owns the camera
    pub pointer: Option<Point3<f32>>,
}

// Working positions are recomputed from the originals every tick, nothing is integrated
#[derive(Debug, Clone, Default)]
pub struct AnimationEngine {
    settings: AnimationSettings,
    state: AnimationState,
    // Working positions currently differ from the originals
    displaced: bool,
}

impl AnimationEngine {
    pub fn new(settings: AnimationSettings) -> Self {
        AnimationEngine {
            settings,
            state: AnimationState::default(),
            displaced: false,
        }
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut AnimationSettings {
        &mut self.settings
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn set_pointer(&mut self, pointer: Option<Point3<f32>>) {
        self.state.pointer = pointer;
    }

    // Back to t = 0, for when the cloud is replaced
    pub fn reset(&mut self) {
        self.state = AnimationState::default();
        self.displaced = false;
    }

    pub fn is_idle(&self) -> bool {
        !self.settings.animated && self.active_pointer().is_none()
    }

    fn active_pointer(&self) -> Option<Point3<f32>> {
        if self.settings.interactive && self.settings.mouse_radius > 0.0 {
            self.state.pointer
        } else {
            None
        }
    }

    pub fn tick(&mut self, cloud: &mut ParticleCloud, delta_time: f32) {
        let delta_time = if delta_time.is_finite() {
            delta_time.max(0.0)
        } else {
            0.0
        };
        self.state.time += delta_time * self.settings.animation_speed;

        if self.is_idle() {
            if self.displaced {
                cloud.reset();
                self.displaced = false;
            }
            return;
        }

        let time = self.state.time;
        let floating = self.settings.animated.then_some(self.settings.animation_radius);
        let pointer = self.active_pointer();
        let settings = self.settings;

        let (original, working) = cloud.split_mut();
        working
            .par_chunks_exact_mut(3)
            .zip(original.par_chunks_exact(3))
            .enumerate()
            .for_each(|(i, (w, o))| {
                let mut p = Point3::new(o[0], o[1], o[2]);

                if let Some(radius) = floating {
                    p += float_offset(time, i, radius);
                }

                if let Some(pointer) = pointer {
                    p += pointer_push(p, pointer, &settings);
                }

                w.copy_from_slice(&[p.x, p.y, p.z]);
            });

        self.displaced = true;
    }
}

// Phase comes from the index so neighbouring particles drift out of step
pub fn float_offset(time: f32, index: usize, radius: f32) -> Vector3<f32> {
    let i = index as f32;

    Vector3::new(
        (time + i * 0.1).sin() * radius,
        (time + i * 0.15).cos() * radius * 0.5,
        (time + i * 0.2).sin() * radius * 0.3,
    )
}

// Radial push away from the pointer, fading to nothing at mouse_radius
pub fn pointer_push(
    position: Point3<f32>,
    pointer: Point3<f32>,
    settings: &AnimationSettings,
) -> Vector3<f32> {
    let away = position - pointer;
    let d = away.norm();

    if !(d < settings.mouse_radius) {
        return Vector3::zeros();
    }

    let direction = away.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y);
    let force = (1.0 - d / settings.mouse_radius) * settings.mouse_influence * POINTER_FORCE_SCALE;

    direction * force
}
