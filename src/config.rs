use serde::{Deserialize, Serialize};

use crate::animation::AnimationSettings;
use crate::error::{GenerationError, GenerationResult};
use crate::generator::{
    GenerationRequest, GeneratorSettings, ModelOptions, ModelRequest, ModelSampling, ModelSource,
    DEFAULT_MAX_VERTICES,
};
use crate::particles::Appearance;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    #[default]
    SphereSurface,
    SphereVolume,
}

// Host side options, camelCase. `shape` and `model` can't both be set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticleConfig {
    pub shape: Option<ShapeKind>,
    pub model: Option<String>,

    pub count: usize,
    pub radius: f32,

    pub scale: f32,
    pub target_particle_count: Option<usize>,
    pub surface_sampling: bool,
    pub max_vertices: usize,

    pub connected: bool,
    pub connection_distance: f32,

    #[serde(flatten)]
    pub animation: AnimationSettings,

    #[serde(flatten)]
    pub appearance: Appearance,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig {
            shape: None,
            model: None,
            count: 1000,
            radius: 1.0,
            scale: 1.0,
            target_particle_count: None,
            surface_sampling: false,
            max_vertices: DEFAULT_MAX_VERTICES,
            connected: false,
            connection_distance: 0.2,
            animation: AnimationSettings::default(),
            appearance: Appearance::default(),
        }
    }
}

impl ParticleConfig {
    pub fn from_json(json: &str) -> GenerationResult<Self> {
        let config: ParticleConfig = serde_json::from_str(json)
            .map_err(|e| GenerationError::InvalidRequest(format!("bad particle config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> GenerationResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GenerationError::InvalidRequest(format!("unserializable config: {e}")))
    }

    pub fn validate(&self) -> GenerationResult<()> {
        if self.shape.is_some() && self.model.is_some() {
            return Err(GenerationError::InvalidRequest(
                "shape and model are mutually exclusive".to_string(),
            ));
        }

        if self.max_vertices == 0 {
            return Err(GenerationError::InvalidRequest(
                "maxVertices must be at least 1".to_string(),
            ));
        }

        if self.connected && !(self.connection_distance >= 0.0) {
            return Err(GenerationError::InvalidRequest(format!(
                "connectionDistance must not be negative, got {}",
                self.connection_distance
            )));
        }

        Ok(())
    }

    // The request these options describe. With neither `shape` nor `model`
    // set this is a sphere surface.
    pub fn request(&self) -> GenerationResult<GenerationRequest> {
        self.validate()?;

        if let Some(key) = &self.model {
            return Ok(GenerationRequest::Model(ModelRequest {
                source: ModelSource::Key(key.clone()),
                options: self.model_options(),
            }));
        }

        let (count, radius) = (self.count, self.radius);
        Ok(match self.shape.unwrap_or_default() {
            ShapeKind::SphereSurface => GenerationRequest::SphereSurface { count, radius },
            ShapeKind::SphereVolume => GenerationRequest::SphereVolume { count, radius },
        })
    }

    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            scale: self.scale,
            target_count: self.target_particle_count,
            sampling: if self.surface_sampling {
                ModelSampling::Surface
            } else {
                ModelSampling::Vertices
            },
        }
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            max_vertices: self.max_vertices,
            appearance: self.appearance,
        }
    }

    // None when connections are switched off
    pub fn connection_distance(&self) -> Option<f32> {
        self.connected.then_some(self.connection_distance)
    }
}
