use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use mesh_graph::MeshGraph;
use nalgebra::Point3;
use rand::Rng;

use crate::cancel::Cancellation;
use crate::error::{GenerationError, GenerationResult};
use crate::geometry::{sphere_surface, sphere_volume};
use crate::mesh::{extract_vertices, resample_capped, MeshCache, MeshLoader, MeshSource, NoLoader};
use crate::particles::{Appearance, ParticleCloud};
use crate::surfaces::sample_surface;

pub const DEFAULT_MAX_VERTICES: usize = 15_000;

#[derive(Debug, Clone)]
pub enum GenerationRequest {
    SphereSurface { count: usize, radius: f32 },
    SphereVolume { count: usize, radius: f32 },
    Model(ModelRequest),
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub source: ModelSource,
    pub options: ModelOptions,
}

#[derive(Clone)]
pub enum ModelSource {
    // Resolved through the generator's cache, then its loader
    Key(String),
    Graph(Arc<MeshGraph>),
}

impl fmt::Debug for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Key(key) => f.debug_tuple("Key").field(key).finish(),
            ModelSource::Graph(graph) => f
                .debug_struct("Graph")
                .field("vertices", &graph.vertex_count())
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelSampling {
    // Stride the mesh vertices, then resample to the target count
    #[default]
    Vertices,
    // Raycast points onto the visible surface, needs a target count
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOptions {
    pub scale: f32,
    pub target_count: Option<usize>,
    pub sampling: ModelSampling,
}

impl Default for ModelOptions {
    fn default() -> Self {
        ModelOptions {
            scale: 1.0,
            target_count: None,
            sampling: ModelSampling::Vertices,
        }
    }
}

// Something the generator changed about the request instead of failing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    // The target count was above the particle ceiling
    TargetClamped { requested: usize, limit: usize },
    // Vertex extraction hit the ceiling before walking every part
    Truncated { limit: usize, total_vertices: usize },
    // Surface sampling ran out of ray attempts and used vertices for the rest
    SurfaceFallback { filled: usize, requested: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    // Raw mesh vertices (zero for procedural shapes)
    pub total_vertices: usize,
    pub stride: usize,
    pub extracted: usize,
    // Particles in the final cloud
    pub count: usize,
    pub adjustments: Vec<Adjustment>,
}

impl GenerationReport {
    // Procedural shapes have no source mesh, every generated point is kept
    fn procedural(count: usize) -> Self {
        GenerationReport {
            stride: 1,
            extracted: count,
            ..Default::default()
        }
    }

    pub fn is_adjusted(&self) -> bool {
        !self.adjustments.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub cloud: ParticleCloud,
    pub report: GenerationReport,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorSettings {
    // The one particle ceiling: extraction stride, hard stop, and resample cap
    pub max_vertices: usize,
    pub appearance: Appearance,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            max_vertices: DEFAULT_MAX_VERTICES,
            appearance: Appearance::default(),
        }
    }
}

// Turns requests into particle clouds. Owns the mesh cache, so repeated
// requests for the same model key only hit the loader once.
pub struct ParticleGenerator<L = NoLoader> {
    settings: GeneratorSettings,
    loader: L,
    cache: MeshCache,
}

impl ParticleGenerator<NoLoader> {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self::with_loader(settings, NoLoader)
    }
}

impl<L: MeshLoader> ParticleGenerator<L> {
    pub fn with_loader(settings: GeneratorSettings, loader: L) -> Self {
        ParticleGenerator {
            settings,
            loader,
            cache: MeshCache::default(),
        }
    }

    pub fn with_cache(mut self, cache: MeshCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut GeneratorSettings {
        &mut self.settings
    }

    pub fn cache(&self) -> &MeshCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut MeshCache {
        &mut self.cache
    }

    pub fn generate<R, C>(
        &mut self,
        request: &GenerationRequest,
        rng: &mut R,
        cancel: &C,
    ) -> GenerationResult<Generated>
    where
        R: Rng + ?Sized,
        C: Cancellation + ?Sized,
    {
        match request {
            GenerationRequest::SphereSurface { count, radius } => {
                self.check_shape(*count, *radius)?;
                let positions = sphere_surface(*count, *radius);
                Ok(self.publish(positions, GenerationReport::procedural(*count), rng))
            }
            GenerationRequest::SphereVolume { count, radius } => {
                self.check_shape(*count, *radius)?;
                let positions = sphere_volume(*count, *radius, rng);
                Ok(self.publish(positions, GenerationReport::procedural(*count), rng))
            }
            GenerationRequest::Model(model) => {
                let mesh = match &model.source {
                    ModelSource::Graph(graph) => graph.clone(),
                    ModelSource::Key(key) => self.cache.get_or_load(key, &self.loader)?,
                };

                self.generate_from_source(&*mesh, &model.options, rng, cancel)
            }
        }
    }

    // Model generation straight from any mesh source, skipping the cache.
    pub fn generate_from_source<S, R, C>(
        &self,
        source: &S,
        options: &ModelOptions,
        rng: &mut R,
        cancel: &C,
    ) -> GenerationResult<Generated>
    where
        S: MeshSource + ?Sized,
        R: Rng + ?Sized,
        C: Cancellation + ?Sized,
    {
        if !(options.scale.is_finite() && options.scale > 0.0) {
            return Err(GenerationError::InvalidRequest(format!(
                "model scale must be positive, got {}",
                options.scale
            )));
        }

        if options.target_count == Some(0) {
            return Err(GenerationError::InvalidRequest(
                "target particle count must be at least 1".to_string(),
            ));
        }

        let limit = self.settings.max_vertices;
        let extraction = extract_vertices(source, options.scale, limit, cancel)?;

        let mut report = GenerationReport {
            total_vertices: extraction.total_vertices,
            stride: extraction.stride,
            extracted: extraction.positions.len(),
            ..Default::default()
        };

        if extraction.truncated {
            report.adjustments.push(Adjustment::Truncated {
                limit,
                total_vertices: extraction.total_vertices,
            });
        }

        let positions = match (options.sampling, options.target_count) {
            (ModelSampling::Vertices, None) => extraction.positions,
            (ModelSampling::Vertices, Some(requested)) => {
                let resampled = resample_capped(&extraction.positions, requested, limit, rng);
                if resampled.clamped() {
                    report.adjustments.push(Adjustment::TargetClamped { requested, limit });
                }
                resampled.positions
            }
            (ModelSampling::Surface, None) => {
                return Err(GenerationError::InvalidRequest(
                    "surface sampling needs a target particle count".to_string(),
                ))
            }
            (ModelSampling::Surface, Some(requested)) => {
                let count = requested.min(limit);
                if count < requested {
                    warn!(
                        "requested {requested} surface points, clamped to the ceiling of {limit}"
                    );
                    report.adjustments.push(Adjustment::TargetClamped { requested, limit });
                }

                let samples = sample_surface(
                    source,
                    count,
                    options.scale,
                    &extraction.positions,
                    rng,
                    cancel,
                )?;

                if samples.fallback_filled > 0 {
                    report.adjustments.push(Adjustment::SurfaceFallback {
                        filled: samples.fallback_filled,
                        requested: count,
                    });
                }
                samples.positions
            }
        };

        Ok(self.publish(positions, report, rng))
    }

    fn check_shape(&self, count: usize, radius: f32) -> GenerationResult<()> {
        if count == 0 {
            return Err(GenerationError::InvalidRequest(
                "particle count must be at least 1".to_string(),
            ));
        }

        if !(radius.is_finite() && radius > 0.0) {
            return Err(GenerationError::InvalidRequest(format!(
                "radius must be positive, got {radius}"
            )));
        }

        if count > self.settings.max_vertices {
            return Err(GenerationError::CeilingExceeded {
                requested: count,
                limit: self.settings.max_vertices,
            });
        }

        Ok(())
    }

    fn publish<R: Rng + ?Sized>(
        &self,
        positions: Vec<Point3<f32>>,
        mut report: GenerationReport,
        rng: &mut R,
    ) -> Generated {
        report.count = positions.len();
        if report.is_adjusted() {
            info!("generation adjusted: {:?}", report.adjustments);
        }

        Generated {
            cloud: ParticleCloud::new(&positions, &self.settings.appearance, rng),
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use mesh_graph::{Geometry, MeshGraph};
    use nalgebra::point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::mesh::LoadError;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    fn line_graph(n: usize) -> Arc<MeshGraph> {
        Arc::new(MeshGraph::from_geometry(Geometry::from_positions(
            (0..n).map(|i| point![i as f32, 0.0, 0.0]).collect(),
        )))
    }

    fn model(graph: Arc<MeshGraph>, target_count: Option<usize>) -> GenerationRequest {
        GenerationRequest::Model(ModelRequest {
            source: ModelSource::Graph(graph),
            options: ModelOptions {
                target_count,
                ..Default::default()
            },
        })
    }

    #[test]
    fn shape_requests_fill_the_cloud() {
        let mut generator = ParticleGenerator::new(GeneratorSettings::default());
        let generated = generator
            .generate(
                &GenerationRequest::SphereVolume {
                    count: 300,
                    radius: 2.0,
                },
                &mut rng(),
                &(),
            )
            .unwrap();

        assert_eq!(generated.cloud.count(), 300);
        assert_eq!(
            generated.report,
            GenerationReport {
                total_vertices: 0,
                stride: 1,
                extracted: 300,
                count: 300,
                adjustments: vec![],
            }
        );
    }

    #[test]
    fn shape_requests_are_validated() {
        let mut generator = ParticleGenerator::new(GeneratorSettings {
            max_vertices: 100,
            ..Default::default()
        });

        let zero = GenerationRequest::SphereSurface {
            count: 0,
            radius: 1.0,
        };
        let flat = GenerationRequest::SphereSurface {
            count: 10,
            radius: 0.0,
        };
        let huge = GenerationRequest::SphereSurface {
            count: 101,
            radius: 1.0,
        };

        assert!(matches!(
            generator.generate(&zero, &mut rng(), &()),
            Err(GenerationError::InvalidRequest(_))
        ));
        assert!(matches!(
            generator.generate(&flat, &mut rng(), &()),
            Err(GenerationError::InvalidRequest(_))
        ));
        assert_eq!(
            generator.generate(&huge, &mut rng(), &()).unwrap_err(),
            GenerationError::CeilingExceeded {
                requested: 101,
                limit: 100
            }
        );
    }

    #[test]
    fn oversized_targets_are_clamped_and_reported() {
        let mut generator = ParticleGenerator::new(GeneratorSettings {
            max_vertices: 300,
            ..Default::default()
        });

        let generated = generator
            .generate(&model(line_graph(100), Some(1000)), &mut rng(), &())
            .unwrap();

        assert_eq!(generated.cloud.count(), 300);
        assert_eq!(
            generated.report.adjustments,
            vec![Adjustment::TargetClamped {
                requested: 1000,
                limit: 300
            }]
        );
    }

    #[test]
    fn matching_target_is_left_alone() {
        let mut generator = ParticleGenerator::new(GeneratorSettings::default());
        let graph = line_graph(50);

        let generated = generator
            .generate(&model(graph, Some(50)), &mut rng(), &())
            .unwrap();

        assert_eq!(
            generated.cloud.original_points(),
            (0..50).map(|i| point![i as f32, 0.0, 0.0]).collect::<Vec<_>>()
        );
    }

    #[test]
    fn keyed_models_go_through_the_cache() {
        let loader = |key: &str| -> Result<MeshGraph, LoadError> {
            match key {
                "line" => Ok(MeshGraph::from_geometry(Geometry::from_positions(vec![
                    point![0.0, 0.0, 0.0],
                    point![1.0, 0.0, 0.0],
                ]))),
                _ => Err("not found".into()),
            }
        };
        let mut generator = ParticleGenerator::with_loader(GeneratorSettings::default(), loader);

        let request = GenerationRequest::Model(ModelRequest {
            source: ModelSource::Key("line".to_string()),
            options: ModelOptions::default(),
        });
        let generated = generator.generate(&request, &mut rng(), &()).unwrap();

        assert_eq!(generated.cloud.count(), 2);
        assert!(generator.cache().contains("line"));

        let missing = GenerationRequest::Model(ModelRequest {
            source: ModelSource::Key("nope".to_string()),
            options: ModelOptions::default(),
        });
        assert!(matches!(
            generator.generate(&missing, &mut rng(), &()),
            Err(GenerationError::Load { .. })
        ));
    }

    #[test]
    fn surface_sampling_needs_a_target() {
        let mut generator = ParticleGenerator::new(GeneratorSettings::default());
        let request = GenerationRequest::Model(ModelRequest {
            source: ModelSource::Graph(line_graph(3)),
            options: ModelOptions {
                sampling: ModelSampling::Surface,
                ..Default::default()
            },
        });

        assert!(matches!(
            generator.generate(&request, &mut rng(), &()),
            Err(GenerationError::InvalidRequest(_))
        ));
    }

    #[test]
    fn surface_sampling_reaches_the_target() {
        let generator = ParticleGenerator::new(GeneratorSettings::default());
        let parts = vec![crate::surfaces::tests::cube(0.5)];

        let generated = generator
            .generate_from_source(
                &parts[..],
                &ModelOptions {
                    scale: 2.0,
                    target_count: Some(400),
                    sampling: ModelSampling::Surface,
                },
                &mut rng(),
                &(),
            )
            .unwrap();

        assert_eq!(generated.cloud.count(), 400);
        assert_eq!(generated.report.extracted, 8);
        for p in generated.cloud.original_points() {
            let max = p.x.abs().max(p.y.abs()).max(p.z.abs());
            assert!((max - 1.0).abs() <= 1e-4);
        }
    }

    #[test]
    fn surface_targets_above_the_ceiling_are_clamped() {
        let generator = ParticleGenerator::new(GeneratorSettings {
            max_vertices: 100,
            ..Default::default()
        });
        let parts = vec![crate::surfaces::tests::cube(0.5)];

        let generated = generator
            .generate_from_source(
                &parts[..],
                &ModelOptions {
                    target_count: Some(500),
                    sampling: ModelSampling::Surface,
                    ..Default::default()
                },
                &mut rng(),
                &(),
            )
            .unwrap();

        assert_eq!(generated.cloud.count(), 100);
        assert_eq!(generated.report.count, 100);
        assert!(generated
            .report
            .adjustments
            .contains(&Adjustment::TargetClamped {
                requested: 500,
                limit: 100
            }));
    }

    #[test]
    fn truncated_extraction_is_reported() {
        let generator = ParticleGenerator::new(GeneratorSettings {
            max_vertices: 10,
            ..Default::default()
        });

        let generated = generator
            .generate_from_source(
                &crate::mesh::extract::tests::growing_source(),
                &ModelOptions::default(),
                &mut rng(),
                &(),
            )
            .unwrap();

        assert_eq!(generated.cloud.count(), 10);
        assert_eq!(
            generated.report.adjustments,
            vec![Adjustment::Truncated {
                limit: 10,
                total_vertices: 10
            }]
        );
    }

    #[test]
    fn bad_model_options_are_rejected() {
        let generator = ParticleGenerator::new(GeneratorSettings::default());
        let parts = vec![Geometry::from_positions(vec![point![0.0, 0.0, 0.0]])];

        for options in [
            ModelOptions {
                scale: 0.0,
                ..Default::default()
            },
            ModelOptions {
                target_count: Some(0),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                generator.generate_from_source(&parts[..], &options, &mut rng(), &()),
                Err(GenerationError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn cancelled_requests_publish_nothing() {
        let mut generator = ParticleGenerator::new(GeneratorSettings::default());
        let cancel = AtomicBool::new(true);

        assert!(matches!(
            generator.generate(&model(line_graph(10), None), &mut rng(), &cancel),
            Err(GenerationError::Cancelled)
        ));
    }
}
