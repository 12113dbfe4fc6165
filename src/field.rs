use log::debug;
use nalgebra::Point3;

use crate::animation::{AnimationEngine, AnimationSettings};
use crate::config::ParticleConfig;
use crate::connections::{build_connections, ConnectionGraph};
use crate::generator::{GenerationReport, Generated};
use crate::particles::ParticleCloud;

// A cloud plus its animation and connections, updated once per frame by the host
#[derive(Debug, Clone)]
pub struct ParticleField {
    cloud: ParticleCloud,
    report: GenerationReport,
    engine: AnimationEngine,
    connection_distance: Option<f32>,
    connections: Option<ConnectionGraph>,
}

impl ParticleField {
    pub fn new(
        generated: Generated,
        animation: AnimationSettings,
        connection_distance: Option<f32>,
    ) -> Self {
        let mut field = ParticleField {
            cloud: generated.cloud,
            report: generated.report,
            engine: AnimationEngine::new(animation),
            connection_distance,
            connections: None,
        };

        field.rebuild_connections();
        field
    }

    pub fn from_config(generated: Generated, config: &ParticleConfig) -> Self {
        Self::new(generated, config.animation, config.connection_distance())
    }

    pub fn update(&mut self, delta_time: f32) {
        self.engine.tick(&mut self.cloud, delta_time);
    }

    // Pointer already in the cloud's space, None when it leaves the viewport
    pub fn set_pointer(&mut self, pointer: Option<Point3<f32>>) {
        self.engine.set_pointer(pointer);
    }

    pub fn set_connection_distance(&mut self, connection_distance: Option<f32>) {
        if self.connection_distance == connection_distance {
            return;
        }

        self.connection_distance = connection_distance;
        self.rebuild_connections();
    }

    // Swaps in a freshly generated cloud, animation restarts from t = 0
    pub fn replace_cloud(&mut self, generated: Generated) {
        self.cloud = generated.cloud;
        self.report = generated.report;
        self.engine.reset();
        self.rebuild_connections();
    }

    fn rebuild_connections(&mut self) {
        self.connections = self.connection_distance.map(|max_distance| {
            let graph = build_connections(&self.cloud.original_points(), max_distance);
            debug!(
                "{} connections within {max_distance} across {} particles",
                graph.len(),
                self.cloud.count()
            );
            graph
        });
    }

    pub fn cloud(&self) -> &ParticleCloud {
        &self.cloud
    }

    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    pub fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    pub fn animation_mut(&mut self) -> &mut AnimationSettings {
        self.engine.settings_mut()
    }

    pub fn connections(&self) -> Option<&ConnectionGraph> {
        self.connections.as_ref()
    }

    pub fn positions(&self) -> &[f32] {
        self.cloud.working_positions()
    }

    pub fn colors(&self) -> &[f32] {
        self.cloud.colors()
    }

    pub fn sizes(&self) -> &[f32] {
        self.cloud.sizes()
    }

    // Flat endpoint buffer, empty when connections are off
    pub fn connection_segments(&self) -> &[f32] {
        self.connections
            .as_ref()
            .map(ConnectionGraph::segments)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::generator::{GenerationRequest, GeneratorSettings, ParticleGenerator};

    fn generated(count: usize) -> Generated {
        ParticleGenerator::new(GeneratorSettings::default())
            .generate(
                &GenerationRequest::SphereSurface { count, radius: 1.0 },
                &mut StdRng::seed_from_u64(5),
                &(),
            )
            .unwrap()
    }

    #[test]
    fn connections_follow_the_distance() {
        let mut field = ParticleField::new(generated(200), AnimationSettings::default(), None);
        assert!(field.connections().is_none());
        assert!(field.connection_segments().is_empty());

        field.set_connection_distance(Some(f32::INFINITY));
        assert_eq!(field.connections().map(|c| c.len()), Some(200 * 199 / 2));
        assert_eq!(field.connection_segments().len(), 200 * 199 / 2 * 6);

        field.set_connection_distance(Some(0.0));
        assert_eq!(field.connections().map(|c| c.len()), Some(0));
    }

    #[test]
    fn connections_ignore_animation() {
        let mut field = ParticleField::new(generated(100), AnimationSettings::default(), Some(0.3));
        let before = field.connections().cloned();

        for _ in 0..5 {
            field.update(0.1);
        }

        assert_eq!(field.connections().cloned(), before);
    }

    #[test]
    fn replacing_the_cloud_restarts_animation() {
        let mut field = ParticleField::new(generated(10), AnimationSettings::default(), Some(0.5));
        field.set_pointer(Some(point![0.0, 0.0, 0.0]));
        field.update(1.0);
        assert!(field.engine().state().time > 0.0);

        field.replace_cloud(generated(20));

        assert_eq!(field.engine().state().time, 0.0);
        assert_eq!(field.engine().state().pointer, None);
        assert_eq!(field.positions().len(), 60);
        assert_eq!(field.positions(), field.cloud().original_positions());
    }

    #[test]
    fn buffers_are_consistent() {
        let field = ParticleField::new(generated(64), AnimationSettings::default(), None);

        assert_eq!(field.positions().len(), 64 * 3);
        assert_eq!(field.colors().len(), 64 * 3);
        assert_eq!(field.sizes().len(), 64);
    }
}
