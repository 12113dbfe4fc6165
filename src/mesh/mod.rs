use std::sync::Arc;

use mesh_graph::{Geometry, MeshGraph};
use nalgebra::{Matrix4, Point3};

pub mod cache;
pub mod extract;
pub mod resample;

pub use cache::MeshCache;
pub use extract::{extract_vertices, Extraction};
pub use resample::{resample, resample_capped, Resampled, JITTER};

// One piece of a model: local geometry plus the world matrix the loader resolved for it
#[derive(Debug, Clone, Copy)]
pub struct MeshPart<'a> {
    pub geometry: &'a Geometry,
    pub transform: Matrix4<f32>,
}

impl<'a> MeshPart<'a> {
    pub fn new(geometry: &'a Geometry, transform: Matrix4<f32>) -> Self {
        MeshPart {
            geometry,
            transform,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.geometry.vertex_count()
    }

    pub fn world_position(&self, index: usize) -> Option<Point3<f32>> {
        self.geometry
            .positions
            .get(index)
            .map(|p| self.transform.transform_point(p))
    }

    pub fn world_faces(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + 'a {
        let transform = self.transform;

        self.geometry
            .faces()
            .map(move |face| face.map(|p| transform.transform_point(&p)))
    }
}

// Anything that can hand over its mesh parts, in a stable order, as many times as asked
pub trait MeshSource {
    fn for_each_part(&self, f: &mut dyn FnMut(MeshPart<'_>));

    fn vertex_count(&self) -> usize {
        let mut total = 0;
        self.for_each_part(&mut |part| total += part.vertex_count());
        total
    }

    fn part_count(&self) -> usize {
        let mut parts = 0;
        self.for_each_part(&mut |_| parts += 1);
        parts
    }
}

impl MeshSource for MeshGraph {
    fn for_each_part(&self, f: &mut dyn FnMut(MeshPart<'_>)) {
        self.walk(|transform, geometry| f(MeshPart::new(geometry, transform)))
    }
}

// Geometry already in world space
impl MeshSource for [Geometry] {
    fn for_each_part(&self, f: &mut dyn FnMut(MeshPart<'_>)) {
        for geometry in self {
            f(MeshPart::new(geometry, Matrix4::identity()))
        }
    }
}

impl<S: MeshSource + ?Sized> MeshSource for Arc<S> {
    fn for_each_part(&self, f: &mut dyn FnMut(MeshPart<'_>)) {
        (**self).for_each_part(f)
    }
}

// Wraps a callback that produces parts on demand
pub struct MeshFn<F>(F);

impl<F> MeshFn<F>
where
    F: Fn(&mut dyn FnMut(MeshPart<'_>)),
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> MeshSource for MeshFn<F>
where
    F: Fn(&mut dyn FnMut(MeshPart<'_>)),
{
    fn for_each_part(&self, f: &mut dyn FnMut(MeshPart<'_>)) {
        (self.0)(f)
    }
}

pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

// The asset side: turns a key (usually a URL) into an already parsed mesh graph
pub trait MeshLoader {
    fn load(&self, key: &str) -> Result<MeshGraph, LoadError>;
}

impl<F> MeshLoader for F
where
    F: Fn(&str) -> Result<MeshGraph, LoadError>,
{
    fn load(&self, key: &str) -> Result<MeshGraph, LoadError> {
        self(key)
    }
}

// For generators that only ever see inline meshes
pub struct NoLoader;

impl MeshLoader for NoLoader {
    fn load(&self, key: &str) -> Result<MeshGraph, LoadError> {
        Err(format!("no loader configured for {key}").into())
    }
}
