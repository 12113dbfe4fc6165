//! Point cloud particles from procedural spheres or mesh vertices, animated
//! frame by frame with a floating motion and a pointer push.
//!
//! Everything here works on plain buffers. Rendering, asset loading and input
//! handling belong to the host, which hands over parsed meshes
//! ([`mesh_graph::MeshGraph`] or any [`mesh::MeshSource`]) and pointer positions
//! already in the cloud's space.

pub mod animation;
pub mod cancel;
pub mod config;
pub mod connections;
pub mod error;
pub mod field;
pub mod generator;
pub mod geometry;
pub mod mesh;
pub mod particles;
pub mod spatial_indexer;
pub mod surfaces;

pub use animation::{AnimationEngine, AnimationSettings, AnimationState};
pub use cancel::Cancellation;
pub use config::{ParticleConfig, ShapeKind};
pub use connections::{build_connections, build_connections_indexed, ConnectionGraph};
pub use error::{GenerationError, GenerationResult};
pub use field::ParticleField;
pub use generator::{
    Adjustment, GenerationReport, GenerationRequest, Generated, GeneratorSettings, ModelOptions,
    ModelRequest, ModelSampling, ModelSource, ParticleGenerator,
};
pub use mesh_graph;
pub use particles::{Appearance, ParticleCloud};
