// Mesh hierarchy handed to the particle generator by whatever parsed the asset.
// Nothing in here knows about file formats, that's the loader's job

pub use geometry::Geometry;
pub use graph::{MeshGraph, NodeId, NodeMut, NodeRef};
pub use transform::NodeTransform;

mod geometry;
mod graph;
mod transform;
