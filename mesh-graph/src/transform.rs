use std::f32::consts::PI;

use nalgebra::{point, vector, Matrix4, Point3, Rotation3, Scale3, Translation3, Vector3};

// Local transform of a mesh node. Rotation is euler angles in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub position: Point3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl NodeTransform {
    pub fn identity() -> Self {
        Self {
            position: point![0.0, 0.0, 0.0],
            rotation: vector![0.0, 0.0, 0.0],
            scale: vector![1.0, 1.0, 1.0],
        }
    }

    pub fn with_position(mut self, position: Point3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vector3<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn to_homogeneous(&self) -> Matrix4<f32> {
        let translation =
            Translation3::new(self.position.x, self.position.y, self.position.z).to_homogeneous();
        let rotation = Rotation3::new(self.rotation * (PI / 180.0)).to_homogeneous();
        let scale = Scale3::new(self.scale.x, self.scale.y, self.scale.z).to_homogeneous();

        translation * rotation * scale
    }
}
