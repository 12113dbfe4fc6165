use nalgebra::{Point3, Vector3};
use rand::Rng;

// Axis aligned box grown one point at a time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    // Inverted infinite box, the first `grow` snaps it onto that point
    pub fn new() -> Self {
        Self {
            min: Point3::from(Vector3::repeat(f32::INFINITY)),
            max: Point3::from(Vector3::repeat(f32::NEG_INFINITY)),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f32>>) -> Self {
        let mut bounds = Self::new();
        for p in points {
            bounds.grow(p);
        }
        bounds
    }

    pub fn grow(&mut self, p: &Point3<f32>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn extent(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zeros();
        }

        self.max - self.min
    }

    // True when the box has collapsed to (roughly) a single point
    pub fn is_degenerate(&self) -> bool {
        self.extent().norm() <= f32::EPSILON
    }

    pub fn contains(&self, p: &Point3<f32>) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }

    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3<f32> {
        let t = Vector3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>());

        self.min + self.extent().component_mul(&t)
    }
}
