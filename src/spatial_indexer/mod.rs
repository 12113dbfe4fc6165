use nalgebra::Point3;

pub mod kd_indexer;

pub trait Positioned {
    fn position(&self) -> Point3<f32>;
}

impl Positioned for Point3<f32> {
    fn position(&self) -> Point3<f32> {
        *self
    }
}

// SpatialIndexer is used to accelerate radius searches. It doesn't own any data, just indices
pub trait SpatialIndexer<P: Positioned> {
    // reindex will rebuild the internal index over items[i] for every i in `indices`
    fn reindex(&mut self, items: &[P], indices: Vec<usize>);

    // get_indices_within will return the index of all items within `radius` of `origin`
    fn get_indices_within(&self, items: &[P], origin: Point3<f32>, radius: f32) -> Vec<usize>;
}
