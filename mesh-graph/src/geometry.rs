use nalgebra::Point3;

// Vertex positions in the node's local space. When `triangles` is empty the
// positions are read as a plain triangle list (every three positions is a face)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Point3<f32>>,
    pub triangles: Vec<[u32; 3]>,
}

impl Geometry {
    pub fn new(positions: Vec<Point3<f32>>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            triangles,
        }
    }

    pub fn from_positions(positions: Vec<Point3<f32>>) -> Self {
        Self::new(positions, vec![])
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    // Faces as position triples. Indices pointing past the position list are skipped
    pub fn faces(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        let indexed = self.triangles.iter().filter_map(|[a, b, c]| {
            Some([
                *self.positions.get(*a as usize)?,
                *self.positions.get(*b as usize)?,
                *self.positions.get(*c as usize)?,
            ])
        });

        let listed = self
            .positions
            .chunks_exact(3)
            .filter(|_| self.triangles.is_empty())
            .map(|f| [f[0], f[1], f[2]]);

        indexed.chain(listed)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::point;

    use super::Geometry;

    #[test]
    fn unindexed_positions_are_a_triangle_list() {
        let geometry = Geometry::from_positions(vec![
            point![0.0, 0.0, 0.0],
            point![1.0, 0.0, 0.0],
            point![0.0, 1.0, 0.0],
            point![5.0, 5.0, 5.0],
        ]);

        assert_eq!(geometry.faces().count(), 1);
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let geometry = Geometry::new(
            vec![
                point![0.0, 0.0, 0.0],
                point![1.0, 0.0, 0.0],
                point![0.0, 1.0, 0.0],
            ],
            vec![[0, 1, 2], [0, 1, 7]],
        );

        assert_eq!(geometry.faces().count(), 1);
    }
}
