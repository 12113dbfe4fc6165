use generational_arena::Arena;
use nalgebra::Matrix4;

use crate::geometry::Geometry;
use crate::transform::NodeTransform;

pub type NodeId = generational_arena::Index;

#[derive(Debug)]
pub struct Node {
    pub transform: NodeTransform,
    geometry: Option<Geometry>,
}

impl Node {
    pub fn new(geometry: Option<Geometry>) -> Self {
        Self {
            transform: NodeTransform::identity(),
            geometry,
        }
    }
}

type NodeStorage = Arena<(Node, Vec<NodeId>)>;

pub struct NodeRef<'a> {
    nodes: &'a NodeStorage,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a (Node, Vec<NodeId>) {
        &self.nodes[self.id]
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn transform(&self) -> &'a NodeTransform {
        &self.node().0.transform
    }

    pub fn geometry(&self) -> Option<&'a Geometry> {
        self.node().0.geometry.as_ref()
    }

    pub fn children(&self) -> Vec<NodeRef<'a>> {
        self.node()
            .1
            .iter()
            .map(|i| NodeRef {
                nodes: self.nodes,
                id: *i,
            })
            .collect()
    }
}

pub struct NodeMut<'a> {
    nodes: &'a mut NodeStorage,
    id: NodeId,
}

impl<'a> NodeMut<'a> {
    fn node(&mut self) -> &mut (Node, Vec<NodeId>) {
        &mut self.nodes[self.id]
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn transform(&mut self) -> &mut NodeTransform {
        &mut self.node().0.transform
    }

    pub fn with_transform<F>(&mut self, f: F)
    where
        F: FnOnce(&mut NodeTransform),
    {
        f(&mut self.node().0.transform)
    }

    pub fn push(&mut self, node: Node) -> NodeMut<'_> {
        let child_index = self.nodes.insert((node, vec![]));

        self.node().1.push(child_index);

        NodeMut {
            nodes: self.nodes,
            id: child_index,
        }
    }

    pub fn push_empty(&mut self) -> NodeMut<'_> {
        self.push(Node::new(None))
    }

    pub fn push_geometry(&mut self, geometry: Geometry) -> NodeMut<'_> {
        self.push(Node::new(Some(geometry)))
    }
}

// Tree of transformed mesh parts, the way an asset loader hands a model over
#[derive(Debug)]
pub struct MeshGraph {
    nodes: NodeStorage,
    root: NodeId,
}

impl Default for MeshGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshGraph {
    pub fn new() -> Self {
        let mut node_storage: NodeStorage = Arena::new();
        let root_id = node_storage.insert((Node::new(None), vec![]));

        MeshGraph {
            nodes: node_storage,
            root: root_id,
        }
    }

    // A graph with a single geometry node under the root
    pub fn from_geometry(geometry: Geometry) -> Self {
        let mut graph = Self::new();
        graph.root_mut().push_geometry(geometry);
        graph
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef {
            nodes: &self.nodes,
            id,
        }
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(self.root)
    }

    pub fn node_mut(&mut self, id: NodeId) -> NodeMut<'_> {
        NodeMut {
            nodes: &mut self.nodes,
            id,
        }
    }

    pub fn root_mut(&mut self) -> NodeMut<'_> {
        self.node_mut(self.root)
    }

    // Visits every node that carries geometry, depth first in insertion order,
    // with the world matrix accumulated from the root
    pub fn walk<F>(&self, mut f: F)
    where
        F: FnMut(Matrix4<f32>, &Geometry),
    {
        let mut to_visit = vec![(Matrix4::identity(), self.root)];

        while let Some((previous_transform, index)) = to_visit.pop() {
            let (node, children) = &self.nodes[index];

            let transform = previous_transform * node.transform.to_homogeneous();

            if let Some(geometry) = &node.geometry {
                f(transform, geometry);
            }

            for i in children.iter().rev() {
                to_visit.push((transform, *i))
            }
        }
    }

    pub fn vertex_count(&self) -> usize {
        let mut total = 0;
        self.walk(|_, geometry| total += geometry.vertex_count());
        total
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }
}
