//! Transform hierarchy
//!
//! Nodes live in an arena and refer to each other by index. A child is always
//! pushed after its parent, so world transforms resolve in a single forward
//! pass.

use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Node {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn add_root(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, None));
        id
    }

    pub fn add_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        debug_assert!(parent.0 < id.0);
        self.nodes.push(Node::new(name, Some(parent)));
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) {
        self.nodes[id.0].translation = translation;
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) {
        self.nodes[id.0].rotation = rotation;
    }

    /// Rotate about the node's own Y axis
    pub fn rotate_y(&mut self, id: NodeId, angle: f32) {
        let node = &mut self.nodes[id.0];
        node.rotation = (node.rotation * Quat::from_rotation_y(angle)).normalize();
    }

    /// World transform of every node, indexed by `NodeId::index`
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut world: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let local = node.local_matrix();
            let matrix = match node.parent {
                Some(parent) => world[parent.0] * local,
                None => local,
            };
            world.push(matrix);
        }
        world
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        let mut matrix = self.nodes[id.0].local_matrix();
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            matrix = self.nodes[parent.0].local_matrix() * matrix;
            current = self.nodes[parent.0].parent;
        }
        matrix.w_axis.truncate()
    }
}
