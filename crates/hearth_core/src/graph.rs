//! Scene graph arena
//!
//! The scene is a strict tree of [`SceneNode`]s stored in a slot map. Nodes
//! refer to each other by [`NodeKey`] only, so a handle resolves in O(1) and
//! stays valid for as long as the node lives. Removing a node removes its whole
//! subtree.

use std::fmt;
use std::sync::Arc;

use hearth_math::{mat4, Mat4, MeshData, Vec3};
use slotmap::{new_key_type, SlotMap};

use crate::lighting::LightKey;
use crate::material::{DirtyFlags, Material};
use crate::particles::ParticleKey;
use crate::Transform;

new_key_type! {
    /// Key to a node in the scene graph
    ///
    /// Uses generational indexing, so a key to a removed node returns None
    /// instead of aliasing whatever reuses its slot.
    pub struct NodeKey;
}

/// A mesh plus the material it is drawn with
///
/// Meshes are shared so repeated parts (legs, leaves, stones) reuse one
/// geometry.
#[derive(Clone, Debug)]
pub struct Drawable {
    pub mesh: Arc<MeshData>,
    pub material: Material,
}

/// What a node carries besides its transform
#[derive(Clone, Debug, Default)]
pub enum NodeContent {
    /// Pure grouping node
    #[default]
    Empty,
    /// Visible geometry
    Mesh(Drawable),
    /// Anchor for a particle emitter; particle positions are local to this node
    Particles(ParticleKey),
    /// Anchor for a point light
    Light(LightKey),
}

/// A node in the scene tree
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// Symbolic name (used at setup time only)
    pub name: String,
    /// Transform relative to the parent
    transform: Transform,
    /// Content drawn or anchored at this node
    pub content: NodeContent,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    dirty: DirtyFlags,
}

impl SceneNode {
    /// Create an empty grouping node
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            content: NodeContent::Empty,
            parent: None,
            children: Vec::new(),
            dirty: DirtyFlags::ALL,
        }
    }

    /// Create a node that draws `mesh` with `material`
    pub fn mesh(name: impl Into<String>, mesh: Arc<MeshData>, material: Material) -> Self {
        Self::group(name).with_content(NodeContent::Mesh(Drawable { mesh, material }))
    }

    /// Set the content
    pub fn with_content(mut self, content: NodeContent) -> Self {
        self.content = content;
        self
    }

    /// Set the transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Get the local transform
    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replace the transform and mark it as dirty
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }

    /// Set the position and mark the transform as dirty
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }

    /// Set the Euler rotation and mark the transform as dirty
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }

    /// Parent node (None for the root)
    #[inline]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Children in insertion order
    #[inline]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Check if this node has any dirty flags set
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Get the current dirty flags
    #[inline]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    /// Mark this node as dirty with the given flags
    #[inline]
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    /// Clear all dirty flags
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::NONE;
    }
}

/// Errors from structural scene graph operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The referenced node does not exist (or was removed)
    NodeNotFound,
    /// The root node cannot be removed
    RootRemoval,
    /// A handle name was looked up that the scene does not define
    UnknownHandle(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::NodeNotFound => write!(f, "Scene node not found"),
            SceneError::RootRemoval => write!(f, "The scene root cannot be removed"),
            SceneError::UnknownHandle(name) => write!(f, "Unknown scene handle: {}", name),
        }
    }
}

impl std::error::Error for SceneError {}

/// Tree of scene nodes with a single root
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph containing only the root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::group("root"));
        Self { nodes, root }
    }

    /// The root node
    #[inline]
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Insert `node` as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeKey, mut node: SceneNode) -> Result<NodeKey, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound);
        }
        node.parent = Some(parent);
        node.children.clear();
        let key = self.nodes.insert(node);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(key);
        }
        Ok(key)
    }

    /// Remove a node and its whole subtree, returning how many nodes were removed
    pub fn remove(&mut self, key: NodeKey) -> Result<usize, SceneError> {
        if key == self.root {
            return Err(SceneError::RootRemoval);
        }
        let parent = self.nodes.get(key).ok_or(SceneError::NodeNotFound)?.parent;
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.retain(|c| *c != key);
        }

        let mut removed = 0;
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(node) = self.nodes.remove(k) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Get an immutable reference to a node by key
    #[inline]
    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Get a mutable reference to a node by key
    #[inline]
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    /// True if `key` refers to a live node
    #[inline]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Get the number of nodes (including the root)
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if only the root exists
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over all nodes in storage order
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    /// Find the first node with the given name (linear scan, setup time only)
    pub fn find_by_name(&self, name: &str) -> Option<NodeKey> {
        self.nodes.iter().find(|(_, n)| n.name == name).map(|(k, _)| k)
    }

    /// Local-to-world matrix of a node
    pub fn world_matrix(&self, key: NodeKey) -> Option<Mat4> {
        let mut node = self.nodes.get(key)?;
        let mut m = node.transform.to_matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(parent)?;
            m = mat4::mul(node.transform.to_matrix(), m);
        }
        Some(m)
    }

    /// World-space position of a node's origin
    pub fn world_position(&self, key: NodeKey) -> Option<Vec3> {
        self.world_matrix(key).map(mat4::get_translation)
    }

    /// Depth-first visit of the subtree rooted at `start`, parents before children.
    ///
    /// `f` receives each node with its accumulated local-to-world matrix.
    pub fn visit<F>(&self, start: NodeKey, mut f: F)
    where
        F: FnMut(NodeKey, &SceneNode, Mat4),
    {
        let Some(parent_world) = self
            .nodes
            .get(start)
            .map(|n| n.parent.and_then(|p| self.world_matrix(p)).unwrap_or(mat4::IDENTITY))
        else {
            return;
        };

        let mut stack = vec![(start, parent_world)];
        while let Some((key, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            let world = mat4::mul(parent_world, node.transform.to_matrix());
            f(key, node, world);
            // Reverse so children are visited in insertion order
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
    }

    /// True if `key` or any node below it is dirty
    pub fn is_subtree_dirty(&self, key: NodeKey) -> bool {
        let mut dirty = false;
        self.visit(key, |_, node, _| dirty |= node.is_dirty());
        dirty
    }

    /// True if `node` is `ancestor` or lies somewhere below it
    pub fn is_descendant_of(&self, node: NodeKey, ancestor: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.nodes.get(k).and_then(|n| n.parent);
        }
        false
    }

    /// Clear dirty flags on every node
    pub fn clear_dirty(&mut self) {
        for (_, node) in self.nodes.iter_mut() {
            node.clear_dirty();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_math::primitives;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    fn cube() -> Arc<MeshData> {
        Arc::new(primitives::cuboid(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_new_graph_has_root() {
        let graph = SceneGraph::new();
        assert_eq!(graph.len(), 1);
        assert!(graph.is_empty());
        assert!(graph.get(graph.root()).unwrap().parent().is_none());
    }

    #[test]
    fn test_add_child_links_parent() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, SceneNode::group("a")).unwrap();
        let b = graph.add_child(root, SceneNode::mesh("b", cube(), Material::WHITE)).unwrap();

        assert_eq!(graph.get(root).unwrap().children(), &[a, b]);
        assert_eq!(graph.get(a).unwrap().parent(), Some(root));
        assert!(matches!(graph.get(b).unwrap().content, NodeContent::Mesh(_)));
    }

    #[test]
    fn test_add_child_to_missing_parent() {
        let mut graph = SceneGraph::new();
        let a = graph.add_child(graph.root(), SceneNode::group("a")).unwrap();
        graph.remove(a).unwrap();
        assert_eq!(graph.add_child(a, SceneNode::group("b")), Err(SceneError::NodeNotFound));
    }

    #[test]
    fn test_remove_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, SceneNode::group("a")).unwrap();
        let b = graph.add_child(a, SceneNode::group("b")).unwrap();
        let c = graph.add_child(b, SceneNode::group("c")).unwrap();
        let d = graph.add_child(root, SceneNode::group("d")).unwrap();

        assert_eq!(graph.remove(a), Ok(3));
        assert!(!graph.contains(a));
        assert!(!graph.contains(b));
        assert!(!graph.contains(c));
        assert!(graph.contains(d));
        assert_eq!(graph.get(root).unwrap().children(), &[d]);
    }

    #[test]
    fn test_cannot_remove_root() {
        let mut graph = SceneGraph::new();
        assert_eq!(graph.remove(graph.root()), Err(SceneError::RootRemoval));
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut graph = SceneGraph::new();
        let group = graph
            .add_child(
                graph.root(),
                SceneNode::group("campfire").with_transform(Transform::at(-5.0, 0.1, 5.0)),
            )
            .unwrap();
        let light = graph
            .add_child(group, SceneNode::group("light").with_transform(Transform::at(0.0, 0.8, 0.0)))
            .unwrap();

        let pos = graph.world_position(light).unwrap();
        assert!(vec_approx_eq(pos, Vec3::new(-5.0, 0.9, 5.0)));
    }

    #[test]
    fn test_world_matrix_with_parent_rotation() {
        let mut graph = SceneGraph::new();
        let bed = graph
            .add_child(
                graph.root(),
                SceneNode::group("bed")
                    .with_transform(Transform::at(-1.8, 0.0, 1.2).with_rotation(0.0, std::f32::consts::FRAC_PI_2, 0.0)),
            )
            .unwrap();
        let pillow = graph
            .add_child(bed, SceneNode::group("pillow").with_transform(Transform::at(0.0, 0.0, 1.0)))
            .unwrap();

        // Local +Z turns into world +X under the parent's quarter turn
        let pos = graph.world_position(pillow).unwrap();
        assert!(vec_approx_eq(pos, Vec3::new(-0.8, 0.0, 1.2)), "got {:?}", pos);
    }

    #[test]
    fn test_visit_order_and_matrices() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, SceneNode::group("a").with_transform(Transform::at(1.0, 0.0, 0.0))).unwrap();
        let b = graph.add_child(a, SceneNode::group("b").with_transform(Transform::at(0.0, 1.0, 0.0))).unwrap();
        let c = graph.add_child(root, SceneNode::group("c")).unwrap();

        let mut order = Vec::new();
        graph.visit(root, |key, _, world| order.push((key, mat4::get_translation(world))));

        let keys: Vec<NodeKey> = order.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![root, a, b, c]);
        assert!(vec_approx_eq(order[2].1, Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_visit_subtree_includes_parent_transform() {
        let mut graph = SceneGraph::new();
        let a = graph
            .add_child(graph.root(), SceneNode::group("a").with_transform(Transform::at(0.0, 3.0, 0.0)))
            .unwrap();
        let b = graph.add_child(a, SceneNode::group("b")).unwrap();

        let mut seen = None;
        graph.visit(b, |_, _, world| seen = Some(mat4::get_translation(world)));
        assert!(vec_approx_eq(seen.unwrap(), Vec3::new(0.0, 3.0, 0.0)));
    }

    #[test]
    fn test_dirty_tracking() {
        let mut graph = SceneGraph::new();
        let head = graph.add_child(graph.root(), SceneNode::group("head")).unwrap();
        let ears = graph.add_child(head, SceneNode::group("ears")).unwrap();

        // New nodes start dirty
        assert!(graph.is_subtree_dirty(head));
        graph.clear_dirty();
        assert!(!graph.is_subtree_dirty(graph.root()));

        graph.get_mut(ears).unwrap().set_rotation(Vec3::new(0.03, 0.0, 0.0));
        assert!(graph.is_subtree_dirty(head));
        assert!(graph.get(ears).unwrap().dirty_flags().contains(DirtyFlags::TRANSFORM));
    }

    #[test]
    fn test_is_descendant_of() {
        let mut graph = SceneGraph::new();
        let head = graph.add_child(graph.root(), SceneNode::group("head")).unwrap();
        let ears = graph.add_child(head, SceneNode::group("ears")).unwrap();
        let tail = graph.add_child(graph.root(), SceneNode::group("tail")).unwrap();

        assert!(graph.is_descendant_of(ears, head));
        assert!(graph.is_descendant_of(head, head));
        assert!(!graph.is_descendant_of(tail, head));
    }

    #[test]
    fn test_find_by_name() {
        let mut graph = SceneGraph::new();
        let lamp = graph.add_child(graph.root(), SceneNode::group("lamp")).unwrap();
        assert_eq!(graph.find_by_name("lamp"), Some(lamp));
        assert_eq!(graph.find_by_name("missing"), None);
    }
}
