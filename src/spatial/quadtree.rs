use std::collections::HashMap;
use std::hash::Hash;

use slotmap::SlotMap;
use tracing::trace;

use crate::geometry::Rect;
use crate::math::Point2;

slotmap::new_key_type! {
    /// Unique identifier for a node in a [`Quadtree`].
    pub struct NodeId;
}

/// Split limits for a [`Quadtree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadtreeConfig {
    /// A leaf holding more than this many objects splits.
    pub max_objects: usize,
    /// Nodes at this depth never split.
    pub max_depth: usize,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            max_objects: 20,
            max_depth: 4,
        }
    }
}

#[derive(Debug, Clone)]
struct QuadNode<T> {
    bounds: Rect,
    depth: usize,
    objects: Vec<(T, Rect)>,
    children: Option<[NodeId; 4]>,
}

/// A rectangle-bucketed spatial index.
///
/// Every object is owned by exactly one node: the deepest node whose bounds
/// fully contain the object's bounds. Objects straddling a split line stay
/// with the parent, and objects outside the root bounds stay at the root.
/// Queries therefore return a superset of the truly overlapping objects;
/// exact tests belong in the query predicate.
#[derive(Debug, Clone)]
pub struct Quadtree<T> {
    nodes: SlotMap<NodeId, QuadNode<T>>,
    root: NodeId,
    config: QuadtreeConfig,
    owners: HashMap<T, NodeId>,
}

impl<T: Copy + Eq + Hash> Quadtree<T> {
    /// Creates an empty tree covering `bounds`.
    #[must_use]
    pub fn new(bounds: Rect, config: QuadtreeConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(QuadNode {
            bounds,
            depth: 0,
            objects: Vec::new(),
            children: None,
        });
        Self {
            nodes,
            root,
            config,
            owners: HashMap::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.nodes[self.root].bounds
    }

    #[must_use]
    pub fn config(&self) -> QuadtreeConfig {
        self.config
    }

    /// Number of objects in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    #[must_use]
    pub fn contains(&self, obj: &T) -> bool {
        self.owners.contains_key(obj)
    }

    /// The node that owns `obj`, if present.
    #[must_use]
    pub fn owner(&self, obj: &T) -> Option<NodeId> {
        self.owners.get(obj).copied()
    }

    /// Inserts `obj` with the given bounds and returns the owning node.
    ///
    /// Re-inserting an object already in the tree moves it.
    pub fn insert(&mut self, obj: T, bounds: Rect) -> NodeId {
        self.remove(&obj);
        let mut node = self.root;
        loop {
            let next = self.nodes[node].children.and_then(|children| {
                children
                    .into_iter()
                    .find(|c| self.nodes[*c].bounds.contains_rect(&bounds))
            });
            match next {
                Some(child) => node = child,
                None => break,
            }
        }
        self.nodes[node].objects.push((obj, bounds));
        self.owners.insert(obj, node);
        self.maybe_split(node);
        self.owners.get(&obj).copied().unwrap_or(node)
    }

    /// Removes `obj`. Returns `false` if it was not present.
    pub fn remove(&mut self, obj: &T) -> bool {
        let Some(node) = self.owners.remove(obj) else {
            return false;
        };
        let objects = &mut self.nodes[node].objects;
        if let Some(pos) = objects.iter().position(|(o, _)| o == obj) {
            objects.swap_remove(pos);
        }
        true
    }

    /// Moves `obj` to reflect new bounds.
    pub fn update(&mut self, obj: T, bounds: Rect) -> NodeId {
        self.insert(obj, bounds)
    }

    /// Removes every object and collapses the tree to its root.
    pub fn clear(&mut self) {
        let bounds = self.bounds();
        *self = Self::new(bounds, self.config);
    }

    /// Objects whose stored bounds overlap `rect`, in traversal order.
    #[must_use]
    pub fn get_objects(&self, rect: &Rect) -> Vec<T> {
        self.get_objects_filtered(rect, |_, _| true)
    }

    /// Like [`Quadtree::get_objects`], keeping only objects for which
    /// `predicate` holds. The predicate only sees candidates whose bounds
    /// already overlap `rect`.
    pub fn get_objects_filtered<F>(&self, rect: &Rect, mut predicate: F) -> Vec<T>
    where
        F: FnMut(&T, &Rect) -> bool,
    {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            for (obj, bounds) in &node.objects {
                if bounds.overlaps(rect) && predicate(obj, bounds) {
                    found.push(*obj);
                }
            }
            if let Some(children) = node.children {
                // Reverse so children are visited in NW, NE, SE, SW order.
                for child in children.into_iter().rev() {
                    if self.nodes[child].bounds.overlaps(rect) {
                        stack.push(child);
                    }
                }
            }
        }
        found
    }

    /// Leaf nodes whose bounds overlap `rect`.
    #[must_use]
    pub fn get_leaf_nodes(&self, rect: &Rect) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            match self.nodes[id].children {
                Some(children) => stack.extend(
                    children
                        .into_iter()
                        .rev()
                        .filter(|c| self.nodes[*c].bounds.overlaps(rect)),
                ),
                None => leaves.push(id),
            }
        }
        leaves
    }

    /// Direct children of `node` whose bounds overlap `rect`.
    #[must_use]
    pub fn get_child_nodes(&self, node: NodeId, rect: &Rect) -> Vec<NodeId> {
        self.nodes
            .get(node)
            .and_then(|n| n.children)
            .map(|children| {
                children
                    .into_iter()
                    .filter(|c| self.nodes[*c].bounds.overlaps(rect))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Bounds of a node.
    #[must_use]
    pub fn node_bounds(&self, node: NodeId) -> Option<Rect> {
        self.nodes.get(node).map(|n| n.bounds)
    }

    /// Depth of a node; the root is at depth 0.
    #[must_use]
    pub fn node_depth(&self, node: NodeId) -> Option<usize> {
        self.nodes.get(node).map(|n| n.depth)
    }

    /// Objects owned directly by a node.
    pub fn node_objects(&self, node: NodeId) -> impl Iterator<Item = &T> {
        self.nodes
            .get(node)
            .into_iter()
            .flat_map(|n| n.objects.iter().map(|(o, _)| o))
    }

    /// Every node id, for visualization and diagnostics.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    fn maybe_split(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        if node.children.is_some()
            || node.objects.len() <= self.config.max_objects
            || node.depth >= self.config.max_depth
        {
            return;
        }
        let (bounds, depth) = (node.bounds, node.depth);
        let c = bounds.center();
        let quadrants = [
            Rect::from_corners(bounds.min, c),
            Rect::from_corners(Point2::new(c.x, bounds.min.y), Point2::new(bounds.max.x, c.y)),
            Rect::from_corners(c, bounds.max),
            Rect::from_corners(Point2::new(bounds.min.x, c.y), Point2::new(c.x, bounds.max.y)),
        ];
        let children = quadrants.map(|q| {
            self.nodes.insert(QuadNode {
                bounds: q,
                depth: depth + 1,
                objects: Vec::new(),
                children: None,
            })
        });
        self.nodes[id].children = Some(children);

        let objects = std::mem::take(&mut self.nodes[id].objects);
        let mut kept = Vec::new();
        for (obj, obj_bounds) in objects {
            match children
                .iter()
                .find(|c| self.nodes[**c].bounds.contains_rect(&obj_bounds))
            {
                Some(&child) => {
                    self.nodes[child].objects.push((obj, obj_bounds));
                    self.owners.insert(obj, child);
                }
                None => kept.push((obj, obj_bounds)),
            }
        }
        trace!(depth, retained = kept.len(), "quadtree node split");
        self.nodes[id].objects = kept;
        for child in children {
            self.maybe_split(child);
        }
    }
}
