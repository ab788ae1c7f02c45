//! k-d tree for spatial indexing
//!
//! Nodes live in an arena and refer to each other by index. A node at depth
//! `d` splits on axis `d mod D`: everything reached through `left` has a
//! coordinate on that axis less than or equal to the node's, everything
//! reached through `right` a strictly greater one.
//!
//! Trees are cheap to rebuild and are rebuilt from scratch for every
//! cross-validation fold; there is no rebalancing or removal.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

use aeolus_core::{Error, Point, Result};
use tracing::debug;

use super::neighbors::{NeighborList, TiePolicy};

/// A D-dimensional k-d tree owning its elements.
#[derive(Debug, Clone)]
pub struct KdTree<P> {
    dimension: usize,
    nodes: Vec<KdNode<P>>,
}

/// One tree node. The root is always arena slot 0.
#[derive(Debug, Clone)]
pub struct KdNode<P> {
    element: P,
    /// Root depth is 0
    depth: usize,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
}

impl<P> KdNode<P> {
    pub fn element(&self) -> &P {
        &self.element
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn left(&self) -> Option<usize> {
        self.left
    }

    pub fn right(&self) -> Option<usize> {
        self.right
    }
}

/// Pending work for the iterative branch-and-bound search.
enum Visit {
    /// Near side: always explored
    Near(usize),
    /// Far side: explored only if the splitting plane is closer than the
    /// current farthest retained neighbor once the near side is done
    Far(usize, f64),
}

impl<P: Point> KdTree<P> {
    /// Create an empty tree for points of the given dimension.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::invalid("dimension", dimension, "must be at least 1"));
        }
        Ok(Self {
            dimension,
            nodes: Vec::new(),
        })
    }

    /// Create a tree and build it from `points`.
    pub fn from_points(dimension: usize, points: Vec<P>) -> Result<Self> {
        let mut tree = Self::new(dimension)?;
        tree.build(points)?;
        Ok(tree)
    }

    /// Replace the tree contents with `points` using median splitting.
    ///
    /// Sublists of more than two points are sorted on the current axis and
    /// their element at index `n / 2` is inserted before both halves are
    /// processed on the next axis. Sublists of at most two points are
    /// inserted as they are. On a dimension mismatch the tree is left empty.
    pub fn build(&mut self, points: Vec<P>) -> Result<()> {
        self.nodes.clear();
        if let Some(p) = points.iter().find(|p| p.dimension() != self.dimension) {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: p.dimension(),
            });
        }
        if points.is_empty() {
            return Ok(());
        }

        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut order = Vec::with_capacity(points.len());
        median_order(&points, &mut indices, 0, self.dimension, &mut order);

        self.nodes.reserve(points.len());
        let mut slots: Vec<Option<P>> = points.into_iter().map(Some).collect();
        for idx in order {
            if let Some(p) = slots[idx].take() {
                self.insert_unchecked(p);
            }
        }

        debug!(size = self.nodes.len(), dimension = self.dimension, "built k-d tree");
        Ok(())
    }

    /// Insert one point below the existing nodes.
    pub fn insert(&mut self, point: P) -> Result<()> {
        if point.dimension() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: point.dimension(),
            });
        }
        self.insert_unchecked(point);
        Ok(())
    }

    fn insert_unchecked(&mut self, point: P) {
        let new_idx = self.nodes.len();
        if new_idx == 0 {
            self.nodes.push(KdNode {
                element: point,
                depth: 0,
                parent: None,
                left: None,
                right: None,
            });
            return;
        }

        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            let axis = node.depth % self.dimension;
            let go_left = point.coord(axis) <= node.element.coord(axis);
            let child = if go_left { node.left } else { node.right };

            match child {
                Some(c) => idx = c,
                None => {
                    let depth = node.depth + 1;
                    if go_left {
                        self.nodes[idx].left = Some(new_idx);
                    } else {
                        self.nodes[idx].right = Some(new_idx);
                    }
                    self.nodes.push(KdNode {
                        element: point,
                        depth,
                        parent: Some(idx),
                        left: None,
                        right: None,
                    });
                    return;
                }
            }
        }
    }

    /// The `k` nearest elements to `query`, ascending by distance.
    ///
    /// Returns `min(k, len())` neighbors. Ties at the boundary are resolved
    /// by [`TiePolicy::Trim`].
    pub fn nearest_neighbors<'a>(&'a self, k: usize, query: &'a P) -> Result<NeighborList<'a, P>> {
        self.nearest_neighbors_with(k, query, TiePolicy::Trim)
    }

    /// [`KdTree::nearest_neighbors`] with an explicit tie policy.
    pub fn nearest_neighbors_with<'a>(
        &'a self,
        k: usize,
        query: &'a P,
        policy: TiePolicy,
    ) -> Result<NeighborList<'a, P>> {
        if query.dimension() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.dimension(),
            });
        }

        let mut list = NeighborList::with_policy(k, query, policy)?;
        if self.nodes.is_empty() {
            return Ok(list);
        }

        let mut stack = vec![Visit::Near(0)];
        while let Some(visit) = stack.pop() {
            let idx = match visit {
                Visit::Near(idx) => idx,
                Visit::Far(idx, plane) => {
                    // Boundary ties on the far side only matter when retained
                    let reachable = match policy {
                        TiePolicy::Trim => plane < list.threshold(),
                        TiePolicy::RetainBoundaryTies => plane <= list.threshold(),
                    };
                    if reachable {
                        idx
                    } else {
                        continue;
                    }
                }
            };

            let node = &self.nodes[idx];
            list.add(&node.element);

            let axis = node.depth % self.dimension;
            let diff = query.coord(axis) - node.element.coord(axis);
            let (near, far) = if diff <= 0.0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };

            // Far is pushed first so it is examined after the near subtree
            if let Some(child) = far {
                stack.push(Visit::Far(child, diff.abs()));
            }
            if let Some(child) = near {
                stack.push(Visit::Near(child));
            }
        }

        Ok(list)
    }

    /// Check the split invariant of every node against all of its ancestors,
    /// plus parent/depth bookkeeping.
    pub fn validate(&self) -> bool {
        for (idx, node) in self.nodes.iter().enumerate() {
            let mut child = idx;
            let mut parent = node.parent;
            while let Some(a) = parent {
                let ancestor = &self.nodes[a];
                if self.nodes[child].depth != ancestor.depth + 1 {
                    return false;
                }
                let axis = ancestor.depth % self.dimension;
                let value = node.element.coord(axis);
                let split = ancestor.element.coord(axis);
                let ok = if ancestor.left == Some(child) {
                    value <= split
                } else if ancestor.right == Some(child) {
                    value > split
                } else {
                    false
                };
                if !ok {
                    return false;
                }
                child = a;
                parent = ancestor.parent;
            }
            if child != 0 {
                return false;
            }
        }
        true
    }
}

impl<P> KdTree<P> {
    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Element stored at the root, if any.
    pub fn root(&self) -> Option<&P> {
        self.nodes.first().map(|n| &n.element)
    }

    /// Node by arena index.
    pub fn node(&self, idx: usize) -> Option<&KdNode<P>> {
        self.nodes.get(idx)
    }

    /// Number of levels (0 for an empty tree).
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|n| n.depth + 1).max().unwrap_or(0)
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &P> + '_ {
        self.nodes.iter().map(|n| &n.element)
    }

    /// Remove every element, keeping the dimension.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// Compute the insertion order produced by recursive median splitting.
fn median_order<P: Point>(
    points: &[P],
    indices: &mut [usize],
    axis: usize,
    dimension: usize,
    order: &mut Vec<usize>,
) {
    if indices.len() <= 2 {
        order.extend_from_slice(indices);
        return;
    }

    indices.sort_by(|&a, &b| points[a].coord(axis).total_cmp(&points[b].coord(axis)));

    let mid = indices.len() / 2;
    order.push(indices[mid]);

    let next = (axis + 1) % dimension;
    let (left, rest) = indices.split_at_mut(mid);
    median_order(points, left, next, dimension, order);
    median_order(points, &mut rest[1..], next, dimension, order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeolus_core::MeasurementPoint;

    #[derive(Debug, Clone, PartialEq)]
    struct V(Vec<f64>);

    impl Point for V {
        fn dimension(&self) -> usize {
            self.0.len()
        }

        fn coord(&self, axis: usize) -> f64 {
            self.0[axis]
        }
    }

    fn v2(x: f64, y: f64) -> V {
        V(vec![x, y])
    }

    fn sample_points() -> Vec<V> {
        vec![
            v2(2.0, 3.0),
            v2(5.0, 4.0),
            v2(9.0, 6.0),
            v2(4.0, 7.0),
            v2(8.0, 1.0),
            v2(7.0, 2.0),
            v2(1.0, 8.0),
            v2(6.0, 5.0),
        ]
    }

    #[test]
    fn test_build_and_size() {
        let tree = KdTree::from_points(2, sample_points()).unwrap();
        assert_eq!(tree.len(), 8);
        assert!(!tree.is_empty());
        assert!(tree.validate());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(KdTree::<V>::new(0).is_err());
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree::from_points(2, Vec::<V>::new()).unwrap();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.height(), 0);

        let q = v2(0.0, 0.0);
        let nn = tree.nearest_neighbors(3, &q).unwrap();
        assert!(nn.is_empty());
    }

    #[test]
    fn test_build_discards_previous_contents() {
        let mut tree = KdTree::from_points(2, sample_points()).unwrap();
        tree.build(vec![v2(0.0, 0.0), v2(1.0, 1.0)]).unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut tree = KdTree::from_points(2, sample_points()).unwrap();
        let err = tree.insert(V(vec![1.0, 2.0, 3.0])).unwrap_err();
        assert_eq!(err, Error::DimensionMismatch { expected: 2, actual: 3 });
        assert_eq!(tree.len(), 8);

        let mut pts = sample_points();
        pts.push(V(vec![1.0]));
        assert!(tree.build(pts).is_err());
        assert!(tree.is_empty());

        let q = V(vec![0.0]);
        let tree = KdTree::from_points(2, sample_points()).unwrap();
        assert!(tree.nearest_neighbors(1, &q).is_err());
    }

    #[test]
    fn test_root_is_axis0_median() {
        let mut pts: Vec<V> = (0..11).map(|i| v2(i as f64, ((i * 7) % 5) as f64)).collect();
        pts.sort_by(|a, b| a.0[0].total_cmp(&b.0[0]));
        let expected = pts[pts.len() / 2].clone();
        let tree = KdTree::from_points(2, pts).unwrap();
        assert_eq!(tree.root(), Some(&expected));
    }

    #[test]
    fn test_small_input_inserted_in_order() {
        let tree = KdTree::from_points(2, vec![v2(5.0, 5.0), v2(1.0, 1.0)]).unwrap();
        assert_eq!(tree.root(), Some(&v2(5.0, 5.0)));
        let root = tree.node(0).unwrap();
        assert_eq!(root.left(), Some(1));
        assert_eq!(tree.node(1).unwrap().depth(), 1);
        assert_eq!(tree.node(1).unwrap().parent(), Some(0));
    }

    #[test]
    fn test_insert_ties_go_left() {
        let mut tree = KdTree::new(2).unwrap();
        tree.insert(v2(3.0, 3.0)).unwrap();
        tree.insert(v2(3.0, 9.0)).unwrap();
        tree.insert(v2(4.0, 0.0)).unwrap();
        let root = tree.node(0).unwrap();
        assert_eq!(root.left(), Some(1));
        assert_eq!(root.right(), Some(2));
        assert!(tree.validate());
    }

    #[test]
    fn test_incremental_inserts_keep_invariant() {
        let mut tree = KdTree::new(3).unwrap();
        for i in 0..200 {
            let p = V(vec![
                ((i * 37) % 101) as f64,
                ((i * 11) % 13) as f64,
                ((i * 5) % 7) as f64,
            ]);
            tree.insert(p).unwrap();
        }
        assert_eq!(tree.len(), 200);
        assert!(tree.validate());
    }

    #[test]
    fn test_k_nearest_matches_brute_force() {
        let pts = sample_points();
        let tree = KdTree::from_points(2, pts.clone()).unwrap();

        for qx in 0..10 {
            for qy in 0..10 {
                let q = v2(qx as f64 + 0.5, qy as f64 + 0.5);
                let nn = tree.nearest_neighbors(3, &q).unwrap();
                assert_eq!(nn.len(), 3);

                let mut bf: Vec<f64> = pts.iter().map(|p| p.distance(&q)).collect();
                bf.sort_by(f64::total_cmp);
                for (i, n) in nn.iter().enumerate() {
                    assert!(
                        (n.distance - bf[i]).abs() < 1e-10,
                        "query ({}, {}) rank {}: tree={:.4}, bf={:.4}",
                        qx, qy, i, n.distance, bf[i]
                    );
                }
            }
        }
    }

    #[test]
    fn test_k_larger_than_tree() {
        let tree = KdTree::from_points(2, sample_points()).unwrap();
        let q = v2(5.0, 5.0);
        let nn = tree.nearest_neighbors(100, &q).unwrap();
        assert_eq!(nn.len(), 8);
    }

    #[test]
    fn test_exact_match_first() {
        let tree = KdTree::from_points(2, sample_points()).unwrap();
        let q = v2(5.0, 4.0);
        let nn = tree.nearest_neighbors(1, &q).unwrap();
        assert_eq!(nn.nearest().unwrap().point, &v2(5.0, 4.0));
        assert_eq!(nn.nearest().unwrap().distance, 0.0);
    }

    #[test]
    fn test_collinear_points() {
        let pts: Vec<V> = (0..10).map(|i| v2(i as f64, 0.0)).collect();
        let tree = KdTree::from_points(2, pts).unwrap();
        assert!(tree.validate());

        let q = v2(4.6, 0.0);
        let nn = tree.nearest_neighbors(3, &q).unwrap();
        let xs: Vec<f64> = nn.points().map(|p| p.0[0]).collect();
        assert_eq!(xs, vec![5.0, 4.0, 6.0]);
    }

    #[test]
    fn test_duplicate_points() {
        let pts = vec![v2(1.0, 1.0); 6];
        let tree = KdTree::from_points(2, pts).unwrap();
        assert!(tree.validate());
        let q = v2(1.0, 1.0);
        assert_eq!(tree.nearest_neighbors(4, &q).unwrap().len(), 4);
        let all = tree
            .nearest_neighbors_with(4, &q, TiePolicy::RetainBoundaryTies)
            .unwrap();
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn test_borrowed_measurement_points() {
        let data: Vec<MeasurementPoint> = (0..20)
            .map(|i| MeasurementPoint::new(i as f64, (i % 4) as f64, 0.0, Some(i as f64)))
            .collect();
        let tree = KdTree::from_points(3, data.iter().collect()).unwrap();
        assert_eq!(tree.len(), 20);

        let q = &data[7];
        let nn = tree.nearest_neighbors(1, &q).unwrap();
        assert_eq!(*nn.nearest().unwrap().point, q);
    }
}
