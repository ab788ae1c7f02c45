//! Bounded nearest-neighbor list
//!
//! Holds up to `capacity` candidates ordered by ascending distance to a
//! fixed query point. The list borrows both the query and its candidates;
//! it never owns points.

use std::fmt;

use aeolus_core::{Error, Point, Result};

/// How candidates tied with the farthest retained distance are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiePolicy {
    /// Never keep more than `capacity` entries. Among candidates at the same
    /// distance the one offered first wins.
    #[default]
    Trim,
    /// Keep every candidate tied with the k-th distance, so the list may
    /// exceed `capacity` by the number of boundary ties.
    RetainBoundaryTies,
}

/// A candidate and its distance to the query.
#[derive(Debug)]
pub struct Neighbor<'a, P> {
    pub point: &'a P,
    pub distance: f64,
}

impl<P> Clone for Neighbor<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Neighbor<'_, P> {}

/// Up to `capacity` candidates sorted by distance to `query`.
#[derive(Debug, Clone)]
pub struct NeighborList<'a, P> {
    query: &'a P,
    capacity: usize,
    policy: TiePolicy,
    entries: Vec<Neighbor<'a, P>>,
}

impl<'a, P: Point> NeighborList<'a, P> {
    /// Create an empty list with the default [`TiePolicy::Trim`].
    pub fn new(capacity: usize, query: &'a P) -> Result<Self> {
        Self::with_policy(capacity, query, TiePolicy::Trim)
    }

    pub fn with_policy(capacity: usize, query: &'a P, policy: TiePolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid("k", capacity, "must be at least 1"));
        }
        Ok(Self {
            query,
            capacity,
            policy,
            entries: Vec::with_capacity(capacity + 1),
        })
    }

    /// Offer a candidate; the list decides whether it is retained.
    pub fn add(&mut self, candidate: &'a P) {
        let distance = candidate.distance(self.query);
        self.add_with_distance(candidate, distance);
    }

    /// Offer a candidate whose distance to the query is already known.
    pub fn add_with_distance(&mut self, candidate: &'a P, distance: f64) {
        if self.is_full() && distance > self.threshold() {
            return;
        }

        // Insert after any entries at the same distance
        let pos = self.entries.partition_point(|n| n.distance <= distance);
        self.entries.insert(
            pos,
            Neighbor {
                point: candidate,
                distance,
            },
        );

        if self.entries.len() > self.capacity {
            match self.policy {
                TiePolicy::Trim => self.entries.truncate(self.capacity),
                TiePolicy::RetainBoundaryTies => {
                    let kth = self.entries[self.capacity - 1].distance;
                    let keep = self.entries.partition_point(|n| n.distance <= kth);
                    self.entries.truncate(keep);
                }
            }
        }
    }

    /// Drop every neighbor farther than `limit`, always keeping the nearest.
    pub fn truncate_beyond(&mut self, limit: f64) {
        let keep = within_radius(&self.entries, limit).len();
        self.entries.truncate(keep);
    }
}

/// Leading run of `neighbors` (ascending by distance) within `limit`.
///
/// The nearest neighbor is always part of the result, however far it is.
pub fn within_radius<'n, 'a, P>(neighbors: &'n [Neighbor<'a, P>], limit: f64) -> &'n [Neighbor<'a, P>] {
    let keep = neighbors
        .partition_point(|n| n.distance <= limit)
        .max(1)
        .min(neighbors.len());
    &neighbors[..keep]
}

impl<'a, P> NeighborList<'a, P> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> TiePolicy {
        self.policy
    }

    /// Whether `capacity` candidates have been retained.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn query(&self) -> &'a P {
        self.query
    }

    pub fn nearest(&self) -> Option<&Neighbor<'a, P>> {
        self.entries.first()
    }

    pub fn farthest(&self) -> Option<&Neighbor<'a, P>> {
        self.entries.last()
    }

    /// Distance beyond which no candidate can enter the list.
    ///
    /// Infinite until the list is full.
    pub fn threshold(&self) -> f64 {
        if self.is_full() {
            self.entries.last().map_or(f64::INFINITY, |n| n.distance)
        } else {
            f64::INFINITY
        }
    }

    pub fn as_slice(&self) -> &[Neighbor<'a, P>] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Neighbor<'a, P>> {
        self.entries.iter()
    }

    /// Retained points in ascending distance order.
    pub fn points(&self) -> impl Iterator<Item = &'a P> + '_ {
        self.entries.iter().map(|n| n.point)
    }
}

impl<'l, 'a, P> IntoIterator for &'l NeighborList<'a, P> {
    type Item = &'l Neighbor<'a, P>;
    type IntoIter = std::slice::Iter<'l, Neighbor<'a, P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<P: fmt::Display> fmt::Display for NeighborList<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for n in &self.entries {
            writeln!(f, "\t{}\t{}", n.distance, n.point)?;
        }
        Ok(())
    }
}
