//! Neighbor graph from a Voronoi partition of the page.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::geometry::{voronoi, Point, Rect};

/// Which point of a region box seeds its Voronoi cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CentroidRule {
    /// Center of the bounding box
    Geometric,
    /// Midpoint of the left edge, which separates columns better
    #[default]
    LeftEdge,
}

impl CentroidRule {
    /// Seed point of `rect` under this rule.
    pub fn seed(self, rect: &Rect) -> Point {
        match self {
            CentroidRule::Geometric => rect.center(),
            CentroidRule::LeftEdge => rect.left_center(),
        }
    }
}

/// Symmetric adjacency between regions whose Voronoi cells touch.
#[derive(Debug, Clone, Default)]
pub struct NeighborGraph {
    neighbors: IndexMap<String, IndexSet<String>>,
}

impl NeighborGraph {
    /// Build the graph for `regions` with cells clipped to `page`.
    pub fn build<'a, I>(regions: I, page: Rect, rule: CentroidRule) -> Self
    where
        I: IntoIterator<Item = (&'a str, Rect)>,
    {
        let mut neighbors: IndexMap<String, IndexSet<String>> = IndexMap::new();
        let mut sites = Vec::new();
        for (id, rect) in regions {
            if neighbors.contains_key(id) {
                continue;
            }
            neighbors.insert(id.to_string(), IndexSet::new());
            sites.push(rule.seed(&rect));
        }

        let pairs = voronoi::touching_pairs(&sites, page);
        for &(i, j) in &pairs {
            let (a, b) = match (neighbors.get_index(i), neighbors.get_index(j)) {
                (Some((a, _)), Some((b, _))) => (a.clone(), b.clone()),
                _ => continue,
            };
            if let Some(set) = neighbors.get_mut(&a) {
                set.insert(b.clone());
            }
            if let Some(set) = neighbors.get_mut(&b) {
                set.insert(a);
            }
        }

        log::debug!(
            "neighbor graph: {} regions, {} adjacencies",
            neighbors.len(),
            pairs.len()
        );

        Self { neighbors }
    }

    /// Neighbors of `id` in region order; empty for unknown ids.
    pub fn neighbors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.neighbors
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Whether `a` and `b` are neighbors.
    pub fn are_neighbors(&self, a: &str, b: &str) -> bool {
        self.neighbors.get(a).is_some_and(|set| set.contains(b))
    }

    /// Number of regions in the graph.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether the graph has no regions.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_points() {
        let rect = Rect::new(10.0, 20.0, 40.0, 10.0);
        assert_eq!(CentroidRule::Geometric.seed(&rect), Point::new(30.0, 25.0));
        assert_eq!(CentroidRule::LeftEdge.seed(&rect), Point::new(10.0, 25.0));
    }

    #[test]
    fn test_stacked_regions_only_touch_adjacent() {
        let page = Rect::new(0.0, 0.0, 100.0, 300.0);
        let regions = vec![
            ("a", Rect::new(10.0, 10.0, 80.0, 50.0)),
            ("b", Rect::new(10.0, 110.0, 80.0, 50.0)),
            ("c", Rect::new(10.0, 210.0, 80.0, 50.0)),
        ];
        let graph = NeighborGraph::build(regions, page, CentroidRule::LeftEdge);

        assert!(graph.are_neighbors("a", "b"));
        assert!(graph.are_neighbors("b", "c"));
        assert!(!graph.are_neighbors("a", "c"));
        assert_eq!(graph.neighbors("b").collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(graph.neighbors("zzz").count(), 0);
    }

    #[test]
    fn test_two_by_two_grid() {
        let page = Rect::new(0.0, 0.0, 200.0, 200.0);
        let regions = vec![
            ("tl", Rect::new(0.0, 0.0, 90.0, 90.0)),
            ("tr", Rect::new(110.0, 0.0, 90.0, 90.0)),
            ("bl", Rect::new(0.0, 110.0, 90.0, 90.0)),
            ("br", Rect::new(110.0, 110.0, 90.0, 90.0)),
        ];
        let graph = NeighborGraph::build(regions, page, CentroidRule::Geometric);
        assert_eq!(graph.len(), 4);
        assert!(graph.are_neighbors("tl", "tr"));
        assert!(graph.are_neighbors("tl", "bl"));
        // diagonal cells meet in the page center
        assert!(graph.are_neighbors("tl", "br"));
    }
}
