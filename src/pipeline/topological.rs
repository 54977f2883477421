//! Precedence graphs and their topological order.

use indexmap::{IndexMap, IndexSet};

use crate::error::{Error, Result};
use crate::spatial::SpatialAnalysis;

use super::OrderingContext;

/// Result of a depth-first topological sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologicalOrder {
    /// Vertices that take part in an edge, in reading order
    pub order: Vec<String>,
    /// Back edges met during the traversal, each as the cycle it closes
    pub cycles: Vec<Vec<String>>,
}

/// Order the vertices of `edges`, where `(a, b)` means `a` comes before `b`.
///
/// Every edge is stored reversed (`b` lists `a`), the reversed graph is
/// traversed depth-first from each source in first-appearance order, and the
/// post-order is the result. Back edges are skipped, which breaks cycles in
/// favor of the first visited vertex; each one is reported in `cycles`.
///
/// # Examples
///
/// ```
/// use page_order::pipeline::topological_sort;
///
/// let edges = vec![
///     ("a".to_string(), "b".to_string()),
///     ("b".to_string(), "c".to_string()),
///     ("a".to_string(), "c".to_string()),
/// ];
/// let sorted = topological_sort(&edges);
/// assert_eq!(sorted.order, vec!["a", "b", "c"]);
/// assert!(sorted.cycles.is_empty());
/// ```
pub fn topological_sort(edges: &[(String, String)]) -> TopologicalOrder {
    let mut graph: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (a, b) in edges {
        graph.entry(b.as_str()).or_default().push(a.as_str());
    }
    let roots: Vec<&str> = graph.keys().copied().collect();

    let mut visited: IndexSet<&str> = IndexSet::new();
    let mut on_path: IndexSet<&str> = IndexSet::new();
    let mut result = TopologicalOrder::default();

    for root in roots {
        if visited.contains(root) {
            continue;
        }
        visited.insert(root);
        on_path.insert(root);
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];

        while let Some((vertex, next)) = stack.last_mut() {
            let vertex = *vertex;
            let neighbors = graph.get(vertex).map(Vec::as_slice).unwrap_or(&[]);
            if let Some(&neighbor) = neighbors.get(*next) {
                *next += 1;
                if !visited.contains(neighbor) {
                    visited.insert(neighbor);
                    on_path.insert(neighbor);
                    stack.push((neighbor, 0));
                } else if on_path.contains(neighbor) {
                    let start = on_path.get_index_of(neighbor).unwrap_or(0);
                    let mut cycle: Vec<String> = on_path
                        .iter()
                        .skip(start)
                        .map(|v| v.to_string())
                        .collect();
                    cycle.push(neighbor.to_string());
                    result.cycles.push(cycle);
                }
            } else {
                stack.pop();
                on_path.shift_remove(vertex);
                result.order.push(vertex.to_string());
            }
        }
    }

    result
}

/// Sort `edges` and complete the result with the vertices of `elements` that
/// take part in no edge, in their given order.
///
/// Cycles are logged and counted; with `strict` the first one is returned as
/// [`Error::UnclassifiableTopology`].
pub fn sort_elements(
    edges: &[(String, String)],
    elements: &[&str],
    strict: bool,
    context: &mut OrderingContext,
) -> Result<Vec<String>> {
    let sorted = topological_sort(edges);

    if !sorted.cycles.is_empty() {
        context.stats.cycles += sorted.cycles.len();
        for cycle in &sorted.cycles {
            log::warn!("precedence cycle broken by visit order: {}", cycle.join(" -> "));
        }
        if strict {
            return Err(Error::UnclassifiableTopology {
                cycle: sorted.cycles[0].clone(),
            });
        }
    }

    let mut order = sorted.order;
    let placed: IndexSet<String> = order.iter().cloned().collect();
    let isolated: Vec<String> = elements
        .iter()
        .filter(|e| !placed.contains(**e))
        .map(|e| e.to_string())
        .collect();
    if !isolated.is_empty() {
        log::debug!("appending {} region(s) without precedence edges", isolated.len());
        order.extend(isolated);
    }
    Ok(order)
}

/// Pairs `(a, b)` of distinct elements where `a` is read before `b` both
/// vertically and horizontally.
pub fn precedence_edges(analysis: &SpatialAnalysis, elements: &[&str]) -> Vec<(String, String)> {
    let relations = analysis.relations();
    let mut edges = Vec::new();
    for a in elements {
        for b in elements {
            if a != b
                && relations.is_vertical_before_in_reading(a, b)
                && relations.is_horizontal_before_in_reading(a, b)
            {
                edges.push((a.to_string(), b.to_string()));
            }
        }
    }
    log::debug!("precedence graph: {} elements, {} edges", elements.len(), edges.len());
    edges
}

/// Adjacent pairs of a chain.
pub fn chain_pairs(chain: &[String]) -> Vec<(String, String)> {
    chain
        .windows(2)
        .map(|w| (w[0].clone(), w[1].clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_sort_respects_edges() {
        let e = edges(&[("c", "d"), ("a", "c"), ("b", "c"), ("a", "b")]);
        let sorted = topological_sort(&e);
        let pos = |id: &str| sorted.order.iter().position(|x| x == id).unwrap();
        for (a, b) in &e {
            assert!(pos(a) < pos(b), "{} should precede {}", a, b);
        }
        assert_eq!(sorted.order.len(), 4);
    }

    #[test]
    fn test_sort_order_follows_first_appearance() {
        // "x" and "a" are unrelated; the source listed first is visited first
        let sorted = topological_sort(&edges(&[("x", "y"), ("a", "b")]));
        assert_eq!(sorted.order, vec!["x", "y", "a", "b"]);
    }

    #[test]
    fn test_cycle_reported() {
        let sorted = topological_sort(&edges(&[("a", "b"), ("b", "c"), ("c", "a")]));
        assert_eq!(sorted.order.len(), 3);
        assert_eq!(sorted.cycles.len(), 1);
        let cycle = &sorted.cycles[0];
        assert_eq!(cycle.first(), cycle.last());
    }

    #[test]
    fn test_sort_elements_appends_isolated() {
        let mut context = OrderingContext::new();
        let order = sort_elements(&edges(&[("a", "b")]), &["z", "a", "b", "y"], false, &mut context)
            .unwrap();
        assert_eq!(order, vec!["a", "b", "z", "y"]);
        assert_eq!(context.stats.cycles, 0);
    }

    #[test]
    fn test_sort_elements_strict_cycle() {
        let mut context = OrderingContext::new();
        let cyclic = edges(&[("a", "b"), ("b", "a")]);

        let order = sort_elements(&cyclic, &["a", "b"], false, &mut context).unwrap();
        assert_eq!(order.len(), 2);
        assert_eq!(context.stats.cycles, 1);

        let err = sort_elements(&cyclic, &["a", "b"], true, &mut context).unwrap_err();
        assert!(matches!(err, Error::UnclassifiableTopology { .. }));
    }

    #[test]
    fn test_chain_pairs() {
        let chain: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(chain_pairs(&chain), edges(&[("a", "b"), ("b", "c")]));
        assert!(chain_pairs(&chain[..1]).is_empty());
    }
}
