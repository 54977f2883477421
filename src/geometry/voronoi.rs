//! Voronoi partition clipped to a bounding rectangle.
//!
//! Cells are computed by intersecting the bounding rectangle with the
//! perpendicular-bisector half-planes of every other site. This is quadratic
//! in the number of sites, which is fine for the few hundred regions a page
//! carries.

use super::{Point, Rect};

/// Voronoi cell for every site, clipped to `bounds`.
///
/// `bounds` is grown to cover every site so that no cell comes out empty.
/// Sites at identical positions share one cell.
pub fn clipped_cells(sites: &[Point], bounds: Rect) -> Vec<Vec<Point>> {
    let bounds = sites
        .iter()
        .fold(bounds, |acc, p| acc.union(&Rect::new(p.x, p.y, 0.0, 0.0)));

    sites
        .iter()
        .enumerate()
        .map(|(i, si)| {
            let mut cell = bounds.corners().to_vec();
            for (j, sj) in sites.iter().enumerate() {
                if i == j || si == sj {
                    continue;
                }
                // keep p where (p - mid) . (sj - si) <= 0
                let nx = sj.x - si.x;
                let ny = sj.y - si.y;
                let mid = Point::new((si.x + sj.x) / 2.0, (si.y + sj.y) / 2.0);
                let offset = nx * mid.x + ny * mid.y;
                cell = clip_half_plane(&cell, nx, ny, offset);
                if cell.is_empty() {
                    break;
                }
            }
            cell
        })
        .collect()
}

/// Index pairs `(i, j)` with `i < j` whose clipped cells share a boundary
/// point (an edge or a single corner).
pub fn touching_pairs(sites: &[Point], bounds: Rect) -> Vec<(usize, usize)> {
    let cells = clipped_cells(sites, bounds);
    let scale = bounds.diagonal().max(1.0);
    let eps = scale * 1e-9;

    let mut pairs = Vec::new();
    for i in 0..sites.len() {
        for j in (i + 1)..sites.len() {
            if sites[i] == sites[j] {
                pairs.push((i, j));
                continue;
            }
            // a vertex of cell i equidistant to both sites lies on the shared border
            let on_border = cells[i]
                .iter()
                .any(|v| (v.distance(&sites[i]) - v.distance(&sites[j])).abs() <= eps);
            if on_border {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Sutherland-Hodgman step: keep the part of `polygon` with `nx*x + ny*y <= offset`.
fn clip_half_plane(polygon: &[Point], nx: f64, ny: f64, offset: f64) -> Vec<Point> {
    let inside = |p: &Point| nx * p.x + ny * p.y <= offset;
    let intersect = |a: &Point, b: &Point| {
        let da = nx * a.x + ny * a.y - offset;
        let db = nx * b.x + ny * b.y - offset;
        let t = da / (da - db);
        Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    };

    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (k, current) in polygon.iter().enumerate() {
        let prev = &polygon[(k + polygon.len() - 1) % polygon.len()];
        match (inside(prev), inside(current)) {
            (true, true) => out.push(*current),
            (true, false) => out.push(intersect(prev, current)),
            (false, true) => {
                out.push(intersect(prev, current));
                out.push(*current);
            },
            (false, false) => {},
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn test_two_sites_split_page() {
        let sites = vec![Point::new(25.0, 50.0), Point::new(75.0, 50.0)];
        let cells = clipped_cells(&sites, page());
        assert_eq!(cells.len(), 2);
        for v in &cells[0] {
            assert!(v.x <= 50.0 + 1e-9);
        }
        for v in &cells[1] {
            assert!(v.x >= 50.0 - 1e-9);
        }
        assert_eq!(touching_pairs(&sites, page()), vec![(0, 1)]);
    }

    #[test]
    fn test_row_of_three_only_adjacent_touch() {
        let sites = vec![
            Point::new(10.0, 50.0),
            Point::new(50.0, 50.0),
            Point::new(90.0, 50.0),
        ];
        let pairs = touching_pairs(&sites, page());
        assert!(pairs.contains(&(0, 1)));
        assert!(pairs.contains(&(1, 2)));
        assert!(!pairs.contains(&(0, 2)));
    }

    #[test]
    fn test_grid_diagonal_corner_touch() {
        let sites = vec![
            Point::new(25.0, 25.0),
            Point::new(75.0, 25.0),
            Point::new(25.0, 75.0),
            Point::new(75.0, 75.0),
        ];
        let pairs = touching_pairs(&sites, page());
        // all four cells meet in the page center
        assert_eq!(pairs.len(), 6);
    }

    #[test]
    fn test_identical_sites_are_neighbors() {
        let sites = vec![Point::new(30.0, 30.0), Point::new(30.0, 30.0)];
        assert_eq!(touching_pairs(&sites, page()), vec![(0, 1)]);
    }

    #[test]
    fn test_site_outside_bounds_gets_cell() {
        let sites = vec![Point::new(50.0, 50.0), Point::new(150.0, 50.0)];
        let cells = clipped_cells(&sites, page());
        assert!(!cells[1].is_empty());
    }
}
