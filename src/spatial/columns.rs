//! Column detection.
//!
//! Columns are chains of text regions that share their horizontal extent and
//! follow each other vertically. Candidate links between neighboring regions
//! are filtered by length and occlusion, then chained transitively.

use serde::{Deserialize, Serialize};

use super::connector::{connector, crosses_another, Direction};
use super::headers::mean_std;
use super::matrix::RelationMatrix;
use super::neighborhood::NeighborGraph;
use super::relation::Relation;
use crate::document::Document;
use crate::geometry::{Axis, Rect};
use crate::reading_order::IdAllocator;

/// Upper bound on candidate link length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierCutoff {
    /// mean + one standard deviation
    #[default]
    MeanPlusStd,
    /// mean + two standard deviations
    MeanPlusTwoStd,
}

impl OutlierCutoff {
    /// Length limit for the given link lengths.
    pub fn limit(self, distances: &[f64]) -> f64 {
        let (mean, std) = mean_std(distances);
        match self {
            OutlierCutoff::MeanPlusStd => mean + std,
            OutlierCutoff::MeanPlusTwoStd => mean + 2.0 * std,
        }
    }
}

/// A detected column: a composite text region.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    id: String,
    members: Vec<String>,
    bbox: Rect,
    text: String,
}

impl Column {
    /// Column id, unique within one analysis run.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Member region ids, top to bottom.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }

    /// Top member.
    pub fn first(&self) -> &str {
        &self.members[0]
    }

    /// Bottom member.
    pub fn last(&self) -> &str {
        &self.members[self.members.len() - 1]
    }

    /// Union of the member boxes.
    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// Member transcriptions joined top to bottom.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Detect the columns of `doc`.
///
/// `t` is the vertical tolerance and `column_t` the horizontal one used for
/// the x relations between text regions.
pub fn detect_columns(
    doc: &Document,
    neighborhood: &NeighborGraph,
    t: f64,
    column_t: f64,
    cutoff: OutlierCutoff,
    ids: &mut IdAllocator,
) -> Vec<Column> {
    let text: Vec<(&str, Rect)> = doc.text_regions().map(|r| (r.id(), r.bbox())).collect();
    let relations = RelationMatrix::build(text.iter().copied(), column_t, t);

    let mut candidates = Vec::new();
    let mut distances = Vec::new();
    for (a, ra) in &text {
        for (b, rb) in &text {
            if a == b
                || relations.relation(Axis::X, a, b) != Relation::Equals
                || !neighborhood.are_neighbors(a, b)
                || !relations.is_vertical_before_in_reading(a, b)
                || !relations.is_horizontal_before_in_reading(a, b)
            {
                continue;
            }
            let dir = Direction::from_relations(
                relations.relation(Axis::X, a, b),
                relations.relation(Axis::Y, a, b),
            );
            candidates.push((*a, *b));
            distances.push(connector(ra, rb, dir).length());
        }
    }

    if candidates.is_empty() {
        log::debug!("no column candidates");
        return Vec::new();
    }

    let limit = cutoff.limit(&distances);
    let all: Vec<(&str, Rect)> = doc.regions().map(|r| (r.id(), r.bbox())).collect();
    let links: Vec<(&str, &str)> = candidates
        .iter()
        .zip(&distances)
        .filter(|((a, b), distance)| {
            let (Some(ra), Some(rb)) = (bbox_of(&text, a), bbox_of(&text, b)) else {
                return false;
            };
            **distance <= limit
                && !crosses_another((a, &ra), (b, &rb), all.iter().map(|(id, r)| (*id, r)))
        })
        .map(|(pair, _)| *pair)
        .collect();

    log::debug!(
        "column links: {} candidates, {} kept, limit {:.2}",
        candidates.len(),
        links.len(),
        limit
    );

    let centroid_y = |id: &str| bbox_of(&text, id).map(|r| r.center().y).unwrap_or(0.0);

    chain_links(&links)
        .into_iter()
        .map(|mut members| {
            members.sort_by(|a, b| crate::utils::safe_float_cmp(centroid_y(a), centroid_y(b)));
            let id = ids.next_free("c", |id| doc.region(id).is_some());
            let bbox = members
                .iter()
                .filter_map(|m| bbox_of(&text, m))
                .reduce(|acc, r| acc.union(&r))
                .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
            let text = members
                .iter()
                .filter_map(|m| doc.text(m))
                .collect::<Vec<_>>()
                .join(" ");
            Column {
                id,
                members,
                bbox,
                text,
            }
        })
        .collect()
}

fn bbox_of(boxes: &[(&str, Rect)], id: &str) -> Option<Rect> {
    boxes.iter().find(|(i, _)| *i == id).map(|(_, r)| *r)
}

/// Fuse links into disjoint member groups.
///
/// Two chains are joined when the end of one is the start of the other;
/// chains that still share members afterwards are merged as well.
fn chain_links(links: &[(&str, &str)]) -> Vec<Vec<String>> {
    let mut chains: Vec<Vec<String>> = links
        .iter()
        .map(|(a, b)| vec![a.to_string(), b.to_string()])
        .collect();

    while let Some((i, j)) = find_joinable(&chains) {
        let (first, second) = if i < j {
            let second = chains.remove(j);
            (chains.remove(i), second)
        } else {
            let first = chains.remove(i);
            (first, chains.remove(j))
        };
        let mut joined = first;
        joined.extend(second);
        chains.push(joined);
    }

    let mut groups: Vec<Vec<String>> = chains.into_iter().map(dedup).collect();

    // links forking from one region leave overlapping chains
    let mut merged = true;
    while merged {
        merged = false;
        'outer: for i in 0..groups.len() {
            for j in (i + 1)..groups.len() {
                if groups[i].iter().any(|m| groups[j].contains(m)) {
                    let other = groups.remove(j);
                    groups[i].extend(other);
                    groups[i] = dedup(std::mem::take(&mut groups[i]));
                    merged = true;
                    break 'outer;
                }
            }
        }
    }
    groups
}

fn find_joinable(chains: &[Vec<String>]) -> Option<(usize, usize)> {
    for (i, source) in chains.iter().enumerate() {
        for (j, target) in chains.iter().enumerate() {
            if i != j && source.last() == target.first() {
                return Some((i, j));
            }
        }
    }
    None
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
