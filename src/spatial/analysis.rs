//! Per-document spatial analysis.

use indexmap::IndexMap;

use super::columns::{detect_columns, Column};
use super::headers::{detect_headers, detect_page_number};
use super::matrix::RelationMatrix;
use super::neighborhood::NeighborGraph;
use super::tolerance::{calculate_column_tolerance, calculate_tolerance};
use crate::config::ColumnConfig;
use crate::document::Document;
use crate::geometry::{Axis, Rect};
use crate::reading_order::IdAllocator;
use crate::spatial::Relation;

/// Everything the spatial ordering strategies need to know about a page.
///
/// Elements are the text regions followed by the detected columns. The
/// relation matrix covers all elements with tolerance `T` on both axes, the
/// neighbor graph covers text regions only.
#[derive(Debug, Clone)]
pub struct SpatialAnalysis {
    t: f64,
    column_t: f64,
    boxes: IndexMap<String, Rect>,
    columns: IndexMap<String, Column>,
    relations: RelationMatrix,
    neighborhood: NeighborGraph,
    headers: Vec<String>,
    page_number: Option<String>,
}

impl SpatialAnalysis {
    /// Analyze `doc`; generated column ids come from `ids`.
    pub fn new(doc: &Document, config: &ColumnConfig, ids: &mut IdAllocator) -> Self {
        let mut boxes: IndexMap<String, Rect> = doc
            .text_regions()
            .map(|r| (r.id().to_string(), r.bbox()))
            .collect();

        let t = calculate_tolerance(boxes.values());
        let column_t = calculate_column_tolerance(boxes.values(), t);

        let neighborhood = NeighborGraph::build(
            boxes.iter().map(|(id, r)| (id.as_str(), *r)),
            doc.page_box(),
            config.neighbor_centroid,
        );

        let columns: IndexMap<String, Column> =
            detect_columns(doc, &neighborhood, t, column_t, config.outlier_cutoff, ids)
                .into_iter()
                .map(|c| (c.id().to_string(), c))
                .collect();
        for column in columns.values() {
            boxes.insert(column.id().to_string(), column.bbox());
        }

        let relations = RelationMatrix::build(boxes.iter().map(|(id, r)| (id.as_str(), *r)), t, t);
        let headers = detect_headers(doc.text_regions());
        let page_number = detect_page_number(doc.text_regions(), &relations);

        log::info!(
            "spatial analysis: T={:.2}, column T={:.2}, {} columns, {} headers",
            t,
            column_t,
            columns.len(),
            headers.len()
        );

        Self {
            t,
            column_t,
            boxes,
            columns,
            relations,
            neighborhood,
            headers,
            page_number,
        }
    }

    /// Tolerance `T`.
    pub fn tolerance(&self) -> f64 {
        self.t
    }

    /// Horizontal tolerance used while detecting columns.
    pub fn column_tolerance(&self) -> f64 {
        self.column_t
    }

    /// Detected columns in detection order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Column by column id.
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.get(id)
    }

    /// Whether `id` names a column.
    pub fn is_column(&self, id: &str) -> bool {
        self.columns.contains_key(id)
    }

    /// The column `id` names, or the column containing region `id`.
    pub fn column_of(&self, id: &str) -> Option<&Column> {
        self.columns
            .get(id)
            .or_else(|| self.columns.values().find(|c| c.contains(id)))
    }

    /// Whether region `id` is a column member.
    pub fn is_in_column(&self, id: &str) -> bool {
        !self.is_column(id) && self.column_of(id).is_some()
    }

    /// Whether region `id` is the bottom member of its column.
    pub fn is_last_in_column(&self, id: &str) -> bool {
        self.is_in_column(id) && self.column_of(id).is_some_and(|c| c.last() == id)
    }

    /// Column id for a column member, the id itself otherwise.
    pub fn column_id<'a>(&'a self, id: &'a str) -> &'a str {
        match self.column_of(id) {
            Some(column) => column.id(),
            None => id,
        }
    }

    /// Text region ids in document order.
    pub fn text_region_ids(&self) -> impl Iterator<Item = &str> {
        self.boxes
            .keys()
            .map(String::as_str)
            .filter(move |id| !self.columns.contains_key(*id))
    }

    /// Text regions that belong to no column, in document order.
    pub fn independent_regions(&self) -> Vec<&str> {
        self.text_region_ids()
            .filter(|id| !self.is_in_column(id))
            .collect()
    }

    /// Bounding box of a text region or column.
    pub fn bbox(&self, id: &str) -> Option<Rect> {
        self.boxes.get(id).copied()
    }

    /// Transcription of a text region or column.
    pub fn text<'a>(&'a self, doc: &'a Document, id: &str) -> Option<&'a str> {
        match self.columns.get(id) {
            Some(column) => Some(column.text()),
            None => doc.text(id),
        }
    }

    /// Relation matrix over text regions and columns.
    pub fn relations(&self) -> &RelationMatrix {
        &self.relations
    }

    /// Relation of `a` to `b` on `axis`.
    pub fn relation(&self, axis: Axis, a: &str, b: &str) -> Relation {
        self.relations.relation(axis, a, b)
    }

    /// Neighbor graph over text regions.
    pub fn neighborhood(&self) -> &NeighborGraph {
        &self.neighborhood
    }

    /// Header region ids.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Whether `id` is a header.
    pub fn is_header(&self, id: &str) -> bool {
        self.headers.iter().any(|h| h == id)
    }

    /// Page number region, if one was found.
    pub fn page_number(&self) -> Option<&str> {
        self.page_number.as_deref()
    }
}
