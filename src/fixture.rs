//! JSON page fixtures.
//!
//! A fixture describes one segmented page and, optionally, its reference
//! reading order:
//!
//! ```json
//! {
//!   "width": 1000, "height": 800,
//!   "regions": [
//!     { "id": "r1", "kind": "text", "points": [[10, 10], [200, 10], [200, 60], [10, 60]], "text": "Title" },
//!     { "id": "i1", "kind": "image", "points": [[10, 100], [200, 100], [200, 300], [10, 300]] }
//!   ],
//!   "reading_order": { "unordered": [ { "ordered": ["r1", "r2"] } ] }
//! }
//! ```
//!
//! Groups are objects with an `ordered` or `unordered` child list and an
//! optional `id`; region references are plain strings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::{Document, Region, RegionKind};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::reading_order::{GroupKind, IdAllocator, NodeId, ReadingOrder};

/// Region kind as written in a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    /// Text region
    #[default]
    Text,
    /// Image region
    Image,
    /// Separator line
    Separator,
    /// Any other region
    Plain,
}

/// One region of a fixture page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureRegion {
    /// Region id
    pub id: String,
    /// Region kind
    #[serde(default)]
    pub kind: FixtureKind,
    /// Outline as `[x, y]` pairs
    pub points: Vec<[f64; 2]>,
    /// Raw transcription of a text region
    #[serde(default)]
    pub text: Option<String>,
}

/// Node of a nested reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureOrder {
    /// Reference to a region
    Region(String),
    /// Group whose children are read in the listed order
    Ordered {
        /// Group id, generated when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Children in reading order
        ordered: Vec<FixtureOrder>,
    },
    /// Group whose children have no order among them
    Unordered {
        /// Group id, generated when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Children
        unordered: Vec<FixtureOrder>,
    },
}

/// A page fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFixture {
    /// Page width
    pub width: f64,
    /// Page height
    pub height: f64,
    /// Regions in load order
    pub regions: Vec<FixtureRegion>,
    /// Reference reading order
    #[serde(default)]
    pub reading_order: Option<FixtureOrder>,
}

impl PageFixture {
    /// Parse a fixture from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a fixture file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Build the document, attaching the reference order when present.
    pub fn to_document(&self) -> Result<Document> {
        let mut doc = Document::new(self.width, self.height);
        for region in &self.regions {
            let points = region
                .points
                .iter()
                .map(|[x, y]| Point::new(*x, *y))
                .collect();
            let region = match region.kind {
                FixtureKind::Text => {
                    Region::text_region(&region.id, points, region.text.as_deref().unwrap_or(""))?
                },
                FixtureKind::Image => Region::new(&region.id, RegionKind::Image, points)?,
                FixtureKind::Separator => Region::new(&region.id, RegionKind::Separator, points)?,
                FixtureKind::Plain => Region::new(&region.id, RegionKind::Plain, points)?,
            };
            doc.add_region(region)?;
        }

        if let Some(order) = &self.reading_order {
            let mut ids = IdAllocator::new();
            let reference = build_order(order, &doc, &mut ids)?;
            doc = doc.with_reference(reference);
        }
        Ok(doc)
    }
}

/// Convert a nested fixture order into a tree.
///
/// A bare region reference at the top is wrapped in an unordered root.
pub fn build_order(
    order: &FixtureOrder,
    doc: &Document,
    ids: &mut IdAllocator,
) -> Result<ReadingOrder> {
    let fresh = |ids: &mut IdAllocator| ids.next_free("g", |id| doc.region(id).is_some());

    let mut tree = match order {
        FixtureOrder::Region(_) => ReadingOrder::new(fresh(ids), GroupKind::Unordered),
        FixtureOrder::Ordered { id, .. } => {
            ReadingOrder::new(id.clone().unwrap_or_else(|| fresh(ids)), GroupKind::Ordered)
        },
        FixtureOrder::Unordered { id, .. } => {
            ReadingOrder::new(id.clone().unwrap_or_else(|| fresh(ids)), GroupKind::Unordered)
        },
    };

    let root = tree.root();
    match order {
        FixtureOrder::Region(_) => push_node(&mut tree, root, order, doc, ids)?,
        FixtureOrder::Ordered { ordered: children, .. }
        | FixtureOrder::Unordered {
            unordered: children,
            ..
        } => {
            for child in children {
                push_node(&mut tree, root, child, doc, ids)?;
            }
        },
    }
    Ok(tree)
}

fn push_node(
    tree: &mut ReadingOrder,
    parent: NodeId,
    node: &FixtureOrder,
    doc: &Document,
    ids: &mut IdAllocator,
) -> Result<()> {
    let (id, kind, children) = match node {
        FixtureOrder::Region(id) => {
            if doc.region(id).is_none() {
                return Err(Error::UnknownRegion(id.clone()));
            }
            tree.push_item(parent, id.as_str())?;
            return Ok(());
        },
        FixtureOrder::Ordered { id, ordered } => (id, GroupKind::Ordered, ordered),
        FixtureOrder::Unordered { id, unordered } => (id, GroupKind::Unordered, unordered),
    };

    let id = match id {
        Some(id) => id.clone(),
        None => ids.next_free("g", |id| doc.region(id).is_some() || tree.find(id).is_some()),
    };
    let group = tree.push_group(parent, kind, id)?;
    for child in children {
        push_node(tree, group, child, doc, ids)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading_order::NodeKind;

    const PAGE: &str = r#"{
        "width": 100, "height": 100,
        "regions": [
            { "id": "a", "points": [[0, 0], [50, 0], [50, 10], [0, 10]], "text": "first" },
            { "id": "b", "points": [[0, 20], [50, 20], [50, 30], [0, 30]], "text": "sec-\nond" },
            { "id": "pic", "kind": "image", "points": [[60, 0], [90, 0], [90, 30], [60, 30]] }
        ],
        "reading_order": { "unordered": [ { "id": "body", "ordered": ["a", "b"] }, "pic" ] }
    }"#;

    #[test]
    fn test_load_page() {
        let doc = PageFixture::from_json_str(PAGE).unwrap().to_document().unwrap();
        assert_eq!(doc.regions().count(), 3);
        assert_eq!(doc.text_region_count(), 2);
        assert_eq!(doc.text("b"), Some("second"));

        let order = doc.reference_reading_order().unwrap();
        assert!(order.is_unordered(order.root()));
        let body = order.find("body").unwrap();
        assert_eq!(order.kind(body), NodeKind::Group(GroupKind::Ordered));
        let a = order.item("a").unwrap();
        assert_eq!(order.chain_from(a), vec!["a", "b"]);
        assert!(order.item("pic").is_some());
    }

    #[test]
    fn test_generated_group_ids_avoid_regions() {
        let json = r#"{
            "width": 10, "height": 10,
            "regions": [ { "id": "g0", "points": [[0, 0], [5, 0], [5, 5], [0, 5]], "text": "x" } ],
            "reading_order": { "ordered": ["g0"] }
        }"#;
        let doc = PageFixture::from_json_str(json).unwrap().to_document().unwrap();
        let order = doc.reference_reading_order().unwrap();
        assert_eq!(order.id(order.root()), "g1");
        assert!(order.item("g0").is_some());
    }

    #[test]
    fn test_unknown_reference_region() {
        let json = r#"{
            "width": 10, "height": 10,
            "regions": [],
            "reading_order": { "ordered": ["ghost"] }
        }"#;
        let err = PageFixture::from_json_str(json).unwrap().to_document().unwrap_err();
        assert!(matches!(err, Error::UnknownRegion(id) if id == "ghost"));
    }

    #[test]
    fn test_page_without_reference() {
        let json = r#"{ "width": 10, "height": 10, "regions": [] }"#;
        let doc = PageFixture::from_json_str(json).unwrap().to_document().unwrap();
        assert!(doc.reference_reading_order().is_none());
    }

    #[test]
    fn test_fixture_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        std::fs::write(&path, PAGE).unwrap();
        let fixture = PageFixture::from_path(&path).unwrap();
        assert_eq!(fixture.regions.len(), 3);
        assert!(PageFixture::from_path(dir.path().join("missing.json")).is_err());
    }
}
