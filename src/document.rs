//! In-memory page model consumed by the ordering algorithms.
//!
//! A [`Document`] is a page box plus its segmented regions, kept in load
//! order, and optionally the reference reading order recorded with the page.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};
use crate::geometry::{Point, Polygon, Rect};
use crate::reading_order::ReadingOrder;

lazy_static! {
    static ref LINE_BREAK_HYPHEN: Regex = Regex::new(r"-\n").unwrap();
    static ref TRAILING_HYPHEN: Regex = Regex::new(r"-$").unwrap();
}

/// Kind of a segmented region.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionKind {
    /// Region with a transcription
    Text {
        /// Normalized transcription
        text: String,
    },
    /// Picture or figure
    Image,
    /// Separator line
    Separator,
    /// Any other region type
    Plain,
}

/// A segmented page region.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: String,
    kind: RegionKind,
    polygon: Polygon,
}

impl Region {
    /// Create a region from its outline.
    pub fn new(id: impl Into<String>, kind: RegionKind, points: Vec<Point>) -> Result<Self> {
        let id = id.into();
        let polygon = Polygon::new(&id, points)?;
        Ok(Self { id, kind, polygon })
    }

    /// Create a text region, normalizing the raw transcription.
    pub fn text_region(id: impl Into<String>, points: Vec<Point>, raw_text: &str) -> Result<Self> {
        Self::new(
            id,
            RegionKind::Text {
                text: normalize_text(raw_text),
            },
            points,
        )
    }

    /// Create a region covering an axis-aligned rectangle.
    pub fn from_rect(id: impl Into<String>, kind: RegionKind, rect: Rect) -> Result<Self> {
        Self::new(id, kind, rect.corners().to_vec())
    }

    /// Region id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Region kind.
    pub fn kind(&self) -> &RegionKind {
        &self.kind
    }

    /// Validated outline.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Bounding box.
    pub fn bbox(&self) -> Rect {
        self.polygon.bbox()
    }

    /// Center of the bounding box.
    pub fn centroid(&self) -> Point {
        self.bbox().center()
    }

    /// Transcription, `None` for non-text regions.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            RegionKind::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Whether this is a text region.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, RegionKind::Text { .. })
    }
}

/// Clean a region transcription.
///
/// Words hyphenated across a line break are joined, a trailing hyphen is
/// dropped and the remaining line breaks become spaces.
///
/// # Examples
///
/// ```
/// use page_order::document::normalize_text;
///
/// assert_eq!(normalize_text("read-\ning\norder-"), "reading order");
/// ```
pub fn normalize_text(raw: &str) -> String {
    let joined = LINE_BREAK_HYPHEN.replace_all(raw, "");
    let trimmed = TRAILING_HYPHEN.replace(&joined, "");
    trimmed.replace('\n', " ")
}

/// A segmented page.
#[derive(Debug, Clone)]
pub struct Document {
    page: Rect,
    regions: IndexMap<String, Region>,
    reference: Option<ReadingOrder>,
}

impl Document {
    /// Create an empty page of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            page: Rect::new(0.0, 0.0, width, height),
            regions: IndexMap::new(),
            reference: None,
        }
    }

    /// Add a region; ids must be unique.
    pub fn add_region(&mut self, region: Region) -> Result<()> {
        if self.regions.contains_key(region.id()) {
            return Err(Error::DuplicateId(region.id().to_string()));
        }
        self.regions.insert(region.id().to_string(), region);
        Ok(())
    }

    /// Builder-style [`Document::add_region`].
    pub fn with_region(mut self, region: Region) -> Result<Self> {
        self.add_region(region)?;
        Ok(self)
    }

    /// Attach the reference reading order of this page.
    pub fn with_reference(mut self, reading_order: ReadingOrder) -> Self {
        self.reference = Some(reading_order);
        self
    }

    /// Page rectangle.
    pub fn page_box(&self) -> Rect {
        self.page
    }

    /// All regions in load order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Text regions in load order.
    pub fn text_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values().filter(|r| r.is_text())
    }

    /// Number of text regions.
    pub fn text_region_count(&self) -> usize {
        self.text_regions().count()
    }

    /// Look up a region by id.
    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Transcription of a text region, `None` for unknown or non-text regions.
    pub fn text(&self, id: &str) -> Option<&str> {
        self.regions.get(id).and_then(Region::text)
    }

    /// Reference reading order, if the page carries one.
    pub fn reference_reading_order(&self) -> Option<&ReadingOrder> {
        self.reference.as_ref()
    }
}
