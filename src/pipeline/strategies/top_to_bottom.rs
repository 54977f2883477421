//! Simple top-to-bottom, left-to-right reading order strategy.

use crate::document::Document;
use crate::error::Result;
use crate::reading_order::{chain_to_reading_order, ReadingOrder};
use crate::utils::safe_float_cmp;

use super::{OrderingContext, OrderingStrategy};

/// Simple top-to-bottom, left-to-right reading order.
///
/// This strategy sorts text regions by their top edge, then by their left
/// edge. Ties keep the load order.
///
/// This is the simplest strategy and works well for single-column pages.
pub struct TopToBottomStrategy;

impl OrderingStrategy for TopToBottomStrategy {
    fn apply(&self, doc: &Document, context: &mut OrderingContext) -> Result<ReadingOrder> {
        let mut regions: Vec<_> = doc.text_regions().map(|r| (r.id(), r.bbox())).collect();

        // Sort by top edge (y grows downwards), then left edge
        regions.sort_by(|(_, a), (_, b)| {
            safe_float_cmp(a.top(), b.top()).then_with(|| safe_float_cmp(a.left(), b.left()))
        });

        let chain: Vec<String> = regions.into_iter().map(|(id, _)| id.to_string()).collect();
        chain_to_reading_order(&chain, &mut context.ids)
    }

    fn name(&self) -> &'static str {
        "TopToBottomStrategy"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{page, text};
    use super::*;

    fn order_of(doc: &Document) -> Vec<String> {
        let mut context = OrderingContext::new();
        TopToBottomStrategy.apply(doc, &mut context).unwrap().item_ids()
    }

    #[test]
    fn test_simple_ordering() {
        let doc = page(vec![
            text("bottom", 0.0, 500.0, 50.0, 12.0, "Bottom"),
            text("top", 0.0, 100.0, 50.0, 12.0, "Top"),
            text("middle", 0.0, 300.0, 50.0, 12.0, "Middle"),
        ]);
        assert_eq!(order_of(&doc), vec!["top", "middle", "bottom"]);
    }

    #[test]
    fn test_left_to_right_on_same_line() {
        let doc = page(vec![
            text("right", 100.0, 100.0, 40.0, 12.0, "Right"),
            text("left", 0.0, 100.0, 40.0, 12.0, "Left"),
            text("center", 50.0, 100.0, 40.0, 12.0, "Center"),
        ]);
        assert_eq!(order_of(&doc), vec!["left", "center", "right"]);
    }
}
