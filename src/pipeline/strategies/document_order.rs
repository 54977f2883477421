//! Load order strategy.

use crate::document::Document;
use crate::error::Result;
use crate::reading_order::{chain_to_reading_order, ReadingOrder};

use super::{OrderingContext, OrderingStrategy};

/// Text regions in the order the page lists them.
///
/// This is the order an OCR engine or layout tool wrote them in, which makes
/// it a useful baseline for the other strategies.
pub struct DocumentOrderStrategy;

impl OrderingStrategy for DocumentOrderStrategy {
    fn apply(&self, doc: &Document, context: &mut OrderingContext) -> Result<ReadingOrder> {
        let chain: Vec<String> = doc.text_regions().map(|r| r.id().to_string()).collect();
        chain_to_reading_order(&chain, &mut context.ids)
    }

    fn name(&self) -> &'static str {
        "DocumentOrderStrategy"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{page, text};
    use super::*;
    use crate::document::{Region, RegionKind};
    use crate::geometry::Rect;

    #[test]
    fn test_keeps_load_order_of_text_regions() {
        let mut doc = page(vec![
            text("b", 0.0, 500.0, 50.0, 12.0, "second"),
            text("a", 0.0, 100.0, 50.0, 12.0, "first"),
        ]);
        doc.add_region(Region::from_rect("img", RegionKind::Image, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap())
            .unwrap();

        let mut context = OrderingContext::new();
        let order = DocumentOrderStrategy.apply(&doc, &mut context).unwrap();
        assert_eq!(order.item_ids(), vec!["b", "a"]);
        assert_eq!(order.chain_reduction(), vec![("b".to_string(), "a".to_string())]);
    }
}
