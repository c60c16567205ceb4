//! Identifier-keyed, first-seen-ordered item collection.

use std::collections::HashMap;

use super::CatalogItem;

/// Merges listing pages by `item_id`.
///
/// The first occurrence of an id fixes both its position and its record;
/// repeats from later pages are dropped.
#[derive(Debug, Default)]
pub(crate) struct ItemMap {
    order: Vec<String>,
    by_id: HashMap<String, CatalogItem>,
}

impl ItemMap {
    /// Merges `items`, returning how many ids were new.
    pub(crate) fn merge(&mut self, items: impl IntoIterator<Item = CatalogItem>) -> usize {
        let mut added = 0;
        for item in items {
            if self.by_id.contains_key(&item.item_id) {
                continue;
            }
            self.order.push(item.item_id.clone());
            self.by_id.insert(item.item_id.clone(), item);
            added += 1;
        }
        added
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Consumes the map, returning at most `limit` items in first-seen order.
    pub(crate) fn into_items(mut self, limit: usize) -> Vec<CatalogItem> {
        self.order
            .into_iter()
            .take(limit)
            .filter_map(|id| self.by_id.remove(&id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> CatalogItem {
        CatalogItem::new(id, format!("Title {id}"))
    }

    #[test]
    fn test_merge_counts_only_new_ids() {
        let mut map = ItemMap::default();
        assert_eq!(map.merge([item("A"), item("B"), item("C")]), 3);
        assert_eq!(map.merge([item("C"), item("D")]), 1);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_into_items_preserves_first_seen_order() {
        let mut map = ItemMap::default();
        map.merge([item("B"), item("A")]);
        map.merge([item("A"), item("C"), item("B")]);
        let ids: Vec<_> = map
            .into_items(usize::MAX)
            .into_iter()
            .map(|i| i.item_id)
            .collect();
        assert_eq!(ids, ["B", "A", "C"]);
    }

    #[test]
    fn test_first_record_wins() {
        let mut map = ItemMap::default();
        map.merge([CatalogItem::new("A", "Original")]);
        map.merge([CatalogItem::new("A", "Renamed")]);
        let items = map.into_items(10);
        assert_eq!(items[0].display_name, "Original");
    }

    #[test]
    fn test_into_items_truncates() {
        let mut map = ItemMap::default();
        map.merge([item("A"), item("B"), item("C")]);
        assert_eq!(map.into_items(2).len(), 2);
    }
}
