//! Catalog listing with pagination and de-duplication.
//!
//! The provider's "my products" endpoint is paged with `offset`/`limit` and
//! is known to over- or under-deliver and to repeat items across pages.
//! [`CatalogLister::list`] walks pages at the provider's own page size and
//! merges them by item id, keeping first-seen order.
//!
//! Stop conditions, checked after every page:
//! 1. the merged set holds `limit` distinct items;
//! 2. the page was empty or added no new ids;
//! 3. the next page would start at or past the provider's reported `count`
//!    (read from the latest page, so a fluctuating count only moves the stop).

mod item_map;

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::endpoints::ApiEndpoints;
use crate::transport::{AuthenticatedTransport, HttpError};

use item_map::ItemMap;

/// Largest page the provider serves.
pub const PROVIDER_PAGE_SIZE: usize = 25;

/// One owned item.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    /// Unique provider identifier.
    pub item_id: String,
    /// Title shown to the owner.
    pub display_name: String,
    /// The full listing record as returned by the provider.
    pub raw: Map<String, Value>,
}

impl CatalogItem {
    /// Creates an item without extra metadata.
    pub fn new(item_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            display_name: display_name.into(),
            raw: Map::new(),
        }
    }

    /// Builds an item from a listing record; `None` when it has no usable id.
    #[must_use]
    pub fn from_record(record: Map<String, Value>) -> Option<Self> {
        let item_id = match record.get("productId") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return None,
        };
        let display_name = record
            .get("productName")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .map_or_else(|| item_id.clone(), str::to_string);
        Some(Self {
            item_id,
            display_name,
            raw: record,
        })
    }
}

/// Caller's listing window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Absolute position of the first item.
    pub offset: usize,
    /// Maximum number of distinct items; `None` lists everything reported.
    pub limit: Option<usize>,
    /// Provider sort expression.
    pub order: String,
    /// Items requested per page, capped at [`PROVIDER_PAGE_SIZE`].
    pub page_size: usize,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: None,
            order: crate::endpoints::DEFAULT_ORDER.to_string(),
            page_size: PROVIDER_PAGE_SIZE,
        }
    }
}

impl ListRequest {
    /// Page size actually requested from the provider: the configured size,
    /// never more than `limit` and never more than the provider serves.
    #[must_use]
    pub fn effective_page_size(&self) -> usize {
        let wanted = self.limit.map_or(self.page_size, |limit| limit.min(self.page_size));
        wanted.clamp(1, PROVIDER_PAGE_SIZE)
    }
}

struct Page {
    count: Option<usize>,
    items: Vec<CatalogItem>,
    received: usize,
}

/// Paginates the listing endpoint into a de-duplicated item sequence.
#[derive(Debug, Clone)]
pub struct CatalogLister {
    transport: AuthenticatedTransport,
    endpoints: Arc<ApiEndpoints>,
}

impl CatalogLister {
    /// Creates a lister over the authenticated transport.
    #[must_use]
    pub fn new(transport: AuthenticatedTransport, endpoints: Arc<ApiEndpoints>) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Lists owned items for `request`.
    ///
    /// # Errors
    ///
    /// Returns the first [`HttpError`] hit while paging; items merged before
    /// the failure are discarded.
    #[instrument(skip(self), fields(offset = request.offset, limit = ?request.limit))]
    pub async fn list(&self, request: &ListRequest) -> Result<Vec<CatalogItem>, HttpError> {
        let target = request.limit.unwrap_or(usize::MAX);
        if target == 0 {
            return Ok(Vec::new());
        }

        let page_size = request.effective_page_size();
        let mut merged = ItemMap::default();
        let mut cursor = request.offset;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(cursor, page_size, &request.order).await?;
            pages += 1;
            if page.received != page_size {
                debug!(
                    offset = cursor,
                    requested = page_size,
                    received = page.received,
                    "provider returned a different page size"
                );
            }

            let added = merged.merge(page.items);
            if pages == 1
                && let Some(count) = page.count
            {
                info!(count, "provider reports owned items");
            }

            if merged.len() >= target {
                break;
            }
            if added == 0 {
                debug!(offset = cursor, "page added no new items; stopping");
                break;
            }

            cursor = cursor.saturating_add(page_size);
            if page.count.is_some_and(|count| cursor >= count) {
                break;
            }
        }

        debug!(pages, distinct = merged.len(), "listing complete");
        Ok(merged.into_items(target))
    }

    async fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
        order: &str,
    ) -> Result<Page, HttpError> {
        let url = self.endpoints.products_url(offset, limit, order);
        let body: Value = self.transport.get_json(&url).await?;

        let count = body
            .get("count")
            .and_then(Value::as_u64)
            .and_then(|count| usize::try_from(count).ok());
        let records = match body.get("data") {
            Some(Value::Array(records)) => records.clone(),
            _ => {
                warn!(offset, "listing page has no `data` array");
                Vec::new()
            }
        };

        let received = records.len();
        let items = records
            .into_iter()
            .filter_map(|record| match record {
                Value::Object(map) => {
                    let item = CatalogItem::from_record(map);
                    if item.is_none() {
                        warn!(offset, "skipping listing record without productId");
                    }
                    item
                }
                _ => None,
            })
            .collect();

        Ok(Page {
            count,
            items,
            received,
        })
    }
}
