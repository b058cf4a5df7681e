use ratings_core::{ExternalFeed, RatingRecord, RatingsResult};
use std::sync::Arc;

/// Drains a cursor-paginated feed into memory.
///
/// Fails fast: the first page error aborts the drain and nothing fetched so far is returned.
#[derive(Clone)]
pub struct FeedPager {
    feed: Arc<dyn ExternalFeed>,
}

impl FeedPager {
    pub fn new(feed: Arc<dyn ExternalFeed>) -> Self {
        Self { feed }
    }

    /// Follow `next_page` cursors until the feed reports none, returning records in arrival order.
    pub async fn drain(&self) -> RatingsResult<Vec<RatingRecord>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.feed.fetch_page(cursor.as_deref()).await?;
            pages += 1;
            tracing::debug!(
                "Feed page {} returned {} items (cursor: {:?})",
                pages,
                page.items.len(),
                cursor
            );

            let next = page.next_cursor().map(str::to_string);
            items.extend(page.items);

            match next {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }

        tracing::info!("Drained {} rating records across {} feed pages", items.len(), pages);
        Ok(items)
    }
}
