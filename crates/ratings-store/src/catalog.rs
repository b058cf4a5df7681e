use ratings_core::{PaginatedRatings, RatingStore, RatingsError, RatingsResult};

pub const MAX_PAGE_SIZE: i64 = 100;

/// Page through stored ratings. `page` is 1-based.
pub async fn list_ratings(
    store: &dyn RatingStore,
    page: i64,
    page_size: i64,
) -> RatingsResult<PaginatedRatings> {
    if page < 1 {
        return Err(RatingsError::Validation(format!("invalid page {}", page)));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(RatingsError::Validation(format!(
            "invalid page_size {} (must be between 1 and {})",
            page_size, MAX_PAGE_SIZE
        )));
    }

    let total_count = store.count().await?;
    let data = store.get_page((page - 1) * page_size, page_size).await?;

    Ok(PaginatedRatings::new(data, page, page_size, total_count))
}
