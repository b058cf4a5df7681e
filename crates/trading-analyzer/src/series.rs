use ratings_core::{parse_price, DateWindow, PricePoint, RatingRecord};

/// Chronological price points derived from rating records.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
    /// Records dropped because `target_from` did not parse
    pub skipped: usize,
}

impl PriceSeries {
    /// Sort `records` by time (stable, so equal timestamps keep fetch order) and
    /// derive one point per parseable `target_from`.
    ///
    /// `keep_ticker` stamps each point with its ticker, for timelines that mix tickers.
    pub fn from_records(mut records: Vec<RatingRecord>, keep_ticker: bool) -> Self {
        records.sort_by_key(|r| r.time);

        let mut series = PriceSeries::default();
        for record in records {
            match parse_price(&record.target_from) {
                Some(price) => series.points.push(PricePoint {
                    price,
                    time: record.time,
                    brokerage: record.brokerage,
                    action: record.action,
                    rating: record.rating_from,
                    ticker: keep_ticker.then_some(record.ticker),
                }),
                None => series.skipped += 1,
            }
        }

        series
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Keep records whose time falls inside `window` (inclusive).
pub fn filter_window(records: Vec<RatingRecord>, window: &DateWindow) -> Vec<RatingRecord> {
    if window.is_unbounded() {
        return records;
    }
    records.into_iter().filter(|r| window.contains(r.time)).collect()
}
