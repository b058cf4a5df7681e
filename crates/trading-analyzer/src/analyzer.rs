use ratings_core::{
    DateRange, DateWindow, RatingRecord, RatingStore, RatingsError, RatingsResult,
    TradingRecommendation,
};
use std::sync::Arc;

use crate::scan::{max_profit_scan, ScanResult};
use crate::series::{filter_window, PriceSeries};

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Offset page size used when draining the whole store
    pub global_page_size: i64,
    /// `ticker` reported on cross-ticker recommendations
    pub global_ticker_label: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            global_page_size: 1000,
            global_ticker_label: "GLOBAL".to_string(),
        }
    }
}

/// Read-only analysis over already ingested ratings.
#[derive(Clone)]
pub struct TradingAnalyzer {
    store: Arc<dyn RatingStore>,
    config: AnalyzerConfig,
}

impl TradingAnalyzer {
    pub fn new(store: Arc<dyn RatingStore>) -> Self {
        Self::with_config(store, AnalyzerConfig::default())
    }

    pub fn with_config(store: Arc<dyn RatingStore>, config: AnalyzerConfig) -> Self {
        Self { store, config }
    }

    /// Best buy/sell pair for one ticker within `window`.
    pub async fn analyze_single(
        &self,
        ticker: &str,
        window: DateWindow,
    ) -> RatingsResult<TradingRecommendation> {
        window.validate()?;
        if ticker.trim().is_empty() {
            return Err(RatingsError::Validation("ticker is required".to_string()));
        }

        let ratings = self
            .store
            .get_by_ticker(ticker)
            .await
            .map_err(|e| e.context(format!("failed to get ratings for ticker {}", ticker)))?;

        if ratings.is_empty() {
            return Err(RatingsError::NotFound(format!("no ratings found for ticker {}", ticker)));
        }

        let ratings = filter_window(ratings, &window);
        if ratings.is_empty() {
            return Err(RatingsError::NotFound(format!(
                "no ratings found for ticker {} in the specified date range",
                ticker
            )));
        }

        let series = PriceSeries::from_records(ratings, false);
        recommend(ticker.to_string(), &series, &format!("ticker {}", ticker))
    }

    /// Analyze each ticker independently and rank by profit percentage, highest first.
    ///
    /// A ticker that fails is logged and left out. The call only fails when none succeed.
    pub async fn analyze_multiple(
        &self,
        tickers: &[String],
        window: DateWindow,
    ) -> RatingsResult<Vec<TradingRecommendation>> {
        window.validate()?;
        if tickers.is_empty() {
            return Err(RatingsError::Validation("at least one ticker is required".to_string()));
        }

        let mut recommendations = Vec::with_capacity(tickers.len());
        let mut failures = Vec::new();

        for ticker in tickers {
            match self.analyze_single(ticker, window).await {
                Ok(rec) => recommendations.push(rec),
                Err(e) => {
                    tracing::warn!("Error analyzing ticker {}: {}", ticker, e);
                    failures.push((ticker.as_str(), e));
                }
            }
        }

        if recommendations.is_empty() {
            return Err(RatingsError::NotFound(format!(
                "no valid recommendations found for any ticker ({} failed)",
                failures.len()
            )));
        }

        if !failures.is_empty() {
            let skipped: Vec<&str> = failures.iter().map(|(t, _)| *t).collect();
            tracing::info!(
                "Ranked {} of {} tickers; skipped {:?}",
                recommendations.len(),
                tickers.len(),
                skipped
            );
        }

        // stable: equal percentages keep input order
        recommendations.sort_by(|a, b| {
            b.profit_percentage
                .partial_cmp(&a.profit_percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(recommendations)
    }

    /// Treat every stored rating, across all tickers, as one timeline.
    ///
    /// Buy and sell may land on different tickers; both are reported.
    pub async fn analyze_global(&self, window: DateWindow) -> RatingsResult<TradingRecommendation> {
        window.validate()?;

        let ratings = filter_window(self.drain_store().await?, &window);
        if ratings.is_empty() {
            return Err(RatingsError::NotFound(
                "no ratings found in the specified date range".to_string(),
            ));
        }

        let series = PriceSeries::from_records(ratings, true);
        recommend(
            self.config.global_ticker_label.clone(),
            &series,
            "global analysis",
        )
    }

    /// Read the whole store with offset pagination until a short or empty page.
    async fn drain_store(&self) -> RatingsResult<Vec<RatingRecord>> {
        let page_size = self.config.global_page_size.max(1);
        let mut all = Vec::new();
        let mut page = 1i64;

        loop {
            let batch = self
                .store
                .get_page((page - 1) * page_size, page_size)
                .await
                .map_err(|e| e.context(format!("failed to get ratings page {}", page)))?;

            let fetched = batch.len() as i64;
            all.extend(batch);

            if fetched < page_size {
                break;
            }
            page += 1;
        }

        tracing::debug!("Loaded {} ratings across {} pages for global analysis", all.len(), page);
        Ok(all)
    }
}

fn recommend(
    ticker: String,
    series: &PriceSeries,
    scope: &str,
) -> RatingsResult<TradingRecommendation> {
    if series.skipped > 0 {
        tracing::debug!(
            "{}: skipped {} ratings with unparseable target price",
            scope,
            series.skipped
        );
    }

    if series.len() < 2 {
        return Err(RatingsError::InsufficientData(format!(
            "insufficient price data for {} (need at least 2 price points, found {})",
            scope,
            series.len()
        )));
    }

    let scan = max_profit_scan(&series.prices()).ok_or_else(|| {
        RatingsError::NoProfitableOpportunity(format!(
            "no profitable trading opportunity found for {}",
            scope
        ))
    })?;

    Ok(build_recommendation(ticker, series, scan))
}

fn build_recommendation(
    ticker: String,
    series: &PriceSeries,
    scan: ScanResult,
) -> TradingRecommendation {
    let buy = &series.points[scan.buy_index];
    let sell = &series.points[scan.sell_index];
    let first = &series.points[0];
    let last = &series.points[series.len() - 1];

    TradingRecommendation {
        ticker,
        buy_price: buy.price,
        sell_price: sell.price,
        max_profit: scan.max_profit,
        profit_percentage: scan.max_profit / buy.price * 100.0,
        buy_time: buy.time,
        sell_time: sell.time,
        buy_brokerage: buy.brokerage.clone(),
        sell_brokerage: sell.brokerage.clone(),
        buy_action: buy.action.clone(),
        sell_action: sell.action.clone(),
        buy_rating: buy.rating.clone(),
        sell_rating: sell.rating.clone(),
        buy_ticker: buy.ticker.clone(),
        sell_ticker: sell.ticker.clone(),
        total_data_points: series.len(),
        skipped_points: series.skipped,
        date_range: DateRange {
            start_date: first.time,
            end_date: last.time,
        },
    }
}
